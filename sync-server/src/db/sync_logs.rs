//! Sync run log: one row per pipeline invocation
//!
//! Append-then-update lifecycle: inserted as `running` when the run opens,
//! updated exactly once with the final status and counts when it closes.

use sqlx::PgPool;

use shared::error::{AppError, ErrorCode};
use shared::types::{SyncDirection, SyncRunStatus, SyncType};
use shared::util::now_millis;

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct SyncLog {
    pub id: i64,
    pub integration_id: i64,
    pub sync_type: String,
    pub direction: String,
    pub status: String,
    pub records_processed: i32,
    pub records_failed: i32,
    pub detail: Option<serde_json::Value>,
    pub started_at: i64,
    pub completed_at: Option<i64>,
}

/// Open a run: insert the row as `running` and return its id
pub async fn open(
    pool: &PgPool,
    integration_id: i64,
    sync_type: SyncType,
    direction: SyncDirection,
) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO sync_logs (integration_id, sync_type, direction, status, started_at)
         VALUES ($1, $2, $3, 'running', $4)
         RETURNING id",
    )
    .bind(integration_id)
    .bind(sync_type.as_db())
    .bind(direction.as_db())
    .bind(now_millis())
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Close a run with its final status, counts, and detail payload
pub async fn close(
    pool: &PgPool,
    id: i64,
    status: SyncRunStatus,
    processed: i32,
    failed: i32,
    detail: Option<serde_json::Value>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE sync_logs
         SET status = $2, records_processed = $3, records_failed = $4,
             detail = $5, completed_at = $6
         WHERE id = $1",
    )
    .bind(id)
    .bind(status.as_db())
    .bind(processed)
    .bind(failed)
    .bind(detail)
    .bind(now_millis())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get(pool: &PgPool, id: i64) -> ServiceResult<SyncLog> {
    sqlx::query_as::<_, SyncLog>("SELECT * FROM sync_logs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ServiceError::App(AppError::new(ErrorCode::SyncLogNotFound)))
}

pub async fn list_for_integration(
    pool: &PgPool,
    integration_id: i64,
    limit: i64,
) -> Result<Vec<SyncLog>, sqlx::Error> {
    sqlx::query_as::<_, SyncLog>(
        "SELECT * FROM sync_logs
         WHERE integration_id = $1
         ORDER BY started_at DESC
         LIMIT $2",
    )
    .bind(integration_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}
