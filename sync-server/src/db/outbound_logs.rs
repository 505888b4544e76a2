//! Outbound status push audit log
//!
//! One row per status-change attempt, retried in place up to a ceiling.
//! The retry claim is a single guarded UPDATE so two concurrent retries of
//! the same row cannot both pass the ceiling check.

use sqlx::PgPool;

use shared::error::{AppError, ErrorCode};
use shared::util::now_millis;

use crate::error::{ServiceError, ServiceResult};

/// Retries stop once a row has been attempted this many times
pub const MAX_RETRIES: i32 = 5;

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct OutboundSyncLog {
    pub id: i64,
    pub order_id: i64,
    pub integration_id: Option<i64>,
    pub platform_type: String,
    pub channel: String,
    pub old_status: String,
    pub new_status: String,
    pub result: String,
    pub error_message: Option<String>,
    pub retry_count: i32,
    pub last_retry_at: Option<i64>,
    pub created_at: i64,
}

pub struct NewOutboundLog<'a> {
    pub order_id: i64,
    pub integration_id: Option<i64>,
    pub platform_type: &'a str,
    pub channel: &'a str,
    pub old_status: &'a str,
    pub new_status: &'a str,
    pub result: &'a str,
    pub error_message: Option<&'a str>,
}

pub async fn insert(pool: &PgPool, new: &NewOutboundLog<'_>) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO outbound_sync_logs
            (order_id, integration_id, platform_type, channel,
             old_status, new_status, result, error_message, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING id",
    )
    .bind(new.order_id)
    .bind(new.integration_id)
    .bind(new.platform_type)
    .bind(new.channel)
    .bind(new.old_status)
    .bind(new.new_status)
    .bind(new.result)
    .bind(new.error_message)
    .bind(now_millis())
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn get(pool: &PgPool, id: i64) -> ServiceResult<OutboundSyncLog> {
    sqlx::query_as::<_, OutboundSyncLog>("SELECT * FROM outbound_sync_logs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ServiceError::App(AppError::new(ErrorCode::OutboundLogNotFound)))
}

/// Atomically claim a retry slot
///
/// Increments the counter and stamps the retry time only while the row is
/// still under the ceiling; returns the claimed row, or the retry-limit
/// error when the ceiling was already reached (or the row does not exist).
pub async fn claim_retry(pool: &PgPool, id: i64) -> ServiceResult<OutboundSyncLog> {
    let claimed = sqlx::query_as::<_, OutboundSyncLog>(
        "UPDATE outbound_sync_logs
         SET retry_count = retry_count + 1, last_retry_at = $2
         WHERE id = $1 AND retry_count < $3
         RETURNING *",
    )
    .bind(id)
    .bind(now_millis())
    .bind(MAX_RETRIES)
    .fetch_optional(pool)
    .await?;

    match claimed {
        Some(row) => Ok(row),
        None => {
            // Distinguish a missing row from an exhausted one
            get(pool, id).await?;
            Err(ServiceError::App(AppError::new(ErrorCode::RetryLimitReached)))
        }
    }
}

/// Record the outcome of a retry attempt in place
pub async fn record_retry_result(
    pool: &PgPool,
    id: i64,
    result: &str,
    error_message: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE outbound_sync_logs SET result = $2, error_message = $3 WHERE id = $1",
    )
    .bind(id)
    .bind(result)
    .bind(error_message)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn list_for_order(
    pool: &PgPool,
    order_id: i64,
    limit: i64,
) -> Result<Vec<OutboundSyncLog>, sqlx::Error> {
    sqlx::query_as::<_, OutboundSyncLog>(
        "SELECT * FROM outbound_sync_logs
         WHERE order_id = $1
         ORDER BY created_at DESC
         LIMIT $2",
    )
    .bind(order_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}
