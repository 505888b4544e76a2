//! Webhook intake queue
//!
//! Events are enqueued pending and drained oldest-first in bounded pages.
//! Failed entries are marked, never deleted; they stay for inspection.

use sqlx::PgPool;

use shared::types::WebhookStatus;
use shared::util::now_millis;

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct WebhookQueueEntry {
    pub id: i64,
    pub integration_id: i64,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub signature: Option<String>,
    pub status: String,
    pub error_message: Option<String>,
    pub processed_at: Option<i64>,
    pub created_at: i64,
}

pub async fn enqueue(
    pool: &PgPool,
    integration_id: i64,
    event_type: &str,
    payload: serde_json::Value,
    signature: Option<&str>,
) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO webhook_queue (integration_id, event_type, payload, signature, status, created_at)
         VALUES ($1, $2, $3, $4, 'pending', $5)
         RETURNING id",
    )
    .bind(integration_id)
    .bind(event_type)
    .bind(payload)
    .bind(signature)
    .bind(now_millis())
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Oldest pending entries, bounded page
pub async fn dequeue_pending(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<WebhookQueueEntry>, sqlx::Error> {
    sqlx::query_as::<_, WebhookQueueEntry>(
        "SELECT * FROM webhook_queue
         WHERE status = 'pending'
         ORDER BY created_at
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn mark_processed(
    pool: &PgPool,
    id: i64,
    status: WebhookStatus,
    error_message: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE webhook_queue
         SET status = $2, error_message = $3, processed_at = $4
         WHERE id = $1",
    )
    .bind(id)
    .bind(status.as_db())
    .bind(error_message)
    .bind(now_millis())
    .execute(pool)
    .await?;
    Ok(())
}
