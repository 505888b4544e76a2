//! WebhookWorker — background drain of the webhook intake queue
//!
//! Runs on an interval, pulls the oldest pending entries in a bounded page,
//! and feeds order events into the single-order import path. Every entry
//! ends as completed or failed with a processed timestamp; nothing is
//! deleted.

use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use shared::types::WebhookStatus;

use crate::db;
use crate::db::webhook_queue::WebhookQueueEntry;
use crate::platform::types::ExternalOrder;
use crate::state::AppState;
use crate::sync::import;

pub struct WebhookWorker {
    state: AppState,
    shutdown: CancellationToken,
    interval_secs: u64,
}

impl WebhookWorker {
    pub fn new(state: AppState, shutdown: CancellationToken, interval_secs: u64) -> Self {
        Self {
            state,
            shutdown,
            interval_secs,
        }
    }

    pub async fn run(self) {
        tracing::info!("WebhookWorker started");

        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("WebhookWorker shutting down");
                    break;
                }
                _ = interval.tick() => {
                    self.drain().await;
                }
            }
        }

        tracing::info!("WebhookWorker stopped");
    }

    /// One drain pass over the pending queue
    async fn drain(&self) {
        let entries = match db::webhook_queue::dequeue_pending(
            &self.state.pool,
            self.state.webhook_drain_batch_size,
        )
        .await
        {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(error = %e, "Webhook queue read failed");
                return;
            }
        };

        for entry in entries {
            let entry_id = entry.id;
            let (status, error) = match self.process_entry(&entry).await {
                Ok(()) => (WebhookStatus::Completed, None),
                Err(message) => {
                    tracing::warn!(entry_id, error = %message, "Webhook entry failed");
                    (WebhookStatus::Failed, Some(message))
                }
            };
            if let Err(e) = db::webhook_queue::mark_processed(
                &self.state.pool,
                entry_id,
                status,
                error.as_deref(),
            )
            .await
            {
                tracing::error!(entry_id, error = %e, "Failed to mark webhook entry");
            }
        }
    }

    async fn process_entry(&self, entry: &WebhookQueueEntry) -> Result<(), String> {
        match entry.event_type.as_str() {
            "order.created" | "order.updated" => {
                let external: ExternalOrder = serde_json::from_value(entry.payload.clone())
                    .map_err(|e| format!("payload decode: {e}"))?;
                let report =
                    import::import_single(&self.state, entry.integration_id, &external)
                        .await
                        .map_err(|e| {
                            let app: shared::error::AppError = e.into();
                            app.message
                        })?;
                if report.failed > 0 {
                    return Err(report
                        .errors
                        .first()
                        .cloned()
                        .unwrap_or_else(|| "import failed".into()));
                }
                Ok(())
            }
            other => {
                // Unknown event types complete quietly; the row is retained either way
                tracing::debug!(event_type = other, "Unhandled webhook event type");
                Ok(())
            }
        }
    }
}
