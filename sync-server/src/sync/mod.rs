//! Sync pipelines
//!
//! Each pipeline invocation opens a SyncLog row, processes its records
//! sequentially with per-record error isolation, and closes the row with an
//! aggregated outcome. Partial results are normal, not anomalies.

pub mod export;
pub mod import;
pub mod status;
pub mod worker;

use serde::Serialize;
use shared::types::{SyncHealth, SyncRunStatus};

use crate::db;
use crate::state::AppState;

/// Error strings kept on a run's detail payload are capped; the counts stay
/// exact regardless
pub const MAX_LOGGED_ERRORS: usize = 20;

/// Aggregated outcome of one multi-record run
#[derive(Debug, Default, Clone, Serialize)]
pub struct BatchOutcome {
    pub total: u32,
    pub succeeded: u32,
    pub skipped: u32,
    pub failed: u32,
    pub errors: Vec<String>,
    pub skips: Vec<String>,
}

impl BatchOutcome {
    pub fn record_success(&mut self) {
        self.total += 1;
        self.succeeded += 1;
    }

    /// A skip is counted and explained, but kept out of the error list so
    /// routine dedup does not read as a fault in the audit trail
    pub fn record_skip(&mut self, message: impl Into<String>) {
        self.total += 1;
        self.skipped += 1;
        if self.skips.len() < MAX_LOGGED_ERRORS {
            self.skips.push(message.into());
        }
    }

    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.total += 1;
        self.failed += 1;
        self.push_error(message);
    }

    /// Attach a message to the run detail without touching any count; used
    /// for best-effort sub-writes that do not fail their parent record
    pub fn note(&mut self, message: impl Into<String>) {
        self.push_error(message);
    }

    fn push_error(&mut self, message: impl Into<String>) {
        if self.errors.len() < MAX_LOGGED_ERRORS {
            self.errors.push(message.into());
        }
    }

    /// Final run status: failures alone decide between success and the rest;
    /// a run where nothing succeeded and something failed is `failed`
    pub fn status(&self) -> SyncRunStatus {
        if self.failed == 0 {
            SyncRunStatus::Success
        } else if self.succeeded > 0 {
            SyncRunStatus::Partial
        } else {
            SyncRunStatus::Failed
        }
    }

    pub fn detail(&self) -> serde_json::Value {
        serde_json::json!({
            "total": self.total,
            "succeeded": self.succeeded,
            "skipped": self.skipped,
            "failed": self.failed,
            "errors": self.errors,
            "skipped_detail": self.skips,
        })
    }
}

/// Close the SyncLog and reflect the run on the integration's sync state
///
/// A run that produced nothing but failures flips the integration to
/// `error`; anything else counts as a live connection.
pub(crate) async fn close_run(
    state: &AppState,
    integration_id: i64,
    sync_log_id: i64,
    outcome: &BatchOutcome,
) {
    let status = outcome.status();
    if let Err(e) = db::sync_logs::close(
        &state.pool,
        sync_log_id,
        status,
        (outcome.succeeded + outcome.skipped) as i32,
        outcome.failed as i32,
        Some(outcome.detail()),
    )
    .await
    {
        tracing::error!(sync_log_id, error = %e, "Failed to close sync log");
    }

    let (health, error) = if status == SyncRunStatus::Failed {
        (SyncHealth::Error, outcome.errors.first().map(|s| s.as_str()))
    } else {
        (SyncHealth::Connected, None)
    };
    if let Err(e) =
        db::integrations::mark_sync_result(&state.pool, integration_id, health, error).await
    {
        tracing::error!(integration_id, error = %e, "Failed to update integration sync state");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_success_with_skips_is_success() {
        // three records, one already present
        let mut outcome = BatchOutcome::default();
        outcome.record_success();
        outcome.record_skip("order 1002 already imported");
        outcome.record_success();

        assert_eq!(outcome.total, 3);
        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.failed, 0);
        assert_eq!(outcome.status(), SyncRunStatus::Success);
    }

    #[test]
    fn test_skip_messages_stay_out_of_errors() {
        let mut outcome = BatchOutcome::default();
        outcome.record_skip("order 1002 already imported");
        outcome.record_failure("order 1003: network error");

        assert!(outcome.errors.iter().all(|e| !e.contains("1002")));
        assert_eq!(outcome.skips, vec!["order 1002 already imported"]);
        let detail = outcome.detail();
        assert_eq!(detail["skipped_detail"][0], "order 1002 already imported");
        assert_eq!(detail["errors"][0], "order 1003: network error");
    }

    #[test]
    fn test_mixed_outcome_is_partial() {
        let mut outcome = BatchOutcome::default();
        outcome.record_success();
        outcome.record_failure("network error");
        assert_eq!(outcome.status(), SyncRunStatus::Partial);
    }

    #[test]
    fn test_nothing_succeeded_is_failed() {
        let mut outcome = BatchOutcome::default();
        outcome.record_failure("boom");
        outcome.record_failure("boom again");
        assert_eq!(outcome.status(), SyncRunStatus::Failed);
    }

    #[test]
    fn test_empty_run_is_success() {
        assert_eq!(BatchOutcome::default().status(), SyncRunStatus::Success);
    }

    #[test]
    fn test_error_list_capped_counts_exact() {
        let mut outcome = BatchOutcome::default();
        for i in 0..50 {
            outcome.record_failure(format!("error {i}"));
        }
        assert_eq!(outcome.failed, 50);
        assert_eq!(outcome.errors.len(), MAX_LOGGED_ERRORS);
    }
}
