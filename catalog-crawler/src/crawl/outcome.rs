//! Crawl run bookkeeping: the outcome of a finished run and the status the
//! query layer can observe while a run is in progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CrawlError;

/// Summary of a crawl that ran to pagination exhaustion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlOutcome {
    /// Identifier of the run.
    pub run_id: Uuid,
    /// First listing page.
    pub start_url: String,
    /// Listing pages visited.
    pub listing_pages: usize,
    /// Products appended to the store.
    pub products: usize,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: Option<DateTime<Utc>>,
    /// Wall-clock duration in milliseconds.
    pub elapsed_ms: f64,
}

impl CrawlOutcome {
    /// Starts bookkeeping for a new run.
    #[must_use]
    pub fn begin(run_id: Uuid, start_url: impl Into<String>) -> Self {
        Self {
            run_id,
            start_url: start_url.into(),
            listing_pages: 0,
            products: 0,
            started_at: Utc::now(),
            finished_at: None,
            elapsed_ms: 0.0,
        }
    }

    /// Stamps the finish time.
    #[must_use]
    pub fn finish(mut self) -> Self {
        let now = Utc::now();
        self.elapsed_ms = elapsed_ms(self.started_at, now);
        self.finished_at = Some(now);
        self
    }
}

/// Observable state of the crawl task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CrawlStatus {
    /// No crawl has started.
    #[default]
    Idle,
    /// A crawl is in progress.
    Running {
        /// Identifier of the run.
        run_id: Uuid,
        /// When the run started.
        started_at: DateTime<Utc>,
    },
    /// The crawl ran out of listing pages.
    Completed(CrawlOutcome),
    /// The crawl stopped on an unrecoverable fault.
    Failed {
        /// Identifier of the run.
        run_id: Uuid,
        /// Error kind (`extraction` or `navigation`).
        kind: String,
        /// Error message.
        error: String,
        /// Products appended before the fault.
        products_collected: usize,
        /// When the run stopped.
        finished_at: DateTime<Utc>,
    },
    /// The crawl was cancelled.
    Cancelled {
        /// Identifier of the run.
        run_id: Uuid,
        /// Cancellation reason.
        reason: String,
        /// Products appended before cancellation.
        products_collected: usize,
        /// When the run stopped.
        finished_at: DateTime<Utc>,
    },
}

impl CrawlStatus {
    /// Builds the terminal status for a run result.
    #[must_use]
    pub fn from_result(
        run_id: Uuid,
        result: &Result<CrawlOutcome, CrawlError>,
        products_collected: usize,
    ) -> Self {
        match result {
            Ok(outcome) => Self::Completed(outcome.clone()),
            Err(CrawlError::Cancelled(reason)) => Self::Cancelled {
                run_id,
                reason: reason.clone(),
                products_collected,
                finished_at: Utc::now(),
            },
            Err(err) => Self::Failed {
                run_id,
                kind: err.kind().to_string(),
                error: err.to_string(),
                products_collected,
                finished_at: Utc::now(),
            },
        }
    }

    /// Short label for the state.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running { .. } => "running",
            Self::Completed(_) => "completed",
            Self::Failed { .. } => "failed",
            Self::Cancelled { .. } => "cancelled",
        }
    }

    /// Whether the crawl has stopped for good.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed(_) | Self::Failed { .. } | Self::Cancelled { .. }
        )
    }
}

#[allow(clippy::cast_precision_loss)]
fn elapsed_ms(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_microseconds().unwrap_or(i64::MAX) as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{AutomationError, ExtractionError};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_outcome_finish_stamps_time() {
        let outcome = CrawlOutcome::begin(Uuid::new_v4(), "https://shop.test/").finish();
        assert!(outcome.finished_at.is_some());
        assert!(outcome.elapsed_ms >= 0.0);
    }

    #[test]
    fn test_status_from_result() {
        let run_id = Uuid::new_v4();
        let ok = Ok(CrawlOutcome::begin(run_id, "https://shop.test/").finish());
        assert_eq!(CrawlStatus::from_result(run_id, &ok, 3).label(), "completed");

        let failed: Result<CrawlOutcome, CrawlError> = Err(CrawlError::Extraction {
            url: "https://shop.test/p/2".to_string(),
            source: ExtractionError::missing("productId", "span#barcode"),
        });
        match CrawlStatus::from_result(run_id, &failed, 1) {
            CrawlStatus::Failed {
                kind,
                products_collected,
                ..
            } => {
                assert_eq!(kind, "extraction");
                assert_eq!(products_collected, 1);
            }
            other => panic!("unexpected status: {other:?}"),
        }

        let navigation: Result<CrawlOutcome, CrawlError> =
            Err(AutomationError::navigation("https://shop.test/", "refused").into());
        assert_eq!(CrawlStatus::from_result(run_id, &navigation, 0).label(), "failed");

        let cancelled: Result<CrawlOutcome, CrawlError> =
            Err(CrawlError::Cancelled("shutdown".to_string()));
        let status = CrawlStatus::from_result(run_id, &cancelled, 0);
        assert_eq!(status.label(), "cancelled");
        assert!(status.is_terminal());
    }

    #[test]
    fn test_status_serializes_with_state_tag() {
        assert_eq!(
            serde_json::to_value(CrawlStatus::Idle).unwrap(),
            serde_json::json!({ "state": "idle" })
        );

        let outcome = CrawlOutcome::begin(Uuid::nil(), "https://shop.test/");
        let json = serde_json::to_value(CrawlStatus::Completed(outcome)).unwrap();
        assert_eq!(json["state"], "completed");
        assert_eq!(json["start_url"], "https://shop.test/");
        assert!(!CrawlStatus::Idle.is_terminal());
    }
}
