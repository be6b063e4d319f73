//! Crawl summary events.
//!
//! At the end of a run a single wide event carries everything known about
//! it, so the log holds one line per crawl that answers "did it finish, how
//! far did it get, and why did it stop".

use tracing::{error, info, warn};

use crate::crawl::CrawlStatus;

/// Event type used for crawl summaries.
pub const CRAWL_EVENT_TYPE: &str = "crawl.wide";

/// Builds the summary payload for a crawl status.
#[must_use]
pub fn build_crawl_payload(status: &CrawlStatus) -> serde_json::Value {
    let mut payload = serde_json::json!({
        "event": CRAWL_EVENT_TYPE,
        "status": status.label(),
    });

    let details = match status {
        CrawlStatus::Idle => serde_json::json!({}),
        CrawlStatus::Running { run_id, started_at } => serde_json::json!({
            "run_id": run_id.to_string(),
            "started_at": started_at.to_rfc3339(),
        }),
        CrawlStatus::Completed(outcome) => serde_json::json!({
            "run_id": outcome.run_id.to_string(),
            "start_url": outcome.start_url,
            "listing_pages": outcome.listing_pages,
            "products": outcome.products,
            "started_at": outcome.started_at.to_rfc3339(),
            "finished_at": outcome.finished_at.map(|t| t.to_rfc3339()),
            "duration_ms": outcome.elapsed_ms,
        }),
        CrawlStatus::Failed {
            run_id,
            kind,
            error,
            products_collected,
            finished_at,
        } => serde_json::json!({
            "run_id": run_id.to_string(),
            "error_kind": kind,
            "error": error,
            "products": products_collected,
            "finished_at": finished_at.to_rfc3339(),
        }),
        CrawlStatus::Cancelled {
            run_id,
            reason,
            products_collected,
            finished_at,
        } => serde_json::json!({
            "run_id": run_id.to_string(),
            "reason": reason,
            "products": products_collected,
            "finished_at": finished_at.to_rfc3339(),
        }),
    };

    if let (serde_json::Value::Object(map), serde_json::Value::Object(extra)) =
        (&mut payload, details)
    {
        map.extend(extra);
    }
    payload
}

/// Logs the summary event for a crawl status.
pub fn emit_crawl_summary(status: &CrawlStatus) {
    let payload = build_crawl_payload(status);
    match status {
        CrawlStatus::Failed { .. } => error!(event = CRAWL_EVENT_TYPE, %payload, "Crawl stopped early"),
        CrawlStatus::Cancelled { .. } => warn!(event = CRAWL_EVENT_TYPE, %payload, "Crawl cancelled"),
        _ => info!(event = CRAWL_EVENT_TYPE, %payload, "Crawl summary"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::CrawlOutcome;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_idle_payload() {
        let payload = build_crawl_payload(&CrawlStatus::Idle);
        assert_eq!(payload["event"], "crawl.wide");
        assert_eq!(payload["status"], "idle");
    }

    #[test]
    fn test_completed_payload() {
        let mut outcome = CrawlOutcome::begin(Uuid::new_v4(), "https://shop.test/");
        outcome.listing_pages = 3;
        outcome.products = 42;
        let payload = build_crawl_payload(&CrawlStatus::Completed(outcome.finish()));

        assert_eq!(payload["status"], "completed");
        assert_eq!(payload["listing_pages"], 3);
        assert_eq!(payload["products"], 42);
        assert!(payload["finished_at"].is_string());
    }

    #[test]
    fn test_failed_payload() {
        let status = CrawlStatus::Failed {
            run_id: Uuid::nil(),
            kind: "extraction".to_string(),
            error: "Required field 'productId' not found".to_string(),
            products_collected: 7,
            finished_at: Utc::now(),
        };
        let payload = build_crawl_payload(&status);

        assert_eq!(payload["status"], "failed");
        assert_eq!(payload["error_kind"], "extraction");
        assert_eq!(payload["products"], 7);
        assert_eq!(payload["run_id"], Uuid::nil().to_string());

        emit_crawl_summary(&status);
    }
}
