//! Crawl orchestration.
//!
//! This module provides:
//! - [`CatalogCrawler`], the paginated listing/detail traversal
//! - [`CrawlOutcome`] and [`CrawlStatus`] for reporting a run

mod crawler;
mod outcome;


pub use crawler::CatalogCrawler;
pub use outcome::{CrawlOutcome, CrawlStatus};
