//! # Catalog Crawler
//!
//! Crawls a paginated product catalog and serves the extracted records.
//!
//! The crate provides:
//!
//! - **Page automation**: an opaque browsing capability ([`automation::PageAutomation`])
//!   with an HTML-over-HTTP implementation
//! - **Extraction**: per-page [`extract::Product`] records with sentinel fallbacks
//! - **Crawling**: sequential listing/detail traversal with cooperative cancellation
//! - **Querying**: conjunctive attribute filters over the stored products
//! - **HTTP surface**: `GET /products`, `GET /status` and `GET /health`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use catalog_crawler::prelude::*;
//!
//! let store = Arc::new(ProductStore::new());
//! let source = HttpPageSource::new(FetchConfig::new())?;
//! let crawler = CatalogCrawler::new(HtmlPageAutomation::new(source), store.clone(), CrawlerConfig::new());
//!
//! crawler.run_and_record(&CancellationToken::new()).await?;
//! let grade_a = filter_products(&store.snapshot(), &ProductQuery::new().with_nutrition("A"));
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod automation;
pub mod cancellation;
pub mod config;
pub mod crawl;
pub mod errors;
pub mod extract;
pub mod observability;
pub mod query;
pub mod server;
pub mod store;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::automation::{
        HtmlPageAutomation, HttpPageSource, NodeHandle, PageAutomation, PageAutomationExt,
        PageSource,
    };
    pub use crate::cancellation::CancellationToken;
    pub use crate::config::{
        AppConfig, CrawlerConfig, FetchConfig, ListingSelectors, NextPageCheck, ProductSelectors,
    };
    pub use crate::crawl::{CatalogCrawler, CrawlOutcome, CrawlStatus};
    pub use crate::errors::{AutomationError, CrawlError, ExtractionError};
    pub use crate::extract::{NutrientLevel, NutritionFact, Product, ProductExtractor, Score};
    pub use crate::query::{filter_products, ProductQuery};
    pub use crate::server::build_app;
    pub use crate::store::ProductStore;
}
