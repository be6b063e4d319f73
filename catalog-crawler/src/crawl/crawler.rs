//! The catalog crawler: paginated traversal of listing pages with one
//! extraction per product detail page.
//!
//! The traversal is strictly sequential over a single browsing context. Per
//! listing page the crawler captures the "next" control, collects the product
//! links, visits and extracts each product in order, then decides whether to
//! continue. The decision uses the captured control by default
//! ([`NextPageCheck::Captured`]); [`NextPageCheck::Requery`] returns to the
//! listing page and asks again. Pagination ends only when no control is
//! found, there is no page limit and no visited-page tracking.

use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use url::Url;
use uuid::Uuid;

use super::outcome::{CrawlOutcome, CrawlStatus};
use crate::automation::{NodeHandle, PageAutomation};
use crate::cancellation::CancellationToken;
use crate::config::{CrawlerConfig, NextPageCheck};
use crate::errors::{AutomationError, CrawlError};
use crate::extract::ProductExtractor;
use crate::observability::emit_crawl_summary;
use crate::store::ProductStore;

/// Drives a [`PageAutomation`] through the catalog and fills a
/// [`ProductStore`].
pub struct CatalogCrawler<A> {
    automation: A,
    extractor: ProductExtractor,
    store: Arc<ProductStore>,
    config: CrawlerConfig,
}

impl<A: PageAutomation> CatalogCrawler<A> {
    /// Creates a crawler.
    #[must_use]
    pub fn new(automation: A, store: Arc<ProductStore>, config: CrawlerConfig) -> Self {
        Self {
            automation,
            extractor: ProductExtractor::new(config.product.clone()),
            store,
            config,
        }
    }

    /// Gets the automation backend.
    #[must_use]
    pub const fn automation(&self) -> &A {
        &self.automation
    }

    /// Gets the configuration.
    #[must_use]
    pub const fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Crawls from the configured start URL, records the terminal status in
    /// the store and emits a summary event.
    pub async fn run_and_record(
        &self,
        cancel: &CancellationToken,
    ) -> Result<CrawlOutcome, CrawlError> {
        let run_id = Uuid::new_v4();
        let before = self.store.len();
        self.store.set_status(CrawlStatus::Running {
            run_id,
            started_at: chrono::Utc::now(),
        });

        let result = self.run_with_id(run_id, &self.config.start_url, cancel).await;

        let status = CrawlStatus::from_result(run_id, &result, self.store.len().saturating_sub(before));
        emit_crawl_summary(&status);
        self.store.set_status(status);
        result
    }

    /// Crawls the catalog starting at `start_url`.
    pub async fn run(
        &self,
        start_url: &str,
        cancel: &CancellationToken,
    ) -> Result<CrawlOutcome, CrawlError> {
        self.run_with_id(Uuid::new_v4(), start_url, cancel).await
    }

    async fn run_with_id(
        &self,
        run_id: Uuid,
        start_url: &str,
        cancel: &CancellationToken,
    ) -> Result<CrawlOutcome, CrawlError> {
        let span = info_span!("crawl", %run_id, start_url);
        let mut outcome = CrawlOutcome::begin(run_id, start_url);
        self.traverse(&mut outcome, cancel).instrument(span).await?;
        Ok(outcome.finish())
    }

    async fn traverse(
        &self,
        outcome: &mut CrawlOutcome,
        cancel: &CancellationToken,
    ) -> Result<(), CrawlError> {
        let page = &self.automation;
        let listing = &self.config.listing;

        suspend(cancel, page.goto(&outcome.start_url)).await?;
        let mut listing_url = page
            .current_url()
            .unwrap_or_else(|| outcome.start_url.clone());

        loop {
            outcome.listing_pages += 1;

            let next_control = suspend(cancel, page.query_selector(&listing.next_page)).await?;
            let mut next_page_link = next_control
                .as_ref()
                .and_then(|control| link_target(control, &listing_url));

            let product_links = self.product_links(&listing_url, cancel).await?;
            info!(
                page = outcome.listing_pages,
                url = %listing_url,
                products = product_links.len(),
                has_next = next_control.is_some(),
                "Processing listing page"
            );

            for link in &product_links {
                suspend(cancel, page.goto(link)).await?;
                let product = suspend(cancel, async {
                    self.extractor
                        .extract(page)
                        .await
                        .map_err(|source| CrawlError::Extraction {
                            url: link.clone(),
                            source,
                        })
                })
                .await?;

                debug!(product_id = %product.product_id, url = %link, "Appending product");
                self.store.append(product);
                outcome.products += 1;
            }

            let has_next = match self.config.next_page_check {
                NextPageCheck::Captured => next_control.is_some(),
                NextPageCheck::Requery => {
                    suspend(cancel, page.goto(&listing_url)).await?;
                    let fresh = suspend(cancel, page.query_selector(&listing.next_page)).await?;
                    next_page_link = fresh
                        .as_ref()
                        .and_then(|control| link_target(control, &listing_url));
                    fresh.is_some()
                }
            };

            if !has_next {
                info!(
                    pages = outcome.listing_pages,
                    products = outcome.products,
                    "No next page, crawl finished"
                );
                return Ok(());
            }

            let Some(next) = next_page_link else {
                return Err(AutomationError::navigation(
                    listing_url,
                    "next page control has no link target",
                )
                .into());
            };

            suspend(cancel, page.goto(&next)).await?;
            suspend(
                cancel,
                page.wait_for_selector(&listing.content_ready, self.config.wait_timeout()),
            )
            .await?;
            listing_url = page.current_url().unwrap_or(next);
        }
    }

    async fn product_links(
        &self,
        listing_url: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, CrawlError> {
        let nodes = suspend(
            cancel,
            self.automation.query_selector_all(&self.config.listing.product_link),
        )
        .await?;

        Ok(nodes
            .iter()
            .filter_map(|node| {
                let target = link_target(node, listing_url);
                if target.is_none() {
                    warn!(url = %listing_url, "Skipping product link without target");
                }
                target
            })
            .collect())
    }
}

/// Awaits `fut` unless `cancel` fires first.
async fn suspend<T, E, F>(cancel: &CancellationToken, fut: F) -> Result<T, CrawlError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<CrawlError>,
{
    if let Some(reason) = cancel.reason() {
        return Err(CrawlError::Cancelled(reason));
    }
    tokio::select! {
        biased;
        reason = cancel.cancelled() => Err(CrawlError::Cancelled(reason)),
        result = fut => result.map_err(Into::into),
    }
}

/// The absolute URL an anchor points to, resolved like a browser's `href`.
fn link_target(node: &NodeHandle, base: &str) -> Option<String> {
    let href = node.attribute("href")?.trim();
    match Url::parse(base) {
        Ok(base) => base.join(href).ok().map(String::from),
        Err(_) => Url::parse(href).ok().map(String::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::{HtmlPageAutomation, MockPageAutomation};
    use crate::testing::{DetailPage, FixturePageSource, ListingPage};
    use pretty_assertions::assert_eq;

    fn product_page(id: &str) -> String {
        DetailPage::new(format!("Produto {id}"), id)
            .with_nutrition("Nutri-Score A", "Boa")
            .with_nova("NOVA 1", "Não processado")
            .render()
    }

    #[tokio::test]
    async fn test_link_target_resolution() {
        let source = FixturePageSource::new().with_page(
            "https://shop.test/categoria/2",
            "<a href='produto/1'></a><a href='/produto/2'></a>\
             <a href='https://other.test/p'></a><a></a>",
        );
        let automation = HtmlPageAutomation::new(source);
        automation.goto("https://shop.test/categoria/2").await.unwrap();
        let nodes = automation.query_selector_all("a").await.unwrap();
        let base = "https://shop.test/categoria/2";

        assert_eq!(
            link_target(&nodes[0], base).as_deref(),
            Some("https://shop.test/categoria/produto/1")
        );
        assert_eq!(
            link_target(&nodes[1], base).as_deref(),
            Some("https://shop.test/produto/2")
        );
        assert_eq!(
            link_target(&nodes[2], base).as_deref(),
            Some("https://other.test/p")
        );
        assert_eq!(link_target(&nodes[3], base), None);
    }

    #[tokio::test]
    async fn test_single_page_without_next_control() {
        let source = FixturePageSource::new()
            .with_page(
                "https://shop.test/",
                ListingPage::new().with_product("/p/1").with_product("/p/2").render(),
            )
            .with_page("https://shop.test/p/1", product_page("1"))
            .with_page("https://shop.test/p/2", product_page("2"));
        let store = Arc::new(ProductStore::new());
        let crawler = CatalogCrawler::new(
            HtmlPageAutomation::new(source.clone()),
            Arc::clone(&store),
            CrawlerConfig::new(),
        );

        let outcome = crawler
            .run("https://shop.test/", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.listing_pages, 1);
        assert_eq!(outcome.products, 2);
        let ids: Vec<String> = store.snapshot().into_iter().map(|p| p.product_id).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(
            source.fetched_urls(),
            vec!["https://shop.test/", "https://shop.test/p/1", "https://shop.test/p/2"]
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let store = Arc::new(ProductStore::new());
        let crawler = CatalogCrawler::new(
            HtmlPageAutomation::new(FixturePageSource::new()),
            Arc::clone(&store),
            CrawlerConfig::new(),
        );
        let cancel = CancellationToken::new();
        cancel.cancel("shutdown");

        let err = crawler.run("https://shop.test/", &cancel).await.unwrap_err();
        assert_eq!(err, CrawlError::Cancelled("shutdown".to_string()));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_navigation_failure_aborts() {
        let mut automation = MockPageAutomation::new();
        automation
            .expect_goto()
            .returning(|url| Err(AutomationError::navigation(url, "connection refused")));

        let crawler = CatalogCrawler::new(
            automation,
            Arc::new(ProductStore::new()),
            CrawlerConfig::new(),
        );
        let err = crawler
            .run("https://shop.test/", &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "navigation");
    }

    #[tokio::test]
    async fn test_next_control_without_href_is_navigation_error() {
        let source = FixturePageSource::new().with_page(
            "https://shop.test/",
            r#"<ul id="pages" class="pagination"><li><a rel="next">»</a></li></ul>"#,
        );
        let crawler = CatalogCrawler::new(
            HtmlPageAutomation::new(source),
            Arc::new(ProductStore::new()),
            CrawlerConfig::new(),
        );

        let err = crawler
            .run("https://shop.test/", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CrawlError::Navigation(AutomationError::Navigation { .. })));
    }
}
