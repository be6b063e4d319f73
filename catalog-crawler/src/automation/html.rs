//! HTML-backed page automation.
//!
//! [`HtmlPageAutomation`] loads pages through a [`PageSource`] and answers
//! selector queries from the parsed markup. It does not execute scripts, so
//! it suits catalogs that render server-side.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use super::node::{self, NodeHandle};
use super::protocols::{PageAutomation, PageSource};
use crate::errors::AutomationError;

#[derive(Debug, Clone)]
struct LoadedPage {
    url: String,
    document: Arc<str>,
}

/// A single browsing context over static HTML.
#[derive(Debug)]
pub struct HtmlPageAutomation<S> {
    source: S,
    current: Mutex<Option<LoadedPage>>,
    poll_interval: Duration,
}

impl<S: PageSource> HtmlPageAutomation<S> {
    /// Default delay between `wait_for_selector` polls.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

    /// Creates a context with no page loaded.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            current: Mutex::new(None),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
        }
    }

    /// Sets the delay between `wait_for_selector` polls.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Returns the page source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    fn page(&self) -> Result<LoadedPage, AutomationError> {
        self.current.lock().clone().ok_or(AutomationError::NoPageLoaded)
    }

    async fn load(&self, url: &str) -> Result<(), AutomationError> {
        let fetched = self.source.fetch(url).await?;
        *self.current.lock() = Some(LoadedPage {
            url: fetched.final_url,
            document: Arc::from(fetched.body),
        });
        Ok(())
    }
}

#[async_trait]
impl<S: PageSource> PageAutomation for HtmlPageAutomation<S> {
    async fn goto(&self, url: &str) -> Result<(), AutomationError> {
        debug!(url, "Navigating");
        self.load(url).await
    }

    fn current_url(&self) -> Option<String> {
        self.current.lock().as_ref().map(|page| page.url.clone())
    }

    async fn query_selector(&self, selector: &str) -> Result<Option<NodeHandle>, AutomationError> {
        let page = self.page()?;
        Ok(node::select_in_document(&page.document, selector, true)?
            .into_iter()
            .next())
    }

    async fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeHandle>, AutomationError> {
        let page = self.page()?;
        node::select_in_document(&page.document, selector, false)
    }

    async fn query_selector_in(
        &self,
        node: &NodeHandle,
        selector: &str,
    ) -> Result<Option<NodeHandle>, AutomationError> {
        Ok(node.select(selector, true)?.into_iter().next())
    }

    async fn query_selector_all_in(
        &self,
        node: &NodeHandle,
        selector: &str,
    ) -> Result<Vec<NodeHandle>, AutomationError> {
        node.select(selector, false)
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), AutomationError> {
        node::parse_selector(selector)?;
        let started = Instant::now();
        loop {
            let page = self.page()?;
            if node::document_matches(&page.document, selector)? {
                trace!(selector, "Selector present");
                return Ok(());
            }

            let elapsed = started.elapsed();
            if elapsed >= timeout {
                return Err(AutomationError::Timeout {
                    selector: selector.to_string(),
                    waited_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                });
            }

            tokio::time::sleep(self.poll_interval.min(timeout - elapsed)).await;
            self.load(&page.url).await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::PageAutomationExt;
    use crate::testing::FixturePageSource;
    use pretty_assertions::assert_eq;

    fn automation(source: FixturePageSource) -> HtmlPageAutomation<FixturePageSource> {
        HtmlPageAutomation::new(source).with_poll_interval(Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_queries_before_navigation_fail() {
        let automation = automation(FixturePageSource::new());
        assert_eq!(automation.current_url(), None);
        assert_eq!(
            automation.query_selector("a").await.unwrap_err(),
            AutomationError::NoPageLoaded
        );
    }

    #[tokio::test]
    async fn test_goto_then_query() {
        let source = FixturePageSource::new()
            .with_page("https://shop.test/", "<a class='x' href='/a'>A</a><a class='x' href='/b'>B</a>");
        let automation = automation(source);

        automation.goto("https://shop.test/").await.unwrap();
        assert_eq!(automation.current_url().as_deref(), Some("https://shop.test/"));

        let first = automation.query_selector("a.x").await.unwrap().unwrap();
        assert_eq!(first.attribute("href"), Some("/a"));

        let hrefs = automation
            .eval_selector_all("a.x", |n| n.attribute("href").unwrap_or_default().to_string())
            .await
            .unwrap();
        assert_eq!(hrefs, vec!["/a", "/b"]);
        assert!(automation.query_selector("p").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_goto_unknown_page_is_navigation_error() {
        let automation = automation(FixturePageSource::new());
        let err = automation.goto("https://shop.test/missing").await.unwrap_err();
        assert!(matches!(err, AutomationError::Navigation { .. }));
    }

    #[tokio::test]
    async fn test_scoped_queries() {
        let source = FixturePageSource::new().with_page(
            "https://shop.test/",
            "<ul id='one'><li><img src='a.svg'></li></ul><ul id='two'><li><img src='b.svg'></li></ul>",
        );
        let automation = automation(source);
        automation.goto("https://shop.test/").await.unwrap();

        let lists = automation.query_selector_all("ul").await.unwrap();
        let img = automation
            .query_selector_in(&lists[1], "li > img")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(img.attribute("src"), Some("b.svg"));

        let all = automation.query_selector_all_in(&lists[0], "img").await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_wait_for_present_selector() {
        let source = FixturePageSource::new()
            .with_page("https://shop.test/", "<div class='tabs content active'></div>");
        let automation = automation(source);
        automation.goto("https://shop.test/").await.unwrap();

        automation
            .wait_for_selector(".tabs.content.active", Duration::from_millis(50))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_for_absent_selector_times_out() {
        let source = FixturePageSource::new().with_page("https://shop.test/", "<div></div>");
        let automation = automation(source.clone());
        automation.goto("https://shop.test/").await.unwrap();

        let err = automation
            .wait_for_selector(".tabs.content.active", Duration::from_millis(30))
            .await
            .unwrap_err();
        assert!(matches!(err, AutomationError::Timeout { .. }));
        // polling reloads the current page
        assert!(source.fetch_count("https://shop.test/") > 1);
    }
}
