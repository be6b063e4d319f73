//! Protocol traits for page automation.
//!
//! [`PageAutomation`] is the capability the crawler and extractor drive: one
//! shared browsing context with a single current page. [`PageSource`] is the
//! transport underneath an HTML-backed implementation.

use async_trait::async_trait;
use std::time::Duration;

use super::node::NodeHandle;
use crate::errors::AutomationError;

/// Result of fetching a page from a [`PageSource`].
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects.
    pub final_url: String,
    /// HTTP status code.
    pub status_code: u16,
    /// Response body as text.
    pub body: String,
    /// Time taken to fetch in milliseconds.
    pub duration_ms: f64,
}

impl FetchedPage {
    /// Whether the fetch was successful (2xx status).
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Protocol for retrieving raw page HTML.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetches a URL.
    async fn fetch(&self, url: &str) -> Result<FetchedPage, AutomationError>;
}

/// Protocol for driving a browsing context.
///
/// Every method is a suspension point. Implementations keep one current page;
/// page-scoped queries run against whatever `goto` loaded last.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageAutomation: Send + Sync {
    /// Loads `url` and makes it the current page.
    async fn goto(&self, url: &str) -> Result<(), AutomationError>;

    /// URL of the current page, if one is loaded.
    fn current_url(&self) -> Option<String>;

    /// First element of the current page matching `selector`.
    async fn query_selector(&self, selector: &str) -> Result<Option<NodeHandle>, AutomationError>;

    /// All elements of the current page matching `selector`.
    async fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeHandle>, AutomationError>;

    /// First descendant of `node` matching `selector`.
    async fn query_selector_in(
        &self,
        node: &NodeHandle,
        selector: &str,
    ) -> Result<Option<NodeHandle>, AutomationError>;

    /// All descendants of `node` matching `selector`.
    async fn query_selector_all_in(
        &self,
        node: &NodeHandle,
        selector: &str,
    ) -> Result<Vec<NodeHandle>, AutomationError>;

    /// Suspends until `selector` matches on the current page, or fails with
    /// [`AutomationError::Timeout`] once `timeout` has elapsed.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), AutomationError>;
}

/// Evaluation helpers available on every [`PageAutomation`].
#[async_trait]
pub trait PageAutomationExt: PageAutomation {
    /// Runs `f` against `node` and returns its value.
    async fn evaluate<T, F>(&self, node: &NodeHandle, f: F) -> T
    where
        T: Send,
        F: FnOnce(&NodeHandle) -> T + Send,
    {
        f(node)
    }

    /// Runs `f` against the first match of `selector`; `Ok(None)` when nothing
    /// matches.
    async fn eval_selector<T, F>(&self, selector: &str, f: F) -> Result<Option<T>, AutomationError>
    where
        T: Send,
        F: FnOnce(&NodeHandle) -> T + Send,
    {
        match self.query_selector(selector).await? {
            Some(node) => Ok(Some(self.evaluate(&node, f).await)),
            None => Ok(None),
        }
    }

    /// Runs `f` against every match of `selector`, in document order.
    async fn eval_selector_all<T, F>(&self, selector: &str, f: F) -> Result<Vec<T>, AutomationError>
    where
        T: Send,
        F: FnMut(&NodeHandle) -> T + Send,
    {
        let nodes = self.query_selector_all(selector).await?;
        Ok(nodes.iter().map(f).collect())
    }
}

impl<A: PageAutomation + ?Sized> PageAutomationExt for A {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetched_page_is_success() {
        let ok = FetchedPage {
            final_url: "https://example.com".to_string(),
            status_code: 200,
            body: String::new(),
            duration_ms: 1.0,
        };
        assert!(ok.is_success());

        let not_found = FetchedPage {
            status_code: 404,
            ..ok.clone()
        };
        assert!(!not_found.is_success());

        let redirect = FetchedPage {
            status_code: 301,
            ..ok
        };
        assert!(!redirect.is_success());
    }

    #[tokio::test]
    async fn test_eval_selector_none_when_absent() {
        let mut automation = MockPageAutomation::new();
        automation
            .expect_query_selector()
            .returning(|_| Ok(None));

        let value = automation
            .eval_selector("span#missing", |n| n.text_content().to_string())
            .await
            .unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_eval_selector_propagates_errors() {
        let mut automation = MockPageAutomation::new();
        automation
            .expect_query_selector_all()
            .returning(|_| Err(AutomationError::NoPageLoaded));

        let err = automation
            .eval_selector_all(".list_product_a", |n| n.tag_name().to_string())
            .await
            .unwrap_err();
        assert_eq!(err, AutomationError::NoPageLoaded);
    }
}
