//! In-memory page source.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::automation::{FetchedPage, PageSource};
use crate::errors::AutomationError;

#[derive(Debug, Default)]
struct FixtureState {
    pages: HashMap<String, String>,
    fetched: Vec<String>,
}

/// A page source that serves fixture HTML by exact URL and records every
/// fetch.
///
/// Clones share state, so a test can keep one handle while the automation
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct FixturePageSource {
    state: Arc<Mutex<FixtureState>>,
}

impl FixturePageSource {
    /// Creates a source with no pages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page.
    #[must_use]
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.set_page(url, html);
        self
    }

    /// Adds or replaces a page.
    pub fn set_page(&self, url: impl Into<String>, html: impl Into<String>) {
        self.state.lock().pages.insert(url.into(), html.into());
    }

    /// Removes a page; later fetches of it fail.
    pub fn remove_page(&self, url: &str) {
        self.state.lock().pages.remove(url);
    }

    /// Every URL fetched, in order.
    #[must_use]
    pub fn fetched_urls(&self) -> Vec<String> {
        self.state.lock().fetched.clone()
    }

    /// How many times `url` was fetched.
    #[must_use]
    pub fn fetch_count(&self, url: &str) -> usize {
        self.state.lock().fetched.iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl PageSource for FixturePageSource {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, AutomationError> {
        let mut state = self.state.lock();
        state.fetched.push(url.to_string());
        let body = state
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| AutomationError::navigation(url, "no fixture page"))?;
        drop(state);

        Ok(FetchedPage {
            final_url: url.to_string(),
            status_code: 200,
            body,
            duration_ms: 0.0,
        })
    }
}
