//! HTTP page source backed by `reqwest`.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Instant;
use tracing::{debug, warn};

use super::protocols::{FetchedPage, PageSource};
use crate::config::FetchConfig;
use crate::errors::AutomationError;

/// Fetches pages over HTTP.
///
/// Non-2xx responses are returned as loaded pages, the way a browser renders
/// an error page; only transport failures become errors.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: reqwest::Client,
    config: FetchConfig,
}

impl HttpPageSource {
    /// Builds a source from a fetch configuration.
    pub fn new(config: FetchConfig) -> Result<Self, AutomationError> {
        let mut headers = HeaderMap::new();
        for (key, value) in &config.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| AutomationError::navigation(key.as_str(), format!("invalid header name: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| AutomationError::navigation(key.as_str(), format!("invalid header value: {e}")))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .default_headers(headers)
            .build()
            .map_err(|e| AutomationError::navigation("", format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Gets the configuration.
    #[must_use]
    pub const fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, AutomationError> {
        let started = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AutomationError::navigation(url, e.to_string()))?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| AutomationError::navigation(url, e.to_string()))?;
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        let page = FetchedPage {
            final_url,
            status_code,
            body,
            duration_ms,
        };
        if page.is_success() {
            debug!(url, status_code, duration_ms, "Fetched page");
        } else {
            warn!(url, status_code, "Page loaded with non-success status");
        }
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_with_headers() {
        let config = FetchConfig::new().with_header("Accept-Language", "pt-BR");
        let source = HttpPageSource::new(config).unwrap();
        assert_eq!(source.config().headers.len(), 1);
    }

    #[test]
    fn test_new_rejects_invalid_header() {
        let config = FetchConfig::new().with_header("bad header", "x");
        let err = HttpPageSource::new(config).unwrap_err();
        assert!(matches!(err, AutomationError::Navigation { .. }));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_navigation_error() {
        let source = HttpPageSource::new(FetchConfig::new().with_timeout(2.0)).unwrap();
        let err = source.fetch("http://127.0.0.1:1/").await.unwrap_err();
        match err {
            AutomationError::Navigation { url, .. } => assert_eq!(url, "http://127.0.0.1:1/"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
