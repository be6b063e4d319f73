//! Error types for the catalog crawler.
//!
//! Failures are layered the same way the crawl is: the page automation layer
//! reports [`AutomationError`], the product extractor wraps those (or reports a
//! missing required element) as [`ExtractionError`], and the crawler surfaces
//! everything that stops a crawl as [`CrawlError`].

use thiserror::Error;

/// An error raised by a page automation backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AutomationError {
    /// A page could not be loaded.
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// The URL that failed to load.
        url: String,
        /// Transport-level failure description.
        message: String,
    },

    /// A selector never appeared within the allowed time.
    #[error("Timed out after {waited_ms} ms waiting for selector '{selector}'")]
    Timeout {
        /// The selector being waited on.
        selector: String,
        /// How long the wait lasted.
        waited_ms: u64,
    },

    /// A CSS selector could not be parsed.
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector {
        /// The offending selector.
        selector: String,
        /// Parser message.
        message: String,
    },

    /// A page-scoped operation was attempted before any navigation.
    #[error("No page has been loaded yet")]
    NoPageLoaded,
}

impl AutomationError {
    /// Creates a navigation error.
    #[must_use]
    pub fn navigation(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid selector error.
    #[must_use]
    pub fn invalid_selector(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            message: message.into(),
        }
    }
}

/// Error raised when a product record cannot be extracted from a detail page.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    /// A required field's element is absent from the page.
    #[error("Required field '{field}' not found (selector '{selector}')")]
    MissingElement {
        /// Name of the product field.
        field: &'static str,
        /// Selector that matched nothing.
        selector: String,
    },

    /// The automation backend failed while extracting.
    #[error(transparent)]
    Automation(#[from] AutomationError),
}

impl ExtractionError {
    /// Creates a missing-element error.
    #[must_use]
    pub fn missing(field: &'static str, selector: impl Into<String>) -> Self {
        Self::MissingElement {
            field,
            selector: selector.into(),
        }
    }
}

/// The main error type for a crawl run.
///
/// Any of these ends the crawl; products appended before the failure stay in
/// the store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CrawlError {
    /// A detail page did not yield a complete product record.
    #[error("Extraction failed for {url}: {source}")]
    Extraction {
        /// The detail page URL.
        url: String,
        /// The underlying extraction failure.
        #[source]
        source: ExtractionError,
    },

    /// A listing page or detail page could not be loaded or waited on.
    #[error("{0}")]
    Navigation(#[from] AutomationError),

    /// The crawl was cancelled through its token.
    #[error("Crawl cancelled: {0}")]
    Cancelled(String),
}

impl CrawlError {
    /// Returns a short machine-readable kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Extraction { .. } => "extraction",
            Self::Navigation(_) => "navigation",
            Self::Cancelled(_) => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_element_message() {
        let err = ExtractionError::missing("productName", "h2.title-1");
        assert_eq!(
            err.to_string(),
            "Required field 'productName' not found (selector 'h2.title-1')"
        );
    }

    #[test]
    fn test_automation_error_converts_into_extraction_error() {
        let err: ExtractionError = AutomationError::NoPageLoaded.into();
        assert_eq!(err.to_string(), "No page has been loaded yet");
    }

    #[test]
    fn test_crawl_error_kind() {
        let extraction = CrawlError::Extraction {
            url: "https://example.com/p/1".to_string(),
            source: ExtractionError::missing("productId", "span#barcode"),
        };
        assert_eq!(extraction.kind(), "extraction");
        assert!(extraction.to_string().contains("https://example.com/p/1"));

        let navigation: CrawlError = AutomationError::navigation("https://x", "refused").into();
        assert_eq!(navigation.kind(), "navigation");
        assert_eq!(
            navigation.to_string(),
            "Navigation to https://x failed: refused"
        );

        assert_eq!(CrawlError::Cancelled("shutdown".into()).kind(), "cancelled");
    }
}
