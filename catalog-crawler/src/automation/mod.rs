//! Page automation: the browsing capability the crawl drives.
//!
//! This module provides:
//! - The [`PageAutomation`] protocol and its evaluation helpers
//! - [`NodeHandle`] element snapshots
//! - An HTML-backed implementation over a pluggable [`PageSource`]
//! - An HTTP page source

mod html;
mod http;
mod node;
mod protocols;

pub use html::HtmlPageAutomation;
pub use http::HttpPageSource;
pub use node::NodeHandle;
pub use protocols::{FetchedPage, PageAutomation, PageAutomationExt, PageSource};

#[cfg(test)]
pub use protocols::MockPageAutomation;
