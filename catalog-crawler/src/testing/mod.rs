//! Testing utilities for catalog crawls.
//!
//! This module provides:
//! - An in-memory [`PageSource`](crate::automation::PageSource) serving fixture HTML
//! - Builders for listing and product detail pages matching the default selectors
//! - Product record fixtures

mod fixtures;
mod mocks;

pub use fixtures::{product_fixture, DetailPage, ListingPage};
pub use mocks::FixturePageSource;
