//! HTTP surface over the product store.
//!
//! This module provides:
//! - `GET /products` filtered by [`ProductQuery`](crate::query::ProductQuery)
//! - `GET /status` with the crawl status and product count
//! - `GET /health`

mod routes;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::store::ProductStore;

pub use routes::{health_handler, products_handler, status_handler, HealthResponse, StatusResponse};

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Products collected so far.
    pub store: Arc<ProductStore>,
}

/// Builds the router.
pub fn build_app(store: Arc<ProductStore>) -> Router {
    Router::new()
        .route("/products", get(products_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { store })
}
