use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;
use tracing::{debug, warn};

use super::AppState;
use crate::crawl::CrawlStatus;
use crate::extract::Product;
use crate::query::{filter_products, ProductQuery};

/// Body of `GET /status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Current crawl status.
    pub crawl: CrawlStatus,
    /// Products currently held.
    pub products_held: usize,
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

/// Lists stored products matching the query parameters.
///
/// Always answers 200. Parameters that cannot be read as a query (a
/// repeated key, for instance) match nothing.
pub async fn products_handler(
    State(state): State<AppState>,
    query: Result<Query<ProductQuery>, QueryRejection>,
) -> Json<Vec<Product>> {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            warn!(error = %rejection, "Unreadable product query");
            return Json(Vec::new());
        }
    };

    let products = state
        .store
        .with_products(|products| filter_products(products, &query));
    debug!(matched = products.len(), ?query, "Filtered products");
    Json(products)
}

/// Reports the crawl status.
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        crawl: state.store.status(),
        products_held: state.store.len(),
    })
}

/// Liveness check.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
