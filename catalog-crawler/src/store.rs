//! Process-wide product collection.
//!
//! The crawl task is the only writer and appends one product at a time; the
//! query layer reads snapshots, so a request made mid-crawl sees an in-order
//! prefix of the final list. The crawl status lives beside the products.

use parking_lot::RwLock;

use crate::crawl::CrawlStatus;
use crate::extract::Product;

/// Append-only product collection plus the crawl status.
#[derive(Debug, Default)]
pub struct ProductStore {
    products: RwLock<Vec<Product>>,
    status: RwLock<CrawlStatus>,
}

impl ProductStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a product.
    pub fn append(&self, product: Product) {
        self.products.write().push(product);
    }

    /// Number of products held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.read().len()
    }

    /// Whether no products are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.read().is_empty()
    }

    /// An in-order copy of the products.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Product> {
        self.products.read().clone()
    }

    /// Runs `f` against the products without copying them.
    pub fn with_products<T>(&self, f: impl FnOnce(&[Product]) -> T) -> T {
        f(&self.products.read())
    }

    /// Current crawl status.
    #[must_use]
    pub fn status(&self) -> CrawlStatus {
        self.status.read().clone()
    }

    /// Replaces the crawl status.
    pub fn set_status(&self, status: CrawlStatus) {
        *self.status.write() = status;
    }
}
