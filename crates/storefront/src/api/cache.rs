//! Cache types for QKart API responses.

use std::sync::Arc;

use qkart_core::Product;

/// Cache key for backend responses.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    /// The full product list from `GET /products`.
    Catalog,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Catalog(Arc<Vec<Product>>),
}
