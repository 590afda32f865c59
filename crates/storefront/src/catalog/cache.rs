//! Cache types for catalog reads.

use i1fashion_core::{Product, ProductDetail, ProductId};

/// Cache key for product lists and details.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products { category: Option<String> },
    Product(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
    Product(Box<ProductDetail>),
}
