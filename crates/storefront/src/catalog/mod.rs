//! Cached catalog reads for the storefront.
//!
//! Product lists and details are cached using `moka` with a 5-minute TTL.
//! Edits made through the admin API show up here once the entry expires.

mod cache;

use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument};

use i1fashion_core::{Product, ProductDetail, ProductId};

use crate::db::{ProductRepository, RepositoryError};
use cache::{CacheKey, CacheValue};

const CACHE_CAPACITY: u64 = 1000;
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Read-through cache over [`ProductRepository`].
#[derive(Clone)]
pub struct Catalog {
    cache: Cache<CacheKey, CacheValue>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Create an empty catalog cache.
    #[must_use]
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();
        Self { cache }
    }

    /// Active products, optionally limited to a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database read fails on a cache miss.
    #[instrument(skip(self, pool))]
    pub async fn products(
        &self,
        pool: &PgPool,
        category: Option<&str>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let key = CacheKey::Products {
            category: category.map(str::to_owned),
        };

        if let Some(CacheValue::Products(products)) = self.cache.get(&key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products = ProductRepository::new(pool).list_active(category).await?;
        self.cache
            .insert(key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// One active product with its active variants.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for missing or inactive products.
    #[instrument(skip(self, pool), fields(product_id = %id))]
    pub async fn product(
        &self,
        pool: &PgPool,
        id: ProductId,
    ) -> Result<ProductDetail, RepositoryError> {
        let key = CacheKey::Product(id);

        if let Some(CacheValue::Product(detail)) = self.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*detail);
        }

        let detail = ProductRepository::new(pool).get_active_detail(id).await?;
        self.cache
            .insert(key, CacheValue::Product(Box::new(detail.clone())))
            .await;

        Ok(detail)
    }

    /// Drop every cached entry.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;

    fn product(category: &str) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::generate(),
            name: "Block Print Kurta".to_string(),
            slug: "block-print-kurta".to_string(),
            description: String::new(),
            base_price: Decimal::new(1299, 0),
            category: category.to_string(),
            image_url: "/api/placeholder/400/500".to_string(),
            stock_quantity: 12,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_cached_products_skip_database() {
        // Never connects; a cache miss would fail.
        let pool = PgPool::connect_lazy("postgres://localhost:1/unreachable").unwrap();
        let catalog = Catalog::new();
        let cached = vec![product("kurtas")];
        catalog
            .cache
            .insert(
                CacheKey::Products {
                    category: Some("kurtas".to_string()),
                },
                CacheValue::Products(cached.clone()),
            )
            .await;

        let products = catalog.products(&pool, Some("kurtas")).await.unwrap();
        assert_eq!(products, cached);
    }

    #[tokio::test]
    async fn test_invalidate_all_empties_cache() {
        let catalog = Catalog::new();
        let key = CacheKey::Products { category: None };
        catalog
            .cache
            .insert(key.clone(), CacheValue::Products(vec![product("tops")]))
            .await;

        catalog.invalidate_all().await;

        assert!(catalog.cache.get(&key).await.is_none());
    }
}
