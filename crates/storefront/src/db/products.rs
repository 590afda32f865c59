//! Catalog queries. The storefront only ever sees active rows.

use sqlx::PgPool;

use i1fashion_core::{Product, ProductDetail, ProductId, ProductVariant};

use super::RepositoryError;

const PRODUCT_COLUMNS: &str = "id, name, slug, description, base_price, category, image_url, \
     stock_quantity, is_active, created_at, updated_at";

const VARIANT_COLUMNS: &str =
    "id, product_id, color, size, stock_quantity, price_adjustment, is_active, created_at";

/// Repository for catalog reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active products, newest first, optionally within one category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active AND ($1::text IS NULL OR category = $1) \
             ORDER BY created_at DESC"
        ))
        .bind(category)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Get an active product with its active variants.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is missing or inactive.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_active_detail(&self, id: ProductId) -> Result<ProductDetail, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND is_active"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let variants = sqlx::query_as::<_, ProductVariant>(&format!(
            "SELECT {VARIANT_COLUMNS} FROM product_variants \
             WHERE product_id = $1 AND is_active \
             ORDER BY color, size"
        ))
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(ProductDetail { product, variants })
    }
}
