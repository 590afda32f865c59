//! Product variant administration.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use i1fashion_core::{ProductId, ProductVariant, VariantId};

use super::{RepositoryError, conflict_on_unique};

const VARIANT_COLUMNS: &str =
    "id, product_id, color, size, stock_quantity, price_adjustment, is_active, created_at";

const DUPLICATE_VARIANT: &str = "This product already has a variant with that color and size";

/// A validated variant ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVariant {
    pub color: String,
    pub size: String,
    pub stock_quantity: i32,
    pub price_adjustment: Decimal,
    pub is_active: bool,
}

/// Variant fields to change. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantChanges {
    pub color: Option<String>,
    pub size: Option<String>,
    pub stock_quantity: Option<i32>,
    pub price_adjustment: Option<Decimal>,
    pub is_active: Option<bool>,
}

/// Repository for product variants.
pub struct VariantRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VariantRepository<'a> {
    /// Create a new variant repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All variants of a product, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductVariant>, RepositoryError> {
        let variants = sqlx::query_as::<_, ProductVariant>(&format!(
            "SELECT {VARIANT_COLUMNS} FROM product_variants \
             WHERE product_id = $1 ORDER BY color, size"
        ))
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(variants)
    }

    /// Add a variant to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` if the color/size pair is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, variant), fields(product_id = %product_id))]
    pub async fn create(
        &self,
        product_id: ProductId,
        variant: &NewVariant,
    ) -> Result<ProductVariant, RepositoryError> {
        sqlx::query_as::<_, ProductVariant>(&format!(
            "INSERT INTO product_variants (id, product_id, color, size, stock_quantity, \
                 price_adjustment, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {VARIANT_COLUMNS}"
        ))
        .bind(VariantId::generate())
        .bind(product_id)
        .bind(&variant.color)
        .bind(&variant.size)
        .bind(variant.stock_quantity)
        .bind(variant.price_adjustment)
        .bind(variant.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_foreign_key_violation() {
                    return RepositoryError::NotFound;
                }
            }
            conflict_on_unique(e, DUPLICATE_VARIANT)
        })
    }

    /// Apply `changes` to a variant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no variant has this ID.
    /// Returns `RepositoryError::Conflict` if the new color/size pair is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, changes), fields(variant_id = %id))]
    pub async fn update(
        &self,
        id: VariantId,
        changes: &VariantChanges,
    ) -> Result<ProductVariant, RepositoryError> {
        sqlx::query_as::<_, ProductVariant>(&format!(
            "UPDATE product_variants SET \
                 color = COALESCE($2, color), \
                 size = COALESCE($3, size), \
                 stock_quantity = COALESCE($4, stock_quantity), \
                 price_adjustment = COALESCE($5, price_adjustment), \
                 is_active = COALESCE($6, is_active) \
             WHERE id = $1 \
             RETURNING {VARIANT_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.color.as_deref())
        .bind(changes.size.as_deref())
        .bind(changes.stock_quantity)
        .bind(changes.price_adjustment)
        .bind(changes.is_active)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_VARIANT))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a variant. Order lines referencing it keep their snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no variant has this ID.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(variant_id = %id))]
    pub async fn delete(&self, id: VariantId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM product_variants WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
