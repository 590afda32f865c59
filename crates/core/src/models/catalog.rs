//! Product catalog records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, VariantId};

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// URL-safe name, see [`slugify`].
    pub slug: String,
    pub description: String,
    /// Price before any variant adjustment, in rupees.
    pub base_price: Decimal,
    pub category: String,
    pub image_url: String,
    pub stock_quantity: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A purchasable color/size combination of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct ProductVariant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub color: String,
    pub size: String,
    pub stock_quantity: i32,
    /// Added to the product's base price; may be negative.
    pub price_adjustment: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl ProductVariant {
    /// Sellable unit price for this variant of `product`.
    #[must_use]
    pub fn unit_price(&self, product: &Product) -> Decimal {
        product.base_price.saturating_add(self.price_adjustment)
    }

    /// Display name such as `Black - M`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.color, self.size)
    }
}

/// A product together with its variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub variants: Vec<ProductVariant>,
}

/// Derive a URL slug from a product name.
///
/// Lowercases, turns each whitespace run into `-`, and drops everything
/// outside `[a-z0-9-]`.
///
/// ```
/// use i1fashion_core::slugify;
///
/// assert_eq!(slugify("Linen Kurta (Indigo)"), "linen-kurta-indigo");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for c in name.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            slug.push(c);
        }
    }
    slug
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Classic Cotton Tee"), "classic-cotton-tee");
        assert_eq!(slugify("  Denim   Jacket "), "-denim-jacket-");
        assert_eq!(slugify("Kurta & Palazzo Set!"), "kurta--palazzo-set");
        assert_eq!(slugify("Sale-2026"), "sale-2026");
        assert_eq!(slugify("Café Dress"), "caf-dress");
    }

    #[test]
    fn test_variant_unit_price() {
        let now = Utc::now();
        let product = Product {
            id: ProductId::generate(),
            name: "Tee".to_string(),
            slug: "tee".to_string(),
            description: String::new(),
            base_price: Decimal::new(499, 0),
            category: "tops".to_string(),
            image_url: String::new(),
            stock_quantity: 10,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let variant = ProductVariant {
            id: VariantId::generate(),
            product_id: product.id,
            color: "Black".to_string(),
            size: "XL".to_string(),
            stock_quantity: 3,
            price_adjustment: Decimal::new(50, 0),
            is_active: true,
            created_at: now,
        };

        assert_eq!(variant.unit_price(&product), Decimal::new(549, 0));
        assert_eq!(variant.display_name(), "Black - XL");
    }
}
