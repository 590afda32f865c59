//! Cart lines.

use i1fashion_core::{CartItemId, NewOrderItem, Product, ProductId, ProductVariant, VariantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One cart line with a snapshot of the product and variant it was added from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub variant_id: VariantId,
    /// Always at least 1 while the line exists.
    pub quantity: u32,
    pub product: Product,
    pub variant: ProductVariant,
}

impl CartItem {
    /// A new line for `quantity` units of `variant`. A zero quantity becomes 1.
    #[must_use]
    pub fn new(product: Product, variant: ProductVariant, quantity: u32) -> Self {
        Self {
            id: CartItemId::generate(),
            product_id: product.id,
            variant_id: variant.id,
            quantity: quantity.max(1),
            product,
            variant,
        }
    }

    /// `base_price + price_adjustment`.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.variant.unit_price(&self.product)
    }

    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price().saturating_mul(Decimal::from(self.quantity))
    }

    /// Whether this line holds the same product and variant as `other`.
    #[must_use]
    pub fn same_sku(&self, other: &Self) -> bool {
        self.product_id == other.product_id && self.variant_id == other.variant_id
    }

    /// Freeze this line into an order item.
    #[must_use]
    pub fn to_order_item(&self) -> NewOrderItem {
        NewOrderItem {
            product_id: self.product_id,
            variant_id: self.variant_id,
            product_name: self.product.name.clone(),
            variant_color: self.variant.color.clone(),
            variant_size: self.variant.size.clone(),
            quantity: i32::try_from(self.quantity).unwrap_or(i32::MAX),
            unit_price: self.unit_price(),
            image_url: Some(self.product.image_url.clone()).filter(|url| !url.is_empty()),
        }
    }
}
