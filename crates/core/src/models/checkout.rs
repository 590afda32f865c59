//! Checkout form and order submission payloads.
//!
//! Validation lives here so the client can reject a form before any network
//! call and the storefront can re-check the same rules on arrival.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Email, OrderNumber, PaymentMethod, ProductId, UserId, VariantId};

/// Country used when the form leaves it blank.
pub const DEFAULT_COUNTRY: &str = "India";

const AMOUNT_TOO_LARGE: &str = "Amount is too large";

/// A single failed form rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// All rules that failed for one submission, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    fn into_result(self) -> Result<(), Self> {
        if self.0.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Message for `field`, if that field failed.
    #[must_use]
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Contact and shipping details captured by the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_state: String,
    pub shipping_postal_code: String,
    #[serde(default = "default_country")]
    pub shipping_country: String,
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

fn too_short(value: &str, min: usize) -> bool {
    value.trim().chars().count() < min
}

impl ShippingDetails {
    /// Check every field against the checkout form rules.
    ///
    /// # Errors
    ///
    /// Returns every failing field, not just the first.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if too_short(&self.customer_name, 2) {
            errors.push("customer_name", "Name must be at least 2 characters");
        }
        if Email::parse(&self.customer_email).is_err() {
            errors.push("customer_email", "Please enter a valid email");
        }
        if too_short(&self.customer_phone, 10) {
            errors.push("customer_phone", "Phone number must be at least 10 digits");
        }
        if too_short(&self.shipping_address, 10) {
            errors.push("shipping_address", "Address must be at least 10 characters");
        }
        if too_short(&self.shipping_city, 2) {
            errors.push("shipping_city", "City is required");
        }
        if too_short(&self.shipping_state, 2) {
            errors.push("shipping_state", "State is required");
        }
        if too_short(&self.shipping_postal_code, 5) {
            errors.push(
                "shipping_postal_code",
                "Postal code must be at least 5 characters",
            );
        }

        errors.into_result()
    }

    /// Country to store, falling back to [`DEFAULT_COUNTRY`] when blank.
    #[must_use]
    pub fn country(&self) -> &str {
        let country = self.shipping_country.trim();
        if country.is_empty() {
            DEFAULT_COUNTRY
        } else {
            country
        }
    }
}

/// One cart line as submitted for ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub product_name: String,
    pub variant_color: String,
    pub variant_size: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub image_url: Option<String>,
}

impl NewOrderItem {
    /// `unit_price × quantity`, or `None` if the product does not fit a `Decimal`.
    #[must_use]
    pub fn total_price(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }

    /// Variant label stored on the order line, e.g. `Red - M`.
    #[must_use]
    pub fn variant_name(&self) -> String {
        format!("{} - {}", self.variant_color, self.variant_size)
    }
}

/// An order submission from a customer's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: UserId,
    /// Number proposed by the client; the server replaces it on collision.
    #[serde(default)]
    pub order_number: Option<OrderNumber>,
    pub items: Vec<NewOrderItem>,
    #[serde(flatten)]
    pub shipping: ShippingDetails,
    pub subtotal: Decimal,
    #[serde(default)]
    pub tax_amount: Decimal,
    #[serde(default)]
    pub shipping_amount: Decimal,
    #[serde(default)]
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

impl NewOrder {
    /// Sum of line totals, or `None` on overflow.
    #[must_use]
    pub fn items_subtotal(&self) -> Option<Decimal> {
        self.items
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.total_price()?))
    }

    /// `subtotal + tax + shipping - discount`, or `None` on overflow.
    #[must_use]
    pub fn expected_total(&self) -> Option<Decimal> {
        self.subtotal
            .checked_add(self.tax_amount)?
            .checked_add(self.shipping_amount)?
            .checked_sub(self.discount_amount)
    }

    /// Validate the shipping form, the lines and the totals.
    ///
    /// # Errors
    ///
    /// Returns every failing rule.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = self.shipping.validate().err().unwrap_or_default();

        if self.items.is_empty() {
            errors.push("items", "Order must contain at least one item");
        }
        for (index, item) in self.items.iter().enumerate() {
            if item.quantity < 1 {
                errors.push(
                    format!("items[{index}].quantity"),
                    "Quantity must be at least 1",
                );
            }
            if item.unit_price.is_sign_negative() {
                errors.push(
                    format!("items[{index}].unit_price"),
                    "Unit price cannot be negative",
                );
            }
            if item.total_price().is_none() {
                errors.push(format!("items[{index}].unit_price"), AMOUNT_TOO_LARGE);
            }
        }

        match self.items_subtotal() {
            Some(subtotal) if subtotal != self.subtotal => {
                errors.push("subtotal", "Subtotal does not match the items");
            }
            Some(_) => {}
            None => errors.push("subtotal", AMOUNT_TOO_LARGE),
        }
        match self.expected_total() {
            Some(total) if total != self.total_amount => {
                errors.push("total_amount", "Total does not match the subtotal");
            }
            Some(_) => {}
            None => errors.push("total_amount", AMOUNT_TOO_LARGE),
        }

        errors.into_result()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_details() -> ShippingDetails {
        ShippingDetails {
            customer_name: "Priya Sharma".to_string(),
            customer_email: "priya@example.in".to_string(),
            customer_phone: "9876543210".to_string(),
            shipping_address: "12 MG Road, Indiranagar".to_string(),
            shipping_city: "Bengaluru".to_string(),
            shipping_state: "Karnataka".to_string(),
            shipping_postal_code: "560038".to_string(),
            shipping_country: String::new(),
        }
    }

    fn line(quantity: i32, unit_price: i64) -> NewOrderItem {
        NewOrderItem {
            product_id: ProductId::generate(),
            variant_id: VariantId::generate(),
            product_name: "Linen Shirt".to_string(),
            variant_color: "White".to_string(),
            variant_size: "M".to_string(),
            quantity,
            unit_price: Decimal::from(unit_price),
            image_url: None,
        }
    }

    fn order(items: Vec<NewOrderItem>) -> NewOrder {
        let subtotal: Decimal = items
            .iter()
            .map(|item| item.total_price().unwrap())
            .sum();
        NewOrder {
            user_id: UserId::generate(),
            order_number: None,
            items,
            shipping: valid_details(),
            subtotal,
            tax_amount: Decimal::ZERO,
            shipping_amount: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            total_amount: subtotal,
            payment_method: PaymentMethod::CashOnDelivery,
        }
    }

    #[test]
    fn test_valid_details_pass() {
        assert!(valid_details().validate().is_ok());
    }

    #[test]
    fn test_each_rule_reports_its_field() {
        let details = ShippingDetails {
            customer_name: "P".to_string(),
            customer_email: "not-an-email".to_string(),
            customer_phone: "98765".to_string(),
            shipping_address: "Short".to_string(),
            shipping_city: "B".to_string(),
            shipping_state: " ".to_string(),
            shipping_postal_code: "5600".to_string(),
            shipping_country: String::new(),
        };

        let errors = details.validate().unwrap_err();
        assert_eq!(errors.0.len(), 7);
        assert_eq!(
            errors.message_for("customer_phone"),
            Some("Phone number must be at least 10 digits")
        );
        assert_eq!(errors.message_for("shipping_state"), Some("State is required"));
    }

    #[test]
    fn test_lengths_count_characters_not_bytes() {
        let mut details = valid_details();
        details.shipping_city = "पु".to_string();
        assert!(details.validate().is_ok());
    }

    #[test]
    fn test_country_defaults_to_india() {
        assert_eq!(valid_details().country(), "India");
        let details: ShippingDetails = serde_json::from_value(serde_json::json!({
            "customer_name": "A B",
            "customer_email": "a@b.co",
            "customer_phone": "1234567890",
            "shipping_address": "1234567890",
            "shipping_city": "Pune",
            "shipping_state": "MH",
            "shipping_postal_code": "411001"
        }))
        .unwrap();
        assert_eq!(details.shipping_country, "India");
    }

    #[test]
    fn test_new_order_totals() {
        let order = order(vec![line(2, 100), line(1, 250)]);
        assert_eq!(order.items_subtotal(), Some(Decimal::from(450)));
        assert!(order.validate().is_ok());
    }

    #[test]
    fn test_oversized_amounts_are_rejected() {
        let mut order = order(vec![line(1, 10)]);
        order.items[0].quantity = 1000;
        order.items[0].unit_price = Decimal::MAX;
        assert_eq!(order.items[0].total_price(), None);
        assert_eq!(order.items_subtotal(), None);

        let errors = order.validate().unwrap_err();
        assert_eq!(
            errors.message_for("items[0].unit_price"),
            Some("Amount is too large")
        );
        assert_eq!(errors.message_for("subtotal"), Some("Amount is too large"));
    }

    #[test]
    fn test_overflowing_line_sum_is_rejected() {
        let near_max = Decimal::MAX - Decimal::from(10);
        let mut order = order(vec![line(1, 10), line(1, 10)]);
        order.items[0].unit_price = near_max;
        order.items[1].unit_price = near_max;
        assert!(order.items[0].total_price().is_some());

        let errors = order.validate().unwrap_err();
        assert!(errors.message_for("items[0].unit_price").is_none());
        assert_eq!(errors.message_for("subtotal"), Some("Amount is too large"));
    }

    #[test]
    fn test_overflowing_total_is_rejected() {
        let mut order = order(vec![line(1, 10)]);
        order.shipping_amount = Decimal::MAX;
        let errors = order.validate().unwrap_err();
        assert_eq!(
            errors.message_for("total_amount"),
            Some("Amount is too large")
        );
    }

    #[test]
    fn test_new_order_rejects_empty_and_bad_lines() {
        let empty = order(vec![]);
        assert!(empty.validate().unwrap_err().message_for("items").is_some());

        let zero = order(vec![line(0, 100)]);
        assert!(
            zero.validate()
                .unwrap_err()
                .message_for("items[0].quantity")
                .is_some()
        );
    }

    #[test]
    fn test_new_order_rejects_tampered_total() {
        let mut order = order(vec![line(1, 999)]);
        order.total_amount = Decimal::from(1);
        let errors = order.validate().unwrap_err();
        assert_eq!(
            errors.message_for("total_amount"),
            Some("Total does not match the subtotal")
        );
    }

    #[test]
    fn test_new_order_flattens_shipping_fields() {
        let order = order(vec![line(1, 10)]);
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["customer_name"], "Priya Sharma");
        assert!(json.get("shipping").is_none());
        assert_eq!(json["payment_method"], "cash_on_delivery");
    }

    #[test]
    fn test_item_variant_name() {
        assert_eq!(line(1, 10).variant_name(), "White - M");
    }
}
