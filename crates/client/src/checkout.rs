//! Turning the cart into a placed order.
//!
//! [`place_order`] validates the form locally, builds a [`NewOrder`] from the
//! cart and hands it to an [`OrderGateway`]. The cart is only cleared once the
//! gateway confirms the order; any failure leaves it untouched so the shopper
//! can retry.

use std::future::Future;
use std::time::Duration;

use i1fashion_core::{
    NewOrder, OrderNumber, OrderSummary, PaymentMethod, ShippingDetails, UserId, ValidationErrors,
};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::ApiError;
use crate::clock::Clock;
use crate::storage::DeviceStorage;
use crate::store::{CartItem, ClientStore};

/// How long the success screen shows before moving to the confirmation page.
pub const REDIRECT_DELAY: Duration = Duration::from_millis(1500);

/// Where the shopper is sent when checkout needs a sign-in.
pub const LOGIN_REDIRECT: &str = "/auth/login?redirect=/checkout";

/// Something that can create orders.
pub trait OrderGateway {
    /// Submit `order` and return what was stored.
    fn submit_order(
        &self,
        order: &NewOrder,
    ) -> impl Future<Output = Result<OrderSummary, ApiError>> + Send;
}

/// Where the checkout screen is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CheckoutStep {
    #[default]
    Form,
    Processing,
    Success,
}

/// Why an order was not placed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("Please sign in to place your order")]
    NotSignedIn,

    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Failed to place order. Please try again.")]
    Failed(#[source] ApiError),
}

/// A confirmed order and where to go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order: OrderSummary,
    /// Path of the confirmation page, e.g. `/order-success?order=ORD-20260315-0427`.
    pub confirmation_path: String,
    pub redirect_delay: Duration,
}

impl PlacedOrder {
    fn new(order: OrderSummary) -> Self {
        let confirmation_path = format!(
            "/order-success?order={}",
            urlencoding::encode(order.order_number.as_str())
        );
        Self {
            order,
            confirmation_path,
            redirect_delay: REDIRECT_DELAY,
        }
    }

    #[must_use]
    pub const fn order_number(&self) -> &OrderNumber {
        &self.order.order_number
    }
}

/// Build the order the cart would place, without submitting it.
///
/// Totals are the cart's line totals; tax, shipping and discount are zero.
#[must_use]
pub fn build_order<'a>(
    user_id: UserId,
    lines: impl IntoIterator<Item = &'a CartItem>,
    details: &ShippingDetails,
    order_number: OrderNumber,
) -> NewOrder {
    let mut shipping = details.clone();
    shipping.shipping_country = details.country().to_string();

    let mut order = NewOrder {
        user_id,
        order_number: Some(order_number),
        items: lines.into_iter().map(CartItem::to_order_item).collect(),
        shipping,
        subtotal: Decimal::ZERO,
        tax_amount: Decimal::ZERO,
        shipping_amount: Decimal::ZERO,
        discount_amount: Decimal::ZERO,
        total_amount: Decimal::ZERO,
        payment_method: PaymentMethod::CashOnDelivery,
    };
    // An overflowing cart keeps a zero subtotal, which `NewOrder::validate` rejects.
    if let Some(subtotal) = order.items_subtotal() {
        order.subtotal = subtotal;
        order.total_amount = subtotal;
    }
    order
}

/// Place an order for everything in the cart.
///
/// The form is checked before anything else and an invalid form never reaches
/// the gateway. An expired session is signed out and reported as
/// [`CheckoutError::NotSignedIn`].
///
/// # Errors
///
/// Returns `CheckoutError` when the form is invalid, nobody is signed in, the
/// cart is empty, or the gateway rejects the order. The cart is unchanged in
/// every error case.
#[instrument(skip_all)]
pub async fn place_order<S, C, G>(
    store: &mut ClientStore<S, C>,
    details: &ShippingDetails,
    gateway: &G,
) -> Result<PlacedOrder, CheckoutError>
where
    S: DeviceStorage,
    C: Clock,
    G: OrderGateway,
{
    details.validate()?;

    if !store.check_session_expiry() {
        return Err(CheckoutError::NotSignedIn);
    }
    let user_id = match &store.state().user {
        Some(user) if store.state().is_authenticated => user.id,
        _ => return Err(CheckoutError::NotSignedIn),
    };
    if store.state().cart_items.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let order_number = OrderNumber::generate(store.clock().now());
    let order = build_order(user_id, &store.state().cart_items, details, order_number);
    order.validate()?;

    match gateway.submit_order(&order).await {
        Ok(summary) => {
            info!(order_number = %summary.order_number, "order placed");
            store.clear_cart();
            Ok(PlacedOrder::new(summary))
        }
        Err(e) => {
            warn!(error = %e, "order placement failed, cart kept");
            Err(CheckoutError::Failed(e))
        }
    }
}

/// Checkout screen state around [`place_order`].
#[derive(Debug, Default)]
pub struct CheckoutFlow {
    step: CheckoutStep,
}

impl CheckoutFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Run [`place_order`], moving to `Success` on success and back to `Form`
    /// on any failure.
    ///
    /// # Errors
    ///
    /// See [`place_order`].
    pub async fn submit<S, C, G>(
        &mut self,
        store: &mut ClientStore<S, C>,
        details: &ShippingDetails,
        gateway: &G,
    ) -> Result<PlacedOrder, CheckoutError>
    where
        S: DeviceStorage,
        C: Clock,
        G: OrderGateway,
    {
        self.step = CheckoutStep::Processing;
        let result = place_order(store, details, gateway).await;
        self.step = if result.is_ok() {
            CheckoutStep::Success
        } else {
            CheckoutStep::Form
        };
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use chrono::{DateTime, TimeZone, Utc};
    use i1fashion_core::{
        Email, OrderId, OrderStatus, Product, ProductId, ProductVariant, User, VariantId,
    };

    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStorage;

    /// Records every submission and answers with a fixed outcome.
    struct FakeGateway {
        fail: bool,
        submitted: Mutex<Vec<NewOrder>>,
    }

    impl FakeGateway {
        fn accepting() -> Self {
            Self {
                fail: false,
                submitted: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                submitted: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.submitted.lock().unwrap().len()
        }
    }

    impl OrderGateway for FakeGateway {
        async fn submit_order(&self, order: &NewOrder) -> Result<OrderSummary, ApiError> {
            self.submitted.lock().unwrap().push(order.clone());
            if self.fail {
                return Err(ApiError::Api {
                    status: 500,
                    message: "Failed to process order".to_string(),
                });
            }
            Ok(OrderSummary {
                id: OrderId::generate(),
                order_number: order.order_number.clone().unwrap(),
                total_amount: order.total_amount,
                status: OrderStatus::Pending,
            })
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    fn cart_line(base_price: i64, quantity: u32) -> CartItem {
        let product = Product {
            id: ProductId::generate(),
            name: "Chikankari Kurta".to_string(),
            slug: "chikankari-kurta".to_string(),
            description: String::new(),
            base_price: Decimal::from(base_price),
            category: "kurtas".to_string(),
            image_url: String::new(),
            stock_quantity: 10,
            is_active: true,
            created_at: now(),
            updated_at: now(),
        };
        let variant = ProductVariant {
            id: VariantId::generate(),
            product_id: product.id,
            color: "White".to_string(),
            size: "L".to_string(),
            stock_quantity: 3,
            price_adjustment: Decimal::ZERO,
            is_active: true,
            created_at: now(),
        };
        CartItem::new(product, variant, quantity)
    }

    fn details() -> ShippingDetails {
        ShippingDetails {
            customer_name: "Aarav Mehta".to_string(),
            customer_email: "aarav@example.in".to_string(),
            customer_phone: "9123456780".to_string(),
            shipping_address: "221 Linking Road, Bandra West".to_string(),
            shipping_city: "Mumbai".to_string(),
            shipping_state: "Maharashtra".to_string(),
            shipping_postal_code: "400050".to_string(),
            shipping_country: String::new(),
        }
    }

    fn signed_in_store() -> ClientStore<MemoryStorage, ManualClock> {
        let mut store = ClientStore::load(MemoryStorage::new(), ManualClock::new(now()));
        store.set_user(Some(User {
            id: UserId::generate(),
            email: Email::parse("aarav@example.in").unwrap(),
            full_name: "Aarav Mehta".to_string(),
            phone: "9123456780".to_string(),
            created_at: now(),
            email_verified: true,
        }));
        store.add_to_cart(cart_line(100, 2));
        store.add_to_cart(cart_line(250, 1));
        store
    }

    #[tokio::test]
    async fn test_success_clears_cart() {
        let mut store = signed_in_store();
        let gateway = FakeGateway::accepting();

        let placed = place_order(&mut store, &details(), &gateway).await.unwrap();

        assert!(store.state().cart_items.is_empty());
        assert_eq!(store.state().cart_count, 0);
        assert_eq!(placed.order.total_amount, Decimal::from(450));
        assert_eq!(placed.redirect_delay, Duration::from_millis(1500));
        assert_eq!(
            placed.confirmation_path,
            format!("/order-success?order={}", placed.order_number())
        );
        assert!(placed.order_number().as_str().starts_with("ORD-20260315-"));
    }

    #[tokio::test]
    async fn test_submitted_order_snapshots_cart() {
        let mut store = signed_in_store();
        let gateway = FakeGateway::accepting();
        place_order(&mut store, &details(), &gateway).await.unwrap();

        let submitted = gateway.submitted.lock().unwrap();
        let order = &submitted[0];
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.subtotal, Decimal::from(450));
        assert_eq!(order.total_amount, order.subtotal);
        assert_eq!(order.tax_amount, Decimal::ZERO);
        assert_eq!(order.shipping.shipping_country, "India");
        assert_eq!(order.items[0].variant_name(), "White - L");
        assert_eq!(order.items[0].image_url, None);
        assert!(order.validate().is_ok());
    }

    #[tokio::test]
    async fn test_failure_preserves_cart() {
        let mut store = signed_in_store();
        let before = store.state().cart_items.clone();
        let gateway = FakeGateway::failing();

        let err = place_order(&mut store, &details(), &gateway)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Failed(_)));
        assert_eq!(err.to_string(), "Failed to place order. Please try again.");
        assert_eq!(store.state().cart_items, before);
        assert_eq!(store.state().cart_total, Decimal::from(450));
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_gateway() {
        let mut store = signed_in_store();
        let gateway = FakeGateway::accepting();
        let mut form = details();
        form.shipping_postal_code = "4000".to_string();

        let err = place_order(&mut store, &form, &gateway).await.unwrap_err();

        let CheckoutError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(
            errors.message_for("shipping_postal_code"),
            Some("Postal code must be at least 5 characters")
        );
        assert_eq!(gateway.calls(), 0);
        assert_eq!(store.state().cart_count, 3);
    }

    #[tokio::test]
    async fn test_oversized_cart_never_reaches_gateway() {
        let mut store = signed_in_store();
        store.clear_cart();
        let mut line = cart_line(100, 2);
        line.product.base_price = Decimal::MAX;
        store.add_to_cart(line);
        assert_eq!(store.state().cart_total, Decimal::MAX);
        let gateway = FakeGateway::accepting();

        let err = place_order(&mut store, &details(), &gateway)
            .await
            .unwrap_err();

        let CheckoutError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(
            errors.message_for("items[0].unit_price"),
            Some("Amount is too large")
        );
        assert_eq!(gateway.calls(), 0);
        assert_eq!(store.state().cart_count, 2);
    }

    #[tokio::test]
    async fn test_requires_sign_in() {
        let mut store = ClientStore::load(MemoryStorage::new(), ManualClock::new(now()));
        store.add_to_cart(cart_line(100, 1));
        let gateway = FakeGateway::accepting();

        let err = place_order(&mut store, &details(), &gateway)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::NotSignedIn));
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_expired_session_is_not_signed_in() {
        let clock = ManualClock::new(now());
        let mut store = ClientStore::load(MemoryStorage::new(), clock.clone());
        store.set_user(Some(User {
            id: UserId::generate(),
            email: Email::parse("aarav@example.in").unwrap(),
            full_name: "Aarav Mehta".to_string(),
            phone: String::new(),
            created_at: now(),
            email_verified: false,
        }));
        store.add_to_cart(cart_line(100, 1));
        clock.advance(chrono::Duration::days(8));

        let err = place_order(&mut store, &details(), &FakeGateway::accepting())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::NotSignedIn));
        assert!(store.state().user.is_none());
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let mut store = signed_in_store();
        store.clear_cart();
        let gateway = FakeGateway::accepting();

        let err = place_order(&mut store, &details(), &gateway)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_flow_steps() {
        let mut flow = CheckoutFlow::new();
        assert_eq!(flow.step(), CheckoutStep::Form);

        let mut store = signed_in_store();
        flow.submit(&mut store, &details(), &FakeGateway::failing())
            .await
            .unwrap_err();
        assert_eq!(flow.step(), CheckoutStep::Form);

        flow.submit(&mut store, &details(), &FakeGateway::accepting())
            .await
            .unwrap();
        assert_eq!(flow.step(), CheckoutStep::Success);
    }
}
