//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness
//! GET  /health/ready           - Database readiness
//!
//! # Catalog
//! GET  /api/products           - Active products (?category=)
//! GET  /api/products/{id}      - Product with variants
//!
//! # Orders
//! POST /api/orders             - Place an order
//! GET  /api/orders?user_id=    - Order history
//!
//! # Verification (strict rate limit)
//! POST /api/send-otp           - Email a one-time code
//! PUT  /api/send-otp           - Verify a code
//! POST /api/confirm-user       - Mark a verified email as confirmed
//! GET  /api/send-email         - Usage
//! POST /api/send-email         - Send a transactional email
//! ```

pub mod email;
pub mod health;
pub mod orders;
pub mod otp;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, otp_rate_limiter};
use crate::state::AppState;

/// Catalog and order routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/orders", get(orders::index).post(orders::create))
        .route_layer(api_rate_limiter())
}

/// Routes that send email or check codes.
pub fn verification_routes() -> Router<AppState> {
    Router::new()
        .route("/send-otp", post(otp::send).put(otp::verify))
        .route("/confirm-user", post(users::confirm))
        .route("/send-email", get(email::usage).post(email::send))
        .route_layer(otp_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes().merge(verification_routes()))
}
