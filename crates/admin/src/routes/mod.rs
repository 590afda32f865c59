//! HTTP route handlers for the admin API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness
//! GET  /health/ready                    - Database readiness
//!
//! # Auth (PIN, rate limited)
//! POST   /api/admin/login               - Sign in with the admin PIN
//! POST   /api/admin/logout              - Sign out
//!
//! # Orders
//! GET    /api/admin/orders              - All orders with items
//! PATCH  /api/admin/orders              - Status / tracking update
//!
//! # Products
//! GET    /api/admin/products            - All products
//! POST   /api/admin/products            - Create
//! PUT    /api/admin/products            - Update (id in body)
//! DELETE /api/admin/products?id=        - Delete
//! GET    /api/admin/products/{id}       - Product with all variants
//! PUT    /api/admin/products/{id}       - Update
//! DELETE /api/admin/products/{id}       - Delete
//!
//! # Variants
//! GET    /api/admin/products/{id}/variants
//! POST   /api/admin/products/{id}/variants
//! PUT    /api/admin/variants/{id}
//! DELETE /api/admin/variants/{id}
//!
//! # Dashboard
//! GET    /api/admin/stats               - Headline numbers
//! GET    /api/admin/customers           - Customers with order totals
//! ```
//!
//! Everything under `/api/admin` except login needs an admin session.

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod orders;
pub mod products;
pub mod variants;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::middleware::login_rate_limiter;
use crate::state::AppState;

/// The login route, behind its own rate limiter.
pub fn login_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route_layer(login_rate_limiter())
}

/// Routes that need an admin session.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/logout", post(auth::logout))
        .route("/orders", get(orders::index).patch(orders::update))
        .route(
            "/products",
            get(products::index)
                .post(products::create)
                .put(products::update_from_body)
                .delete(products::delete_from_query),
        )
        .route(
            "/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
        .route(
            "/products/{id}/variants",
            get(variants::index).post(variants::create),
        )
        .route("/variants/{id}", put(variants::update).delete(variants::delete))
        .route("/stats", get(dashboard::stats))
        .route("/customers", get(dashboard::customers))
}

/// Create all routes for admin.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/admin", login_routes().merge(api_routes()))
}
