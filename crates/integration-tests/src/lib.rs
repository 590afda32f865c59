//! Integration tests for i1Fashion.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p i1fashion-integration-tests
//! ```
//!
//! No database is needed. Servers run in-process on an ephemeral port and
//! the tests only touch paths that answer before the database would be used.
//!
//! # Test Categories
//!
//! - `checkout` - The client store placing orders through [`ApiClient`]
//! - `admin_api` - PIN sign-in and session handling against the admin router
//!
//! [`ApiClient`]: i1fashion_client::ApiClient

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::net::SocketAddr;

use axum::Router;
use i1fashion_admin::config::AdminConfig;
use i1fashion_admin::middleware::session_layer;
use i1fashion_admin::state::AppState;
use secrecy::SecretString;
use sqlx::PgPool;
use tower_sessions::MemoryStore;
use url::Url;

/// PIN the test admin server accepts.
pub const TEST_ADMIN_PIN: &str = "4821";

const UNREACHABLE_DATABASE: &str = "postgres://localhost:1/unreachable";

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn(app: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("test server");
    });

    Url::parse(&format!("http://{addr}/")).expect("base url")
}

/// Admin configuration for tests: plain HTTP, no SMTP, no Sentry.
#[must_use]
pub fn admin_config() -> AdminConfig {
    AdminConfig {
        database_url: SecretString::from(UNREACHABLE_DATABASE),
        host: "127.0.0.1".parse().expect("loopback address"),
        port: 0,
        base_url: "http://localhost".to_string(),
        admin_pin: SecretString::from(TEST_ADMIN_PIN),
        email: None,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
        tls: None,
    }
}

/// Start the admin API with in-memory sessions and a pool that never connects.
pub async fn spawn_admin() -> Url {
    let pool = PgPool::connect_lazy(UNREACHABLE_DATABASE).expect("lazy pool");
    let state = AppState::new(admin_config(), pool, None);
    let app = i1fashion_admin::router(state, session_layer(MemoryStore::default(), false));
    spawn(app).await
}
