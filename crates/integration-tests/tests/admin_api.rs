//! Admin sign-in through `ApiClient` against the real admin router.
//!
//! The router runs with in-memory sessions. Requests here are rejected or
//! answered before any database access.

#![allow(clippy::unwrap_used)]

use i1fashion_client::{ApiClient, ApiError, ClientStore, MemoryStorage};
use i1fashion_core::{AdminRole, ErrorBody};
use i1fashion_integration_tests::{TEST_ADMIN_PIN, spawn_admin};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

#[tokio::test]
async fn test_health_endpoints() {
    let base = spawn_admin().await;
    let response = reqwest::get(base.join("health").unwrap()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_wrong_pin_is_an_api_error() {
    let client = ApiClient::new(spawn_admin().await).unwrap();

    let err = client.admin_login("1234").await.unwrap_err();

    let ApiError::Api { status, message } = err else {
        panic!("expected API error");
    };
    assert_eq!(status, 401);
    assert_eq!(message, "Invalid admin PIN. Access denied.");
}

#[tokio::test]
async fn test_login_marks_store_as_admin() {
    let client = ApiClient::new(spawn_admin().await).unwrap();

    let login = client.admin_login(TEST_ADMIN_PIN).await.unwrap();

    assert!(login.success);
    assert_eq!(login.admin_user.role, AdminRole::SuperAdmin);
    assert!(login.admin_user.permissions.orders);
    assert_eq!(login.user.id, login.admin_user.user_id);

    let mut store = ClientStore::open(MemoryStorage::new());
    store.set_user(Some(login.user));
    store.set_admin_user(Some(login.admin_user));
    assert!(store.state().is_admin);
    assert!(store.state().is_authenticated);
}

#[tokio::test]
async fn test_stats_require_a_session() {
    let client = ApiClient::new(spawn_admin().await).unwrap();

    let err = client.fetch_stats().await.unwrap_err();

    let ApiError::Api { status, message } = err else {
        panic!("expected API error");
    };
    assert_eq!(status, 401);
    assert_eq!(message, "Authentication required");
}

#[tokio::test]
async fn test_session_cookie_round_trip() {
    let base = spawn_admin().await;
    let http = Client::builder().cookie_store(true).build().unwrap();

    let response = http
        .post(base.join("api/admin/login").unwrap())
        .json(&json!({"pin": TEST_ADMIN_PIN}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Signed in: validation runs, so the error is about the body.
    let response = http
        .patch(base.join("api/admin/orders").unwrap())
        .json(&json!({"status": "shipped"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.error, "Order id is required");

    let response = http
        .post(base.join("api/admin/logout").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);

    let response = http
        .patch(base.join("api/admin/orders").unwrap())
        .json(&json!({"status": "shipped"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_rate_limit_uses_peer_address() {
    let client = ApiClient::new(spawn_admin().await).unwrap();

    for _ in 0..5 {
        let err = client.admin_login("0000").await.unwrap_err();
        assert!(matches!(err, ApiError::Api { status: 401, .. }));
    }

    let err = client.admin_login(TEST_ADMIN_PIN).await.unwrap_err();
    assert!(matches!(err, ApiError::Api { status: 429, .. }));
}
