//! HTTP client for the storefront and admin APIs.
//!
//! Both servers answer failures with `{"error": "..."}`; that message is
//! surfaced as [`ApiError::Api`]. The admin session lives in a cookie, so one
//! [`ApiClient`] keeps its cookie jar between `admin_login` and later admin
//! calls.

use i1fashion_core::{
    AdminLoginRequest, AdminLoginResponse, ConfirmUserRequest, ConfirmUserResponse,
    CreateOrderResponse, DashboardStats, ErrorBody, MessageResponse, NewOrder, OrderSummary,
    OrderWithItems, OrdersResponse, SendOtpRequest, UserId, VerifyOtpRequest,
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::checkout::OrderGateway;

/// Errors from the HTTP API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("invalid response: {0}")]
    Response(String),

    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },
}

/// Client for one deployment of the storefront or admin API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client rooted at `base_url`, e.g. `https://i1fashion.com/`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Request` if the HTTP client cannot be built.
    pub fn new(base_url: Url) -> Result<Self, ApiError> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::Request(format!("invalid path {path}: {e}")))
    }

    /// Create an order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the server rejects the order.
    #[instrument(skip(self, order), fields(items = order.items.len()))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<OrderSummary, ApiError> {
        let response = self
            .client
            .post(self.url("api/orders")?)
            .json(order)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let created: CreateOrderResponse = read_json(response).await?;
        debug!(order_number = %created.order.order_number, "Order created");
        Ok(created.order)
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, user_id: UserId) -> Result<Vec<OrderWithItems>, ApiError> {
        let mut url = self.url("api/orders")?;
        url.query_pairs_mut()
            .append_pair("user_id", &user_id.to_string());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let list: OrdersResponse = read_json(response).await?;
        Ok(list.orders)
    }

    /// Email a one-time code to `email`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the code could not be sent.
    #[instrument(skip(self))]
    pub async fn send_otp(&self, email: &str) -> Result<MessageResponse, ApiError> {
        let response = self
            .client
            .post(self.url("api/send-otp")?)
            .json(&SendOtpRequest {
                email: email.to_string(),
            })
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        read_json(response).await
    }

    /// Check a one-time code. A code can only be used once.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Api` with the server's message when the code is
    /// wrong, expired or already used.
    #[instrument(skip(self, otp))]
    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<MessageResponse, ApiError> {
        let response = self
            .client
            .put(self.url("api/send-otp")?)
            .json(&VerifyOtpRequest {
                email: email.to_string(),
                otp: otp.to_string(),
            })
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        read_json(response).await
    }

    /// Mark a freshly verified email as confirmed.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the email was not just verified or no user has it.
    #[instrument(skip(self))]
    pub async fn confirm_user(&self, email: &str) -> Result<ConfirmUserResponse, ApiError> {
        let response = self
            .client
            .post(self.url("api/confirm-user")?)
            .json(&ConfirmUserRequest {
                email: email.to_string(),
            })
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        read_json(response).await
    }

    /// Sign in to the admin API. The session cookie is kept by this client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Api` with status 401 for a wrong PIN.
    #[instrument(skip(self, pin))]
    pub async fn admin_login(&self, pin: &str) -> Result<AdminLoginResponse, ApiError> {
        let response = self
            .client
            .post(self.url("api/admin/login")?)
            .json(&AdminLoginRequest {
                pin: pin.to_string(),
            })
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        read_json(response).await
    }

    /// Fetch dashboard totals. Requires an admin session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the session is missing.
    #[instrument(skip(self))]
    pub async fn fetch_stats(&self) -> Result<DashboardStats, ApiError> {
        let response = self
            .client
            .get(self.url("api/admin/stats")?)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        read_json(response).await
    }
}

impl OrderGateway for ApiClient {
    async fn submit_order(&self, order: &NewOrder) -> Result<OrderSummary, ApiError> {
        self.create_order(order).await
    }
}

/// Decode a success body, or turn an error status into `ApiError::Api`.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json()
            .await
            .map_err(|e| ApiError::Response(e.to_string()));
    }

    let body = response
        .text()
        .await
        .map_err(|e| ApiError::Response(e.to_string()))?;
    Err(ApiError::Api {
        status: status.as_u16(),
        message: error_message(&body, status.canonical_reason()),
    })
}

fn error_message(body: &str, reason: Option<&str>) -> String {
    serde_json::from_str::<ErrorBody>(body).map_or_else(
        |_| reason.unwrap_or("Unknown error").to_string(),
        |e| e.error,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_body() {
        assert_eq!(
            error_message(r#"{"error":"Invalid OTP"}"#, Some("Bad Request")),
            "Invalid OTP"
        );
    }

    #[test]
    fn test_error_message_falls_back_to_reason() {
        assert_eq!(
            error_message("<html>gateway timeout</html>", Some("Gateway Timeout")),
            "Gateway Timeout"
        );
        assert_eq!(error_message("", None), "Unknown error");
    }

    #[test]
    fn test_paths_join_under_base() {
        let client = ApiClient::new(Url::parse("https://shop.example.in/app/").unwrap()).unwrap();
        assert_eq!(
            client.url("api/orders").unwrap().as_str(),
            "https://shop.example.in/app/api/orders"
        );
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Api {
            status: 401,
            message: "Invalid admin PIN. Access denied.".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid admin PIN. Access denied. (HTTP 401)");
    }
}
