//! JSON bodies exchanged between the client and the API servers.

use serde::{Deserialize, Serialize};

use super::catalog::{Product, ProductDetail};
use super::order::{OrderSummary, OrderWithItems};
use super::user::{AdminUser, User};

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Generic acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// `GET /api/products` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductsResponse {
    pub products: Vec<Product>,
}

/// `GET /api/products/{id}` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductResponse {
    pub product: ProductDetail,
}

/// `POST /api/orders` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order: OrderSummary,
}

/// `GET /api/orders` and `GET /api/admin/orders` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdersResponse {
    pub success: bool,
    pub orders: Vec<OrderWithItems>,
}

/// Request bodies default missing fields to empty so handlers can answer
/// with a field-specific message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SendOtpRequest {
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmUserRequest {
    pub email: String,
}

/// `POST /api/confirm-user` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmUserResponse {
    pub success: bool,
    pub message: String,
    pub user: User,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminLoginRequest {
    pub pin: String,
}

/// `POST /api/admin/login` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminLoginResponse {
    pub success: bool,
    pub user: User,
    #[serde(rename = "adminUser")]
    pub admin_user: AdminUser,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_shape() {
        let body = ErrorBody {
            error: "Invalid OTP".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"error":"Invalid OTP"}"#
        );
    }

    #[test]
    fn test_request_fields_default_to_empty() {
        let req: VerifyOtpRequest = serde_json::from_str(r#"{"email":"a@b.in"}"#).unwrap();
        assert_eq!(req.email, "a@b.in");
        assert!(req.otp.is_empty());
    }

    #[test]
    fn test_message_response_ok() {
        let ack = MessageResponse::ok("OTP sent successfully");
        assert!(ack.success);
        assert_eq!(ack.message, "OTP sent successfully");
    }
}
