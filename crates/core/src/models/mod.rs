//! Records shared between the client store and the API servers.
//!
//! These mirror the rows the servers read and write, serialized with the same
//! snake_case field names the JSON API uses.

pub mod api;
pub mod catalog;
pub mod checkout;
pub mod dashboard;
pub mod order;
pub mod user;

pub use api::{
    AdminLoginRequest, AdminLoginResponse, ConfirmUserRequest, ConfirmUserResponse,
    CreateOrderResponse, ErrorBody, MessageResponse, OrdersResponse, ProductResponse,
    ProductsResponse, SendOtpRequest, VerifyOtpRequest,
};
pub use catalog::{Product, ProductDetail, ProductVariant, slugify};
pub use checkout::{FieldError, NewOrder, NewOrderItem, ShippingDetails, ValidationErrors};
pub use dashboard::{CustomerSummary, DashboardStats, LOW_STOCK_THRESHOLD};
pub use order::{Order, OrderItem, OrderSummary, OrderWithItems};
pub use user::{AdminPermissions, AdminUser, User};
