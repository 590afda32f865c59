//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - PIN sign-in as the built-in administrator
//! - `email` - Order status notifications via SMTP

pub mod auth;
pub mod email;

pub use auth::{AdminAuthError, AdminAuthService, AdminIdentity};
pub use email::{EmailError, EmailService};
