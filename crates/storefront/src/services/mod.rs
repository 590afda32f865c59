//! Storefront services: outgoing email and one-time codes.

pub mod email;
pub mod otp;

pub use email::{EmailError, EmailService};
pub use otp::{OtpError, OtpStore};
