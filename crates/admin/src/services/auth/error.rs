//! Admin authentication error types.

use thiserror::Error;

/// Errors that can occur while signing an admin in.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// The PIN did not match.
    #[error("Invalid admin PIN. Access denied.")]
    InvalidPin,

    /// The built-in admin identity could not be constructed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] i1fashion_core::EmailError),
}
