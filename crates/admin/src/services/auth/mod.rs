//! Admin authentication service.
//!
//! The dashboard is unlocked by a single shared PIN from configuration.
//! Whoever knows it signs in as the built-in system administrator; there are
//! no per-person admin accounts behind the PIN.

mod error;

pub use error::AdminAuthError;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use i1fashion_core::{AdminPermissions, AdminRole, AdminUser, AdminUserId, Email, User, UserId};

/// Email address of the built-in administrator.
pub const SYSTEM_ADMIN_EMAIL: &str = "admin@i1fashion.com";

/// Display name of the built-in administrator.
pub const SYSTEM_ADMIN_NAME: &str = "System Administrator";

const SYSTEM_ADMIN_USER_ID: UserId =
    UserId::new(Uuid::from_u128(0x1f1a_5b1e_0000_4000_8000_0000_0000_0001));
const SYSTEM_ADMIN_ID: AdminUserId =
    AdminUserId::new(Uuid::from_u128(0x1f1a_5b1e_0000_4000_8000_0000_0000_0002));

/// The identity handed out on a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminIdentity {
    pub user: User,
    pub admin_user: AdminUser,
}

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    pin: &'a SecretString,
}

impl<'a> AdminAuthService<'a> {
    /// Create a service that checks against the configured PIN.
    #[must_use]
    pub const fn new(pin: &'a SecretString) -> Self {
        Self { pin }
    }

    /// Sign in with `candidate`.
    ///
    /// Only an exact match of the configured PIN is accepted; surrounding
    /// whitespace is not trimmed.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidPin` if the PIN does not match.
    pub fn login(
        &self,
        candidate: &str,
        now: DateTime<Utc>,
    ) -> Result<AdminIdentity, AdminAuthError> {
        if !constant_time_compare(self.pin.expose_secret(), candidate) {
            return Err(AdminAuthError::InvalidPin);
        }
        system_admin(now)
    }
}

/// The built-in administrator with every permission.
///
/// # Errors
///
/// Returns `AdminAuthError::InvalidEmail` if [`SYSTEM_ADMIN_EMAIL`] fails to parse.
pub fn system_admin(now: DateTime<Utc>) -> Result<AdminIdentity, AdminAuthError> {
    let email = Email::parse(SYSTEM_ADMIN_EMAIL)?;

    Ok(AdminIdentity {
        user: User {
            id: SYSTEM_ADMIN_USER_ID,
            email: email.clone(),
            full_name: SYSTEM_ADMIN_NAME.to_string(),
            phone: String::new(),
            created_at: now,
            email_verified: true,
        },
        admin_user: AdminUser {
            id: SYSTEM_ADMIN_ID,
            user_id: SYSTEM_ADMIN_USER_ID,
            email,
            full_name: SYSTEM_ADMIN_NAME.to_string(),
            role: AdminRole::SuperAdmin,
            permissions: AdminPermissions::all(),
            is_active: true,
        },
    })
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("4821", "4821"));
        assert!(constant_time_compare("", ""));
        assert!(!constant_time_compare("4821", "4822"));
        assert!(!constant_time_compare("4821", "482"));
        assert!(!constant_time_compare("4821", "48210"));
    }

    #[test]
    fn test_login_accepts_only_exact_pin() {
        let pin = SecretString::from("4821");
        let auth = AdminAuthService::new(&pin);
        let now = Utc::now();

        assert!(auth.login("4821", now).is_ok());
        for wrong in ["", "1234", "4821 ", " 4821", "482", "48211"] {
            assert!(
                matches!(auth.login(wrong, now), Err(AdminAuthError::InvalidPin)),
                "{wrong:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_system_admin_is_active_super_admin() {
        let identity = system_admin(Utc::now()).unwrap();

        assert_eq!(identity.admin_user.role, AdminRole::SuperAdmin);
        assert_eq!(identity.admin_user.permissions, AdminPermissions::all());
        assert!(identity.admin_user.is_active);
        assert_eq!(identity.admin_user.user_id, identity.user.id);
        assert_eq!(identity.user.email.as_str(), SYSTEM_ADMIN_EMAIL);
    }

    #[test]
    fn test_invalid_pin_message() {
        assert_eq!(
            AdminAuthError::InvalidPin.to_string(),
            "Invalid admin PIN. Access denied."
        );
    }
}
