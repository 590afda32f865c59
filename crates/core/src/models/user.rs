//! Customer and admin identities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AdminRole, AdminUserId, Email, UserId};

/// A customer account, merged from the auth record and its profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct User {
    pub id: UserId,
    pub email: Email,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub email_verified: bool,
}

/// Per-area admin permission flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminPermissions {
    pub products: bool,
    pub orders: bool,
    pub users: bool,
    pub analytics: bool,
    pub settings: bool,
}

impl AdminPermissions {
    /// Every permission granted.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            products: true,
            orders: true,
            users: true,
            analytics: true,
            settings: true,
        }
    }
}

/// An admin identity. Dashboard access requires `is_active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: AdminUserId,
    pub user_id: UserId,
    pub email: Email,
    pub full_name: String,
    pub role: AdminRole,
    pub permissions: AdminPermissions,
    pub is_active: bool,
}
