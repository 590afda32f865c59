//! The persisted slice of the store and its versioned envelope.
//!
//! Stored JSON looks like `{"state": {...}, "version": 2}`. Version 0 and 1
//! envelopes predate admin support and are upgraded on load.

use chrono::{DateTime, Utc};
use i1fashion_core::{AdminUser, Email, User, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CartItem, StoreState};
use crate::obfuscate::{obfuscate, reveal};

/// Storage key for the persisted store.
pub const STORAGE_KEY: &str = "i1fashion-store";

/// Current envelope version.
pub const STORAGE_VERSION: u32 = 2;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    state: T,
    #[serde(default)]
    version: u32,
}

/// A user with the personal fields obfuscated.
#[derive(Debug, Serialize, Deserialize)]
struct StoredUser {
    id: UserId,
    email: String,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    phone: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    email_verified: bool,
}

impl From<&User> for StoredUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: obfuscate(user.email.as_str()),
            full_name: obfuscate(&user.full_name),
            phone: obfuscate(&user.phone),
            created_at: user.created_at,
            email_verified: user.email_verified,
        }
    }
}

impl StoredUser {
    fn into_user(self) -> Result<User, LoadError> {
        let email = Email::parse(&reveal(&self.email)).map_err(|_| LoadError::Corrupt)?;
        Ok(User {
            id: self.id,
            email,
            full_name: reveal(&self.full_name),
            phone: reveal(&self.phone),
            created_at: self.created_at,
            email_verified: self.email_verified,
        })
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoredState {
    user: Option<StoredUser>,
    is_authenticated: bool,
    session_expiry: Option<DateTime<Utc>>,
    admin_user: Option<AdminUser>,
    is_admin: bool,
    cart_items: Vec<CartItem>,
    cart_count: u32,
    cart_total: Decimal,
}

/// Why a stored value could not be used.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("stored state is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("stored state has unreadable fields")]
    Corrupt,
}

/// Serialize the persisted slice of `state`.
///
/// # Errors
///
/// Returns `serde_json::Error` if serialization fails.
pub fn encode(state: &StoreState) -> Result<String, serde_json::Error> {
    let stored = StoredState {
        user: state.user.as_ref().map(StoredUser::from),
        is_authenticated: state.is_authenticated,
        session_expiry: state.session_expiry,
        admin_user: state.admin_user.clone(),
        is_admin: state.is_admin,
        cart_items: state.cart_items.clone(),
        cart_count: state.cart_count,
        cart_total: state.cart_total,
    };
    serde_json::to_string(&Envelope {
        state: stored,
        version: STORAGE_VERSION,
    })
}

/// Restore a state from a stored envelope, upgrading older versions.
///
/// UI flags are never persisted and come back closed.
///
/// # Errors
///
/// Returns `LoadError` when the value cannot be parsed or its user record
/// cannot be recovered.
pub fn decode(raw: &str) -> Result<StoreState, LoadError> {
    let Envelope { mut state, version } = serde_json::from_str::<Envelope<Value>>(raw)?;
    if version < STORAGE_VERSION {
        migrate(&mut state, version);
    }

    let stored: StoredState = serde_json::from_value(state)?;
    let user = stored.user.map(StoredUser::into_user).transpose()?;

    Ok(StoreState {
        user,
        is_authenticated: stored.is_authenticated,
        session_expiry: stored.session_expiry,
        admin_user: stored.admin_user,
        is_admin: stored.is_admin,
        cart_items: stored.cart_items,
        cart_count: stored.cart_count,
        cart_total: stored.cart_total,
        ..StoreState::default()
    })
}

/// Backfill fields introduced after `from_version`.
fn migrate(state: &mut Value, from_version: u32) {
    tracing::debug!(from_version, to_version = STORAGE_VERSION, "migrating stored state");
    if let Value::Object(map) = state
        && from_version < 2
    {
        map.entry("admin_user").or_insert(Value::Null);
        map.entry("is_admin").or_insert(Value::Bool(false));
    }
}
