//! One-time codes for email verification.
//!
//! Codes live in process memory, keyed by the lowercased address, so they do
//! not survive a restart and are not shared between instances. Expired
//! entries are swept on every access.
//!
//! A successful verification leaves behind a short-lived confirmation grant
//! for that address; `confirm-user` consumes it.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use i1fashion_core::Email;

/// How long an issued code stays valid.
pub const OTP_TTL: Duration = Duration::minutes(10);

/// How long a successful verification may be used to confirm the user.
pub const CONFIRMATION_TTL: Duration = Duration::minutes(10);

/// Why a code was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OtpError {
    /// No code was issued for this address, or it was already used.
    #[error("Invalid or expired OTP")]
    Missing,

    /// The code expired; it has been removed.
    #[error("OTP has expired")]
    Expired,

    /// Wrong code. The issued code stays valid.
    #[error("Invalid OTP")]
    Mismatch,
}

#[derive(Debug, Clone)]
struct OtpEntry {
    code: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Inner {
    codes: HashMap<String, OtpEntry>,
    confirmations: HashMap<String, DateTime<Utc>>,
}

impl Inner {
    fn sweep(&mut self, now: DateTime<Utc>) {
        self.codes.retain(|_, entry| entry.expires_at >= now);
        self.confirmations.retain(|_, expires_at| *expires_at >= now);
    }
}

/// In-memory store of issued codes.
#[derive(Debug, Default)]
pub struct OtpStore {
    inner: Mutex<Inner>,
}

impl OtpStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Entries are plain data, so a panic elsewhere cannot leave them half-written.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `code` for `email`, replacing any earlier code.
    ///
    /// Returns the expiry time.
    pub fn issue(&self, email: &Email, code: String, now: DateTime<Utc>) -> DateTime<Utc> {
        let expires_at = now + OTP_TTL;
        let mut inner = self.lock();
        inner.sweep(now);
        inner
            .codes
            .insert(email.normalized(), OtpEntry { code, expires_at });
        expires_at
    }

    /// Drop `code` for `email`, e.g. when sending it failed.
    ///
    /// A newer code issued for the same address in the meantime is kept.
    pub fn revoke(&self, email: &Email, code: &str) {
        let key = email.normalized();
        let mut inner = self.lock();
        if inner.codes.get(&key).is_some_and(|entry| entry.code == code) {
            inner.codes.remove(&key);
        }
    }

    /// Check `code` against the one issued for `email`.
    ///
    /// A match consumes the code and grants a confirmation for the address.
    ///
    /// # Errors
    ///
    /// Returns [`OtpError`] describing why the code was rejected.
    pub fn verify(&self, email: &Email, code: &str, now: DateTime<Utc>) -> Result<(), OtpError> {
        let key = email.normalized();
        let mut inner = self.lock();

        let Some(entry) = inner.codes.get(&key) else {
            inner.sweep(now);
            return Err(OtpError::Missing);
        };

        if entry.expires_at < now {
            inner.codes.remove(&key);
            inner.sweep(now);
            return Err(OtpError::Expired);
        }

        if entry.code != code.trim() {
            inner.sweep(now);
            return Err(OtpError::Mismatch);
        }

        inner.codes.remove(&key);
        inner.confirmations.insert(key, now + CONFIRMATION_TTL);
        inner.sweep(now);
        Ok(())
    }

    /// Use up the confirmation grant for `email`.
    ///
    /// Returns `false` if the address was not verified recently.
    pub fn take_confirmation(&self, email: &Email, now: DateTime<Utc>) -> bool {
        let mut inner = self.lock();
        inner.sweep(now);
        inner.confirmations.remove(&email.normalized()).is_some()
    }

    /// Put a grant back after the confirmation could not be completed.
    pub fn restore_confirmation(&self, email: &Email, now: DateTime<Utc>) {
        self.lock()
            .confirmations
            .insert(email.normalized(), now + CONFIRMATION_TTL);
    }

    /// Number of outstanding codes.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock().codes.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[test]
    fn test_matching_code_succeeds_once() {
        let store = OtpStore::new();
        let now = Utc::now();
        let addr = email("priya@example.in");
        store.issue(&addr, "482913".to_string(), now);

        assert_eq!(store.verify(&addr, "482913", now), Ok(()));
        assert_eq!(store.verify(&addr, "482913", now), Err(OtpError::Missing));
    }

    #[test]
    fn test_mismatch_keeps_code() {
        let store = OtpStore::new();
        let now = Utc::now();
        let addr = email("priya@example.in");
        store.issue(&addr, "482913".to_string(), now);

        assert_eq!(store.verify(&addr, "000000", now), Err(OtpError::Mismatch));
        assert_eq!(store.verify(&addr, "482913", now), Ok(()));
    }

    #[test]
    fn test_expired_code_is_removed() {
        let store = OtpStore::new();
        let now = Utc::now();
        let addr = email("priya@example.in");
        store.issue(&addr, "482913".to_string(), now);

        let later = now + OTP_TTL + Duration::seconds(1);
        // The entry is looked up before the sweep so the caller learns it expired.
        assert_eq!(store.verify(&addr, "482913", later), Err(OtpError::Expired));
        assert_eq!(store.verify(&addr, "482913", later), Err(OtpError::Missing));
        assert_eq!(store.pending(), 0);
    }

    #[test]
    fn test_code_valid_until_expiry_instant() {
        let store = OtpStore::new();
        let now = Utc::now();
        let addr = email("priya@example.in");
        store.issue(&addr, "482913".to_string(), now);

        assert_eq!(store.verify(&addr, "482913", now + OTP_TTL), Ok(()));
    }

    #[test]
    fn test_unknown_email_is_missing() {
        let store = OtpStore::new();
        assert_eq!(
            store.verify(&email("nobody@example.in"), "123456", Utc::now()),
            Err(OtpError::Missing)
        );
    }

    #[test]
    fn test_addresses_compare_case_insensitively() {
        let store = OtpStore::new();
        let now = Utc::now();
        store.issue(&email("Priya@Example.in"), "482913".to_string(), now);

        assert_eq!(store.verify(&email("priya@example.in"), "482913", now), Ok(()));
    }

    #[test]
    fn test_reissue_replaces_code() {
        let store = OtpStore::new();
        let now = Utc::now();
        let addr = email("priya@example.in");
        store.issue(&addr, "111111".to_string(), now);
        store.issue(&addr, "222222".to_string(), now);

        assert_eq!(store.verify(&addr, "111111", now), Err(OtpError::Mismatch));
        assert_eq!(store.verify(&addr, "222222", now), Ok(()));
    }

    #[test]
    fn test_issue_sweeps_expired_entries() {
        let store = OtpStore::new();
        let now = Utc::now();
        store.issue(&email("a@example.in"), "111111".to_string(), now);
        store.issue(
            &email("b@example.in"),
            "222222".to_string(),
            now + OTP_TTL + Duration::minutes(1),
        );

        assert_eq!(store.pending(), 1);
    }

    #[test]
    fn test_confirmation_requires_verification() {
        let store = OtpStore::new();
        let now = Utc::now();
        let addr = email("priya@example.in");

        assert!(!store.take_confirmation(&addr, now));

        store.issue(&addr, "482913".to_string(), now);
        store.verify(&addr, "482913", now).unwrap();

        assert!(store.take_confirmation(&addr, now));
        assert!(!store.take_confirmation(&addr, now));
    }

    #[test]
    fn test_confirmation_expires() {
        let store = OtpStore::new();
        let now = Utc::now();
        let addr = email("priya@example.in");
        store.issue(&addr, "482913".to_string(), now);
        store.verify(&addr, "482913", now).unwrap();

        let later = now + CONFIRMATION_TTL + Duration::seconds(1);
        assert!(!store.take_confirmation(&addr, later));
    }

    #[test]
    fn test_revoke_removes_code() {
        let store = OtpStore::new();
        let now = Utc::now();
        let addr = email("priya@example.in");
        store.issue(&addr, "482913".to_string(), now);
        store.revoke(&addr, "482913");

        assert_eq!(store.verify(&addr, "482913", now), Err(OtpError::Missing));
    }

    #[test]
    fn test_revoke_keeps_newer_code() {
        let store = OtpStore::new();
        let now = Utc::now();
        let addr = email("priya@example.in");
        store.issue(&addr, "111111".to_string(), now);
        store.issue(&addr, "222222".to_string(), now);
        store.revoke(&addr, "111111");

        assert_eq!(store.pending(), 1);
        assert_eq!(store.verify(&addr, "222222", now), Ok(()));
    }
}
