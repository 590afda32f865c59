//! Session and cart state container.
//!
//! [`ClientStore`] is the single source of truth for who is signed in and what
//! is in the cart. It owns its storage backend and clock, and writes the
//! persisted slice back to storage after every change to it.
//!
//! Mutations take `&mut self`, so two mutations can never interleave on one
//! store. Separate devices each have their own store; the last writer wins.

mod cart;
pub mod persist;

use chrono::{DateTime, Duration, Utc};
use i1fashion_core::{AdminUser, CartItemId, User};
use rust_decimal::Decimal;

pub use cart::CartItem;
pub use persist::{STORAGE_KEY, STORAGE_VERSION};

use crate::clock::{Clock, SystemClock};
use crate::storage::DeviceStorage;

/// How long a sign-in stays valid on this device.
pub const SESSION_DURATION: Duration = Duration::days(7);

/// Everything the store holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub session_expiry: Option<DateTime<Utc>>,
    pub admin_user: Option<AdminUser>,
    pub is_admin: bool,
    pub cart_items: Vec<CartItem>,
    pub cart_count: u32,
    pub cart_total: Decimal,
    pub is_mobile_menu_open: bool,
    pub is_cart_open: bool,
    pub is_search_open: bool,
}

/// The session and cart store.
#[derive(Debug)]
pub struct ClientStore<S, C = SystemClock> {
    state: StoreState,
    storage: S,
    clock: C,
}

impl<S: DeviceStorage> ClientStore<S> {
    /// Load the store from `storage` using the system clock.
    pub fn open(storage: S) -> Self {
        Self::load(storage, SystemClock)
    }
}

impl<S: DeviceStorage, C: Clock> ClientStore<S, C> {
    /// Load the store from `storage`.
    ///
    /// Missing, unreadable or corrupt values give a signed-out store with an
    /// empty cart. Session flags and cart aggregates are recomputed from the
    /// loaded records.
    pub fn load(storage: S, clock: C) -> Self {
        let state = match storage.get_item(STORAGE_KEY) {
            Ok(Some(raw)) => persist::decode(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "discarding unreadable stored state");
                StoreState::default()
            }),
            Ok(None) => StoreState::default(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored state");
                StoreState::default()
            }
        };

        let mut store = Self {
            state,
            storage,
            clock,
        };
        store.restore_session();
        store.recompute_cart();
        store
    }

    #[must_use]
    pub const fn state(&self) -> &StoreState {
        &self.state
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Set or clear the signed-in user.
    ///
    /// A user starts a session that expires [`SESSION_DURATION`] from now.
    /// `None` signs the user out of this store without touching the admin
    /// record or the cart.
    pub fn set_user(&mut self, user: Option<User>) {
        match user {
            Some(user) => {
                self.state.user = Some(user);
                self.state.is_authenticated = true;
                self.state.session_expiry = Some(self.clock.now() + SESSION_DURATION);
            }
            None => {
                self.state.user = None;
                self.state.is_authenticated = false;
                self.state.session_expiry = None;
            }
        }
        self.persist();
    }

    /// Set or clear the admin record. Admin access follows `is_active` only.
    pub fn set_admin_user(&mut self, admin: Option<AdminUser>) {
        self.state.is_admin = admin.as_ref().is_some_and(|a| a.is_active);
        self.state.admin_user = admin;
        self.persist();
    }

    /// Whether the session is still valid.
    ///
    /// Once the expiry has passed this signs out and returns `false`. With no
    /// session, or before expiry, it returns `true` and changes nothing.
    pub fn check_session_expiry(&mut self) -> bool {
        match self.state.session_expiry {
            Some(expiry) if self.clock.now() > expiry => {
                tracing::info!("session expired, signing out");
                self.sign_out();
                false
            }
            _ => true,
        }
    }

    /// Explicit logout: reset everything and purge this app's device storage.
    pub fn sign_out(&mut self) {
        self.state = StoreState::default();
        if let Err(e) = self.storage.clear() {
            tracing::warn!(error = %e, "could not purge device storage on sign-out");
        }
    }

    /// Drop user, admin and cart state after the session was invalidated
    /// elsewhere. UI flags are kept and storage is only overwritten.
    pub fn clear_session(&mut self) {
        self.state.user = None;
        self.state.is_authenticated = false;
        self.state.session_expiry = None;
        self.state.admin_user = None;
        self.state.is_admin = false;
        self.state.cart_items.clear();
        self.recompute_cart();
        self.persist();
    }

    /// Add a line, merging into an existing line for the same product and variant.
    pub fn add_to_cart(&mut self, item: CartItem) {
        if let Some(existing) = self.state.cart_items.iter().find(|line| line.same_sku(&item)) {
            let id = existing.id;
            let quantity = i64::from(existing.quantity) + i64::from(item.quantity);
            self.update_cart_quantity(id, quantity);
            return;
        }
        self.state.cart_items.push(item);
        self.recompute_cart();
        self.persist();
    }

    pub fn remove_from_cart(&mut self, id: CartItemId) {
        self.state.cart_items.retain(|line| line.id != id);
        self.recompute_cart();
        self.persist();
    }

    /// Set a line's quantity. Zero or less removes the line.
    pub fn update_cart_quantity(&mut self, id: CartItemId, quantity: i64) {
        if quantity <= 0 {
            self.remove_from_cart(id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(line) = self.state.cart_items.iter_mut().find(|line| line.id == id) {
            line.quantity = quantity;
        }
        self.recompute_cart();
        self.persist();
    }

    pub fn clear_cart(&mut self) {
        self.state.cart_items.clear();
        self.recompute_cart();
        self.persist();
    }

    /// `Σ (base_price + price_adjustment) × quantity` over the current lines.
    #[must_use]
    pub fn calculate_cart_total(&self) -> Decimal {
        self.state
            .cart_items
            .iter()
            .fold(Decimal::ZERO, |total, item| total.saturating_add(item.line_total()))
    }

    pub const fn toggle_mobile_menu(&mut self) {
        self.state.is_mobile_menu_open = !self.state.is_mobile_menu_open;
    }

    pub const fn toggle_cart(&mut self) {
        self.state.is_cart_open = !self.state.is_cart_open;
    }

    pub const fn toggle_search(&mut self) {
        self.state.is_search_open = !self.state.is_search_open;
    }

    fn recompute_cart(&mut self) {
        self.state.cart_count = self
            .state
            .cart_items
            .iter()
            .fold(0u32, |count, line| count.saturating_add(line.quantity));
        self.state.cart_total = self.calculate_cart_total();
    }

    /// Derive the session flags from the loaded user and admin records.
    ///
    /// A stored user without an expiry is treated as an expired session.
    fn restore_session(&mut self) {
        self.state.is_admin = self
            .state
            .admin_user
            .as_ref()
            .is_some_and(|a| a.is_active);

        if self.state.user.is_some() && self.state.session_expiry.is_none() {
            tracing::warn!("stored user has no session expiry, clearing session");
            self.state.user = None;
            self.state.admin_user = None;
            self.state.is_admin = false;
            self.state.cart_items.clear();
            self.recompute_cart();
            self.persist();
        }
        if self.state.user.is_none() {
            self.state.session_expiry = None;
        }
        self.state.is_authenticated = self.state.user.is_some();
    }

    fn persist(&mut self) {
        let encoded = match persist::encode(&self.state) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!(error = %e, "could not serialize store state");
                return;
            }
        };
        if let Err(e) = self.storage.set_item(STORAGE_KEY, &encoded) {
            tracing::warn!(error = %e, "could not persist store state");
        }
    }
}
