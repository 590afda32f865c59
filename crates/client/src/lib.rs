//! i1Fashion client library.
//!
//! Everything a shopper's device keeps between page loads:
//!
//! - [`store`] - The session and cart container, persisted on every change
//! - [`storage`] - Device-local key/value storage backends
//! - [`checkout`] - Turning the cart into a placed order
//! - [`api`] - HTTP client for the storefront and admin APIs
//! - [`dashboard`] - Admin dashboard loading with a slow-response warning
//!
//! The store is an ordinary value owned by the caller. Nothing here is global.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod checkout;
pub mod clock;
pub mod dashboard;
pub mod obfuscate;
pub mod storage;
pub mod store;

pub use api::{ApiClient, ApiError};
pub use checkout::{
    CheckoutError, CheckoutFlow, CheckoutStep, OrderGateway, PlacedOrder, place_order,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use storage::{DeviceStorage, FileStorage, MemoryStorage, StorageError};
pub use store::{CartItem, ClientStore, StoreState};
