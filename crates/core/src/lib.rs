//! i1Fashion Core - Shared types library.
//!
//! This crate provides common types used across all i1Fashion components:
//! - `client` - Device-side session/cart store and API client
//! - `storefront` - Customer-facing JSON API
//! - `admin` - PIN-protected administration API
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, emails, statuses and order numbers
//! - [`models`] - Catalog, order and user records shared between client and servers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;

pub use models::*;
pub use types::*;
