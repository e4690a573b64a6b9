//! Shared domain types for the Lockdesk access-control backend.
//!
//! Everything here is pure and synchronous: identifier aliases, the vendor
//! enum, the domain error taxonomy, and entry-code derivation. Async and I/O
//! concerns live in the downstream crates.

pub mod entry_code;
pub mod error;
pub mod types;
pub mod vendor;

pub use error::CoreError;
pub use vendor::{UnknownVendor, Vendor};
