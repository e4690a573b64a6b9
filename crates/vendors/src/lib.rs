//! Vendor adapters for the two supported smart-lock platforms.
//!
//! [`VendorAdapter`] is the single polymorphic contract the rest of the
//! system talks to; [`CloudLockAdapter`] and [`SelfHostedLockAdapter`] map it
//! onto the two vendors' HTTP APIs, normalizing their different auth models
//! and (lack of) idempotency guarantees behind one async interface. Side
//! effects are confined to outbound HTTP; the only local state the adapters
//! touch is the [`CredentialStore`] token cache during credential exchange.

pub mod adapter;
pub mod cloud;
pub mod credentials;
mod http;
pub mod registry;
pub mod self_hosted;

pub use adapter::{
    CodeSpec, VendorAccessCode, VendorAdapter, VendorError, VendorLock, VendorLockDetail,
};
pub use cloud::{CloudConfig, CloudLockAdapter, ConnectSession};
pub use credentials::CredentialStore;
pub use registry::AdapterRegistry;
pub use self_hosted::{SelfHostedConfig, SelfHostedLockAdapter};
