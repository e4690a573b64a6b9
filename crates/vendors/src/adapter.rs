//! The common lock-control contract implemented once per vendor.

use async_trait::async_trait;
use serde::Serialize;

use lockdesk_core::types::Timestamp;
use lockdesk_core::Vendor;

/// Errors from the vendor adapter layer.
///
/// The taxonomy the provisioner and distribution run dispatch on:
/// auth failures get exactly one re-exchange-and-retry, unavailability is
/// surfaced for the caller's retry policy, and `CodeNotFound` is benign
/// where deletion is concerned.
#[derive(Debug, thiserror::Error)]
pub enum VendorError {
    /// The vendor rejected our credential (HTTP 401/403).
    #[error("Vendor rejected credentials")]
    AuthFailed,

    /// Network failure, timeout, or vendor 5xx.
    #[error("Vendor unavailable: {0}")]
    Unavailable(String),

    /// The vendor does not know the requested lock.
    #[error("Lock not found at vendor: {0}")]
    LockNotFound(String),

    /// The vendor does not know the requested access code.
    #[error("Access code not found at vendor: {0}")]
    CodeNotFound(String),

    /// Any other non-2xx vendor response.
    #[error("Vendor API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The local credential cache failed (database error).
    #[error("Credential store error: {0}")]
    Credential(String),
}

impl From<reqwest::Error> for VendorError {
    fn from(err: reqwest::Error) -> Self {
        // Timeouts, connect failures, and body-read failures all count as the
        // vendor being unavailable; status-code classification happens before
        // response parsing in the adapters.
        VendorError::Unavailable(err.to_string())
    }
}

impl From<sqlx::Error> for VendorError {
    fn from(err: sqlx::Error) -> Self {
        VendorError::Credential(err.to_string())
    }
}

/// A lock as reported by a vendor's list endpoint.
#[derive(Debug, Clone)]
pub struct VendorLock {
    pub native_id: String,
    pub display_name: String,
    /// Vendor capability snapshot (battery, online state, ...), stored
    /// verbatim in the lock registry.
    pub capabilities: serde_json::Value,
}

/// Detailed state for a single lock.
#[derive(Debug, Clone, Serialize)]
pub struct VendorLockDetail {
    pub native_id: String,
    pub display_name: String,
    pub online: Option<bool>,
    pub battery_percent: Option<i32>,
    /// The vendor's raw response for anything the common shape drops.
    pub raw: serde_json::Value,
}

/// An access code as reported by a vendor's list endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct VendorAccessCode {
    pub vendor_code_id: String,
    pub name: String,
    pub value: String,
    pub valid_from: Option<Timestamp>,
    pub valid_to: Option<Timestamp>,
}

/// The code to create on a lock.
#[derive(Debug, Clone)]
pub struct CodeSpec {
    /// Idempotency key, unique per lock. The vendors do NOT enforce this;
    /// callers must pre-check via `list_access_codes`.
    pub name: String,
    /// The numeric code the guest types on the keypad.
    pub value: String,
    pub valid_from: Timestamp,
    pub valid_to: Timestamp,
}

/// The per-vendor implementation of the common lock-control interface.
///
/// `lock`/`unlock`/`delete_access_code` are idempotent at the vendor;
/// `create_access_code` is NOT: two calls with the same name may create two
/// vendor-side entries, which is why the provisioner owns the idempotency
/// boundary.
#[async_trait]
pub trait VendorAdapter: Send + Sync {
    /// Which vendor this adapter speaks to.
    fn vendor(&self) -> Vendor;

    /// Enumerate the locks visible to the current credential.
    async fn list_locks(&self) -> Result<Vec<VendorLock>, VendorError>;

    /// Detailed state for one lock.
    async fn lock_detail(&self, native_id: &str) -> Result<VendorLockDetail, VendorError>;

    /// Engage the bolt.
    async fn lock(&self, native_id: &str) -> Result<(), VendorError>;

    /// Retract the bolt.
    async fn unlock(&self, native_id: &str) -> Result<(), VendorError>;

    /// All access codes currently present on a lock.
    async fn list_access_codes(&self, native_id: &str)
        -> Result<Vec<VendorAccessCode>, VendorError>;

    /// Create an access code, returning the vendor's id for it.
    async fn create_access_code(
        &self,
        native_id: &str,
        spec: &CodeSpec,
    ) -> Result<String, VendorError>;

    /// Delete an access code. A vendor-side `CodeNotFound` is swallowed here:
    /// the code being gone is the desired outcome.
    async fn delete_access_code(
        &self,
        native_id: &str,
        vendor_code_id: &str,
    ) -> Result<(), VendorError>;

    /// Re-establish the adapter's credential after an [`VendorError::AuthFailed`].
    ///
    /// No-op for the cloud vendor (its API key is static configuration); the
    /// self-hosted vendor re-exchanges username/password for a fresh token
    /// and overwrites the cache.
    async fn refresh_credentials(&self) -> Result<(), VendorError> {
        Ok(())
    }
}
