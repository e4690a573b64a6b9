use lockdesk_core::types::DbId;
use lockdesk_core::UnknownVendor;
use lockdesk_vendors::VendorError;

/// Failure modes of provisioning operations.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// The lock id is not in the local registry (or is deactivated).
    #[error("Lock {0} is not registered")]
    UnknownLock(DbId),

    /// The stored vendor column failed to parse. Registry corruption.
    #[error(transparent)]
    UnknownVendor(#[from] UnknownVendor),

    /// A vendor call failed after the one permitted auth retry.
    #[error(transparent)]
    Vendor(#[from] VendorError),

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}
