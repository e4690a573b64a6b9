//! Lock entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use lockdesk_core::types::{DbId, Timestamp};
use lockdesk_core::{UnknownVendor, Vendor};

/// A row from the `locks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lock {
    pub id: DbId,
    /// Lowercase vendor discriminator (`"cloud"` / `"self_hosted"`).
    pub vendor: String,
    pub vendor_native_id: String,
    pub display_name: String,
    pub status: String,
    /// Vendor capability snapshot (battery, online state, supported ops).
    pub capabilities: serde_json::Value,
    pub last_synced_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Lock {
    /// Parse the vendor column into the typed enum.
    ///
    /// The `CHECK` constraint on `locks.vendor` makes the error case
    /// unreachable for rows read from the database, but callers surface it
    /// as an error rather than trusting that.
    pub fn vendor(&self) -> Result<Vendor, UnknownVendor> {
        self.vendor.parse()
    }

    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

/// Payload for upserting a lock discovered during a vendor sync.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertLock {
    pub vendor: Vendor,
    pub vendor_native_id: String,
    pub display_name: String,
    pub capabilities: serde_json::Value,
}
