//! Passcode ledger models.

use serde::Serialize;
use sqlx::FromRow;

use lockdesk_core::types::{DbId, Timestamp};

/// A row from the `passcode_records` table, mirroring one vendor-held access
/// code. `name` is the idempotency key, unique per lock.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PasscodeRecord {
    pub id: DbId,
    pub lock_id: DbId,
    pub name: String,
    pub code_value: String,
    pub valid_from: Timestamp,
    pub valid_to: Timestamp,
    pub vendor_code_id: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Payload for inserting a ledger row after a vendor-side code is known.
#[derive(Debug, Clone)]
pub struct CreatePasscodeRecord {
    pub lock_id: DbId,
    pub name: String,
    pub code_value: String,
    pub valid_from: Timestamp,
    pub valid_to: Timestamp,
    pub vendor_code_id: String,
}
