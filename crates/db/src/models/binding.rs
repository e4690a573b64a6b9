//! Listing/lock binding models.

use serde::Serialize;
use sqlx::FromRow;

use lockdesk_core::types::{DbId, Timestamp};

/// A row from the `listing_lock_bindings` table.
///
/// At most one row per `listing_id` and at most one row per `lock_id` has
/// `status = 'active'`; inactive rows are the audit history of prior
/// assignments.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Binding {
    pub id: DbId,
    pub listing_id: DbId,
    pub lock_id: DbId,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Binding {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}
