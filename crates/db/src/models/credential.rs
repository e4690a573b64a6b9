//! Vendor credential cache models.

use sqlx::FromRow;

use lockdesk_core::types::{DbId, Timestamp};

/// A row from the `vendor_credentials` table: the cached access token for
/// one self-hosted vendor account.
#[derive(Debug, Clone, FromRow)]
pub struct VendorCredential {
    pub id: DbId,
    pub account_ref: String,
    pub access_token: String,
    pub obtained_at: Timestamp,
}
