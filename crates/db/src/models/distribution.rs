//! Distribution run ledger models.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

use lockdesk_core::types::{DbId, Timestamp};

/// A row from the `distribution_runs` table: one execution of the daily
/// code distribution job.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DistributionRunRecord {
    pub id: DbId,
    pub triggered_by: String,
    pub run_date: NaiveDate,
    pub started_at: Timestamp,
    pub finished_at: Option<Timestamp>,
    pub total: i32,
    pub provisioned: i32,
    pub skipped: i32,
    pub failed: i32,
}

/// A row from the `distribution_items` table: the terminal outcome for one
/// reservation within a run.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DistributionItem {
    pub id: DbId,
    pub run_id: DbId,
    pub reservation_ref: String,
    pub listing_id: DbId,
    pub lock_id: Option<DbId>,
    pub guest_name: String,
    pub outcome: String,
    pub detail: Option<String>,
    pub created_at: Timestamp,
}

/// Payload for recording one processed reservation.
#[derive(Debug, Clone)]
pub struct CreateDistributionItem {
    pub reservation_ref: String,
    pub listing_id: DbId,
    pub lock_id: Option<DbId>,
    pub guest_name: String,
    /// `provisioned`, `skipped_no_lock`, or `failed`.
    pub outcome: String,
    pub detail: Option<String>,
}
