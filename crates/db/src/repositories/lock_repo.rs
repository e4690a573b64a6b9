//! Repository for the `locks` table: the durable catalog of known locks.

use chrono::Utc;
use sqlx::PgPool;

use lockdesk_core::types::DbId;
use lockdesk_core::Vendor;

use crate::models::lock::{Lock, UpsertLock};

const LOCK_COLUMNS: &str = "\
    id, vendor, vendor_native_id, display_name, status, capabilities, \
    last_synced_at, created_at, updated_at";

/// Provides catalog operations for locks. Locks are never deleted, only
/// deactivated.
pub struct LockRepo;

impl LockRepo {
    /// Upsert a lock discovered during a vendor sync.
    ///
    /// Keyed on `(vendor, vendor_native_id)`. A re-discovered lock gets a
    /// fresh display name, capability snapshot, and `last_synced_at`, and is
    /// reactivated if it had been deactivated.
    pub async fn upsert(pool: &PgPool, lock: &UpsertLock) -> Result<Lock, sqlx::Error> {
        let query = format!(
            "INSERT INTO locks (vendor, vendor_native_id, display_name, capabilities, last_synced_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT ON CONSTRAINT uq_locks_vendor_native_id DO UPDATE SET \
                 display_name = EXCLUDED.display_name, \
                 capabilities = EXCLUDED.capabilities, \
                 last_synced_at = EXCLUDED.last_synced_at, \
                 status = 'active', \
                 updated_at = now() \
             RETURNING {LOCK_COLUMNS}"
        );
        sqlx::query_as::<_, Lock>(&query)
            .bind(lock.vendor.as_str())
            .bind(&lock.vendor_native_id)
            .bind(&lock.display_name)
            .bind(&lock.capabilities)
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    /// Find a lock by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Lock>, sqlx::Error> {
        let query = format!("SELECT {LOCK_COLUMNS} FROM locks WHERE id = $1");
        sqlx::query_as::<_, Lock>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all locks, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Lock>, sqlx::Error> {
        let query = format!("SELECT {LOCK_COLUMNS} FROM locks ORDER BY created_at DESC");
        sqlx::query_as::<_, Lock>(&query).fetch_all(pool).await
    }

    /// List all locks belonging to one vendor.
    pub async fn list_by_vendor(pool: &PgPool, vendor: Vendor) -> Result<Vec<Lock>, sqlx::Error> {
        let query =
            format!("SELECT {LOCK_COLUMNS} FROM locks WHERE vendor = $1 ORDER BY created_at DESC");
        sqlx::query_as::<_, Lock>(&query)
            .bind(vendor.as_str())
            .fetch_all(pool)
            .await
    }

    /// Deactivate every active lock of a vendor that is NOT in the given set
    /// of native IDs. Used after a sync to retire locks the vendor no longer
    /// reports. Returns the number of deactivated rows.
    pub async fn deactivate_missing(
        pool: &PgPool,
        vendor: Vendor,
        present_native_ids: &[String],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE locks SET status = 'inactive', updated_at = now() \
             WHERE vendor = $1 AND status = 'active' AND vendor_native_id <> ALL($2)",
        )
        .bind(vendor.as_str())
        .bind(present_native_ids)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
