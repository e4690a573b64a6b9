//! Repository for the `passcode_records` ledger.

use sqlx::PgPool;

use lockdesk_core::types::DbId;

use crate::models::passcode::{CreatePasscodeRecord, PasscodeRecord};

const PASSCODE_COLUMNS: &str = "\
    id, lock_id, name, code_value, valid_from, valid_to, vendor_code_id, \
    created_at, updated_at";

/// Local ledger of vendor-held access codes, keyed by `(lock_id, name)`.
pub struct PasscodeRepo;

impl PasscodeRepo {
    /// Insert a ledger row for a code that exists at the vendor.
    ///
    /// Upserts on `(lock_id, name)`: if the provisioner re-adopts a code that
    /// already has a ledger row (e.g. after a remote re-listing), the vendor
    /// code id and validity window are refreshed in place.
    pub async fn upsert(
        pool: &PgPool,
        record: &CreatePasscodeRecord,
    ) -> Result<PasscodeRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO passcode_records \
                 (lock_id, name, code_value, valid_from, valid_to, vendor_code_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT ON CONSTRAINT uq_passcode_records_lock_id_name DO UPDATE SET \
                 code_value = EXCLUDED.code_value, \
                 valid_from = EXCLUDED.valid_from, \
                 valid_to = EXCLUDED.valid_to, \
                 vendor_code_id = EXCLUDED.vendor_code_id, \
                 updated_at = now() \
             RETURNING {PASSCODE_COLUMNS}"
        );
        sqlx::query_as::<_, PasscodeRecord>(&query)
            .bind(record.lock_id)
            .bind(&record.name)
            .bind(&record.code_value)
            .bind(record.valid_from)
            .bind(record.valid_to)
            .bind(&record.vendor_code_id)
            .fetch_one(pool)
            .await
    }

    /// Find the ledger row for a named code on a lock.
    pub async fn find_by_name(
        pool: &PgPool,
        lock_id: DbId,
        name: &str,
    ) -> Result<Option<PasscodeRecord>, sqlx::Error> {
        let query =
            format!("SELECT {PASSCODE_COLUMNS} FROM passcode_records WHERE lock_id = $1 AND name = $2");
        sqlx::query_as::<_, PasscodeRecord>(&query)
            .bind(lock_id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List all ledger rows for a lock.
    pub async fn list_for_lock(
        pool: &PgPool,
        lock_id: DbId,
    ) -> Result<Vec<PasscodeRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {PASSCODE_COLUMNS} FROM passcode_records \
             WHERE lock_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, PasscodeRecord>(&query)
            .bind(lock_id)
            .fetch_all(pool)
            .await
    }

    /// Delete the ledger row for a named code. Returns whether a row existed.
    pub async fn delete_by_name(
        pool: &PgPool,
        lock_id: DbId,
        name: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM passcode_records WHERE lock_id = $1 AND name = $2")
            .bind(lock_id)
            .bind(name)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
