//! Repository for the distribution run ledger.

use chrono::NaiveDate;
use sqlx::PgPool;

use lockdesk_core::types::DbId;

use crate::models::distribution::{
    CreateDistributionItem, DistributionItem, DistributionRunRecord,
};

const RUN_COLUMNS: &str = "\
    id, triggered_by, run_date, started_at, finished_at, total, provisioned, \
    skipped, failed";

const ITEM_COLUMNS: &str = "\
    id, run_id, reservation_ref, listing_id, lock_id, guest_name, outcome, \
    detail, created_at";

/// Records distribution runs and their per-reservation outcomes.
pub struct DistributionRepo;

impl DistributionRepo {
    /// Open a new run row (`finished_at` null until [`finish_run`](Self::finish_run)).
    pub async fn create_run(
        pool: &PgPool,
        triggered_by: &str,
        run_date: NaiveDate,
    ) -> Result<DistributionRunRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO distribution_runs (triggered_by, run_date) \
             VALUES ($1, $2) RETURNING {RUN_COLUMNS}"
        );
        sqlx::query_as::<_, DistributionRunRecord>(&query)
            .bind(triggered_by)
            .bind(run_date)
            .fetch_one(pool)
            .await
    }

    /// Close a run row with its final counts.
    pub async fn finish_run(
        pool: &PgPool,
        run_id: DbId,
        total: i32,
        provisioned: i32,
        skipped: i32,
        failed: i32,
    ) -> Result<DistributionRunRecord, sqlx::Error> {
        let query = format!(
            "UPDATE distribution_runs SET \
                 finished_at = now(), total = $2, provisioned = $3, \
                 skipped = $4, failed = $5 \
             WHERE id = $1 RETURNING {RUN_COLUMNS}"
        );
        sqlx::query_as::<_, DistributionRunRecord>(&query)
            .bind(run_id)
            .bind(total)
            .bind(provisioned)
            .bind(skipped)
            .bind(failed)
            .fetch_one(pool)
            .await
    }

    /// Record the terminal outcome for one reservation within a run.
    pub async fn create_item(
        pool: &PgPool,
        run_id: DbId,
        item: &CreateDistributionItem,
    ) -> Result<DistributionItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO distribution_items \
                 (run_id, reservation_ref, listing_id, lock_id, guest_name, outcome, detail) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {ITEM_COLUMNS}"
        );
        sqlx::query_as::<_, DistributionItem>(&query)
            .bind(run_id)
            .bind(&item.reservation_ref)
            .bind(item.listing_id)
            .bind(item.lock_id)
            .bind(&item.guest_name)
            .bind(&item.outcome)
            .bind(&item.detail)
            .fetch_one(pool)
            .await
    }

    /// List runs, newest first.
    pub async fn list_runs(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<DistributionRunRecord>, sqlx::Error> {
        let query =
            format!("SELECT {RUN_COLUMNS} FROM distribution_runs ORDER BY started_at DESC, id DESC LIMIT $1");
        sqlx::query_as::<_, DistributionRunRecord>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Find a single run by ID.
    pub async fn find_run(
        pool: &PgPool,
        run_id: DbId,
    ) -> Result<Option<DistributionRunRecord>, sqlx::Error> {
        let query = format!("SELECT {RUN_COLUMNS} FROM distribution_runs WHERE id = $1");
        sqlx::query_as::<_, DistributionRunRecord>(&query)
            .bind(run_id)
            .fetch_optional(pool)
            .await
    }

    /// List the items of a run in processing order.
    pub async fn list_items(
        pool: &PgPool,
        run_id: DbId,
    ) -> Result<Vec<DistributionItem>, sqlx::Error> {
        let query =
            format!("SELECT {ITEM_COLUMNS} FROM distribution_items WHERE run_id = $1 ORDER BY id");
        sqlx::query_as::<_, DistributionItem>(&query)
            .bind(run_id)
            .fetch_all(pool)
            .await
    }

    /// Whether any scheduled run already exists for a date. Used by the daily
    /// background task to stay restart-safe.
    pub async fn scheduled_run_exists(
        pool: &PgPool,
        run_date: NaiveDate,
    ) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM distribution_runs \
             WHERE run_date = $1 AND triggered_by = 'schedule'",
        )
        .bind(run_date)
        .fetch_one(pool)
        .await?;
        Ok(count > 0)
    }
}
