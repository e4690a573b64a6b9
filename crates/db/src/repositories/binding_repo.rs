//! Repository for the `listing_lock_bindings` table.
//!
//! This is the single writer of binding state. The `bind` operation is the
//! one place in the system that needs transactional ordering: all four steps
//! run in a single transaction, serialized per lock by a transaction-scoped
//! advisory lock, with the partial unique index `uq_bindings_active_lock` as
//! backstop.

use sqlx::PgPool;

use lockdesk_core::types::DbId;

use crate::models::binding::Binding;

const BINDING_COLUMNS: &str = "id, listing_id, lock_id, status, created_at, updated_at";

/// Failure modes of binding operations.
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    /// The requested lock already has an active binding to another listing.
    /// Surfaced to callers as a user-correctable conflict.
    #[error("Lock {lock_id} is already bound to listing {bound_listing_id}")]
    LockAlreadyBound { lock_id: DbId, bound_listing_id: DbId },

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Provides the exclusive listing/lock binding operations.
pub struct BindingRepo;

impl BindingRepo {
    /// Atomically bind a listing to a lock.
    ///
    /// 1. If `(listing_id, lock_id)` is already the active binding, return it
    ///    unchanged (idempotent no-op).
    /// 2. If the lock is actively bound to a different listing, fail with
    ///    [`BindingError::LockAlreadyBound`] before any write.
    /// 3. Deactivate the listing's current active binding, if any.
    /// 4. Insert the new active binding.
    ///
    /// Concurrent binds targeting the same lock serialize on a
    /// `pg_advisory_xact_lock` keyed by the lock id, so one fully precedes
    /// the other. Concurrent binds for the same listing against different
    /// locks can still race; `uq_bindings_active_listing` rejects the loser.
    pub async fn bind(
        pool: &PgPool,
        listing_id: DbId,
        lock_id: DbId,
    ) -> Result<Binding, BindingError> {
        let mut tx = pool.begin().await?;

        // Serialize all binds for this lock. Released on commit/rollback.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(lock_id)
            .execute(&mut *tx)
            .await?;

        let lock_binding_query = format!(
            "SELECT {BINDING_COLUMNS} FROM listing_lock_bindings \
             WHERE lock_id = $1 AND status = 'active'"
        );
        let existing_for_lock = sqlx::query_as::<_, Binding>(&lock_binding_query)
            .bind(lock_id)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(existing) = existing_for_lock {
            if existing.listing_id == listing_id {
                // Step 1: the requested pair is already active.
                tx.commit().await?;
                return Ok(existing);
            }
            // Step 2: exclusivity protected before any write.
            return Err(BindingError::LockAlreadyBound {
                lock_id,
                bound_listing_id: existing.listing_id,
            });
        }

        // Step 3: deactivate the listing's current binding (at most one).
        sqlx::query(
            "UPDATE listing_lock_bindings SET status = 'inactive', updated_at = now() \
             WHERE listing_id = $1 AND status = 'active'",
        )
        .bind(listing_id)
        .execute(&mut *tx)
        .await?;

        // Step 4: insert the new active binding.
        let insert_query = format!(
            "INSERT INTO listing_lock_bindings (listing_id, lock_id) \
             VALUES ($1, $2) RETURNING {BINDING_COLUMNS}"
        );
        let binding = sqlx::query_as::<_, Binding>(&insert_query)
            .bind(listing_id)
            .bind(lock_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(binding)
    }

    /// Deactivate the active binding for a listing. No-op if none exists.
    pub async fn unbind(pool: &PgPool, listing_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE listing_lock_bindings SET status = 'inactive', updated_at = now() \
             WHERE listing_id = $1 AND status = 'active'",
        )
        .bind(listing_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// The lock currently bound to a listing, if any. Read path used by the
    /// distribution run.
    pub async fn resolve_lock_for(
        pool: &PgPool,
        listing_id: DbId,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT lock_id FROM listing_lock_bindings \
             WHERE listing_id = $1 AND status = 'active'",
        )
        .bind(listing_id)
        .fetch_optional(pool)
        .await
    }

    /// The active binding row for a listing, if any.
    pub async fn find_active_for_listing(
        pool: &PgPool,
        listing_id: DbId,
    ) -> Result<Option<Binding>, sqlx::Error> {
        let query = format!(
            "SELECT {BINDING_COLUMNS} FROM listing_lock_bindings \
             WHERE listing_id = $1 AND status = 'active'"
        );
        sqlx::query_as::<_, Binding>(&query)
            .bind(listing_id)
            .fetch_optional(pool)
            .await
    }

    /// Full binding history for a listing, newest first, active and inactive.
    pub async fn history_for_listing(
        pool: &PgPool,
        listing_id: DbId,
    ) -> Result<Vec<Binding>, sqlx::Error> {
        let query = format!(
            "SELECT {BINDING_COLUMNS} FROM listing_lock_bindings \
             WHERE listing_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Binding>(&query)
            .bind(listing_id)
            .fetch_all(pool)
            .await
    }
}
