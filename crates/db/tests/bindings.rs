//! Integration tests for the exclusive listing/lock binding registry.
//!
//! Exercises the two structural invariants against a real database:
//! - A listing never has more than one active lock.
//! - A lock never has more than one active listing.
//!
//! And the operational behaviour built on top of them: idempotent re-bind,
//! automatic release on re-bind to a new lock, and conflict rejection when
//! the lock is taken.

use assert_matches::assert_matches;
use sqlx::PgPool;

use lockdesk_core::Vendor;
use lockdesk_db::models::lock::UpsertLock;
use lockdesk_db::repositories::{BindingError, BindingRepo, LockRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_lock(pool: &PgPool, native_id: &str) -> i64 {
    LockRepo::upsert(
        pool,
        &UpsertLock {
            vendor: Vendor::Cloud,
            vendor_native_id: native_id.to_string(),
            display_name: format!("Front Door {native_id}"),
            capabilities: serde_json::json!({}),
        },
    )
    .await
    .expect("seed lock")
    .id
}

/// The largest number of active rows sharing a listing_id or a lock_id.
/// Must be 1 (or 0 on an empty table) at every point in time.
async fn max_active_per_column(pool: &PgPool, column: &str) -> i64 {
    sqlx::query_scalar(&format!(
        "SELECT COALESCE(MAX(n), 0) FROM ( \
             SELECT COUNT(*) AS n FROM listing_lock_bindings \
             WHERE status = 'active' GROUP BY {column} \
         ) counts"
    ))
    .fetch_one(pool)
    .await
    .expect("count active bindings")
}

// ---------------------------------------------------------------------------
// Bind
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn bind_creates_active_binding(pool: PgPool) {
    let lock_id = seed_lock(&pool, "dev-100").await;

    let binding = BindingRepo::bind(&pool, 1, lock_id).await.unwrap();
    assert_eq!(binding.listing_id, 1);
    assert_eq!(binding.lock_id, lock_id);
    assert!(binding.is_active());

    let resolved = BindingRepo::resolve_lock_for(&pool, 1).await.unwrap();
    assert_eq!(resolved, Some(lock_id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bind_same_pair_is_idempotent(pool: PgPool) {
    let lock_id = seed_lock(&pool, "dev-100").await;

    let first = BindingRepo::bind(&pool, 1, lock_id).await.unwrap();
    let second = BindingRepo::bind(&pool, 1, lock_id).await.unwrap();

    // Same row, no new history entry.
    assert_eq!(first.id, second.id);
    let history = BindingRepo::history_for_listing(&pool, 1).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rebind_releases_previous_lock(pool: PgPool) {
    let lock_a = seed_lock(&pool, "dev-a").await;
    let lock_b = seed_lock(&pool, "dev-b").await;

    BindingRepo::bind(&pool, 1, lock_a).await.unwrap();
    BindingRepo::bind(&pool, 1, lock_b).await.unwrap();

    assert_eq!(
        BindingRepo::resolve_lock_for(&pool, 1).await.unwrap(),
        Some(lock_b)
    );

    // The released lock is free for another listing.
    let binding = BindingRepo::bind(&pool, 2, lock_a).await.unwrap();
    assert_eq!(binding.lock_id, lock_a);

    // Listing 1 keeps its full history: released lock_a row plus active lock_b.
    let history = BindingRepo::history_for_listing(&pool, 1).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history.iter().filter(|b| b.is_active()).count(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bind_taken_lock_is_rejected_with_holder(pool: PgPool) {
    let lock_id = seed_lock(&pool, "dev-100").await;

    BindingRepo::bind(&pool, 1, lock_id).await.unwrap();
    let err = BindingRepo::bind(&pool, 2, lock_id).await.unwrap_err();

    assert_matches!(
        err,
        BindingError::LockAlreadyBound {
            lock_id: l,
            bound_listing_id: 1,
        } if l == lock_id
    );

    // The original binding is untouched.
    assert_eq!(
        BindingRepo::resolve_lock_for(&pool, 1).await.unwrap(),
        Some(lock_id)
    );
    assert_eq!(BindingRepo::resolve_lock_for(&pool, 2).await.unwrap(), None);
}

// ---------------------------------------------------------------------------
// Unbind
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn unbind_releases_and_is_idempotent(pool: PgPool) {
    let lock_id = seed_lock(&pool, "dev-100").await;
    BindingRepo::bind(&pool, 1, lock_id).await.unwrap();

    BindingRepo::unbind(&pool, 1).await.unwrap();
    assert_eq!(BindingRepo::resolve_lock_for(&pool, 1).await.unwrap(), None);
    assert!(BindingRepo::find_active_for_listing(&pool, 1)
        .await
        .unwrap()
        .is_none());

    // A second release is a no-op, and the history row survives.
    BindingRepo::unbind(&pool, 1).await.unwrap();
    let history = BindingRepo::history_for_listing(&pool, 1).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(!history[0].is_active());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn released_lock_can_be_rebound(pool: PgPool) {
    let lock_id = seed_lock(&pool, "dev-100").await;

    BindingRepo::bind(&pool, 1, lock_id).await.unwrap();
    BindingRepo::unbind(&pool, 1).await.unwrap();

    let binding = BindingRepo::bind(&pool, 2, lock_id).await.unwrap();
    assert_eq!(binding.listing_id, 2);
    assert!(binding.is_active());
}

// ---------------------------------------------------------------------------
// Invariants under a longer sequence
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn exclusivity_holds_across_bind_sequence(pool: PgPool) {
    let lock_a = seed_lock(&pool, "dev-a").await;
    let lock_b = seed_lock(&pool, "dev-b").await;
    let lock_c = seed_lock(&pool, "dev-c").await;

    BindingRepo::bind(&pool, 1, lock_a).await.unwrap();
    BindingRepo::bind(&pool, 2, lock_b).await.unwrap();
    BindingRepo::bind(&pool, 1, lock_c).await.unwrap(); // releases a
    BindingRepo::bind(&pool, 3, lock_a).await.unwrap();
    let _ = BindingRepo::bind(&pool, 3, lock_b).await.unwrap_err(); // b is taken
    BindingRepo::unbind(&pool, 2).await.unwrap();
    BindingRepo::bind(&pool, 3, lock_b).await.unwrap(); // releases a again

    assert!(max_active_per_column(&pool, "listing_id").await <= 1);
    assert!(max_active_per_column(&pool, "lock_id").await <= 1);

    assert_eq!(
        BindingRepo::resolve_lock_for(&pool, 1).await.unwrap(),
        Some(lock_c)
    );
    assert_eq!(BindingRepo::resolve_lock_for(&pool, 2).await.unwrap(), None);
    assert_eq!(
        BindingRepo::resolve_lock_for(&pool, 3).await.unwrap(),
        Some(lock_b)
    );
}
