//! Integration tests for the idempotent passcode provisioner.
//!
//! Runs against a real database with an in-memory vendor; the vendor fake
//! keeps the real vendors' non-idempotent create semantics, so these tests
//! demonstrate that the provisioner is the component that prevents
//! duplicates.

mod common;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use sqlx::PgPool;

use common::{fake_registry, seed_cloud_lock, FakeVendor};
use lockdesk_core::types::Timestamp;
use lockdesk_core::Vendor;
use lockdesk_db::repositories::{LockRepo, PasscodeRepo};
use lockdesk_provisioning::{PasscodeProvisioner, ProvisionError};
use lockdesk_vendors::VendorError;

fn window() -> (Timestamp, Timestamp) {
    let now = Utc::now();
    (now, now + Duration::days(3))
}

fn setup(pool: &PgPool) -> (FakeVendor, PasscodeProvisioner) {
    let cloud = FakeVendor::new(Vendor::Cloud);
    let self_hosted = FakeVendor::new(Vendor::SelfHosted);
    let registry = fake_registry(&cloud, &self_hosted);
    (cloud, PasscodeProvisioner::new(pool.clone(), registry))
}

// ---------------------------------------------------------------------------
// ensure_code
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn ensure_code_creates_exactly_once(pool: PgPool) {
    let (vendor, provisioner) = setup(&pool);
    let lock_id = seed_cloud_lock(&pool, "dev-1").await;
    let (from, to) = window();

    let first = provisioner
        .ensure_code(lock_id, "Jane Doe", "4567", from, to)
        .await
        .unwrap();
    let second = provisioner
        .ensure_code(lock_id, "Jane Doe", "4567", from, to)
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(vendor.create_calls(), 1);
    // The vendor holds exactly one code, despite its non-idempotent create.
    assert_eq!(vendor.codes_for("dev-1").len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ensure_code_skips_vendor_entirely_when_ledger_has_it(pool: PgPool) {
    let (vendor, provisioner) = setup(&pool);
    let lock_id = seed_cloud_lock(&pool, "dev-1").await;
    let (from, to) = window();

    provisioner
        .ensure_code(lock_id, "Jane Doe", "4567", from, to)
        .await
        .unwrap();
    let lists_after_create = vendor.list_calls();

    provisioner
        .ensure_code(lock_id, "Jane Doe", "4567", from, to)
        .await
        .unwrap();

    // The second call is answered from the ledger, no vendor traffic at all.
    assert_eq!(vendor.list_calls(), lists_after_create);
    assert_eq!(vendor.create_calls(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ensure_code_adopts_code_the_vendor_already_holds(pool: PgPool) {
    let (vendor, provisioner) = setup(&pool);
    let lock_id = seed_cloud_lock(&pool, "dev-1").await;
    let (from, to) = window();

    // A prior run died between vendor create and ledger write.
    let orphan_id = vendor.install_code("dev-1", "Jane Doe", "4567");

    let record = provisioner
        .ensure_code(lock_id, "Jane Doe", "4567", from, to)
        .await
        .unwrap();

    assert_eq!(record.vendor_code_id, orphan_id);
    assert_eq!(vendor.create_calls(), 0);
    assert_eq!(vendor.codes_for("dev-1").len(), 1);
    assert!(PasscodeRepo::find_by_name(&pool, lock_id, "Jane Doe")
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ensure_code_retries_once_after_auth_failure(pool: PgPool) {
    let (vendor, provisioner) = setup(&pool);
    let lock_id = seed_cloud_lock(&pool, "dev-1").await;
    let (from, to) = window();

    vendor.fail_auth_times(1);

    let record = provisioner
        .ensure_code(lock_id, "Jane Doe", "4567", from, to)
        .await
        .unwrap();

    assert_eq!(record.code_value, "4567");
    assert_eq!(vendor.refresh_calls(), 1);
    assert_eq!(vendor.create_calls(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn persistent_auth_failure_stops_after_one_retry(pool: PgPool) {
    let (vendor, provisioner) = setup(&pool);
    let lock_id = seed_cloud_lock(&pool, "dev-1").await;
    let (from, to) = window();

    vendor.fail_auth_always();

    let err = provisioner
        .ensure_code(lock_id, "Jane Doe", "4567", from, to)
        .await
        .unwrap_err();

    assert_matches!(err, ProvisionError::Vendor(VendorError::AuthFailed));
    // One refresh, not a retry loop.
    assert_eq!(vendor.refresh_calls(), 1);
    assert_eq!(vendor.create_calls(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ensure_code_rejects_unknown_and_inactive_locks(pool: PgPool) {
    let (vendor, provisioner) = setup(&pool);
    let (from, to) = window();

    let err = provisioner
        .ensure_code(999_999, "Jane Doe", "4567", from, to)
        .await
        .unwrap_err();
    assert_matches!(err, ProvisionError::UnknownLock(999_999));

    // A deactivated lock behaves like an unknown one.
    let lock_id = seed_cloud_lock(&pool, "dev-1").await;
    LockRepo::deactivate_missing(&pool, Vendor::Cloud, &[])
        .await
        .unwrap();
    let err = provisioner
        .ensure_code(lock_id, "Jane Doe", "4567", from, to)
        .await
        .unwrap_err();
    assert_matches!(err, ProvisionError::UnknownLock(id) if id == lock_id);

    assert_eq!(vendor.create_calls(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn vendor_unavailability_is_reported_not_retried(pool: PgPool) {
    let (vendor, provisioner) = setup(&pool);
    let lock_id = seed_cloud_lock(&pool, "dev-1").await;
    let (from, to) = window();

    vendor.set_unreachable("dev-1");

    let err = provisioner
        .ensure_code(lock_id, "Jane Doe", "4567", from, to)
        .await
        .unwrap_err();

    assert_matches!(err, ProvisionError::Vendor(VendorError::Unavailable(_)));
    assert_eq!(vendor.refresh_calls(), 0);
    // Nothing was written to the ledger.
    assert!(PasscodeRepo::find_by_name(&pool, lock_id, "Jane Doe")
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// revoke_code
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn revoke_code_removes_vendor_code_and_ledger_row(pool: PgPool) {
    let (vendor, provisioner) = setup(&pool);
    let lock_id = seed_cloud_lock(&pool, "dev-1").await;
    let (from, to) = window();

    provisioner
        .ensure_code(lock_id, "Jane Doe", "4567", from, to)
        .await
        .unwrap();

    provisioner.revoke_code(lock_id, "Jane Doe").await.unwrap();

    assert!(vendor.codes_for("dev-1").is_empty());
    assert!(PasscodeRepo::find_by_name(&pool, lock_id, "Jane Doe")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn revoke_of_absent_code_is_a_no_op(pool: PgPool) {
    let (vendor, provisioner) = setup(&pool);
    let lock_id = seed_cloud_lock(&pool, "dev-1").await;

    provisioner.revoke_code(lock_id, "Nobody").await.unwrap();
    assert_eq!(vendor.create_calls(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn revoke_finds_vendor_code_missing_from_ledger(pool: PgPool) {
    let (vendor, provisioner) = setup(&pool);
    let lock_id = seed_cloud_lock(&pool, "dev-1").await;

    // Vendor-side code with no ledger row.
    vendor.install_code("dev-1", "Jane Doe", "4567");

    provisioner.revoke_code(lock_id, "Jane Doe").await.unwrap();
    assert!(vendor.codes_for("dev-1").is_empty());
}

// ---------------------------------------------------------------------------
// Remote control passthrough
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn lock_and_unlock_reach_the_vendor(pool: PgPool) {
    let (vendor, provisioner) = setup(&pool);
    let lock_id = seed_cloud_lock(&pool, "dev-1").await;

    provisioner.lock(lock_id).await.unwrap();
    provisioner.unlock(lock_id).await.unwrap();

    assert_eq!(vendor.lock_calls(), 1);
    assert_eq!(vendor.unlock_calls(), 1);
}
