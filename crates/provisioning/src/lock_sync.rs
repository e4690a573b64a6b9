//! Vendor discovery into the lock registry.

use sqlx::PgPool;

use lockdesk_core::Vendor;
use lockdesk_db::models::lock::{Lock, UpsertLock};
use lockdesk_db::repositories::LockRepo;
use lockdesk_vendors::AdapterRegistry;

use crate::error::ProvisionError;
use crate::provisioner::with_auth_retry;

/// Result of one registry sync against a vendor.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SyncSummary {
    pub vendor: Vendor,
    /// Locks the vendor reported (created or refreshed locally).
    pub discovered: usize,
    /// Previously active locks the vendor no longer reports.
    pub deactivated: u64,
}

/// Pulls the vendor's lock inventory into the durable catalog.
#[derive(Clone)]
pub struct LockSync {
    pool: PgPool,
    adapters: AdapterRegistry,
}

impl LockSync {
    pub fn new(pool: PgPool, adapters: AdapterRegistry) -> Self {
        Self { pool, adapters }
    }

    /// Sync the registry with one vendor's inventory.
    ///
    /// Every reported lock is upserted (reactivating deactivated rows); any
    /// active registry row the vendor stopped reporting is deactivated, never
    /// deleted.
    pub async fn sync(&self, vendor: Vendor) -> Result<(SyncSummary, Vec<Lock>), ProvisionError> {
        let adapter = self.adapters.adapter_for(vendor);
        let vendor_locks = with_auth_retry(adapter.as_ref(), || adapter.list_locks()).await?;

        let mut synced = Vec::with_capacity(vendor_locks.len());
        let mut native_ids = Vec::with_capacity(vendor_locks.len());
        for vendor_lock in &vendor_locks {
            let lock = LockRepo::upsert(
                &self.pool,
                &UpsertLock {
                    vendor,
                    vendor_native_id: vendor_lock.native_id.clone(),
                    display_name: vendor_lock.display_name.clone(),
                    capabilities: vendor_lock.capabilities.clone(),
                },
            )
            .await?;
            native_ids.push(vendor_lock.native_id.clone());
            synced.push(lock);
        }

        let deactivated = LockRepo::deactivate_missing(&self.pool, vendor, &native_ids).await?;
        let summary = SyncSummary {
            vendor,
            discovered: synced.len(),
            deactivated,
        };
        tracing::info!(
            vendor = %vendor,
            discovered = summary.discovered,
            deactivated = summary.deactivated,
            "Lock registry synced"
        );
        Ok((summary, synced))
    }
}
