//! Idempotent create/verify/delete of named access codes.
//!
//! The vendors do not guarantee an idempotent create: two calls with the same
//! name may create two vendor-side entries. [`PasscodeProvisioner`] is the
//! compensating boundary. `ensure_code` consults the local ledger first, then
//! the vendor's own listing, and only creates when the name is absent in
//! both; `revoke_code` treats an already-deleted code as success.

use std::future::Future;

use sqlx::PgPool;

use lockdesk_core::types::{DbId, Timestamp};
use lockdesk_db::models::lock::Lock;
use lockdesk_db::models::passcode::{CreatePasscodeRecord, PasscodeRecord};
use lockdesk_db::repositories::{LockRepo, PasscodeRepo};
use lockdesk_vendors::{AdapterRegistry, CodeSpec, VendorAccessCode, VendorAdapter, VendorError};

use crate::error::ProvisionError;

/// Idempotent passcode lifecycle over the correct [`VendorAdapter`].
#[derive(Clone)]
pub struct PasscodeProvisioner {
    pool: PgPool,
    adapters: AdapterRegistry,
}

impl PasscodeProvisioner {
    pub fn new(pool: PgPool, adapters: AdapterRegistry) -> Self {
        Self { pool, adapters }
    }

    /// Ensure a named code exists on a lock, creating it at the vendor only
    /// if neither the local ledger nor the vendor already has it.
    ///
    /// Auth failures get exactly one credential re-exchange and retry;
    /// anything persisting after that is reported up. An unreachable vendor
    /// is reported up untouched for the caller's retry policy.
    pub async fn ensure_code(
        &self,
        lock_id: DbId,
        name: &str,
        value: &str,
        valid_from: Timestamp,
        valid_to: Timestamp,
    ) -> Result<PasscodeRecord, ProvisionError> {
        let lock = self.resolve_lock(lock_id).await?;
        let vendor = lock.vendor()?;
        let adapter = self.adapters.adapter_for(vendor);

        // Fast path: the ledger already mirrors this code.
        if let Some(record) = PasscodeRepo::find_by_name(&self.pool, lock_id, name).await? {
            tracing::debug!(lock_id, name, "Passcode already in ledger, skipping vendor call");
            return Ok(record);
        }

        // The ledger can miss codes the vendor holds (a prior run that died
        // between create and persist), so the vendor listing is the real
        // idempotency check.
        let native_id = lock.vendor_native_id.clone();
        let remote_codes =
            with_auth_retry(adapter.as_ref(), || adapter.list_access_codes(&native_id)).await?;

        if let Some(existing) = remote_codes.into_iter().find(|c| c.name == name) {
            tracing::info!(
                lock_id,
                name,
                vendor_code_id = %existing.vendor_code_id,
                "Adopting vendor-side code into the ledger"
            );
            let record = PasscodeRepo::upsert(
                &self.pool,
                &CreatePasscodeRecord {
                    lock_id,
                    name: name.to_string(),
                    code_value: existing.value,
                    valid_from: existing.valid_from.unwrap_or(valid_from),
                    valid_to: existing.valid_to.unwrap_or(valid_to),
                    vendor_code_id: existing.vendor_code_id,
                },
            )
            .await?;
            return Ok(record);
        }

        let spec = CodeSpec {
            name: name.to_string(),
            value: value.to_string(),
            valid_from,
            valid_to,
        };
        let vendor_code_id =
            with_auth_retry(adapter.as_ref(), || adapter.create_access_code(&native_id, &spec))
                .await?;

        tracing::info!(
            lock_id,
            name,
            vendor = %vendor,
            vendor_code_id = %vendor_code_id,
            "Access code created at vendor"
        );

        let record = PasscodeRepo::upsert(
            &self.pool,
            &CreatePasscodeRecord {
                lock_id,
                name: name.to_string(),
                code_value: value.to_string(),
                valid_from,
                valid_to,
                vendor_code_id,
            },
        )
        .await?;
        Ok(record)
    }

    /// Delete a named code from the vendor and the ledger. No-op when the
    /// code exists in neither place.
    pub async fn revoke_code(&self, lock_id: DbId, name: &str) -> Result<(), ProvisionError> {
        let lock = self.resolve_lock(lock_id).await?;
        let adapter = self.adapters.adapter_for(lock.vendor()?);
        let native_id = lock.vendor_native_id.clone();

        let vendor_code_id = match PasscodeRepo::find_by_name(&self.pool, lock_id, name).await? {
            Some(record) => Some(record.vendor_code_id),
            None => {
                let remote =
                    with_auth_retry(adapter.as_ref(), || adapter.list_access_codes(&native_id))
                        .await?;
                remote.into_iter().find(|c| c.name == name).map(|c| c.vendor_code_id)
            }
        };

        if let Some(code_id) = vendor_code_id {
            with_auth_retry(adapter.as_ref(), || {
                adapter.delete_access_code(&native_id, &code_id)
            })
            .await?;
            tracing::info!(lock_id, name, vendor_code_id = %code_id, "Access code revoked");
        }

        PasscodeRepo::delete_by_name(&self.pool, lock_id, name).await?;
        Ok(())
    }

    /// List the codes currently installed on the vendor side of a lock.
    pub async fn list_vendor_codes(
        &self,
        lock_id: DbId,
    ) -> Result<Vec<VendorAccessCode>, ProvisionError> {
        let lock = self.resolve_lock(lock_id).await?;
        let adapter = self.adapters.adapter_for(lock.vendor()?);
        let native_id = lock.vendor_native_id.clone();
        let codes = with_auth_retry(adapter.as_ref(), || adapter.list_access_codes(&native_id))
            .await?;
        Ok(codes)
    }

    /// Remotely engage the bolt of a lock.
    pub async fn lock(&self, lock_id: DbId) -> Result<(), ProvisionError> {
        let lock = self.resolve_lock(lock_id).await?;
        let adapter = self.adapters.adapter_for(lock.vendor()?);
        let native_id = lock.vendor_native_id.clone();
        with_auth_retry(adapter.as_ref(), || adapter.lock(&native_id)).await?;
        tracing::info!(lock_id, "Lock engaged remotely");
        Ok(())
    }

    /// Remotely release the bolt of a lock.
    pub async fn unlock(&self, lock_id: DbId) -> Result<(), ProvisionError> {
        let lock = self.resolve_lock(lock_id).await?;
        let adapter = self.adapters.adapter_for(lock.vendor()?);
        let native_id = lock.vendor_native_id.clone();
        with_auth_retry(adapter.as_ref(), || adapter.unlock(&native_id)).await?;
        tracing::info!(lock_id, "Lock released remotely");
        Ok(())
    }

    async fn resolve_lock(&self, lock_id: DbId) -> Result<Lock, ProvisionError> {
        LockRepo::find_by_id(&self.pool, lock_id)
            .await?
            .filter(Lock::is_active)
            .ok_or(ProvisionError::UnknownLock(lock_id))
    }
}

/// Run a vendor operation, allowing exactly one credential re-exchange and
/// retry when the vendor rejects the current credential. Persistent failure
/// is reported up, never retried further.
pub(crate) async fn with_auth_retry<T, F, Fut>(
    adapter: &dyn VendorAdapter,
    op: F,
) -> Result<T, VendorError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, VendorError>>,
{
    match op().await {
        Err(VendorError::AuthFailed) => {
            tracing::warn!(vendor = %adapter.vendor(), "Vendor rejected credentials, re-exchanging");
            adapter.refresh_credentials().await?;
            op().await
        }
        other => other,
    }
}
