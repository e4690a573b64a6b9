//! Shared test doubles for the provisioning integration tests.
//!
//! `FakeVendor` is an in-memory vendor API that deliberately mirrors the real
//! vendors' awkward contract: `create_access_code` is NOT idempotent (calling
//! it twice with the same name stores two entries), auth failures can be
//! injected, and whole locks can be marked unreachable.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use lockdesk_core::Vendor;
use lockdesk_db::models::lock::UpsertLock;
use lockdesk_db::repositories::LockRepo;
use lockdesk_provisioning::{Reservation, ReservationSource, ReservationSourceError};
use lockdesk_vendors::{
    AdapterRegistry, CodeSpec, VendorAccessCode, VendorAdapter, VendorError, VendorLock,
    VendorLockDetail,
};

#[derive(Default)]
struct FakeVendorInner {
    /// Codes per native lock id. A Vec, not a map by name: duplicates are
    /// exactly what the real vendors allow.
    codes: Mutex<HashMap<String, Vec<VendorAccessCode>>>,
    /// Native ids that currently fail with `Unavailable`.
    unreachable: Mutex<HashSet<String>>,
    /// How many upcoming operations fail with `AuthFailed`. Cleared by
    /// `refresh_credentials`.
    auth_failures_left: AtomicUsize,
    /// When true, operations fail with `AuthFailed` even after a refresh.
    auth_always_fails: Mutex<bool>,
    next_code_id: AtomicUsize,
    create_calls: AtomicUsize,
    list_calls: AtomicUsize,
    lock_calls: AtomicUsize,
    unlock_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
}

/// Cloneable handle to one fake vendor; all clones share state.
#[derive(Clone)]
pub struct FakeVendor {
    vendor: Vendor,
    inner: Arc<FakeVendorInner>,
}

impl FakeVendor {
    pub fn new(vendor: Vendor) -> Self {
        Self {
            vendor,
            inner: Arc::new(FakeVendorInner::default()),
        }
    }

    pub fn create_calls(&self) -> usize {
        self.inner.create_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.inner.list_calls.load(Ordering::SeqCst)
    }

    pub fn lock_calls(&self) -> usize {
        self.inner.lock_calls.load(Ordering::SeqCst)
    }

    pub fn unlock_calls(&self) -> usize {
        self.inner.unlock_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.inner.refresh_calls.load(Ordering::SeqCst)
    }

    /// Make the next `n` operations fail with `AuthFailed`.
    pub fn fail_auth_times(&self, n: usize) {
        self.inner.auth_failures_left.store(n, Ordering::SeqCst);
    }

    /// Make every operation fail with `AuthFailed`, refresh or not.
    pub fn fail_auth_always(&self) {
        *self.inner.auth_always_fails.lock().unwrap() = true;
    }

    /// Mark one lock unreachable.
    pub fn set_unreachable(&self, native_id: &str) {
        self.inner
            .unreachable
            .lock()
            .unwrap()
            .insert(native_id.to_string());
    }

    /// Pre-install a code at the vendor without going through the adapter.
    pub fn install_code(&self, native_id: &str, name: &str, value: &str) -> String {
        let code_id = format!("pre-{}", self.inner.next_code_id.fetch_add(1, Ordering::SeqCst));
        self.inner
            .codes
            .lock()
            .unwrap()
            .entry(native_id.to_string())
            .or_default()
            .push(VendorAccessCode {
                vendor_code_id: code_id.clone(),
                name: name.to_string(),
                value: value.to_string(),
                valid_from: None,
                valid_to: None,
            });
        code_id
    }

    /// All codes currently held for a lock.
    pub fn codes_for(&self, native_id: &str) -> Vec<VendorAccessCode> {
        self.inner
            .codes
            .lock()
            .unwrap()
            .get(native_id)
            .cloned()
            .unwrap_or_default()
    }

    fn gate(&self, native_id: Option<&str>) -> Result<(), VendorError> {
        if *self.inner.auth_always_fails.lock().unwrap() {
            return Err(VendorError::AuthFailed);
        }
        let left = self.inner.auth_failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.inner.auth_failures_left.store(left - 1, Ordering::SeqCst);
            return Err(VendorError::AuthFailed);
        }
        if let Some(id) = native_id {
            if self.inner.unreachable.lock().unwrap().contains(id) {
                return Err(VendorError::Unavailable(format!(
                    "simulated timeout for {id}"
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl VendorAdapter for FakeVendor {
    fn vendor(&self) -> Vendor {
        self.vendor
    }

    async fn list_locks(&self) -> Result<Vec<VendorLock>, VendorError> {
        self.gate(None)?;
        Ok(Vec::new())
    }

    async fn lock_detail(&self, native_id: &str) -> Result<VendorLockDetail, VendorError> {
        self.gate(Some(native_id))?;
        Ok(VendorLockDetail {
            native_id: native_id.to_string(),
            display_name: format!("Fake {native_id}"),
            online: Some(true),
            battery_percent: Some(100),
            raw: serde_json::json!({}),
        })
    }

    async fn lock(&self, native_id: &str) -> Result<(), VendorError> {
        self.gate(Some(native_id))?;
        self.inner.lock_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn unlock(&self, native_id: &str) -> Result<(), VendorError> {
        self.gate(Some(native_id))?;
        self.inner.unlock_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_access_codes(
        &self,
        native_id: &str,
    ) -> Result<Vec<VendorAccessCode>, VendorError> {
        self.gate(Some(native_id))?;
        self.inner.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.codes_for(native_id))
    }

    async fn create_access_code(
        &self,
        native_id: &str,
        spec: &CodeSpec,
    ) -> Result<String, VendorError> {
        self.gate(Some(native_id))?;
        self.inner.create_calls.fetch_add(1, Ordering::SeqCst);
        let code_id = format!("vc-{}", self.inner.next_code_id.fetch_add(1, Ordering::SeqCst));
        self.inner
            .codes
            .lock()
            .unwrap()
            .entry(native_id.to_string())
            .or_default()
            .push(VendorAccessCode {
                vendor_code_id: code_id.clone(),
                name: spec.name.clone(),
                value: spec.value.clone(),
                valid_from: Some(spec.valid_from),
                valid_to: Some(spec.valid_to),
            });
        Ok(code_id)
    }

    async fn delete_access_code(
        &self,
        native_id: &str,
        vendor_code_id: &str,
    ) -> Result<(), VendorError> {
        self.gate(Some(native_id))?;
        // Idempotent, like the real adapters after CodeNotFound swallowing.
        if let Some(codes) = self.inner.codes.lock().unwrap().get_mut(native_id) {
            codes.retain(|c| c.vendor_code_id != vendor_code_id);
        }
        Ok(())
    }

    async fn refresh_credentials(&self) -> Result<(), VendorError> {
        self.inner.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.auth_failures_left.store(0, Ordering::SeqCst);
        Ok(())
    }
}

/// A reservation source backed by a fixed in-memory list.
#[derive(Default)]
pub struct FakeReservations {
    reservations: Mutex<Vec<Reservation>>,
    unavailable: Mutex<bool>,
}

impl FakeReservations {
    pub fn with(reservations: Vec<Reservation>) -> Arc<Self> {
        Arc::new(Self {
            reservations: Mutex::new(reservations),
            unavailable: Mutex::new(false),
        })
    }

    pub fn set_unavailable(&self) {
        *self.unavailable.lock().unwrap() = true;
    }
}

#[async_trait]
impl ReservationSource for FakeReservations {
    async fn arriving_on(&self, _date: NaiveDate) -> Result<Vec<Reservation>, ReservationSourceError> {
        if *self.unavailable.lock().unwrap() {
            return Err(ReservationSourceError::Unavailable(
                "simulated outage".to_string(),
            ));
        }
        Ok(self.reservations.lock().unwrap().clone())
    }
}

/// Registry wiring both slots to fakes; tests usually drive only one.
pub fn fake_registry(cloud: &FakeVendor, self_hosted: &FakeVendor) -> AdapterRegistry {
    AdapterRegistry::new(Arc::new(cloud.clone()), Arc::new(self_hosted.clone()))
}

/// Seed one active cloud lock and return its registry id.
pub async fn seed_cloud_lock(pool: &PgPool, native_id: &str) -> i64 {
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
