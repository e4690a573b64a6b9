//! Vendor-to-adapter dispatch.
//!
//! Adapters are constructed once at startup and handed in explicitly; the
//! registry replaces per-call-site branching on vendor type with a single
//! lookup when a lock is resolved.

use std::sync::Arc;

use lockdesk_core::Vendor;

use crate::adapter::VendorAdapter;

/// Holds one adapter per supported vendor.
#[derive(Clone)]
pub struct AdapterRegistry {
    cloud: Arc<dyn VendorAdapter>,
    self_hosted: Arc<dyn VendorAdapter>,
}

impl AdapterRegistry {
    /// Build a registry from explicitly constructed adapters. Tests pass
    /// doubles here; `main` passes the real HTTP adapters.
    pub fn new(cloud: Arc<dyn VendorAdapter>, self_hosted: Arc<dyn VendorAdapter>) -> Self {
        Self { cloud, self_hosted }
    }

    /// The adapter for a vendor.
    pub fn adapter_for(&self, vendor: Vendor) -> Arc<dyn VendorAdapter> {
        match vendor {
            Vendor::Cloud => Arc::clone(&self.cloud),
            Vendor::SelfHosted => Arc::clone(&self.self_hosted),
        }
    }
}
