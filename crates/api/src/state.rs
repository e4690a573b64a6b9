use std::sync::Arc;

use lockdesk_events::EventBus;
use lockdesk_provisioning::{DistributionRunner, LockSync, PasscodeProvisioner};
use lockdesk_vendors::{AdapterRegistry, CloudLockAdapter, CredentialStore, SelfHostedLockAdapter};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: lockdesk_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Centralized event bus for publishing platform events.
    pub event_bus: Arc<EventBus>,
    /// Vendor adapter registry (trait objects, keyed by vendor).
    pub adapters: AdapterRegistry,
    /// Idempotent passcode lifecycle over the vendor adapters.
    pub provisioner: PasscodeProvisioner,
    /// Lock inventory sync against the vendor APIs.
    pub lock_sync: LockSync,
    /// Distribution run executor (shared with the background scheduler).
    pub distribution: DistributionRunner,
    /// Concrete cloud adapter, for the connect-session onboarding endpoint.
    pub cloud: Arc<CloudLockAdapter>,
    /// Concrete self-hosted adapter, for the credential exchange endpoint.
    pub self_hosted: Arc<SelfHostedLockAdapter>,
    /// Vendor token cache.
    pub credentials: CredentialStore,
}
