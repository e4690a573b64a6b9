//! Lockdesk event bus and outcome notification infrastructure.
//!
//! Provisioning outcomes are published as [`PlatformEvent`]s on an in-process
//! broadcast bus; the [`OutcomeNotifier`] relays the ones operators care
//! about (run summaries, per-guest failures) by email, out of band, so a
//! notification failure never affects provisioning.

pub mod bus;
pub mod delivery;
pub mod notifier;

pub use bus::{EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery};
pub use notifier::OutcomeNotifier;
