//! Passcode provisioning: the idempotency boundary between Lockdesk and the
//! vendors' non-idempotent code APIs, plus the daily distribution run that
//! issues entry codes for arriving guests.

pub mod distribution;
pub mod error;
pub mod lock_sync;
pub mod provisioner;
pub mod reservations;

pub use distribution::{DistributionError, DistributionRunner, RunTrigger};
pub use error::ProvisionError;
pub use lock_sync::{LockSync, SyncSummary};
pub use provisioner::PasscodeProvisioner;
pub use reservations::{
    HttpReservationSource, Reservation, ReservationSource, ReservationSourceError,
};
