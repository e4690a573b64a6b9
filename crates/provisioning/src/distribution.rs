//! The daily entry-code distribution run.
//!
//! For every confirmed reservation arriving today, derive the guest's code
//! from their phone number and provision it on the lock bound to the
//! reservation's listing. Each reservation is processed independently: a
//! vendor failure marks that one item failed and the batch continues. The
//! only fatal error is the reservation source itself being unreachable.
//!
//! Re-running a day is safe end-to-end: the derived code is deterministic
//! and `ensure_code` is the idempotency boundary for the vendor create.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;

use lockdesk_core::entry_code;
use lockdesk_core::types::DbId;
use lockdesk_db::models::distribution::{CreateDistributionItem, DistributionRunRecord};
use lockdesk_db::repositories::{BindingRepo, DistributionRepo};
use lockdesk_events::{EventBus, PlatformEvent};

use crate::provisioner::PasscodeProvisioner;
use crate::reservations::{Reservation, ReservationSource, ReservationSourceError};

/// What started a run. Stored on the run row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunTrigger {
    /// The daily background task.
    Schedule,
    /// An operator pressing the button.
    Manual,
}

impl RunTrigger {
    pub fn as_str(self) -> &'static str {
        match self {
            RunTrigger::Schedule => "schedule",
            RunTrigger::Manual => "manual",
        }
    }
}

/// Terminal state of one reservation's provisioning attempt.
#[derive(Debug, Clone)]
enum ItemOutcome {
    Provisioned { lock_id: DbId },
    /// No lock bound to the listing. A normal, non-error condition.
    SkippedNoLock,
    Failed { lock_id: Option<DbId>, detail: String },
}

/// Failure modes that abort a whole run.
#[derive(Debug, thiserror::Error)]
pub enum DistributionError {
    #[error(transparent)]
    Source(#[from] ReservationSourceError),

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Executes distribution runs. Constructed once with its collaborators and
/// shared behind the application state.
#[derive(Clone)]
pub struct DistributionRunner {
    pool: PgPool,
    provisioner: PasscodeProvisioner,
    reservations: Arc<dyn ReservationSource>,
    bus: Arc<EventBus>,
}

impl DistributionRunner {
    pub fn new(
        pool: PgPool,
        provisioner: PasscodeProvisioner,
        reservations: Arc<dyn ReservationSource>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            pool,
            provisioner,
            reservations,
            bus,
        }
    }

    /// Execute one run for today's arrivals.
    pub async fn execute(&self, trigger: RunTrigger) -> Result<DistributionRunRecord, DistributionError> {
        self.execute_for_date(trigger, Utc::now().date_naive()).await
    }

    /// Execute one run for a specific arrival date.
    pub async fn execute_for_date(
        &self,
        trigger: RunTrigger,
        date: NaiveDate,
    ) -> Result<DistributionRunRecord, DistributionError> {
        let arrivals = self.reservations.arriving_on(date).await?;
        let confirmed: Vec<Reservation> =
            arrivals.into_iter().filter(Reservation::is_confirmed).collect();

        let run = DistributionRepo::create_run(&self.pool, trigger.as_str(), date).await?;
        tracing::info!(
            run_id = run.id,
            trigger = trigger.as_str(),
            %date,
            reservations = confirmed.len(),
            "Distribution run started"
        );

        let (mut provisioned, mut skipped, mut failed) = (0, 0, 0);
        let total = confirmed.len() as i32;

        for reservation in &confirmed {
            let outcome = self.process_reservation(reservation).await;

            let (outcome_str, lock_id, detail) = match &outcome {
                ItemOutcome::Provisioned { lock_id } => {
                    provisioned += 1;
                    ("provisioned", Some(*lock_id), None)
                }
                ItemOutcome::SkippedNoLock => {
                    skipped += 1;
                    ("skipped_no_lock", None, None)
                }
                ItemOutcome::Failed { lock_id, detail } => {
                    failed += 1;
                    ("failed", *lock_id, Some(detail.clone()))
                }
            };

            DistributionRepo::create_item(
                &self.pool,
                run.id,
                &CreateDistributionItem {
                    reservation_ref: reservation.reservation_id.clone(),
                    listing_id: reservation.listing_id,
                    lock_id,
                    guest_name: reservation.guest_name.clone(),
                    outcome: outcome_str.to_string(),
                    detail: detail.clone(),
                },
            )
            .await?;

            match outcome {
                ItemOutcome::Provisioned { lock_id } => {
                    self.bus.publish(
                        PlatformEvent::new("code.provisioned")
                            .with_source("lock", lock_id)
                            .with_payload(serde_json::json!({
                                "listing_id": reservation.listing_id,
                                "guest_name": reservation.guest_name,
                                "reservation_id": reservation.reservation_id,
                            })),
                    );
                }
                ItemOutcome::Failed { ref detail, .. } => {
                    self.bus.publish(
                        PlatformEvent::new("distribution.item_failed")
                            .with_source("listing", reservation.listing_id)
                            .with_payload(serde_json::json!({
                                "guest_name": reservation.guest_name,
                                "reservation_id": reservation.reservation_id,
                                "detail": detail,
                            })),
                    );
                }
                ItemOutcome::SkippedNoLock => {}
            }
        }

        let run =
            DistributionRepo::finish_run(&self.pool, run.id, total, provisioned, skipped, failed)
                .await?;
        tracing::info!(
            run_id = run.id,
            total,
            provisioned,
            skipped,
            failed,
            "Distribution run finished"
        );
        self.bus.publish(
            PlatformEvent::new("distribution.completed")
                .with_source("run", run.id)
                .with_payload(serde_json::json!({
                    "run_date": date,
                    "trigger": trigger.as_str(),
                    "total": total,
                    "provisioned": provisioned,
                    "skipped": skipped,
                    "failed": failed,
                })),
        );
        Ok(run)
    }

    /// Drive one reservation to a terminal state. Never panics the batch:
    /// every error path collapses into `ItemOutcome::Failed`.
    async fn process_reservation(&self, reservation: &Reservation) -> ItemOutcome {
        let lock_id =
            match BindingRepo::resolve_lock_for(&self.pool, reservation.listing_id).await {
                Ok(Some(lock_id)) => lock_id,
                Ok(None) => {
                    tracing::info!(
                        listing_id = reservation.listing_id,
                        guest = %reservation.guest_name,
                        "No lock bound to listing, skipping reservation"
                    );
                    return ItemOutcome::SkippedNoLock;
                }
                Err(e) => {
                    return ItemOutcome::Failed {
                        lock_id: None,
                        detail: format!("Binding lookup failed: {e}"),
                    };
                }
            };

        let Some(code) = entry_code::derive(&reservation.phone) else {
            return ItemOutcome::Failed {
                lock_id: Some(lock_id),
                detail: "Guest phone number has fewer than four digits".to_string(),
            };
        };

        match self
            .provisioner
            .ensure_code(
                lock_id,
                &reservation.guest_name,
                &code,
                reservation.arrival,
                reservation.departure,
            )
            .await
        {
            Ok(_) => ItemOutcome::Provisioned { lock_id },
            Err(e) => {
                tracing::error!(
                    listing_id = reservation.listing_id,
                    lock_id,
                    guest = %reservation.guest_name,
                    error = %e,
                    "Failed to provision entry code"
                );
                ItemOutcome::Failed {
                    lock_id: Some(lock_id),
                    detail: e.to_string(),
                }
            }
        }
    }
}
