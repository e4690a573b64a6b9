//! Fire-and-forget relay from the event bus to the operator mailbox.

use tokio::sync::broadcast;

use crate::bus::PlatformEvent;
use crate::delivery::email::EmailDelivery;

/// Which event types are worth an operator email.
const NOTIFIED_EVENT_TYPES: &[&str] = &["distribution.completed", "distribution.item_failed"];

/// Long-lived task that emails distribution outcomes to the operator.
///
/// Runs until the bus closes (all senders dropped). Delivery failures are
/// logged and never propagated; notifications must not affect provisioning.
pub struct OutcomeNotifier {
    delivery: EmailDelivery,
}

impl OutcomeNotifier {
    pub fn new(delivery: EmailDelivery) -> Self {
        Self { delivery }
    }

    /// Consume events from the bus until it closes.
    pub async fn run(self, mut rx: broadcast::Receiver<PlatformEvent>) {
        tracing::info!(to = self.delivery.operator_address(), "Outcome notifier started");
        loop {
            match rx.recv().await {
                Ok(event) => self.handle(&event).await,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Outcome notifier lagged behind the event bus");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, outcome notifier stopping");
                    break;
                }
            }
        }
    }

    async fn handle(&self, event: &PlatformEvent) {
        if !NOTIFIED_EVENT_TYPES.contains(&event.event_type.as_str()) {
            return;
        }
        let to = self.delivery.operator_address().to_string();
        if let Err(e) = self.delivery.deliver(&to, event).await {
            tracing::error!(
                error = %e,
                event_type = %event.event_type,
                "Failed to deliver outcome notification email"
            );
        }
    }
}
