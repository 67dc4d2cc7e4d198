//! Outbound platform events for the inbound forecast pipeline.
//!
//! Collaborators that finalize or merge the forecast subscribe to these
//! events instead of wiring callbacks into the orchestrator. Delivery is
//! fan-out over a [`tokio::sync::broadcast`] channel.

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::broadcast;

use inflow_core::types::{BusinessUnitId, ForecastId};

/// Default buffer capacity for the broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A platform-level event from the inbound forecast pipeline.
#[derive(Debug, Clone, Serialize)]
pub enum ForecastEvent {
    /// A generation cycle completed and the canonical series were merged.
    /// Broadcast exactly once per successful cycle.
    GenerationCompleted {
        business_unit_id: BusinessUnitId,
        week_start: NaiveDate,
        forecast_id: ForecastId,
        /// Caller-controlled flag telling the merge collaborator to keep
        /// the inbound data when finalizing.
        retain_inbound: bool,
    },

    /// Deleting a generated forecast failed; it must be removed manually.
    /// Advisory only; the caller's flow is not aborted.
    ManualCleanupRequired {
        forecast_id: ForecastId,
        detail: String,
    },
}

/// Broadcast hub for [`ForecastEvent`]s.
///
/// Publishing with zero subscribers is a silent no-op.
pub struct ForecastEvents {
    sender: broadcast::Sender<ForecastEvent>,
}

impl ForecastEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: ForecastEvent) {
        // Ignore the SendError; it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this hub.
    pub fn subscribe(&self) -> broadcast::Receiver<ForecastEvent> {
        self.sender.subscribe()
    }
}

impl Default for ForecastEvents {
    fn default() -> Self {
        Self::new(EVENT_CHANNEL_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive() {
        let events = ForecastEvents::default();
        let mut rx = events.subscribe();

        events.publish(ForecastEvent::GenerationCompleted {
            business_unit_id: "bu-1".into(),
            week_start: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            forecast_id: "fc-1".into(),
            retain_inbound: true,
        });

        let received = rx.recv().await.expect("should receive the event");
        match received {
            ForecastEvent::GenerationCompleted {
                forecast_id,
                retain_inbound,
                ..
            } => {
                assert_eq!(forecast_id, "fc-1");
                assert!(retain_inbound);
            }
            other => panic!("Expected GenerationCompleted, got {other:?}"),
        }
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let events = ForecastEvents::default();
        events.publish(ForecastEvent::ManualCleanupRequired {
            forecast_id: "fc-1".into(),
            detail: "delete returned status 500".into(),
        });
    }
}
