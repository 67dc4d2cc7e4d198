//! Completion detection for asynchronous forecast generation.
//!
//! [`CompletionWaiter`] is a single-shot state machine fed events from the
//! notification stream. It correlates events against one outstanding
//! operation id and reports the effect each event should have; the
//! orchestrator owns the driving loop and the side effects, so the
//! protocol is testable with plain event values and no transport.

use inflow_core::types::{ForecastId, OperationId};

use crate::messages::{GenerationStatus, NotificationEvent};

/// States of the completion waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaiterState {
    /// Constructed; the notification subscription is not yet established.
    Idle,
    /// Listening for a terminal event for the awaited operation.
    Subscribed,
    /// Terminal: generation completed.
    Complete,
    /// Terminal: generation failed remotely or violated the protocol.
    Failed,
}

/// Effect an observed event should have on the generation cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Event is foreign, stale, or non-terminal; nothing to do.
    Ignore,
    /// Generation completed; fetch and transform the forecast data.
    Resolve { forecast_id: ForecastId },
    /// Generation terminally failed.
    Fail { detail: String },
}

/// Single-shot waiter for one outstanding generation operation.
///
/// Exactly one terminal transition is ever reported; events observed
/// before the subscription is established or after a terminal state are
/// ignored.
#[derive(Debug)]
pub struct CompletionWaiter {
    operation_id: OperationId,
    state: WaiterState,
}

impl CompletionWaiter {
    pub fn new(operation_id: impl Into<OperationId>) -> Self {
        Self {
            operation_id: operation_id.into(),
            state: WaiterState::Idle,
        }
    }

    pub fn state(&self) -> WaiterState {
        self.state
    }

    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Mark the notification subscription as established.
    pub fn mark_subscribed(&mut self) {
        if self.state == WaiterState::Idle {
            self.state = WaiterState::Subscribed;
        }
    }

    /// Feed one notification event through the state machine.
    ///
    /// Only an event on the generate topic whose operation id equals the
    /// awaited one and whose status is terminal produces anything other
    /// than [`Transition::Ignore`].
    pub fn observe(&mut self, event: &NotificationEvent) -> Transition {
        if self.state != WaiterState::Subscribed {
            return Transition::Ignore;
        }
        if !event.is_generate_topic() {
            return Transition::Ignore;
        }
        if event.event_body.operation_id.as_deref() != Some(self.operation_id.as_str()) {
            tracing::debug!(
                awaited = %self.operation_id,
                "Ignoring generate notification for a different operation",
            );
            return Transition::Ignore;
        }

        let status = event.event_body.status;
        tracing::info!(operation_id = %self.operation_id, ?status, "Forecast generation status");

        match status {
            GenerationStatus::Processing => Transition::Ignore,
            GenerationStatus::Complete => match &event.event_body.result {
                Some(forecast) => {
                    self.state = WaiterState::Complete;
                    Transition::Resolve {
                        forecast_id: forecast.id.clone(),
                    }
                }
                None => {
                    self.state = WaiterState::Failed;
                    Transition::Fail {
                        detail: format!(
                            "Complete notification for operation {} carried no forecast id",
                            self.operation_id
                        ),
                    }
                }
            },
            GenerationStatus::Error => {
                self.state = WaiterState::Failed;
                Transition::Fail {
                    detail: format!("generation operation {} reported Error", self.operation_id),
                }
            }
            GenerationStatus::Unknown => {
                tracing::warn!(
                    operation_id = %self.operation_id,
                    topic = %event.topic_name,
                    "Received unknown generation status",
                );
                Transition::Ignore
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
