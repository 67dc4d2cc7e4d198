//! Generation-cycle coordination for inbound short-term forecasts.
//!
//! [`ForecastOrchestrator`] submits the generation request, dispatches on
//! the immediate status (already complete vs. still processing), drives
//! the completion waiter over the notification stream for the
//! asynchronous path, and owns forecast deletion.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::{broadcast, RwLock};

use inflow_core::catalog::{ForecastMode, GeneratedForecast};
use inflow_core::error::CoreError;
use inflow_core::intervals::{reshape, CanonicalForecastSeries};
use inflow_core::types::{BusinessUnitId, ForecastId, OperationId, PlanningGroupId};

use crate::api::{GenerationResponse, WfmGateway};
use crate::events::{ForecastEvent, ForecastEvents};
use crate::fetcher::{FetchError, ForecastDataFetcher, RawForecastPayload};
use crate::messages::{generate_topic, GenerationStatus};
use crate::transport::{NotificationChannel, NotificationConnector, TransportError};
use crate::waiter::{CompletionWaiter, Transition};

/// Prefix applied to the description of every submitted generation
/// request, so generated forecasts are recognizable in the service's UI.
pub const DESCRIPTION_PREFIX: &str = "Inbound FC - ";

// ---------------------------------------------------------------------------
// Request context
// ---------------------------------------------------------------------------

/// Request-scoped inputs for one generation cycle.
///
/// Immutable after creation; every call in the cycle receives this
/// instead of reading shared mutable state.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub business_unit_id: BusinessUnitId,
    /// First day of the forecast week (week-granular).
    pub week_start: NaiveDate,
    pub description: String,
    /// Forwarded on the completion signal so the merge collaborator knows
    /// whether to keep the inbound data when finalizing.
    pub retain_inbound: bool,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Canonical series produced for one planning group.
#[derive(Debug, Clone)]
pub struct PlanningGroupSeries {
    pub planning_group_id: PlanningGroupId,
    pub series: CanonicalForecastSeries,
}

/// All inbound canonical series produced by one generation cycle.
///
/// The same series are merged into the shared [`GeneratedForecast`].
#[derive(Debug, Clone)]
pub struct InboundForecast {
    pub forecast_id: ForecastId,
    pub planning_groups: Vec<PlanningGroupSeries>,
}

/// Outcome of a deletion attempt. Deletion never fails the caller's flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// The forecast was deleted and the tracked ids were cleared.
    Deleted,
    /// No forecast id is on record; nothing was attempted.
    NotTracked,
    /// The delete call failed or returned an unexpected status; a
    /// manual-cleanup advisory was published.
    ManualCleanupRequired,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that reject a generation cycle. There is no local retry
/// anywhere in this pipeline; every variant propagates to the caller.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The generate call failed or returned an unexpected immediate
    /// status or an incomplete response.
    #[error("Forecast generation failed: {0}")]
    GenerationFailed(String),

    /// Establishing the notification subscription failed.
    #[error("Failed to subscribe to generate notifications: {0}")]
    SubscriptionSetupFailed(#[source] TransportError),

    /// A terminal Error status arrived over the notification stream.
    #[error("Forecast generation failed remotely: {0}")]
    RemoteGeneration(String),

    /// Forecast data retrieval failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The retrieved interval data violated the canonical shape.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The notification stream ended before a terminal status arrived.
    #[error("Notification stream closed before the operation finished")]
    NotificationStreamClosed,

    /// The bounded wait elapsed before a terminal status arrived.
    #[error("Timed out after {0:?} waiting for forecast generation")]
    WaitTimedOut(Duration),
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Coordinates one inbound forecast generation cycle at a time.
///
/// Holds the REST gateway, the notification connector, and the shared
/// per-planning-group merge target. The tracked forecast/operation ids
/// live for one cycle and are cleared by a successful deletion.
pub struct ForecastOrchestrator<G, N> {
    gateway: Arc<G>,
    connector: N,
    fetcher: ForecastDataFetcher<G>,
    catalog: Arc<RwLock<GeneratedForecast>>,
    events: ForecastEvents,
    wait_timeout: Option<Duration>,
    forecast_id: Option<ForecastId>,
    operation_id: Option<OperationId>,
}

impl<G, N> ForecastOrchestrator<G, N>
where
    G: WfmGateway,
    N: NotificationConnector,
{
    pub fn new(gateway: Arc<G>, connector: N, catalog: Arc<RwLock<GeneratedForecast>>) -> Self {
        let fetcher = ForecastDataFetcher::new(Arc::clone(&gateway));
        Self {
            gateway,
            connector,
            fetcher,
            catalog,
            events: ForecastEvents::default(),
            wait_timeout: None,
            forecast_id: None,
            operation_id: None,
        }
    }

    /// Bound the asynchronous completion wait. Without this the
    /// orchestrator waits for the terminal notification indefinitely.
    pub fn with_wait_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.wait_timeout = timeout;
        self
    }

    /// Subscribe to the pipeline's outbound events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<ForecastEvent> {
        self.events.subscribe()
    }

    /// Forecast id tracked for the current cycle, if any.
    pub fn tracked_forecast_id(&self) -> Option<&str> {
        self.forecast_id.as_deref()
    }

    /// Operation id tracked for the current cycle, if any. Only the
    /// asynchronous path records one.
    pub fn tracked_operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    /// Run one generation cycle to a terminal outcome.
    ///
    /// Submits the generation request and either loads the data right
    /// away (the service reported the forecast already complete) or waits
    /// for the completion notification. One cycle is outstanding at a
    /// time; the mutable borrow enforces it.
    pub async fn generate(
        &mut self,
        ctx: &GenerationContext,
    ) -> Result<InboundForecast, GenerateError> {
        tracing::info!(
            business_unit_id = %ctx.business_unit_id,
            week_start = %ctx.week_start,
            "Initiating inbound forecast generation",
        );

        let response = self.submit_generation(ctx).await?;

        match response.status {
            GenerationStatus::Complete => {
                let forecast_id = response.result.map(|r| r.id).ok_or_else(|| {
                    GenerateError::GenerationFailed(
                        "Complete response carried no forecast id".into(),
                    )
                })?;
                tracing::info!(
                    forecast_id = %forecast_id,
                    "Forecast already complete, loading synchronously",
                );
                self.forecast_id = Some(forecast_id.clone());

                let forecast = self.fetch_and_load(ctx, &forecast_id).await?;
                self.publish_completion(ctx, &forecast_id);
                Ok(forecast)
            }
            GenerationStatus::Processing => {
                let operation_id = response.operation_id.ok_or_else(|| {
                    GenerateError::GenerationFailed(
                        "Processing response carried no operation id".into(),
                    )
                })?;
                tracing::info!(
                    operation_id = %operation_id,
                    "Forecast processing asynchronously",
                );
                self.operation_id = Some(operation_id.clone());

                self.await_completion(ctx, operation_id).await
            }
            status => Err(GenerateError::GenerationFailed(format!(
                "unexpected immediate status {status:?}"
            ))),
        }
    }

    /// Delete the tracked forecast.
    ///
    /// The service signals success with exactly status 204. Failure is
    /// deliberately non-fatal: a manual-cleanup advisory is published and
    /// the caller's flow continues.
    pub async fn delete(&mut self, ctx: &GenerationContext) -> DeletionOutcome {
        let Some(forecast_id) = self.forecast_id.clone() else {
            tracing::warn!("No inbound forecast id on record, skipping deletion");
            return DeletionOutcome::NotTracked;
        };

        tracing::info!(forecast_id = %forecast_id, "Deleting inbound forecast");

        let status = match self
            .gateway
            .delete_forecast(&ctx.business_unit_id, ctx.week_start, &forecast_id)
            .await
        {
            Ok(status) => status,
            Err(e) => {
                tracing::error!(error = %e, "Inbound forecast deletion failed");
                self.events.publish(ForecastEvent::ManualCleanupRequired {
                    forecast_id,
                    detail: e.to_string(),
                });
                return DeletionOutcome::ManualCleanupRequired;
            }
        };

        if status != 204 {
            tracing::error!(status, "Inbound forecast deletion returned unexpected status");
            self.events.publish(ForecastEvent::ManualCleanupRequired {
                forecast_id,
                detail: format!("delete returned status {status}"),
            });
            return DeletionOutcome::ManualCleanupRequired;
        }

        self.forecast_id = None;
        self.operation_id = None;
        tracing::info!("Inbound forecast deleted");
        DeletionOutcome::Deleted
    }

    // ---- private helpers ----

    async fn submit_generation(
        &self,
        ctx: &GenerationContext,
    ) -> Result<GenerationResponse, GenerateError> {
        let description = format!("{DESCRIPTION_PREFIX}{}", ctx.description);

        let response = self
            .gateway
            .generate(&ctx.business_unit_id, ctx.week_start, &description)
            .await
            .map_err(|e| GenerateError::GenerationFailed(e.to_string()))?;

        tracing::info!(status = ?response.status, "Forecast generate request submitted");
        Ok(response)
    }

    /// Asynchronous path: subscribe, wait for the terminal notification,
    /// and load the data.
    ///
    /// The subscription is exclusively owned here and closed exactly once
    /// on any terminal exit, including a timeout. The completion signal is
    /// published after the subscription is closed.
    async fn await_completion(
        &mut self,
        ctx: &GenerationContext,
        operation_id: OperationId,
    ) -> Result<InboundForecast, GenerateError> {
        let mut channel = self
            .connector
            .connect(&ctx.business_unit_id)
            .await
            .map_err(GenerateError::SubscriptionSetupFailed)?;

        let topics = vec![generate_topic(&ctx.business_unit_id)];
        let mut waiter = CompletionWaiter::new(operation_id);

        if let Err(e) = channel.subscribe(&topics).await {
            channel.close().await;
            return Err(GenerateError::SubscriptionSetupFailed(e));
        }
        waiter.mark_subscribed();
        tracing::info!(
            operation_id = %waiter.operation_id(),
            "Subscribed to forecast generate notifications",
        );

        let outcome = match self.wait_timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, self.drive(ctx, &mut channel, &mut waiter)).await
                {
                    Ok(result) => result,
                    Err(_) => Err(GenerateError::WaitTimedOut(limit)),
                }
            }
            None => self.drive(ctx, &mut channel, &mut waiter).await,
        };

        channel.close().await;

        match outcome {
            Ok(forecast) => {
                self.publish_completion(ctx, &forecast.forecast_id);
                Ok(forecast)
            }
            Err(e) => Err(e),
        }
    }

    /// Process notification events in arrival order until a terminal
    /// transition. The fetch/transform on completion runs inside the loop
    /// body, so no further event is handled while it is in flight.
    async fn drive<C: NotificationChannel>(
        &mut self,
        ctx: &GenerationContext,
        channel: &mut C,
        waiter: &mut CompletionWaiter,
    ) -> Result<InboundForecast, GenerateError> {
        while let Some(event) = channel.next_event().await {
            match waiter.observe(&event) {
                Transition::Ignore => {}
                Transition::Resolve { forecast_id } => {
                    self.forecast_id = Some(forecast_id.clone());
                    return self.fetch_and_load(ctx, &forecast_id).await;
                }
                Transition::Fail { detail } => {
                    return Err(GenerateError::RemoteGeneration(detail));
                }
            }
        }
        Err(GenerateError::NotificationStreamClosed)
    }

    /// Fetch the raw interval data and merge the canonical series into
    /// the shared generated forecast.
    async fn fetch_and_load(
        &mut self,
        ctx: &GenerationContext,
        forecast_id: &str,
    ) -> Result<InboundForecast, GenerateError> {
        let payload = self
            .fetcher
            .fetch(&ctx.business_unit_id, ctx.week_start, forecast_id)
            .await?;

        let planning_groups = self.transform_and_merge(ctx, payload).await?;
        tracing::info!(
            forecast_id,
            groups = planning_groups.len(),
            "Inbound forecast data loaded",
        );

        Ok(InboundForecast {
            forecast_id: forecast_id.to_string(),
            planning_groups,
        })
    }

    /// Reshape each inbound-mode planning group and attach it to the
    /// generated forecast.
    async fn transform_and_merge(
        &self,
        ctx: &GenerationContext,
        payload: RawForecastPayload,
    ) -> Result<Vec<PlanningGroupSeries>, GenerateError> {
        let mut catalog = self.catalog.write().await;
        let mut loaded = Vec::new();

        for pg in payload.planning_groups {
            // A payload group with no catalog record means the merge ran
            // against the wrong generation cycle.
            let mode = catalog.mode_of(&pg.planning_group_id).unwrap_or_else(|| {
                panic!(
                    "planning group {} has no record in the generated forecast",
                    pg.planning_group_id
                )
            });
            if mode != ForecastMode::Inbound {
                tracing::debug!(
                    planning_group_id = %pg.planning_group_id,
                    "Skipping non-inbound planning group",
                );
                continue;
            }

            let series = reshape(
                &pg.offered_per_interval,
                &pg.average_handle_time_seconds_per_interval,
                ctx.week_start,
            )?;
            catalog.attach_inbound(&pg.planning_group_id, series.clone());
            loaded.push(PlanningGroupSeries {
                planning_group_id: pg.planning_group_id,
                series,
            });
        }

        Ok(loaded)
    }

    /// Broadcast the completion signal. Called exactly once per
    /// successful cycle.
    fn publish_completion(&self, ctx: &GenerationContext, forecast_id: &str) {
        self.events.publish(ForecastEvent::GenerationCompleted {
            business_unit_id: ctx.business_unit_id.clone(),
            week_start: ctx.week_start,
            forecast_id: forecast_id.to_string(),
            retain_inbound: ctx.retain_inbound,
        });
    }
}
