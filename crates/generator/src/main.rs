//! One-shot inbound forecast generation runner.
//!
//! Loads configuration from the environment, runs a single generation
//! cycle against the workforce-management service, and exits non-zero on
//! failure.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inflow_core::catalog::{ForecastMode, GeneratedForecast};
use inflow_wfm::api::WfmApi;
use inflow_wfm::config::WfmConfig;
use inflow_wfm::orchestrator::{ForecastOrchestrator, GenerationContext};
use inflow_wfm::transport::WsNotificationConnector;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inflow_generator=info,inflow_wfm=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = WfmConfig::from_env();
    tracing::info!(api_base = %config.api_base, "Loaded bridge configuration");

    let business_unit_id =
        std::env::var("BUSINESS_UNIT_ID").context("BUSINESS_UNIT_ID must be set")?;
    let week_start: NaiveDate = std::env::var("WEEK_START")
        .context("WEEK_START must be set")?
        .parse()
        .context("WEEK_START must be a YYYY-MM-DD date")?;
    let description =
        std::env::var("FORECAST_DESCRIPTION").unwrap_or_else(|_| "manual run".into());
    let retain_inbound = std::env::var("RETAIN_INBOUND")
        .map(|v| v == "true")
        .unwrap_or(false);

    // --- Merge target ---
    // Planning group records normally come from the forecast-aggregation
    // layer; a standalone run seeds them from the environment.
    let mut catalog = GeneratedForecast::new();
    if let Ok(seed) = std::env::var("SEED_PLANNING_GROUPS") {
        for id in seed.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            catalog.register(id, ForecastMode::Inbound);
        }
    }
    tracing::info!(groups = catalog.len(), "Seeded planning group records");
    let catalog = Arc::new(RwLock::new(catalog));

    // --- Orchestrator ---
    let gateway = Arc::new(WfmApi::new(config.api_base.clone()));
    let connector = WsNotificationConnector::new(config.notifications_ws.clone());
    let mut orchestrator = ForecastOrchestrator::new(gateway, connector, catalog)
        .with_wait_timeout(config.wait_timeout_secs.map(Duration::from_secs));

    let ctx = GenerationContext {
        business_unit_id,
        week_start,
        description,
        retain_inbound,
    };

    let forecast = orchestrator.generate(&ctx).await?;
    tracing::info!(
        forecast_id = %forecast.forecast_id,
        groups = forecast.planning_groups.len(),
        "Inbound forecast generation complete",
    );

    Ok(())
}
