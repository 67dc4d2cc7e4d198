//! Retrieval and trimming of raw inbound forecast data.
//!
//! The upstream service returns eight days of interval data per planning
//! group; the eighth day exists only for boundary smoothing and is dropped
//! here, leaving exactly one canonical week per series. It is re-derived
//! downstream after modifications.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;

use inflow_core::intervals::INTERVALS_PER_WEEK;

use crate::api::{WfmApiError, WfmGateway};

/// Raw per-planning-group forecast data as returned by the service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningGroupData {
    pub planning_group_id: String,
    pub offered_per_interval: Vec<f64>,
    pub average_handle_time_seconds_per_interval: Vec<f64>,
}

/// Payload of a forecast data response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawForecastPayload {
    pub planning_groups: Vec<PlanningGroupData>,
}

/// Envelope wrapping the payload on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastDataEnvelope {
    pub result: RawForecastPayload,
}

/// Errors from forecast data retrieval.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The underlying transport call failed; the cause propagates
    /// unchanged. There is no local retry.
    #[error("Forecast data retrieval failed")]
    FetchFailed(#[source] WfmApiError),
}

/// Retrieves raw forecast interval data and trims it to one week.
pub struct ForecastDataFetcher<G> {
    gateway: Arc<G>,
}

impl<G: WfmGateway> ForecastDataFetcher<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Fetch the interval data for a generated forecast and trim every
    /// series to the canonical week.
    pub async fn fetch(
        &self,
        business_unit_id: &str,
        week_start: NaiveDate,
        forecast_id: &str,
    ) -> Result<RawForecastPayload, FetchError> {
        tracing::info!(forecast_id, "Fetching inbound forecast data");

        let mut payload = self
            .gateway
            .forecast_data(business_unit_id, week_start, forecast_id)
            .await
            .map_err(FetchError::FetchFailed)?;

        trim_to_week(&mut payload);
        Ok(payload)
    }
}

/// Drop everything past the first canonical week in every series.
pub fn trim_to_week(payload: &mut RawForecastPayload) {
    for pg in &mut payload.planning_groups {
        pg.offered_per_interval.truncate(INTERVALS_PER_WEEK);
        pg.average_handle_time_seconds_per_interval
            .truncate(INTERVALS_PER_WEEK);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inflow_core::intervals::INTERVALS_PER_DAY;

    fn payload_with_days(days: usize) -> RawForecastPayload {
        RawForecastPayload {
            planning_groups: vec![PlanningGroupData {
                planning_group_id: "pg-1".into(),
                offered_per_interval: vec![1.0; days * INTERVALS_PER_DAY],
                average_handle_time_seconds_per_interval: vec![30.0; days * INTERVALS_PER_DAY],
            }],
        }
    }

    #[test]
    fn trims_eight_day_payload_to_one_week() {
        let mut payload = payload_with_days(8);
        trim_to_week(&mut payload);

        let pg = &payload.planning_groups[0];
        assert_eq!(pg.offered_per_interval.len(), INTERVALS_PER_WEEK);
        assert_eq!(
            pg.average_handle_time_seconds_per_interval.len(),
            INTERVALS_PER_WEEK
        );
    }

    #[test]
    fn trim_keeps_leading_entries() {
        let mut payload = payload_with_days(8);
        payload.planning_groups[0].offered_per_interval[0] = 99.0;
        trim_to_week(&mut payload);
        assert_eq!(payload.planning_groups[0].offered_per_interval[0], 99.0);
    }

    #[test]
    fn trim_leaves_short_payload_alone() {
        // A short payload is not this module's problem; the reshaper
        // rejects it with a shape error.
        let mut payload = payload_with_days(5);
        trim_to_week(&mut payload);
        assert_eq!(
            payload.planning_groups[0].offered_per_interval.len(),
            5 * INTERVALS_PER_DAY
        );
    }

    #[test]
    fn envelope_parses_camel_case_wire_names() {
        let json = r#"{
            "result": {
                "planningGroups": [{
                    "planningGroupId": "pg-9",
                    "offeredPerInterval": [1.5, 2.5],
                    "averageHandleTimeSecondsPerInterval": [30.0, 45.0]
                }]
            }
        }"#;
        let envelope: ForecastDataEnvelope = serde_json::from_str(json).unwrap();
        let pg = &envelope.result.planning_groups[0];
        assert_eq!(pg.planning_group_id, "pg-9");
        assert_eq!(pg.offered_per_interval, vec![1.5, 2.5]);
        assert_eq!(
            pg.average_handle_time_seconds_per_interval,
            vec![30.0, 45.0]
        );
    }
}
