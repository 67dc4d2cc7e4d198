//! REST client for the workforce-management forecast endpoints.
//!
//! Wraps the service's short-term forecast HTTP API (generation, data
//! retrieval, deletion) using [`reqwest`]. The [`WfmGateway`] trait is the
//! seam the orchestrator depends on, so flows can be exercised against a
//! scripted gateway in tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::fetcher::{ForecastDataEnvelope, RawForecastPayload};
use crate::messages::{ForecastRef, GenerationStatus};

/// Response returned by the generate endpoint.
///
/// `operation_id` is present when the service continues processing
/// asynchronously; `result` is present when the forecast is already
/// complete.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    pub status: GenerationStatus,
    #[serde(default)]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub result: Option<ForecastRef>,
}

/// Errors from the workforce-management REST layer.
#[derive(Debug, thiserror::Error)]
pub enum WfmApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Workforce-management API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Forecast operations offered by the workforce-management service.
///
/// All operations are scoped to a business unit and a week start date.
#[async_trait]
pub trait WfmGateway: Send + Sync {
    /// Submit a short-term forecast generation request.
    async fn generate(
        &self,
        business_unit_id: &str,
        week_start: NaiveDate,
        description: &str,
    ) -> Result<GenerationResponse, WfmApiError>;

    /// Retrieve the raw interval data of a generated forecast.
    async fn forecast_data(
        &self,
        business_unit_id: &str,
        week_start: NaiveDate,
        forecast_id: &str,
    ) -> Result<RawForecastPayload, WfmApiError>;

    /// Delete a generated forecast, returning the raw HTTP status code.
    ///
    /// The caller interprets the code; the service signals success with
    /// exactly 204.
    async fn delete_forecast(
        &self,
        business_unit_id: &str,
        week_start: NaiveDate,
        forecast_id: &str,
    ) -> Result<u16, WfmApiError>;
}

/// HTTP client for the workforce-management service.
pub struct WfmApi {
    client: reqwest::Client,
    base_url: String,
}

impl WfmApi {
    /// Create a new API client.
    ///
    /// * `base_url` - API base, e.g. `https://api.example.com/api/v2`.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    // ---- private helpers ----

    /// URL prefix for one business unit week.
    fn week_url(&self, business_unit_id: &str, week_start: NaiveDate) -> String {
        format!(
            "{}/workforcemanagement/businessunits/{}/weeks/{}",
            self.base_url,
            business_unit_id,
            week_start.format("%Y-%m-%d"),
        )
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`WfmApiError::Api`] containing
    /// the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, WfmApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(WfmApiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, WfmApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl WfmGateway for WfmApi {
    async fn generate(
        &self,
        business_unit_id: &str,
        week_start: NaiveDate,
        description: &str,
    ) -> Result<GenerationResponse, WfmApiError> {
        let body = serde_json::json!({
            "description": description,
            "weekCount": 1,
            "canUseForScheduling": true,
        });

        let response = self
            .client
            .post(format!(
                "{}/shorttermforecasts/generate",
                self.week_url(business_unit_id, week_start)
            ))
            .query(&[("forceAsync", "true")])
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn forecast_data(
        &self,
        business_unit_id: &str,
        week_start: NaiveDate,
        forecast_id: &str,
    ) -> Result<RawForecastPayload, WfmApiError> {
        let response = self
            .client
            .get(format!(
                "{}/shorttermforecasts/{}/data",
                self.week_url(business_unit_id, week_start),
                forecast_id,
            ))
            .send()
            .await?;

        let envelope: ForecastDataEnvelope = Self::parse_response(response).await?;
        Ok(envelope.result)
    }

    async fn delete_forecast(
        &self,
        business_unit_id: &str,
        week_start: NaiveDate,
        forecast_id: &str,
    ) -> Result<u16, WfmApiError> {
        let response = self
            .client
            .delete(format!(
                "{}/shorttermforecasts/{}",
                self.week_url(business_unit_id, week_start),
                forecast_id,
            ))
            .send()
            .await?;

        Ok(response.status().as_u16())
    }
}
