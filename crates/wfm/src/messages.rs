//! Notification wire types for short-term forecast generation.
//!
//! The notification transport delivers JSON events shaped as
//! `{"topicName": "...", "eventBody": {...}}`. This module deserializes
//! them into typed values and owns the generation status domain shared
//! with the REST generate response.

use serde::Deserialize;

/// Topic fragment identifying short-term forecast generation events.
pub const GENERATE_TOPIC: &str = "shorttermforecasts.generate";

/// Full notification topic for one business unit's generate events.
pub fn generate_topic(business_unit_id: &str) -> String {
    format!("v2.workforcemanagement.businessunits.{business_unit_id}.{GENERATE_TOPIC}")
}

/// Lifecycle status of a forecast generation operation.
///
/// The domain is open on the wire; values this build does not know fold
/// into [`GenerationStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum GenerationStatus {
    Processing,
    Complete,
    Error,
    #[serde(other)]
    Unknown,
}

/// Reference to a created forecast, carried by generate responses and
/// completion events.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastRef {
    pub id: String,
}

/// Body of a generate notification event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBody {
    #[serde(default)]
    pub operation_id: Option<String>,
    pub status: GenerationStatus,
    /// Present on completion events only.
    #[serde(default)]
    pub result: Option<ForecastRef>,
}

/// One event from the notification stream.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    pub topic_name: String,
    pub event_body: EventBody,
}

impl NotificationEvent {
    /// Whether this event belongs to the forecast generation topic.
    ///
    /// Topic names are business-unit scoped on the wire, so matching is
    /// by fragment containment rather than equality.
    pub fn is_generate_topic(&self) -> bool {
        self.topic_name.contains(GENERATE_TOPIC)
    }
}

/// Parse a notification transport text frame into a typed event.
///
/// Returns `Err` for malformed JSON or a missing envelope. Callers should
/// log unparseable frames and continue.
pub fn parse_event(text: &str) -> Result<NotificationEvent, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_processing_event() {
        let json = r#"{"topicName":"v2.workforcemanagement.businessunits.bu-1.shorttermforecasts.generate","eventBody":{"operationId":"op-1","status":"Processing"}}"#;
        let event = parse_event(json).unwrap();
        assert!(event.is_generate_topic());
        assert_eq!(event.event_body.operation_id.as_deref(), Some("op-1"));
        assert_eq!(event.event_body.status, GenerationStatus::Processing);
        assert!(event.event_body.result.is_none());
    }

    #[test]
    fn parse_complete_event_with_forecast_id() {
        let json = r#"{"topicName":"v2.workforcemanagement.businessunits.bu-1.shorttermforecasts.generate","eventBody":{"operationId":"op-1","status":"Complete","result":{"id":"fc-42"}}}"#;
        let event = parse_event(json).unwrap();
        assert_eq!(event.event_body.status, GenerationStatus::Complete);
        assert_eq!(event.event_body.result.unwrap().id, "fc-42");
    }

    #[test]
    fn parse_error_event() {
        let json = r#"{"topicName":"x.shorttermforecasts.generate","eventBody":{"operationId":"op-9","status":"Error"}}"#;
        let event = parse_event(json).unwrap();
        assert_eq!(event.event_body.status, GenerationStatus::Error);
    }

    #[test]
    fn unrecognized_status_folds_into_unknown() {
        let json = r#"{"topicName":"x.shorttermforecasts.generate","eventBody":{"operationId":"op-1","status":"Archived"}}"#;
        let event = parse_event(json).unwrap();
        assert_eq!(event.event_body.status, GenerationStatus::Unknown);
    }

    #[test]
    fn event_without_operation_id_parses() {
        let json = r#"{"topicName":"some.other.topic","eventBody":{"status":"Complete"}}"#;
        let event = parse_event(json).unwrap();
        assert!(event.event_body.operation_id.is_none());
        assert!(!event.is_generate_topic());
    }

    #[test]
    fn foreign_topic_is_not_generate() {
        let json = r#"{"topicName":"v2.workforcemanagement.businessunits.bu-1.scheduling.runs","eventBody":{"status":"Processing"}}"#;
        let event = parse_event(json).unwrap();
        assert!(!event.is_generate_topic());
    }

    #[test]
    fn parse_invalid_json_returns_error() {
        assert!(parse_event("not json at all").is_err());
    }

    #[test]
    fn parse_missing_envelope_returns_error() {
        assert!(parse_event(r#"{"topicName":"x"}"#).is_err());
    }

    #[test]
    fn generate_topic_scopes_business_unit() {
        let topic = generate_topic("bu-7");
        assert_eq!(
            topic,
            "v2.workforcemanagement.businessunits.bu-7.shorttermforecasts.generate"
        );
        assert!(topic.contains(GENERATE_TOPIC));
    }
}
