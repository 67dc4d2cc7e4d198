//! Shared id aliases for entities owned by the workforce-management service.

/// Organizational scoping key for all forecast operations.
pub type BusinessUnitId = String;

/// Identifier of a generated short-term forecast.
pub type ForecastId = String;

/// Correlates an asynchronous generation request with its notifications.
pub type OperationId = String;

/// Identifier of a planning group within a business unit's forecast.
pub type PlanningGroupId = String;
