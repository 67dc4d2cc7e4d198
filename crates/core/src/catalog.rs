//! Merge target for generated forecast data, keyed by planning group.
//!
//! The forecast-aggregation layer registers one record per planning group
//! before any inbound data arrives; the inbound pipeline then attaches its
//! canonical series to the records whose forecast mode is inbound.

use std::collections::HashMap;

use crate::intervals::CanonicalForecastSeries;
use crate::types::PlanningGroupId;

/// How a planning group's forecast volume is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastMode {
    /// Volume comes from the service's inbound short-term forecast.
    Inbound,
    /// Volume is produced elsewhere; inbound data must not overwrite it.
    Outbound,
}

/// One planning group's slot in the generated forecast.
#[derive(Debug, Clone)]
pub struct PlanningGroupRecord {
    pub planning_group_id: PlanningGroupId,
    pub mode: ForecastMode,
    /// Canonical series, attached once generation completes.
    pub series: Option<CanonicalForecastSeries>,
}

/// Per-planning-group forecast records for one generation cycle.
#[derive(Debug, Default)]
pub struct GeneratedForecast {
    records: HashMap<PlanningGroupId, PlanningGroupRecord>,
}

impl GeneratedForecast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a planning group slot ahead of data arrival.
    pub fn register(&mut self, planning_group_id: impl Into<PlanningGroupId>, mode: ForecastMode) {
        let planning_group_id = planning_group_id.into();
        self.records.insert(
            planning_group_id.clone(),
            PlanningGroupRecord {
                planning_group_id,
                mode,
                series: None,
            },
        );
    }

    pub fn get(&self, planning_group_id: &str) -> Option<&PlanningGroupRecord> {
        self.records.get(planning_group_id)
    }

    /// Forecast mode of a registered planning group, if present.
    pub fn mode_of(&self, planning_group_id: &str) -> Option<ForecastMode> {
        self.records.get(planning_group_id).map(|r| r.mode)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Attach an inbound canonical series to an existing record.
    ///
    /// The record must have been registered beforehand. A payload naming a
    /// planning group with no record means the caller merged against the
    /// wrong generation cycle. That is a programming error, not a
    /// recoverable condition, and it panics.
    pub fn attach_inbound(&mut self, planning_group_id: &str, series: CanonicalForecastSeries) {
        let record = self.records.get_mut(planning_group_id).unwrap_or_else(|| {
            panic!("planning group {planning_group_id} has no record in the generated forecast")
        });
        record.series = Some(series);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
