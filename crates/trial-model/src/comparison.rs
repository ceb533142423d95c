//! Cross-trial comparison view model.
//!
//! A trial with nothing to report for a row is absent from that row's
//! `by_trial` list. Absence means "not reported", never zero.

use serde::{Deserialize, Serialize};

use crate::safety::EventCategory;

/// Smallest trial set a comparison accepts.
pub const MIN_COMPARED_TRIALS: usize = 2;
/// Largest trial set a comparison accepts.
pub const MAX_COMPARED_TRIALS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialPopulation {
    pub nct_id: String,
    pub enrollment: Option<u64>,
    pub arms: Vec<String>,
}

/// One trial's headline figure for an aligned endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointValue {
    pub nct_id: String,
    pub value: String,
    /// Arm the value was taken from.
    pub arm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub significant: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointRow {
    pub endpoint: String,
    pub by_trial: Vec<EndpointValue>,
}

impl EndpointRow {
    pub fn value_for(&self, nct_id: &str) -> Option<&EndpointValue> {
        self.by_trial.iter().find(|v| v.nct_id == nct_id)
    }

    pub fn trial_ids(&self) -> Vec<&str> {
        self.by_trial.iter().map(|v| v.nct_id.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRate {
    pub nct_id: String,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyHighlight {
    pub event: String,
    pub category: EventCategory,
    pub by_trial: Vec<EventRate>,
}

impl SafetyHighlight {
    pub fn rate_for(&self, nct_id: &str) -> Option<f64> {
        self.by_trial
            .iter()
            .find(|r| r.nct_id == nct_id)
            .map(|r| r.rate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialComparison {
    pub populations: Vec<TrialPopulation>,
    pub primary_endpoints: Vec<EndpointRow>,
    pub safety_highlights: Vec<SafetyHighlight>,
    pub endpoint_differences: Vec<String>,
}

impl TrialComparison {
    /// Row whose label equals `endpoint`, ignoring ASCII case.
    pub fn endpoint(&self, endpoint: &str) -> Option<&EndpointRow> {
        self.primary_endpoints
            .iter()
            .find(|row| row.endpoint.eq_ignore_ascii_case(endpoint))
    }

    pub fn highlight(&self, event: &str, category: EventCategory) -> Option<&SafetyHighlight> {
        self.safety_highlights
            .iter()
            .find(|h| h.category == category && h.event.eq_ignore_ascii_case(event))
    }
}
