//! Raw trial records as supplied by a data source.
//!
//! These mirror the loosely-structured result sections published by trial
//! registries: nearly every field is optional, arrays may be missing, and
//! counts may contradict each other. Nothing here is validated; the
//! normalizers turn these into the types in [`crate::trial`] and
//! [`crate::safety`].

use serde::{Deserialize, Serialize};

/// One trial as delivered by the raw data collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTrialRecord {
    pub nct_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub sponsor: Option<String>,
    #[serde(default)]
    pub enrollment: Option<u64>,
    #[serde(default)]
    pub completion_date: Option<String>,
    #[serde(default)]
    pub arms: Vec<RawArm>,
    #[serde(default)]
    pub primary_outcomes: Vec<RawOutcome>,
    #[serde(default)]
    pub secondary_outcomes: Vec<RawOutcome>,
    #[serde(default)]
    pub safety: Option<RawSafety>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArm {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub arm_type: Option<String>,
    #[serde(default)]
    pub intervention: Option<String>,
    #[serde(default)]
    pub n: Option<u64>,
}

/// One primary or secondary outcome block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOutcome {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub time_frame: Option<String>,
    #[serde(default)]
    pub param_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub results: Vec<RawOutcomeResult>,
    #[serde(default)]
    pub analysis: Option<RawAnalysis>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOutcomeResult {
    pub arm_title: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub ci_lower: Option<String>,
    #[serde(default)]
    pub ci_upper: Option<String>,
    #[serde(default)]
    pub spread: Option<String>,
    #[serde(default)]
    pub n: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnalysis {
    #[serde(default)]
    pub p_value: Option<String>,
    /// Explicit significance flag, when the source states one.
    #[serde(default)]
    pub significant: Option<bool>,
    #[serde(default)]
    pub estimate_type: Option<String>,
    #[serde(default)]
    pub estimate_value: Option<String>,
    #[serde(default)]
    pub ci_pct: Option<String>,
    #[serde(default)]
    pub ci_lower: Option<String>,
    #[serde(default)]
    pub ci_upper: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
}

/// Adverse-event tables for one trial.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSafety {
    #[serde(default)]
    pub time_frame: Option<String>,
    #[serde(default)]
    pub arms: Vec<RawSafetyArm>,
    #[serde(default)]
    pub serious_events: Vec<RawEvent>,
    #[serde(default)]
    pub other_events: Vec<RawEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSafetyArm {
    pub title: String,
    #[serde(default)]
    pub serious_num_affected: Option<u64>,
    #[serde(default)]
    pub serious_num_at_risk: Option<u64>,
    #[serde(default)]
    pub other_num_affected: Option<u64>,
    #[serde(default)]
    pub other_num_at_risk: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub organ_system: Option<String>,
    #[serde(default)]
    pub stats: Vec<RawEventStat>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEventStat {
    pub arm_title: String,
    #[serde(default)]
    pub num_affected: Option<u64>,
    #[serde(default)]
    pub num_at_risk: Option<u64>,
    /// Source-reported rate in percent. Only used when no at-risk count
    /// is available to recompute it.
    #[serde(default)]
    pub rate: Option<f64>,
}
