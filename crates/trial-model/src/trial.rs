//! Normalized single-trial records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::safety::FormattedSafety;

/// One study arm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arm {
    /// Unique within a trial.
    pub title: String,
    /// Arm category, e.g. "EXPERIMENTAL" or "PLACEBO_COMPARATOR".
    #[serde(rename = "type")]
    pub arm_type: Option<String>,
    pub intervention: Option<String>,
    /// Enrolled participants.
    pub n: Option<u64>,
}

/// A confidence interval as reported. Bounds stay textual because
/// registries publish qualitative limits such as "NA" or "Not reached".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub lower: String,
    pub upper: String,
}

/// One arm's measurement for one outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeResult {
    pub arm_title: String,
    /// May be non-numeric, e.g. "Not reached".
    pub value: String,
    pub ci: Option<Interval>,
    pub spread: Option<String>,
    /// Evaluable population for this arm and outcome.
    pub n: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisInterval {
    /// Confidence level in percent, e.g. "95".
    pub pct: Option<String>,
    pub lower: String,
    pub upper: String,
}

/// Statistical analysis attached to an outcome as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeAnalysis {
    /// Original formatting preserved, e.g. "<0.001".
    pub p_value: Option<String>,
    pub p_value_significant: bool,
    pub estimate_type: Option<String>,
    pub estimate_value: Option<String>,
    pub ci: Option<AnalysisInterval>,
    pub method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedOutcome {
    pub title: String,
    pub time_frame: Option<String>,
    pub param_type: Option<String>,
    pub description: Option<String>,
    pub units: Option<String>,
    /// Ordered by arm declaration order, at most one entry per arm.
    pub results: Vec<OutcomeResult>,
    pub analysis: Option<OutcomeAnalysis>,
}

impl FormattedOutcome {
    /// The result of the first declared arm that reported one.
    pub fn first_result(&self) -> Option<&OutcomeResult> {
        self.results.first()
    }

    pub fn result_for(&self, arm_title: &str) -> Option<&OutcomeResult> {
        self.results.iter().find(|r| r.arm_title == arm_title)
    }

    pub fn p_value(&self) -> Option<&str> {
        self.analysis.as_ref().and_then(|a| a.p_value.as_deref())
    }

    pub fn is_significant(&self) -> bool {
        self.analysis
            .as_ref()
            .is_some_and(|a| a.p_value_significant)
    }
}

/// Primary or secondary outcome list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeCategory {
    Primary,
    Secondary,
}

impl OutcomeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeCategory::Primary => "primary",
            OutcomeCategory::Secondary => "secondary",
        }
    }
}

impl fmt::Display for OutcomeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The assembled single-trial record.
///
/// Trials that are registered but have no posted results are still
/// represented, with `has_results == false` and `safety == None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullTrialData {
    pub nct_id: String,
    pub title: String,
    pub phase: Option<String>,
    pub status: String,
    pub sponsor: Option<String>,
    pub enrollment: Option<u64>,
    pub completion_date: Option<String>,
    pub arms: Vec<Arm>,
    pub primary_outcomes: Vec<FormattedOutcome>,
    pub secondary_outcomes: Vec<FormattedOutcome>,
    pub safety: Option<FormattedSafety>,
    pub has_results: bool,
}

impl FullTrialData {
    pub fn arm(&self, title: &str) -> Option<&Arm> {
        self.arms.iter().find(|arm| arm.title == title)
    }

    pub fn arm_titles(&self) -> Vec<String> {
        self.arms.iter().map(|arm| arm.title.clone()).collect()
    }

    pub fn outcomes(&self, category: OutcomeCategory) -> &[FormattedOutcome] {
        match category {
            OutcomeCategory::Primary => &self.primary_outcomes,
            OutcomeCategory::Secondary => &self.secondary_outcomes,
        }
    }
}
