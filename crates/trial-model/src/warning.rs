//! Data-quality warnings.
//!
//! Everything recoverable found while normalizing or comparing trials is
//! reported as a [`DataQualityWarning`] next to the result instead of
//! failing the operation. Each variant carries only the data it needs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::safety::EventCategory;
use crate::trial::OutcomeCategory;

/// Area of the record a warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningCategory {
    Arms,
    Outcomes,
    Safety,
    Alignment,
}

impl WarningCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Arms => "Arms",
            Self::Outcomes => "Outcomes",
            Self::Safety => "Safety",
            Self::Alignment => "Alignment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "kind",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum DataQualityWarning {
    /// Outcome block without a title; skipped.
    MalformedOutcomeBlock {
        category: OutcomeCategory,
        index: usize,
    },
    /// Result refers to an arm the trial does not declare; skipped.
    UnknownArm { outcome: String, arm: String },
    /// Second result for the same arm within one outcome; skipped.
    DuplicateArmResult { outcome: String, arm: String },
    /// Confidence interval with only one bound; dropped. `arm` is absent
    /// for the outcome's analysis interval.
    IncompleteInterval { outcome: String, arm: Option<String> },
    /// Arm without a title; skipped.
    MalformedArm { index: usize },
    /// Arm title listed more than once; one entry kept.
    DuplicateArm {
        arm: String,
        kept_n: Option<u64>,
        dropped_n: Option<u64>,
    },
    /// Adverse event without a term; skipped.
    MalformedEvent { category: EventCategory, index: usize },
    /// More participants affected than at risk; affected count clamped.
    AffectedExceedsAtRisk {
        arm: String,
        category: EventCategory,
        event: Option<String>,
        num_affected: u64,
        num_at_risk: u64,
    },
    /// Aligned endpoint reported in different units.
    UnitMismatch { endpoint: String, units: Vec<String> },
    /// Aligned endpoint reported with different measure types.
    ParamTypeMismatch {
        endpoint: String,
        param_types: Vec<String>,
    },
}

impl DataQualityWarning {
    pub fn category(&self) -> WarningCategory {
        match self {
            Self::MalformedArm { .. } => WarningCategory::Arms,
            Self::DuplicateArm { .. } => WarningCategory::Arms,
            Self::MalformedOutcomeBlock { .. } => WarningCategory::Outcomes,
            Self::UnknownArm { .. } => WarningCategory::Outcomes,
            Self::DuplicateArmResult { .. } => WarningCategory::Outcomes,
            Self::IncompleteInterval { .. } => WarningCategory::Outcomes,
            Self::MalformedEvent { .. } => WarningCategory::Safety,
            Self::AffectedExceedsAtRisk { .. } => WarningCategory::Safety,
            Self::UnitMismatch { .. } => WarningCategory::Alignment,
            Self::ParamTypeMismatch { .. } => WarningCategory::Alignment,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::MalformedOutcomeBlock { category, index } => {
                format!("{category} outcome #{} has no title and was skipped", index + 1)
            }
            Self::UnknownArm { outcome, arm } => {
                format!("Outcome '{outcome}' reports a result for unknown arm '{arm}'")
            }
            Self::DuplicateArmResult { outcome, arm } => {
                format!("Outcome '{outcome}' reports arm '{arm}' more than once; first kept")
            }
            Self::IncompleteInterval { outcome, arm } => match arm {
                Some(arm) => format!(
                    "Outcome '{outcome}' gives only one confidence bound for arm '{arm}'; interval dropped"
                ),
                None => format!(
                    "Outcome '{outcome}' gives only one confidence bound for its analysis; interval dropped"
                ),
            },
            Self::MalformedArm { index } => {
                format!("Arm #{} has no title and was skipped", index + 1)
            }
            Self::DuplicateArm {
                arm,
                kept_n,
                dropped_n,
            } => format!(
                "Arm '{arm}' is listed more than once; kept n={}, dropped n={}",
                display_count(*kept_n),
                display_count(*dropped_n)
            ),
            Self::MalformedEvent { category, index } => {
                format!("{category} adverse event #{} has no term and was skipped", index + 1)
            }
            Self::AffectedExceedsAtRisk {
                arm,
                category,
                event,
                num_affected,
                num_at_risk,
            } => {
                let scope = match event {
                    Some(term) => format!("'{term}' ({category})"),
                    None => format!("{category} events"),
                };
                format!(
                    "Arm '{arm}' reports {num_affected} affected but only {num_at_risk} at risk for {scope}; clamped to {num_at_risk}"
                )
            }
            Self::UnitMismatch { endpoint, units } => format!(
                "Endpoint '{endpoint}' is reported in different units: {}",
                units.join(", ")
            ),
            Self::ParamTypeMismatch {
                endpoint,
                param_types,
            } => format!(
                "Endpoint '{endpoint}' is reported as different measure types: {}",
                param_types.join(", ")
            ),
        }
    }
}

impl fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

fn display_count(n: Option<u64>) -> String {
    n.map_or_else(|| "-".to_string(), |n| n.to_string())
}

/// A result together with the warnings accumulated while producing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotated<T> {
    pub data: T,
    pub warnings: Vec<DataQualityWarning>,
}

impl<T> Annotated<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_warnings(mut self, warnings: Vec<DataQualityWarning>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Annotated<U> {
        Annotated {
            data: f(self.data),
            warnings: self.warnings,
        }
    }

    pub fn into_parts(self) -> (T, Vec<DataQualityWarning>) {
        (self.data, self.warnings)
    }
}
