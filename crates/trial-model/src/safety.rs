//! Normalized adverse-event data.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Registry reporting category for adverse events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Serious,
    Other,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Serious => "serious",
            EventCategory::Other => "other",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One arm's figures for one adverse event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmEventRate {
    pub arm_title: String,
    pub num_affected: u64,
    pub num_at_risk: u64,
    /// Percent, `100 * num_affected / num_at_risk` (0 when nobody is at risk).
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdverseEvent {
    /// Term as reported by this trial, not canonicalized across trials.
    pub term: String,
    pub organ_system: Option<String>,
    pub by_arm: Vec<ArmEventRate>,
    /// Population-weighted rate across all arms, in percent.
    pub overall_rate: f64,
}

impl AdverseEvent {
    pub fn rate_for(&self, arm_title: &str) -> Option<&ArmEventRate> {
        self.by_arm.iter().find(|entry| entry.arm_title == arm_title)
    }

    pub fn total_affected(&self) -> u64 {
        self.by_arm.iter().map(|entry| entry.num_affected).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyArmSummary {
    pub title: String,
    pub serious_num_affected: u64,
    pub serious_num_at_risk: u64,
    pub other_num_affected: u64,
    pub other_num_at_risk: u64,
}

impl SafetyArmSummary {
    /// `(affected, at_risk)` for one category.
    pub fn counts(&self, category: EventCategory) -> (u64, u64) {
        match category {
            EventCategory::Serious => (self.serious_num_affected, self.serious_num_at_risk),
            EventCategory::Other => (self.other_num_affected, self.other_num_at_risk),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedSafety {
    pub time_frame: Option<String>,
    pub arms: Vec<SafetyArmSummary>,
    /// Ordered by descending overall rate, then term.
    pub serious_events: Vec<AdverseEvent>,
    /// Ordered by descending overall rate, then term.
    pub other_events: Vec<AdverseEvent>,
}

impl FormattedSafety {
    pub fn events(&self, category: EventCategory) -> &[AdverseEvent] {
        match category {
            EventCategory::Serious => &self.serious_events,
            EventCategory::Other => &self.other_events,
        }
    }

    pub fn has_events(&self) -> bool {
        !self.serious_events.is_empty() || !self.other_events.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.arms.is_empty() && !self.has_events()
    }
}
