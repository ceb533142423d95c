//! Cross-trial comparison entry point.

use std::collections::BTreeSet;

use trial_model::{
    Annotated, ComparisonError, FullTrialData, MIN_COMPARED_TRIALS, Result, TrialComparison,
    TrialPopulation,
};

use crate::align::{align_events, endpoint_rows, group_endpoints};
use crate::matcher::AlignmentPolicy;
use crate::request::check_trial_count;
use crate::summary::summarize_differences;

/// Jaro-Winkler similarity at which unaligned titles get a near-miss note.
pub const DEFAULT_NEAR_MISS_THRESHOLD: f64 = 0.92;

#[derive(Debug, Clone, Copy)]
pub struct CompareOptions {
    pub policy: AlignmentPolicy,
    /// Keep only the first N safety highlights after ordering.
    pub max_safety_highlights: Option<usize>,
    pub near_miss_threshold: f64,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            policy: AlignmentPolicy::default(),
            max_safety_highlights: None,
            near_miss_threshold: DEFAULT_NEAR_MISS_THRESHOLD,
        }
    }
}

/// Compare 2 to 5 assembled trials.
///
/// The trial set is validated before any alignment work; an invalid set
/// produces no partial result.
pub fn compare_trials(
    trials: &[FullTrialData],
    options: &CompareOptions,
) -> Result<Annotated<TrialComparison>> {
    check_trial_count(trials.len())?;
    let mut seen = BTreeSet::new();
    for trial in trials {
        if !seen.insert(trial.nct_id.to_ascii_uppercase()) {
            return Err(ComparisonError::DuplicateTrial {
                nct_id: trial.nct_id.clone(),
            });
        }
    }

    let span = tracing::debug_span!("compare", trial_count = trials.len());
    let _guard = span.enter();

    let populations = trials
        .iter()
        .map(|trial| TrialPopulation {
            nct_id: trial.nct_id.clone(),
            enrollment: trial.enrollment,
            arms: trial.arm_titles(),
        })
        .collect();

    let groups = group_endpoints(trials, options.policy.endpoints);
    let primary_endpoints = endpoint_rows(trials, &groups);

    let mut safety_highlights = align_events(trials, options.policy.events, MIN_COMPARED_TRIALS);
    if let Some(max) = options.max_safety_highlights {
        safety_highlights.truncate(max);
    }

    let (endpoint_differences, warnings) =
        summarize_differences(trials, &groups, options.near_miss_threshold);

    tracing::debug!(
        endpoint_rows = primary_endpoints.len(),
        highlights = safety_highlights.len(),
        notes = endpoint_differences.len(),
        "comparison built"
    );

    let comparison = TrialComparison {
        populations,
        primary_endpoints,
        safety_highlights,
        endpoint_differences,
    };
    Ok(Annotated::new(comparison).with_warnings(warnings))
}
