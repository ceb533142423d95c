//! Single-trial assembly.
//!
//! Combines deduplicated arms, normalized primary and secondary outcomes,
//! normalized safety data and pass-through metadata into one
//! [`FullTrialData`]. Pure: no I/O, no caching.

use trial_model::{
    Annotated, FormattedOutcome, FormattedSafety, FullTrialData, OutcomeCategory, RawTrialRecord,
};
use trial_normalize::{clean_opt, normalize_outcomes, normalize_safety};

use crate::dedupe::dedupe_arms;

/// Assemble one raw trial record.
///
/// Never fails: malformed pieces are skipped and reported in the returned
/// warnings. A trial with arms but no posted results is returned with
/// `has_results == false` and `safety == None`.
pub fn assemble_trial(raw: &RawTrialRecord) -> Annotated<FullTrialData> {
    let span = tracing::debug_span!("assemble", nct_id = %raw.nct_id);
    let _guard = span.enter();

    let mut warnings = Vec::new();
    let arms = dedupe_arms(&raw.arms, &mut warnings);

    let (primary_outcomes, primary_warnings) =
        normalize_outcomes(&raw.primary_outcomes, OutcomeCategory::Primary, &arms).into_parts();
    warnings.extend(primary_warnings);
    let (secondary_outcomes, secondary_warnings) =
        normalize_outcomes(&raw.secondary_outcomes, OutcomeCategory::Secondary, &arms)
            .into_parts();
    warnings.extend(secondary_warnings);

    let safety = match raw.safety.as_ref().map(normalize_safety) {
        Some(normalized) => {
            let (safety, safety_warnings) = normalized.into_parts();
            warnings.extend(safety_warnings);
            (!safety.is_empty()).then_some(safety)
        }
        None => None,
    };

    let has_results = has_results(&primary_outcomes, &secondary_outcomes, safety.as_ref());
    tracing::debug!(
        arm_count = arms.len(),
        primary_count = primary_outcomes.len(),
        secondary_count = secondary_outcomes.len(),
        has_safety = safety.is_some(),
        has_results,
        warning_count = warnings.len(),
        "trial assembled"
    );

    let trial = FullTrialData {
        nct_id: raw.nct_id.trim().to_string(),
        title: raw.title.trim().to_string(),
        phase: clean_opt(raw.phase.as_deref()),
        status: raw.status.trim().to_string(),
        sponsor: clean_opt(raw.sponsor.as_deref()),
        enrollment: raw.enrollment,
        completion_date: clean_opt(raw.completion_date.as_deref()),
        arms,
        primary_outcomes,
        secondary_outcomes,
        safety,
        has_results,
    };
    Annotated::new(trial).with_warnings(warnings)
}

/// True when any outcome was normalized or safety data lists at least one
/// adverse event.
pub fn has_results(
    primary: &[FormattedOutcome],
    secondary: &[FormattedOutcome],
    safety: Option<&FormattedSafety>,
) -> bool {
    !primary.is_empty() || !secondary.is_empty() || safety.is_some_and(FormattedSafety::has_events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trial_model::SafetyArmSummary;

    #[test]
    fn safety_without_events_does_not_count() {
        let safety = FormattedSafety {
            time_frame: None,
            arms: vec![SafetyArmSummary {
                title: "A".to_string(),
                serious_num_affected: 0,
                serious_num_at_risk: 10,
                other_num_affected: 0,
                other_num_at_risk: 10,
            }],
            serious_events: vec![],
            other_events: vec![],
        };
        assert!(!has_results(&[], &[], Some(&safety)));
        assert!(!has_results(&[], &[], None));
    }
}
