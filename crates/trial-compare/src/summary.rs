//! Endpoint difference notes.
//!
//! Notes are plain sentences meant for display next to the comparison
//! table. Their order is fixed: per-trial notes in input order, then
//! per-group notes in group order.

use trial_model::{DataQualityWarning, FormattedOutcome, FullTrialData};

use crate::align::{EndpointGroup, EndpointMember, Exclusion, ExclusionReason, aligned_trials};
use crate::matcher::title_similarity;

/// Build the `endpointDifferences` notes for grouped primary outcomes.
///
/// Unit and measure-type mismatches are also returned as warnings.
pub fn summarize_differences(
    trials: &[FullTrialData],
    groups: &[EndpointGroup],
    near_miss_threshold: f64,
) -> (Vec<String>, Vec<DataQualityWarning>) {
    let mut notes = Vec::new();
    let mut warnings = Vec::new();

    let aligned = aligned_trials(groups);
    for (index, trial) in trials.iter().enumerate() {
        if aligned.contains(&index) {
            continue;
        }
        if trial.primary_outcomes.is_empty() {
            notes.push(format!(
                "Trial {} reports no primary endpoints to compare",
                trial.nct_id
            ));
        } else {
            notes.push(format!(
                "Trial {} reports no endpoints in common with the others",
                trial.nct_id
            ));
        }
    }

    for (position, group) in groups.iter().enumerate() {
        if let Some(exclusion) = &group.exclusion {
            exclusion_note(trials, group, exclusion, &mut notes);
        } else if group.is_aligned() {
            let label = group.label(trials);
            ambiguity_notes(trials, group, &label, &mut notes);
            mismatch_notes(trials, group, &label, &mut notes, &mut warnings);
        } else {
            near_miss_notes(
                trials,
                group,
                &groups[position + 1..],
                near_miss_threshold,
                &mut notes,
            );
        }
    }

    (notes, warnings)
}

fn exclusion_note(
    trials: &[FullTrialData],
    group: &EndpointGroup,
    exclusion: &Exclusion,
    notes: &mut Vec<String>,
) {
    let Some(member) = group.members.first().copied() else {
        return;
    };
    let matched: Vec<String> = exclusion
        .matched
        .iter()
        .map(|m| describe(trials, group, *m))
        .collect();
    let matched = match matched.split_last() {
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} and {last}", rest.join(", ")),
        None => return,
    };
    let outcome = describe(trials, group, member);
    notes.push(match exclusion.reason {
        ExclusionReason::Bridge => format!(
            "{outcome} matches {matched}, which are not all the same endpoint; it was left unaligned"
        ),
        ExclusionReason::Partial => format!(
            "{outcome} matches {matched} but not every outcome grouped with them; it was left unaligned"
        ),
    });
}

/// `'title' (NCT id)`
fn describe(trials: &[FullTrialData], group: &EndpointGroup, member: EndpointMember) -> String {
    format!(
        "'{}' ({})",
        group.outcome(trials, member).title,
        trials[member.trial].nct_id
    )
}

fn ambiguity_notes(
    trials: &[FullTrialData],
    group: &EndpointGroup,
    label: &str,
    notes: &mut Vec<String>,
) {
    for trial in group.ambiguous_trials() {
        let Some(member) = group.representative(trial) else {
            continue;
        };
        notes.push(format!(
            "Trial {} has several primary outcomes matching '{label}'; compared using '{}'",
            trials[trial].nct_id,
            group.outcome(trials, member).title
        ));
    }
}

fn mismatch_notes(
    trials: &[FullTrialData],
    group: &EndpointGroup,
    label: &str,
    notes: &mut Vec<String>,
    warnings: &mut Vec<DataQualityWarning>,
) {
    let representatives: Vec<EndpointMember> = group
        .trials()
        .into_iter()
        .filter_map(|trial| group.representative(trial))
        .collect();

    let units = distinct_values(trials, group, &representatives, |m| m.units.as_deref());
    if units.len() > 1 {
        tracing::warn!(endpoint = label, units = ?units, "unit mismatch across trials");
        notes.push(format!(
            "'{label}' is reported in different units ({}); values are not directly comparable",
            units.join(" vs ")
        ));
        warnings.push(DataQualityWarning::UnitMismatch {
            endpoint: label.to_string(),
            units,
        });
    }

    let param_types =
        distinct_values(trials, group, &representatives, |m| m.param_type.as_deref());
    if param_types.len() > 1 {
        tracing::warn!(endpoint = label, param_types = ?param_types, "measure type mismatch across trials");
        notes.push(format!(
            "'{label}' is reported as different measure types ({}); values are not directly comparable",
            param_types.join(" vs ")
        ));
        warnings.push(DataQualityWarning::ParamTypeMismatch {
            endpoint: label.to_string(),
            param_types,
        });
    }
}

/// Distinct non-blank values in first-seen order, compared ignoring case.
fn distinct_values(
    trials: &[FullTrialData],
    group: &EndpointGroup,
    members: &[EndpointMember],
    field: impl Fn(&FormattedOutcome) -> Option<&str>,
) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for member in members {
        let Some(value) = field(group.outcome(trials, *member)).map(str::trim) else {
            continue;
        };
        if value.is_empty() || values.iter().any(|v| v.eq_ignore_ascii_case(value)) {
            continue;
        }
        values.push(value.to_string());
    }
    values
}

fn near_miss_notes(
    trials: &[FullTrialData],
    group: &EndpointGroup,
    later: &[EndpointGroup],
    threshold: f64,
    notes: &mut Vec<String>,
) {
    let Some(member) = group.members.first().copied() else {
        return;
    };
    let title = &group.outcome(trials, member).title;
    for other in later
        .iter()
        .filter(|g| !g.is_aligned() && g.exclusion.is_none())
    {
        let Some(other_member) = other.members.first().copied() else {
            continue;
        };
        if other_member.trial == member.trial {
            continue;
        }
        let other_title = &other.outcome(trials, other_member).title;
        let similarity = title_similarity(title, other_title);
        if similarity >= threshold {
            tracing::debug!(similarity, "near-miss endpoint titles");
            notes.push(format!(
                "'{title}' ({}) and '{other_title}' ({}) may describe the same endpoint but were not aligned",
                trials[member.trial].nct_id, trials[other_member.trial].nct_id
            ));
        }
    }
}
