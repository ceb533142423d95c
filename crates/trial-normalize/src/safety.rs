//! Adverse-event table normalization.

use std::cmp::Ordering;

use trial_model::{
    AdverseEvent, Annotated, ArmEventRate, DataQualityWarning, EventCategory, FormattedSafety,
    RawEvent, RawSafety, RawSafetyArm, SafetyArmSummary,
};

use crate::text::{arm_key, clean_opt};

/// Percentage of `num_at_risk` that was affected; 0 when nobody was at risk.
pub fn event_rate(num_affected: u64, num_at_risk: u64) -> f64 {
    if num_at_risk > 0 {
        100.0 * num_affected as f64 / num_at_risk as f64
    } else {
        0.0
    }
}

/// Normalize one trial's adverse-event tables.
///
/// Serious and other events are kept as independent lists, even when the
/// same term appears in both.
pub fn normalize_safety(raw: &RawSafety) -> Annotated<FormattedSafety> {
    let mut warnings = Vec::new();

    let arms: Vec<SafetyArmSummary> = raw
        .arms
        .iter()
        .map(|arm| summarize_arm(arm, &mut warnings))
        .collect();
    let serious_events = normalize_events(
        &raw.serious_events,
        EventCategory::Serious,
        &arms,
        &mut warnings,
    );
    let other_events = normalize_events(
        &raw.other_events,
        EventCategory::Other,
        &arms,
        &mut warnings,
    );

    tracing::debug!(
        arm_count = arms.len(),
        serious_count = serious_events.len(),
        other_count = other_events.len(),
        "safety normalized"
    );

    let safety = FormattedSafety {
        time_frame: clean_opt(raw.time_frame.as_deref()),
        arms,
        serious_events,
        other_events,
    };
    Annotated::new(safety).with_warnings(warnings)
}

fn summarize_arm(raw: &RawSafetyArm, warnings: &mut Vec<DataQualityWarning>) -> SafetyArmSummary {
    let title = raw.title.trim().to_string();
    let (serious_num_affected, serious_num_at_risk) = clamp_counts(
        &title,
        EventCategory::Serious,
        None,
        raw.serious_num_affected.unwrap_or(0),
        raw.serious_num_at_risk.unwrap_or(0),
        warnings,
    );
    let (other_num_affected, other_num_at_risk) = clamp_counts(
        &title,
        EventCategory::Other,
        None,
        raw.other_num_affected.unwrap_or(0),
        raw.other_num_at_risk.unwrap_or(0),
        warnings,
    );
    SafetyArmSummary {
        title,
        serious_num_affected,
        serious_num_at_risk,
        other_num_affected,
        other_num_at_risk,
    }
}

fn normalize_events(
    raws: &[RawEvent],
    category: EventCategory,
    summaries: &[SafetyArmSummary],
    warnings: &mut Vec<DataQualityWarning>,
) -> Vec<AdverseEvent> {
    let mut events: Vec<AdverseEvent> = raws
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| normalize_event(raw, index, category, summaries, warnings))
        .collect();
    events.sort_by(compare_events);
    events
}

fn normalize_event(
    raw: &RawEvent,
    index: usize,
    category: EventCategory,
    summaries: &[SafetyArmSummary],
    warnings: &mut Vec<DataQualityWarning>,
) -> Option<AdverseEvent> {
    let Some(term) = clean_opt(raw.term.as_deref()) else {
        tracing::warn!(category = %category, index, "skipping adverse event without term");
        warnings.push(DataQualityWarning::MalformedEvent { category, index });
        return None;
    };

    let mut by_arm = Vec::with_capacity(raw.stats.len());
    let mut published_rates = Vec::new();
    for stat in &raw.stats {
        let arm_title = stat.arm_title.trim().to_string();
        let reported_at_risk = stat.num_at_risk.or_else(|| {
            let key = arm_key(&arm_title);
            summaries
                .iter()
                .find(|summary| arm_key(&summary.title) == key)
                .map(|summary| summary.counts(category).1)
        });
        let (num_affected, num_at_risk) = clamp_counts(
            &arm_title,
            category,
            Some(&term),
            stat.num_affected.unwrap_or(0),
            reported_at_risk.unwrap_or(0),
            warnings,
        );
        let rate = match (reported_at_risk, stat.rate) {
            (Some(_), _) => event_rate(num_affected, num_at_risk),
            // No denominator anywhere: fall back to the published rate.
            (None, Some(published)) => {
                let rate = clamp_percent(published);
                published_rates.push(rate);
                rate
            }
            (None, None) => 0.0,
        };
        by_arm.push(ArmEventRate {
            arm_title,
            num_affected,
            num_at_risk,
            rate,
        });
    }

    let total_affected: u64 = by_arm.iter().map(|entry| entry.num_affected).sum();
    let total_at_risk: u64 = by_arm.iter().map(|entry| entry.num_at_risk).sum();
    let overall_rate = if total_at_risk == 0 && !published_rates.is_empty() {
        // Without populations the published arm rates cannot be weighted.
        clamp_percent(published_rates.iter().sum::<f64>() / published_rates.len() as f64)
    } else {
        event_rate(total_affected, total_at_risk)
    };
    Some(AdverseEvent {
        term,
        organ_system: clean_opt(raw.organ_system.as_deref()),
        by_arm,
        overall_rate,
    })
}

/// Enforces `affected <= at_risk`, recording a warning when it had to clamp.
fn clamp_counts(
    arm: &str,
    category: EventCategory,
    event: Option<&str>,
    num_affected: u64,
    num_at_risk: u64,
    warnings: &mut Vec<DataQualityWarning>,
) -> (u64, u64) {
    if num_affected <= num_at_risk {
        return (num_affected, num_at_risk);
    }
    tracing::warn!(
        arm,
        category = %category,
        event = event.unwrap_or("-"),
        num_affected,
        num_at_risk,
        "affected count exceeds at-risk count; clamping"
    );
    warnings.push(DataQualityWarning::AffectedExceedsAtRisk {
        arm: arm.to_string(),
        category,
        event: event.map(ToString::to_string),
        num_affected,
        num_at_risk,
    });
    (num_at_risk, num_at_risk)
}

fn clamp_percent(rate: f64) -> f64 {
    if rate.is_nan() {
        0.0
    } else {
        rate.clamp(0.0, 100.0)
    }
}

fn compare_events(a: &AdverseEvent, b: &AdverseEvent) -> Ordering {
    b.overall_rate
        .total_cmp(&a.overall_rate)
        .then_with(|| a.term.cmp(&b.term))
        .then_with(|| a.organ_system.cmp(&b.organ_system))
}
