//! Outcome block normalization.

use trial_model::{
    AnalysisInterval, Annotated, Arm, DataQualityWarning, FormattedOutcome, Interval,
    OutcomeAnalysis, OutcomeCategory, OutcomeResult, RawAnalysis, RawOutcome, RawOutcomeResult,
};

use crate::p_value::is_significant;
use crate::text::{arm_key, clean_opt};

/// Placeholder for a result row that carries no value at all.
const MISSING_VALUE: &str = "N/A";

/// Normalize every block of one outcome list.
///
/// Blocks without a title are skipped with a
/// [`DataQualityWarning::MalformedOutcomeBlock`]; the remaining blocks are
/// still normalized.
pub fn normalize_outcomes(
    raws: &[RawOutcome],
    category: OutcomeCategory,
    arms: &[Arm],
) -> Annotated<Vec<FormattedOutcome>> {
    let mut outcomes = Vec::with_capacity(raws.len());
    let mut warnings = Vec::new();

    for (index, raw) in raws.iter().enumerate() {
        match normalize_outcome(raw, arms) {
            Some(normalized) => {
                let (outcome, outcome_warnings) = normalized.into_parts();
                outcomes.push(outcome);
                warnings.extend(outcome_warnings);
            }
            None => {
                tracing::warn!(
                    category = %category,
                    index,
                    "skipping outcome block without title"
                );
                warnings.push(DataQualityWarning::MalformedOutcomeBlock { category, index });
            }
        }
    }

    tracing::debug!(
        category = %category,
        outcome_count = outcomes.len(),
        skipped = raws.len() - outcomes.len(),
        "outcomes normalized"
    );
    Annotated::new(outcomes).with_warnings(warnings)
}

/// Normalize one raw outcome block against the trial's arms.
///
/// Returns `None` when the block has no usable title. A block without
/// results still yields an outcome with an empty `results` list.
pub fn normalize_outcome(raw: &RawOutcome, arms: &[Arm]) -> Option<Annotated<FormattedOutcome>> {
    let title = clean_opt(raw.title.as_deref())?;
    let mut warnings = Vec::new();

    // One slot per declared arm keeps results in declaration order.
    let mut slots: Vec<Option<OutcomeResult>> = vec![None; arms.len()];
    for result in &raw.results {
        let key = arm_key(&result.arm_title);
        let Some(position) = arms.iter().position(|arm| arm_key(&arm.title) == key) else {
            tracing::warn!(outcome = %title, arm = %result.arm_title, "result for unknown arm");
            warnings.push(DataQualityWarning::UnknownArm {
                outcome: title.clone(),
                arm: result.arm_title.trim().to_string(),
            });
            continue;
        };
        let slot = &mut slots[position];
        if slot.is_some() {
            tracing::warn!(outcome = %title, arm = %arms[position].title, "duplicate arm result");
            warnings.push(DataQualityWarning::DuplicateArmResult {
                outcome: title.clone(),
                arm: arms[position].title.clone(),
            });
            continue;
        }
        *slot = Some(normalize_result(
            result,
            &arms[position].title,
            &title,
            &mut warnings,
        ));
    }
    let analysis = raw
        .analysis
        .as_ref()
        .and_then(|analysis| normalize_analysis(analysis, &title, &mut warnings));

    let outcome = FormattedOutcome {
        title,
        time_frame: clean_opt(raw.time_frame.as_deref()),
        param_type: clean_opt(raw.param_type.as_deref()),
        description: clean_opt(raw.description.as_deref()),
        units: clean_opt(raw.units.as_deref()),
        results: slots.into_iter().flatten().collect(),
        analysis,
    };
    Some(Annotated::new(outcome).with_warnings(warnings))
}

fn normalize_result(
    raw: &RawOutcomeResult,
    arm_title: &str,
    outcome: &str,
    warnings: &mut Vec<DataQualityWarning>,
) -> OutcomeResult {
    OutcomeResult {
        arm_title: arm_title.to_string(),
        value: clean_opt(raw.value.as_deref()).unwrap_or_else(|| MISSING_VALUE.to_string()),
        ci: interval(
            raw.ci_lower.as_deref(),
            raw.ci_upper.as_deref(),
            outcome,
            Some(arm_title),
            warnings,
        )
        .map(|(lower, upper)| Interval { lower, upper }),
        spread: clean_opt(raw.spread.as_deref()),
        n: raw.n,
    }
}

fn normalize_analysis(
    raw: &RawAnalysis,
    outcome: &str,
    warnings: &mut Vec<DataQualityWarning>,
) -> Option<OutcomeAnalysis> {
    let p_value = clean_opt(raw.p_value.as_deref());
    let estimate_type = clean_opt(raw.estimate_type.as_deref());
    let estimate_value = clean_opt(raw.estimate_value.as_deref());
    let method = clean_opt(raw.method.as_deref());
    let ci = interval(
        raw.ci_lower.as_deref(),
        raw.ci_upper.as_deref(),
        outcome,
        None,
        warnings,
    )
    .map(|(lower, upper)| AnalysisInterval {
        pct: clean_opt(raw.ci_pct.as_deref()),
        lower,
        upper,
    });

    let flagged = raw.significant == Some(true);
    if p_value.is_none()
        && estimate_type.is_none()
        && estimate_value.is_none()
        && method.is_none()
        && ci.is_none()
        && !flagged
    {
        return None;
    }

    let p_value_significant = flagged || p_value.as_deref().is_some_and(is_significant);
    Some(OutcomeAnalysis {
        p_value,
        p_value_significant,
        estimate_type,
        estimate_value,
        ci,
        method,
    })
}

/// Both bounds or nothing; a lone bound is not an interval and is reported.
///
/// `arm` is `None` for the analysis interval.
fn interval(
    lower: Option<&str>,
    upper: Option<&str>,
    outcome: &str,
    arm: Option<&str>,
    warnings: &mut Vec<DataQualityWarning>,
) -> Option<(String, String)> {
    match (clean_opt(lower), clean_opt(upper)) {
        (Some(lower), Some(upper)) => Some((lower, upper)),
        (None, None) => None,
        (lower, upper) => {
            tracing::warn!(
                outcome,
                arm = arm.unwrap_or("-"),
                ?lower,
                ?upper,
                "dropping confidence interval with a single bound"
            );
            warnings.push(DataQualityWarning::IncompleteInterval {
                outcome: outcome.to_string(),
                arm: arm.map(ToString::to_string),
            });
            None
        }
    }
}
