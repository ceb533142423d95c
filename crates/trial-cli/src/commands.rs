//! Command implementations.
//!
//! Commands load and compute; printing is left to the caller.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use trial_compare::{CompareOptions, ComparisonRequest, compare_trials};
use trial_core::assemble_trial;
use trial_ingest::{IngestError, TrialSource, resolve_all};
use trial_model::{ComparisonError, DataQualityWarning, FullTrialData, TrialComparison};

/// Exit status for a rejected comparison request.
pub const EXIT_INVALID_REQUEST: i32 = 2;
/// Exit status for any other failure.
pub const EXIT_FAILURE: i32 = 1;

/// A warning together with the trial (or comparison) it was raised for.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedWarning {
    pub source: String,
    pub warning: DataQualityWarning,
}

#[derive(Debug)]
pub struct ShowResult {
    pub trial: FullTrialData,
    pub warnings: Vec<SourcedWarning>,
}

#[derive(Debug)]
pub struct CompareResult {
    pub trials: Vec<FullTrialData>,
    pub comparison: TrialComparison,
    pub warnings: Vec<SourcedWarning>,
}

pub fn run_show<S: TrialSource + ?Sized>(source: &S, nct_id: &str) -> Result<ShowResult> {
    let nct_id = nct_id.trim().to_ascii_uppercase();
    let span = info_span!("show", nct_id = %nct_id);
    let _guard = span.enter();

    let raw = source
        .fetch(&nct_id)
        .with_context(|| format!("load trial {nct_id}"))?
        .ok_or(ComparisonError::UnresolvedTrial {
            nct_id: nct_id.clone(),
        })?;
    let (trial, warnings) = assemble_trial(&raw).into_parts();
    info!(
        has_results = trial.has_results,
        warning_count = warnings.len(),
        "trial loaded"
    );

    let warnings = sourced(&trial.nct_id, warnings);
    Ok(ShowResult { trial, warnings })
}

pub fn run_compare<S: TrialSource + ?Sized>(
    source: &S,
    ids: &str,
    options: &CompareOptions,
) -> Result<CompareResult> {
    let request = ComparisonRequest::parse(ids)?;
    let span = info_span!("compare", trials = %request.ids().join(","));
    let _guard = span.enter();

    let raws = resolve_all(source, request.ids()).context("load trials")?;
    let mut trials = Vec::with_capacity(raws.len());
    let mut warnings = Vec::new();
    for raw in &raws {
        let (trial, trial_warnings) = assemble_trial(raw).into_parts();
        warnings.extend(sourced(&trial.nct_id, trial_warnings));
        trials.push(trial);
    }

    let (comparison, comparison_warnings) = compare_trials(&trials, options)?.into_parts();
    warnings.extend(sourced("comparison", comparison_warnings));
    info!(
        endpoint_rows = comparison.primary_endpoints.len(),
        safety_highlights = comparison.safety_highlights.len(),
        notes = comparison.endpoint_differences.len(),
        warning_count = warnings.len(),
        "comparison built"
    );

    Ok(CompareResult {
        trials,
        comparison,
        warnings,
    })
}

fn sourced(source: &str, warnings: Vec<DataQualityWarning>) -> Vec<SourcedWarning> {
    warnings
        .into_iter()
        .map(|warning| SourcedWarning {
            source: source.to_string(),
            warning,
        })
        .collect()
}

/// Invalid requests (bad trial count, duplicates, unknown trials) exit
/// with [`EXIT_INVALID_REQUEST`]; everything else with [`EXIT_FAILURE`].
pub fn exit_code(error: &anyhow::Error) -> i32 {
    let invalid = error.chain().any(|cause| {
        cause.is::<ComparisonError>()
            || matches!(
                cause.downcast_ref::<IngestError>(),
                Some(IngestError::Comparison(_))
            )
    });
    if invalid {
        EXIT_INVALID_REQUEST
    } else {
        EXIT_FAILURE
    }
}
