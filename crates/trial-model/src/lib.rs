pub mod comparison;
pub mod error;
pub mod raw;
pub mod safety;
pub mod trial;
pub mod warning;

pub use comparison::{
    EndpointRow, EndpointValue, EventRate, MAX_COMPARED_TRIALS, MIN_COMPARED_TRIALS,
    SafetyHighlight, TrialComparison, TrialPopulation,
};
pub use error::{ComparisonError, Result};
pub use raw::{
    RawAnalysis, RawArm, RawEvent, RawEventStat, RawOutcome, RawOutcomeResult, RawSafety,
    RawSafetyArm, RawTrialRecord,
};
pub use safety::{AdverseEvent, ArmEventRate, EventCategory, FormattedSafety, SafetyArmSummary};
pub use trial::{
    AnalysisInterval, Arm, FormattedOutcome, FullTrialData, Interval, OutcomeAnalysis,
    OutcomeCategory, OutcomeResult,
};
pub use warning::{Annotated, DataQualityWarning, WarningCategory};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotated_counts_warnings() {
        let annotated = Annotated::new(3u8).with_warnings(vec![
            DataQualityWarning::MalformedArm { index: 0 },
            DataQualityWarning::MalformedEvent {
                category: EventCategory::Other,
                index: 2,
            },
        ]);
        assert!(annotated.has_warnings());
        assert_eq!(annotated.warnings.len(), 2);
        assert_eq!(annotated.data, 3);
    }

    #[test]
    fn trial_serializes_with_camel_case_keys() {
        let trial = FullTrialData {
            nct_id: "NCT00000001".to_string(),
            title: "A Study".to_string(),
            phase: None,
            status: "COMPLETED".to_string(),
            sponsor: None,
            enrollment: Some(10),
            completion_date: None,
            arms: vec![],
            primary_outcomes: vec![],
            secondary_outcomes: vec![],
            safety: None,
            has_results: false,
        };
        let json = serde_json::to_value(&trial).expect("serialize trial");
        assert_eq!(json["nctId"], "NCT00000001");
        assert_eq!(json["hasResults"], false);
        assert!(json["safety"].is_null());
    }
}
