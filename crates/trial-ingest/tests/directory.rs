//! Tests for directory-backed trial sources.

use std::path::Path;

use tempfile::TempDir;
use trial_ingest::{DirectorySource, IngestError, TrialSource, resolve_all};
use trial_model::ComparisonError;

const NATIVE: &str = r#"{
    "nctId": "NCT01000001",
    "title": "Drug X versus Placebo",
    "status": "COMPLETED",
    "arms": [{"title": "Drug X 10mg", "n": 120}, {"title": "Placebo", "n": 118}]
}"#;

const CTGOV: &str = r#"{
    "protocolSection": {
        "identificationModule": {"nctId": "NCT02000002", "briefTitle": "Drug Y in Advanced Disease"},
        "statusModule": {"overallStatus": "COMPLETED", "completionDateStruct": {"date": "2022-11"}},
        "sponsorCollaboratorsModule": {"leadSponsor": {"name": "Example Oncology"}},
        "designModule": {"phases": ["PHASE2", "PHASE3"], "enrollmentInfo": {"count": 300}},
        "armsInterventionsModule": {
            "armGroups": [
                {"label": "Drug Y", "type": "EXPERIMENTAL", "interventionNames": ["Drug: Drug Y"]},
                {"label": "Placebo", "type": "PLACEBO_COMPARATOR", "interventionNames": ["Drug: Placebo"]}
            ]
        }
    },
    "resultsSection": {
        "baselineCharacteristicsModule": {
            "groups": [
                {"id": "BG000", "title": "Drug Y"},
                {"id": "BG001", "title": "Placebo"},
                {"id": "BG002", "title": "Total"}
            ],
            "denoms": [{"units": "Participants", "counts": [
                {"groupId": "BG000", "value": "150"},
                {"groupId": "BG001", "value": "149"},
                {"groupId": "BG002", "value": "299"}
            ]}]
        },
        "outcomeMeasuresModule": {
            "outcomeMeasures": [
                {
                    "type": "PRIMARY",
                    "title": "Progression-Free Survival",
                    "paramType": "MEDIAN",
                    "unitOfMeasure": "months",
                    "timeFrame": "Up to 36 months",
                    "groups": [{"id": "OG000", "title": "Drug Y"}, {"id": "OG001", "title": "Placebo"}],
                    "denoms": [{"units": "Participants", "counts": [
                        {"groupId": "OG000", "value": "148"},
                        {"groupId": "OG001", "value": "147"}
                    ]}],
                    "classes": [{"categories": [{"measurements": [
                        {"groupId": "OG000", "value": "11.2", "lowerLimit": "9.5", "upperLimit": "13.0"},
                        {"groupId": "OG001", "value": "6.1", "lowerLimit": "5.2", "upperLimit": "7.4"}
                    ]}]}],
                    "analyses": [{
                        "pValue": "<0.001",
                        "statisticalMethod": "Log Rank",
                        "paramType": "Hazard Ratio (HR)",
                        "paramValue": "0.55",
                        "ciPctValue": "95",
                        "ciLowerLimit": "0.42",
                        "ciUpperLimit": "0.71"
                    }]
                },
                {"type": "SECONDARY", "title": "Overall Survival", "groups": []},
                {"type": "OTHER_PRE_SPECIFIED", "title": "Exploratory Biomarker"}
            ]
        },
        "adverseEventsModule": {
            "timeFrame": "Up to 40 months",
            "eventGroups": [
                {"id": "EG000", "title": "Drug Y", "seriousNumAffected": 20, "seriousNumAtRisk": 150, "otherNumAffected": 120, "otherNumAtRisk": 150},
                {"id": "EG001", "title": "Placebo", "seriousNumAffected": 12, "seriousNumAtRisk": 149, "otherNumAffected": 90, "otherNumAtRisk": 149}
            ],
            "seriousEvents": [{"term": "Pneumonia", "organSystem": "Infections and infestations", "stats": [
                {"groupId": "EG000", "numAffected": 5, "numAtRisk": 150},
                {"groupId": "EG001", "numAffected": 2, "numAtRisk": 149}
            ]}],
            "otherEvents": [{"term": "Nausea", "stats": [
                {"groupId": "EG000", "numAffected": 45, "numAtRisk": 150},
                {"groupId": "EG999", "numAffected": 1, "numAtRisk": 10}
            ]}]
        }
    }
}"#;

fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).expect("write fixture");
}

#[test]
fn reads_native_record() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "NCT01000001.json", NATIVE);

    let source = DirectorySource::new(dir.path()).unwrap();
    let record = source.fetch("nct01000001").unwrap().expect("record");
    assert_eq!(record.title, "Drug X versus Placebo");
    assert_eq!(record.arms.len(), 2);
    assert!(source.fetch("NCT09999999").unwrap().is_none());
}

#[test]
fn maps_clinicaltrials_gov_document() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "nct02000002.json", CTGOV);

    let source = DirectorySource::new(dir.path()).unwrap();
    let record = source.fetch("NCT02000002").unwrap().expect("record");

    assert_eq!(record.phase.as_deref(), Some("Phase 2/Phase 3"));
    assert_eq!(record.sponsor.as_deref(), Some("Example Oncology"));
    assert_eq!(record.enrollment, Some(300));
    assert_eq!(record.completion_date.as_deref(), Some("2022-11"));

    let arms: Vec<(Option<&str>, Option<u64>)> = record
        .arms
        .iter()
        .map(|arm| (arm.title.as_deref(), arm.n))
        .collect();
    assert_eq!(arms, vec![(Some("Drug Y"), Some(150)), (Some("Placebo"), Some(149))]);
    assert_eq!(record.arms[0].arm_type.as_deref(), Some("EXPERIMENTAL"));
    assert_eq!(record.arms[0].intervention.as_deref(), Some("Drug Y"));

    assert_eq!(record.primary_outcomes.len(), 1);
    assert_eq!(record.secondary_outcomes.len(), 1);
    let pfs = &record.primary_outcomes[0];
    assert_eq!(pfs.units.as_deref(), Some("months"));
    assert_eq!(pfs.results[0].arm_title, "Drug Y");
    assert_eq!(pfs.results[0].value.as_deref(), Some("11.2"));
    assert_eq!(pfs.results[0].n, Some(148));
    let analysis = pfs.analysis.as_ref().expect("analysis");
    assert_eq!(analysis.p_value.as_deref(), Some("<0.001"));
    assert_eq!(analysis.estimate_type.as_deref(), Some("Hazard Ratio (HR)"));

    let safety = record.safety.as_ref().expect("safety");
    assert_eq!(safety.arms.len(), 2);
    assert_eq!(safety.serious_events[0].stats.len(), 2);
    // Stats for undeclared event groups are dropped.
    assert_eq!(safety.other_events[0].stats.len(), 1);
}

#[test]
fn mismatched_file_name_is_rejected() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "NCT03000003.json", NATIVE);

    let source = DirectorySource::new(dir.path()).unwrap();
    let err = source.fetch("NCT03000003").unwrap_err();
    assert!(matches!(err, IngestError::IdMismatch { .. }));
}

#[test]
fn malformed_json_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "NCT04000004.json", "{ not json");

    let source = DirectorySource::new(dir.path()).unwrap();
    let err = source.fetch("NCT04000004").unwrap_err();
    assert!(matches!(err, IngestError::Parse { .. }));
    assert!(err.to_string().contains("NCT04000004.json"));
}

#[test]
fn resolve_all_reports_unknown_trials() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "NCT01000001.json", NATIVE);
    write(dir.path(), "NCT02000002.json", CTGOV);
    let source = DirectorySource::new(dir.path()).unwrap();

    let ids = vec!["NCT02000002".to_string(), "NCT01000001".to_string()];
    let records = resolve_all(&source, &ids).unwrap();
    assert_eq!(records[0].nct_id, "NCT02000002");
    assert_eq!(records[1].nct_id, "NCT01000001");

    let ids = vec!["NCT01000001".to_string(), "NCT05000005".to_string()];
    let err = resolve_all(&source, &ids).unwrap_err();
    assert!(matches!(
        err,
        IngestError::Comparison(ComparisonError::UnresolvedTrial { .. })
    ));
    assert_eq!(err.to_string(), "trial NCT05000005 could not be found");
}
