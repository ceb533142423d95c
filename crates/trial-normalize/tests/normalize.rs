//! Integration tests for outcome and safety normalization.

use proptest::prelude::*;
use trial_model::{
    Arm, DataQualityWarning, EventCategory, OutcomeCategory, RawAnalysis, RawEvent, RawEventStat,
    RawOutcome, RawOutcomeResult, RawSafety, RawSafetyArm,
};
use trial_normalize::{normalize_outcome, normalize_outcomes, normalize_safety};

fn arms(titles: &[&str]) -> Vec<Arm> {
    titles
        .iter()
        .map(|title| Arm {
            title: (*title).to_string(),
            arm_type: None,
            intervention: None,
            n: Some(100),
        })
        .collect()
}

#[test]
fn arm_missing_from_results_is_not_an_error() {
    let arms = arms(&["Drug X 10mg", "Placebo"]);
    let raw = RawOutcome {
        title: Some("Overall Survival".to_string()),
        results: vec![RawOutcomeResult {
            arm_title: "Placebo".to_string(),
            value: Some("14.2".to_string()),
            ..Default::default()
        }],
        ..Default::default()
    };

    let outcome = normalize_outcome(&raw, &arms).expect("titled outcome");
    assert_eq!(outcome.data.results.len(), 1);
    assert_eq!(outcome.data.results[0].arm_title, "Placebo");
    assert!(outcome.warnings.is_empty());
}

#[test]
fn untitled_block_is_skipped_without_aborting() {
    let arms = arms(&["A"]);
    let raws = vec![
        RawOutcome {
            title: None,
            ..Default::default()
        },
        RawOutcome {
            title: Some("Registered, not measured".to_string()),
            ..Default::default()
        },
    ];

    let normalized = normalize_outcomes(&raws, OutcomeCategory::Secondary, &arms);
    assert_eq!(normalized.data.len(), 1);
    assert!(normalized.data[0].results.is_empty());
    assert_eq!(
        normalized.warnings,
        vec![DataQualityWarning::MalformedOutcomeBlock {
            category: OutcomeCategory::Secondary,
            index: 0,
        }]
    );
}

#[test]
fn ci_and_spread_carried_independently() {
    let arms = arms(&["A", "B"]);
    let raw = RawOutcome {
        title: Some("Change in HbA1c".to_string()),
        units: Some("percent".to_string()),
        param_type: Some("LEAST_SQUARES_MEAN".to_string()),
        results: vec![
            RawOutcomeResult {
                arm_title: "A".to_string(),
                value: Some("-1.2".to_string()),
                ci_lower: Some("-1.4".to_string()),
                ci_upper: Some("-1.0".to_string()),
                ..Default::default()
            },
            RawOutcomeResult {
                arm_title: "B".to_string(),
                value: Some("-0.3".to_string()),
                spread: Some("0.9".to_string()),
                ..Default::default()
            },
        ],
        analysis: Some(RawAnalysis {
            p_value: Some("<0.001".to_string()),
            estimate_type: Some("Mean Difference".to_string()),
            estimate_value: Some("-0.9".to_string()),
            ci_pct: Some("95".to_string()),
            ci_lower: Some("-1.1".to_string()),
            ci_upper: Some("-0.7".to_string()),
            method: Some("ANCOVA".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    };

    let outcome = normalize_outcome(&raw, &arms).unwrap().data;
    let a = outcome.result_for("A").unwrap();
    let b = outcome.result_for("B").unwrap();
    assert!(a.ci.is_some() && a.spread.is_none());
    assert!(b.ci.is_none() && b.spread.is_some());

    let analysis = outcome.analysis.as_ref().unwrap();
    assert_eq!(analysis.p_value.as_deref(), Some("<0.001"));
    assert!(analysis.p_value_significant);
    assert_eq!(analysis.ci.as_ref().unwrap().pct.as_deref(), Some("95"));
}

#[test]
fn affected_above_at_risk_is_clamped_and_flagged() {
    let raw = RawSafety {
        other_events: vec![RawEvent {
            term: Some("Neutropenia".to_string()),
            organ_system: Some("Blood and lymphatic system disorders".to_string()),
            stats: vec![RawEventStat {
                arm_title: "Drug X 10mg".to_string(),
                num_affected: Some(12),
                num_at_risk: Some(10),
                rate: None,
            }],
        }],
        ..Default::default()
    };

    let normalized = normalize_safety(&raw);
    let entry = &normalized.data.other_events[0].by_arm[0];
    assert_eq!(entry.num_affected, 10);
    assert_eq!(entry.num_at_risk, 10);
    assert!((entry.rate - 100.0).abs() < 1e-9);
    assert!((normalized.data.other_events[0].overall_rate - 100.0).abs() < 1e-9);
    assert!(normalized.warnings.iter().any(|w| matches!(
        w,
        DataQualityWarning::AffectedExceedsAtRisk {
            num_affected: 12,
            num_at_risk: 10,
            ..
        }
    )));
}

#[test]
fn arm_summary_is_clamped_per_category() {
    let raw = RawSafety {
        arms: vec![RawSafetyArm {
            title: "Placebo".to_string(),
            serious_num_affected: Some(7),
            serious_num_at_risk: Some(5),
            other_num_affected: Some(3),
            other_num_at_risk: Some(5),
        }],
        ..Default::default()
    };

    let normalized = normalize_safety(&raw);
    let summary = &normalized.data.arms[0];
    assert_eq!(summary.serious_num_affected, 5);
    assert_eq!(summary.other_num_affected, 3);
    assert_eq!(normalized.warnings.len(), 1);
    assert!(matches!(
        &normalized.warnings[0],
        DataQualityWarning::AffectedExceedsAtRisk {
            category: EventCategory::Serious,
            event: None,
            ..
        }
    ));
}

fn raw_stat() -> impl Strategy<Value = RawEventStat> {
    (
        prop::sample::select(vec!["A", "B", "C"]),
        proptest::option::of(0u64..500),
        proptest::option::of(0u64..500),
        proptest::option::of(-50.0f64..200.0),
    )
        .prop_map(|(arm, affected, at_risk, rate)| RawEventStat {
            arm_title: arm.to_string(),
            num_affected: affected,
            num_at_risk: at_risk,
            rate,
        })
}

fn raw_event() -> impl Strategy<Value = RawEvent> {
    (
        proptest::option::of("[A-Za-z ]{0,12}"),
        prop::collection::vec(raw_stat(), 0..4),
    )
        .prop_map(|(term, stats)| RawEvent {
            term,
            organ_system: None,
            stats,
        })
}

fn raw_safety_arm() -> impl Strategy<Value = RawSafetyArm> {
    (
        prop::sample::select(vec!["A", "B", "C"]),
        proptest::option::of(0u64..500),
        proptest::option::of(0u64..500),
        proptest::option::of(0u64..500),
        proptest::option::of(0u64..500),
    )
        .prop_map(|(title, sa, sr, oa, or)| RawSafetyArm {
            title: title.to_string(),
            serious_num_affected: sa,
            serious_num_at_risk: sr,
            other_num_affected: oa,
            other_num_at_risk: or,
        })
}

fn raw_safety() -> impl Strategy<Value = RawSafety> {
    (
        prop::collection::vec(raw_safety_arm(), 0..3),
        prop::collection::vec(raw_event(), 0..5),
        prop::collection::vec(raw_event(), 0..5),
    )
        .prop_map(|(arms, serious_events, other_events)| RawSafety {
            time_frame: None,
            arms,
            serious_events,
            other_events,
        })
}

proptest! {
    #[test]
    fn rates_stay_within_bounds(raw in raw_safety()) {
        let safety = normalize_safety(&raw).data;
        for event in safety.serious_events.iter().chain(&safety.other_events) {
            prop_assert!((0.0..=100.0).contains(&event.overall_rate));
            for entry in &event.by_arm {
                prop_assert!((0.0..=100.0).contains(&entry.rate));
                prop_assert!(entry.num_affected <= entry.num_at_risk || entry.num_at_risk == 0);
                if entry.num_at_risk > 0 {
                    let expected = 100.0 * entry.num_affected as f64 / entry.num_at_risk as f64;
                    prop_assert!((entry.rate - expected).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn summaries_never_exceed_at_risk(raw in raw_safety()) {
        let safety = normalize_safety(&raw).data;
        for arm in &safety.arms {
            prop_assert!(arm.serious_num_affected <= arm.serious_num_at_risk);
            prop_assert!(arm.other_num_affected <= arm.other_num_at_risk);
        }
    }

    #[test]
    fn safety_normalization_is_idempotent(raw in raw_safety()) {
        prop_assert_eq!(normalize_safety(&raw), normalize_safety(&raw));
    }

    #[test]
    fn events_are_sorted(raw in raw_safety()) {
        let safety = normalize_safety(&raw).data;
        for events in [&safety.serious_events, &safety.other_events] {
            for pair in events.windows(2) {
                prop_assert!(pair[0].overall_rate >= pair[1].overall_rate);
                if pair[0].overall_rate == pair[1].overall_rate {
                    prop_assert!(pair[0].term <= pair[1].term);
                }
            }
        }
    }
}
