//! ClinicalTrials.gov v2 study documents.
//!
//! Only the parts of the API response needed to build a [`RawTrialRecord`]
//! are modelled. Result groups are referenced by id in the API; they are
//! resolved to group titles here so the record uses arm titles throughout.

use std::collections::BTreeMap;

use serde::Deserialize;
use trial_model::{
    RawAnalysis, RawArm, RawEvent, RawEventStat, RawOutcome, RawOutcomeResult, RawSafety,
    RawSafetyArm, RawTrialRecord,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CtGovStudy {
    #[serde(default)]
    pub protocol_section: Option<ProtocolSection>,
    #[serde(default)]
    pub results_section: Option<ResultsSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolSection {
    #[serde(default)]
    pub identification_module: Option<IdentificationModule>,
    #[serde(default)]
    pub status_module: Option<StatusModule>,
    #[serde(default)]
    pub sponsor_collaborators_module: Option<SponsorModule>,
    #[serde(default)]
    pub design_module: Option<DesignModule>,
    #[serde(default)]
    pub arms_interventions_module: Option<ArmsInterventionsModule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationModule {
    #[serde(default)]
    pub nct_id: Option<String>,
    #[serde(default)]
    pub brief_title: Option<String>,
    #[serde(default)]
    pub official_title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusModule {
    #[serde(default)]
    pub overall_status: Option<String>,
    #[serde(default)]
    pub completion_date_struct: Option<DateStruct>,
    #[serde(default)]
    pub primary_completion_date_struct: Option<DateStruct>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateStruct {
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorModule {
    #[serde(default)]
    pub lead_sponsor: Option<Sponsor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sponsor {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignModule {
    #[serde(default)]
    pub phases: Vec<String>,
    #[serde(default)]
    pub enrollment_info: Option<EnrollmentInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnrollmentInfo {
    #[serde(default)]
    pub count: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmsInterventionsModule {
    #[serde(default)]
    pub arm_groups: Vec<ArmGroup>,
    #[serde(default)]
    pub interventions: Vec<Intervention>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmGroup {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, rename = "type")]
    pub arm_type: Option<String>,
    #[serde(default)]
    pub intervention_names: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intervention {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arm_group_labels: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsSection {
    #[serde(default)]
    pub baseline_characteristics_module: Option<BaselineModule>,
    #[serde(default)]
    pub outcome_measures_module: Option<OutcomeMeasuresModule>,
    #[serde(default)]
    pub adverse_events_module: Option<AdverseEventsModule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultGroup {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Denom {
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub counts: Vec<DenomCount>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DenomCount {
    #[serde(default)]
    pub group_id: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BaselineModule {
    #[serde(default)]
    pub groups: Vec<ResultGroup>,
    #[serde(default)]
    pub denoms: Vec<Denom>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeMeasuresModule {
    #[serde(default)]
    pub outcome_measures: Vec<OutcomeMeasure>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeMeasure {
    #[serde(default, rename = "type")]
    pub measure_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub param_type: Option<String>,
    #[serde(default)]
    pub unit_of_measure: Option<String>,
    #[serde(default)]
    pub time_frame: Option<String>,
    #[serde(default)]
    pub groups: Vec<ResultGroup>,
    #[serde(default)]
    pub denoms: Vec<Denom>,
    #[serde(default)]
    pub classes: Vec<MeasureClass>,
    #[serde(default)]
    pub analyses: Vec<MeasureAnalysis>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeasureClass {
    #[serde(default)]
    pub categories: Vec<MeasureCategory>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeasureCategory {
    #[serde(default)]
    pub measurements: Vec<Measurement>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    #[serde(default)]
    pub group_id: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub spread: Option<String>,
    #[serde(default)]
    pub lower_limit: Option<String>,
    #[serde(default)]
    pub upper_limit: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureAnalysis {
    #[serde(default)]
    pub p_value: Option<String>,
    #[serde(default)]
    pub statistical_method: Option<String>,
    #[serde(default)]
    pub param_type: Option<String>,
    #[serde(default)]
    pub param_value: Option<String>,
    #[serde(default)]
    pub ci_pct_value: Option<String>,
    #[serde(default)]
    pub ci_lower_limit: Option<String>,
    #[serde(default)]
    pub ci_upper_limit: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdverseEventsModule {
    #[serde(default)]
    pub time_frame: Option<String>,
    #[serde(default)]
    pub event_groups: Vec<EventGroup>,
    #[serde(default)]
    pub serious_events: Vec<AdverseEventEntry>,
    #[serde(default)]
    pub other_events: Vec<AdverseEventEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventGroup {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub serious_num_affected: Option<u64>,
    #[serde(default)]
    pub serious_num_at_risk: Option<u64>,
    #[serde(default)]
    pub other_num_affected: Option<u64>,
    #[serde(default)]
    pub other_num_at_risk: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdverseEventEntry {
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub organ_system: Option<String>,
    #[serde(default)]
    pub stats: Vec<EventStat>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStat {
    #[serde(default)]
    pub group_id: String,
    #[serde(default)]
    pub num_affected: Option<u64>,
    #[serde(default)]
    pub num_at_risk: Option<u64>,
}

/// Render API phase codes such as `PHASE2` as `Phase 2`, joined with `/`.
pub fn format_phases(phases: &[String]) -> Option<String> {
    let rendered: Vec<String> = phases
        .iter()
        .map(|phase| phase.trim())
        .filter(|phase| !phase.is_empty() && !phase.eq_ignore_ascii_case("NA"))
        .map(|phase| match phase.to_ascii_uppercase().as_str() {
            "EARLY_PHASE1" => "Early Phase 1".to_string(),
            code => match code.strip_prefix("PHASE") {
                Some(number) => format!("Phase {number}"),
                None => phase.to_string(),
            },
        })
        .collect();
    (!rendered.is_empty()).then(|| rendered.join("/"))
}

/// Map a v2 study document onto a raw trial record.
pub fn to_raw_record(study: &CtGovStudy) -> RawTrialRecord {
    let protocol = study.protocol_section.as_ref();
    let identification = protocol.and_then(|p| p.identification_module.as_ref());
    let status = protocol.and_then(|p| p.status_module.as_ref());
    let design = protocol.and_then(|p| p.design_module.as_ref());
    let results = study.results_section.as_ref();

    let completion_date = status
        .and_then(|m| {
            m.completion_date_struct
                .as_ref()
                .or(m.primary_completion_date_struct.as_ref())
        })
        .and_then(|d| d.date.clone());

    let (primary_outcomes, secondary_outcomes) = results
        .and_then(|r| r.outcome_measures_module.as_ref())
        .map(extract_outcomes)
        .unwrap_or_default();

    RawTrialRecord {
        nct_id: identification
            .and_then(|m| m.nct_id.clone())
            .unwrap_or_default(),
        title: identification
            .and_then(|m| m.brief_title.clone().or_else(|| m.official_title.clone()))
            .unwrap_or_default(),
        phase: design.and_then(|m| format_phases(&m.phases)),
        status: status
            .and_then(|m| m.overall_status.clone())
            .unwrap_or_default(),
        sponsor: protocol
            .and_then(|p| p.sponsor_collaborators_module.as_ref())
            .and_then(|m| m.lead_sponsor.as_ref())
            .and_then(|s| s.name.clone()),
        enrollment: design
            .and_then(|m| m.enrollment_info.as_ref())
            .and_then(|e| e.count),
        completion_date,
        arms: extract_arms(
            protocol.and_then(|p| p.arms_interventions_module.as_ref()),
            results.and_then(|r| r.baseline_characteristics_module.as_ref()),
        ),
        primary_outcomes,
        secondary_outcomes,
        safety: results
            .and_then(|r| r.adverse_events_module.as_ref())
            .map(extract_safety),
    }
}

/// Arms come from the baseline groups when results are posted, since those
/// titles are what outcome and safety tables refer to. Registered arm
/// groups supply type and intervention where labels agree.
fn extract_arms(
    registered: Option<&ArmsInterventionsModule>,
    baseline: Option<&BaselineModule>,
) -> Vec<RawArm> {
    let registered_arm = |title: &str| {
        registered.and_then(|m| {
            m.arm_groups.iter().find(|g| {
                g.label
                    .as_deref()
                    .is_some_and(|label| label.trim().eq_ignore_ascii_case(title.trim()))
            })
        })
    };
    let interventions = |group: &ArmGroup| -> Option<String> {
        let mut names: Vec<String> = group
            .intervention_names
            .iter()
            .map(|name| strip_intervention_kind(name).to_string())
            .collect();
        if names.is_empty() {
            if let (Some(module), Some(label)) = (registered, group.label.as_deref()) {
                names = module
                    .interventions
                    .iter()
                    .filter(|i| i.arm_group_labels.iter().any(|l| l == label))
                    .filter_map(|i| i.name.clone())
                    .collect();
            }
        }
        (!names.is_empty()).then(|| names.join(", "))
    };

    if let Some(baseline) = baseline.filter(|b| !b.groups.is_empty()) {
        let counts = denom_counts(&baseline.denoms);
        return baseline
            .groups
            .iter()
            .filter(|group| {
                !group
                    .title
                    .as_deref()
                    .is_some_and(|t| t.trim().eq_ignore_ascii_case("total"))
            })
            .map(|group| {
                let arm_group = group.title.as_deref().and_then(registered_arm);
                RawArm {
                    title: group.title.clone(),
                    arm_type: arm_group.and_then(|g| g.arm_type.clone()),
                    intervention: arm_group.and_then(interventions),
                    n: counts.get(group.id.as_str()).copied(),
                }
            })
            .collect();
    }

    registered
        .map(|m| {
            m.arm_groups
                .iter()
                .map(|group| RawArm {
                    title: group.label.clone(),
                    arm_type: group.arm_type.clone(),
                    intervention: interventions(group),
                    n: None,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// "Drug: Pembrolizumab" -> "Pembrolizumab".
fn strip_intervention_kind(name: &str) -> &str {
    name.split_once(": ").map_or(name, |(_, rest)| rest).trim()
}

fn denom_counts(denoms: &[Denom]) -> BTreeMap<&str, u64> {
    let Some(denom) = denoms
        .iter()
        .find(|d| {
            d.units
                .as_deref()
                .is_none_or(|u| u.eq_ignore_ascii_case("participants"))
        })
        .or(denoms.first())
    else {
        return BTreeMap::new();
    };
    denom
        .counts
        .iter()
        .filter_map(|count| {
            let value = count.value.as_deref()?.trim().parse().ok()?;
            Some((count.group_id.as_str(), value))
        })
        .collect()
}

fn group_titles(groups: &[ResultGroup]) -> BTreeMap<&str, &str> {
    groups
        .iter()
        .filter_map(|g| Some((g.id.as_str(), g.title.as_deref()?)))
        .collect()
}

fn extract_outcomes(module: &OutcomeMeasuresModule) -> (Vec<RawOutcome>, Vec<RawOutcome>) {
    let mut primary = Vec::new();
    let mut secondary = Vec::new();
    for measure in &module.outcome_measures {
        match measure.measure_type.as_deref() {
            Some("PRIMARY") => primary.push(extract_outcome(measure)),
            Some("SECONDARY") => secondary.push(extract_outcome(measure)),
            other => tracing::debug!(kind = ?other, "skipping outcome measure"),
        }
    }
    (primary, secondary)
}

/// Uses the first class and category; stratified measurements beyond that
/// are not represented in the raw record.
fn extract_outcome(measure: &OutcomeMeasure) -> RawOutcome {
    let titles = group_titles(&measure.groups);
    let counts = denom_counts(&measure.denoms);
    let measurements = measure
        .classes
        .first()
        .and_then(|c| c.categories.first())
        .map(|c| c.measurements.as_slice())
        .unwrap_or_default();

    let results = measurements
        .iter()
        .filter_map(|m| {
            let Some(arm_title) = titles.get(m.group_id.as_str()) else {
                tracing::debug!(group_id = %m.group_id, "measurement for unknown group");
                return None;
            };
            Some(RawOutcomeResult {
                arm_title: (*arm_title).to_string(),
                value: m.value.clone(),
                ci_lower: m.lower_limit.clone(),
                ci_upper: m.upper_limit.clone(),
                spread: m.spread.clone(),
                n: counts.get(m.group_id.as_str()).copied(),
            })
        })
        .collect();

    RawOutcome {
        title: measure.title.clone(),
        time_frame: measure.time_frame.clone(),
        param_type: measure.param_type.clone(),
        description: measure.description.clone(),
        units: measure.unit_of_measure.clone(),
        results,
        analysis: measure.analyses.first().map(|a| RawAnalysis {
            p_value: a.p_value.clone(),
            significant: None,
            estimate_type: a.param_type.clone(),
            estimate_value: a.param_value.clone(),
            ci_pct: a.ci_pct_value.clone(),
            ci_lower: a.ci_lower_limit.clone(),
            ci_upper: a.ci_upper_limit.clone(),
            method: a.statistical_method.clone(),
        }),
    }
}

fn extract_safety(module: &AdverseEventsModule) -> RawSafety {
    let titles: BTreeMap<&str, &str> = module
        .event_groups
        .iter()
        .filter_map(|g| Some((g.id.as_str(), g.title.as_deref()?)))
        .collect();
    let events = |entries: &[AdverseEventEntry]| -> Vec<RawEvent> {
        entries
            .iter()
            .map(|entry| RawEvent {
                term: entry.term.clone(),
                organ_system: entry.organ_system.clone(),
                stats: entry
                    .stats
                    .iter()
                    .filter_map(|stat| {
                        Some(RawEventStat {
                            arm_title: (*titles.get(stat.group_id.as_str())?).to_string(),
                            num_affected: stat.num_affected,
                            num_at_risk: stat.num_at_risk,
                            rate: None,
                        })
                    })
                    .collect(),
            })
            .collect()
    };

    RawSafety {
        time_frame: module.time_frame.clone(),
        arms: module
            .event_groups
            .iter()
            .filter_map(|group| {
                Some(RawSafetyArm {
                    title: group.title.clone()?,
                    serious_num_affected: group.serious_num_affected,
                    serious_num_at_risk: group.serious_num_at_risk,
                    other_num_affected: group.other_num_affected,
                    other_num_at_risk: group.other_num_at_risk,
                })
            })
            .collect(),
        serious_events: events(&module.serious_events),
        other_events: events(&module.other_events),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_are_rendered_for_display() {
        let phases = |codes: &[&str]| {
            format_phases(&codes.iter().map(|c| (*c).to_string()).collect::<Vec<_>>())
        };
        assert_eq!(phases(&["PHASE2", "PHASE3"]).as_deref(), Some("Phase 2/Phase 3"));
        assert_eq!(phases(&["EARLY_PHASE1"]).as_deref(), Some("Early Phase 1"));
        assert_eq!(phases(&["NA"]), None);
        assert_eq!(phases(&[]), None);
    }

    #[test]
    fn intervention_kind_is_stripped() {
        assert_eq!(strip_intervention_kind("Drug: Pembrolizumab"), "Pembrolizumab");
        assert_eq!(strip_intervention_kind("Placebo"), "Placebo");
    }

    #[test]
    fn registered_arms_used_without_results() {
        let study: CtGovStudy = serde_json::from_str(
            r#"{
                "protocolSection": {
                    "identificationModule": {"nctId": "NCT05000005", "briefTitle": "Registered"},
                    "statusModule": {"overallStatus": "RECRUITING"},
                    "armsInterventionsModule": {
                        "armGroups": [
                            {"label": "Drug X", "type": "EXPERIMENTAL", "interventionNames": ["Drug: Drug X"]},
                            {"label": "Placebo", "type": "PLACEBO_COMPARATOR"}
                        ],
                        "interventions": [{"name": "Matching placebo", "armGroupLabels": ["Placebo"]}]
                    }
                }
            }"#,
        )
        .unwrap();

        let raw = to_raw_record(&study);
        assert_eq!(raw.nct_id, "NCT05000005");
        assert_eq!(raw.arms.len(), 2);
        assert_eq!(raw.arms[0].intervention.as_deref(), Some("Drug X"));
        assert_eq!(raw.arms[1].intervention.as_deref(), Some("Matching placebo"));
        assert!(raw.primary_outcomes.is_empty());
        assert!(raw.safety.is_none());
    }
}
