//! Endpoint and adverse-event alignment.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use trial_model::{
    EndpointRow, EndpointValue, EventCategory, EventRate, FormattedOutcome, FullTrialData,
    SafetyHighlight,
};

use crate::matcher::TitleMatcher;

/// Position of one primary outcome: `trials[trial].primary_outcomes[outcome]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EndpointMember {
    pub trial: usize,
    pub outcome: usize,
}

/// Why an outcome was kept out of the outcomes it matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    /// It matches outcomes from two other trials that do not match each other.
    Bridge,
    /// It matches some outcomes of a group but not every one from the other trials.
    Partial,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusion {
    pub reason: ExclusionReason,
    /// Outcomes from other trials it matched, in input order.
    pub matched: Vec<EndpointMember>,
}

/// Primary outcomes considered the same endpoint.
///
/// Members are sorted by trial input order, then outcome declaration order.
/// Every member matches every member from the other trials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointGroup {
    pub members: Vec<EndpointMember>,
    /// Set on the single-member group of an outcome left unaligned because
    /// joining it would put non-matching outcomes in one group.
    pub exclusion: Option<Exclusion>,
}

impl EndpointGroup {
    /// Distinct trials contributing to this group, in input order.
    pub fn trials(&self) -> Vec<usize> {
        let mut trials: Vec<usize> = self.members.iter().map(|m| m.trial).collect();
        trials.dedup();
        trials
    }

    /// More than one trial reports this endpoint.
    pub fn is_aligned(&self) -> bool {
        self.trials().len() > 1
    }

    /// The outcome a trial is compared with: its first in declaration order.
    pub fn representative(&self, trial: usize) -> Option<EndpointMember> {
        self.members.iter().copied().find(|m| m.trial == trial)
    }

    /// Trials contributing more than one outcome to this group.
    pub fn ambiguous_trials(&self) -> Vec<usize> {
        self.trials()
            .into_iter()
            .filter(|trial| self.members.iter().filter(|m| m.trial == *trial).count() > 1)
            .collect()
    }

    pub fn outcome<'a>(
        &self,
        trials: &'a [FullTrialData],
        member: EndpointMember,
    ) -> &'a FormattedOutcome {
        &trials[member.trial].primary_outcomes[member.outcome]
    }

    /// Shortest member title, ties broken lexicographically, so the label
    /// does not depend on the order trials were supplied in.
    pub fn label(&self, trials: &[FullTrialData]) -> String {
        self.members
            .iter()
            .map(|m| self.outcome(trials, *m).title.as_str())
            .min_by(|a, b| {
                a.chars()
                    .count()
                    .cmp(&b.chars().count())
                    .then_with(|| a.cmp(b))
            })
            .unwrap_or_default()
            .to_string()
    }
}

/// Group primary outcomes across trials.
///
/// Starts from the connected components of `matcher` applied to every pair
/// of outcomes from different trials. A component in which some
/// cross-trial pair does not match is split: outcomes bridging two
/// non-matching outcomes are set aside first, and only when there are none
/// are the outcomes lacking a match set aside. This repeats until every
/// group is consistent. Each rule depends only on the set of outcomes, so
/// membership does not depend on input order.
///
/// Outcomes matching nothing form single-member groups. Groups are ordered
/// by the input position of their first member.
pub fn group_endpoints(trials: &[FullTrialData], matcher: TitleMatcher) -> Vec<EndpointGroup> {
    let nodes: Vec<EndpointMember> = trials
        .iter()
        .enumerate()
        .flat_map(|(trial, data)| {
            (0..data.primary_outcomes.len()).map(move |outcome| EndpointMember { trial, outcome })
        })
        .collect();
    let matches: Vec<Vec<bool>> = nodes
        .iter()
        .map(|a| {
            nodes
                .iter()
                .map(|b| a.trial != b.trial && matcher(title(trials, a), title(trials, b)))
                .collect()
        })
        .collect();

    let mut active = vec![true; nodes.len()];
    let mut excluded: Vec<EndpointGroup> = Vec::new();
    let components = loop {
        let components = connected_components(&matches, &active);
        let mut changed = false;
        for component in &components {
            for (index, reason) in inconsistent_members(component, &nodes, &matches) {
                let matched: Vec<EndpointMember> = component
                    .iter()
                    .filter(|&&other| matches[index][other])
                    .map(|&other| nodes[other])
                    .collect();
                tracing::debug!(
                    outcome = title(trials, &nodes[index]),
                    ?reason,
                    matched = matched.len(),
                    "outcome left unaligned"
                );
                active[index] = false;
                excluded.push(EndpointGroup {
                    members: vec![nodes[index]],
                    exclusion: Some(Exclusion { reason, matched }),
                });
                changed = true;
            }
        }
        if !changed {
            break components;
        }
    };

    let mut groups: Vec<EndpointGroup> = components
        .into_iter()
        .map(|component| EndpointGroup {
            members: component.into_iter().map(|index| nodes[index]).collect(),
            exclusion: None,
        })
        .chain(excluded)
        .collect();
    groups.sort_by(|a, b| a.members.first().cmp(&b.members.first()));

    tracing::debug!(
        outcome_count = nodes.len(),
        group_count = groups.len(),
        aligned = groups.iter().filter(|g| g.is_aligned()).count(),
        unaligned = groups.iter().filter(|g| g.exclusion.is_some()).count(),
        "endpoints grouped"
    );
    groups
}

fn title<'a>(trials: &'a [FullTrialData], member: &EndpointMember) -> &'a str {
    &trials[member.trial].primary_outcomes[member.outcome].title
}

/// Connected components of the active nodes, each in ascending node order,
/// ordered by their first node.
fn connected_components(matches: &[Vec<bool>], active: &[bool]) -> Vec<Vec<usize>> {
    let mut components = DisjointSet::new(matches.len());
    for (i, row) in matches.iter().enumerate() {
        for (j, &matched) in row.iter().enumerate().skip(i + 1) {
            if matched && active[i] && active[j] {
                components.union(i, j);
            }
        }
    }

    let mut grouped: Vec<(usize, Vec<usize>)> = Vec::new();
    for index in (0..matches.len()).filter(|&index| active[index]) {
        let root = components.find(index);
        match grouped.iter_mut().find(|(r, _)| *r == root) {
            Some((_, members)) => members.push(index),
            None => grouped.push((root, vec![index])),
        }
    }
    grouped.into_iter().map(|(_, members)| members).collect()
}

/// Members to set aside so the component can split; empty when every
/// cross-trial pair already matches.
fn inconsistent_members(
    component: &[usize],
    nodes: &[EndpointMember],
    matches: &[Vec<bool>],
) -> Vec<(usize, ExclusionReason)> {
    let cross = |a: usize, b: usize| nodes[a].trial != nodes[b].trial;
    let conflict = |a: usize, b: usize| cross(a, b) && !matches[a][b];

    if !component
        .iter()
        .any(|&a| component.iter().any(|&b| conflict(a, b)))
    {
        return Vec::new();
    }

    let bridges: Vec<(usize, ExclusionReason)> = component
        .iter()
        .copied()
        .filter(|&m| {
            component.iter().any(|&x| {
                matches[m][x] && component.iter().any(|&y| matches[m][y] && conflict(x, y))
            })
        })
        .map(|m| (m, ExclusionReason::Bridge))
        .collect();
    if !bridges.is_empty() {
        return bridges;
    }

    component
        .iter()
        .copied()
        .filter(|&a| component.iter().any(|&b| conflict(a, b)))
        .map(|a| (a, ExclusionReason::Partial))
        .collect()
}

/// One row per group. Each trial contributes its representative outcome's
/// first result; trials whose outcome has no results are left out, and
/// groups with nothing to show produce no row.
pub fn endpoint_rows(trials: &[FullTrialData], groups: &[EndpointGroup]) -> Vec<EndpointRow> {
    groups
        .iter()
        .filter_map(|group| {
            let by_trial: Vec<EndpointValue> = group
                .trials()
                .into_iter()
                .filter_map(|trial| {
                    let member = group.representative(trial)?;
                    endpoint_value(&trials[trial], group.outcome(trials, member))
                })
                .collect();
            (!by_trial.is_empty()).then(|| EndpointRow {
                endpoint: group.label(trials),
                by_trial,
            })
        })
        .collect()
}

fn endpoint_value(trial: &FullTrialData, outcome: &FormattedOutcome) -> Option<EndpointValue> {
    let first = outcome.first_result()?;
    Some(EndpointValue {
        nct_id: trial.nct_id.clone(),
        value: first.value.clone(),
        arm: first.arm_title.clone(),
        units: outcome.units.clone(),
        p_value: outcome.p_value().map(ToString::to_string),
        significant: outcome.analysis.as_ref().map(|a| a.p_value_significant),
    })
}

struct EventGroup {
    terms: Vec<String>,
    rates: Vec<(usize, f64)>,
}

/// Adverse events reported by at least `min_trials` trials, per category.
///
/// Each trial contributes at most one event per row: the first matching
/// event in its rate-ordered list.
pub fn align_events(
    trials: &[FullTrialData],
    matcher: TitleMatcher,
    min_trials: usize,
) -> Vec<SafetyHighlight> {
    let mut highlights = Vec::new();
    for category in [EventCategory::Serious, EventCategory::Other] {
        let mut groups: Vec<EventGroup> = Vec::new();
        for (trial, data) in trials.iter().enumerate() {
            let Some(safety) = data.safety.as_ref() else {
                continue;
            };
            for event in safety.events(category) {
                match groups.iter_mut().find(|g| matcher(&g.terms[0], &event.term)) {
                    Some(group) => {
                        if group.rates.iter().any(|(t, _)| *t == trial) {
                            continue;
                        }
                        group.terms.push(event.term.clone());
                        group.rates.push((trial, event.overall_rate));
                    }
                    None => groups.push(EventGroup {
                        terms: vec![event.term.clone()],
                        rates: vec![(trial, event.overall_rate)],
                    }),
                }
            }
        }

        highlights.extend(
            groups
                .into_iter()
                .filter(|group| group.rates.len() >= min_trials)
                .map(|group| SafetyHighlight {
                    event: group.terms.iter().min().cloned().unwrap_or_default(),
                    category,
                    by_trial: group
                        .rates
                        .iter()
                        .map(|(trial, rate)| EventRate {
                            nct_id: trials[*trial].nct_id.clone(),
                            rate: *rate,
                        })
                        .collect(),
                }),
        );
    }

    highlights.sort_by(compare_highlights);
    highlights
}

fn compare_highlights(a: &SafetyHighlight, b: &SafetyHighlight) -> Ordering {
    b.by_trial
        .len()
        .cmp(&a.by_trial.len())
        .then_with(|| max_rate(b).total_cmp(&max_rate(a)))
        .then_with(|| a.category.cmp(&b.category))
        .then_with(|| a.event.cmp(&b.event))
}

fn max_rate(highlight: &SafetyHighlight) -> f64 {
    highlight
        .by_trial
        .iter()
        .map(|r| r.rate)
        .fold(0.0, f64::max)
}

/// Union-find over outcome indices.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut node: usize) -> usize {
        while self.parent[node] != node {
            self.parent[node] = self.parent[self.parent[node]];
            node = self.parent[node];
        }
        node
    }

    fn union(&mut self, a: usize, b: usize) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a != root_b {
            let (low, high) = if root_a < root_b {
                (root_a, root_b)
            } else {
                (root_b, root_a)
            };
            self.parent[high] = low;
        }
    }
}

/// Trials that share at least one aligned endpoint with another trial.
pub(crate) fn aligned_trials(groups: &[EndpointGroup]) -> BTreeSet<usize> {
    groups
        .iter()
        .filter(|group| group.is_aligned())
        .flat_map(EndpointGroup::trials)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{endpoints_match, event_terms_match};
    use trial_model::{AdverseEvent, FormattedSafety, OutcomeResult};

    fn outcome(title: &str, value: Option<&str>) -> FormattedOutcome {
        FormattedOutcome {
            title: title.to_string(),
            time_frame: None,
            param_type: None,
            description: None,
            units: None,
            results: value
                .map(|v| {
                    vec![OutcomeResult {
                        arm_title: "Arm A".to_string(),
                        value: v.to_string(),
                        ci: None,
                        spread: None,
                        n: None,
                    }]
                })
                .unwrap_or_default(),
            analysis: None,
        }
    }

    fn trial(nct_id: &str, outcomes: Vec<FormattedOutcome>) -> FullTrialData {
        FullTrialData {
            nct_id: nct_id.to_string(),
            title: nct_id.to_string(),
            phase: None,
            status: "COMPLETED".to_string(),
            sponsor: None,
            enrollment: None,
            completion_date: None,
            arms: vec![],
            primary_outcomes: outcomes,
            secondary_outcomes: vec![],
            safety: None,
            has_results: true,
        }
    }

    fn with_events(mut trial: FullTrialData, events: &[(&str, f64)]) -> FullTrialData {
        trial.safety = Some(FormattedSafety {
            time_frame: None,
            arms: vec![],
            serious_events: vec![],
            other_events: events
                .iter()
                .map(|(term, rate)| AdverseEvent {
                    term: (*term).to_string(),
                    organ_system: None,
                    by_arm: vec![],
                    overall_rate: *rate,
                })
                .collect(),
        });
        trial
    }

    #[test]
    fn matching_outcomes_are_grouped() {
        let trials = vec![
            trial("A", vec![outcome("Overall Survival", Some("1"))]),
            trial("B", vec![outcome("Overall survival (OS) at 5 years", Some("2"))]),
            trial("C", vec![outcome("Quality of Life", Some("3"))]),
        ];

        let groups = group_endpoints(&trials, endpoints_match);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].trials(), vec![0, 1]);
        assert!(groups[0].is_aligned());
        assert!(!groups[1].is_aligned());
        assert_eq!(groups[0].label(&trials), "Overall Survival");
    }

    #[test]
    fn bridging_outcome_is_left_out() {
        let trials = vec![
            trial("A", vec![outcome("Progression-Free Survival", Some("9.8"))]),
            trial(
                "B",
                vec![outcome("Progression-Free Survival and Overall Survival", Some("1"))],
            ),
            trial("C", vec![outcome("Overall Survival", Some("20.1"))]),
            trial("D", vec![outcome("Progression-Free Survival", Some("8.1"))]),
        ];

        let groups = group_endpoints(&trials, endpoints_match);
        let members: Vec<Vec<usize>> = groups.iter().map(EndpointGroup::trials).collect();
        assert_eq!(members, vec![vec![0, 3], vec![1], vec![2]]);

        let exclusion = groups[1].exclusion.as_ref().unwrap();
        assert_eq!(exclusion.reason, ExclusionReason::Bridge);
        let matched: Vec<usize> = exclusion.matched.iter().map(|m| m.trial).collect();
        assert_eq!(matched, vec![0, 2, 3]);
        assert!(groups[0].exclusion.is_none());
        assert!(groups[2].exclusion.is_none());
    }

    fn letters_match(a: &str, b: &str) -> bool {
        matches!(
            (a, b),
            ("a", "b") | ("b", "a") | ("b", "c") | ("c", "b") | ("c", "d") | ("d", "c")
        )
    }

    #[test]
    fn partial_matches_are_left_out_when_nothing_bridges() {
        // a-b, b-c and c-d match, a-d does not; a and c share a trial.
        let trials = vec![
            trial("A", vec![outcome("a", Some("1")), outcome("c", Some("3"))]),
            trial("B", vec![outcome("b", Some("2")), outcome("d", Some("4"))]),
        ];

        let groups = group_endpoints(&trials, letters_match);
        let members: Vec<Vec<EndpointMember>> =
            groups.iter().map(|g| g.members.clone()).collect();
        assert_eq!(
            members,
            vec![
                vec![EndpointMember { trial: 0, outcome: 0 }],
                vec![
                    EndpointMember { trial: 0, outcome: 1 },
                    EndpointMember { trial: 1, outcome: 0 },
                ],
                vec![EndpointMember { trial: 1, outcome: 1 }],
            ]
        );
        let reasons: Vec<Option<ExclusionReason>> = groups
            .iter()
            .map(|g| g.exclusion.as_ref().map(|e| e.reason))
            .collect();
        assert_eq!(
            reasons,
            vec![
                Some(ExclusionReason::Partial),
                None,
                Some(ExclusionReason::Partial),
            ]
        );
    }

    #[test]
    fn same_trial_outcomes_are_not_joined_directly() {
        let trials = vec![
            trial(
                "A",
                vec![
                    outcome("Progression-Free Survival", Some("1")),
                    outcome("Progression-Free Survival by BICR", Some("2")),
                ],
            ),
            trial("B", vec![outcome("Response Rate", Some("3"))]),
        ];

        let groups = group_endpoints(&trials, endpoints_match);
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn representative_is_first_declared_outcome() {
        let trials = vec![
            trial(
                "A",
                vec![
                    outcome("Overall Survival", Some("10")),
                    outcome("Overall Survival Rate", Some("20")),
                ],
            ),
            trial("B", vec![outcome("Overall Survival", Some("30"))]),
        ];

        let groups = group_endpoints(&trials, endpoints_match);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].ambiguous_trials(), vec![0]);

        let rows = endpoint_rows(&trials, &groups);
        assert_eq!(rows[0].value_for("A").unwrap().value, "10");
        assert_eq!(rows[0].value_for("B").unwrap().value, "30");
    }

    #[test]
    fn trials_without_values_are_absent() {
        let trials = vec![
            trial("A", vec![outcome("Overall Survival", Some("10"))]),
            trial("B", vec![outcome("Overall Survival", None)]),
        ];

        let groups = group_endpoints(&trials, endpoints_match);
        let rows = endpoint_rows(&trials, &groups);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].trial_ids(), vec!["A"]);
        assert!(rows[0].value_for("B").is_none());
    }

    #[test]
    fn events_need_two_trials() {
        let trials = vec![
            with_events(trial("A", vec![]), &[("Nausea", 20.0), ("Rash", 5.0)]),
            with_events(trial("B", vec![]), &[("nausea", 30.0), ("Alopecia", 40.0)]),
        ];

        let highlights = align_events(&trials, event_terms_match, 2);
        assert_eq!(highlights.len(), 1);
        assert_eq!(highlights[0].event, "Nausea");
        assert_eq!(highlights[0].category, EventCategory::Other);
        assert_eq!(highlights[0].rate_for("A"), Some(20.0));
        assert_eq!(highlights[0].rate_for("B"), Some(30.0));
    }

    #[test]
    fn highlights_ordered_by_coverage_then_rate() {
        let trials = vec![
            with_events(trial("A", vec![]), &[("Fatigue", 10.0), ("Nausea", 20.0)]),
            with_events(trial("B", vec![]), &[("Fatigue", 12.0), ("Nausea", 25.0)]),
            with_events(trial("C", vec![]), &[("Fatigue", 8.0)]),
        ];

        let highlights = align_events(&trials, event_terms_match, 2);
        let events: Vec<&str> = highlights.iter().map(|h| h.event.as_str()).collect();
        assert_eq!(events, vec!["Fatigue", "Nausea"]);
    }
}
