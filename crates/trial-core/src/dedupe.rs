use std::collections::BTreeMap;

use trial_model::{Arm, DataQualityWarning, RawArm};
use trial_normalize::{arm_key, clean_opt};

/// Build the trial's arm list, dropping untitled arms and resolving
/// repeated titles.
///
/// When a title repeats, the entry with the larger `n` wins (a known count
/// beats an unknown one) and takes the position of the first occurrence.
/// Ties keep the first occurrence.
pub fn dedupe_arms(raws: &[RawArm], warnings: &mut Vec<DataQualityWarning>) -> Vec<Arm> {
    let mut arms: Vec<Arm> = Vec::with_capacity(raws.len());
    let mut positions: BTreeMap<String, usize> = BTreeMap::new();

    for (index, raw) in raws.iter().enumerate() {
        let Some(title) = clean_opt(raw.title.as_deref()) else {
            tracing::warn!(index, "skipping arm without title");
            warnings.push(DataQualityWarning::MalformedArm { index });
            continue;
        };
        let candidate = Arm {
            title,
            arm_type: clean_opt(raw.arm_type.as_deref()),
            intervention: clean_opt(raw.intervention.as_deref()),
            n: raw.n,
        };

        let key = arm_key(&candidate.title);
        match positions.get(&key) {
            Some(&position) => {
                let existing = &mut arms[position];
                let replace = candidate.n > existing.n;
                let (kept_n, dropped_n) = if replace {
                    (candidate.n, existing.n)
                } else {
                    (existing.n, candidate.n)
                };
                tracing::warn!(arm = %existing.title, ?kept_n, ?dropped_n, "duplicate arm title");
                warnings.push(DataQualityWarning::DuplicateArm {
                    arm: existing.title.clone(),
                    kept_n,
                    dropped_n,
                });
                if replace {
                    *existing = candidate;
                }
            }
            None => {
                positions.insert(key, arms.len());
                arms.push(candidate);
            }
        }
    }

    arms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: &str, n: Option<u64>) -> RawArm {
        RawArm {
            title: Some(title.to_string()),
            arm_type: None,
            intervention: None,
            n,
        }
    }

    #[test]
    fn larger_n_wins_in_first_position() {
        let mut warnings = Vec::new();
        let arms = dedupe_arms(
            &[
                raw("Drug X", Some(10)),
                raw("Placebo", Some(50)),
                raw("drug x", Some(60)),
            ],
            &mut warnings,
        );

        assert_eq!(arms.len(), 2);
        assert_eq!(arms[0].title, "drug x");
        assert_eq!(arms[0].n, Some(60));
        assert_eq!(arms[1].title, "Placebo");
        assert_eq!(
            warnings,
            vec![DataQualityWarning::DuplicateArm {
                arm: "Drug X".to_string(),
                kept_n: Some(60),
                dropped_n: Some(10),
            }]
        );
    }

    #[test]
    fn known_n_beats_unknown() {
        let mut warnings = Vec::new();
        let arms = dedupe_arms(&[raw("A", None), raw("A", Some(3))], &mut warnings);
        assert_eq!(arms[0].n, Some(3));

        let arms = dedupe_arms(&[raw("A", Some(3)), raw("A", None)], &mut warnings);
        assert_eq!(arms[0].n, Some(3));
    }

    #[test]
    fn tie_keeps_first() {
        let mut warnings = Vec::new();
        let mut second = raw("A", Some(5));
        second.intervention = Some("second".to_string());
        let arms = dedupe_arms(&[raw("A", Some(5)), second], &mut warnings);
        assert_eq!(arms.len(), 1);
        assert!(arms[0].intervention.is_none());
    }

    #[test]
    fn untitled_arm_is_skipped() {
        let mut warnings = Vec::new();
        let arms = dedupe_arms(
            &[
                RawArm {
                    title: Some("   ".to_string()),
                    ..Default::default()
                },
                raw("B", None),
            ],
            &mut warnings,
        );
        assert_eq!(arms.len(), 1);
        assert_eq!(warnings, vec![DataQualityWarning::MalformedArm { index: 0 }]);
    }
}
