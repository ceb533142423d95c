//! Raw trial data collaborators.

use std::collections::BTreeMap;

use trial_model::{ComparisonError, RawTrialRecord};

use crate::error::{IngestError, Result};

/// Anything that can look up a raw trial record by NCT identifier.
pub trait TrialSource {
    /// `Ok(None)` means the trial is not known to this source.
    fn fetch(&self, nct_id: &str) -> Result<Option<RawTrialRecord>>;
}

/// Fetch every identifier, in order.
///
/// The first identifier the source does not know fails the whole request
/// with [`ComparisonError::UnresolvedTrial`].
pub fn resolve_all<S: TrialSource + ?Sized>(
    source: &S,
    ids: &[String],
) -> Result<Vec<RawTrialRecord>> {
    ids.iter()
        .map(|id| {
            source.fetch(id)?.ok_or_else(|| {
                tracing::warn!(nct_id = %id, "trial not found");
                IngestError::from(ComparisonError::UnresolvedTrial { nct_id: id.clone() })
            })
        })
        .collect()
}

/// Records held in memory, keyed by upper-cased identifier.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: BTreeMap<String, RawTrialRecord>,
}

impl MemorySource {
    pub fn new(records: impl IntoIterator<Item = RawTrialRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.nct_id.trim().to_ascii_uppercase(), record))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl TrialSource for MemorySource {
    fn fetch(&self, nct_id: &str) -> Result<Option<RawTrialRecord>> {
        Ok(self
            .records
            .get(&nct_id.trim().to_ascii_uppercase())
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(nct_id: &str) -> RawTrialRecord {
        RawTrialRecord {
            nct_id: nct_id.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn resolves_in_request_order() {
        let source = MemorySource::new([record("NCT01"), record("NCT02")]);
        let ids = vec!["nct02".to_string(), "NCT01".to_string()];
        let records = resolve_all(&source, &ids).unwrap();
        let resolved: Vec<&str> = records.iter().map(|r| r.nct_id.as_str()).collect();
        assert_eq!(resolved, vec!["NCT02", "NCT01"]);
    }

    #[test]
    fn unknown_id_fails_the_request() {
        let source = MemorySource::new([record("NCT01")]);
        let ids = vec!["NCT01".to_string(), "NCT09".to_string()];
        let err = resolve_all(&source, &ids).unwrap_err();
        assert!(matches!(
            err,
            IngestError::Comparison(ComparisonError::UnresolvedTrial { ref nct_id }) if nct_id == "NCT09"
        ));
    }
}
