//! Comparison request validation.

use std::collections::BTreeSet;

use trial_model::{ComparisonError, MAX_COMPARED_TRIALS, MIN_COMPARED_TRIALS, Result};

/// A validated list of 2 to 5 distinct trial identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRequest {
    ids: Vec<String>,
}

impl ComparisonRequest {
    /// Parse a comma-separated identifier list such as
    /// `"NCT01234567, nct07654321"`. Empty entries are ignored and
    /// identifiers are upper-cased.
    pub fn parse(raw: &str) -> Result<Self> {
        let ids = raw
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_ascii_uppercase)
            .collect();
        Self::new(ids)
    }

    pub fn new(ids: Vec<String>) -> Result<Self> {
        check_trial_count(ids.len())?;
        let mut seen = BTreeSet::new();
        for id in &ids {
            if !seen.insert(id.to_ascii_uppercase()) {
                return Err(ComparisonError::DuplicateTrial { nct_id: id.clone() });
            }
        }
        Ok(Self { ids })
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Rejects trial sets outside `MIN_COMPARED_TRIALS..=MAX_COMPARED_TRIALS`.
pub fn check_trial_count(count: usize) -> Result<()> {
    if (MIN_COMPARED_TRIALS..=MAX_COMPARED_TRIALS).contains(&count) {
        Ok(())
    } else {
        Err(ComparisonError::TrialCount { count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_ids() {
        let request = ComparisonRequest::parse(" nct01, NCT02 ,,").unwrap();
        assert_eq!(request.ids(), ["NCT01", "NCT02"]);
        assert_eq!(request.len(), 2);
    }

    #[test]
    fn rejects_out_of_range_counts() {
        assert_eq!(
            ComparisonRequest::parse("NCT01"),
            Err(ComparisonError::TrialCount { count: 1 })
        );
        assert_eq!(
            ComparisonRequest::parse("A,B,C,D,E,F"),
            Err(ComparisonError::TrialCount { count: 6 })
        );
        assert_eq!(
            ComparisonRequest::parse(""),
            Err(ComparisonError::TrialCount { count: 0 })
        );
        assert!(ComparisonRequest::parse("A,B,C,D,E").is_ok());
    }

    #[test]
    fn rejects_duplicates() {
        assert_eq!(
            ComparisonRequest::parse("NCT01,nct01"),
            Err(ComparisonError::DuplicateTrial {
                nct_id: "NCT01".to_string()
            })
        );
    }
}
