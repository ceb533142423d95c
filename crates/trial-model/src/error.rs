use thiserror::Error;

use crate::comparison::{MAX_COMPARED_TRIALS, MIN_COMPARED_TRIALS};

/// A comparison request that cannot be served.
///
/// These are rejected before any alignment work begins; no partial
/// comparison is ever produced for an invalid trial set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComparisonError {
    #[error(
        "comparison requires between {min} and {max} trials, got {count}",
        min = MIN_COMPARED_TRIALS,
        max = MAX_COMPARED_TRIALS
    )]
    TrialCount { count: usize },
    #[error("trial {nct_id} is listed more than once")]
    DuplicateTrial { nct_id: String },
    #[error("trial {nct_id} could not be found")]
    UnresolvedTrial { nct_id: String },
}

pub type Result<T> = std::result::Result<T, ComparisonError>;
