//! Clinical trial result normalization.
//!
//! Turns raw, registry-shaped outcome blocks and adverse-event tables into
//! the uniform types of `trial-model`.
//!
//! # Overview
//!
//! - **Outcomes**: one [`FormattedOutcome`](trial_model::FormattedOutcome)
//!   per titled raw block, results ordered by arm declaration order,
//!   significance derived from the reported p-value.
//! - **Safety**: per-arm summaries clamped to their at-risk counts,
//!   per-event rates recomputed from counts, population-weighted overall
//!   rates, deterministic ordering.
//!
//! All functions are pure. Recoverable problems are returned as
//! [`DataQualityWarning`](trial_model::DataQualityWarning)s alongside the
//! result, never as errors.

pub mod outcome;
pub mod p_value;
pub mod safety;
pub mod text;

pub use outcome::{normalize_outcome, normalize_outcomes};
pub use p_value::{PValue, Relation, SIGNIFICANCE_THRESHOLD, is_significant, parse_p_value};
pub use safety::{event_rate, normalize_safety};
pub use text::{arm_key, clean_opt};
