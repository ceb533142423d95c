//! Cross-trial comparison of assembled trial records.
//!
//! Aligns primary endpoints and adverse events across two to five trials
//! of the same intervention class and explains where the trials are not
//! directly comparable.
//!
//! Matching is deliberately conservative. Leaving the same endpoint in two
//! rows is preferred to comparing unrelated endpoints in one; doubtful
//! cases are described in `endpoint_differences` instead of being joined.

pub mod align;
pub mod compare;
pub mod matcher;
pub mod request;
pub mod summary;

pub use align::{
    EndpointGroup, EndpointMember, Exclusion, ExclusionReason, align_events, endpoint_rows,
    group_endpoints,
};
pub use compare::{CompareOptions, DEFAULT_NEAR_MISS_THRESHOLD, compare_trials};
pub use matcher::{
    AlignmentPolicy, MIN_SUBSTRING_MATCH_LEN, TitleMatcher, endpoints_match, event_terms_match,
    normalize_title, title_similarity,
};
pub use request::{ComparisonRequest, check_trial_count};
pub use summary::summarize_differences;
