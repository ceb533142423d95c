//! Title matchers used for alignment.
//!
//! Matchers are plain `fn(&str, &str) -> bool` so a policy can be swapped
//! without touching the aligner.

use rapidfuzz::distance::jaro_winkler;

/// Signature shared by endpoint and adverse-event matchers.
pub type TitleMatcher = fn(&str, &str) -> bool;

/// Shortest normalized title that may match as a substring of another.
pub const MIN_SUBSTRING_MATCH_LEN: usize = 8;

/// Matching policy for one comparison.
#[derive(Debug, Clone, Copy)]
pub struct AlignmentPolicy {
    pub endpoints: TitleMatcher,
    pub events: TitleMatcher,
}

impl Default for AlignmentPolicy {
    fn default() -> Self {
        Self {
            endpoints: endpoints_match,
            events: event_terms_match,
        }
    }
}

/// Lowercase, collapse whitespace, strip trailing punctuation.
pub fn normalize_title(raw: &str) -> String {
    let collapsed = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    collapsed
        .trim_end_matches(|c: char| c.is_ascii_punctuation() && !matches!(c, ')' | ']' | '%'))
        .trim_end()
        .to_string()
}

/// Same endpoint when normalized titles are equal, or when one contains
/// the other and the contained title is at least
/// [`MIN_SUBSTRING_MATCH_LEN`] characters long.
pub fn endpoints_match(a: &str, b: &str) -> bool {
    let a = normalize_title(a);
    let b = normalize_title(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }
    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (&a, &b)
    } else {
        (&b, &a)
    };
    shorter.chars().count() >= MIN_SUBSTRING_MATCH_LEN && longer.contains(shorter.as_str())
}

/// Exact, case-insensitive term match. No fuzziness for medical terms.
pub fn event_terms_match(a: &str, b: &str) -> bool {
    let a = a.trim();
    let b = b.trim();
    !a.is_empty() && a.to_lowercase() == b.to_lowercase()
}

/// Jaro-Winkler similarity of the normalized titles (0.0 to 1.0).
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let a = normalize_title(a);
    let b = normalize_title(b);
    jaro_winkler::similarity(a.chars(), b.chars())
}
