//! p-value parsing and significance flagging.
//!
//! p-values are passed through as reported; parsing exists only to decide
//! the significance flag. Anything that does not parse ("NS", "NA", blank)
//! is simply not significant.

/// Two-sided significance level.
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Comparison operator a reported p-value was qualified with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Less,
    LessOrEqual,
    Equal,
    GreaterOrEqual,
    Greater,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PValue {
    pub relation: Relation,
    pub value: f64,
}

impl PValue {
    /// `<x` only bounds the p-value from above, so it is significant when
    /// `x <= 0.05`. Lower bounds (`>x`, `>=x`) never establish significance.
    pub fn is_significant(&self) -> bool {
        match self.relation {
            Relation::Less => self.value <= SIGNIFICANCE_THRESHOLD,
            Relation::LessOrEqual | Relation::Equal => self.value < SIGNIFICANCE_THRESHOLD,
            Relation::GreaterOrEqual | Relation::Greater => false,
        }
    }
}

/// Parses strings such as `"0.002"`, `"<0.001"`, `"p = 0.04"`, `"1.2E-5"`
/// or `"0.03*"`.
pub fn parse_p_value(raw: &str) -> Option<PValue> {
    let mut rest = strip_label(raw.trim()).trim_start();

    let relation = if let Some(r) = strip_any(rest, &["<=", "≤", "=<"]) {
        rest = r;
        Relation::LessOrEqual
    } else if let Some(r) = strip_any(rest, &[">=", "≥", "=>"]) {
        rest = r;
        Relation::GreaterOrEqual
    } else if let Some(r) = rest.strip_prefix('<') {
        rest = r;
        Relation::Less
    } else if let Some(r) = rest.strip_prefix('>') {
        rest = r;
        Relation::Greater
    } else if let Some(r) = rest.strip_prefix('=') {
        rest = r;
        Relation::Equal
    } else {
        Relation::Equal
    };

    let number = rest.trim().trim_end_matches('*').trim_end();
    let value: f64 = number.parse().ok()?;
    if !(0.0..=1.0).contains(&value) {
        return None;
    }
    Some(PValue { relation, value })
}

/// True when `raw` parses and falls below [`SIGNIFICANCE_THRESHOLD`].
pub fn is_significant(raw: &str) -> bool {
    parse_p_value(raw).is_some_and(|p| p.is_significant())
}

fn strip_label(s: &str) -> &str {
    for label in ["p-value", "p value", "p"] {
        if s.len() >= label.len()
            && s.is_char_boundary(label.len())
            && s[..label.len()].eq_ignore_ascii_case(label)
        {
            return &s[label.len()..];
        }
    }
    s
}

fn strip_any<'a>(s: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    prefixes.iter().find_map(|prefix| s.strip_prefix(prefix))
}
