//! Small text helpers shared by the normalizers.

/// Trims a raw optional string, treating blank values as absent.
pub fn clean_opt(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Key used to match arm titles: trimmed, whitespace-collapsed, lowercase.
pub fn arm_key(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
