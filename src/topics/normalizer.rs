//! Objective text normalization shared by every matching stage.

/// Normalizes free text for matching.
///
/// Normalization steps:
/// 1. Convert to lowercase
/// 2. Drop every character that is not a letter, digit, whitespace, `-` or `/`
/// 3. Collapse whitespace runs to a single space and trim the ends
///
/// Never fails; empty or punctuation-only input yields an empty string.
#[must_use]
pub fn normalize(input: &str) -> String {
    let stripped: String = input
        .to_lowercase()
        .chars()
        .filter(|ch| ch.is_alphanumeric() || ch.is_whitespace() || matches!(ch, '-' | '/'))
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
