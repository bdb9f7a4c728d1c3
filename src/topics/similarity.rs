//! Bounded string similarity scores used by the fuzzy and keyword stages.

/// Edit-distance similarity in `[0, 1]`, case-insensitive.
///
/// Computed as `1 - levenshtein(a, b) / max(len(a), len(b))` over characters,
/// where substitution, insertion and deletion each cost 1. Two empty strings
/// are identical and score `1.0`.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

/// Fraction of `keywords` that overlap some hyphen-separated part of `topic`.
///
/// A keyword overlaps a part when either contains the other. Returns `0.0`
/// when `keywords` is empty.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn keyword_score<S: AsRef<str>>(topic: &str, keywords: &[S]) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }

    let topic = topic.to_lowercase();
    let parts: Vec<&str> = topic.split('-').filter(|part| !part.is_empty()).collect();

    let matched = keywords
        .iter()
        .filter(|keyword| {
            let keyword: &str = (*keyword).as_ref();
            parts
                .iter()
                .any(|part| part.contains(keyword) || keyword.contains(part))
        })
        .count();

    matched as f64 / keywords.len() as f64
}
