//! Significant-word extraction for the keyword-overlap stage.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use stop_words::{LANGUAGE, get};

/// Tokens at or below this length carry no topic signal.
const MIN_KEYWORD_LEN: usize = 3;

/// Quiz-request filler that never names a topic, on top of the English stop words.
pub const REQUEST_FILLER: &[&str] = &[
    "me", "learn", "learning", "understand", "understanding", "quiz", "quizzes", "test",
    "tests", "testing", "teach", "explain", "know", "want", "need", "help", "study",
    "practice", "question", "questions", "give", "show", "please", "intro", "introduction",
    "basic", "basics",
];

/// English stop words merged with [`REQUEST_FILLER`], built once.
static STOPWORDS: LazyLock<HashSet<String>> = LazyLock::new(|| {
    get(LANGUAGE::English)
        .iter()
        .map(|word| word.to_lowercase())
        .chain(REQUEST_FILLER.iter().map(|word| (*word).to_string()))
        .collect()
});

/// Returns true if `token` (already lowercased) carries no topic signal.
#[must_use]
pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

#[allow(clippy::expect_used)]
static NON_WORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\W+").expect("non-word regex is valid")); // Static pattern, safe to panic

/// Extracts significant keywords from free text.
///
/// Lowercases, splits on non-word characters, then drops tokens of two
/// characters or fewer and stop words (see [`is_stopword`]). Order is
/// preserved and duplicates are kept.
#[must_use]
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_WORD_PATTERN
        .replace_all(&lowered, " ")
        .split_whitespace()
        .filter(|token| token.chars().count() >= MIN_KEYWORD_LEN)
        .filter(|token| !is_stopword(token))
        .map(String::from)
        .collect()
}
