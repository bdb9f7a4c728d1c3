//! The individual stages of the objective-to-topic cascade.
//!
//! Each stage inspects a shared [`MatchContext`] and either claims the
//! objective or passes. The [`TopicMatcher`](super::TopicMatcher) runs them in
//! registration order and keeps the first claim.

use std::cell::OnceCell;
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::config::MatcherConfig;

use super::keywords::extract_keywords;
use super::normalizer::normalize;
use super::result::{Alternative, TopicMatch};
use super::similarity::{keyword_score, similarity};

/// Minimum fuzzy score for a confident fuzzy match.
pub const FUZZY_THRESHOLD: f64 = 0.7;

/// Minimum fuzzy score for the discounted fallback match.
pub const FUZZY_FALLBACK_THRESHOLD: f64 = 0.4;

/// Confidence multiplier applied to fallback fuzzy matches.
pub const FUZZY_FALLBACK_DISCOUNT: f64 = 0.7;

/// Minimum keyword-overlap ratio for a keyword match.
pub const KEYWORD_THRESHOLD: f64 = 0.5;

/// Confidence multiplier applied to keyword matches.
pub const KEYWORD_DISCOUNT: f64 = 0.8;

/// Minimum raw score for a runner-up to be reported.
pub const ALTERNATIVE_FLOOR: f64 = 0.5;

/// Maximum number of runner-ups reported.
pub const MAX_ALTERNATIVES: usize = 3;

/// A candidate topic with its raw stage score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredTopic<'a> {
    pub topic: &'a str,
    pub score: f64,
}

/// Per-call matching state shared by all stages.
///
/// Holds the objective in raw and normalized form, the candidate topics with
/// blanks and case-insensitive duplicates removed (first occurrence wins), and
/// the fuzzy ranking, computed at most once per call.
#[derive(Debug)]
pub struct MatchContext<'a> {
    config: &'a MatcherConfig,
    objective: &'a str,
    normalized: String,
    topics: Vec<&'a str>,
    fuzzy_ranking: OnceCell<Vec<ScoredTopic<'a>>>,
}

impl<'a> MatchContext<'a> {
    #[must_use]
    pub fn new<S: AsRef<str>>(
        config: &'a MatcherConfig,
        objective: &'a str,
        topics: &'a [S],
    ) -> Self {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(topics.len());
        for topic in topics {
            let topic: &'a str = topic.as_ref();
            if !topic.trim().is_empty() && seen.insert(topic.to_lowercase()) {
                unique.push(topic);
            }
        }

        Self {
            config,
            objective,
            normalized: normalize(objective),
            topics: unique,
            fuzzy_ranking: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &MatcherConfig {
        self.config
    }

    /// The objective exactly as the caller supplied it.
    #[must_use]
    pub fn objective(&self) -> &str {
        self.objective
    }

    #[must_use]
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    #[must_use]
    pub fn topics(&self) -> &[&'a str] {
        &self.topics
    }

    /// Topics ranked by their best fuzzy score, best first, ties in caller order.
    pub fn fuzzy_ranking(&self) -> &[ScoredTopic<'a>] {
        self.fuzzy_ranking.get_or_init(|| {
            let scored = self
                .topics
                .iter()
                .map(|&topic| ScoredTopic {
                    topic,
                    score: self.fuzzy_score(topic),
                })
                .collect();
            rank(scored)
        })
    }

    /// Best of the full, prefix-stripped and subject-stripped similarities.
    #[must_use]
    pub fn fuzzy_score(&self, topic: &str) -> f64 {
        let stripped_topic = self.config.strip_topic_prefix(topic);
        let stripped_objective = self.config.strip_objective_subject(&self.normalized);

        similarity(&self.normalized, topic)
            .max(similarity(&self.normalized, stripped_topic))
            .max(similarity(stripped_objective, stripped_topic))
    }
}

/// Sorts descending by score; the sort is stable so ties keep caller order.
fn rank(mut scored: Vec<ScoredTopic<'_>>) -> Vec<ScoredTopic<'_>> {
    scored.sort_by(|left, right| {
        right
            .score
            .partial_cmp(&left.score)
            .unwrap_or(Ordering::Equal)
    });
    scored
}

/// Runner-ups after the top pick, scaled by `discount`.
///
/// Scores are strictly decreasing: a candidate that ties the top pick or an
/// earlier runner-up is skipped, so the list never repeats a confidence.
fn alternatives(ranked: &[ScoredTopic<'_>], discount: f64) -> Vec<Alternative> {
    let Some((best, rest)) = ranked.split_first() else {
        return Vec::new();
    };

    let mut last_score = best.score;
    let mut picked = Vec::new();
    for candidate in rest {
        if picked.len() == MAX_ALTERNATIVES || candidate.score < ALTERNATIVE_FLOOR {
            break;
        }
        if candidate.score < last_score {
            picked.push(Alternative::new(candidate.topic, candidate.score * discount));
            last_score = candidate.score;
        }
    }
    picked
}

/// One step of the matching cascade.
pub trait MatchStage: Send + Sync {
    /// Returns the stage name used in logs.
    fn name(&self) -> &'static str;

    /// Returns a match if this stage resolves the objective.
    fn evaluate(&self, ctx: &MatchContext<'_>) -> Option<TopicMatch>;
}

/// Topic equal to the normalized objective, or to it with spaces as hyphens.
#[derive(Debug, Default)]
pub struct ExactStage;

impl MatchStage for ExactStage {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn evaluate(&self, ctx: &MatchContext<'_>) -> Option<TopicMatch> {
        let normalized = ctx.normalized();
        let hyphenated = normalized.replace(' ', "-");

        ctx.topics()
            .iter()
            .find(|topic| {
                let lowered = topic.to_lowercase();
                lowered == normalized || lowered == hyphenated
            })
            .map(|topic| TopicMatch::Exact {
                topic: (*topic).to_string(),
            })
    }
}

/// Alias-table hit whose canonical topic is available.
#[derive(Debug, Default)]
pub struct AliasStage;

impl MatchStage for AliasStage {
    fn name(&self) -> &'static str {
        "alias"
    }

    fn evaluate(&self, ctx: &MatchContext<'_>) -> Option<TopicMatch> {
        let canonical = ctx.config().aliases().lookup(ctx.objective())?.to_lowercase();

        ctx.topics()
            .iter()
            .find(|topic| topic.to_lowercase() == canonical)
            .map(|topic| TopicMatch::Alias {
                topic: (*topic).to_string(),
            })
    }
}

/// Confident edit-distance match at or above [`FUZZY_THRESHOLD`].
#[derive(Debug, Default)]
pub struct FuzzyStage;

impl MatchStage for FuzzyStage {
    fn name(&self) -> &'static str {
        "fuzzy"
    }

    fn evaluate(&self, ctx: &MatchContext<'_>) -> Option<TopicMatch> {
        let ranked = ctx.fuzzy_ranking();
        let best = ranked.first().filter(|best| best.score >= FUZZY_THRESHOLD)?;

        Some(TopicMatch::Fuzzy {
            topic: best.topic.to_string(),
            confidence: best.score,
            alternatives: alternatives(ranked, 1.0),
            fallback: false,
        })
    }
}

/// Keyword-overlap match at or above [`KEYWORD_THRESHOLD`], discounted by [`KEYWORD_DISCOUNT`].
#[derive(Debug, Default)]
pub struct KeywordStage;

impl MatchStage for KeywordStage {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn evaluate(&self, ctx: &MatchContext<'_>) -> Option<TopicMatch> {
        let keywords = extract_keywords(ctx.objective());
        if keywords.is_empty() {
            return None;
        }

        let scored = ctx
            .topics()
            .iter()
            .map(|&topic| ScoredTopic {
                topic,
                score: keyword_score(topic, &keywords),
            })
            .collect();
        let ranked = rank(scored);
        let best = ranked.first().filter(|best| best.score >= KEYWORD_THRESHOLD)?;

        Some(TopicMatch::Keyword {
            topic: best.topic.to_string(),
            confidence: best.score * KEYWORD_DISCOUNT,
            alternatives: alternatives(&ranked, KEYWORD_DISCOUNT),
        })
    }
}

/// Weak fuzzy band `[FUZZY_FALLBACK_THRESHOLD, FUZZY_THRESHOLD)`, discounted by
/// [`FUZZY_FALLBACK_DISCOUNT`]. Reuses the ranking computed for [`FuzzyStage`].
#[derive(Debug, Default)]
pub struct FuzzyFallbackStage;

impl MatchStage for FuzzyFallbackStage {
    fn name(&self) -> &'static str {
        "fuzzy_fallback"
    }

    fn evaluate(&self, ctx: &MatchContext<'_>) -> Option<TopicMatch> {
        let ranked = ctx.fuzzy_ranking();
        let best = ranked
            .first()
            .filter(|best| (FUZZY_FALLBACK_THRESHOLD..FUZZY_THRESHOLD).contains(&best.score))?;

        Some(TopicMatch::Fuzzy {
            topic: best.topic.to_string(),
            confidence: best.score * FUZZY_FALLBACK_DISCOUNT,
            alternatives: alternatives(ranked, FUZZY_FALLBACK_DISCOUNT),
            fallback: true,
        })
    }
}
