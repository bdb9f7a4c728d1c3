//! Objective-to-topic matching.
//!
//! Given a free-text learning objective and the topics that currently have
//! curated items, decide which topic (if any) the learner means.
//!
//! # Pipeline
//!
//! - [`normalize`] - lowercase, strip punctuation, collapse whitespace
//! - [`AliasTable`] - static phrase → topic synonyms
//! - [`similarity`] / [`keyword_score`] - bounded `[0, 1]` scores
//! - [`TopicMatcher`] - exact → alias → fuzzy → keyword → fuzzy fallback
//! - [`should_use_item_bank`] - curated bank vs. on-demand generation
//!
//! # Example
//!
//! ```
//! use quizmatch_core::topics::{MatchType, TopicMatcher, should_use_item_bank};
//!
//! let matcher = TopicMatcher::default();
//! let result = matcher.match_topic("useEffect", &["react-hooks", "js-closures"]);
//!
//! assert_eq!(result.match_type(), MatchType::Alias);
//! assert_eq!(result.topic(), Some("react-hooks"));
//! assert!(should_use_item_bank(&result));
//! ```

mod alias;
mod keywords;
mod matcher;
mod normalizer;
mod policy;
mod report;
mod result;
mod similarity;
mod stages;

pub use alias::AliasTable;
pub use keywords::{REQUEST_FILLER, extract_keywords, is_stopword};
pub use matcher::TopicMatcher;
pub use normalizer::normalize;
pub use policy::{ITEM_BANK_THRESHOLD, should_use_item_bank};
pub use report::MatchReport;
pub use result::{ALIAS_CONFIDENCE, Alternative, EXACT_CONFIDENCE, MatchType, TopicMatch};
pub use similarity::{keyword_score, similarity};
pub use stages::{
    ALTERNATIVE_FLOOR, AliasStage, ExactStage, FUZZY_FALLBACK_DISCOUNT, FUZZY_FALLBACK_THRESHOLD,
    FUZZY_THRESHOLD, FuzzyFallbackStage, FuzzyStage, KEYWORD_DISCOUNT, KEYWORD_THRESHOLD,
    KeywordStage, MAX_ALTERNATIVES, MatchContext, MatchStage, ScoredTopic,
};
