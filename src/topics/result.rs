//! Match result value types produced by the topic matcher.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Confidence reported for an exact topic hit.
pub const EXACT_CONFIDENCE: f64 = 1.0;

/// Confidence reported for an alias-table hit.
pub const ALIAS_CONFIDENCE: f64 = 0.95;

/// Which matching stage produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Alias,
    Fuzzy,
    Keyword,
    None,
}

impl MatchType {
    /// Returns the wire name of this match type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Alias => "alias",
            Self::Fuzzy => "fuzzy",
            Self::Keyword => "keyword",
            Self::None => "none",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A runner-up topic reported next to a fuzzy or keyword match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub topic: String,
    pub confidence: f64,
}

impl Alternative {
    #[must_use]
    pub fn new(topic: impl Into<String>, confidence: f64) -> Self {
        Self {
            topic: topic.into(),
            confidence,
        }
    }
}

/// Outcome of matching one objective against a topic list.
///
/// Each variant carries only what its stage can produce: exact and alias
/// hits have fixed confidence and no alternatives, and `None` carries nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum TopicMatch {
    /// The objective names a topic verbatim (ignoring case and space/hyphen).
    Exact { topic: String },
    /// The objective is a known alias of an available topic.
    Alias { topic: String },
    /// Edit-distance match.
    ///
    /// `fallback` marks the weak band, whose confidence is already discounted.
    Fuzzy {
        topic: String,
        confidence: f64,
        alternatives: Vec<Alternative>,
        fallback: bool,
    },
    /// Keyword-overlap match; confidence is already discounted.
    Keyword {
        topic: String,
        confidence: f64,
        alternatives: Vec<Alternative>,
    },
    /// Nothing cleared any stage.
    None,
}

impl TopicMatch {
    /// Returns the matched topic, if any.
    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        match self {
            Self::Exact { topic }
            | Self::Alias { topic }
            | Self::Fuzzy { topic, .. }
            | Self::Keyword { topic, .. } => Some(topic),
            Self::None => None,
        }
    }

    /// Returns the confidence in `[0, 1]`; zero exactly when nothing matched.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        match self {
            Self::Exact { .. } => EXACT_CONFIDENCE,
            Self::Alias { .. } => ALIAS_CONFIDENCE,
            Self::Fuzzy { confidence, .. } | Self::Keyword { confidence, .. } => *confidence,
            Self::None => 0.0,
        }
    }

    #[must_use]
    pub fn match_type(&self) -> MatchType {
        match self {
            Self::Exact { .. } => MatchType::Exact,
            Self::Alias { .. } => MatchType::Alias,
            Self::Fuzzy { .. } => MatchType::Fuzzy,
            Self::Keyword { .. } => MatchType::Keyword,
            Self::None => MatchType::None,
        }
    }

    /// Returns runner-up topics in strictly decreasing confidence; the primary
    /// topic and score ties are never listed.
    #[must_use]
    pub fn alternatives(&self) -> &[Alternative] {
        match self {
            Self::Fuzzy { alternatives, .. } | Self::Keyword { alternatives, .. } => alternatives,
            Self::Exact { .. } | Self::Alias { .. } | Self::None => &[],
        }
    }

    /// Returns true unless this is [`TopicMatch::None`].
    #[must_use]
    pub fn is_match(&self) -> bool {
        !matches!(self, Self::None)
    }
}
