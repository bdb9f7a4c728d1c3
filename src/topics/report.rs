//! Serializable diagnostics for a single objective-to-topic match.

use serde::{Deserialize, Serialize};

use super::policy::{ITEM_BANK_THRESHOLD, should_use_item_bank};
use super::result::{Alternative, MatchType, TopicMatch};

/// Tool-call output describing how an objective was matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub objective: String,
    pub matched_topic: Option<String>,
    pub confidence: f64,
    pub match_type: MatchType,
    /// Whether the matched topic has at least one bank item.
    pub has_items: bool,
    pub will_use_item_bank: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<Alternative>,
    pub threshold: f64,
}

impl MatchReport {
    /// Builds a report; `has_items` comes from the item bank, not the matcher.
    #[must_use]
    pub fn new(objective: impl Into<String>, result: &TopicMatch, has_items: bool) -> Self {
        Self {
            objective: objective.into(),
            matched_topic: result.topic().map(String::from),
            confidence: result.confidence(),
            match_type: result.match_type(),
            has_items,
            will_use_item_bank: should_use_item_bank(result),
            alternatives: result.alternatives().to_vec(),
            threshold: ITEM_BANK_THRESHOLD,
        }
    }
}
