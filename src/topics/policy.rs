//! Decision policy: serve from the curated bank or generate a fresh item.

use super::result::TopicMatch;

/// Minimum confidence for serving a curated bank item.
///
/// Shared with callers so diagnostics can report it.
pub const ITEM_BANK_THRESHOLD: f64 = 0.6;

/// Returns true if `result` names a topic with confidence at or above
/// [`ITEM_BANK_THRESHOLD`].
#[must_use]
pub fn should_use_item_bank(result: &TopicMatch) -> bool {
    result.topic().is_some() && result.confidence() >= ITEM_BANK_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topics::Alternative;

    fn fuzzy(confidence: f64) -> TopicMatch {
        TopicMatch::Fuzzy {
            topic: "js-closures".to_string(),
            confidence,
            alternatives: vec![Alternative::new("js-classes", 0.55)],
            fallback: false,
        }
    }

    #[test]
    fn test_none_never_uses_bank() {
        assert!(!should_use_item_bank(&TopicMatch::None));
    }

    #[test]
    fn test_exact_and_alias_use_bank() {
        assert!(should_use_item_bank(&TopicMatch::Exact {
            topic: "js-closures".to_string()
        }));
        assert!(should_use_item_bank(&TopicMatch::Alias {
            topic: "react-hooks".to_string()
        }));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(should_use_item_bank(&fuzzy(0.6)));
        assert!(should_use_item_bank(&fuzzy(0.75)));
        assert!(!should_use_item_bank(&fuzzy(0.599)));
    }

    #[test]
    fn test_keyword_match_below_threshold_generates() {
        let result = TopicMatch::Keyword {
            topic: "math-probability".to_string(),
            confidence: 0.4,
            alternatives: Vec::new(),
        };
        assert!(!should_use_item_bank(&result));
    }
}
