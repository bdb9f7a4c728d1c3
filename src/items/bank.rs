//! Curated item bank keyed by topic.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, instrument};

use super::{Difficulty, ItemError, McqItem};

/// Read-only access to curated items.
pub trait ItemBank: Send + Sync {
    /// Topics that have at least one item, in first-seen order.
    fn topics(&self) -> Vec<String>;

    /// All items for `topic` (case-insensitive).
    fn items_for(&self, topic: &str) -> Vec<McqItem>;

    /// Returns true if `topic` has at least one item.
    fn has_items(&self, topic: &str) -> bool {
        !self.items_for(topic).is_empty()
    }

    /// Picks an item for `topic`, preferring `difficulty`.
    fn pick(&self, topic: &str, difficulty: Difficulty) -> Option<McqItem> {
        let items = self.items_for(topic);
        let preferred = items.iter().position(|item| item.difficulty == difficulty);
        items.into_iter().nth(preferred.unwrap_or(0))
    }

    /// Looks an item up by id.
    fn find(&self, item_id: &str) -> Option<McqItem>;
}

/// An [`ItemBank`] held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryItemBank {
    items: Vec<McqItem>,
    topics: Vec<String>,
    by_topic: HashMap<String, Vec<usize>>,
    by_id: HashMap<String, usize>,
}

impl InMemoryItemBank {
    /// Builds a bank from items, validating each.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::InvalidItem`] for the first invalid item and
    /// [`ItemError::DuplicateItem`] if two items share an id.
    pub fn new(items: Vec<McqItem>) -> Result<Self, ItemError> {
        let mut bank = Self::default();
        for item in items {
            item.validate()?;
            if bank.by_id.contains_key(&item.id) {
                return Err(ItemError::DuplicateItem(item.id));
            }

            let index = bank.items.len();
            let topic_key = item.topic.to_lowercase();
            let slots = bank.by_topic.entry(topic_key).or_default();
            if slots.is_empty() {
                bank.topics.push(item.topic.clone());
            }
            slots.push(index);
            bank.by_id.insert(item.id.clone(), index);
            bank.items.push(item);
        }
        Ok(bank)
    }

    /// Loads a bank from a JSON array of items.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::Io`] if the file cannot be read, [`ItemError::Parse`]
    /// if it is not a JSON array of items, and the [`InMemoryItemBank::new`]
    /// errors for invalid or duplicate items.
    #[instrument(skip(path), fields(path = %path.display()))]
    pub fn from_file(path: &Path) -> Result<Self, ItemError> {
        let content = std::fs::read_to_string(path).map_err(|source| ItemError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let items: Vec<McqItem> = serde_json::from_str(&content)?;
        let bank = Self::new(items)?;
        debug!(items = bank.len(), topics = bank.topics.len(), "Loaded item bank");
        Ok(bank)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ItemBank for InMemoryItemBank {
    fn topics(&self) -> Vec<String> {
        self.topics.clone()
    }

    fn items_for(&self, topic: &str) -> Vec<McqItem> {
        self.by_topic
            .get(&topic.to_lowercase())
            .map(|slots| slots.iter().map(|&index| self.items[index].clone()).collect())
            .unwrap_or_default()
    }

    fn has_items(&self, topic: &str) -> bool {
        self.by_topic.contains_key(&topic.to_lowercase())
    }

    fn find(&self, item_id: &str) -> Option<McqItem> {
        self.by_id.get(item_id).map(|&index| self.items[index].clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::items::test_support::item;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_bank() -> InMemoryItemBank {
        InMemoryItemBank::new(vec![
            item("c1", "js-closures", Difficulty::Easy),
            item("h1", "react-hooks", Difficulty::Medium),
            item("c2", "JS-Closures", Difficulty::Hard),
        ])
        .unwrap()
    }

    #[test]
    fn test_topics_in_first_seen_order_without_case_duplicates() {
        assert_eq!(sample_bank().topics(), ["js-closures", "react-hooks"]);
    }

    #[test]
    fn test_items_for_is_case_insensitive() {
        let bank = sample_bank();
        let ids: Vec<String> = bank.items_for("JS-CLOSURES").into_iter().map(|i| i.id).collect();
        assert_eq!(ids, ["c1", "c2"]);
        assert!(bank.items_for("math-probability").is_empty());
    }

    #[test]
    fn test_has_items() {
        let bank = sample_bank();
        assert!(bank.has_items("react-hooks"));
        assert!(!bank.has_items("math-probability"));
    }

    #[test]
    fn test_pick_prefers_difficulty_then_falls_back() {
        let bank = sample_bank();
        assert_eq!(bank.pick("js-closures", Difficulty::Hard).unwrap().id, "c2");
        assert_eq!(bank.pick("js-closures", Difficulty::Medium).unwrap().id, "c1");
        assert!(bank.pick("math-probability", Difficulty::Easy).is_none());
    }

    #[test]
    fn test_find_by_id() {
        let bank = sample_bank();
        assert_eq!(bank.find("h1").unwrap().topic, "react-hooks");
        assert!(bank.find("missing").is_none());
    }

    #[test]
    fn test_new_rejects_duplicates_and_invalid_items() {
        let err = InMemoryItemBank::new(vec![
            item("c1", "js-closures", Difficulty::Easy),
            item("c1", "react-hooks", Difficulty::Easy),
        ])
        .unwrap_err();
        assert!(matches!(err, ItemError::DuplicateItem(ref id) if id == "c1"));

        let mut bad = item("c3", "js-closures", Difficulty::Easy);
        bad.answer_index = 9;
        assert!(matches!(
            InMemoryItemBank::new(vec![bad]),
            Err(ItemError::InvalidItem { .. })
        ));
    }

    #[test]
    fn test_from_file_loads_json_array() {
        let mut file = NamedTempFile::new().unwrap();
        let items = vec![item("p1", "math-probability", Difficulty::Easy)];
        write!(file, "{}", serde_json::to_string(&items).unwrap()).unwrap();

        let bank = InMemoryItemBank::from_file(file.path()).unwrap();
        assert_eq!(bank.len(), 1);
        assert!(bank.has_items("math-probability"));
    }

    #[test]
    fn test_from_file_errors() {
        assert!(matches!(
            InMemoryItemBank::from_file(Path::new("/nonexistent/bank.json")),
            Err(ItemError::Io { .. })
        ));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{\"not\": \"an array\"}}").unwrap();
        assert!(matches!(
            InMemoryItemBank::from_file(file.path()),
            Err(ItemError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_bank() {
        let bank = InMemoryItemBank::new(Vec::new()).unwrap();
        assert!(bank.is_empty());
        assert!(bank.topics().is_empty());
    }
}
