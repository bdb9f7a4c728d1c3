//! Error types for item bank loading and item generation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the item bank and item generators.
#[derive(Debug, Error)]
pub enum ItemError {
    /// The bank file could not be read.
    #[error("cannot read item bank '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bank file is not a JSON array of items.
    #[error("cannot parse item bank: {0}")]
    Parse(#[from] serde_json::Error),

    /// An item failed validation.
    #[error("invalid item '{id}': {reason}")]
    InvalidItem { id: String, reason: String },

    /// Two items share an id.
    #[error("duplicate item id '{0}'\n  Suggestion: Item ids must be unique across the bank")]
    DuplicateItem(String),

    /// The generator could not produce an item.
    #[error("item generation failed for topic '{topic}': {reason}")]
    Generation { topic: String, reason: String },
}

impl ItemError {
    #[must_use]
    pub fn invalid_item(id: &str, reason: impl Into<String>) -> Self {
        Self::InvalidItem {
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn generation(topic: &str, reason: impl Into<String>) -> Self {
        Self::Generation {
            topic: topic.to_string(),
            reason: reason.into(),
        }
    }
}
