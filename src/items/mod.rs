//! Multiple-choice items: the curated bank and on-demand generation.
//!
//! - [`McqItem`] - one multiple-choice question
//! - [`ItemBank`] / [`InMemoryItemBank`] - curated items grouped by topic
//! - [`ItemGenerator`] / [`HttpItemGenerator`] - opaque "generate one item" capability

mod bank;
mod error;
mod generator;

pub use bank::{InMemoryItemBank, ItemBank};
pub use error::ItemError;
pub use generator::{DEFAULT_GENERATOR_TIMEOUT_SECS, GeneratorConfig, HttpItemGenerator, ItemGenerator};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum number of answer choices per item.
pub const MIN_CHOICES: usize = 2;

/// Maximum number of answer choices per item.
pub const MAX_CHOICES: usize = 6;

/// Requested item difficulty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McqItem {
    pub id: String,
    pub topic: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub stem: String,
    pub choices: Vec<String>,
    /// Index into `choices` of the correct answer.
    pub answer_index: usize,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl McqItem {
    /// Checks structural validity.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::InvalidItem`] if the id, topic, stem or any choice
    /// is blank, the choice count is outside `MIN_CHOICES..=MAX_CHOICES`, or
    /// `answer_index` does not point at a choice.
    pub fn validate(&self) -> Result<(), ItemError> {
        if self.id.trim().is_empty() {
            return Err(ItemError::invalid_item(&self.id, "id is blank"));
        }
        if self.topic.trim().is_empty() {
            return Err(ItemError::invalid_item(&self.id, "topic is blank"));
        }
        if self.stem.trim().is_empty() {
            return Err(ItemError::invalid_item(&self.id, "stem is blank"));
        }
        if !(MIN_CHOICES..=MAX_CHOICES).contains(&self.choices.len()) {
            return Err(ItemError::invalid_item(
                &self.id,
                format!(
                    "has {} choices, expected {MIN_CHOICES}..={MAX_CHOICES}",
                    self.choices.len()
                ),
            ));
        }
        if self.choices.iter().any(|choice| choice.trim().is_empty()) {
            return Err(ItemError::invalid_item(&self.id, "a choice is blank"));
        }
        if self.answer_index >= self.choices.len() {
            return Err(ItemError::invalid_item(
                &self.id,
                format!("answer_index {} is out of range", self.answer_index),
            ));
        }
        Ok(())
    }

    /// Returns true if `choice_index` is the correct answer.
    #[must_use]
    pub fn is_correct(&self, choice_index: usize) -> bool {
        choice_index == self.answer_index
    }
}
