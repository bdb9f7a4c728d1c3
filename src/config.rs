//! Matcher configuration: alias table and subject-prefix word lists.
//!
//! The configuration is built once and injected into the
//! [`TopicMatcher`](crate::topics::TopicMatcher); it is never mutated afterwards.
//!
//! # File format
//!
//! ```json
//! {
//!   "aliases": { "dice": "math-probability" },
//!   "topic_prefixes": ["js", "react", "math"],
//!   "objective_subjects": ["javascript", "react", "math"]
//! }
//! ```
//!
//! Every field is optional. Missing lists fall back to the built-in defaults,
//! and `aliases` is layered on top of the built-in alias table.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::topics::{AliasTable, normalize};

/// Subject prefixes stripped from topic identifiers (`js-closures` → `closures`).
pub const DEFAULT_TOPIC_PREFIXES: &[&str] = &[
    "js", "react", "math", "science", "html", "css", "git", "vibe", "reading",
];

/// Leading subject words stripped from objectives (`javascript closures` → `closures`).
pub const DEFAULT_OBJECTIVE_SUBJECTS: &[&str] = &["javascript", "react", "math", "science"];

/// Errors raised while building a [`MatcherConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read matcher config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for the expected shape.
    #[error("cannot parse matcher config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A config value failed validation.
    #[error("invalid config value for `{field}`: {value:?}. {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, value: &str, reason: &'static str) -> Self {
        Self::InvalidValue {
            field,
            value: value.to_string(),
            reason,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    aliases: Option<HashMap<String, String>>,
    topic_prefixes: Option<Vec<String>>,
    objective_subjects: Option<Vec<String>>,
}

/// Immutable data the topic matcher consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatcherConfig {
    aliases: AliasTable,
    topic_prefixes: Vec<String>,
    objective_subjects: Vec<String>,
}

impl MatcherConfig {
    /// Builds a config from explicit parts.
    ///
    /// Prefixes and subject words are trimmed and lowercased.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a prefix is empty or contains
    /// characters other than ASCII letters, digits and hyphens, or if a subject
    /// word is empty or not a single ASCII alphanumeric word.
    pub fn new<P, S>(aliases: AliasTable, topic_prefixes: P, objective_subjects: S) -> Result<Self, ConfigError>
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        let topic_prefixes = topic_prefixes
            .into_iter()
            .map(|prefix| validate_word("topic_prefixes", prefix.as_ref(), true))
            .collect::<Result<Vec<_>, _>>()?;
        let objective_subjects = objective_subjects
            .into_iter()
            .map(|subject| validate_word("objective_subjects", subject.as_ref(), false))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            aliases,
            topic_prefixes,
            objective_subjects,
        })
    }

    /// Loads a config file, layering it over the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, [`ConfigError::Parse`]
    /// if it is not valid JSON, or [`ConfigError::InvalidValue`] if a value fails validation.
    #[instrument(skip(path), fields(path = %path.display()))]
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Parses config JSON, layering it over the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed JSON or unknown fields, and
    /// [`ConfigError::InvalidValue`] if a value fails validation.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = serde_json::from_str(content)?;

        let aliases = match &file.aliases {
            Some(overrides) => {
                for (phrase, topic) in overrides {
                    if normalize(phrase).is_empty() {
                        return Err(ConfigError::invalid(
                            "aliases",
                            phrase,
                            "Alias phrases must contain at least one letter or digit",
                        ));
                    }
                    if topic.trim().is_empty() {
                        return Err(ConfigError::invalid(
                            "aliases",
                            phrase,
                            "Alias topics must not be blank",
                        ));
                    }
                }
                AliasTable::builtin().merged_with(&AliasTable::new(overrides))
            }
            None => AliasTable::builtin(),
        };

        let config = match (file.topic_prefixes, file.objective_subjects) {
            (Some(prefixes), Some(subjects)) => Self::new(aliases, prefixes, subjects),
            (Some(prefixes), None) => Self::new(aliases, prefixes, DEFAULT_OBJECTIVE_SUBJECTS),
            (None, Some(subjects)) => Self::new(aliases, DEFAULT_TOPIC_PREFIXES, subjects),
            (None, None) => Self::new(aliases, DEFAULT_TOPIC_PREFIXES, DEFAULT_OBJECTIVE_SUBJECTS),
        }?;

        debug!(
            aliases = config.aliases.len(),
            topic_prefixes = config.topic_prefixes.len(),
            objective_subjects = config.objective_subjects.len(),
            "Loaded matcher config"
        );
        Ok(config)
    }

    #[must_use]
    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    #[must_use]
    pub fn topic_prefixes(&self) -> &[String] {
        &self.topic_prefixes
    }

    #[must_use]
    pub fn objective_subjects(&self) -> &[String] {
        &self.objective_subjects
    }

    /// Strips the first matching `{prefix}-` from the start of `topic`, ignoring case.
    #[must_use]
    pub fn strip_topic_prefix<'t>(&self, topic: &'t str) -> &'t str {
        for prefix in &self.topic_prefixes {
            let len = prefix.len();
            let head_matches = topic
                .get(..len)
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
            if head_matches && topic[len..].starts_with('-') {
                return &topic[len + 1..];
            }
        }
        topic
    }

    /// Drops a leading subject word from a normalized objective.
    ///
    /// Only a word followed by more text is dropped; a lone subject word is kept.
    #[must_use]
    pub fn strip_objective_subject<'o>(&self, objective: &'o str) -> &'o str {
        let Some((first, rest)) = objective.split_once(' ') else {
            return objective;
        };
        if self
            .objective_subjects
            .iter()
            .any(|subject| subject.eq_ignore_ascii_case(first))
        {
            rest.trim_start()
        } else {
            objective
        }
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            aliases: AliasTable::builtin(),
            topic_prefixes: DEFAULT_TOPIC_PREFIXES.iter().map(|p| (*p).to_string()).collect(),
            objective_subjects: DEFAULT_OBJECTIVE_SUBJECTS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

fn validate_word(field: &'static str, raw: &str, allow_hyphen: bool) -> Result<String, ConfigError> {
    let word = raw.trim().to_ascii_lowercase();
    if word.is_empty() {
        return Err(ConfigError::invalid(field, raw, "Entries must not be blank"));
    }
    let valid = word
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || (allow_hyphen && ch == '-'));
    if !valid {
        let reason = if allow_hyphen {
            "Expected ASCII letters, digits and hyphens only"
        } else {
            "Expected a single ASCII word"
        };
        return Err(ConfigError::invalid(field, raw, reason));
    }
    Ok(word)
}
