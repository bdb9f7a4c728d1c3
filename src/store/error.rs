//! Error types for key-value store operations.

use std::fmt;

use sqlx::error::ErrorKind;
use thiserror::Error;

/// Coarse classification of `sqlx` failures, so callers can tell
/// transient contention from real faults without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreDbErrorKind {
    /// Another writer holds the lock; retrying may succeed.
    BusyOrLocked,
    /// A CHECK / UNIQUE / NOT NULL constraint rejected the row.
    ConstraintViolation,
    /// The pool is closed, exhausted, or the file could not be reached.
    Unavailable,
    Other,
}

impl StoreDbErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BusyOrLocked => "busy_or_locked",
            Self::ConstraintViolation => "constraint_violation",
            Self::Unavailable => "unavailable",
            Self::Other => "other",
        }
    }
}

impl From<&sqlx::Error> for StoreDbErrorKind {
    fn from(error: &sqlx::Error) -> Self {
        match error {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::Unavailable
            }
            sqlx::Error::Database(db_error) => {
                let code = db_error.code().unwrap_or_default();
                // Primary result codes 5 and 6 are SQLITE_BUSY and SQLITE_LOCKED.
                let busy = matches!(&*code, "5" | "6" | "SQLITE_BUSY" | "SQLITE_LOCKED")
                    || db_error.message().to_ascii_lowercase().contains("database is locked");
                if busy {
                    Self::BusyOrLocked
                } else if !matches!(db_error.kind(), ErrorKind::Other)
                    || code.starts_with("SQLITE_CONSTRAINT")
                {
                    Self::ConstraintViolation
                } else {
                    Self::Other
                }
            }
            _ => Self::Other,
        }
    }
}

impl fmt::Display for StoreDbErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during store operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("store database error ({kind}): {message}")]
    Database {
        kind: StoreDbErrorKind,
        message: String,
    },

    /// A key component was blank.
    #[error("invalid store key: {reason}\n  Suggestion: Provide non-empty learner, topic and item identifiers")]
    InvalidKey { reason: String },

    /// A stored value could not be encoded or decoded.
    #[error("corrupt value under key '{key}': {message}")]
    CorruptValue { key: String, message: String },
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database {
            kind: StoreDbErrorKind::from(&err),
            message: err.to_string(),
        }
    }
}

impl StoreError {
    #[must_use]
    pub fn invalid_key(reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn corrupt_value(key: &str, err: &serde_json::Error) -> Self {
        Self::CorruptValue {
            key: key.to_owned(),
            message: format!("{err}"),
        }
    }

    /// The database classification, if this came from `sqlx`.
    #[must_use]
    pub fn database_kind(&self) -> Option<StoreDbErrorKind> {
        if let Self::Database { kind, .. } = self {
            Some(*kind)
        } else {
            None
        }
    }

    /// True for lock contention that a retry may clear.
    #[must_use]
    pub fn is_busy_or_locked(&self) -> bool {
        matches!(self.database_kind(), Some(StoreDbErrorKind::BusyOrLocked))
    }
}
