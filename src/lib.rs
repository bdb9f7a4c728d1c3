//! Quizmatch Core Library
//!
//! This library maps a learner's free-text objective ("help me with
//! useEffect") onto a catalog topic id ("react-hooks") and decides whether
//! the question should come from the curated item bank or be generated.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`topics`] - Objective normalization and the staged topic matcher
//! - [`config`] - Injected matcher tables (aliases, subject words)
//! - [`items`] - Multiple-choice items, the item bank and item generation
//! - [`db`] - Database connection and schema management
//! - [`store`] - Key-value persistence
//! - [`mastery`] - Per-learner mastery counters and response log
//! - [`service`] - The quiz service tying the pieces together

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod db;
pub mod items;
pub mod mastery;
pub mod service;
pub mod store;
pub mod topics;

// Re-export commonly used types
pub use config::{ConfigError, MatcherConfig};
pub use db::{Database, DatabaseOptions, DbError};
pub use items::{
    Difficulty, GeneratorConfig, HttpItemGenerator, InMemoryItemBank, ItemBank, ItemError,
    ItemGenerator, McqItem,
};
pub use mastery::{MasteryRecord, MasteryTracker, ResponseRecord};
pub use service::{GradedResponse, ItemSource, QuestionResponse, QuizService, ServiceError};
pub use store::{KvStore, SqliteKvStore, StoreError};
pub use topics::{MatchReport, MatchType, TopicMatch, TopicMatcher, should_use_item_bank};
