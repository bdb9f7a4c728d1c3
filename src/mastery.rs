//! Per-learner mastery counters and the last-response log.
//!
//! Both live in the key-value store:
//! - `mastery:{learner}:{topic}` holds a [`MasteryRecord`]
//! - `response:{learner}:{item_id}` holds the latest [`ResponseRecord`]
//!
//! Each id is percent-encoded inside the key, so a `:` in an id cannot
//! shift the boundary between learner and topic.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};
use urlencoding::encode as escape;

use crate::store::{KvStore, Result, StoreError};

/// Key under which a learner's mastery of a topic is stored.
#[must_use]
pub fn mastery_key(learner_id: &str, topic: &str) -> String {
    format!("mastery:{}:{}", escape(learner_id), escape(topic))
}

/// Key under which a learner's last response to an item is stored.
#[must_use]
pub fn response_key(learner_id: &str, item_id: &str) -> String {
    format!("response:{}:{}", escape(learner_id), escape(item_id))
}

/// Attempt counters for one learner on one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasteryRecord {
    pub learner_id: String,
    pub topic: String,
    pub attempts: u32,
    pub correct: u32,
    /// `correct / attempts`, or 0 before the first attempt.
    pub mastery: f64,
}

impl MasteryRecord {
    /// A record with no attempts.
    #[must_use]
    pub fn empty(learner_id: &str, topic: &str) -> Self {
        Self {
            learner_id: learner_id.to_string(),
            topic: topic.to_string(),
            attempts: 0,
            correct: 0,
            mastery: 0.0,
        }
    }

    /// Counts one more attempt and recomputes `mastery`.
    pub fn record_attempt(&mut self, correct: bool) {
        self.attempts = self.attempts.saturating_add(1);
        if correct {
            self.correct = self.correct.saturating_add(1);
        }
        self.mastery = f64::from(self.correct) / f64::from(self.attempts);
    }
}

/// One graded answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub learner_id: String,
    pub item_id: String,
    pub topic: String,
    pub chosen_index: usize,
    pub correct: bool,
}

/// Reads and updates mastery through a [`KvStore`].
#[derive(Debug, Clone)]
pub struct MasteryTracker<S> {
    store: S,
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StoreError::invalid_key(format!("{field} is blank")));
    }
    Ok(())
}

fn encode<T: Serialize>(key: &str, value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|err| StoreError::corrupt_value(key, &err))
}

impl<S: KvStore> MasteryTracker<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the learner's mastery of `topic`, zeroed when never attempted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKey`] for a blank learner or topic, and
    /// store errors from the read.
    #[instrument(skip(self))]
    pub async fn mastery(&self, learner_id: &str, topic: &str) -> Result<MasteryRecord> {
        require("learner id", learner_id)?;
        require("topic", topic)?;

        let key = mastery_key(learner_id, topic);
        match self.store.read(&key).await? {
            Some(value) => {
                serde_json::from_value(value).map_err(|err| StoreError::corrupt_value(&key, &err))
            }
            None => Ok(MasteryRecord::empty(learner_id, topic)),
        }
    }

    /// Records a graded response and returns the updated mastery.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKey`] for a blank learner, topic or item
    /// id, and store errors from the reads and writes.
    #[instrument(skip(self, response), fields(learner = %response.learner_id, item = %response.item_id))]
    pub async fn record_response(&self, response: &ResponseRecord) -> Result<MasteryRecord> {
        require("item id", &response.item_id)?;
        let mut record = self.mastery(&response.learner_id, &response.topic).await?;
        record.record_attempt(response.correct);

        let key = mastery_key(&response.learner_id, &response.topic);
        self.store.upsert(&key, &encode(&key, &record)?).await?;

        let key = response_key(&response.learner_id, &response.item_id);
        self.store.upsert(&key, &encode(&key, response)?).await?;

        debug!(
            topic = %record.topic,
            attempts = record.attempts,
            mastery = record.mastery,
            "Recorded response"
        );
        Ok(record)
    }

    /// Returns the learner's last response to `item_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKey`] for blank ids, and store errors
    /// from the read.
    pub async fn last_response(
        &self,
        learner_id: &str,
        item_id: &str,
    ) -> Result<Option<ResponseRecord>> {
        require("learner id", learner_id)?;
        require("item id", item_id)?;

        let key = response_key(learner_id, item_id);
        self.store
            .read(&key)
            .await?
            .map(|value| {
                serde_json::from_value(value).map_err(|err| StoreError::corrupt_value(&key, &err))
            })
            .transpose()
    }
}
