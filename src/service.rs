//! Tool-call handler core: match an objective, serve a question, grade an answer.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::items::{Difficulty, ItemBank, ItemError, ItemGenerator, McqItem};
use crate::mastery::{MasteryRecord, MasteryTracker, ResponseRecord};
use crate::store::{KvStore, StoreError};
use crate::topics::{MatchReport, TopicMatch, TopicMatcher, should_use_item_bank};

/// Key under which a generated item is stored.
#[must_use]
pub fn item_key(item_id: &str) -> String {
    format!("item:{}", urlencoding::encode(item_id))
}

/// Errors raised by [`QuizService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Item(#[from] ItemError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// `next_question` was called with nothing to match or generate from.
    #[error("objective is empty\n  Suggestion: Describe what the learner wants to practice")]
    EmptyObjective,

    /// Neither the bank nor the store knows the item.
    #[error("unknown item '{0}'")]
    UnknownItem(String),

    /// The chosen index is not one of the item's choices.
    #[error("choice {index} is out of range for item '{item_id}' ({choices} choices)")]
    InvalidChoice {
        item_id: String,
        index: usize,
        choices: usize,
    },
}

/// Where a served question came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemSource {
    Bank,
    Generated,
}

/// A question served for an objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub item: McqItem,
    pub source: ItemSource,
    pub report: MatchReport,
}

/// Outcome of grading one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedResponse {
    pub item_id: String,
    pub correct: bool,
    pub answer_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub mastery: MasteryRecord,
}

/// Combines the topic matcher, item bank, generator and mastery store.
pub struct QuizService<B, G, S> {
    matcher: TopicMatcher,
    bank: B,
    generator: G,
    tracker: MasteryTracker<S>,
}

impl<B, G, S> QuizService<B, G, S>
where
    B: ItemBank,
    G: ItemGenerator,
    S: KvStore,
{
    #[must_use]
    pub fn new(matcher: TopicMatcher, bank: B, generator: G, store: S) -> Self {
        Self {
            matcher,
            bank,
            generator,
            tracker: MasteryTracker::new(store),
        }
    }

    #[must_use]
    pub fn bank(&self) -> &B {
        &self.bank
    }

    #[must_use]
    pub fn tracker(&self) -> &MasteryTracker<S> {
        &self.tracker
    }

    fn resolve(&self, objective: &str) -> (TopicMatch, bool) {
        let topics = self.bank.topics();
        let result = self.matcher.match_topic(objective, topics.as_slice());
        let has_items = result.topic().is_some_and(|topic| self.bank.has_items(topic));
        (result, has_items)
    }

    /// Matches `objective` against the bank's topics.
    #[must_use]
    pub fn match_objective(&self, objective: &str) -> MatchReport {
        let (result, has_items) = self.resolve(objective);
        MatchReport::new(objective, &result, has_items)
    }

    /// Serves a question for `objective`.
    ///
    /// Bank items are used only when the match is confident enough and the
    /// topic has items; everything else goes to the generator, which receives
    /// the matched topic or, failing a match, the objective itself. Generated
    /// items are stored so their answers can be graded later.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EmptyObjective`] for a blank objective,
    /// [`ItemError::DuplicateItem`] if a generated id is already in the bank,
    /// and generator or store errors.
    #[instrument(skip(self), fields(objective = %objective))]
    pub async fn next_question(
        &self,
        objective: &str,
        difficulty: Difficulty,
    ) -> Result<QuestionResponse, ServiceError> {
        let objective = objective.trim();
        if objective.is_empty() {
            return Err(ServiceError::EmptyObjective);
        }

        let (result, has_items) = self.resolve(objective);
        let report = MatchReport::new(objective, &result, has_items);

        if should_use_item_bank(&result) && has_items {
            if let Some(item) = result
                .topic()
                .and_then(|topic| self.bank.pick(topic, difficulty))
            {
                debug!(item_id = %item.id, topic = %item.topic, "Serving bank item");
                return Ok(QuestionResponse {
                    item,
                    source: ItemSource::Bank,
                    report,
                });
            }
        }

        let target = result.topic().unwrap_or(objective);
        let item = self
            .generator
            .generate(target, difficulty)
            .await
            .inspect_err(|e| warn!(error = %e, target = %target, "Item generation failed"))?;

        // A generated id that shadows a bank item would never be graded
        // against the generated choices, since lookups try the bank first.
        if self.bank.find(&item.id).is_some() {
            warn!(item_id = %item.id, "Generated item id collides with a bank item");
            return Err(ItemError::DuplicateItem(item.id).into());
        }

        let key = item_key(&item.id);
        let value =
            serde_json::to_value(&item).map_err(|err| StoreError::corrupt_value(&key, &err))?;
        self.tracker.store().upsert(&key, &value).await?;

        info!(item_id = %item.id, target = %target, "Serving generated item");
        Ok(QuestionResponse {
            item,
            source: ItemSource::Generated,
            report,
        })
    }

    async fn find_item(&self, item_id: &str) -> Result<McqItem, ServiceError> {
        if let Some(item) = self.bank.find(item_id) {
            return Ok(item);
        }
        if item_id.trim().is_empty() {
            return Err(ServiceError::UnknownItem(item_id.to_string()));
        }

        let key = item_key(item_id);
        let Some(value) = self.tracker.store().read(&key).await? else {
            return Err(ServiceError::UnknownItem(item_id.to_string()));
        };
        serde_json::from_value(value)
            .map_err(|err| StoreError::corrupt_value(&key, &err).into())
    }

    /// Grades a learner's answer and records it against their mastery.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::UnknownItem`] if the item is in neither the
    /// bank nor the store, [`ServiceError::InvalidChoice`] for an index
    /// outside the item's choices, and store errors (including a blank
    /// learner id).
    #[instrument(skip(self))]
    pub async fn log_response(
        &self,
        learner_id: &str,
        item_id: &str,
        chosen_index: usize,
    ) -> Result<GradedResponse, ServiceError> {
        let item = self.find_item(item_id).await?;
        if chosen_index >= item.choices.len() {
            return Err(ServiceError::InvalidChoice {
                item_id: item.id,
                index: chosen_index,
                choices: item.choices.len(),
            });
        }

        let correct = item.is_correct(chosen_index);
        let mastery = self
            .tracker
            .record_response(&ResponseRecord {
                learner_id: learner_id.to_string(),
                item_id: item.id.clone(),
                topic: item.topic.clone(),
                chosen_index,
                correct,
            })
            .await?;

        Ok(GradedResponse {
            item_id: item.id,
            correct,
            answer_index: item.answer_index,
            explanation: item.explanation,
            mastery,
        })
    }
}

impl<B, G, S> std::fmt::Debug for QuizService<B, G, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizService")
            .field("matcher", &self.matcher)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::MatcherConfig;
    use crate::db::Database;
    use crate::items::InMemoryItemBank;
    use crate::items::test_support::item;
    use crate::store::SqliteKvStore;
    use crate::topics::MatchType;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records requested topics and returns a fixed item per call.
    #[derive(Default)]
    struct RecordingGenerator {
        requests: Mutex<Vec<(String, Difficulty)>>,
        fail: bool,
    }

    #[async_trait]
    impl ItemGenerator for RecordingGenerator {
        async fn generate(&self, topic: &str, difficulty: Difficulty) -> Result<McqItem, ItemError> {
            if self.fail {
                return Err(ItemError::generation(topic, "offline"));
            }
            let mut requests = self.requests.lock().unwrap();
            requests.push((topic.to_string(), difficulty));
            Ok(item(&format!("gen-{}", requests.len()), topic, difficulty))
        }
    }

    async fn service(
        generator: RecordingGenerator,
    ) -> QuizService<InMemoryItemBank, RecordingGenerator, SqliteKvStore> {
        let bank = InMemoryItemBank::new(vec![
            item("c1", "js-closures", Difficulty::Easy),
            item("h1", "react-hooks", Difficulty::Medium),
        ])
        .unwrap();
        let store = SqliteKvStore::new(Database::new_in_memory().await.unwrap());
        QuizService::new(TopicMatcher::new(MatcherConfig::default()), bank, generator, store)
    }

    #[tokio::test]
    async fn test_match_objective_fills_has_items() {
        let service = service(RecordingGenerator::default()).await;
        let report = service.match_objective("useEffect");
        assert_eq!(report.matched_topic.as_deref(), Some("react-hooks"));
        assert_eq!(report.match_type, MatchType::Alias);
        assert!(report.has_items);
        assert!(report.will_use_item_bank);
    }

    #[tokio::test]
    async fn test_next_question_serves_bank_item() {
        let service = service(RecordingGenerator::default()).await;
        let response = service.next_question("js-closures", Difficulty::Easy).await.unwrap();

        assert_eq!(response.source, ItemSource::Bank);
        assert_eq!(response.item.id, "c1");
        assert!(service.generator.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_next_question_generates_for_raw_objective_when_unmatched() {
        let service = service(RecordingGenerator::default()).await;
        let response = service
            .next_question("  xyzzy nonsense quantum ", Difficulty::Hard)
            .await
            .unwrap();

        assert_eq!(response.source, ItemSource::Generated);
        assert_eq!(response.report.match_type, MatchType::None);
        assert_eq!(
            *service.generator.requests.lock().unwrap(),
            [("xyzzy nonsense quantum".to_string(), Difficulty::Hard)]
        );
    }

    #[tokio::test]
    async fn test_generated_item_is_persisted_and_gradable() {
        let service = service(RecordingGenerator::default()).await;
        let response = service.next_question("xyzzy", Difficulty::Easy).await.unwrap();
        let item_id = response.item.id.clone();

        let stored = service.tracker().store().read(&item_key(&item_id)).await.unwrap();
        assert!(stored.is_some());

        let graded = service.log_response("ada", &item_id, 1).await.unwrap();
        assert!(graded.correct);
        assert_eq!(graded.mastery.attempts, 1);
    }

    #[tokio::test]
    async fn test_generated_id_shadowing_bank_item_is_rejected() {
        let bank =
            InMemoryItemBank::new(vec![item("gen-1", "js-closures", Difficulty::Easy)]).unwrap();
        let store = SqliteKvStore::new(Database::new_in_memory().await.unwrap());
        let service = QuizService::new(
            TopicMatcher::new(MatcherConfig::default()),
            bank,
            RecordingGenerator::default(),
            store,
        );

        let err = service.next_question("xyzzy", Difficulty::Easy).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Item(ItemError::DuplicateItem(ref id)) if id == "gen-1"
        ));
        let stored = service.tracker().store().read(&item_key("gen-1")).await.unwrap();
        assert!(stored.is_none());
        assert_eq!(service.find_item("gen-1").await.unwrap().topic, "js-closures");
    }

    #[test]
    fn test_item_key_escapes_separator() {
        assert_eq!(item_key("gen-1"), "item:gen-1");
        assert_eq!(item_key("a:b"), "item:a%3Ab");
    }

    #[tokio::test]
    async fn test_next_question_rejects_blank_objective() {
        let service = service(RecordingGenerator::default()).await;
        assert!(matches!(
            service.next_question("   ", Difficulty::Easy).await,
            Err(ServiceError::EmptyObjective)
        ));
    }

    #[tokio::test]
    async fn test_generator_failure_propagates() {
        let service = service(RecordingGenerator {
            fail: true,
            ..RecordingGenerator::default()
        })
        .await;
        let err = service.next_question("xyzzy", Difficulty::Easy).await.unwrap_err();
        assert!(matches!(err, ServiceError::Item(ItemError::Generation { .. })));
    }

    #[tokio::test]
    async fn test_log_response_grades_bank_item() {
        let service = service(RecordingGenerator::default()).await;
        let graded = service.log_response("ada", "h1", 0).await.unwrap();

        assert!(!graded.correct);
        assert_eq!(graded.answer_index, 1);
        assert_eq!(graded.mastery.topic, "react-hooks");
        assert!((graded.mastery.mastery - 0.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_log_response_errors() {
        let service = service(RecordingGenerator::default()).await;
        assert!(matches!(
            service.log_response("ada", "missing", 0).await,
            Err(ServiceError::UnknownItem(ref id)) if id == "missing"
        ));
        assert!(matches!(
            service.log_response("ada", "c1", 4).await,
            Err(ServiceError::InvalidChoice { index: 4, choices: 4, .. })
        ));
        assert!(matches!(
            service.log_response(" ", "c1", 0).await,
            Err(ServiceError::Store(StoreError::InvalidKey { .. }))
        ));
    }
}
