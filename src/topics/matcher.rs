//! Topic matcher: runs the stage cascade over a caller-supplied topic list.

use tracing::{debug, instrument};

use crate::config::MatcherConfig;

use super::result::TopicMatch;
use super::stages::{
    AliasStage, ExactStage, FuzzyFallbackStage, FuzzyStage, KeywordStage, MatchContext, MatchStage,
};

/// Resolves free-text objectives to curated topic identifiers.
///
/// Stages run in registration order and the first claim wins. The default
/// cascade is exact → alias → fuzzy → keyword → fuzzy fallback.
///
/// The matcher holds no per-call state; one instance can serve concurrent
/// callers.
pub struct TopicMatcher {
    config: MatcherConfig,
    stages: Vec<Box<dyn MatchStage>>,
}

impl TopicMatcher {
    /// Creates a matcher with the default stage cascade.
    #[must_use]
    pub fn new(config: MatcherConfig) -> Self {
        let mut matcher = Self::with_stages(config, Vec::new());
        matcher.register(Box::new(ExactStage));
        matcher.register(Box::new(AliasStage));
        matcher.register(Box::new(FuzzyStage));
        matcher.register(Box::new(KeywordStage));
        matcher.register(Box::new(FuzzyFallbackStage));
        matcher
    }

    /// Creates a matcher running exactly `stages`, in order.
    #[must_use]
    pub fn with_stages(config: MatcherConfig, stages: Vec<Box<dyn MatchStage>>) -> Self {
        Self { config, stages }
    }

    /// Appends a stage to the end of the cascade.
    pub fn register(&mut self, stage: Box<dyn MatchStage>) {
        debug!(stage = stage.name(), position = self.stages.len(), "Registering match stage");
        self.stages.push(stage);
    }

    #[must_use]
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Returns stage names in cascade order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Matches `objective` against `topics`.
    ///
    /// Never fails: blank objectives, empty topic lists and duplicate topics
    /// all degrade to [`TopicMatch::None`] or a low-confidence match.
    #[must_use]
    #[instrument(skip(self, topics), fields(topic_count = topics.len()))]
    pub fn match_topic<S: AsRef<str>>(&self, objective: &str, topics: &[S]) -> TopicMatch {
        if objective.trim().is_empty() {
            debug!("Blank objective; no match");
            return TopicMatch::None;
        }

        let ctx = MatchContext::new(&self.config, objective, topics);
        if ctx.normalized().is_empty() {
            debug!("Objective normalizes to nothing; no match");
            return TopicMatch::None;
        }

        for stage in &self.stages {
            if let Some(result) = stage.evaluate(&ctx) {
                debug!(
                    stage = stage.name(),
                    topic = result.topic().unwrap_or_default(),
                    confidence = result.confidence(),
                    "Objective matched"
                );
                return result;
            }
        }

        debug!("No stage matched");
        TopicMatch::None
    }
}

impl Default for TopicMatcher {
    fn default() -> Self {
        Self::new(MatcherConfig::default())
    }
}

impl std::fmt::Debug for TopicMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopicMatcher")
            .field("stages", &self.stage_names())
            .field("aliases", &self.config.aliases().len())
            .finish_non_exhaustive()
    }
}
