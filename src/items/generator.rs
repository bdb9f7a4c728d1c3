//! On-demand item generation.
//!
//! The [`ItemGenerator`] seam hides how a fresh item is produced. The bundled
//! [`HttpItemGenerator`] POSTs `{ "topic", "difficulty" }` to a configured
//! endpoint and expects a single [`McqItem`] back.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Difficulty, ItemError, McqItem};

/// Default request timeout for the HTTP generator, in seconds.
pub const DEFAULT_GENERATOR_TIMEOUT_SECS: u64 = 30;

/// Produces one multiple-choice item for a topic.
#[async_trait]
pub trait ItemGenerator: Send + Sync {
    /// Generates an item for `topic` at `difficulty`.
    ///
    /// `topic` is either a catalog topic id or, when nothing matched, the
    /// learner's raw objective text.
    async fn generate(&self, topic: &str, difficulty: Difficulty) -> Result<McqItem, ItemError>;
}

/// Settings for [`HttpItemGenerator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_GENERATOR_TIMEOUT_SECS
}

impl GeneratorConfig {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout_secs: DEFAULT_GENERATOR_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    topic: &'a str,
    difficulty: Difficulty,
}

/// [`ItemGenerator`] backed by a remote HTTP service.
pub struct HttpItemGenerator {
    client: Client,
    config: GeneratorConfig,
}

impl HttpItemGenerator {
    /// Creates a generator for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::Generation`] if the endpoint is blank, the timeout
    /// is zero, or the HTTP client cannot be built.
    #[tracing::instrument(skip_all, fields(endpoint = %config.endpoint))]
    pub fn new(config: GeneratorConfig) -> Result<Self, ItemError> {
        if config.endpoint.trim().is_empty() {
            return Err(ItemError::generation("", "generator endpoint is blank"));
        }
        if config.timeout_secs == 0 {
            return Err(ItemError::generation("", "generator timeout must be positive"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ItemError::generation("", format!("cannot build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }
}

impl std::fmt::Debug for HttpItemGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpItemGenerator")
            .field("endpoint", &self.config.endpoint)
            .field("timeout_secs", &self.config.timeout_secs)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ItemGenerator for HttpItemGenerator {
    #[tracing::instrument(skip(self), fields(generator = "http"))]
    async fn generate(&self, topic: &str, difficulty: Difficulty) -> Result<McqItem, ItemError> {
        let request = GenerateRequest { topic, difficulty };

        debug!(endpoint = %self.config.endpoint, "Requesting generated item");

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Generator request failed");
                let reason = if e.is_timeout() {
                    "generator timed out".to_string()
                } else {
                    "cannot reach generator. Check the endpoint and your network connection."
                        .to_string()
                };
                ItemError::generation(topic, reason)
            })?;

        let status = response.status();
        if !status.is_success() {
            let reason = match status.as_u16() {
                429 => "generator rate limit exceeded. Try again in a few seconds.".to_string(),
                s if s >= 500 => "generator unavailable. Try again later.".to_string(),
                s => format!("generator returned HTTP {s}"),
            };
            debug!(status = status.as_u16(), %reason, "Generator error");
            return Err(ItemError::generation(topic, reason));
        }

        let item = response.json::<McqItem>().await.map_err(|e| {
            warn!(error = %e, "Failed to parse generated item JSON");
            ItemError::generation(topic, "unexpected generator response format")
        })?;

        item.validate()
            .inspect_err(|e| warn!(error = %e, "Generator returned an invalid item"))?;

        debug!(item_id = %item.id, "Generated item");
        Ok(item)
    }
}
