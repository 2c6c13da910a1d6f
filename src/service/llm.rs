//! Shared generative-model client
//!
//! Wraps the OpenAI-compatible provider behind a single text-generation
//! capability reused for claim extraction, query generation, verdict
//! analysis, and summarization. Calls are individually time-bounded and
//! tried against an ordered endpoint list: the provider default first,
//! then any configured alternates, short-circuiting on the first success.

use std::time::Duration;

use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::openai;

use crate::model::LlmConfig;

/// Environment variable for the API key
const ENV_API_KEY: &str = "OPENAI_API_KEY";

/// Environment variable to override the generation model
const ENV_MODEL: &str = "VERITAS_MODEL";

/// Default model for all text-generation calls
const DEFAULT_MODEL: &str = openai::GPT_4O_MINI;

/// Error for any upstream inference call
///
/// Absorbed at component boundaries: model failures degrade report quality
/// but never abort a request after normalization succeeds.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model call timed out")]
    Timeout,

    #[error("model call failed: {0}")]
    Upstream(String),

    #[error("model returned unusable output: {0}")]
    Unparseable(String),

    #[error("model client not configured")]
    NotConfigured,
}

/// Shared LLM client wrapper
#[derive(Clone)]
pub struct LlmClient {
    clients: Vec<openai::Client>,
    model: String,
    timeout: Duration,
}

impl LlmClient {
    /// Create a new LLM client from the environment and endpoint config
    ///
    /// Requires `OPENAI_API_KEY`; `VERITAS_MODEL` overrides the default
    /// model. Alternate base URLs from `LlmConfig` are appended to the
    /// endpoint list in order.
    pub fn new(config: &LlmConfig, timeout: Duration) -> Result<Self, String> {
        let api_key =
            std::env::var(ENV_API_KEY).map_err(|_| format!("missing {ENV_API_KEY}"))?;

        let mut clients = vec![openai::Client::new(&api_key)];

        for endpoint in &config.endpoints {
            match openai::Client::builder(&api_key).base_url(endpoint).build() {
                Ok(client) => clients.push(client),
                Err(e) => {
                    tracing::warn!(endpoint = %endpoint, error = %e, "Skipping unusable alternate endpoint");
                }
            }
        }

        let model = std::env::var(ENV_MODEL).unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        tracing::info!(
            model = %model,
            endpoints = clients.len(),
            "LLM client initialized"
        );

        Ok(Self {
            clients,
            model,
            timeout,
        })
    }

    /// Generate text for a prompt
    ///
    /// Tries each configured endpoint in order; a timeout or upstream
    /// error moves on to the next endpoint, and the last error is
    /// surfaced if all fail.
    pub async fn generate(
        &self,
        preamble: &str,
        prompt: &str,
        max_tokens: u64,
    ) -> Result<String, ModelError> {
        let mut last_error = ModelError::NotConfigured;

        for (idx, client) in self.clients.iter().enumerate() {
            let agent = client
                .agent(&self.model)
                .preamble(preamble)
                .max_tokens(max_tokens)
                .temperature(0.2)
                .build();

            match tokio::time::timeout(self.timeout, agent.prompt(prompt)).await {
                Ok(Ok(text)) => {
                    if idx > 0 {
                        tracing::debug!(endpoint_index = idx, "Alternate endpoint succeeded");
                    }
                    return Ok(text);
                }
                Ok(Err(e)) => {
                    tracing::debug!(
                        endpoint_index = idx,
                        error = %e,
                        "Generation failed, trying next endpoint"
                    );
                    last_error = ModelError::Upstream(e.to_string());
                }
                Err(_) => {
                    tracing::debug!(
                        endpoint_index = idx,
                        timeout_secs = self.timeout.as_secs(),
                        "Generation timed out, trying next endpoint"
                    );
                    last_error = ModelError::Timeout;
                }
            }
        }

        Err(last_error)
    }
}
