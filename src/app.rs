//! Application state and service initialization
//!
//! Centralizes service construction and dependency wiring so the binary
//! entry point stays small and the graph is visible in one place.

use std::sync::Arc;
use std::time::Duration;

use crate::model::Config;
use crate::retriever::ArticleRetriever;
use crate::service::{
    AnalysisService, ClaimExtractionService, LlmClient, Normalizer, SentimentClient, Synthesizer,
    VerifierService, VisionClient,
};

/// Startup failure
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),
}

/// Application state containing the analysis service graph
pub struct AppState {
    pub analysis: AnalysisService,
}

impl AppState {
    /// Initialize all services and build application state
    ///
    /// Requires `OPENAI_API_KEY`; everything else has working defaults.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let call_timeout = Duration::from_secs(config.pipeline.call_timeout_secs);

        let llm = Arc::new(
            LlmClient::new(&config.llm, call_timeout).map_err(AppError::MissingConfig)?,
        );
        let sentiment = Arc::new(SentimentClient::new(&config.inference, call_timeout));
        let vision = VisionClient::new(&config.inference, call_timeout);

        let normalizer = Normalizer::new(ArticleRetriever::new(), vision);
        let extractor = ClaimExtractionService::new(Arc::clone(&llm), config.pipeline.max_claims);
        let verifier = Arc::new(VerifierService::new(
            Arc::clone(&llm),
            sentiment,
            config.pipeline.resolution.clone(),
        ));
        let synthesizer = Synthesizer::new(llm);

        let analysis = AnalysisService::new(
            normalizer,
            extractor,
            verifier,
            synthesizer,
            config.pipeline.verify_concurrency,
        );

        tracing::info!(
            verify_concurrency = config.pipeline.verify_concurrency,
            max_claims = config.pipeline.max_claims,
            call_timeout_secs = config.pipeline.call_timeout_secs,
            "Analysis services initialized"
        );

        Ok(Self { analysis })
    }
}
