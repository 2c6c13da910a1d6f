//! Fact-checking pipeline orchestration
//!
//! Normalizer -> Claim Extractor -> Evidence Verifier (bounded concurrent
//! fan-out, order preserved) -> Synthesizer. Once normalization succeeds
//! the pipeline always produces a report: model trouble degrades quality,
//! and an unexpected internal failure is logged and swapped for the
//! minimal fallback report.

use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::model::{Claim, InputKind, Report};
use crate::service::extraction::ClaimExtractionService;
use crate::service::normalize::{CanonicalText, NormalizeError, Normalizer};
use crate::service::synthesis::Synthesizer;
use crate::service::verifier::VerifierService;

/// Internal failure after normalization; never escapes as an error
#[derive(Debug, thiserror::Error)]
enum PipelineError {
    #[error("malformed intermediate state: {0}")]
    MalformedState(String),
}

/// End-to-end analysis service
///
/// Stateless per invocation: there is no shared mutable state between
/// concurrent claim verifications, and nothing outlives the request. All
/// verification futures live inside the request future, so cancelling the
/// request cancels them cooperatively.
pub struct AnalysisService {
    normalizer: Normalizer,
    extractor: ClaimExtractionService,
    verifier: Arc<VerifierService>,
    synthesizer: Synthesizer,
    verify_concurrency: usize,
}

impl AnalysisService {
    pub fn new(
        normalizer: Normalizer,
        extractor: ClaimExtractionService,
        verifier: Arc<VerifierService>,
        synthesizer: Synthesizer,
        verify_concurrency: usize,
    ) -> Self {
        Self {
            normalizer,
            extractor,
            verifier,
            synthesizer,
            verify_concurrency: verify_concurrency.max(1),
        }
    }

    /// Run the full pipeline for one request
    ///
    /// Only input rejection (`EmptyInput`, `Fetch`) surfaces as an error;
    /// every later failure is absorbed into the report.
    pub async fn run(&self, kind: InputKind, payload: &str) -> Result<Report, NormalizeError> {
        let canonical = self.normalizer.normalize(kind, payload).await?;

        tracing::debug!(
            kind = ?kind,
            text_length = canonical.text.len(),
            "Input normalized, starting analysis"
        );

        match self.analyze(canonical).await {
            Ok(report) => Ok(report),
            Err(e) => {
                tracing::error!(error = %e, "Pipeline failed internally, returning fallback report");
                Ok(Report::fallback())
            }
        }
    }

    async fn analyze(&self, canonical: CanonicalText) -> Result<Report, PipelineError> {
        let CanonicalText { text, context } = canonical;

        if text.trim().is_empty() {
            return Err(PipelineError::MalformedState(
                "normalizer produced blank canonical text".to_string(),
            ));
        }

        let claim_texts = self.extractor.extract(&text).await;

        tracing::debug!(claim_count = claim_texts.len(), "Verifying claims");

        // Bounded fan-out over I/O-bound verifications. `buffered` keeps
        // extraction order in the output, so the breakdown order matches
        // the input text.
        let verified: Vec<Claim> = stream::iter(claim_texts)
            .map(|claim_text| {
                let verifier = Arc::clone(&self.verifier);
                async move { verifier.verify(&claim_text).await }
            })
            .buffered(self.verify_concurrency)
            .collect()
            .await;

        let report = self.synthesizer.synthesize(verified, context).await;

        if report.breakdown.is_empty() {
            return Err(PipelineError::MalformedState(
                "synthesizer produced an empty breakdown".to_string(),
            ));
        }

        Ok(report)
    }
}
