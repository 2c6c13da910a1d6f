//! Per-claim evidence verification
//!
//! `verify` is total: every claim comes back with a verdict, a confidence,
//! and an explanation, no matter which upstream calls died on the way.
//! When the primary verdict model returns clean JSON with a recognized
//! label, that label wins. Otherwise the deterministic resolution table
//! takes over: lexical markers over the raw output first, then the
//! secondary sentiment classifier, then the insufficient-info default.

use std::sync::Arc;

use crate::model::{decode, Claim, ResolutionPolicy, Verdict};
use crate::service::llm::LlmClient;
use crate::service::sentiment::SentimentClient;

/// System prompt for query generation
const QUERY_PREAMBLE: &str = "You generate short web search queries for fact-checking. \
Respond with up to 3 queries, one per line, nothing else.";

/// System prompt for the primary verdict call
const VERDICT_PREAMBLE: &str = "You are a meticulous fact verifier. You analyze a single \
claim and respond with a JSON object of this exact shape: {\"verdict\": \
\"Supported|Contradicted|Mixed|InsufficientInfo\", \"confidence\": 0.0-1.0, \
\"explanation\": \"detailed explanation of your analysis\"}. Respond with the JSON object \
only.";

/// Service that assigns a verdict to each extracted claim
pub struct VerifierService {
    llm: Arc<LlmClient>,
    sentiment: Arc<SentimentClient>,
    policy: ResolutionPolicy,
}

impl VerifierService {
    pub fn new(
        llm: Arc<LlmClient>,
        sentiment: Arc<SentimentClient>,
        policy: ResolutionPolicy,
    ) -> Self {
        Self {
            llm,
            sentiment,
            policy,
        }
    }

    /// Verify a single claim
    ///
    /// Never fails: verification trouble degrades to `InsufficientInfo`
    /// instead of aborting the pipeline.
    pub async fn verify(&self, claim_text: &str) -> Claim {
        let queries = self.generate_queries(claim_text).await;

        let primary = match self.call_verdict_model(claim_text, &queries).await {
            Ok(output) => Some(output),
            Err(e) => {
                tracing::warn!(error = %e, "Primary verdict call failed, falling back to cross-check");
                None
            }
        };

        // Structured path: clean JSON with a recognized label wins.
        if let Some(output) = &primary {
            if let Some((verdict, confidence, explanation)) =
                parse_structured_verdict(output, self.policy.default_confidence)
            {
                return Claim::new(claim_text, verdict, confidence, explanation);
            }
        }

        // Lexical markers over the ambiguous output.
        if let Some(output) = &primary {
            if let Some((verdict, confidence)) = self.policy.match_markers(output) {
                tracing::debug!(verdict = ?verdict, "Claim resolved by lexical marker");
                return Claim::new(
                    claim_text,
                    verdict,
                    confidence,
                    decode::clean_model_text(output),
                );
            }
        }

        // Sentiment cross-check.
        match self.sentiment.classify(claim_text).await {
            Ok(score) => {
                if let Some((verdict, confidence)) = self.policy.match_sentiment(score) {
                    tracing::debug!(score = score, verdict = ?verdict, "Claim resolved by sentiment cross-check");
                    return Claim::new(claim_text, verdict, confidence, "");
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "Sentiment cross-check unavailable");
            }
        }

        Claim::new(
            claim_text,
            Verdict::InsufficientInfo,
            self.policy.default_confidence,
            "",
        )
    }

    /// Generate search queries for a claim; the raw claim stands in when
    /// generation fails.
    async fn generate_queries(&self, claim_text: &str) -> Vec<String> {
        let prompt = format!(
            "Generate specific search queries to verify this claim: {}",
            claim_text
        );

        match self.llm.generate(QUERY_PREAMBLE, &prompt, 256).await {
            Ok(response) => {
                let queries: Vec<String> = response
                    .lines()
                    .map(|line| line.trim().trim_start_matches(['-', '*', ' ']).to_string())
                    .filter(|line| !line.is_empty())
                    .take(3)
                    .collect();

                if queries.is_empty() {
                    vec![claim_text.to_string()]
                } else {
                    queries
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "Query generation failed, using raw claim");
                vec![claim_text.to_string()]
            }
        }
    }

    async fn call_verdict_model(
        &self,
        claim_text: &str,
        queries: &[String],
    ) -> Result<String, crate::service::llm::ModelError> {
        let prompt = format!(
            "Perform a fact-check analysis of the following claim.\n\n\
             Claim: {}\n\n\
             Relevant verification angles:\n{}\n\n\
             Consider source credibility patterns, historical precedent, logical \
             consistency, and common misinformation indicators.",
            claim_text,
            queries
                .iter()
                .map(|q| format!("- {}", q))
                .collect::<Vec<_>>()
                .join("\n")
        );

        self.llm.generate(VERDICT_PREAMBLE, &prompt, 1024).await
    }
}

/// Parse the primary model's structured output
///
/// Returns `None` when no JSON object is present or the verdict label
/// falls outside the closed set, handing resolution to the marker table.
pub fn parse_structured_verdict(
    output: &str,
    default_confidence: f64,
) -> Option<(Verdict, f64, String)> {
    let value = decode::extract_json_object(output)?;
    let label = decode::coerce_string(value.get("verdict"), "");
    let verdict = Verdict::parse_label(&label)?;

    let confidence = decode::coerce_unit(value.get("confidence"), default_confidence);
    let explanation = decode::coerce_string(value.get("explanation"), "");

    Some((verdict, confidence, explanation))
}

impl ResolutionPolicy {
    /// Scan ambiguous model output for lexical verdict markers
    ///
    /// Negative markers are checked before positive ones.
    pub fn match_markers(&self, output: &str) -> Option<(Verdict, f64)> {
        let lowered = output.to_lowercase();

        if self.negative_markers.iter().any(|m| lowered.contains(m)) {
            return Some((Verdict::Contradicted, self.marker_confidence));
        }
        if self.positive_markers.iter().any(|m| lowered.contains(m)) {
            return Some((Verdict::Supported, self.marker_confidence));
        }
        None
    }

    /// Resolve from the secondary sentiment score
    pub fn match_sentiment(&self, score: f64) -> Option<(Verdict, f64)> {
        if score < self.sentiment_low {
            return Some((Verdict::Contradicted, self.sentiment_confidence));
        }
        if score > self.sentiment_high {
            return Some((Verdict::Supported, self.sentiment_confidence));
        }
        None
    }
}
