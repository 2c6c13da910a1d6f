//! Report synthesis
//!
//! Folds the verified claims into the final report: a confidence-weighted
//! score, the banded verdict label, and a prose summary. Summary
//! generation leans on the generative model but can never fail the
//! request; the per-band canned sentence stands in.

use std::sync::Arc;

use crate::model::{verdict_label, Claim, Report, Verdict};
use crate::service::llm::LlmClient;

/// System prompt for the summary call
const SUMMARY_PREAMBLE: &str = "You are a fact-checking analyst. Given per-claim findings, \
you write a 2-3 sentence plain-prose summary of the overall credibility picture. No JSON, \
no lists, no headers.";

/// Canned summaries, one per score band, used when summarization fails
const BAND_SUMMARIES: &[(u8, &str)] = &[
    (
        80,
        "The analyzed content is well supported: the majority of its claims are consistent \
         with available evidence.",
    ),
    (
        60,
        "Most claims in the analyzed content appear to be supported by available evidence, \
         though some aspects could not be fully verified.",
    ),
    (
        40,
        "The analyzed content contains a mix of supported and questionable information; \
         individual claims vary in reliability.",
    ),
    (
        20,
        "Significant portions of the analyzed content appear to contradict available \
         evidence; treat it with caution.",
    ),
    (
        0,
        "The analyzed content is largely contradicted by available evidence and is unlikely \
         to be reliable.",
    ),
];

/// Aggregates verified claims into the final report
pub struct Synthesizer {
    llm: Arc<LlmClient>,
}

impl Synthesizer {
    pub fn new(llm: Arc<LlmClient>) -> Self {
        Self { llm }
    }

    /// Synthesize the final report from verified claims
    ///
    /// An empty claim list is replaced by the single placeholder claim, so
    /// the breakdown is never empty.
    pub async fn synthesize(&self, claims: Vec<Claim>, context: Option<String>) -> Report {
        let breakdown = if claims.is_empty() {
            tracing::debug!("No verified claims, substituting placeholder");
            vec![Claim::placeholder()]
        } else {
            claims
        };

        let score = score_claims(&breakdown);
        let overall_verdict = verdict_label(score).to_string();

        let summary = match self.generate_summary(&breakdown).await {
            Some(summary) => summary,
            None => band_summary(score).to_string(),
        };

        tracing::info!(
            score = score,
            verdict = %overall_verdict,
            claim_count = breakdown.len(),
            "Report synthesized"
        );

        Report {
            score,
            overall_verdict,
            summary,
            breakdown,
            context,
        }
    }

    /// Summarize the per-claim findings; `None` hands off to the canned
    /// band sentence.
    async fn generate_summary(&self, breakdown: &[Claim]) -> Option<String> {
        let findings = breakdown
            .iter()
            .map(|c| format!("Claim: {}\nVerdict: {:?}\nExplanation: {}", c.text, c.verdict, c.explanation))
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = format!(
            "Summarize the overall credibility picture from these fact-check findings:\n\n{}",
            findings
        );

        match self.llm.generate(SUMMARY_PREAMBLE, &prompt, 512).await {
            Ok(summary) if !summary.trim().is_empty() => Some(summary.trim().to_string()),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Summary generation failed, using band fallback");
                None
            }
        }
    }
}

/// Confidence-weighted credibility score in [0, 100]
///
/// net = (Σ confidence over Supported − Σ confidence over Contradicted) / n,
/// rescaled from [−1, 1] into [0, 100]. Mixed and InsufficientInfo claims
/// contribute nothing to the numerator but widen the denominator.
pub fn score_claims(claims: &[Claim]) -> u8 {
    if claims.is_empty() {
        return 50;
    }

    let n = claims.len() as f64;
    let supported: f64 = claims
        .iter()
        .filter(|c| c.verdict == Verdict::Supported)
        .map(|c| c.confidence)
        .sum();
    let contradicted: f64 = claims
        .iter()
        .filter(|c| c.verdict == Verdict::Contradicted)
        .map(|c| c.confidence)
        .sum();

    let net = (supported - contradicted) / n;
    ((net + 1.0) / 2.0 * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Canned summary for a score band
pub fn band_summary(score: u8) -> &'static str {
    for (floor, summary) in BAND_SUMMARIES {
        if score >= *floor {
            return summary;
        }
    }
    BAND_SUMMARIES[BAND_SUMMARIES.len() - 1].1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::verdict_label;

    fn claim(verdict: Verdict, confidence: f64) -> Claim {
        Claim::new("test claim", verdict, confidence, "explanation")
    }

    #[test]
    fn test_single_supported_full_confidence_scores_100() {
        let claims = vec![claim(Verdict::Supported, 1.0)];
        let score = score_claims(&claims);
        assert_eq!(score, 100);
        assert_eq!(verdict_label(score), "Highly Reliable");
    }

    #[test]
    fn test_single_contradicted_full_confidence_scores_0() {
        let claims = vec![claim(Verdict::Contradicted, 1.0)];
        let score = score_claims(&claims);
        assert_eq!(score, 0);
        assert_eq!(verdict_label(score), "Unreliable");
    }

    #[test]
    fn test_balanced_claims_score_50() {
        // "The Earth revolves around the Sun." / "Vaccines cause autism."
        let claims = vec![
            Claim::new(
                "The Earth revolves around the Sun.",
                Verdict::Supported,
                0.75,
                "Heliocentrism is settled science.",
            ),
            Claim::new(
                "Vaccines cause autism.",
                Verdict::Contradicted,
                0.75,
                "Repeatedly refuted by large-scale studies.",
            ),
        ];
        let score = score_claims(&claims);
        assert_eq!(score, 50);
        assert_eq!(verdict_label(score), "Mixed Reliability");
    }

    #[test]
    fn test_neutral_verdicts_dilute_the_score() {
        let claims = vec![
            claim(Verdict::Supported, 1.0),
            claim(Verdict::InsufficientInfo, 0.5),
            claim(Verdict::Mixed, 0.5),
        ];
        // net = 1.0 / 3 -> score = round((1/3 + 1) / 2 * 100) = 67
        assert_eq!(score_claims(&claims), 67);
    }

    #[test]
    fn test_all_insufficient_scores_50() {
        let claims = vec![
            claim(Verdict::InsufficientInfo, 0.5),
            claim(Verdict::InsufficientInfo, 0.5),
        ];
        assert_eq!(score_claims(&claims), 50);
    }

    #[test]
    fn test_score_is_deterministic() {
        let claims = vec![
            claim(Verdict::Supported, 0.6),
            claim(Verdict::Contradicted, 0.75),
            claim(Verdict::InsufficientInfo, 0.5),
        ];
        let first = score_claims(&claims);
        for _ in 0..10 {
            assert_eq!(score_claims(&claims), first);
        }
    }

    #[test]
    fn test_band_summary_selection() {
        assert!(band_summary(95).contains("well supported"));
        assert!(band_summary(65).contains("Most claims"));
        assert!(band_summary(50).contains("mix of supported"));
        assert!(band_summary(25).contains("contradict"));
        assert!(band_summary(5).contains("largely contradicted"));
    }
}
