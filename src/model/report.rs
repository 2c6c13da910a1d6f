//! Report and claim data contract shared with the presentation layer

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Placeholder claim text used when no checkable claim could be identified
pub const PLACEHOLDER_CLAIM: &str = "General content analysis";

/// Explanation attached to the placeholder claim
pub const PLACEHOLDER_EXPLANATION: &str =
    "No specific factual claims could be identified in the provided content.";

/// Truth status assigned to a single claim
///
/// Closed enumeration: upstream labels that do not match a variant are
/// mapped to `InsufficientInfo` rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Verdict {
    Supported,
    Contradicted,
    Mixed,
    InsufficientInfo,
}

impl Verdict {
    /// Strict parse of an upstream verdict label. Returns `None` for
    /// anything outside the closed set.
    pub fn parse_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();

        match normalized.as_str() {
            "supported" => Some(Self::Supported),
            "contradicted" => Some(Self::Contradicted),
            "mixed" => Some(Self::Mixed),
            "insufficientinfo" | "insufficientinformation" => Some(Self::InsufficientInfo),
            _ => None,
        }
    }

    /// Canned explanation used when the upstream explanation is missing
    /// or blank.
    pub fn fallback_explanation(&self) -> &'static str {
        match self {
            Self::Supported => "Available evidence supports this claim.",
            Self::Contradicted => "Available evidence contradicts this claim.",
            Self::Mixed => "Available evidence both supports and contradicts parts of this claim.",
            Self::InsufficientInfo => {
                "There is not enough reliable information to verify this claim."
            }
        }
    }
}

/// A single verified claim in the report breakdown
///
/// `confidence` is used only for aggregation and is never serialized to
/// the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claim {
    #[serde(rename = "claim")]
    pub text: String,
    pub verdict: Verdict,
    #[serde(skip)]
    pub confidence: f64,
    #[serde(default)]
    pub explanation: String,
}

impl Claim {
    /// Build a claim, enforcing the non-empty invariants: blank text gets
    /// the placeholder label, a blank explanation falls back to the
    /// verdict-specific canned sentence, and confidence is clamped to
    /// [0, 1].
    pub fn new(
        text: impl Into<String>,
        verdict: Verdict,
        confidence: f64,
        explanation: impl Into<String>,
    ) -> Self {
        let text = text.into();
        let text = if text.trim().is_empty() {
            PLACEHOLDER_CLAIM.to_string()
        } else {
            text
        };

        let explanation = explanation.into();
        let explanation = if explanation.trim().is_empty() {
            verdict.fallback_explanation().to_string()
        } else {
            explanation
        };

        Self {
            text,
            verdict,
            confidence: confidence.clamp(0.0, 1.0),
            explanation,
        }
    }

    /// The placeholder claim substituted when extraction yields nothing.
    pub fn placeholder() -> Self {
        Self::new(
            PLACEHOLDER_CLAIM,
            Verdict::InsufficientInfo,
            0.5,
            PLACEHOLDER_EXPLANATION,
        )
    }
}

/// Final credibility report
///
/// Deserialization is deliberately lenient: the reporting boundary is
/// best-effort data from an unreliable upstream, so malformed fields
/// coerce to usable defaults instead of failing the decode.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Report {
    /// Credibility score in [0, 100]
    #[serde(
        default = "default_score",
        deserialize_with = "crate::model::decode::lenient_score"
    )]
    pub score: u8,
    #[serde(rename = "overallVerdict", default)]
    pub overall_verdict: String,
    #[serde(default)]
    pub summary: String,
    /// Per-claim breakdown in extraction order, never empty
    #[serde(default)]
    pub breakdown: Vec<Claim>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

fn default_score() -> u8 {
    50
}

impl Report {
    /// Minimal report returned when the pipeline hits an unexpected
    /// internal failure after input normalization succeeded.
    pub fn fallback() -> Self {
        Self {
            score: 50,
            overall_verdict: "Needs Review".to_string(),
            summary: "The analysis could not be completed reliably. Treat this content with \
                      caution and verify it against trusted sources."
                .to_string(),
            breakdown: vec![Claim::placeholder()],
            context: None,
        }
    }
}

/// Map a score to its overall-verdict band label
pub fn verdict_label(score: u8) -> &'static str {
    match score {
        80..=u8::MAX => "Highly Reliable",
        60..=79 => "Mostly Reliable",
        40..=59 => "Mixed Reliability",
        20..=39 => "Low Reliability",
        0..=19 => "Unreliable",
    }
}

/// Kind of input submitted for analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Url,
    Image,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_label_bands() {
        assert_eq!(verdict_label(100), "Highly Reliable");
        assert_eq!(verdict_label(80), "Highly Reliable");
        assert_eq!(verdict_label(79), "Mostly Reliable");
        assert_eq!(verdict_label(60), "Mostly Reliable");
        assert_eq!(verdict_label(59), "Mixed Reliability");
        assert_eq!(verdict_label(40), "Mixed Reliability");
        assert_eq!(verdict_label(39), "Low Reliability");
        assert_eq!(verdict_label(20), "Low Reliability");
        assert_eq!(verdict_label(19), "Unreliable");
        assert_eq!(verdict_label(0), "Unreliable");
    }

    #[test]
    fn test_verdict_parse_label() {
        assert_eq!(Verdict::parse_label("Supported"), Some(Verdict::Supported));
        assert_eq!(
            Verdict::parse_label(" contradicted "),
            Some(Verdict::Contradicted)
        );
        assert_eq!(
            Verdict::parse_label("Insufficient Info"),
            Some(Verdict::InsufficientInfo)
        );
        assert_eq!(
            Verdict::parse_label("insufficient_info"),
            Some(Verdict::InsufficientInfo)
        );
        assert_eq!(Verdict::parse_label("probably true"), None);
        assert_eq!(Verdict::parse_label(""), None);
    }

    #[test]
    fn test_untrusted_score_is_coerced_on_decode() {
        let decode = |score: serde_json::Value| -> u8 {
            let report: Report = serde_json::from_value(serde_json::json!({
                "score": score,
                "overallVerdict": "Mixed Reliability",
                "summary": "s",
                "breakdown": [],
            }))
            .unwrap();
            report.score
        };

        assert_eq!(decode(serde_json::json!("85")), 85);
        assert_eq!(decode(serde_json::json!(85.7)), 86);
        assert_eq!(decode(serde_json::json!("not a number")), 50);
    }

    #[test]
    fn test_missing_fields_decode_to_defaults() {
        let report: Report = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(report.score, 50);
        assert_eq!(report.summary, "");
        assert!(report.breakdown.is_empty());
        assert!(report.context.is_none());
    }

    #[test]
    fn test_claim_invariants() {
        let claim = Claim::new("", Verdict::Supported, 1.5, "   ");
        assert_eq!(claim.text, PLACEHOLDER_CLAIM);
        assert_eq!(claim.explanation, Verdict::Supported.fallback_explanation());
        assert_eq!(claim.confidence, 1.0);

        let claim = Claim::new("The sky is blue.", Verdict::Supported, -0.2, "ok");
        assert_eq!(claim.confidence, 0.0);
        assert_eq!(claim.explanation, "ok");
    }

    #[test]
    fn test_report_wire_shape() {
        let report = Report {
            score: 75,
            overall_verdict: verdict_label(75).to_string(),
            summary: "Mostly fine.".to_string(),
            breakdown: vec![Claim::new(
                "Water boils at 100C at sea level.",
                Verdict::Supported,
                0.9,
                "Well established.",
            )],
            context: None,
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["score"], 75);
        assert_eq!(json["overallVerdict"], "Mostly Reliable");
        assert_eq!(json["breakdown"][0]["claim"], "Water boils at 100C at sea level.");
        assert_eq!(json["breakdown"][0]["verdict"], "Supported");
        assert_eq!(json["breakdown"][0]["explanation"], "Well established.");
        // confidence never crosses the reporting boundary
        assert!(json["breakdown"][0].get("confidence").is_none());
        // absent context is omitted, not serialized as null
        assert!(json.get("context").is_none());
    }

    #[test]
    fn test_fallback_report() {
        let report = Report::fallback();
        assert_eq!(report.score, 50);
        assert_eq!(report.overall_verdict, "Needs Review");
        assert_eq!(report.breakdown.len(), 1);
        assert_eq!(report.breakdown[0].verdict, Verdict::InsufficientInfo);
    }
}
