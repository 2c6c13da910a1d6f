//! Claim extraction service
//!
//! Asks the generative model to enumerate discrete, checkable factual
//! assertions and parses them out of the response. Extraction never fails:
//! a dead upstream yields an empty list, which the synthesizer turns into
//! the placeholder claim.

use std::sync::Arc;

use regex::Regex;

use crate::service::llm::LlmClient;

/// System prompt for claim extraction
const EXTRACTION_PREAMBLE: &str = "You are a claim extraction analyst. Given a piece of \
content, you enumerate the discrete factual assertions in it that could be independently \
verified. You respond with a numbered list only, one claim per line, and nothing else. \
Skip opinions, predictions, and rhetorical statements.";

/// Service for extracting checkable claims from canonical text
pub struct ClaimExtractionService {
    llm: Arc<LlmClient>,
    max_claims: usize,
}

impl ClaimExtractionService {
    pub fn new(llm: Arc<LlmClient>, max_claims: usize) -> Self {
        Self { llm, max_claims }
    }

    /// Extract claims from canonical text
    ///
    /// Returns at most `max_claims` claims in response order. An upstream
    /// failure is absorbed and logged; the empty list is itself meaningful
    /// downstream.
    pub async fn extract(&self, text: &str) -> Vec<String> {
        let prompt = format!(
            "List the main factual claims in the following content that can be \
             fact-checked. Return between 2 and {} claims when the content allows it.\n\n\
             Content:\n{}",
            self.max_claims, text
        );

        let response = match self.llm.generate(EXTRACTION_PREAMBLE, &prompt, 1024).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Claim extraction failed, continuing with no claims");
                return Vec::new();
            }
        };

        let claims = parse_claim_list(&response, self.max_claims);

        tracing::debug!(claim_count = claims.len(), "Claims extracted");
        claims
    }
}

/// Parse an enumerated-list response into claim strings
///
/// Lines carrying a list marker are taken as entries; when no line does,
/// every non-empty line is taken instead. Blank entries are discarded and
/// the list is capped at `max_claims`, keeping response order.
pub fn parse_claim_list(response: &str, max_claims: usize) -> Vec<String> {
    let marker = Regex::new(r"^\s*(?:\d+\s*[.)]|[-*•])\s+").unwrap();

    let marked: Vec<String> = response
        .lines()
        .filter(|line| marker.is_match(line))
        .map(|line| clean_entry(&marker.replace(line, "")))
        .filter(|entry| !entry.is_empty())
        .collect();

    let entries = if marked.is_empty() {
        response
            .lines()
            .map(clean_entry)
            .filter(|entry| !entry.is_empty())
            .collect()
    } else {
        marked
    };

    entries.into_iter().take(max_claims).collect()
}

fn clean_entry(line: &str) -> String {
    line.trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim_start_matches("**")
        .trim_end_matches("**")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbered_list() {
        let response = "1. The Earth revolves around the Sun.\n2) Vaccines cause autism.\n";
        let claims = parse_claim_list(response, 10);
        assert_eq!(
            claims,
            vec![
                "The Earth revolves around the Sun.",
                "Vaccines cause autism."
            ]
        );
    }

    #[test]
    fn test_parse_bulleted_list_with_noise() {
        let response = "Here are the claims:\n- \"Water boils at 100C.\"\n-  \n* Paris is in France.";
        let claims = parse_claim_list(response, 10);
        assert_eq!(claims, vec!["Water boils at 100C.", "Paris is in France."]);
    }

    #[test]
    fn test_parse_caps_at_max() {
        let response = (1..=15)
            .map(|i| format!("{i}. Claim number {i}."))
            .collect::<Vec<_>>()
            .join("\n");
        let claims = parse_claim_list(&response, 10);
        assert_eq!(claims.len(), 10);
        assert_eq!(claims[0], "Claim number 1.");
        assert_eq!(claims[9], "Claim number 10.");
    }

    #[test]
    fn test_parse_unmarked_lines_fallback() {
        let response = "The sky is blue.\n\nGrass is green.";
        let claims = parse_claim_list(response, 10);
        assert_eq!(claims, vec!["The sky is blue.", "Grass is green."]);
    }

    #[test]
    fn test_parse_empty_response() {
        assert!(parse_claim_list("", 10).is_empty());
        assert!(parse_claim_list("  \n \n", 10).is_empty());
    }
}
