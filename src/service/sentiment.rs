//! Secondary stance classifier
//!
//! Hosted-inference sentiment model used as a cross-check when the primary
//! verdict model is inconclusive. Returns the probability mass on the
//! positive label as a score in [0, 1].

use std::time::Duration;

use serde::Deserialize;

use crate::model::InferenceConfig;
use crate::service::llm::ModelError;

const ENV_HF_API_KEY: &str = "HF_API_KEY";

#[derive(Debug, Deserialize)]
struct ClassifierLabel {
    label: String,
    score: f64,
}

/// Client for the hosted sentiment/stance classifier
#[derive(Clone)]
pub struct SentimentClient {
    client: reqwest::Client,
    endpoints: Vec<String>,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl SentimentClient {
    pub fn new(config: &InferenceConfig, timeout: Duration) -> Self {
        let api_key = std::env::var(ENV_HF_API_KEY).ok();
        if api_key.is_none() {
            tracing::warn!(
                "Inference API key not found ({ENV_HF_API_KEY}), classifier calls may be rate limited"
            );
        }

        Self {
            client: reqwest::Client::new(),
            endpoints: config.endpoints.clone(),
            model: config.sentiment_model.clone(),
            api_key,
            timeout,
        }
    }

    /// Classify a claim, returning a positive-stance score in [0, 1]
    pub async fn classify(&self, text: &str) -> Result<f64, ModelError> {
        let mut last_error = ModelError::NotConfigured;

        for endpoint in &self.endpoints {
            let url = format!("{}/models/{}", endpoint.trim_end_matches('/'), self.model);

            match self.classify_at(&url, text).await {
                Ok(score) => return Ok(score),
                Err(e) => {
                    tracing::debug!(url = %url, error = %e, "Classifier call failed, trying next endpoint");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    async fn classify_at(&self, url: &str, text: &str) -> Result<f64, ModelError> {
        let mut request = self
            .client
            .post(url)
            .json(&serde_json::json!({ "inputs": text }))
            .timeout(self.timeout);

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ModelError::Timeout
            } else {
                ModelError::Upstream(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(ModelError::Upstream(format!(
                "classifier returned HTTP {}",
                response.status()
            )));
        }

        // Response shape: [[{"label": "POSITIVE", "score": 0.98}, ...]]
        let labels: Vec<Vec<ClassifierLabel>> = response
            .json()
            .await
            .map_err(|e| ModelError::Unparseable(e.to_string()))?;

        labels
            .first()
            .map(|l| positive_score(l))
            .ok_or_else(|| ModelError::Unparseable("empty classifier response".to_string()))
    }
}

/// Reduce classifier labels to a single positive-stance score
fn positive_score(labels: &[ClassifierLabel]) -> f64 {
    for label in labels {
        let name = label.label.to_uppercase();
        if name.contains("POSITIVE") || name == "LABEL_1" {
            return label.score.clamp(0.0, 1.0);
        }
    }

    // Negative-only responses invert into positive mass
    labels
        .iter()
        .find(|l| {
            let name = l.label.to_uppercase();
            name.contains("NEGATIVE") || name == "LABEL_0"
        })
        .map(|l| (1.0 - l.score).clamp(0.0, 1.0))
        .unwrap_or(0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_score_direct() {
        let labels = vec![
            ClassifierLabel {
                label: "POSITIVE".to_string(),
                score: 0.92,
            },
            ClassifierLabel {
                label: "NEGATIVE".to_string(),
                score: 0.08,
            },
        ];
        assert_eq!(positive_score(&labels), 0.92);
    }

    #[test]
    fn test_positive_score_inverts_negative_only() {
        let labels = vec![ClassifierLabel {
            label: "NEGATIVE".to_string(),
            score: 0.8,
        }];
        assert!((positive_score(&labels) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_positive_score_unknown_labels_default_to_neutral() {
        let labels = vec![ClassifierLabel {
            label: "OTHER".to_string(),
            score: 0.9,
        }];
        assert_eq!(positive_score(&labels), 0.5);
    }
}
