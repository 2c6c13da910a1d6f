//! Image captioning and OCR collaborators
//!
//! Both run against hosted-inference endpoints over raw image bytes and
//! return plain text. Each may fail independently; the normalizer decides
//! what a partial result means.

use std::time::Duration;

use serde::Deserialize;

use crate::model::InferenceConfig;
use crate::service::llm::ModelError;

const ENV_HF_API_KEY: &str = "HF_API_KEY";

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

/// Client for image-derived text (caption + OCR)
#[derive(Clone)]
pub struct VisionClient {
    client: reqwest::Client,
    endpoints: Vec<String>,
    caption_model: String,
    ocr_model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl VisionClient {
    pub fn new(config: &InferenceConfig, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoints: config.endpoints.clone(),
            caption_model: config.caption_model.clone(),
            ocr_model: config.ocr_model.clone(),
            api_key: std::env::var(ENV_HF_API_KEY).ok(),
            timeout,
        }
    }

    /// Describe the image content in prose
    pub async fn caption(&self, bytes: &[u8]) -> Result<String, ModelError> {
        self.generate_from_image(&self.caption_model, bytes).await
    }

    /// Extract printed/visible text from the image
    pub async fn ocr(&self, bytes: &[u8]) -> Result<String, ModelError> {
        self.generate_from_image(&self.ocr_model, bytes).await
    }

    async fn generate_from_image(&self, model: &str, bytes: &[u8]) -> Result<String, ModelError> {
        let mut last_error = ModelError::NotConfigured;

        for endpoint in &self.endpoints {
            let url = format!("{}/models/{}", endpoint.trim_end_matches('/'), model);

            match self.call_at(&url, bytes).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    tracing::debug!(url = %url, error = %e, "Vision call failed, trying next endpoint");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    async fn call_at(&self, url: &str, bytes: &[u8]) -> Result<String, ModelError> {
        let mut request = self
            .client
            .post(url)
            .body(bytes.to_vec())
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
                "vision model returned HTTP {}",
                response.status()
            )));
        }

        // Response shape: [{"generated_text": "..."}]
        let outputs: Vec<GeneratedText> = response
            .json()
            .await
            .map_err(|e| ModelError::Unparseable(e.to_string()))?;

        outputs
            .into_iter()
            .map(|o| o.generated_text)
            .find(|t| !t.trim().is_empty())
            .ok_or_else(|| ModelError::Unparseable("empty vision response".to_string()))
    }
}
