//! Input normalization
//!
//! Converts any accepted input kind into one canonical text blob plus an
//! optional provenance note. This is the only stage allowed to reject a
//! request: everything after it degrades instead of failing.

use base64::Engine;
use url::Url;

use crate::model::InputKind;
use crate::retriever::{ArticleRetriever, FetchError};
use crate::service::vision::VisionClient;

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("no usable text could be derived from the input")]
    EmptyInput,

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Canonical text produced from any input kind
#[derive(Debug, Clone)]
pub struct CanonicalText {
    pub text: String,
    pub context: Option<String>,
}

/// Converts text, URL, or image input into canonical text
pub struct Normalizer {
    retriever: ArticleRetriever,
    vision: VisionClient,
}

impl Normalizer {
    pub fn new(retriever: ArticleRetriever, vision: VisionClient) -> Self {
        Self { retriever, vision }
    }

    /// Normalize a payload of the given kind
    ///
    /// No retries here: retry policy belongs to the underlying
    /// fetch/inference clients.
    pub async fn normalize(
        &self,
        kind: InputKind,
        payload: &str,
    ) -> Result<CanonicalText, NormalizeError> {
        match kind {
            InputKind::Text => self.normalize_text(payload),
            InputKind::Url => self.normalize_url(payload).await,
            InputKind::Image => self.normalize_image(payload).await,
        }
    }

    fn normalize_text(&self, payload: &str) -> Result<CanonicalText, NormalizeError> {
        let text = payload.trim();
        if text.is_empty() {
            return Err(NormalizeError::EmptyInput);
        }

        Ok(CanonicalText {
            text: text.to_string(),
            context: Some("Input was a raw text message.".to_string()),
        })
    }

    async fn normalize_url(&self, payload: &str) -> Result<CanonicalText, NormalizeError> {
        let url = Url::parse(payload.trim())
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", payload.trim(), e)))?;

        let text = self.retriever.fetch(&url).await?;

        if text.trim().is_empty() {
            tracing::warn!(url = %url, "Fetched page yielded no extractable text");
            return Err(NormalizeError::EmptyInput);
        }

        Ok(CanonicalText {
            text,
            context: Some(format!("Content extracted from: {}", url)),
        })
    }

    async fn normalize_image(&self, payload: &str) -> Result<CanonicalText, NormalizeError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| {
                tracing::warn!(error = %e, "Image payload is not valid base64");
                NormalizeError::EmptyInput
            })?;

        // OCR and captioning are independent collaborators; run both and
        // tolerate either failing.
        let (ocr, caption) = futures::join!(self.vision.ocr(&bytes), self.vision.caption(&bytes));

        let mut parts: Vec<String> = Vec::new();

        match ocr {
            Ok(text) if !text.trim().is_empty() => parts.push(text.trim().to_string()),
            Ok(_) => {}
            Err(e) => tracing::debug!(error = %e, "OCR failed for submitted image"),
        }

        match caption {
            Ok(text) if !text.trim().is_empty() => parts.push(text.trim().to_string()),
            Ok(_) => {}
            Err(e) => tracing::debug!(error = %e, "Captioning failed for submitted image"),
        }

        if parts.is_empty() {
            return Err(NormalizeError::EmptyInput);
        }

        Ok(CanonicalText {
            text: parts.join("\n\n"),
            context: Some("Text and description recovered from a submitted image.".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InferenceConfig;
    use std::time::Duration;

    fn test_normalizer() -> Normalizer {
        Normalizer::new(
            ArticleRetriever::new(),
            VisionClient::new(&InferenceConfig::default(), Duration::from_secs(1)),
        )
    }

    #[tokio::test]
    async fn test_text_input_is_trimmed() {
        let normalizer = test_normalizer();
        let canonical = normalizer
            .normalize(InputKind::Text, "  The Earth is round.  ")
            .await
            .unwrap();
        assert_eq!(canonical.text, "The Earth is round.");
        assert!(canonical.context.is_some());
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected() {
        let normalizer = test_normalizer();
        let err = normalizer
            .normalize(InputKind::Text, "   \n ")
            .await
            .unwrap_err();
        assert!(matches!(err, NormalizeError::EmptyInput));
    }

    #[tokio::test]
    async fn test_invalid_url_is_a_fetch_error() {
        let normalizer = test_normalizer();
        let err = normalizer
            .normalize(InputKind::Url, "not a url")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::Fetch(FetchError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_undecodable_image_is_rejected() {
        let normalizer = test_normalizer();
        let err = normalizer
            .normalize(InputKind::Image, "!!not-base64!!")
            .await
            .unwrap_err();
        assert!(matches!(err, NormalizeError::EmptyInput));
    }
}
