use serde::Deserialize;
use std::fs;
use std::path::Path;

const ENV_CONFIG_PATH: &str = "VERITAS_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Deterministic verdict-resolution table (applied when the primary
/// verdict model's output is ambiguous or unparseable)
///
/// The defaults are load-bearing: marker lists, thresholds, and the
/// confidences they assign are part of the verifier's contract.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolutionPolicy {
    /// Lexical markers that resolve a claim as Contradicted
    pub negative_markers: Vec<String>,
    /// Lexical markers that resolve a claim as Supported
    pub positive_markers: Vec<String>,
    /// Confidence assigned by a marker match
    pub marker_confidence: f64,
    /// Sentiment below this resolves as Contradicted
    pub sentiment_low: f64,
    /// Sentiment above this resolves as Supported
    pub sentiment_high: f64,
    /// Confidence assigned by a sentiment-threshold match
    pub sentiment_confidence: f64,
    /// Confidence when no signal is available
    pub default_confidence: f64,
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        Self {
            negative_markers: ["false", "debunked", "myth", "conspiracy"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            positive_markers: ["true", "verified", "confirmed", "factual"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            marker_confidence: 0.75,
            sentiment_low: 0.3,
            sentiment_high: 0.7,
            sentiment_confidence: 0.6,
            default_confidence: 0.5,
        }
    }
}

/// Pipeline tuning knobs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum number of claims carried into verification
    pub max_claims: usize,
    /// Bounded degree of concurrent per-claim verification
    pub verify_concurrency: usize,
    /// Per-upstream-call timeout in seconds
    pub call_timeout_secs: u64,
    pub resolution: ResolutionPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_claims: 10,
            verify_concurrency: 4,
            call_timeout_secs: 30,
            resolution: ResolutionPolicy::default(),
        }
    }
}

/// Generative-model endpoint configuration
///
/// `endpoints` lists alternate OpenAI-compatible base URLs tried in order
/// after the provider default; first success wins.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub endpoints: Vec<String>,
}

/// Hosted-inference endpoints for the secondary (non-generative) models
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Base URLs tried in order for classifier/vision calls
    pub endpoints: Vec<String>,
    pub sentiment_model: String,
    pub caption_model: String,
    pub ocr_model: String,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoints: vec!["https://api-inference.huggingface.co".to_string()],
            sentiment_model: "distilbert-base-uncased-finetuned-sst-2-english".to_string(),
            caption_model: "Salesforce/blip-image-captioning-large".to_string(),
            ocr_model: "microsoft/trocr-base-printed".to_string(),
        }
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub pipeline: PipelineConfig,
    pub llm: LlmConfig,
    pub inference: InferenceConfig,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub llm: LlmConfig,
    pub inference: InferenceConfig,
    pub port: u16,
    pub host: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            llm: LlmConfig::default(),
            inference: InferenceConfig::default(),
            port: 8080,
            host: "127.0.0.1".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let file = Self::load_config_file(&config_path).unwrap_or_default();

        Self {
            pipeline: file.pipeline,
            llm: file.llm,
            inference: file.inference,
            port,
            host,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                let contents = contents.trim();
                if contents.is_empty() {
                    tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
                    return Some(ConfigFile::default());
                }

                match serde_yaml::from_str(contents) {
                    Ok(config) => {
                        tracing::info!(path = %path.display(), "Loaded configuration from file");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_policy_defaults() {
        let policy = ResolutionPolicy::default();
        assert!(policy.negative_markers.contains(&"debunked".to_string()));
        assert!(policy.positive_markers.contains(&"verified".to_string()));
        assert_eq!(policy.marker_confidence, 0.75);
        assert_eq!(policy.sentiment_low, 0.3);
        assert_eq!(policy.sentiment_high, 0.7);
        assert_eq!(policy.sentiment_confidence, 0.6);
        assert_eq!(policy.default_confidence, 0.5);
    }

    #[test]
    fn test_config_file_partial_override() {
        let yaml = r#"
pipeline:
  verify_concurrency: 8
  resolution:
    sentiment_low: 0.25
llm:
  endpoints:
    - "https://alt.example.com/v1"
"#;
        let file: ConfigFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(file.pipeline.verify_concurrency, 8);
        // untouched fields keep their defaults
        assert_eq!(file.pipeline.max_claims, 10);
        assert_eq!(file.pipeline.resolution.sentiment_low, 0.25);
        assert_eq!(file.pipeline.resolution.sentiment_high, 0.7);
        assert_eq!(file.llm.endpoints.len(), 1);
        assert_eq!(
            file.inference.endpoints,
            vec!["https://api-inference.huggingface.co".to_string()]
        );
    }
}
