pub mod extraction;
pub mod llm;
pub mod normalize;
pub mod pipeline;
pub mod sentiment;
pub mod synthesis;
pub mod verifier;
pub mod vision;

pub use extraction::ClaimExtractionService;
pub use llm::LlmClient;
pub use normalize::Normalizer;
pub use pipeline::AnalysisService;
pub use sentiment::SentimentClient;
pub use synthesis::Synthesizer;
pub use verifier::VerifierService;
pub use vision::VisionClient;
