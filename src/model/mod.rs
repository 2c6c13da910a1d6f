pub mod config;
pub mod decode;
pub mod report;

pub use config::{Config, InferenceConfig, LlmConfig, ResolutionPolicy};
pub use report::{verdict_label, Claim, InputKind, Report, Verdict};
