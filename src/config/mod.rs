mod project;

pub use project::{ProjectConfig, PromptLimits, RetrySettings, VideoDbSettings};
