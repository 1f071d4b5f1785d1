use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// File name looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "hooksmith.toml";

/// Project-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// LLM provider to use (e.g., "anthropic", "openai")
    #[serde(default)]
    pub provider: Option<String>,

    /// Model to use
    #[serde(default)]
    pub model: Option<String>,

    /// Limits applied when embedding video content into the LLM prompt
    #[serde(default)]
    pub prompt: PromptLimits,

    /// Video database connection settings
    #[serde(default)]
    pub videodb: VideoDbSettings,

    /// Retry policy for LLM transport errors
    #[serde(default)]
    pub retry: RetrySettings,
}

impl ProjectConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        debug!(path = %path.display(), "loaded project config");
        Ok(config)
    }

    /// Load from an explicit path, or from `hooksmith.toml` in the working
    /// directory if it exists, or fall back to defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::load(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }
}

/// How much of the transcript and scene list is sent to the LLM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptLimits {
    /// Maximum number of transcript characters
    pub transcript_chars: usize,
    /// Maximum number of scene descriptions
    pub max_scenes: usize,
}

impl Default for PromptLimits {
    fn default() -> Self {
        Self {
            transcript_chars: 1000,
            max_scenes: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoDbSettings {
    /// Base URL of the video database API
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for VideoDbSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.videodb.io".to_string(),
            api_key_env: "VIDEO_DB_API_KEY".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub base_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 1000,
        }
    }
}
