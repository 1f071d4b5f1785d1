use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::Message;

/// Shape the reply should take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Free-form text
    #[default]
    Text,
    /// A single JSON object
    JsonObject,
}

/// Response from an LLM
///
/// `status` is false when the request itself failed; `content` then carries
/// the failure reason instead of model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmResponse {
    pub status: bool,
    pub content: String,
}

impl LlmResponse {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            status: true,
            content: content.into(),
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            status: false,
            content: reason.into(),
        }
    }
}

/// Trait for LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send messages to the LLM and get a completion.
    ///
    /// Returns `Err` only when the client cannot be constructed; request-level
    /// failures are reported through [`LlmResponse::status`].
    async fn chat_completions(
        &self,
        messages: &[Message],
        response_format: ResponseFormat,
    ) -> Result<LlmResponse>;

    /// Get the provider name
    fn name(&self) -> &str;
}
