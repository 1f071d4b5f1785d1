use anyhow::{Context, Result};
use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::{ChatMessage, ChatRole, MessageType};
use tokio::time::{Duration, timeout};
use tracing::{debug, warn};

use super::{LlmProvider, LlmResponse, Message, MessageRole, ResponseFormat, RetryConfig};
use super::retry::retry_with_backoff;

const API_TIMEOUT_SECS: u64 = 120;

const JSON_OBJECT_INSTRUCTION: &str =
    "Respond with a single valid JSON object and nothing else. Do not wrap it in Markdown.";

/// Which hosted API a [`ChatProvider`] talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Anthropic,
    OpenAI,
}

impl Backend {
    fn name(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAI => "openai",
        }
    }

    fn api_key_env(self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenAI => "OPENAI_API_KEY",
        }
    }

    fn llm_backend(self) -> LLMBackend {
        match self {
            Self::Anthropic => LLMBackend::Anthropic,
            Self::OpenAI => LLMBackend::OpenAI,
        }
    }
}

/// Chat completion provider using the llm crate
pub struct ChatProvider {
    backend: Backend,
    model: String,
    api_key: String,
    retry: RetryConfig,
}

impl ChatProvider {
    /// Create a provider for the given backend, reading its API key from the environment
    pub fn new(backend: Backend, model: impl Into<String>) -> Result<Self> {
        let env = backend.api_key_env();
        let api_key =
            std::env::var(env).with_context(|| format!("{} environment variable not set", env))?;
        Ok(Self {
            backend,
            model: model.into(),
            api_key,
            retry: RetryConfig::default(),
        })
    }

    /// Create a provider using Claude Sonnet
    pub fn sonnet() -> Result<Self> {
        Self::new(Backend::Anthropic, "claude-sonnet-4-20250514")
    }

    /// Create a provider using GPT-4o
    pub fn gpt4o() -> Result<Self> {
        Self::new(Backend::OpenAI, "gpt-4o")
    }

    /// Override the retry policy for transient API errors
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn complete_once(&self, system: &str, chat_messages: &[ChatMessage]) -> Result<String> {
        let llm = LLMBuilder::new()
            .backend(self.backend.llm_backend())
            .api_key(&self.api_key)
            .model(&self.model)
            .system(system)
            .max_tokens(4096)
            .build()
            .context("failed to build LLM client")?;

        let response = timeout(
            Duration::from_secs(API_TIMEOUT_SECS),
            llm.chat(chat_messages),
        )
        .await
        .with_context(|| {
            format!(
                "{} API call timed out after {} seconds",
                self.backend.name(),
                API_TIMEOUT_SECS
            )
        })?
        .with_context(|| format!("failed to call {} API", self.backend.name()))?;

        response
            .text()
            .filter(|text| !text.trim().is_empty())
            .with_context(|| format!("{} API returned an empty response", self.backend.name()))
    }
}

#[async_trait]
impl LlmProvider for ChatProvider {
    fn name(&self) -> &str {
        self.backend.name()
    }

    async fn chat_completions(
        &self,
        messages: &[Message],
        response_format: ResponseFormat,
    ) -> Result<LlmResponse> {
        // System messages go through the builder, not the message list
        let mut system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
            .collect();
        if response_format == ResponseFormat::JsonObject {
            system.push(JSON_OBJECT_INSTRUCTION);
        }
        let system = system.join("\n\n");

        let chat_messages: Vec<ChatMessage> = messages
            .iter()
            .filter_map(|msg| {
                let role = match msg.role {
                    MessageRole::User => ChatRole::User,
                    MessageRole::Assistant => ChatRole::Assistant,
                    MessageRole::System => return None,
                };
                Some(ChatMessage {
                    role,
                    message_type: MessageType::Text,
                    content: msg.content.clone(),
                })
            })
            .collect();

        let result = retry_with_backoff(&self.retry, self.backend.name(), || {
            self.complete_once(&system, &chat_messages)
        })
        .await;

        match result {
            Ok(text) => {
                debug!(provider = self.backend.name(), chars = text.len(), "llm reply");
                let content = match response_format {
                    ResponseFormat::JsonObject => strip_code_fence(&text).to_string(),
                    ResponseFormat::Text => text,
                };
                Ok(LlmResponse::success(content))
            }
            Err(e) => {
                warn!(provider = self.backend.name(), error = %e, "chat completion failed");
                Ok(LlmResponse::failure(format!("{:#}", e)))
            }
        }
    }
}

/// Unwrap a reply fenced as ```` ```json ... ``` ````; other text is returned trimmed.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line
    match body.split_once('\n') {
        Some((_, inner)) => inner.trim(),
        None => body.trim(),
    }
}
