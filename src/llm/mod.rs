mod message;
mod provider;
mod providers;
mod retry;

pub use message::{Message, MessageRole};
pub use provider::{LlmProvider, LlmResponse, ResponseFormat};
pub use providers::{Backend, ChatProvider};
pub use retry::{RetryConfig, is_retryable_error, retry_with_backoff};
