pub mod agents;
pub mod config;
pub mod error;
pub mod llm;
pub mod runtime;
pub mod session;
pub mod videodb;

pub use agents::{
    Agent, AgentDescription, AgentRegistry, AgentResponse, AgentStatus, HookTemplate,
    HookTemplateAgent, HookTemplateRequest, ParameterSchema, ParameterType, SceneAcquisition,
};
pub use config::{ProjectConfig, PromptLimits};
pub use error::HooksmithError;
pub use llm::{
    Backend, ChatProvider, LlmProvider, LlmResponse, Message, MessageRole, ResponseFormat,
    RetryConfig,
};
pub use runtime::Executor;
pub use session::{
    ChannelSink, LogSink, MessageSink, MsgStatus, NoopSink, OutputMessage, OutputSnapshot,
    RecordingSink, SessionEvent, SessionState, SessionStatus, SessionSummary, SqliteStorage,
    Storage, TextContent,
};
pub use videodb::{
    HttpVideoDb, HttpVideoDbConnector, Scene, SceneIndexRef, VideoDataSource, VideoDbConnector,
};
