use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::sink::{MessageSink, SessionEvent};

/// Status of a content block or of the whole output message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MsgStatus {
    #[default]
    Progress,
    Success,
    Error,
}

impl std::fmt::Display for MsgStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Progress => write!(f, "progress"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A text block an agent fills in while it works
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    pub agent_name: String,
    pub text: String,
    pub status: MsgStatus,
    pub status_message: String,
}

impl TextContent {
    /// A block that is still being produced
    pub fn progress(agent_name: impl Into<String>, status_message: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            text: String::new(),
            status: MsgStatus::Progress,
            status_message: status_message.into(),
        }
    }
}

/// Handle to a content block appended to an [`OutputMessage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentId(usize);

/// Point-in-time copy of an output message, as delivered to sinks and storage
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutputSnapshot {
    pub session_id: String,
    pub actions: Vec<String>,
    pub content: Vec<TextContent>,
    pub status: MsgStatus,
}

/// The message a session shows while agents run.
///
/// Agents append actions and content, call [`push_update`](Self::push_update)
/// after each step and [`publish`](Self::publish) exactly once when done.
pub struct OutputMessage {
    state: OutputSnapshot,
    sink: Arc<dyn MessageSink>,
    published: bool,
}

impl OutputMessage {
    pub fn new(session_id: impl Into<String>, sink: Arc<dyn MessageSink>) -> Self {
        Self {
            state: OutputSnapshot {
                session_id: session_id.into(),
                ..OutputSnapshot::default()
            },
            sink,
            published: false,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.state.session_id
    }

    pub fn actions(&self) -> &[String] {
        &self.state.actions
    }

    pub fn content(&self) -> &[TextContent] {
        &self.state.content
    }

    pub fn status(&self) -> MsgStatus {
        self.state.status
    }

    pub fn is_published(&self) -> bool {
        self.published
    }

    /// Record an action in the visible action log and flush
    pub fn push_action(&mut self, action: impl Into<String>) {
        self.state.actions.push(action.into());
        self.push_update();
    }

    /// Append a content block and flush
    pub fn add_content(&mut self, content: TextContent) -> ContentId {
        self.state.content.push(content);
        self.push_update();
        ContentId(self.state.content.len() - 1)
    }

    pub fn content_mut(&mut self, id: ContentId) -> Option<&mut TextContent> {
        self.state.content.get_mut(id.0)
    }

    /// Send the current state to the session transport as a progress update
    pub fn push_update(&self) {
        if self.published {
            debug!(session_id = %self.state.session_id, "update after publish ignored");
            return;
        }
        self.sink.send(SessionEvent::Update(self.state.clone()));
    }

    /// Finalize the message and send it. Only the first call has any effect.
    pub fn publish(&mut self) {
        if self.published {
            debug!(session_id = %self.state.session_id, "message already published");
            return;
        }
        self.state.status = if self
            .state
            .content
            .iter()
            .any(|c| c.status == MsgStatus::Error)
        {
            MsgStatus::Error
        } else {
            MsgStatus::Success
        };
        self.published = true;
        self.sink.send(SessionEvent::Published(self.state.clone()));
    }

    pub fn snapshot(&self) -> OutputSnapshot {
        self.state.clone()
    }
}

impl std::fmt::Debug for OutputMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputMessage")
            .field("state", &self.state)
            .field("published", &self.published)
            .finish()
    }
}
