use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use uuid::Uuid;

use super::OutputSnapshot;
use crate::agents::{AgentResponse, AgentStatus};

/// Record of one agent invocation, kept after the output message is published
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Unique session identifier
    pub id: String,

    /// Name of the agent that was invoked
    pub agent: String,

    /// Arguments the agent was invoked with
    pub arguments: Value,

    /// Current status
    pub status: SessionStatus,

    /// The agent's response, once it returned
    pub response: Option<AgentResponse>,

    /// Final state of the output message
    pub output: Option<OutputSnapshot>,

    /// When the session was created
    pub created_at: DateTime<Utc>,

    /// When the session was last updated
    pub updated_at: DateTime<Utc>,

    /// Any error message if the session failed
    pub error: Option<String>,
}

impl SessionState {
    /// Create a new session for an agent invocation
    pub fn new(agent: impl Into<String>, arguments: Value) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            agent: agent.into(),
            arguments,
            status: SessionStatus::Pending,
            response: None,
            output: None,
            created_at: now,
            updated_at: now,
            error: None,
        }
    }

    /// Update the session status
    pub fn set_status(&mut self, status: SessionStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// Record the agent's response and the published output
    pub fn finish(&mut self, response: AgentResponse, output: OutputSnapshot) {
        match response.status() {
            AgentStatus::Success => {
                self.status = SessionStatus::Completed;
                self.error = None;
            }
            AgentStatus::Error => {
                self.status = SessionStatus::Failed;
                self.error = Some(response.message().to_string());
            }
        }
        self.response = Some(response);
        self.output = Some(output);
        self.updated_at = Utc::now();
    }

    /// The generated template, if the invocation produced one
    pub fn template(&self) -> Option<&str> {
        self.response
            .as_ref()
            .and_then(|r| r.data().get("template"))
            .and_then(Value::as_str)
    }
}

/// Status of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Session created but the agent has not started
    #[default]
    Pending,
    /// Agent is running
    Running,
    /// Agent returned a success response
    Completed,
    /// Agent returned an error response
    Failed,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for SessionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => anyhow::bail!(
                "invalid session status '{}' (expected: pending, running, completed, failed)",
                s
            ),
        }
    }
}

/// Summary of a session for listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: String,
    pub agent: String,
    pub status: SessionStatus,
    pub created_at: String,
    pub updated_at: String,
    pub error: Option<String>,
}

impl std::fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id_short: String = self.id.chars().take(8).collect();
        let error_preview: String = match &self.error {
            Some(e) if e.chars().count() > 50 => e.chars().take(47).collect::<String>() + "...",
            Some(e) => e.clone(),
            None => String::new(),
        };

        write!(
            f,
            "{:<10} {:<16} {:<10} {:<26} {}",
            id_short, self.agent, self.status, self.updated_at, error_preview
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_finish_with_success_keeps_template() {
        let mut session = SessionState::new("hook_template", json!({"video_id": "v-1"}));
        let response = AgentResponse::success("done").with_data("template", "Hook Script:\n\"hi\"");

        session.finish(response, OutputSnapshot::default());

        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.template(), Some("Hook Script:\n\"hi\""));
        assert!(session.error.is_none());
    }

    #[test]
    fn test_finish_with_error_records_message() {
        let mut session = SessionState::new("hook_template", json!({}));

        session.finish(AgentResponse::error("boom"), OutputSnapshot::default());

        assert_eq!(session.status, SessionStatus::Failed);
        assert_eq!(session.error.as_deref(), Some("boom"));
        assert!(session.template().is_none());
    }

    #[test]
    fn test_status_round_trips_through_display() {
        for status in [
            SessionStatus::Pending,
            SessionStatus::Running,
            SessionStatus::Completed,
            SessionStatus::Failed,
        ] {
            assert_eq!(status.to_string().parse::<SessionStatus>().unwrap(), status);
        }
        assert!("unknown".parse::<SessionStatus>().is_err());
    }
}
