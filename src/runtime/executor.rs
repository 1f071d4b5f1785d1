use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{info, warn};

use crate::agents::{AgentRegistry, AgentResponse};
use crate::session::{MessageSink, OutputMessage, SessionState, SessionStatus, Storage};

/// Runs registered agents by name, with optional session persistence
pub struct Executor {
    registry: AgentRegistry,
    storage: Option<Box<dyn Storage>>,
}

impl Executor {
    /// Create a new executor over an agent registry
    pub fn new(registry: AgentRegistry) -> Self {
        Self {
            registry,
            storage: None,
        }
    }

    /// Create an executor with session storage
    pub fn with_storage(registry: AgentRegistry, storage: Box<dyn Storage>) -> Self {
        Self {
            registry,
            storage: Some(storage),
        }
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Invoke an agent by name.
    ///
    /// Unknown agents and arguments that do not match the agent's schema are
    /// rejected without running the agent. Never returns an error.
    pub async fn invoke(
        &self,
        agent_name: &str,
        args: Value,
        output: &mut OutputMessage,
    ) -> AgentResponse {
        let Some(agent) = self.registry.get(agent_name) else {
            warn!(agent = agent_name, "unknown agent");
            return AgentResponse::error(format!("unknown agent: {}", agent_name));
        };

        let validated = agent
            .describe()
            .and_then(|description| description.parameters.validate(&args));
        if let Err(e) = validated {
            warn!(agent = agent_name, error = %e, "rejected agent arguments");
            return AgentResponse::error(e.to_string());
        }

        info!(agent = agent_name, session_id = %output.session_id(), "starting agent");
        let response = agent.safe_run(args, output).await;
        info!(agent = agent_name, status = %response.status(), "agent finished");
        response
    }

    /// Invoke an agent and persist the session before and after the run
    pub async fn invoke_with_session(
        &self,
        agent_name: &str,
        args: Value,
        sink: Arc<dyn MessageSink>,
    ) -> Result<SessionState> {
        let storage = self
            .storage
            .as_ref()
            .context("storage not configured for session tracking")?;

        let mut session = SessionState::new(agent_name, args.clone());
        session.set_status(SessionStatus::Running);
        storage.save(&session).await?;

        let mut output = OutputMessage::new(&session.id, sink);
        let response = self.invoke(agent_name, args, &mut output).await;

        session.finish(response, output.snapshot());
        storage.save(&session).await?;
        info!(session_id = %session.id, status = %session.status, "session saved");

        Ok(session)
    }

    /// Get storage reference for direct operations
    pub fn storage(&self) -> Option<&dyn Storage> {
        self.storage.as_ref().map(|s| s.as_ref())
    }
}
