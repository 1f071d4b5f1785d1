mod hook_template;
mod prompt;
mod registry;
mod response;
mod schema;
mod template;

pub use hook_template::{HookTemplateAgent, HookTemplateRequest, SceneAcquisition};
pub use prompt::build_hook_prompt;
pub use registry::AgentRegistry;
pub use response::{AgentResponse, AgentStatus};
pub use schema::{ParameterProperty, ParameterSchema, ParameterType};
pub use template::HookTemplate;

use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures::FutureExt;
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::error::HooksmithError;
use crate::session::{MsgStatus, OutputMessage, TextContent};

/// What an orchestrator needs to know to offer an agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentDescription {
    pub name: String,
    pub description: String,
    pub parameters: ParameterSchema,
}

/// A self-contained request handler with a described, invokable operation
#[async_trait]
pub trait Agent: Send + Sync {
    /// The unique name of this agent
    fn name(&self) -> &str;

    /// A description of what this agent does
    fn description(&self) -> &str;

    /// The declared parameter schema, or `None` if the agent declares none
    fn parameters(&self) -> Option<ParameterSchema>;

    /// Do the agent's work.
    ///
    /// Progress goes to `output`; the returned response is the caller-visible result.
    async fn run(
        &self,
        args: Value,
        output: &mut OutputMessage,
    ) -> Result<AgentResponse, HooksmithError>;

    /// Name, description and parameter schema.
    ///
    /// Fails with a configuration error when no non-empty schema is declared.
    fn describe(&self) -> Result<AgentDescription, HooksmithError> {
        let parameters = self
            .parameters()
            .filter(|schema| !schema.is_empty())
            .ok_or_else(|| {
                HooksmithError::Config(format!(
                    "agent '{}' has no parameters; declare an explicit parameter schema",
                    self.name()
                ))
            })?;
        Ok(AgentDescription {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters,
        })
    }

    /// Run the agent, turning any error or panic into an error response.
    ///
    /// If the agent already reported progress but never published, an error
    /// block is added and the output is published so the session sees a
    /// terminal status.
    async fn safe_run(&self, args: Value, output: &mut OutputMessage) -> AgentResponse {
        let outcome = AssertUnwindSafe(self.run(args, output)).catch_unwind().await;

        let failure = match outcome {
            Ok(Ok(response)) => return response,
            Ok(Err(e)) => e.to_string(),
            Err(panic) => panic_message(panic.as_ref()),
        };

        error!(agent = self.name(), error = %failure, "agent failed");

        let reported_progress = !output.actions().is_empty() || !output.content().is_empty();
        if reported_progress && !output.is_published() {
            output.add_content(TextContent {
                agent_name: self.name().to_string(),
                text: String::new(),
                status: MsgStatus::Error,
                status_message: failure.clone(),
            });
            output.publish();
        }

        AgentResponse::error(failure)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("agent panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("agent panicked: {}", s)
    } else {
        "agent panicked".to_string()
    }
}
