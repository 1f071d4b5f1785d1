use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::{Agent, AgentDescription};
use crate::error::HooksmithError;

/// Registry of the agents an orchestrator can offer
pub struct AgentRegistry {
    agents: HashMap<String, Arc<dyn Agent>>,
}

impl AgentRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            agents: HashMap::new(),
        }
    }

    /// Register an agent.
    ///
    /// Fails if the agent cannot describe itself.
    pub fn register(&mut self, agent: impl Agent + 'static) -> Result<(), HooksmithError> {
        let description = agent.describe()?;
        debug!(agent = %description.name, "registered agent");
        self.agents.insert(description.name, Arc::new(agent));
        Ok(())
    }

    /// Get an agent by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Agent>> {
        self.agents.get(name).cloned()
    }

    /// Agent names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.agents.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Descriptions of every agent, sorted by name
    pub fn describe_all(&self) -> Vec<AgentDescription> {
        self.names()
            .into_iter()
            .filter_map(|name| self.agents.get(name))
            .filter_map(|agent| agent.describe().ok())
            .collect()
    }

    /// Descriptions in the function-calling format LLMs expect
    pub fn to_llm_format(&self) -> Vec<Value> {
        self.describe_all()
            .into_iter()
            .filter_map(|d| serde_json::to_value(d).ok())
            .collect()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
