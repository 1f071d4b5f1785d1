use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outcome of an agent invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Success,
    Error,
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Result envelope returned by every agent invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    status: AgentStatus,
    message: String,
    #[serde(default)]
    data: Map<String, Value>,
}

impl AgentResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: AgentStatus::Success,
            message: message.into(),
            data: Map::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: AgentStatus::Error,
            message: message.into(),
            data: Map::new(),
        }
    }

    /// Attach a data entry
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn status(&self) -> AgentStatus {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == AgentStatus::Success
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_lowercase_status() {
        let response = AgentResponse::success("ok").with_data("template", "Hook Script:");

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"status": "success", "message": "ok", "data": {"template": "Hook Script:"}})
        );
    }

    #[test]
    fn test_error_has_no_data() {
        let response = AgentResponse::error("failed");

        assert!(!response.is_success());
        assert!(response.data().is_empty());
    }
}
