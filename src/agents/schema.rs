use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HooksmithError;

/// JSON type of a declared parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParameterType {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterProperty {
    #[serde(rename = "type")]
    pub kind: ParameterType,
    pub description: String,
}

/// JSON-Schema style description of the arguments an agent accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSchema {
    #[serde(rename = "type")]
    kind: String,
    properties: BTreeMap<String, ParameterProperty>,
    required: Vec<String>,
}

impl ParameterSchema {
    /// An object schema with no properties yet
    pub fn object() -> Self {
        Self {
            kind: "object".to_string(),
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }

    /// Declare a required property
    pub fn required(
        mut self,
        name: impl Into<String>,
        kind: ParameterType,
        description: impl Into<String>,
    ) -> Self {
        let name = name.into();
        self.required.push(name.clone());
        self.properties.insert(
            name,
            ParameterProperty {
                kind,
                description: description.into(),
            },
        );
        self
    }

    /// Declare an optional property
    pub fn optional(
        mut self,
        name: impl Into<String>,
        kind: ParameterType,
        description: impl Into<String>,
    ) -> Self {
        self.properties.insert(
            name.into(),
            ParameterProperty {
                kind,
                description: description.into(),
            },
        );
        self
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn properties(&self) -> &BTreeMap<String, ParameterProperty> {
        &self.properties
    }

    pub fn required_names(&self) -> &[String] {
        &self.required
    }

    /// Check arguments against the schema: an object, every required property
    /// present and non-null, every declared property of the declared type.
    pub fn validate(&self, args: &Value) -> Result<(), HooksmithError> {
        let Some(object) = args.as_object() else {
            return Err(HooksmithError::InvalidArguments(
                "arguments must be a JSON object".to_string(),
            ));
        };

        let missing: Vec<&str> = self
            .required
            .iter()
            .filter(|name| object.get(name.as_str()).is_none_or(Value::is_null))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(HooksmithError::InvalidArguments(format!(
                "missing required parameter(s): {}",
                missing.join(", ")
            )));
        }

        for (name, property) in &self.properties {
            match object.get(name) {
                Some(value) if !value.is_null() && !property.kind.matches(value) => {
                    return Err(HooksmithError::InvalidArguments(format!(
                        "parameter '{}' must be of type {}",
                        name,
                        serde_json::to_string(&property.kind)
                            .unwrap_or_default()
                            .trim_matches('"')
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> ParameterSchema {
        ParameterSchema::object()
            .required("video_id", ParameterType::String, "ID of the video")
            .optional("limit", ParameterType::Integer, "Max results")
    }

    #[test]
    fn test_serializes_as_json_schema() {
        assert_eq!(
            serde_json::to_value(schema()).unwrap(),
            json!({
                "type": "object",
                "properties": {
                    "limit": {"type": "integer", "description": "Max results"},
                    "video_id": {"type": "string", "description": "ID of the video"}
                },
                "required": ["video_id"]
            })
        );
    }

    #[test]
    fn test_validate_accepts_matching_args() {
        schema()
            .validate(&json!({"video_id": "v-1", "limit": 3}))
            .unwrap();
        schema().validate(&json!({"video_id": "v-1"})).unwrap();
    }

    #[test]
    fn test_validate_rejects_missing_and_null() {
        let err = schema().validate(&json!({"limit": 3})).unwrap_err();
        assert!(err.to_string().contains("video_id"));

        let err = schema().validate(&json!({"video_id": null})).unwrap_err();
        assert!(err.to_string().contains("missing required"));
    }

    #[test]
    fn test_validate_rejects_wrong_type() {
        let err = schema()
            .validate(&json!({"video_id": 42}))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid arguments: parameter 'video_id' must be of type string"
        );
    }

    #[test]
    fn test_validate_rejects_non_object() {
        assert!(schema().validate(&json!(["v-1"])).is_err());
    }
}
