//! Tool definitions sent to the service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Describes a tool to the model: name, description, and a JSON Schema for
/// its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// What the tool does, written for the model.
    pub description: String,
    /// JSON Schema object for the arguments.
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a definition with an empty parameter schema.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        }
    }

    /// Set the parameter schema.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = parameters;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_definition_serializes_camel_case() {
        let def = ToolDefinition::new("get_weather", "Look up the weather")
            .with_parameters(json!({"type": "object", "properties": {"city": {"type": "string"}}}));
        let value = serde_json::to_value(&def).unwrap();
        assert_eq!(value["name"], "get_weather");
        assert_eq!(value["parameters"]["properties"]["city"]["type"], "string");
    }
}
