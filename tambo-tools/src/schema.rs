//! JSON schema construction for tool parameters.

use indexmap::IndexMap;
use serde_json::Value;

/// Fluent builder for tool parameter schemas.
///
/// # Example
///
/// ```rust
/// use tambo_tools::SchemaBuilder;
///
/// let schema = SchemaBuilder::new()
///     .string("city", "City to look up", true)
///     .integer("days", "Forecast length in days", false)
///     .build();
/// assert_eq!(schema["required"], serde_json::json!(["city"]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    properties: IndexMap<String, Value>,
    required: Vec<String>,
    description: Option<String>,
}

impl SchemaBuilder {
    /// Create a new empty schema builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string property.
    #[must_use]
    pub fn string(self, name: &str, desc: &str, required: bool) -> Self {
        self.property(name, "string", desc, required)
    }

    /// Add a number property.
    #[must_use]
    pub fn number(self, name: &str, desc: &str, required: bool) -> Self {
        self.property(name, "number", desc, required)
    }

    /// Add an integer property.
    #[must_use]
    pub fn integer(self, name: &str, desc: &str, required: bool) -> Self {
        self.property(name, "integer", desc, required)
    }

    /// Add a boolean property.
    #[must_use]
    pub fn boolean(self, name: &str, desc: &str, required: bool) -> Self {
        self.property(name, "boolean", desc, required)
    }

    /// Add an array property with the given item schema.
    #[must_use]
    pub fn array(mut self, name: &str, desc: &str, items: Value, required: bool) -> Self {
        self.properties.insert(
            name.to_string(),
            serde_json::json!({
                "type": "array",
                "description": desc,
                "items": items
            }),
        );
        if required {
            self.required.push(name.to_string());
        }
        self
    }

    /// Add an object property with an explicit schema.
    #[must_use]
    pub fn object(mut self, name: &str, schema: Value, required: bool) -> Self {
        self.properties.insert(name.to_string(), schema);
        if required {
            self.required.push(name.to_string());
        }
        self
    }

    /// Set the top-level schema description.
    #[must_use]
    pub fn description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Build the schema as a JSON value.
    #[must_use]
    pub fn build(self) -> Value {
        let mut schema = serde_json::json!({
            "type": "object",
            "properties": self.properties,
        });
        if !self.required.is_empty() {
            schema["required"] = Value::from(self.required);
        }
        if let Some(desc) = self.description {
            schema["description"] = Value::String(desc);
        }
        schema
    }

    fn property(mut self, name: &str, kind: &str, desc: &str, required: bool) -> Self {
        self.properties.insert(
            name.to_string(),
            serde_json::json!({
                "type": kind,
                "description": desc
            }),
        );
        if required {
            self.required.push(name.to_string());
        }
        self
    }
}
