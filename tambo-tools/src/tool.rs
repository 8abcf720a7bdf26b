//! The tool trait and the closure-based wrapper.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use tambo_core::content::ContentBlock;

use crate::definition::ToolDefinition;
use crate::errors::ToolError;

/// Boxed future used by closure-based tools.
pub type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Type-erased shared tool.
pub type BoxedTool = Arc<dyn Tool>;

/// A client-side tool the model can call.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use tambo_tools::{Tool, ToolDefinition, ToolError};
///
/// struct GreetTool;
///
/// #[async_trait]
/// impl Tool for GreetTool {
///     fn definition(&self) -> ToolDefinition {
///         ToolDefinition::new("greet", "Greet someone")
///     }
///
///     async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
///         let name = args["name"].as_str().unwrap_or("World");
///         Ok(serde_json::json!(format!("Hello, {name}!")))
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// The definition advertised to the service.
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with the given arguments.
    async fn call(&self, args: Value) -> Result<Value, ToolError>;

    /// Optionally turn a successful return value into custom result blocks.
    ///
    /// Return `None` to use the executor's default stringification. Blocks
    /// other than `text` and `resource` are stringified by the executor, so
    /// no part of the result is silently dropped.
    fn transform_result(&self, _value: &Value) -> Option<Vec<ContentBlock>> {
        None
    }

    /// The tool name.
    fn name(&self) -> String {
        self.definition().name
    }
}

type ToolFn = dyn Fn(Value) -> PinnedFuture<Result<Value, ToolError>> + Send + Sync;
type TransformFn = dyn Fn(&Value) -> Option<Vec<ContentBlock>> + Send + Sync;

/// Closure-based tool.
///
/// # Example
///
/// ```ignore
/// use tambo_tools::{FunctionTool, SchemaBuilder};
///
/// let tool = FunctionTool::new(
///     "add",
///     "Add two numbers",
///     SchemaBuilder::new()
///         .number("a", "First number", true)
///         .number("b", "Second number", true)
///         .build(),
///     |args| Box::pin(async move {
///         let a = args["a"].as_f64().unwrap_or(0.0);
///         let b = args["b"].as_f64().unwrap_or(0.0);
///         Ok(serde_json::json!(a + b))
///     }),
/// );
/// ```
pub struct FunctionTool {
    name: String,
    description: String,
    parameters: Value,
    function: Box<ToolFn>,
    transformer: Option<Box<TransformFn>>,
}

impl FunctionTool {
    /// Create a new function tool.
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
        function: F,
    ) -> Self
    where
        F: Fn(Value) -> PinnedFuture<Result<Value, ToolError>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            function: Box::new(function),
            transformer: None,
        }
    }

    /// Attach a custom result transformer.
    #[must_use]
    pub fn with_transformer<F>(mut self, transformer: F) -> Self
    where
        F: Fn(&Value) -> Option<Vec<ContentBlock>> + Send + Sync + 'static,
    {
        self.transformer = Some(Box::new(transformer));
        self
    }
}

#[async_trait]
impl Tool for FunctionTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(&self.name, &self.description)
            .with_parameters(self.parameters.clone())
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        (self.function)(args).await
    }

    fn transform_result(&self, value: &Value) -> Option<Vec<ContentBlock>> {
        self.transformer.as_ref().and_then(|t| t(value))
    }
}

impl std::fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("has_transformer", &self.transformer.is_some())
            .finish()
    }
}
