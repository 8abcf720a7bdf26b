//! Client-side tools: definitions, registry, and the executor.
//!
//! Tools are advertised to the service as [`ToolDefinition`]s and executed
//! locally when a run pauses for input. The executor normalizes every
//! outcome, including panics, into `tool_result` content blocks so a failing
//! tool never aborts a run.

pub mod definition;
pub mod errors;
pub mod executor;
pub mod registry;
pub mod schema;
pub mod tool;

pub use definition::ToolDefinition;
pub use errors::ToolError;
pub use executor::{execute_all_pending, execute_tool};
pub use registry::ToolRegistry;
pub use schema::SchemaBuilder;
pub use tool::{BoxedTool, FunctionTool, PinnedFuture, Tool};
