//! # Tambo - Streaming Conversational AI Client for Rust
//!
//! Tambo drives a conversational "run" against a remote AI service: it
//! consumes the incremental event stream (text deltas, generative-UI
//! component deltas, tool-call requests), folds it into a coherent thread
//! state, and executes client-side tools when the service pauses a run to
//! request them, resubmitting results until the run finishes.
//!
//! ## Quick Start
//!
//! ```ignore
//! use tambo::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ClientError> {
//!     let transport = HttpTransport::new("https://api.tambo.co");
//!
//!     let mut tools = ToolRegistry::new();
//!     tools.register(FunctionTool::new(
//!         "get_weather",
//!         "Look up the weather for a city",
//!         SchemaBuilder::new().string("city", "City name", true).build(),
//!         |args| Box::pin(async move {
//!             let city = args["city"].as_str().unwrap_or("somewhere");
//!             Ok(serde_json::json!(format!("22C and sunny in {city}")))
//!         }),
//!     ));
//!
//!     let client = TamboClient::new(transport).with_tools(tools);
//!     let latch = CancelLatch::new();
//!
//!     let state = client.send(None, "What's the weather in Seattle?", &latch).await?;
//!     for message in &state.thread.messages {
//!         println!("{:?}: {}", message.role, message.text());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Tambo is organized as a workspace of focused crates:
//!
//! - [`tambo_core`] - Threads, messages, content blocks, and the JSON Patch
//!   applier
//! - [`tambo_stream`] - Wire events and the streaming thread reducer
//! - [`tambo_tools`] - Tool definitions, registry, and the local executor
//! - [`tambo_client`] - Transport abstraction, thread store, cancellation,
//!   and the run orchestrator
//!
//! The HTTP/SSE transport is a separate concern: implement
//! [`RunTransport`](tambo_client::RunTransport) over your wire of choice and
//! hand it to [`TamboClient`](tambo_client::TamboClient).

pub use tambo_client as client;
pub use tambo_core as core;
pub use tambo_stream as stream;
pub use tambo_tools as tools;

pub use tambo_client::{
    CancelLatch, ClientError, ComponentDefinition, InputMessage, RunRequest, RunTransport,
    SubmitOutcome, TamboClient, ThreadStore, TransportError, ValidationError,
};
pub use tambo_core::content::ContentBlock;
pub use tambo_core::thread::{
    Message, MessageRole, RunStatus, Thread, ThreadState,
};
pub use tambo_stream::{ReducerSignal, StreamEvent, ThreadReducer};
pub use tambo_tools::{
    FunctionTool, SchemaBuilder, Tool, ToolDefinition, ToolError, ToolRegistry,
};

/// Commonly used imports.
///
/// ```ignore
/// use tambo::prelude::*;
/// ```
pub mod prelude {
    pub use tambo_client::{
        CancelLatch, ClientError, ComponentDefinition, InputMessage, RunRequest, RunTransport,
        SubmitOutcome, TamboClient, ThreadStore, TransportError, ValidationError,
    };
    pub use tambo_core::content::ContentBlock;
    pub use tambo_core::thread::{Message, MessageRole, RunStatus, Thread, ThreadState};
    pub use tambo_stream::{StreamEvent, ThreadReducer};
    pub use tambo_tools::{
        FunctionTool, SchemaBuilder, Tool, ToolDefinition, ToolError, ToolRegistry,
    };
}
