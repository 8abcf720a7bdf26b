//! Core types for the tambo client.
//!
//! This crate defines the data model shared by the streaming reducer, tool
//! executor, and run orchestrator:
//!
//! - **Threads and messages**: [`Thread`], [`Message`], [`ThreadState`]
//! - **Content blocks**: [`ContentBlock`] and the unknown-block policy
//! - **JSON Patch**: [`patch::apply`] for component prop/state deltas
//! - **Ids**: prefixed UUID generators in [`ids`]

pub mod content;
pub mod ids;
pub mod patch;
pub mod thread;

pub use content::{screen_blocks, ContentBlock, UnknownBlockError, UnknownBlockPolicy};
pub use patch::{PatchError, PatchOp};
pub use thread::{
    Message, MessageRole, PendingToolCall, RunErrorInfo, RunStatus, StreamingState, Thread,
    ThreadState,
};
