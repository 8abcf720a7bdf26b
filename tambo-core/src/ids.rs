//! ID generation utilities.
//!
//! Prefixed UUID v4 identifiers for threads, messages, runs, and tool calls.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a unique thread ID.
///
/// # Example
///
/// ```rust
/// use tambo_core::ids::generate_thread_id;
///
/// let id = generate_thread_id();
/// assert!(id.starts_with("thr_"));
/// ```
#[must_use]
pub fn generate_thread_id() -> String {
    format!("thr_{}", Uuid::new_v4().simple())
}

/// Generate a unique message ID.
#[must_use]
pub fn generate_message_id() -> String {
    format!("msg_{}", Uuid::new_v4().simple())
}

/// Generate a unique run ID.
#[must_use]
pub fn generate_run_id() -> String {
    format!("run_{}", Uuid::new_v4().simple())
}

/// Generate a unique tool call ID.
#[must_use]
pub fn generate_tool_call_id() -> String {
    format!("call_{}", Uuid::new_v4().simple())
}

/// Get the current UTC timestamp.
#[must_use]
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}
