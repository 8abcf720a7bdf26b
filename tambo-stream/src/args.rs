//! Tool-call argument assembly.
//!
//! Arguments arrive as an arbitrarily chunked JSON string; chunk boundaries
//! are not aligned with JSON tokens. The buffer concatenates fragments and
//! parses only when the call ends. Parse failure degrades to `{}` so a
//! malformed call never aborts the stream — the tool observes missing fields
//! instead.

use serde_json::{json, Value};

/// Accumulates the raw argument string for one tool call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentBuffer {
    raw: String,
}

impl ArgumentBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw fragment in arrival order.
    pub fn push_delta(&mut self, delta: &str) {
        self.raw.push_str(delta);
    }

    /// The accumulated raw string.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether any fragment arrived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Parse the accumulated string.
    ///
    /// Returns `{}` when no fragments arrived or the string is not valid
    /// JSON.
    #[must_use]
    pub fn finish(&self) -> Value {
        if self.raw.trim().is_empty() {
            return json!({});
        }
        match serde_json::from_str(&self.raw) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(%error, raw = %self.raw, "tool call arguments are not valid JSON, defaulting to {{}}");
                json!({})
            }
        }
    }
}
