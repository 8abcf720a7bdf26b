//! Conversation threads and messages.
//!
//! A [`Thread`] owns an ordered, append-mostly sequence of [`Message`]s and a
//! single [`RunStatus`]. The streaming reducer is the only writer during a
//! run; UI consumers read cloned [`ThreadState`] snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::ContentBlock;
use crate::ids;

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The end user.
    User,
    /// The model.
    #[default]
    Assistant,
    /// A tool result carrier.
    Tool,
}

impl MessageRole {
    /// Parse a wire role string, defaulting to assistant.
    #[must_use]
    pub fn parse(role: &str) -> Self {
        match role {
            "user" => Self::User,
            "tool" => Self::Tool,
            _ => Self::Assistant,
        }
    }
}

/// Run lifecycle status. Exactly one is active per thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// No run in flight.
    #[default]
    Idle,
    /// Run paused, waiting for client tool results.
    Waiting,
    /// Events are being consumed.
    Streaming,
    /// Run finished successfully.
    Complete,
    /// Run failed.
    Error,
    /// Run was cancelled by the client.
    Cancelled,
}

/// One message in a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Stable message identifier. A new id arriving mid-stream finalizes the
    /// previous message.
    pub id: String,
    /// Sender role.
    pub role: MessageRole,
    /// Ordered content blocks.
    pub content: Vec<ContentBlock>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Opaque metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl Message {
    /// Create an empty message with the given id and role.
    pub fn new(id: impl Into<String>, role: MessageRole) -> Self {
        Self {
            id: id.into(),
            role,
            content: Vec::new(),
            created_at: ids::now_utc(),
            metadata: None,
        }
    }

    /// Create a user message with the given content.
    pub fn user(content: Vec<ContentBlock>) -> Self {
        let mut msg = Self::new(ids::generate_message_id(), MessageRole::User);
        msg.content = content;
        msg
    }

    /// Get the last text block, if the message ends with one.
    pub fn last_text_mut(&mut self) -> Option<&mut String> {
        match self.content.last_mut() {
            Some(ContentBlock::Text { text }) => Some(text),
            _ => None,
        }
    }

    /// Concatenated text of all text blocks.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect()
    }
}

/// A conversation thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    /// Thread identifier. Empty until the service assigns one on the first
    /// run of a new thread.
    pub id: String,
    /// Owning project, if scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Ordered messages.
    pub messages: Vec<Message>,
    /// Current run status.
    pub status: RunStatus,
    /// Opaque metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl Thread {
    /// Create an empty thread with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        let now = ids::now_utc();
        Self {
            id: id.into(),
            project_id: None,
            messages: Vec::new(),
            status: RunStatus::Idle,
            metadata: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a thread whose id the service has not assigned yet.
    #[must_use]
    pub fn unassigned() -> Self {
        Self::new("")
    }

    /// Whether the service has assigned this thread an id.
    #[must_use]
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    /// Append a message and bump `updated_at`.
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = ids::now_utc();
    }

    /// Find a message by id.
    pub fn message_mut(&mut self, id: &str) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }

    /// Tool-call ids of `tool_use` blocks with no matching `tool_result`.
    ///
    /// These are the ids the thread is waiting on before it can progress past
    /// [`RunStatus::Waiting`], in order of appearance.
    #[must_use]
    pub fn unmatched_tool_use_ids(&self) -> Vec<String> {
        let mut resolved = Vec::new();
        for message in &self.messages {
            for block in &message.content {
                if let ContentBlock::ToolResult { tool_use_id, .. } = block {
                    resolved.push(tool_use_id.clone());
                }
            }
        }
        let mut unmatched = Vec::new();
        for message in &self.messages {
            for block in &message.content {
                if let ContentBlock::ToolUse { id, .. } = block {
                    if !resolved.contains(id) {
                        unmatched.push(id.clone());
                    }
                }
            }
        }
        unmatched
    }
}

/// Terminal error details from a `RUN_ERROR` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunErrorInfo {
    /// Human-readable message.
    pub message: String,
    /// Machine-readable code, if the service supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Ephemeral per-run streaming state, rebuilt at the start of each run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingState {
    /// Current status (mirrors the thread status during a run).
    pub status: RunStatus,
    /// Id of the run currently streaming, once `RUN_STARTED` arrives.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    /// Id of the message currently receiving deltas.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Error details after a `RUN_ERROR`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RunErrorInfo>,
}

/// The snapshot handed to UI consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadState {
    /// The thread and its messages.
    pub thread: Thread,
    /// Per-run streaming state.
    pub streaming: StreamingState,
}

impl ThreadState {
    /// Wrap a thread with fresh streaming state.
    pub fn new(thread: Thread) -> Self {
        Self {
            thread,
            streaming: StreamingState::default(),
        }
    }
}

/// A tool call awaiting client execution, scoped to a single run attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingToolCall {
    /// Tool call identifier.
    pub tool_call_id: String,
    /// Tool name requested by the model.
    pub name: String,
    /// Assembled input arguments (`{}` when assembly failed or was empty).
    pub input: Value,
}
