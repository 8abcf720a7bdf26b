//! Wire event types.
//!
//! Events stream from the service as JSON objects discriminated by a stable
//! `type` string (SCREAMING_SNAKE), with camelCase fields:
//!
//! - **Run lifecycle**: `RUN_STARTED`, `RUN_FINISHED`, `RUN_ERROR`
//! - **Text messages**: `TEXT_MESSAGE_START`, `TEXT_MESSAGE_CONTENT`,
//!   `TEXT_MESSAGE_END`
//! - **Tool calls**: `TOOL_CALL_START`, `TOOL_CALL_ARGS`, `TOOL_CALL_END`,
//!   `TOOL_CALL_RESULT`
//! - **Custom**: `CUSTOM` with a dotted `name` (component deltas and the
//!   awaiting-input signal, see [`custom`])
//!
//! Event types this client predates deserialize into
//! [`StreamEvent::Unknown`]; the reducer ignores them rather than failing the
//! stream.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tambo_core::patch::PatchOp;

/// One event from the run stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StreamEvent {
    /// A run has started on a thread.
    #[serde(rename = "RUN_STARTED", rename_all = "camelCase")]
    RunStarted {
        /// Thread the run belongs to. Authoritative for new threads.
        thread_id: String,
        /// Run identifier, needed for continuation.
        run_id: String,
        /// Unix millis.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<i64>,
    },

    /// The run finished successfully.
    #[serde(rename = "RUN_FINISHED", rename_all = "camelCase")]
    RunFinished {
        /// Thread identifier.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thread_id: Option<String>,
        /// Run identifier.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        run_id: Option<String>,
        /// Unix millis.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<i64>,
    },

    /// The run failed.
    #[serde(rename = "RUN_ERROR")]
    RunError {
        /// Error message.
        message: String,
        /// Optional machine-readable code.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
        /// Unix millis.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<i64>,
    },

    /// A new text message opened.
    #[serde(rename = "TEXT_MESSAGE_START", rename_all = "camelCase")]
    TextMessageStart {
        /// Message identifier, stable while the message streams.
        message_id: String,
        /// Sender role; assistant when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        role: Option<String>,
        /// Unix millis.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<i64>,
    },

    /// A text delta for an open message.
    #[serde(rename = "TEXT_MESSAGE_CONTENT", rename_all = "camelCase")]
    TextMessageContent {
        /// Target message.
        message_id: String,
        /// Text fragment, appended in arrival order.
        delta: String,
        /// Unix millis.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<i64>,
    },

    /// A text message closed (structural only).
    #[serde(rename = "TEXT_MESSAGE_END", rename_all = "camelCase")]
    TextMessageEnd {
        /// Target message.
        message_id: String,
        /// Unix millis.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<i64>,
    },

    /// The model opened a tool call.
    #[serde(rename = "TOOL_CALL_START", rename_all = "camelCase")]
    ToolCallStart {
        /// Tool call identifier.
        tool_call_id: String,
        /// Tool name.
        tool_call_name: String,
        /// Assistant message carrying the call.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_message_id: Option<String>,
        /// Unix millis.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<i64>,
    },

    /// A raw fragment of the call's argument JSON string.
    #[serde(rename = "TOOL_CALL_ARGS", rename_all = "camelCase")]
    ToolCallArgs {
        /// Target tool call.
        tool_call_id: String,
        /// Argument string fragment; chunk boundaries carry no meaning.
        delta: String,
        /// Unix millis.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<i64>,
    },

    /// The call's arguments are complete.
    #[serde(rename = "TOOL_CALL_END", rename_all = "camelCase")]
    ToolCallEnd {
        /// Target tool call.
        tool_call_id: String,
        /// Unix millis.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<i64>,
    },

    /// The service resolved a tool call itself.
    #[serde(rename = "TOOL_CALL_RESULT", rename_all = "camelCase")]
    ToolCallResult {
        /// Message the result lands in.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message_id: Option<String>,
        /// The answered tool call.
        tool_call_id: String,
        /// Result payload.
        content: Value,
        /// Unix millis.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<i64>,
    },

    /// Application-specific event; see [`custom`] for the names this client
    /// understands.
    #[serde(rename = "CUSTOM")]
    Custom {
        /// Dotted event name.
        name: String,
        /// Event payload.
        #[serde(default)]
        data: Value,
        /// Unix millis.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<i64>,
    },

    /// Forward-compatibility arm for event types this client predates.
    #[serde(untagged)]
    Unknown(Value),
}

/// Custom event names carried inside `CUSTOM` events.
pub mod custom {
    /// A component block opened.
    pub const COMPONENT_START: &str = "tambo.component.start";
    /// JSON Patch ops against a component's props.
    pub const COMPONENT_PROPS_DELTA: &str = "tambo.component.props_delta";
    /// JSON Patch ops against a component's state.
    pub const COMPONENT_STATE_DELTA: &str = "tambo.component.state_delta";
    /// A component block closed (structural only).
    pub const COMPONENT_END: &str = "tambo.component.end";
    /// The run paused for client-side tool execution.
    pub const AWAITING_INPUT: &str = "tambo.run.awaiting_input";
}

/// Payload of `tambo.component.start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStartPayload {
    /// Component instance identifier.
    pub component_id: String,
    /// Registered component name.
    #[serde(default)]
    pub component_name: Option<String>,
    /// Message the block belongs to; the current message when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

/// Payload of the component props/state delta events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDeltaPayload {
    /// Target component instance.
    pub component_id: String,
    /// Patch batch; applied atomically.
    pub patch: Vec<PatchOp>,
}

/// Payload of `tambo.component.end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentEndPayload {
    /// Closed component instance.
    pub component_id: String,
}

/// Payload of `tambo.run.awaiting_input`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwaitingInputPayload {
    /// Tool calls the service wants executed before it continues.
    pub pending_tool_call_ids: Vec<String>,
}

/// A parsed custom event payload.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomPayload {
    /// `tambo.component.start`
    ComponentStart(ComponentStartPayload),
    /// `tambo.component.props_delta`
    ComponentPropsDelta(ComponentDeltaPayload),
    /// `tambo.component.state_delta`
    ComponentStateDelta(ComponentDeltaPayload),
    /// `tambo.component.end`
    ComponentEnd(ComponentEndPayload),
    /// `tambo.run.awaiting_input`
    AwaitingInput(AwaitingInputPayload),
}

impl CustomPayload {
    /// Parse a custom event by name.
    ///
    /// Returns `Ok(None)` for names this client does not understand and
    /// `Err` for a recognized name with a malformed payload; neither is
    /// fatal to the stream.
    pub fn parse(name: &str, data: &Value) -> Result<Option<Self>, serde_json::Error> {
        let payload = match name {
            custom::COMPONENT_START => {
                Self::ComponentStart(serde_json::from_value(data.clone())?)
            }
            custom::COMPONENT_PROPS_DELTA => {
                Self::ComponentPropsDelta(serde_json::from_value(data.clone())?)
            }
            custom::COMPONENT_STATE_DELTA => {
                Self::ComponentStateDelta(serde_json::from_value(data.clone())?)
            }
            custom::COMPONENT_END => Self::ComponentEnd(serde_json::from_value(data.clone())?),
            custom::AWAITING_INPUT => {
                // The payload is either {"pendingToolCallIds": [...]} or the
                // bare id array.
                let ids = if data.is_array() {
                    AwaitingInputPayload {
                        pending_tool_call_ids: serde_json::from_value(data.clone())?,
                    }
                } else {
                    serde_json::from_value(data.clone())?
                };
                Self::AwaitingInput(ids)
            }
            _ => return Ok(None),
        };
        Ok(Some(payload))
    }
}
