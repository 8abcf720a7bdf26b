//! Transport abstraction.
//!
//! The concrete wire (HTTP + SSE in production) lives outside this crate.
//! The orchestrator only needs two operations, each yielding an event
//! stream: start a run on a new thread, or start one on an existing thread.
//! Timeouts and retry policy belong to the transport implementation.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use tambo_core::content::ContentBlock;
use tambo_core::thread::MessageRole;
use tambo_stream::StreamEvent;
use tambo_tools::ToolDefinition;

use crate::errors::TransportError;

/// Event stream returned by a transport.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, TransportError>> + Send>>;

/// A message submitted to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputMessage {
    /// Sender role.
    pub role: MessageRole,
    /// Content blocks, in order.
    pub content: Vec<ContentBlock>,
}

impl InputMessage {
    /// A user message with a single text block.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: vec![ContentBlock::text(text)],
        }
    }

    /// A user message carrying arbitrary blocks (tool results, for the
    /// continuation flow).
    #[must_use]
    pub fn user(content: Vec<ContentBlock>) -> Self {
        Self {
            role: MessageRole::User,
            content,
        }
    }
}

/// A UI component the client can render, advertised to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDefinition {
    /// Registered component name.
    pub name: String,
    /// What the component shows, written for the model.
    pub description: String,
    /// JSON Schema for the component props.
    pub props_schema: Value,
}

/// Everything the service needs to start (or continue) a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    /// The triggering message.
    pub message: InputMessage,
    /// Components the client can render.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub available_components: Vec<ComponentDefinition>,
    /// Tools the client can execute.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
    /// Set on continuation runs: the run this one resumes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_run_id: Option<String>,
}

impl RunRequest {
    /// A request carrying just a message.
    #[must_use]
    pub fn new(message: InputMessage) -> Self {
        Self {
            message,
            available_components: Vec::new(),
            tools: Vec::new(),
            previous_run_id: None,
        }
    }

    /// Advertise renderable components.
    #[must_use]
    pub fn with_components(mut self, components: Vec<ComponentDefinition>) -> Self {
        self.available_components = components;
        self
    }

    /// Advertise executable tools.
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// Mark this request as a continuation of a previous run.
    #[must_use]
    pub fn continuing(mut self, previous_run_id: impl Into<String>) -> Self {
        self.previous_run_id = Some(previous_run_id.into());
        self
    }
}

/// The wire the orchestrator drives runs over.
#[async_trait]
pub trait RunTransport: Send + Sync {
    /// Start a run on a brand-new thread. The first stream event must be
    /// `RUN_STARTED` carrying the authoritative thread id.
    async fn create_thread_run(&self, request: RunRequest) -> Result<EventStream, TransportError>;

    /// Start a run (or a continuation) on an existing thread.
    async fn run_on_thread(
        &self,
        thread_id: &str,
        request: RunRequest,
    ) -> Result<EventStream, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_run_request_serialization() {
        let request = RunRequest::new(InputMessage::user_text("hi"))
            .with_tools(vec![ToolDefinition::new("get_weather", "Look up weather")])
            .continuing("run_1");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["previousRunId"], "run_1");
        assert_eq!(value["message"]["role"], "user");
        assert_eq!(value["tools"][0]["name"], "get_weather");
        assert!(value.get("availableComponents").is_none());
    }

    #[test]
    fn test_input_message_user_text() {
        let msg = InputMessage::user_text("hello");
        assert_eq!(msg.content, vec![ContentBlock::text("hello")]);
        assert_eq!(msg.role, MessageRole::User);
    }

    #[test]
    fn test_component_definition_round_trip() {
        let def = ComponentDefinition {
            name: "WeatherCard".into(),
            description: "Shows current weather".into(),
            props_schema: json!({"type": "object"}),
        };
        let value = serde_json::to_value(&def).unwrap();
        assert_eq!(value["propsSchema"]["type"], "object");
    }
}
