//! Message content blocks.
//!
//! A message's content is an ordered list of tagged blocks. The `type`
//! discriminant selects the variant on the wire; field names are camelCase.
//! Unrecognized discriminants deserialize into [`ContentBlock::Unknown`] so a
//! newer server never breaks an older client.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One tagged unit of message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text.
    Text {
        /// The text content.
        text: String,
    },
    /// A tool invocation requested by the model.
    #[serde(rename_all = "camelCase")]
    ToolUse {
        /// Tool call identifier.
        id: String,
        /// Tool name.
        name: String,
        /// Parsed input arguments.
        input: Value,
    },
    /// The client-produced result for a tool invocation.
    #[serde(rename_all = "camelCase")]
    ToolResult {
        /// The `tool_use` id this result answers.
        tool_use_id: String,
        /// Result content parts.
        content: Vec<ContentBlock>,
        /// Whether the tool failed.
        #[serde(default)]
        is_error: bool,
    },
    /// A streamed UI component with patchable props and state.
    #[serde(rename_all = "camelCase")]
    Component {
        /// Component instance identifier.
        id: String,
        /// Registered component name.
        name: String,
        /// Component props, mutated by props deltas.
        #[serde(default)]
        props: Value,
        /// Component state, mutated by state deltas.
        #[serde(default)]
        state: Value,
    },
    /// An embedded resource reference.
    Resource {
        /// The resource payload.
        resource: Value,
    },
    /// Forward-compatibility arm for discriminants this client predates.
    #[serde(untagged)]
    Unknown(Value),
}

impl ContentBlock {
    /// Create a text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a tool result block.
    pub fn tool_result(
        tool_use_id: impl Into<String>,
        content: Vec<ContentBlock>,
        is_error: bool,
    ) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content,
            is_error,
        }
    }

    /// Get the text if this is a text block.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Check whether this is an unrecognized block.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }
}

/// What to do with content blocks whose discriminant this client predates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownBlockPolicy {
    /// Drop the block and log a warning.
    #[default]
    Skip,
    /// Reject the whole content list.
    Error,
}

/// An unrecognized content block was rejected by [`UnknownBlockPolicy::Error`].
#[derive(Debug, Clone, Error, PartialEq)]
#[error("unrecognized content block discriminant")]
pub struct UnknownBlockError(pub Value);

/// Screen a content list against the unknown-block policy.
///
/// With [`UnknownBlockPolicy::Skip`], unknown blocks are dropped with a
/// warning; with [`UnknownBlockPolicy::Error`] the first unknown block fails
/// the whole list.
pub fn screen_blocks(
    blocks: Vec<ContentBlock>,
    policy: UnknownBlockPolicy,
) -> Result<Vec<ContentBlock>, UnknownBlockError> {
    let mut out = Vec::with_capacity(blocks.len());
    for block in blocks {
        match block {
            ContentBlock::Unknown(value) => match policy {
                UnknownBlockPolicy::Skip => {
                    tracing::warn!(?value, "skipping unrecognized content block");
                }
                UnknownBlockPolicy::Error => return Err(UnknownBlockError(value)),
            },
            other => out.push(other),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_text_block_serde() {
        let block = ContentBlock::text("hello");
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json, json!({"type": "text", "text": "hello"}));
    }

    #[test]
    fn test_tool_result_wire_names() {
        let block = ContentBlock::tool_result("call-1", vec![ContentBlock::text("ok")], false);
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "tool_result");
        assert_eq!(json["toolUseId"], "call-1");
        assert_eq!(json["isError"], false);
    }

    #[test]
    fn test_component_defaults() {
        let block: ContentBlock = serde_json::from_value(json!({
            "type": "component",
            "id": "cmp-1",
            "name": "WeatherCard"
        }))
        .unwrap();
        match block {
            ContentBlock::Component { props, state, .. } => {
                assert_eq!(props, Value::Null);
                assert_eq!(state, Value::Null);
            }
            other => panic!("unexpected block: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_discriminant_is_non_fatal() {
        let block: ContentBlock =
            serde_json::from_value(json!({"type": "hologram", "ref": "x"})).unwrap();
        assert!(block.is_unknown());
    }

    #[test]
    fn test_screen_blocks_skip() {
        let blocks = vec![
            ContentBlock::text("keep"),
            ContentBlock::Unknown(json!({"type": "hologram"})),
        ];
        let screened = screen_blocks(blocks, UnknownBlockPolicy::Skip).unwrap();
        assert_eq!(screened.len(), 1);
    }

    #[test]
    fn test_screen_blocks_error() {
        let blocks = vec![ContentBlock::Unknown(json!({"type": "hologram"}))];
        assert!(screen_blocks(blocks, UnknownBlockPolicy::Error).is_err());
    }
}
