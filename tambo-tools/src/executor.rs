//! Client-side tool execution.
//!
//! The executor is total: every outcome of a tool call, including a panic,
//! becomes a `tool_result` content block. A failing tool never aborts the
//! run; the service sees the failure as an error result and can react.

use futures::FutureExt;
use serde_json::Value;

use tambo_core::content::ContentBlock;

use crate::errors::ToolError;
use crate::registry::ToolRegistry;
use crate::tool::Tool;

use tambo_core::thread::PendingToolCall;

/// Placeholder text when a tool panics. The panic payload is logged, not
/// forwarded to the service.
const PANIC_PLACEHOLDER: &str = "Tool execution failed";

/// Run one tool call to completion, producing its `tool_result` block.
pub async fn execute_tool(
    tool: &dyn Tool,
    tool_call_id: impl Into<String>,
    args: Value,
) -> ContentBlock {
    let tool_call_id = tool_call_id.into();
    let outcome = std::panic::AssertUnwindSafe(tool.call(args))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(value)) => {
            let content = match tool.transform_result(&value) {
                Some(blocks) => normalize_blocks(blocks),
                None => default_blocks(&value),
            };
            ContentBlock::tool_result(tool_call_id, content, false)
        }
        Ok(Err(error)) => {
            tracing::warn!(%tool_call_id, %error, "tool returned an error");
            ContentBlock::tool_result(
                tool_call_id,
                vec![ContentBlock::text(error.to_string())],
                true,
            )
        }
        Err(panic) => {
            let detail = panic_message(&panic);
            tracing::warn!(%tool_call_id, panic = %detail, "tool panicked");
            ContentBlock::tool_result(
                tool_call_id,
                vec![ContentBlock::text(PANIC_PLACEHOLDER)],
                true,
            )
        }
    }
}

/// Execute pending calls sequentially, in submission order.
///
/// Sequential on purpose: tools may share client-side state and the service
/// expects results in request order. A name missing from the registry yields
/// an error result for that call instead of failing the batch.
pub async fn execute_all_pending(
    registry: &ToolRegistry,
    calls: Vec<PendingToolCall>,
) -> Vec<ContentBlock> {
    let mut results = Vec::with_capacity(calls.len());
    for call in calls {
        let block = match registry.get(&call.name) {
            Some(tool) => {
                execute_tool(tool.as_ref(), call.tool_call_id.as_str(), call.input).await
            }
            None => {
                tracing::warn!(tool = %call.name, tool_call_id = %call.tool_call_id, "unknown tool requested");
                ContentBlock::tool_result(
                    call.tool_call_id,
                    vec![ContentBlock::text(
                        ToolError::NotFound(call.name).to_string(),
                    )],
                    true,
                )
            }
        };
        results.push(block);
    }
    results
}

/// Default mapping of a return value to result content.
///
/// Strings pass through unchanged; everything else is rendered as compact
/// JSON text.
fn default_blocks(value: &Value) -> Vec<ContentBlock> {
    match value {
        Value::String(text) => vec![ContentBlock::text(text.clone())],
        other => vec![ContentBlock::text(other.to_string())],
    }
}

/// Keep natively supported result blocks; stringify the rest so no part of a
/// transformed result is dropped.
fn normalize_blocks(blocks: Vec<ContentBlock>) -> Vec<ContentBlock> {
    blocks
        .into_iter()
        .map(|block| match block {
            keep @ (ContentBlock::Text { .. } | ContentBlock::Resource { .. }) => keep,
            other => match serde_json::to_string(&other) {
                Ok(text) => ContentBlock::text(text),
                Err(error) => {
                    tracing::warn!(%error, "failed to stringify transformed result block");
                    ContentBlock::text("{}")
                }
            },
        })
        .collect()
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = panic.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = panic.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
