//! The event accumulator.
//!
//! [`ThreadReducer`] folds an ordered event stream into [`ThreadState`], one
//! event at a time, strictly in arrival order — it never reorders, buffers,
//! or speculatively applies future events. Malformed deltas are absorbed
//! locally; only control-flow transitions surface as [`ReducerSignal`]s for
//! the orchestrator.

use indexmap::IndexMap;
use serde_json::{json, Value};

use tambo_core::content::ContentBlock;
use tambo_core::ids;
use tambo_core::patch;
use tambo_core::thread::{
    Message, MessageRole, PendingToolCall, RunErrorInfo, RunStatus, StreamingState, Thread,
    ThreadState,
};

use crate::args::ArgumentBuffer;
use crate::events::{CustomPayload, StreamEvent};

/// Control-flow transitions the orchestrator watches for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReducerSignal {
    /// The run paused; the named tool calls need client execution.
    AwaitingInput {
        /// Requested tool call ids, in service order.
        pending_tool_call_ids: Vec<String>,
    },
    /// `RUN_FINISHED` arrived.
    Finished,
    /// `RUN_ERROR` arrived.
    Errored,
}

#[derive(Debug)]
struct PendingEntry {
    name: String,
    args: ArgumentBuffer,
    input: Value,
}

/// Per-thread state machine driving [`ThreadState`] from stream events.
#[derive(Debug)]
pub struct ThreadReducer {
    state: ThreadState,
    pending: IndexMap<String, PendingEntry>,
}

impl ThreadReducer {
    /// Create a reducer over a thread. Pending tool calls start empty; they
    /// are scoped to the run attempts this reducer drives.
    pub fn new(thread: Thread) -> Self {
        Self {
            state: ThreadState::new(thread),
            pending: IndexMap::new(),
        }
    }

    /// Reset the ephemeral streaming state at the start of a run attempt.
    pub fn begin_run(&mut self) {
        self.state.streaming = StreamingState::default();
    }

    /// The current snapshot.
    #[must_use]
    pub fn state(&self) -> &ThreadState {
        &self.state
    }

    /// Consume the reducer, yielding the final snapshot.
    #[must_use]
    pub fn into_state(self) -> ThreadState {
        self.state
    }

    /// Ids of tool calls assembled but not yet executed, in arrival order.
    #[must_use]
    pub fn pending_ids(&self) -> Vec<String> {
        self.pending.keys().cloned().collect()
    }

    /// Remove and return the named pending calls, preserving the requested
    /// order. Ids with no pending entry are skipped with a warning.
    pub fn take_pending(&mut self, ids: &[String]) -> Vec<PendingToolCall> {
        let mut taken = Vec::with_capacity(ids.len());
        for id in ids {
            match self.pending.shift_remove(id) {
                Some(entry) => taken.push(PendingToolCall {
                    tool_call_id: id.clone(),
                    name: entry.name,
                    input: entry.input,
                }),
                None => {
                    tracing::warn!(tool_call_id = %id, "awaiting-input requested an unknown tool call");
                }
            }
        }
        taken
    }

    /// Record a locally produced message (optimistic user input, submitted
    /// tool results) without going through the event stream.
    pub fn append_local_message(&mut self, message: Message) {
        self.state.thread.push_message(message);
    }

    /// Mark the thread cancelled (cooperative cancellation observed).
    pub fn mark_cancelled(&mut self) {
        self.state.thread.status = RunStatus::Cancelled;
        self.state.streaming.status = RunStatus::Cancelled;
    }

    /// Apply one event, returning a signal when the event changes control
    /// flow. Unknown events are ignored by policy.
    pub fn apply(&mut self, event: &StreamEvent) -> Option<ReducerSignal> {
        match event {
            StreamEvent::RunStarted {
                thread_id, run_id, ..
            } => {
                if !self.state.thread.has_id() {
                    self.state.thread.id = thread_id.clone();
                }
                self.state.thread.status = RunStatus::Streaming;
                self.state.streaming.status = RunStatus::Streaming;
                self.state.streaming.run_id = Some(run_id.clone());
                tracing::debug!(thread_id = %self.state.thread.id, run_id = %run_id, "run started");
                None
            }

            StreamEvent::TextMessageStart {
                message_id, role, ..
            } => {
                let role = role
                    .as_deref()
                    .map(MessageRole::parse)
                    .unwrap_or(MessageRole::Assistant);
                self.ensure_message(message_id, role);
                self.state.streaming.message_id = Some(message_id.clone());
                None
            }

            StreamEvent::TextMessageContent {
                message_id, delta, ..
            } => {
                let message = self.ensure_message(message_id, MessageRole::Assistant);
                match message.last_text_mut() {
                    Some(text) => text.push_str(delta),
                    None => message.content.push(ContentBlock::text(delta.clone())),
                }
                self.state.streaming.message_id = Some(message_id.clone());
                None
            }

            StreamEvent::TextMessageEnd { message_id, .. } => {
                // Finalization is structural only.
                if self.state.streaming.message_id.as_deref() == Some(message_id) {
                    self.state.streaming.message_id = None;
                }
                None
            }

            StreamEvent::ToolCallStart {
                tool_call_id,
                tool_call_name,
                parent_message_id,
                ..
            } => {
                self.pending.insert(
                    tool_call_id.clone(),
                    PendingEntry {
                        name: tool_call_name.clone(),
                        args: ArgumentBuffer::new(),
                        input: json!({}),
                    },
                );
                let target = parent_message_id
                    .clone()
                    .or_else(|| self.state.streaming.message_id.clone())
                    .unwrap_or_else(ids::generate_message_id);
                let message = self.ensure_message(&target, MessageRole::Assistant);
                message.content.push(ContentBlock::ToolUse {
                    id: tool_call_id.clone(),
                    name: tool_call_name.clone(),
                    input: json!({}),
                });
                None
            }

            StreamEvent::ToolCallArgs {
                tool_call_id,
                delta,
                ..
            } => {
                match self.pending.get_mut(tool_call_id) {
                    Some(entry) => entry.args.push_delta(delta),
                    None => {
                        tracing::warn!(%tool_call_id, "argument delta for an unopened tool call");
                    }
                }
                None
            }

            StreamEvent::ToolCallEnd { tool_call_id, .. } => {
                if let Some(entry) = self.pending.get_mut(tool_call_id) {
                    entry.input = entry.args.finish();
                    let input = entry.input.clone();
                    if let Some(slot) = self.tool_use_input_mut(tool_call_id) {
                        *slot = input;
                    }
                }
                None
            }

            StreamEvent::ToolCallResult {
                message_id,
                tool_call_id,
                content,
                ..
            } => {
                // The service resolved the call itself; it is no longer ours
                // to execute.
                self.pending.shift_remove(tool_call_id);
                let id = message_id
                    .clone()
                    .unwrap_or_else(ids::generate_message_id);
                let mut message = Message::new(id, MessageRole::Tool);
                message.content.push(ContentBlock::tool_result(
                    tool_call_id.clone(),
                    result_blocks(content),
                    false,
                ));
                self.state.thread.push_message(message);
                None
            }

            StreamEvent::Custom { name, data, .. } => self.apply_custom(name, data),

            StreamEvent::RunFinished { .. } => {
                // A run that already paused for input stays waiting; its
                // stream closing is not completion.
                if self.state.thread.status != RunStatus::Waiting {
                    self.state.thread.status = RunStatus::Complete;
                    self.state.streaming.status = RunStatus::Complete;
                }
                Some(ReducerSignal::Finished)
            }

            StreamEvent::RunError { message, code, .. } => {
                self.state.thread.status = RunStatus::Error;
                self.state.streaming.status = RunStatus::Error;
                self.state.streaming.error = Some(RunErrorInfo {
                    message: message.clone(),
                    code: code.clone(),
                });
                Some(ReducerSignal::Errored)
            }

            StreamEvent::Unknown(value) => {
                tracing::debug!(?value, "ignoring unknown event type");
                None
            }
        }
    }

    fn apply_custom(&mut self, name: &str, data: &Value) -> Option<ReducerSignal> {
        let payload = match CustomPayload::parse(name, data) {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                tracing::debug!(%name, "ignoring unrecognized custom event");
                return None;
            }
            Err(error) => {
                tracing::warn!(%name, %error, "skipping malformed custom event payload");
                return None;
            }
        };

        match payload {
            CustomPayload::ComponentStart(start) => {
                let target = start
                    .message_id
                    .or_else(|| self.state.streaming.message_id.clone())
                    .unwrap_or_else(ids::generate_message_id);
                let message = self.ensure_message(&target, MessageRole::Assistant);
                message.content.push(ContentBlock::Component {
                    id: start.component_id,
                    name: start.component_name.unwrap_or_default(),
                    props: json!({}),
                    state: json!({}),
                });
                None
            }
            CustomPayload::ComponentPropsDelta(delta) => {
                self.patch_component(&delta.component_id, &delta.patch, ComponentPart::Props);
                None
            }
            CustomPayload::ComponentStateDelta(delta) => {
                self.patch_component(&delta.component_id, &delta.patch, ComponentPart::State);
                None
            }
            CustomPayload::ComponentEnd(_) => None,
            CustomPayload::AwaitingInput(payload) => {
                self.state.thread.status = RunStatus::Waiting;
                self.state.streaming.status = RunStatus::Waiting;
                Some(ReducerSignal::AwaitingInput {
                    pending_tool_call_ids: payload.pending_tool_call_ids,
                })
            }
        }
    }

    /// Apply a patch batch to one side of a component block. A failed batch
    /// is dropped; the block keeps its previous value.
    fn patch_component(&mut self, component_id: &str, ops: &[patch::PatchOp], part: ComponentPart) {
        let Some((props, state)) = self.component_parts_mut(component_id) else {
            tracing::warn!(%component_id, "delta for an unknown component block");
            return;
        };
        let slot = match part {
            ComponentPart::Props => props,
            ComponentPart::State => state,
        };
        match patch::apply(slot, ops) {
            Ok(patched) => *slot = patched,
            Err(error) => {
                tracing::warn!(%component_id, %error, "dropping component patch batch");
            }
        }
    }

    /// Find or create the message with the given id. A fresh id arriving
    /// mid-stream implicitly finalizes the previous message.
    fn ensure_message(&mut self, message_id: &str, role: MessageRole) -> &mut Message {
        let found = self
            .state
            .thread
            .messages
            .iter()
            .position(|m| m.id == message_id);
        let index = match found {
            Some(index) => index,
            None => {
                self.state
                    .thread
                    .push_message(Message::new(message_id, role));
                self.state.thread.messages.len() - 1
            }
        };
        &mut self.state.thread.messages[index]
    }

    fn tool_use_input_mut(&mut self, tool_call_id: &str) -> Option<&mut Value> {
        self.state
            .thread
            .messages
            .iter_mut()
            .flat_map(|m| m.content.iter_mut())
            .find_map(|block| match block {
                ContentBlock::ToolUse { id, input, .. } if id == tool_call_id => Some(input),
                _ => None,
            })
    }

    fn component_parts_mut(&mut self, component_id: &str) -> Option<(&mut Value, &mut Value)> {
        self.state
            .thread
            .messages
            .iter_mut()
            .flat_map(|m| m.content.iter_mut())
            .find_map(|block| match block {
                ContentBlock::Component {
                    id, props, state, ..
                } if id == component_id => Some((props, state)),
                _ => None,
            })
    }
}

#[derive(Debug, Clone, Copy)]
enum ComponentPart {
    Props,
    State,
}

/// Coerce a `TOOL_CALL_RESULT` payload into result content blocks.
fn result_blocks(content: &Value) -> Vec<ContentBlock> {
    if let Value::String(text) = content {
        return vec![ContentBlock::text(text.clone())];
    }
    if content.is_array() {
        if let Ok(blocks) = serde_json::from_value::<Vec<ContentBlock>>(content.clone()) {
            return blocks;
        }
    }
    vec![ContentBlock::text(content.to_string())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::custom;
    use pretty_assertions::assert_eq;

    fn reducer() -> ThreadReducer {
        ThreadReducer::new(Thread::unassigned())
    }

    fn run_started(thread_id: &str, run_id: &str) -> StreamEvent {
        StreamEvent::RunStarted {
            thread_id: thread_id.into(),
            run_id: run_id.into(),
            timestamp: None,
        }
    }

    fn text_content(message_id: &str, delta: &str) -> StreamEvent {
        StreamEvent::TextMessageContent {
            message_id: message_id.into(),
            delta: delta.into(),
            timestamp: None,
        }
    }

    #[test]
    fn test_run_started_adopts_thread_id() {
        let mut r = reducer();
        r.apply(&run_started("thr_9", "run_1"));
        assert_eq!(r.state().thread.id, "thr_9");
        assert_eq!(r.state().thread.status, RunStatus::Streaming);
        assert_eq!(r.state().streaming.run_id.as_deref(), Some("run_1"));
    }

    #[test]
    fn test_existing_thread_id_is_kept() {
        let mut r = ThreadReducer::new(Thread::new("thr_original"));
        r.apply(&run_started("thr_other", "run_1"));
        assert_eq!(r.state().thread.id, "thr_original");
    }

    #[test]
    fn test_text_deltas_concatenate_in_arrival_order() {
        let mut r = reducer();
        r.apply(&run_started("t", "run_1"));
        r.apply(&StreamEvent::TextMessageStart {
            message_id: "m1".into(),
            role: Some("assistant".into()),
            timestamp: None,
        });
        for delta in ["Hel", "lo, ", "wor", "ld"] {
            r.apply(&text_content("m1", delta));
        }
        assert_eq!(r.state().thread.messages[0].text(), "Hello, world");
        assert_eq!(r.state().thread.messages[0].content.len(), 1);
    }

    #[test]
    fn test_new_message_id_finalizes_previous() {
        let mut r = reducer();
        r.apply(&run_started("t", "run_1"));
        r.apply(&text_content("m1", "first"));
        r.apply(&text_content("m2", "second"));
        assert_eq!(r.state().thread.messages.len(), 2);
        assert_eq!(r.state().thread.messages[0].text(), "first");
        assert_eq!(r.state().thread.messages[1].text(), "second");
    }

    #[test]
    fn test_message_role_from_start_event() {
        let mut r = reducer();
        r.apply(&StreamEvent::TextMessageStart {
            message_id: "m1".into(),
            role: Some("user".into()),
            timestamp: None,
        });
        assert_eq!(r.state().thread.messages[0].role, MessageRole::User);
    }

    #[test]
    fn test_tool_call_assembly() {
        let mut r = reducer();
        r.apply(&run_started("t", "run_1"));
        r.apply(&StreamEvent::ToolCallStart {
            tool_call_id: "c1".into(),
            tool_call_name: "get_weather".into(),
            parent_message_id: Some("m1".into()),
            timestamp: None,
        });
        for delta in ["{\"a\":", "10,", "\"b\":20}"] {
            r.apply(&StreamEvent::ToolCallArgs {
                tool_call_id: "c1".into(),
                delta: delta.into(),
                timestamp: None,
            });
        }
        r.apply(&StreamEvent::ToolCallEnd {
            tool_call_id: "c1".into(),
            timestamp: None,
        });

        let calls = r.take_pending(&["c1".to_string()]);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "get_weather");
        assert_eq!(calls[0].input, json!({"a": 10, "b": 20}));
        // The tool_use block carries the parsed input too.
        match &r.state().thread.messages[0].content[0] {
            ContentBlock::ToolUse { input, .. } => assert_eq!(input, &json!({"a": 10, "b": 20})),
            other => panic!("unexpected block: {other:?}"),
        }
    }

    #[test]
    fn test_tool_call_with_no_args_defaults_to_object() {
        let mut r = reducer();
        r.apply(&StreamEvent::ToolCallStart {
            tool_call_id: "c1".into(),
            tool_call_name: "ping".into(),
            parent_message_id: None,
            timestamp: None,
        });
        r.apply(&StreamEvent::ToolCallEnd {
            tool_call_id: "c1".into(),
            timestamp: None,
        });
        let calls = r.take_pending(&["c1".to_string()]);
        assert_eq!(calls[0].input, json!({}));
    }

    #[test]
    fn test_malformed_args_degrade_without_aborting() {
        let mut r = reducer();
        r.apply(&StreamEvent::ToolCallStart {
            tool_call_id: "c1".into(),
            tool_call_name: "ping".into(),
            parent_message_id: None,
            timestamp: None,
        });
        r.apply(&StreamEvent::ToolCallArgs {
            tool_call_id: "c1".into(),
            delta: "{\"broken\":".into(),
            timestamp: None,
        });
        r.apply(&StreamEvent::ToolCallEnd {
            tool_call_id: "c1".into(),
            timestamp: None,
        });
        assert_eq!(r.take_pending(&["c1".to_string()])[0].input, json!({}));
        // Stream keeps going.
        assert_eq!(
            r.apply(&StreamEvent::RunFinished {
                thread_id: None,
                run_id: None,
                timestamp: None
            }),
            Some(ReducerSignal::Finished)
        );
    }

    #[test]
    fn test_component_lifecycle() {
        let mut r = reducer();
        r.apply(&run_started("t", "run_1"));
        r.apply(&StreamEvent::Custom {
            name: custom::COMPONENT_START.into(),
            data: json!({"componentId": "cmp_1", "componentName": "WeatherCard", "messageId": "m1"}),
            timestamp: None,
        });
        r.apply(&StreamEvent::Custom {
            name: custom::COMPONENT_PROPS_DELTA.into(),
            data: json!({
                "componentId": "cmp_1",
                "patch": [{"op": "add", "path": "/city", "value": "Seattle"}]
            }),
            timestamp: None,
        });
        r.apply(&StreamEvent::Custom {
            name: custom::COMPONENT_STATE_DELTA.into(),
            data: json!({
                "componentId": "cmp_1",
                "patch": [{"op": "add", "path": "/expanded", "value": true}]
            }),
            timestamp: None,
        });
        match &r.state().thread.messages[0].content[0] {
            ContentBlock::Component { props, state, .. } => {
                assert_eq!(props, &json!({"city": "Seattle"}));
                assert_eq!(state, &json!({"expanded": true}));
            }
            other => panic!("unexpected block: {other:?}"),
        }
    }

    #[test]
    fn test_failed_patch_batch_is_dropped_not_fatal() {
        let mut r = reducer();
        r.apply(&StreamEvent::Custom {
            name: custom::COMPONENT_START.into(),
            data: json!({"componentId": "cmp_1", "messageId": "m1"}),
            timestamp: None,
        });
        r.apply(&StreamEvent::Custom {
            name: custom::COMPONENT_PROPS_DELTA.into(),
            data: json!({
                "componentId": "cmp_1",
                "patch": [{"op": "add", "path": "/city", "value": "Seattle"}]
            }),
            timestamp: None,
        });
        // test op fails: whole batch dropped, earlier value survives.
        r.apply(&StreamEvent::Custom {
            name: custom::COMPONENT_PROPS_DELTA.into(),
            data: json!({
                "componentId": "cmp_1",
                "patch": [
                    {"op": "replace", "path": "/city", "value": "Portland"},
                    {"op": "test", "path": "/city", "value": "nope"}
                ]
            }),
            timestamp: None,
        });
        match &r.state().thread.messages[0].content[0] {
            ContentBlock::Component { props, .. } => {
                assert_eq!(props, &json!({"city": "Seattle"}));
            }
            other => panic!("unexpected block: {other:?}"),
        }
    }

    #[test]
    fn test_awaiting_input_signal() {
        let mut r = reducer();
        r.apply(&run_started("t", "run_1"));
        let signal = r.apply(&StreamEvent::Custom {
            name: custom::AWAITING_INPUT.into(),
            data: json!({"pendingToolCallIds": ["c1"]}),
            timestamp: None,
        });
        assert_eq!(
            signal,
            Some(ReducerSignal::AwaitingInput {
                pending_tool_call_ids: vec!["c1".to_string()]
            })
        );
        assert_eq!(r.state().thread.status, RunStatus::Waiting);
    }

    #[test]
    fn test_run_error_stores_details() {
        let mut r = reducer();
        let signal = r.apply(&StreamEvent::RunError {
            message: "rate limited".into(),
            code: Some("429".into()),
            timestamp: None,
        });
        assert_eq!(signal, Some(ReducerSignal::Errored));
        assert_eq!(r.state().thread.status, RunStatus::Error);
        let error = r.state().streaming.error.as_ref().unwrap();
        assert_eq!(error.message, "rate limited");
        assert_eq!(error.code.as_deref(), Some("429"));
    }

    #[test]
    fn test_unknown_events_are_ignored() {
        let mut r = reducer();
        let event: StreamEvent =
            serde_json::from_value(json!({"type": "STEP_FINISHED"})).unwrap();
        assert_eq!(r.apply(&event), None);
        assert!(r.state().thread.messages.is_empty());
    }

    #[test]
    fn test_tool_call_result_event_appends_tool_message() {
        let mut r = reducer();
        r.apply(&StreamEvent::ToolCallStart {
            tool_call_id: "c1".into(),
            tool_call_name: "lookup".into(),
            parent_message_id: None,
            timestamp: None,
        });
        r.apply(&StreamEvent::ToolCallResult {
            message_id: Some("m2".into()),
            tool_call_id: "c1".into(),
            content: json!("42"),
            timestamp: None,
        });
        // No longer pending: the service resolved it.
        assert!(r.pending_ids().is_empty());
        let last = r.state().thread.messages.last().unwrap();
        assert_eq!(last.role, MessageRole::Tool);
        assert_eq!(
            last.content[0],
            ContentBlock::tool_result("c1", vec![ContentBlock::text("42")], false)
        );
    }

    #[test]
    fn test_take_pending_preserves_requested_order() {
        let mut r = reducer();
        for id in ["c1", "c2", "c3"] {
            r.apply(&StreamEvent::ToolCallStart {
                tool_call_id: id.into(),
                tool_call_name: format!("tool_{id}"),
                parent_message_id: None,
                timestamp: None,
            });
        }
        let calls = r.take_pending(&["c2".to_string(), "c1".to_string()]);
        let names: Vec<_> = calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["tool_c2", "tool_c1"]);
        assert_eq!(r.pending_ids(), vec!["c3".to_string()]);
    }
}
