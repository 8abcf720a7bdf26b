//! The run orchestrator.
//!
//! [`TamboClient`] owns the transport, the tool registry, and the thread
//! store, and drives a run from the triggering user message to a terminal
//! state. Continuation runs for tool execution are driven by an explicit
//! loop, never recursion, so arbitrarily long tool chains use bounded stack.

use futures::StreamExt;

use tambo_core::content::ContentBlock;
use tambo_core::thread::{Message, Thread, ThreadState};
use tambo_stream::{ReducerSignal, StreamEvent, ThreadReducer};
use tambo_tools::{execute_all_pending, ToolRegistry};

use crate::cancel::CancelLatch;
use crate::errors::{ClientError, TransportError};
use crate::store::ThreadStore;
use crate::transport::{
    ComponentDefinition, EventStream, InputMessage, RunRequest, RunTransport,
};
use crate::validate::{
    dedupe_tool_results, extract_tool_results, validate_tool_results, ValidationError,
};

/// Result of a message-based tool-result submission.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The submission did not match the thread's pending calls. Nothing was
    /// sent; the caller can fix the message and retry.
    Rejected(ValidationError),
    /// The submission was accepted and the continuation run finished.
    Completed(ThreadState),
}

/// What one event stream resolved to.
enum StreamOutcome {
    Finished,
    Awaiting { pending_tool_call_ids: Vec<String> },
    Errored { message: String, code: Option<String> },
    Cancelled,
}

/// High-level client for driving runs against a tambo service.
pub struct TamboClient<T: RunTransport> {
    transport: T,
    tools: ToolRegistry,
    components: Vec<ComponentDefinition>,
    store: ThreadStore,
}

impl<T: RunTransport> TamboClient<T> {
    /// Create a client over a transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            tools: ToolRegistry::new(),
            components: Vec::new(),
            store: ThreadStore::new(),
        }
    }

    /// Set the tools advertised to the service and executed locally.
    #[must_use]
    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    /// Set the components advertised to the service.
    #[must_use]
    pub fn with_components(mut self, components: Vec<ComponentDefinition>) -> Self {
        self.components = components;
        self
    }

    /// The shared snapshot store. Clone it to read thread state from other
    /// tasks while a run streams.
    #[must_use]
    pub fn store(&self) -> &ThreadStore {
        &self.store
    }

    /// Send a user message and drive the run to a terminal state.
    ///
    /// With `thread_id = None` a new thread is created; the service assigns
    /// its id via the first `RUN_STARTED` event. When the run pauses for
    /// tool input, the requested tools are executed locally and their
    /// results submitted as a continuation run; this repeats until the run
    /// finishes, errors, or is cancelled through `latch`.
    pub async fn send(
        &self,
        thread_id: Option<&str>,
        text: impl Into<String>,
        latch: &CancelLatch,
    ) -> Result<ThreadState, ClientError> {
        let thread = match thread_id {
            Some(id) => self
                .store
                .snapshot(id)
                .map(|state| state.thread)
                .unwrap_or_else(|| Thread::new(id)),
            None => Thread::unassigned(),
        };
        let is_new = !thread.has_id();
        let pre_send = thread.clone();

        let text = text.into();
        let mut reducer = ThreadReducer::new(thread);
        reducer.append_local_message(Message::user(vec![ContentBlock::text(text.clone())]));

        let request = self.request(InputMessage::user_text(text));
        let stream = match thread_id {
            None => self.transport.create_thread_run(request).await,
            Some(id) => self.transport.run_on_thread(id, request).await,
        };
        let stream = match stream {
            Ok(stream) => stream,
            Err(error) => return Err(self.rollback(pre_send, error.into())),
        };

        self.run_loop(reducer, stream, is_new, pre_send, latch).await
    }

    /// Submit caller-built tool results for a thread paused on
    /// `awaiting_input`, using the message-based flow.
    ///
    /// The results are deduplicated (last write per id wins) and checked
    /// against the thread's unresolved `tool_use` ids before anything is
    /// sent. A mismatch is reported as [`SubmitOutcome::Rejected`], never as
    /// an error.
    pub async fn submit_tool_results(
        &self,
        thread_id: &str,
        message: InputMessage,
        latch: &CancelLatch,
    ) -> Result<SubmitOutcome, ClientError> {
        let state = self
            .store
            .snapshot(thread_id)
            .ok_or_else(|| ClientError::Protocol(format!("unknown thread: {thread_id}")))?;

        let pending_ids = state.thread.unmatched_tool_use_ids();
        let deduped = dedupe_tool_results(extract_tool_results(&message.content));
        if !deduped.duplicate_tool_call_ids.is_empty() {
            tracing::debug!(
                duplicates = ?deduped.duplicate_tool_call_ids,
                "collapsed duplicate tool results"
            );
        }
        let submitted_ids: Vec<String> = deduped
            .results
            .iter()
            .map(|r| r.tool_use_id.clone())
            .collect();
        if let Err(violation) = validate_tool_results(&submitted_ids, &pending_ids) {
            return Ok(SubmitOutcome::Rejected(violation));
        }

        let blocks: Vec<ContentBlock> = deduped
            .results
            .into_iter()
            .map(|r| ContentBlock::tool_result(r.tool_use_id, r.content, r.is_error))
            .collect();

        let pre_send = state.thread.clone();
        let mut reducer = ThreadReducer::new(state.thread);
        reducer.append_local_message(Message::user(blocks.clone()));

        let mut request = self.request(InputMessage::user(blocks));
        if let Some(run_id) = state.streaming.run_id.clone() {
            request = request.continuing(run_id);
        }
        let stream = match self.transport.run_on_thread(thread_id, request).await {
            Ok(stream) => stream,
            Err(error) => return Err(self.rollback(pre_send, error.into())),
        };

        self.run_loop(reducer, stream, false, pre_send, latch)
            .await
            .map(SubmitOutcome::Completed)
    }

    /// Drive a run, including any continuation runs, to a terminal state.
    async fn run_loop(
        &self,
        mut reducer: ThreadReducer,
        mut stream: EventStream,
        mut expect_thread_id: bool,
        pre_send: Thread,
        latch: &CancelLatch,
    ) -> Result<ThreadState, ClientError> {
        loop {
            reducer.begin_run();
            let outcome = match self
                .drive_stream(&mut reducer, &mut stream, expect_thread_id, latch)
                .await
            {
                Ok(outcome) => outcome,
                Err(error) => return Err(self.rollback(pre_send, error)),
            };
            expect_thread_id = false;

            match outcome {
                StreamOutcome::Finished => {
                    let state = reducer.into_state();
                    self.store.upsert(state.clone());
                    return Ok(state);
                }
                StreamOutcome::Errored { message, code } => {
                    // Run-level failure: state is kept, not rolled back.
                    self.store.upsert(reducer.state().clone());
                    return Err(ClientError::RunFailed { message, code });
                }
                StreamOutcome::Cancelled => {
                    reducer.mark_cancelled();
                    let state = reducer.into_state();
                    self.store.upsert(state.clone());
                    return Ok(state);
                }
                StreamOutcome::Awaiting {
                    pending_tool_call_ids,
                } => {
                    let Some(run_id) = reducer.state().streaming.run_id.clone() else {
                        return Err(self.rollback(
                            pre_send,
                            ClientError::Protocol(
                                "awaiting input before RUN_STARTED".to_string(),
                            ),
                        ));
                    };
                    let thread_id = reducer.state().thread.id.clone();

                    let calls = reducer.take_pending(&pending_tool_call_ids);
                    tracing::debug!(
                        thread_id = %thread_id,
                        run_id = %run_id,
                        count = calls.len(),
                        "executing requested tools"
                    );
                    let results = execute_all_pending(&self.tools, calls).await;

                    if latch.consume() {
                        reducer.mark_cancelled();
                        let state = reducer.into_state();
                        self.store.upsert(state.clone());
                        return Ok(state);
                    }

                    reducer.append_local_message(Message::user(results.clone()));
                    self.store.upsert(reducer.state().clone());

                    let request = self.request(InputMessage::user(results)).continuing(run_id);
                    stream = match self.transport.run_on_thread(&thread_id, request).await {
                        Ok(stream) => stream,
                        Err(error) => return Err(self.rollback(pre_send, error.into())),
                    };
                }
            }
        }
    }

    /// Consume one event stream, feeding every event to the reducer in
    /// arrival order and publishing a snapshot after each.
    async fn drive_stream(
        &self,
        reducer: &mut ThreadReducer,
        stream: &mut EventStream,
        expect_thread_id: bool,
        latch: &CancelLatch,
    ) -> Result<StreamOutcome, ClientError> {
        let mut first = true;
        let mut outcome = None;

        while let Some(item) = stream.next().await {
            if latch.consume() {
                return Ok(StreamOutcome::Cancelled);
            }
            let event = item.map_err(ClientError::Transport)?;

            if first {
                first = false;
                if expect_thread_id && !matches!(event, StreamEvent::RunStarted { .. }) {
                    return Err(ClientError::Protocol(
                        "first event on a new thread must be RUN_STARTED".to_string(),
                    ));
                }
            }

            let signal = reducer.apply(&event);
            self.store.upsert(reducer.state().clone());

            match signal {
                // A stream can close with RUN_FINISHED after signaling
                // awaiting_input; the pause wins and the continuation runs.
                Some(ReducerSignal::Finished) => {
                    if !matches!(outcome, Some(StreamOutcome::Awaiting { .. })) {
                        outcome = Some(StreamOutcome::Finished);
                    }
                }
                Some(ReducerSignal::Errored) => {
                    let (message, code) = match &reducer.state().streaming.error {
                        Some(info) => (info.message.clone(), info.code.clone()),
                        None => ("run failed".to_string(), None),
                    };
                    outcome = Some(StreamOutcome::Errored { message, code });
                }
                Some(ReducerSignal::AwaitingInput {
                    pending_tool_call_ids,
                }) => {
                    outcome = Some(StreamOutcome::Awaiting {
                        pending_tool_call_ids,
                    });
                }
                None => {}
            }
        }

        if latch.consume() {
            return Ok(StreamOutcome::Cancelled);
        }
        match outcome {
            Some(outcome) => Ok(outcome),
            None => Err(ClientError::Protocol(
                "stream ended without RUN_FINISHED, RUN_ERROR, or awaiting_input".to_string(),
            )),
        }
    }

    fn request(&self, message: InputMessage) -> RunRequest {
        RunRequest::new(message)
            .with_components(self.components.clone())
            .with_tools(self.tools.definitions())
    }

    /// Restore the pre-send thread snapshot and pass the error through.
    fn rollback(&self, pre_send: Thread, error: ClientError) -> ClientError {
        tracing::warn!(%error, "rolling back optimistic message");
        self.store.upsert(ThreadState::new(pre_send));
        error
    }
}
