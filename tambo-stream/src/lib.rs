//! Streaming layer: wire events and the thread reducer.
//!
//! [`StreamEvent`] is the wire vocabulary; [`ThreadReducer`] folds an event
//! stream into a `ThreadState` one event at a time. The reducer is the only
//! writer of thread state during a run.

pub mod args;
pub mod events;
pub mod reducer;

pub use args::ArgumentBuffer;
pub use events::{
    custom, AwaitingInputPayload, ComponentDeltaPayload, ComponentEndPayload,
    ComponentStartPayload, CustomPayload, StreamEvent,
};
pub use reducer::{ReducerSignal, ThreadReducer};
