//! Run orchestration for the tambo service.
//!
//! [`TamboClient`] drives a conversational run over a [`RunTransport`]: it
//! submits the user's message, folds the event stream into thread state,
//! executes requested tools, and issues continuation runs until the run
//! finishes, errors, or is cancelled. Snapshots publish through a shared
//! [`ThreadStore`] after every applied event.

pub mod cancel;
pub mod errors;
pub mod orchestrator;
pub mod store;
pub mod transport;
pub mod validate;

pub use cancel::CancelLatch;
pub use errors::{ClientError, TransportError};
pub use orchestrator::{SubmitOutcome, TamboClient};
pub use store::ThreadStore;
pub use transport::{
    ComponentDefinition, EventStream, InputMessage, RunRequest, RunTransport,
};
pub use validate::{
    dedupe_tool_results, extract_tool_results, validate_tool_results, DedupedResults,
    ToolResultEntry, ValidationError,
};
