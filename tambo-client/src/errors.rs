//! Client error taxonomy.
//!
//! Only three kinds of failure reach callers. Tool failures and malformed
//! deltas are absorbed before they get here.

use thiserror::Error;

/// Opaque transport failure (connection drop, HTTP error, decode failure).
///
/// The concrete transport decides what goes inside; the orchestrator only
/// needs to know the stream is dead.
#[derive(Debug, Error)]
#[error("transport error: {0}")]
pub struct TransportError(#[from] pub anyhow::Error);

impl TransportError {
    /// Wrap a message as a transport error.
    pub fn msg(message: impl Into<String>) -> Self {
        Self(anyhow::anyhow!(message.into()))
    }
}

/// Errors surfaced by the orchestrator.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The service broke the event contract. The optimistic user message has
    /// been rolled back.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// The stream failed below the protocol. The optimistic user message has
    /// been rolled back.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The service reported a run-level failure via `RUN_ERROR`. Thread state
    /// is kept as-is (status `error`); no rollback, no automatic retry.
    #[error("run failed: {message}")]
    RunFailed {
        /// Error message from the service.
        message: String,
        /// Machine-readable code, if supplied.
        code: Option<String>,
    },
}
