//! Cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One-shot cancellation latch shared between a caller and an in-flight run.
///
/// The orchestrator checks the latch at its suspension points. [`consume`]
/// swaps the flag back to false, so one `cancel()` stops exactly one run
/// attempt and the latch can be reused for the next send.
///
/// [`consume`]: CancelLatch::consume
#[derive(Debug, Clone, Default)]
pub struct CancelLatch {
    flag: Arc<AtomicBool>,
}

impl CancelLatch {
    /// Create an unset latch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the in-flight run.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested and not yet consumed.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Take the cancellation request, resetting the latch.
    ///
    /// Returns true exactly once per `cancel()`.
    pub fn consume(&self) -> bool {
        self.flag.swap(false, Ordering::SeqCst)
    }
}
