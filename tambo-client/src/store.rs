//! Shared thread-state store.
//!
//! The orchestrator publishes a fresh snapshot after every applied event;
//! readers get clones and tolerate the store changing between reads.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use tambo_core::thread::ThreadState;

/// Concurrent map of thread id to latest [`ThreadState`] snapshot.
///
/// Cheap to clone; clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct ThreadStore {
    inner: Arc<RwLock<HashMap<String, ThreadState>>>,
}

impl ThreadStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest snapshot for a thread, if present.
    #[must_use]
    pub fn snapshot(&self, thread_id: &str) -> Option<ThreadState> {
        self.inner.read().get(thread_id).cloned()
    }

    /// Publish a snapshot, replacing any previous one.
    pub fn upsert(&self, state: ThreadState) {
        if !state.thread.has_id() {
            // Nothing to key on until the service assigns an id.
            return;
        }
        let id = state.thread.id.clone();
        self.inner.write().insert(id, state);
    }

    /// Drop a thread's snapshot.
    pub fn remove(&self, thread_id: &str) -> Option<ThreadState> {
        self.inner.write().remove(thread_id)
    }

    /// Ids of all stored threads.
    #[must_use]
    pub fn thread_ids(&self) -> Vec<String> {
        self.inner.read().keys().cloned().collect()
    }

    /// Number of stored threads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tambo_core::thread::Thread;

    #[test]
    fn test_upsert_and_snapshot() {
        let store = ThreadStore::new();
        store.upsert(ThreadState::new(Thread::new("thr_1")));
        assert_eq!(store.snapshot("thr_1").unwrap().thread.id, "thr_1");
        assert!(store.snapshot("thr_2").is_none());
    }

    #[test]
    fn test_unassigned_thread_is_not_stored() {
        let store = ThreadStore::new();
        store.upsert(ThreadState::new(Thread::unassigned()));
        assert!(store.is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let store = ThreadStore::new();
        let view = store.clone();
        store.upsert(ThreadState::new(Thread::new("thr_1")));
        assert_eq!(view.thread_ids(), vec!["thr_1".to_string()]);
    }

    #[test]
    fn test_remove() {
        let store = ThreadStore::new();
        store.upsert(ThreadState::new(Thread::new("thr_1")));
        assert!(store.remove("thr_1").is_some());
        assert!(store.is_empty());
    }
}
