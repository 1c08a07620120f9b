//! Idempotency guard
//!
//! Durable marker recording the last session handle this device has
//! already materialized. The OS re-delivers the last launch URL on every
//! relaunch until a new link replaces it, so the same handle arrives
//! arbitrarily many times; this guard is what keeps processing
//! at-most-once per handle. The server's atomic consume remains the
//! actual safety mechanism; the guard is duplicate suppression.

use std::sync::Arc;

use tracing::debug;

use handoff_shared::constants::PROCESSED_SESSION_STORAGE_KEY;

use crate::storage::{KeyValueStore, StorageError};

pub struct ProcessedSessionGuard {
    store: Arc<dyn KeyValueStore>,
}

impl ProcessedSessionGuard {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// True iff the handle differs from the last one marked.
    pub fn should_process(&self, session_handle: &str) -> Result<bool, StorageError> {
        let marker = self.store.get(PROCESSED_SESSION_STORAGE_KEY)?;
        Ok(marker.as_deref() != Some(session_handle))
    }

    /// Record the handle BEFORE the consume request goes out.
    ///
    /// If the app dies between this write and the server response, the
    /// handle stays blocked on this device even though materialization may
    /// never have completed. Accepted trade-off: a fresh login supersedes
    /// the pending record server-side and arrives with a new handle, which
    /// unblocks the guard.
    pub fn mark_processing(&self, session_handle: &str) -> Result<(), StorageError> {
        debug!("Marking session handle as processed");
        self.store.set(PROCESSED_SESSION_STORAGE_KEY, session_handle)
    }

    /// Cleared on explicit logout only, never on session expiry.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(PROCESSED_SESSION_STORAGE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;

    fn guard() -> ProcessedSessionGuard {
        ProcessedSessionGuard::new(Arc::new(MemoryKeyValueStore::new()))
    }

    #[test]
    fn test_fresh_handle_should_process() {
        let guard = guard();
        assert!(guard.should_process("handle-1").unwrap());
    }

    #[test]
    fn test_marked_handle_is_blocked() {
        let guard = guard();
        guard.mark_processing("handle-1").unwrap();

        assert!(!guard.should_process("handle-1").unwrap());
        assert!(guard.should_process("handle-2").unwrap());
    }

    #[test]
    fn test_newer_handle_replaces_marker() {
        let guard = guard();
        guard.mark_processing("handle-1").unwrap();
        guard.mark_processing("handle-2").unwrap();

        assert!(!guard.should_process("handle-2").unwrap());
        // Only the latest handle is remembered; the guard is a single
        // value, not a history.
        assert!(guard.should_process("handle-1").unwrap());
    }

    #[test]
    fn test_clear_unblocks_processing() {
        let guard = guard();
        guard.mark_processing("handle-1").unwrap();
        guard.clear().unwrap();

        assert!(guard.should_process("handle-1").unwrap());
    }

    #[test]
    fn test_marker_survives_guard_recreation() {
        let store = Arc::new(MemoryKeyValueStore::new());
        ProcessedSessionGuard::new(Arc::clone(&store) as Arc<dyn KeyValueStore>)
            .mark_processing("handle-1")
            .unwrap();

        let relaunched = ProcessedSessionGuard::new(store);
        assert!(!relaunched.should_process("handle-1").unwrap());
    }
}
