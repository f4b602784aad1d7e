use super::{ActionBackend, StorageError, StorageResult};
use crate::action::Action;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-process backend. Can be switched offline to simulate an unreachable
/// store.
#[derive(Default)]
pub struct MemoryBackend {
    actions: Mutex<Vec<Action>>,
    offline: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actions(actions: Vec<Action>) -> Self {
        Self {
            actions: Mutex::new(actions),
            ..Self::default()
        }
    }

    /// While offline every read and write fails with `Unreachable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> StorageResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Unreachable("memory backend is offline".into()));
        }
        Ok(())
    }
}

impl ActionBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn read_all(&self) -> StorageResult<Vec<Action>> {
        self.check_online()?;
        let guard = self
            .actions
            .lock()
            .map_err(|e| StorageError::Unreachable(e.to_string()))?;
        Ok(guard.clone())
    }

    fn write_all(&self, actions: &[Action]) -> StorageResult<()> {
        self.check_online()?;
        let mut guard = self
            .actions
            .lock()
            .map_err(|e| StorageError::Unreachable(e.to_string()))?;
        *guard = actions.to_vec();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
