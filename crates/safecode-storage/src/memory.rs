//! In-memory attempt store for tests and dry runs.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use safecode_core::SecurityCode;

use crate::error::{StorageError, StorageResult};
use crate::store::AttemptStore;
use crate::tried::TriedSet;

#[derive(Debug, Default)]
struct MemoryLog {
    records: Vec<SecurityCode>,
    fail_after: Option<usize>,
    fail_load: bool,
}

/// Attempt store that keeps records in memory.
///
/// Clones share the same records, so a test can hand one clone to the
/// scheduler and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryAttemptStore {
    log: Arc<Mutex<MemoryLog>>,
}

impl MemoryAttemptStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `records`, in order.
    pub fn with_records(records: impl IntoIterator<Item = SecurityCode>) -> Self {
        let store = Self::new();
        store.lock().records.extend(records);
        store
    }

    fn lock(&self) -> MutexGuard<'_, MemoryLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every recorded attempt, in order.
    pub fn records(&self) -> Vec<SecurityCode> {
        self.lock().records.clone()
    }

    /// Let `count` more records succeed, then fail every record.
    pub fn fail_after(&self, count: usize) {
        self.lock().fail_after = Some(count);
    }

    /// Make every load fail.
    pub fn fail_load(&self) {
        self.lock().fail_load = true;
    }
}

impl AttemptStore for MemoryAttemptStore {
    async fn load(&mut self) -> StorageResult<TriedSet> {
        let log = self.lock();
        if log.fail_load {
            return Err(StorageError::Persistence("injected load failure".to_string()));
        }
        Ok(log.records.iter().copied().collect())
    }

    async fn record(&mut self, code: SecurityCode) -> StorageResult<()> {
        let mut log = self.lock();
        if let Some(remaining) = log.fail_after.as_mut() {
            if *remaining == 0 {
                return Err(StorageError::Persistence(format!(
                    "injected failure recording {code}"
                )));
            }
            *remaining -= 1;
        }
        log.records.push(code);
        Ok(())
    }
}
