//! In-memory backend for tests and simulation

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use rollcall_core::CheckInEvent;
use tokio::sync::Mutex;

use crate::backend::LogBackend;
use crate::error::{StorageError, StorageResult};

/// Log backend that keeps the "durable" record in memory
///
/// Writes can be made to fail on demand to exercise persistence-failure
/// paths.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    records: Mutex<Vec<CheckInEvent>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a pre-existing record
    pub fn with_records(records: Vec<CheckInEvent>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    /// Make every subsequent `persist` fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Copy of the currently stored record
    pub async fn records(&self) -> Vec<CheckInEvent> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl LogBackend for InMemoryBackend {
    async fn load(&self) -> StorageResult<Vec<CheckInEvent>> {
        Ok(self.records.lock().await.clone())
    }

    async fn persist(&self, log: &[CheckInEvent]) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteRejected(
                "in-memory backend set to fail".to_string(),
            ));
        }
        *self.records.lock().await = log.to_vec();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
