//! Durable mirror of the check-in log

use async_trait::async_trait;
use rollcall_core::CheckInEvent;

use crate::error::StorageResult;

/// Durable storage for the full, ordered check-in log
///
/// The backend is a mirror: it is read once at startup and rewritten in
/// full from the in-memory collection after every mutation. Implementations
/// must make `persist` all-or-nothing so a crash never leaves a partial
/// record behind.
#[async_trait]
pub trait LogBackend: Send + Sync {
    /// Read the stored log, most-recent-first
    ///
    /// Returns an empty log when nothing was stored yet. An unreadable or
    /// unparseable record is an error, never an empty log.
    async fn load(&self) -> StorageResult<Vec<CheckInEvent>>;

    /// Replace the stored log with `log`
    async fn persist(&self, log: &[CheckInEvent]) -> StorageResult<()>;

    /// Human-readable location, for logging
    fn describe(&self) -> String;
}
