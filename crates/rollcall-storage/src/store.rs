//! The canonical check-in log

use std::collections::HashSet;
use std::sync::Arc;

use rollcall_core::{CheckInEvent, CheckInKey, LogSnapshot};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::backend::LogBackend;
use crate::error::{StorageError, StorageResult};

/// Outcome of an atomic check-then-append
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The event was new and is now persisted at the head of the log
    Admitted(CheckInEvent),
    /// An event already existed for the same key; nothing changed
    Duplicate(CheckInEvent),
}

/// What a mutation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogChangeKind {
    Appended(CheckInEvent),
    Removed { key: CheckInKey, count: usize },
}

/// Notification emitted after every committed mutation
#[derive(Debug, Clone)]
pub struct LogChange {
    pub kind: LogChangeKind,
    /// Full log as of this mutation
    pub snapshot: Arc<LogSnapshot>,
}

/// Receives change notifications from a [`LogStore`]
///
/// Called while the store's mutation lock is held, so listeners see changes
/// in commit order. Implementations must not block and must not call back
/// into mutating store operations.
pub trait LogListener: Send + Sync {
    fn log_changed(&self, change: &LogChange);
}

/// Ordered, write-through store of check-in events
///
/// Reads go through a read lock on the current collection. Mutations are
/// serialized by `mutation`, build the next collection, persist it through
/// the backend and only then swap it in, so a failed write leaves memory
/// untouched and memory never runs ahead of the durable record.
pub struct LogStore {
    backend: Arc<dyn LogBackend>,
    current: RwLock<Arc<Vec<CheckInEvent>>>,
    mutation: Mutex<()>,
    listeners: Vec<Arc<dyn LogListener>>,
}

impl LogStore {
    /// Load the log from `backend`
    ///
    /// Fails if the durable record is unreadable or holds more than one
    /// event for the same key.
    pub async fn open(backend: Arc<dyn LogBackend>) -> StorageResult<Self> {
        let log = backend.load().await?;

        let mut seen = HashSet::with_capacity(log.len());
        for event in &log {
            if !seen.insert((event.badge_id.as_str(), event.activity.as_str())) {
                return Err(StorageError::corrupt(
                    backend.describe(),
                    format!(
                        "duplicate entry for badge {} in activity {}",
                        event.badge_id, event.activity
                    ),
                ));
            }
        }

        info!(
            backend = %backend.describe(),
            entries = log.len(),
            "Opened check-in log"
        );

        Ok(Self {
            backend,
            current: RwLock::new(Arc::new(log)),
            mutation: Mutex::new(()),
            listeners: Vec::new(),
        })
    }

    /// Register a change listener
    ///
    /// Listeners are fixed once the store is shared.
    pub fn add_listener(&mut self, listener: Arc<dyn LogListener>) {
        self.listeners.push(listener);
    }

    /// All events, most-recent-first
    pub async fn list(&self) -> Arc<Vec<CheckInEvent>> {
        self.current.read().await.clone()
    }

    /// Current log with its count
    pub async fn snapshot(&self) -> LogSnapshot {
        LogSnapshot::new(self.list().await.to_vec())
    }

    /// The event for `key`, if any
    pub async fn find(&self, key: &CheckInKey) -> Option<CheckInEvent> {
        self.current
            .read()
            .await
            .iter()
            .find(|event| event.matches(key))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.current.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Insert `event` at the head unless its key is already present
    ///
    /// The uniqueness check, the durable write, the swap and the listener
    /// notification all happen under one lock.
    pub async fn admit(&self, event: CheckInEvent) -> StorageResult<Admission> {
        let _guard = self.mutation.lock().await;
        let current = self.current.read().await.clone();

        let key = event.key();
        if let Some(existing) = current.iter().find(|e| e.matches(&key)) {
            debug!(key = %key, since = %existing.timestamp, "Check-in already present");
            return Ok(Admission::Duplicate(existing.clone()));
        }

        let mut next = Vec::with_capacity(current.len() + 1);
        next.push(event.clone());
        next.extend(current.iter().cloned());

        self.commit(next, LogChangeKind::Appended(event.clone()))
            .await?;

        info!(key = %key, name = %event.display_name, "Check-in recorded");
        Ok(Admission::Admitted(event))
    }

    /// Insert `event` at the head, failing if its key is already present
    pub async fn append(&self, event: CheckInEvent) -> StorageResult<()> {
        match self.admit(event).await? {
            Admission::Admitted(_) => Ok(()),
            Admission::Duplicate(existing) => {
                Err(StorageError::Conflict(existing.key().to_string()))
            }
        }
    }

    /// Delete every event for `key`, returning how many were removed
    ///
    /// Listeners are notified even when nothing matched; the durable record
    /// is only rewritten when something was removed.
    pub async fn remove(&self, key: &CheckInKey) -> StorageResult<usize> {
        let _guard = self.mutation.lock().await;
        let current = self.current.read().await.clone();

        let next: Vec<CheckInEvent> = current
            .iter()
            .filter(|event| !event.matches(key))
            .cloned()
            .collect();
        let count = current.len() - next.len();

        let kind = LogChangeKind::Removed {
            key: key.clone(),
            count,
        };

        if count == 0 {
            debug!(key = %key, "No check-in to remove");
            self.notify(kind, current);
            return Ok(0);
        }

        self.commit(next, kind).await?;
        info!(key = %key, removed = count, "Check-in removed");
        Ok(count)
    }

    /// Persist `next`, swap it in and notify. Caller holds the mutation lock.
    async fn commit(&self, next: Vec<CheckInEvent>, kind: LogChangeKind) -> StorageResult<()> {
        if let Err(e) = self.backend.persist(&next).await {
            warn!(
                backend = %self.backend.describe(),
                error = %e,
                "Durable write failed, mutation discarded"
            );
            return Err(e);
        }

        let next = Arc::new(next);
        *self.current.write().await = next.clone();
        self.notify(kind, next);
        Ok(())
    }

    fn notify(&self, kind: LogChangeKind, log: Arc<Vec<CheckInEvent>>) {
        if self.listeners.is_empty() {
            return;
        }
        let change = LogChange {
            kind,
            snapshot: Arc::new(LogSnapshot::new(log.to_vec())),
        };
        for listener in &self.listeners {
            listener.log_changed(&change);
        }
    }
}

impl std::fmt::Debug for LogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogStore")
            .field("backend", &self.backend.describe())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
