//! Broadcast hub fanning log changes and notifications out to viewers
//!
//! The hub is a plain publish/subscribe point. It listens to the log store
//! for committed mutations and republishes them as `update_log` snapshots;
//! handlers publish `notification`s directly. Delivery is fire-and-forget:
//! a slow or vanished viewer never blocks a mutation or other viewers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rollcall_storage::{LogChange, LogChangeKind, LogListener};
use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::protocol::{Notification, ServerMessage};

/// Default per-viewer buffer before a viewer is considered lagging
pub const DEFAULT_VIEWER_BUFFER: usize = 256;

/// Fan-out point for all viewer pushes
#[derive(Debug)]
pub struct BroadcastHub {
    tx: broadcast::Sender<ServerMessage>,
    viewers: Arc<AtomicUsize>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_VIEWER_BUFFER)
    }

    /// Hub whose viewers lag after `capacity` unread pushes (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            viewers: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Register a viewer; it receives every push from now until dropped
    pub fn subscribe(&self) -> ViewerSubscription {
        let count = self.viewers.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(viewers = count, "Viewer connected");
        ViewerSubscription {
            rx: self.tx.subscribe(),
            viewers: self.viewers.clone(),
        }
    }

    /// Number of connected viewers
    pub fn viewer_count(&self) -> usize {
        self.viewers.load(Ordering::SeqCst)
    }

    /// Push a notification to every viewer
    pub fn notify(&self, notification: Notification) {
        self.publish(ServerMessage::Notification(notification));
    }

    fn publish(&self, message: ServerMessage) {
        // No receivers is not an error: nobody is watching the board
        match self.tx.send(message) {
            Ok(delivered) => trace!(delivered, "Published to viewers"),
            Err(broadcast::error::SendError(message)) => {
                trace!(event = message.event_name(), "No viewers connected")
            }
        }
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}

impl LogListener for BroadcastHub {
    fn log_changed(&self, change: &LogChange) {
        match &change.kind {
            LogChangeKind::Appended(event) => {
                debug!(badge_id = %event.badge_id, activity = %event.activity, "Broadcasting append")
            }
            LogChangeKind::Removed { key, count } => {
                debug!(key = %key, removed = count, "Broadcasting removal")
            }
        }
        self.publish(ServerMessage::UpdateLog(change.snapshot.clone()));
    }
}

/// One viewer's view of the hub
///
/// Dropping it unregisters the viewer.
#[derive(Debug)]
pub struct ViewerSubscription {
    rx: broadcast::Receiver<ServerMessage>,
    viewers: Arc<AtomicUsize>,
}

impl ViewerSubscription {
    /// Next push for this viewer
    ///
    /// `Err(Lagged)` means pushes were dropped for this viewer; since every
    /// snapshot is complete, resending the current log resynchronises it.
    pub async fn recv(&mut self) -> Result<ServerMessage, broadcast::error::RecvError> {
        self.rx.recv().await
    }

    /// Non-blocking variant of [`recv`](Self::recv)
    pub fn try_recv(&mut self) -> Result<ServerMessage, broadcast::error::TryRecvError> {
        self.rx.try_recv()
    }
}

impl Drop for ViewerSubscription {
    fn drop(&mut self) {
        let remaining = self.viewers.fetch_sub(1, Ordering::SeqCst) - 1;
        debug!(viewers = remaining, "Viewer disconnected");
    }
}
