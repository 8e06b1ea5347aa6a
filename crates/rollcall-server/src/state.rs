//! Shared server state

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rollcall_core::{Clock, SystemClock};
use rollcall_directory::DirectoryResolver;
use rollcall_storage::{LogBackend, LogStore, StorageResult};

use crate::admission::{AdmissionController, DEFAULT_RESOLVER_TIMEOUT};
use crate::hub::{BroadcastHub, DEFAULT_VIEWER_BUFFER};

/// Knobs for [`AppState::assemble`]
#[derive(Clone)]
pub struct StateOptions {
    pub clock: Arc<dyn Clock>,
    pub resolver_timeout: Duration,
    pub static_dir: PathBuf,
    /// Pushes buffered per viewer before it is resynchronised
    pub viewer_buffer: usize,
}

impl Default for StateOptions {
    fn default() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            resolver_timeout: DEFAULT_RESOLVER_TIMEOUT,
            static_dir: PathBuf::from("static"),
            viewer_buffer: DEFAULT_VIEWER_BUFFER,
        }
    }
}

/// Everything request handlers and viewer sessions share
pub struct AppState {
    pub store: Arc<LogStore>,
    pub hub: Arc<BroadcastHub>,
    pub admission: AdmissionController,
    pub static_dir: PathBuf,
}

impl AppState {
    /// Open the log store and wire the hub to its change notifications
    pub async fn assemble(
        backend: Arc<dyn LogBackend>,
        directory: Arc<dyn DirectoryResolver>,
        options: StateOptions,
    ) -> StorageResult<Arc<Self>> {
        let hub = Arc::new(BroadcastHub::with_capacity(options.viewer_buffer));

        let mut store = LogStore::open(backend).await?;
        store.add_listener(hub.clone());
        let store = Arc::new(store);

        let admission = AdmissionController::new(
            store.clone(),
            directory,
            options.clock,
            options.resolver_timeout,
        );

        Ok(Arc::new(Self {
            store,
            hub,
            admission,
            static_dir: options.static_dir,
        }))
    }
}
