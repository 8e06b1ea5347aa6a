//! JSON file backend
//!
//! The whole log is one JSON array of events, most-recent-first. Every write
//! goes to a sibling temp file that is synced and then renamed over the
//! target, so readers only ever see the old or the new record. On unix the
//! parent directory is synced after the rename as well.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rollcall_core::CheckInEvent;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::backend::LogBackend;
use crate::error::{StorageError, StorageResult};

/// Log backend storing a single JSON array file
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the durable record
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the record; `.` for a bare file name
    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Flush the directory entry so the rename itself survives power loss
    #[cfg(unix)]
    async fn sync_parent(&self) -> StorageResult<()> {
        File::open(self.parent_dir()).await?.sync_all().await?;
        Ok(())
    }

    #[cfg(not(unix))]
    async fn sync_parent(&self) -> StorageResult<()> {
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("log"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl LogBackend for JsonFileBackend {
    async fn load(&self) -> StorageResult<Vec<CheckInEvent>> {
        if !fs::try_exists(&self.path).await? {
            debug!(path = ?self.path, "No existing log file, starting fresh");
            return Ok(Vec::new());
        }

        let raw = fs::read_to_string(&self.path)
            .await
            .map_err(|e| StorageError::corrupt(&self.path, e.to_string()))?;

        let log: Vec<CheckInEvent> = serde_json::from_str(&raw)
            .map_err(|e| StorageError::corrupt(&self.path, e.to_string()))?;

        info!(path = ?self.path, entries = log.len(), "Loaded check-in log");
        Ok(log)
    }

    async fn persist(&self, log: &[CheckInEvent]) -> StorageResult<()> {
        let bytes =
            serde_json::to_vec(log).map_err(|e| StorageError::serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = self.temp_path();
        {
            let mut file = File::create(&temp_path).await?;
            file.write_all(&bytes).await?;
            file.sync_all().await?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).await?;
        self.sync_parent().await?;

        debug!(path = ?self.path, entries = log.len(), "Persisted check-in log");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
