//! In-memory roster directory

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::DirectoryResolver;
use crate::error::DirectoryError;

/// One roster entry, in the shape directory exports use
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRecord {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
}

/// Directory backed by a fixed badge → name map
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    names: HashMap<String, String>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one entry
    pub fn with_entry(mut self, badge_id: impl Into<String>, name: impl Into<String>) -> Self {
        self.names.insert(badge_id.into(), name.into());
        self
    }

    pub fn from_records(records: impl IntoIterator<Item = RosterRecord>) -> Self {
        Self {
            names: records
                .into_iter()
                .map(|record| (record.user_id, record.name))
                .collect(),
        }
    }

    /// Load a JSON array of `{"userId": ..., "name": ...}` records
    pub async fn from_roster_file(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DirectoryError::Roster(format!("{}: {e}", path.display())))?;
        let records: Vec<RosterRecord> = serde_json::from_str(&raw)
            .map_err(|e| DirectoryError::Roster(format!("{}: {e}", path.display())))?;

        let directory = Self::from_records(records);
        info!(path = ?path, entries = directory.len(), "Loaded roster");
        Ok(directory)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[async_trait]
impl DirectoryResolver for StaticDirectory {
    async fn resolve(&self, badge_id: &str) -> Result<Option<String>, DirectoryError> {
        Ok(self
            .names
            .get(badge_id)
            .filter(|name| !name.trim().is_empty())
            .cloned())
    }

    fn name(&self) -> &'static str {
        "roster"
    }
}
