//! Full-log snapshots pushed to viewers

use serde::{Deserialize, Serialize};

use crate::event::CheckInEvent;

/// An ordered list of events plus its count
///
/// `total_users` always equals the number of events. For a search result
/// that is the size of the filtered list, not of the full log. Both fields
/// are private so the count can only come from the list; decoding rejects
/// a record whose count disagrees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SnapshotRecord")]
pub struct LogSnapshot {
    log: Vec<CheckInEvent>,
    total_users: usize,
}

#[derive(Deserialize)]
struct SnapshotRecord {
    log: Vec<CheckInEvent>,
    total_users: usize,
}

impl TryFrom<SnapshotRecord> for LogSnapshot {
    type Error = String;

    fn try_from(record: SnapshotRecord) -> Result<Self, Self::Error> {
        if record.total_users != record.log.len() {
            return Err(format!(
                "total_users is {} but log holds {} entries",
                record.total_users,
                record.log.len()
            ));
        }
        Ok(Self::new(record.log))
    }
}

impl LogSnapshot {
    pub fn new(log: Vec<CheckInEvent>) -> Self {
        let total_users = log.len();
        Self { log, total_users }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Events, in log order
    pub fn log(&self) -> &[CheckInEvent] {
        &self.log
    }

    pub fn total_users(&self) -> usize {
        self.total_users
    }

    pub fn is_empty(&self) -> bool {
        self.total_users == 0
    }

    pub fn into_log(self) -> Vec<CheckInEvent> {
        self.log
    }
}

impl From<Vec<CheckInEvent>> for LogSnapshot {
    fn from(log: Vec<CheckInEvent>) -> Self {
        Self::new(log)
    }
}
