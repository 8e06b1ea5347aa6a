//! Filtered views over the check-in log
//!
//! Search is purely derived: it never touches the store, never persists and
//! is answered only to the viewer that asked.

use crate::event::CheckInEvent;
use crate::snapshot::LogSnapshot;

/// A case-folded substring query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    folded: String,
}

impl SearchQuery {
    pub fn new(raw: &str) -> Self {
        Self {
            folded: raw.to_lowercase(),
        }
    }

    /// An empty query selects the whole log
    pub fn is_empty(&self) -> bool {
        self.folded.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.folded
    }

    /// Whether the display name or badge identifier contains the query
    pub fn matches(&self, event: &CheckInEvent) -> bool {
        self.is_empty()
            || event.display_name.to_lowercase().contains(&self.folded)
            || event.badge_id.to_lowercase().contains(&self.folded)
    }
}

/// Filter a log, preserving its order
///
/// The returned count is the size of the filtered list.
pub fn search(log: &[CheckInEvent], query: &SearchQuery) -> LogSnapshot {
    if query.is_empty() {
        return LogSnapshot::new(log.to_vec());
    }

    log.iter()
        .filter(|event| query.matches(event))
        .cloned()
        .collect::<Vec<_>>()
        .into()
}
