//! Push-channel message contract
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`.
//!
//! ```json
//! // Client -> Server
//! {"event": "request_initial_log"}
//! {"event": "search_log", "data": {"query": "ali"}}
//!
//! // Server -> Client
//! {"event": "update_log", "data": {"log": [...], "total_users": 3}}
//! {"event": "search_results", "data": {"log": [...], "total_users": 1}}
//! {"event": "notification", "data": {"success": true, "message": "..."}}
//! ```

use std::sync::Arc;

use rollcall_core::LogSnapshot;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Server → viewer messages
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full log; sent on connect and after every mutation
    UpdateLog(Arc<LogSnapshot>),
    /// Filtered log; sent only to the viewer that searched
    SearchResults(LogSnapshot),
    /// Outcome of a submission or deletion, sent to every viewer
    Notification(Notification),
}

impl ServerMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::UpdateLog(_) => "update_log",
            Self::SearchResults(_) => "search_results",
            Self::Notification(_) => "notification",
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Transient operator feedback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub success: bool,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Viewer → server messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    RequestInitialLog,
    SearchLog { query: String },
}

/// Reasons a viewer frame cannot be understood
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("frame is not a JSON event object: {0}")]
    InvalidFrame(String),

    #[error("bad payload for {event}: {reason}")]
    InvalidPayload { event: &'static str, reason: String },

    #[error("unknown event: {0}")]
    UnknownEvent(String),
}

#[derive(Debug, Deserialize)]
struct Frame {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
struct SearchPayload {
    #[serde(default)]
    query: Option<String>,
}

impl ClientMessage {
    /// Parse one text frame
    ///
    /// A `search_log` frame without data or without a query is an empty
    /// search; a query that is not a string is an invalid payload.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let frame: Frame =
            serde_json::from_str(text).map_err(|e| ProtocolError::InvalidFrame(e.to_string()))?;

        match frame.event.as_str() {
            "request_initial_log" => Ok(Self::RequestInitialLog),
            "search_log" => {
                let payload = if frame.data.is_null() {
                    SearchPayload::default()
                } else {
                    serde_json::from_value(frame.data).map_err(|e| {
                        ProtocolError::InvalidPayload {
                            event: "search_log",
                            reason: e.to_string(),
                        }
                    })?
                };
                Ok(Self::SearchLog {
                    query: payload.query.unwrap_or_default(),
                })
            }
            _ => Err(ProtocolError::UnknownEvent(frame.event)),
        }
    }
}
