//! Shared helpers for rollcall-server integration tests

// Each test binary uses a different subset of these helpers
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rollcall_core::FixedClock;
use rollcall_directory::StaticDirectory;
use rollcall_server::{AppState, ServerMessage, StateOptions, ViewerSubscription, router};
use rollcall_storage::InMemoryBackend;
use tower::ServiceExt;

/// A board wired to an in-memory log and a three-person roster, frozen at 09:30
pub struct TestBoard {
    pub state: Arc<AppState>,
    pub backend: Arc<InMemoryBackend>,
}

impl TestBoard {
    pub async fn new() -> Self {
        Self::with_static_dir(PathBuf::from("static")).await
    }

    pub async fn with_static_dir(static_dir: PathBuf) -> Self {
        Self::with_options(StateOptions {
            static_dir,
            ..StateOptions::default()
        })
        .await
    }

    /// Viewers of this board lag after `capacity` unread pushes
    pub async fn with_viewer_buffer(capacity: usize) -> Self {
        Self::with_options(StateOptions {
            viewer_buffer: capacity,
            ..StateOptions::default()
        })
        .await
    }

    /// Build from `options`, keeping its static dir and viewer buffer; the
    /// clock and resolver timeout are always the test ones
    async fn with_options(options: StateOptions) -> Self {
        let backend = Arc::new(InMemoryBackend::new());
        let directory = StaticDirectory::new()
            .with_entry("A1", "Alice")
            .with_entry("B2", "Bob")
            .with_entry("C3", "Carol");

        let options = StateOptions {
            clock: Arc::new(FixedClock::at(9, 30).unwrap()),
            resolver_timeout: Duration::from_millis(500),
            ..options
        };
        let state = AppState::assemble(backend.clone(), Arc::new(directory), options)
            .await
            .unwrap();

        Self { state, backend }
    }

    pub fn app(&self) -> Router {
        router(self.state.clone())
    }

    pub fn viewer(&self) -> ViewerSubscription {
        self.state.hub.subscribe()
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        self.post_raw(uri, serde_json::to_string(&body).unwrap()).await
    }

    pub async fn post_raw(&self, uri: &str, body: String) -> (StatusCode, serde_json::Value) {
        let response = self
            .app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::json!({})
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(
                |_| serde_json::json!({ "raw_body": String::from_utf8_lossy(&bytes).to_string() }),
            )
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let response = self
            .app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    pub async fn check_in(&self, badge_id: &str, activity: &str) -> (StatusCode, serde_json::Value) {
        self.post_json(
            "/log_user",
            serde_json::json!({ "badge_id": badge_id, "activity": activity }),
        )
        .await
    }

    pub async fn delete(&self, badge_id: &str, activity: &str) -> (StatusCode, serde_json::Value) {
        self.post_json(
            "/delete_log_entry",
            serde_json::json!({ "badge_id": badge_id, "activity": activity }),
        )
        .await
    }
}

/// Everything currently queued for a viewer
pub fn drain(viewer: &mut ViewerSubscription) -> Vec<ServerMessage> {
    let mut messages = Vec::new();
    while let Ok(message) = viewer.try_recv() {
        messages.push(message);
    }
    messages
}

/// The `total_users` of every `update_log` in `messages`
pub fn update_totals(messages: &[ServerMessage]) -> Vec<usize> {
    messages
        .iter()
        .filter_map(|m| match m {
            ServerMessage::UpdateLog(snapshot) => Some(snapshot.total_users()),
            _ => None,
        })
        .collect()
}

/// `(success, message)` of every notification in `messages`
pub fn notifications(messages: &[ServerMessage]) -> Vec<(bool, String)> {
    messages
        .iter()
        .filter_map(|m| match m {
            ServerMessage::Notification(n) => Some((n.success, n.message.clone())),
            _ => None,
        })
        .collect()
}
