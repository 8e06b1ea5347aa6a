//! HTTP handlers
//!
//! Every submission and deletion outcome, success or failure, is also pushed
//! to all viewers as a `notification`.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, info, warn};

use crate::admission::CheckInRequest;
use crate::error::{ApiError, MessageBody};
use crate::protocol::Notification;
use crate::state::AppState;

/// `POST /log_user`
pub async fn log_user(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CheckInRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let message = format!("Invalid request: {}", rejection.body_text());
            warn!(error = %message, "Rejected check-in body");
            state.hub.notify(Notification::failure(&message));
            return ApiError::bad_request(message).into_response();
        }
    };

    match state.admission.submit(&request).await {
        Ok(event) => {
            let message = format!("{} checked in to {}", event.display_name, event.activity);
            state.hub.notify(Notification::success(&message));
            (StatusCode::OK, Json(MessageBody { message })).into_response()
        }
        Err(e) => {
            if e.is_client_error() {
                info!(error = %e, "Check-in rejected");
            } else {
                error!(error = %e, "Check-in failed");
            }
            state.hub.notify(Notification::failure(e.to_string()));
            e.into_response()
        }
    }
}

/// `POST /delete_log_entry`
pub async fn delete_log_entry(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CheckInRequest>, JsonRejection>,
) -> Response {
    let key = match body
        .map_err(|rejection| rejection.body_text())
        .and_then(|Json(request)| request.key().map_err(|e| e.to_string()))
    {
        Ok(key) => key,
        Err(reason) => {
            let message = format!("Invalid delete request: {reason}");
            warn!(error = %message, "Rejected delete body");
            state.hub.notify(Notification::failure(&message));
            return ApiError::internal(message).into_response();
        }
    };

    match state.store.remove(&key).await {
        Ok(removed) => {
            let message = if removed == 0 {
                format!("No check-in for {} at {}", key.badge_id(), key.activity())
            } else {
                format!("Deleted check-in for {} at {}", key.badge_id(), key.activity())
            };
            state.hub.notify(Notification::success(&message));
            (StatusCode::OK, Json(MessageBody { message })).into_response()
        }
        Err(e) => {
            error!(key = %key, error = %e, "Delete failed");
            let message = format!("Failed to delete check-in: {e}");
            state.hub.notify(Notification::failure(&message));
            ApiError::internal(message).into_response()
        }
    }
}

/// `GET /health`
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    Json(json!({
        "status": "ok",
        "total_users": state.store.len().await,
        "viewers": state.hub.viewer_count(),
    }))
    .into_response()
}
