//! Error types for rollcall-server

use std::net::SocketAddr;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rollcall_directory::DirectoryError;
use rollcall_storage::StorageError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::admission::AdmissionError;

/// Errors raised while configuring or running the server
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

impl ServerError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// `{"error": ...}` response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// `{"message": ...}` response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

/// A handler failure rendered as a status code plus [`ErrorBody`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<&AdmissionError> for ApiError {
    fn from(err: &AdmissionError) -> Self {
        if err.is_client_error() {
            Self::bad_request(err.to_string())
        } else {
            Self::internal(err.to_string())
        }
    }
}

impl IntoResponse for AdmissionError {
    fn into_response(self) -> Response {
        ApiError::from(&self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_core::ValidationError;

    #[test]
    fn test_admission_error_status_mapping() {
        let invalid = AdmissionError::InvalidRequest(ValidationError::Missing("badge_id"));
        assert_eq!(ApiError::from(&invalid).status, StatusCode::BAD_REQUEST);

        let duplicate = AdmissionError::DuplicateCheckIn {
            badge_id: "A1".into(),
            display_name: "Alice".into(),
            activity: "gate1".into(),
            timestamp: "09:30".into(),
        };
        let api = ApiError::from(&duplicate);
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert!(api.message.contains("09:30"));

        let persistence =
            AdmissionError::PersistenceFailure(StorageError::WriteRejected("disk full".into()));
        assert_eq!(
            ApiError::from(&persistence).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_response_status() {
        let response = ApiError::internal("boom").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
