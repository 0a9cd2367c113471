//! HTTP error envelope and status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use scheduler_core::{RepoError, TaskServiceError};
use serde_json::json;

/// Failure returned to HTTP callers as `{"error": "<message>"}`.
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

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
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

impl From<TaskServiceError> for ApiError {
    fn from(value: TaskServiceError) -> Self {
        match value {
            TaskServiceError::Validation(_)
            | TaskServiceError::Date(_)
            | TaskServiceError::Recurrence(_) => Self::bad_request(value.to_string()),
            TaskServiceError::TaskNotFound(_) => Self::not_found(value.to_string()),
            TaskServiceError::Repo(err) => err.into(),
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(_) => Self::not_found(value.to_string()),
            RepoError::Validation(_) => Self::bad_request(value.to_string()),
            other => Self::internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(
                "event=http_response module=api status=error http_status={} error={}",
                self.status.as_u16(),
                self.message
            );
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
