//! HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use bugsage_lifecycle::{ErrorKind, LifecycleError};

/// Message shown for every internal failure; details go to the log.
pub const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized,
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
            }
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

impl From<LifecycleError> for ApiError {
    fn from(e: LifecycleError) -> Self {
        match e.kind() {
            ErrorKind::BadInput => ApiError::BadRequest(e.to_string()),
            ErrorKind::NotFound => ApiError::NotFound(e.to_string()),
            ErrorKind::Internal => ApiError::Internal(format!("{e:?}")),
        }
    }
}

impl From<bugsage_core::validation::ValidationError> for ApiError {
    fn from(e: bugsage_core::validation::ValidationError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}
