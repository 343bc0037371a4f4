// HTTP error type: status code, stable machine code and a client-safe message.

use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::screenshot_repo::StoreError;
use crate::screenshot_repo::query::QueryError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed client input (400).
    #[error("{0}")]
    Validation(String),
    /// Bad or missing `X-API-Key` (401).
    #[error("Unauthorized access")]
    Unauthorized,
    /// Unknown record (404).
    #[error("{0}")]
    NotFound(&'static str),
    /// Unreadable multipart body, or one over the body limit.
    #[error("Invalid upload: {0}")]
    Upload(#[from] MultipartError),
    /// Database failure (500). Details are logged, never sent to the client.
    #[error("Internal storage error")]
    Storage(#[from] StoreError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upload(e) => e.status(),
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Upload(_) => "INVALID_UPLOAD",
            ApiError::Storage(_) => "STORAGE_ERROR",
        }
    }
}

/// Body that is not `multipart/form-data` at all (wrong content type or boundary).
impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::Validation(format!("Invalid upload: {}", rejection.body_text()))
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Storage(e) = &self {
            tracing::error!(error = %e, "storage failure");
        }
        let body = json!({
            "error": self.to_string(),
            "code": self.error_code(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}
