//! API Error Types
//!
//! Every handler returns [`ApiError`], rendered as
//! `{"error": CODE, "message": ..., "details": [...]}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::db::{InvalidIdentifier, StoreError};
use crate::forms::FormError;
use crate::password::PasswordHashError;
use crate::storage::{FetchError, UploadError};
use crate::validation::{FieldError, ValidationErrors};

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    /// One or more fields failed validation.
    #[error("Validation failed")]
    Validation(#[from] ValidationErrors),

    /// The multipart body could not be read.
    #[error("Invalid multipart body: {0}")]
    InvalidMultipart(String),

    /// A path identifier is not well-formed.
    #[error("Invalid identifier provided.")]
    InvalidIdentifier(#[from] InvalidIdentifier),

    /// A unique key is already taken.
    #[error("{0}")]
    Duplicate(String),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// An uploaded file exceeds the per-file limit.
    #[error("File too large (max: {max_size} bytes)")]
    FileTooLarge {
        /// Maximum allowed size in bytes.
        max_size: usize,
    },

    /// Object storage failed.
    #[error("Upload failed")]
    Upload(#[from] UploadError),

    /// The federated profile picture could not be downloaded.
    #[error("Could not fetch profile picture")]
    Fetch(#[from] FetchError),

    /// Persistence failed.
    #[error("Database error")]
    Database(#[source] StoreError),

    /// Internal server error.
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Per-field violations, for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ApiError {
    /// Status code and machine-readable code.
    #[must_use]
    pub const fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::InvalidMultipart(_) => (StatusCode::BAD_REQUEST, "INVALID_MULTIPART"),
            Self::InvalidIdentifier(_) => (StatusCode::BAD_REQUEST, "INVALID_IDENTIFIER"),
            Self::Duplicate(_) => (StatusCode::BAD_REQUEST, "DUPLICATE_ENTITY"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::FileTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "FILE_TOO_LARGE"),
            Self::Upload(_) => (StatusCode::INTERNAL_SERVER_ERROR, "UPLOAD_FAILED"),
            Self::Fetch(FetchError::Blocked(_)) => {
                (StatusCode::BAD_REQUEST, "PROFILE_PICTURE_URL_BLOCKED")
            }
            Self::Fetch(_) => (StatusCode::BAD_GATEWAY, "PROFILE_PICTURE_FETCH_FAILED"),
            Self::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(constraint) if constraint == "users_email_key" => {
                Self::Duplicate("User already exists.".into())
            }
            StoreError::Duplicate(constraint) => {
                Self::Duplicate(format!("Duplicate value violates {constraint}."))
            }
            err @ StoreError::Database(_) => Self::Database(err),
        }
    }
}

impl From<FormError> for ApiError {
    fn from(err: FormError) -> Self {
        match err {
            FormError::Malformed(msg) => Self::InvalidMultipart(msg),
            FormError::FileTooLarge { max_size, .. } => Self::FileTooLarge { max_size },
        }
    }
}

impl From<PasswordHashError> for ApiError {
    fn from(err: PasswordHashError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let (message, details) = match self {
            Self::Validation(errors) => ("Validation failed".to_string(), Some(errors.0)),
            Self::Fetch(ref e) => {
                tracing::warn!(error = %e, "Profile picture fetch failed");
                (self.to_string(), None)
            }
            ref e if status.is_server_error() => {
                tracing::error!(error = ?e, code, "Request failed");
                (e.to_string(), None)
            }
            other => (other.to_string(), None),
        };

        let body = Json(ErrorResponse {
            error: code,
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
