//! Error types for the presigned upload server

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Storage provider errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to presign request: {0}")]
    Presign(String),

    #[error("S3 SDK error: {0}")]
    Sdk(String),

    #[error("Multipart upload not found: {0}")]
    NoSuchUpload(String),

    #[error("Invalid part: {0}")]
    InvalidPart(String),

    #[error("Provider did not return an upload id")]
    MissingUploadId,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub message: String,
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Storage(StorageError::NoSuchUpload(_))
            | AppError::Storage(StorageError::InvalidPart(_)) => StatusCode::BAD_REQUEST,
            AppError::Storage(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge;
        }
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            AppError::Storage(e) if status.is_server_error() => {
                tracing::error!("Storage error: {}", e);
                "Storage provider request failed".to_string()
            }
            other => {
                tracing::warn!(status = status.as_u16(), "Rejected request: {}", other);
                other.to_string()
            }
        };

        let body = Json(ErrorBody {
            status_code: status.as_u16(),
            message,
            success: false,
            errors: if cfg!(debug_assertions) && status.is_server_error() {
                vec![self.to_string()]
            } else {
                Vec::new()
            },
        });

        (status, body).into_response()
    }
}
