//! Chunked Upload Client
//!
//! Drives an upload against the presigned URL API:
//! - files smaller than the chunk size go up with one signed PUT
//! - larger files are sliced into parts that are PUT in parallel, and the
//!   ETags storage returns are sent back to complete the upload
//!
//! Part failures abort the multipart upload. There are no retries.

pub mod api;
pub mod plan;
pub mod uploader;

use thiserror::Error;

pub use api::ApiClient;
pub use plan::{part_count, plan_parts, PartPlan};
pub use uploader::{UploadClient, UploadOutcome, DEFAULT_CONCURRENCY};

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Storage rejected the upload with status {0}")]
    PutRejected(u16),

    #[error("Storage rejected part {part_number} with status {status}")]
    PartRejected { part_number: i32, status: u16 },

    #[error("Response for part {0} carried no ETag")]
    MissingEtag(i32),

    #[error("Expected {expected} presigned urls, got {actual}")]
    UrlCountMismatch { expected: usize, actual: usize },

    #[error("File needs {parts} parts, more than the limit of {max}")]
    TooManyParts { parts: u64, max: i64 },

    #[error("Invalid file path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
