//! Storage module for S3-compatible backends
//!
//! The upload routes never talk to the SDK directly; they go through
//! [`ObjectStorage`] so the provider can be swapped (MinIO, R2, AWS S3) or
//! faked in tests.

#[cfg(test)]
pub mod memory;
mod s3_client;
mod types;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StorageError;

pub use s3_client::S3Storage;
pub use types::*;

/// Provider operations needed to drive presigned single and multipart uploads
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Sign a single-shot `PutObject` for `key`.
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<PresignedUrl, StorageError>;

    /// Start a multipart upload and return its upload id.
    async fn create_multipart_upload(
        &self,
        key: &str,
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// Sign an `UploadPart` request for one part number.
    async fn presign_upload_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: i32,
        expires_in: Duration,
    ) -> Result<PresignedUrl, StorageError>;

    /// Stitch the uploaded parts together. `parts` is sorted by part number.
    async fn complete_multipart_upload(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> Result<CompletedUpload, StorageError>;

    async fn abort_multipart_upload(&self, key: &str, upload_id: &str)
        -> Result<(), StorageError>;

    /// Public URL of an object once it exists.
    fn public_url(&self, key: &str) -> String;
}
