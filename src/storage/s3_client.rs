//! S3-compatible storage client
//!
//! Wraps the AWS SDK for presigning and multipart upload coordination.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    presigning::{PresignedRequest, PresigningConfig},
    types::{CompletedMultipartUpload, CompletedPart as S3CompletedPart, ObjectCannedAcl},
    Client,
};

use crate::config::StorageConfig;
use crate::error::StorageError;

use super::types::{CompletedPart, CompletedUpload, PresignedUrl};
use super::ObjectStorage;

/// S3-compatible storage client
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    object_acl: Option<ObjectCannedAcl>,
    public_base_url: String,
}

impl S3Storage {
    /// Create a new S3 client from configuration
    pub async fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let storage = Self::from_config(config);

        // Test connection by checking if bucket exists
        match storage.client.head_bucket().bucket(&storage.bucket).send().await {
            Ok(_) => {
                tracing::info!("Connected to S3 bucket: {}", storage.bucket);
            }
            Err(e) => {
                tracing::warn!(
                    "Could not verify bucket {}: {}. Will attempt operations anyway.",
                    storage.bucket,
                    DisplayErrorContext(&e)
                );
            }
        }

        Ok(storage)
    }

    /// Build the client without touching the network.
    pub fn from_config(config: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "presign-uploads",
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(config.force_path_style);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            object_acl: config.object_acl.as_deref().map(ObjectCannedAcl::from),
            public_base_url: config.public_base_url(),
        }
    }

    /// Get the bucket name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<PresignedUrl, StorageError> {
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .set_acl(self.object_acl.clone())
            .presigned(presigning_config(expires_in)?)
            .await
            .map_err(|e| StorageError::Presign(DisplayErrorContext(&e).to_string()))?;

        Ok(to_presigned_url(&request))
    }

    async fn create_multipart_upload(
        &self,
        key: &str,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let response = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .set_acl(self.object_acl.clone())
            .send()
            .await
            .map_err(|e| classify("CreateMultipartUpload", e))?;

        response
            .upload_id()
            .map(str::to_string)
            .ok_or(StorageError::MissingUploadId)
    }

    async fn presign_upload_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: i32,
        expires_in: Duration,
    ) -> Result<PresignedUrl, StorageError> {
        let request = self
            .client
            .upload_part()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .part_number(part_number)
            .presigned(presigning_config(expires_in)?)
            .await
            .map_err(|e| StorageError::Presign(DisplayErrorContext(&e).to_string()))?;

        Ok(to_presigned_url(&request))
    }

    async fn complete_multipart_upload(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> Result<CompletedUpload, StorageError> {
        let completed = CompletedMultipartUpload::builder()
            .set_parts(Some(
                parts
                    .iter()
                    .map(|part| {
                        S3CompletedPart::builder()
                            .part_number(part.part_number)
                            .e_tag(&part.etag)
                            .build()
                    })
                    .collect(),
            ))
            .build();

        let response = self
            .client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(completed)
            .send()
            .await
            .map_err(|e| classify("CompleteMultipartUpload", e))?;

        Ok(CompletedUpload {
            location: response
                .location()
                .map(str::to_string)
                .unwrap_or_else(|| self.public_url(key)),
            etag: response.e_tag().map(str::to_string),
        })
    }

    async fn abort_multipart_upload(
        &self,
        key: &str,
        upload_id: &str,
    ) -> Result<(), StorageError> {
        self.client
            .abort_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .send()
            .await
            .map_err(|e| classify("AbortMultipartUpload", e))?;

        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, urlencoding::encode(key))
    }
}

fn presigning_config(expires_in: Duration) -> Result<PresigningConfig, StorageError> {
    PresigningConfig::expires_in(expires_in).map_err(|e| StorageError::Presign(e.to_string()))
}

fn to_presigned_url(request: &PresignedRequest) -> PresignedUrl {
    // The host is implied by the URL and clients must not set it themselves.
    request
        .headers()
        .filter(|(name, _)| !name.eq_ignore_ascii_case("host"))
        .fold(
            PresignedUrl {
                url: request.uri().to_string(),
                method: request.method().to_string(),
                headers: Default::default(),
            },
            |url, (name, value)| url.with_header(name.to_ascii_lowercase(), value),
        )
}

/// Map provider rejections the caller can act on; everything else is opaque.
fn classify<E>(operation: &str, err: SdkError<E>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let message = format!("{} failed: {}", operation, DisplayErrorContext(&err));
    match err.code() {
        Some("NoSuchUpload") => StorageError::NoSuchUpload(message),
        Some("InvalidPart") | Some("InvalidPartOrder") | Some("EntityTooSmall") => {
            StorageError::InvalidPart(message)
        }
        _ => StorageError::Sdk(message),
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_s3::config::http::HttpResponse;
    use aws_sdk_s3::error::ErrorMetadata;
    use aws_sdk_s3::operation::complete_multipart_upload::CompleteMultipartUploadError;
    use axum::http::StatusCode;

    use super::*;
    use crate::error::AppError;

    fn test_config() -> StorageConfig {
        StorageConfig {
            bucket: "media".to_string(),
            region: "eu-west-1".to_string(),
            access_key: "AKIDEXAMPLE".to_string(),
            secret_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string(),
            endpoint: None,
            force_path_style: false,
            object_acl: Some("public-read".to_string()),
            public_base_url: None,
        }
    }

    #[test]
    fn test_public_url_encodes_key() {
        let storage = S3Storage::from_config(&test_config());

        assert_eq!(storage.bucket(), "media");
        assert_eq!(
            storage.public_url("1700000000000-my photo.png"),
            "https://media.s3.eu-west-1.amazonaws.com/1700000000000-my%20photo.png"
        );
    }

    #[tokio::test]
    async fn test_presign_put_signs_content_type() {
        let storage = S3Storage::from_config(&test_config());

        let presigned = storage
            .presign_put("clip.mp4", "video/mp4", Duration::from_secs(900))
            .await
            .unwrap();

        assert_eq!(presigned.method, "PUT");
        assert!(presigned.url.contains("clip.mp4"));
        assert!(presigned.url.contains("X-Amz-Signature="));
        assert!(presigned.url.contains("X-Amz-Expires=900"));
        assert_eq!(
            presigned.headers.get("content-type").map(String::as_str),
            Some("video/mp4")
        );
        assert!(!presigned.headers.contains_key("host"));
    }

    #[tokio::test]
    async fn test_presign_upload_part_query() {
        let storage = S3Storage::from_config(&test_config());

        let presigned = storage
            .presign_upload_part("clip.mp4", "upload-123", 3, Duration::from_secs(10800))
            .await
            .unwrap();

        assert_eq!(presigned.method, "PUT");
        assert!(presigned.url.contains("partNumber=3"));
        assert!(presigned.url.contains("uploadId=upload-123"));
        assert!(presigned.url.contains("X-Amz-Expires=10800"));
    }

    #[tokio::test]
    async fn test_presign_rejects_week_plus_expiry() {
        let storage = S3Storage::from_config(&test_config());

        let result = storage
            .presign_put("clip.mp4", "video/mp4", Duration::from_secs(8 * 24 * 60 * 60))
            .await;

        assert!(matches!(result, Err(StorageError::Presign(_))));
    }

    fn service_error(code: &str) -> SdkError<CompleteMultipartUploadError, HttpResponse> {
        let err = CompleteMultipartUploadError::generic(
            ErrorMetadata::builder().code(code).message("rejected").build(),
        );
        let raw = HttpResponse::new(400u16.try_into().unwrap(), "".into());
        SdkError::service_error(err, raw)
    }

    #[test]
    fn test_classify_error_codes() {
        assert!(matches!(
            classify("CompleteMultipartUpload", service_error("NoSuchUpload")),
            StorageError::NoSuchUpload(_)
        ));
        assert!(matches!(
            classify("CompleteMultipartUpload", service_error("InvalidPart")),
            StorageError::InvalidPart(_)
        ));
        assert!(matches!(
            classify("CompleteMultipartUpload", service_error("EntityTooSmall")),
            StorageError::InvalidPart(_)
        ));

        let other = classify("CompleteMultipartUpload", service_error("AccessDenied"));
        assert!(matches!(
            other,
            StorageError::Sdk(ref msg) if msg.contains("CompleteMultipartUpload failed")
        ));

        assert_eq!(
            AppError::from(classify("CompleteMultipartUpload", service_error("NoSuchUpload")))
                .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::from(other).status_code(), StatusCode::BAD_GATEWAY);
    }
}
