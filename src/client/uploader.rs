//! Single-shot and parallel multipart uploads of a local file

use std::io::SeekFrom;
use std::path::Path;

use futures::{stream, StreamExt, TryStreamExt};
use reqwest::header::{CONTENT_TYPE, ETAG};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::storage::CompletedPart;
use crate::upload::{timestamped_key, CHUNK_SIZE, MAX_PARTS};

use super::api::ApiClient;
use super::plan::{part_count, plan_parts, PartPlan};
use super::ClientError;

/// Parts uploaded at the same time by default
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Result of a finished upload
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub key: String,
    pub public_link: String,
    pub size: u64,
    /// 0 for single-shot uploads
    pub parts: usize,
}

/// Uploads files through presigned URLs
#[derive(Clone)]
pub struct UploadClient {
    api: ApiClient,
    http: reqwest::Client,
    chunk_size: u64,
    concurrency: usize,
}

impl UploadClient {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::new();
        Self {
            api: ApiClient::new(http.clone(), api_base_url),
            http,
            chunk_size: CHUNK_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Part size, and the size from which multipart is used
    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Upload `path`, picking single-shot or multipart by size.
    pub async fn upload_file(
        &self,
        path: &Path,
        content_type: &str,
    ) -> Result<UploadOutcome, ClientError> {
        let size = tokio::fs::metadata(path).await?.len();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ClientError::InvalidPath(path.display().to_string()))?;

        if size < self.chunk_size {
            self.single_upload(path, file_name, content_type, size).await
        } else {
            // Multipart keys are used as given, so make them unique here.
            let object_name = timestamped_key(chrono::Utc::now().timestamp_millis(), file_name);
            self.multipart_upload(path, &object_name, content_type, size)
                .await
        }
    }

    async fn single_upload(
        &self,
        path: &Path,
        file_name: &str,
        content_type: &str,
        size: u64,
    ) -> Result<UploadOutcome, ClientError> {
        let signed = self.api.single_upload(file_name, content_type).await?;
        let body = tokio::fs::read(path).await?;

        let mut request = self.http.put(&signed.url);
        for (name, value) in &signed.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if !signed.headers.contains_key("content-type") {
            request = request.header(CONTENT_TYPE, content_type);
        }

        let response = request.body(body).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::PutRejected(response.status().as_u16()));
        }

        tracing::info!(key = %signed.key, size = size, "Single upload complete");

        Ok(UploadOutcome {
            key: signed.key,
            public_link: signed.public_link,
            size,
            parts: 0,
        })
    }

    async fn multipart_upload(
        &self,
        path: &Path,
        object_name: &str,
        content_type: &str,
        size: u64,
    ) -> Result<UploadOutcome, ClientError> {
        let parts = part_count(size, self.chunk_size);
        if parts as i64 > MAX_PARTS {
            return Err(ClientError::TooManyParts {
                parts,
                max: MAX_PARTS,
            });
        }

        let started = self.api.start_multipart(object_name, content_type).await?;
        let key = started.key;
        let upload_id = started.upload_id;

        tracing::info!(
            key = %key,
            upload_id = %upload_id,
            size = size,
            parts = parts,
            "Multipart upload started"
        );

        match self
            .upload_and_complete(path, &key, &upload_id, content_type, size)
            .await
        {
            Ok((public_link, parts)) => Ok(UploadOutcome {
                key,
                public_link,
                size,
                parts,
            }),
            Err(err) => {
                tracing::warn!(key = %key, upload_id = %upload_id, "Multipart upload failed: {}", err);
                if let Err(abort_err) = self.api.abort_multipart(&key, &upload_id).await {
                    tracing::warn!(
                        key = %key,
                        upload_id = %upload_id,
                        "Failed to abort multipart upload: {}",
                        abort_err
                    );
                }
                Err(err)
            }
        }
    }

    async fn upload_and_complete(
        &self,
        path: &Path,
        key: &str,
        upload_id: &str,
        content_type: &str,
        size: u64,
    ) -> Result<(String, usize), ClientError> {
        let plan = plan_parts(size, self.chunk_size);
        let presigned = self.api.presign_parts(key, upload_id, plan.len()).await?;

        if presigned.url.len() != plan.len() {
            return Err(ClientError::UrlCountMismatch {
                expected: plan.len(),
                actual: presigned.url.len(),
            });
        }

        let mut parts: Vec<CompletedPart> = stream::iter(plan.into_iter().zip(presigned.url))
            .map(|(part, url)| self.upload_part(path, part, url, content_type))
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await?;

        // Completion order is arbitrary; storage wants ascending part numbers.
        parts.sort_by_key(|part| part.part_number);

        let completed = self.api.complete_multipart(key, upload_id, &parts).await?;

        tracing::info!(key = %key, parts = parts.len(), "Multipart upload complete");

        Ok((completed.public_link, parts.len()))
    }

    async fn upload_part(
        &self,
        path: &Path,
        part: PartPlan,
        url: String,
        content_type: &str,
    ) -> Result<CompletedPart, ClientError> {
        let body = read_range(path, part.offset, part.len).await?;

        let response = self
            .http
            .put(&url)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::PartRejected {
                part_number: part.part_number,
                status: status.as_u16(),
            });
        }

        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or(ClientError::MissingEtag(part.part_number))?;

        tracing::debug!(
            part_number = part.part_number,
            bytes = part.len,
            etag = %etag,
            "Part uploaded"
        );

        Ok(CompletedPart {
            part_number: part.part_number,
            etag,
        })
    }
}

/// Read `len` bytes starting at `offset`.
async fn read_range(path: &Path, offset: u64, len: u64) -> std::io::Result<Vec<u8>> {
    let mut file = File::open(path).await?;
    file.seek(SeekFrom::Start(offset)).await?;

    let mut buf = vec![0u8; len as usize];
    file.read_exact(&mut buf).await?;
    Ok(buf)
}
