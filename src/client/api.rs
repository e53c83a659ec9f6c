//! Typed calls to the upload endpoints

use serde::{de::DeserializeOwned, Serialize};

use crate::error::ErrorBody;
use crate::response::ApiResponse;
use crate::storage::CompletedPart;
use crate::upload::{
    AbortMultipartRequest, CompleteMultipartRequest, CompleteMultipartResponse, PartEtag,
    PresignPartsRequest, PresignPartsResponse, SingleUploadRequest, SingleUploadResponse,
    StartMultipartRequest, StartMultipartResponse,
};

use super::ClientError;

/// Client for `/api/v1/uploads`
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn single_upload(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> Result<SingleUploadResponse, ClientError> {
        self.post(
            "single-upload",
            &SingleUploadRequest {
                file_name: Some(file_name.to_string()),
                content_type: Some(content_type.to_string()),
            },
        )
        .await
    }

    pub async fn start_multipart(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> Result<StartMultipartResponse, ClientError> {
        self.post(
            "start-multipart-upload",
            &StartMultipartRequest {
                file_name: Some(file_name.to_string()),
                content_type: Some(content_type.to_string()),
            },
        )
        .await
    }

    pub async fn presign_parts(
        &self,
        file_name: &str,
        upload_id: &str,
        part_count: usize,
    ) -> Result<PresignPartsResponse, ClientError> {
        self.post(
            "generate-presigned-url",
            &PresignPartsRequest {
                file_name: Some(file_name.to_string()),
                upload_id: Some(upload_id.to_string()),
                part_numbers: Some(part_count as i64),
            },
        )
        .await
    }

    pub async fn complete_multipart(
        &self,
        file_name: &str,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> Result<CompleteMultipartResponse, ClientError> {
        self.post(
            "complete-multipart-upload",
            &CompleteMultipartRequest {
                file_name: Some(file_name.to_string()),
                upload_id: Some(upload_id.to_string()),
                parts: Some(
                    parts
                        .iter()
                        .map(|part| PartEtag {
                            etag: Some(part.etag.clone()),
                            part_number: Some(part.part_number as i64),
                        })
                        .collect(),
                ),
            },
        )
        .await
    }

    pub async fn abort_multipart(&self, file_name: &str, upload_id: &str) -> Result<(), ClientError> {
        self.post(
            "abort-multipart-upload",
            &AbortMultipartRequest {
                file_name: Some(file_name.to_string()),
                upload_id: Some(upload_id.to_string()),
            },
        )
        .await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        let response = self.http.post(&url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.message,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            };
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ApiResponse<T> = response.json().await?;
        Ok(envelope.data)
    }
}
