//! In-memory storage used by the route and client tests

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::StorageError;

use super::types::{CompletedPart, CompletedUpload, PresignedUrl};
use super::ObjectStorage;

/// Signs URLs under `base_url` and records multipart bookkeeping
pub struct MemoryStorage {
    base_url: String,
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    next_id: u64,
    /// upload id -> (key, content type)
    open: HashMap<String, (String, String)>,
    /// key -> parts it was completed with
    completed: HashMap<String, Vec<CompletedPart>>,
    aborted: Vec<String>,
}

impl MemoryStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            inner: Mutex::new(MemoryInner::default()),
        }
    }

    pub fn completed_parts(&self, key: &str) -> Option<Vec<CompletedPart>> {
        self.inner.lock().unwrap().completed.get(key).cloned()
    }

    pub fn aborted(&self) -> Vec<String> {
        self.inner.lock().unwrap().aborted.clone()
    }

    pub fn open_uploads(&self) -> usize {
        self.inner.lock().unwrap().open.len()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<PresignedUrl, StorageError> {
        Ok(PresignedUrl::put(format!(
            "{}/{}?expires={}",
            self.base_url,
            urlencoding::encode(key),
            expires_in.as_secs()
        ))
        .with_header("content-type", content_type))
    }

    async fn create_multipart_upload(
        &self,
        key: &str,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let upload_id = format!("upload-{}", inner.next_id);
        inner
            .open
            .insert(upload_id.clone(), (key.to_string(), content_type.to_string()));
        Ok(upload_id)
    }

    async fn presign_upload_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: i32,
        expires_in: Duration,
    ) -> Result<PresignedUrl, StorageError> {
        Ok(PresignedUrl::put(format!(
            "{}/{}?partNumber={}&uploadId={}&expires={}",
            self.base_url,
            urlencoding::encode(key),
            part_number,
            upload_id,
            expires_in.as_secs()
        )))
    }

    async fn complete_multipart_upload(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> Result<CompletedUpload, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.open.remove(upload_id) {
            Some((open_key, _)) if open_key == key => {}
            _ => return Err(StorageError::NoSuchUpload(upload_id.to_string())),
        }
        inner.completed.insert(key.to_string(), parts.to_vec());

        Ok(CompletedUpload {
            location: self.public_url(key),
            etag: Some(format!("\"{}-{}\"", upload_id, parts.len())),
        })
    }

    async fn abort_multipart_upload(
        &self,
        key: &str,
        upload_id: &str,
    ) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.open.remove(upload_id) {
            Some((open_key, _)) if open_key == key => {
                inner.aborted.push(upload_id.to_string());
                Ok(())
            }
            _ => Err(StorageError::NoSuchUpload(upload_id.to_string())),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(key))
    }
}
