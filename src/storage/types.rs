//! Storage types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A signed request a client can perform without credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresignedUrl {
    pub url: String,
    pub method: String,
    /// Headers covered by the signature; the client must send them verbatim
    pub headers: BTreeMap<String, String>,
}

impl PresignedUrl {
    pub fn put(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "PUT".to_string(),
            headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// A part that has been uploaded and acknowledged with an ETag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedPart {
    pub part_number: i32,
    pub etag: String,
}

/// Result of completing a multipart upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedUpload {
    pub location: String,
    pub etag: Option<String>,
}
