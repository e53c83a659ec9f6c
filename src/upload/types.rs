//! Upload request and response types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// MIME types accepted for upload: images and videos only
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "video/mp4",
    "video/mpeg",
    "video/quicktime",
    "video/webm",
];

/// Part size used by the client, and the single/multipart threshold: 10MB
pub const CHUNK_SIZE: u64 = 10 * 1024 * 1024;

/// Highest part number a multipart upload may use
pub const MAX_PARTS: i64 = 10_000;

// ============================================================================
// Single Upload
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleUploadRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleUploadResponse {
    /// Signed PUT URL
    pub url: String,

    /// Where the object is reachable once uploaded
    pub public_link: String,

    /// Object key the URL writes to
    pub key: String,

    /// Headers the PUT must carry
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

// ============================================================================
// Multipart Upload
// ============================================================================

pub type StartMultipartRequest = SingleUploadRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartMultipartResponse {
    pub upload_id: String,
    pub key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignPartsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_id: Option<String>,

    /// Number of parts to sign, numbered 1..=part_numbers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_numbers: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartUrl {
    pub part_number: i32,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignPartsResponse {
    /// Signed URLs; index `i` uploads part `i + 1`
    pub url: Vec<String>,

    pub parts: Vec<PartUrl>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartEtag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// Defaults to the part's position in the list (1-based)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteMultipartRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<PartEtag>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteMultipartResponse {
    pub public_link: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbortMultipartRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_id: Option<String>,
}
