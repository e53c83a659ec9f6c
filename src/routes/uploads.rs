//! Upload Routes
//!
//! HTTP endpoints that hand out presigned URLs.
//!
//! Endpoints:
//! - POST /api/v1/uploads/single-upload - Signed PUT URL for a small file
//! - POST /api/v1/uploads/start-multipart-upload - Create a multipart upload
//! - POST /api/v1/uploads/generate-presigned-url - Signed URL per part
//! - POST /api/v1/uploads/complete-multipart-upload - Stitch parts from their ETags
//! - POST /api/v1/uploads/abort-multipart-upload - Discard an unfinished upload

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    routing::post,
    Json, Router,
};
use futures::future::try_join_all;

use crate::error::Result;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::upload::validation::{
    normalize_parts, require_content_type, require_file_name, require_part_count,
    require_upload_id,
};
use crate::upload::{
    timestamped_key, AbortMultipartRequest, CompleteMultipartRequest, CompleteMultipartResponse,
    PartUrl, PresignPartsRequest, PresignPartsResponse, SingleUploadRequest,
    SingleUploadResponse, StartMultipartRequest, StartMultipartResponse,
};

// ============================================================================
// Router
// ============================================================================

/// Body limit for completion requests, which carry one `{etag, partNumber}`
/// entry per part: 1MB covers `MAX_PARTS` entries.
pub const COMPLETE_BODY_LIMIT: usize = 1024 * 1024;

/// Create the upload router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/single-upload", post(single_upload))
        .route("/start-multipart-upload", post(start_multipart_upload))
        .route("/generate-presigned-url", post(generate_presigned_urls))
        .route(
            "/complete-multipart-upload",
            post(complete_multipart_upload).layer(DefaultBodyLimit::max(COMPLETE_BODY_LIMIT)),
        )
        .route("/abort-multipart-upload", post(abort_multipart_upload))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/uploads/single-upload
///
/// The key is prefixed with the current time in milliseconds.
async fn single_upload(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SingleUploadRequest>, JsonRejection>,
) -> Result<ApiResponse<SingleUploadResponse>> {
    let Json(request) = payload?;
    let file_name = require_file_name(request.file_name.as_deref())?;
    let content_type = require_content_type(request.content_type.as_deref())?;

    let key = timestamped_key(chrono::Utc::now().timestamp_millis(), &file_name);
    let storage = state.storage();

    let presigned = storage
        .presign_put(&key, &content_type, state.presign().single_expiry)
        .await?;

    tracing::info!(
        key = %key,
        content_type = %content_type,
        "Presigned single upload"
    );

    Ok(ApiResponse::created(
        SingleUploadResponse {
            url: presigned.url,
            public_link: storage.public_url(&key),
            key,
            headers: presigned.headers,
        },
        "Presigned url created successfully",
    ))
}

/// POST /api/v1/uploads/start-multipart-upload
///
/// The file name is used as the key unchanged; clients make it unique.
async fn start_multipart_upload(
    State(state): State<AppState>,
    payload: std::result::Result<Json<StartMultipartRequest>, JsonRejection>,
) -> Result<ApiResponse<StartMultipartResponse>> {
    let Json(request) = payload?;
    let key = require_file_name(request.file_name.as_deref())?;
    let content_type = require_content_type(request.content_type.as_deref())?;

    let upload_id = state
        .storage()
        .create_multipart_upload(&key, &content_type)
        .await?;

    tracing::info!(
        key = %key,
        upload_id = %upload_id,
        content_type = %content_type,
        "Multipart upload initiated"
    );

    Ok(ApiResponse::ok(
        StartMultipartResponse { upload_id, key },
        "Multipart upload initiated successfully",
    ))
}

/// POST /api/v1/uploads/generate-presigned-url
///
/// `partNumbers` is a count; every part from 1 to that count is signed.
async fn generate_presigned_urls(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PresignPartsRequest>, JsonRejection>,
) -> Result<ApiResponse<PresignPartsResponse>> {
    let Json(request) = payload?;
    let key = require_file_name(request.file_name.as_deref())?;
    let upload_id = require_upload_id(request.upload_id.as_deref())?;
    let count = require_part_count(request.part_numbers)?;

    let storage = state.storage();
    let expires_in = state.presign().part_expiry;

    let parts = try_join_all((1..=count).map(|part_number| {
        let key = &key;
        let upload_id = &upload_id;
        async move {
            storage
                .presign_upload_part(key, upload_id, part_number, expires_in)
                .await
                .map(|presigned| PartUrl {
                    part_number,
                    url: presigned.url,
                })
        }
    }))
    .await?;

    tracing::debug!(
        key = %key,
        upload_id = %upload_id,
        parts = count,
        "Presigned multipart part urls"
    );

    Ok(ApiResponse::ok(
        PresignPartsResponse {
            url: parts.iter().map(|p| p.url.clone()).collect(),
            parts,
        },
        "Presigned urls generated successfully",
    ))
}

/// POST /api/v1/uploads/complete-multipart-upload
async fn complete_multipart_upload(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CompleteMultipartRequest>, JsonRejection>,
) -> Result<ApiResponse<CompleteMultipartResponse>> {
    let Json(request) = payload?;
    let key = require_file_name(request.file_name.as_deref())?;
    let upload_id = require_upload_id(request.upload_id.as_deref())?;
    let parts = normalize_parts(request.parts.as_deref())?;

    let completed = state
        .storage()
        .complete_multipart_upload(&key, &upload_id, &parts)
        .await?;

    tracing::info!(
        key = %key,
        upload_id = %upload_id,
        parts = parts.len(),
        location = %completed.location,
        "Multipart upload completed"
    );

    Ok(ApiResponse::ok(
        CompleteMultipartResponse {
            public_link: completed.location,
            etag: completed.etag,
        },
        "Multipart upload completed successfully",
    ))
}

/// POST /api/v1/uploads/abort-multipart-upload
async fn abort_multipart_upload(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AbortMultipartRequest>, JsonRejection>,
) -> Result<ApiResponse<()>> {
    let Json(request) = payload?;
    let key = require_file_name(request.file_name.as_deref())?;
    let upload_id = require_upload_id(request.upload_id.as_deref())?;

    state
        .storage()
        .abort_multipart_upload(&key, &upload_id)
        .await?;

    tracing::info!(key = %key, upload_id = %upload_id, "Multipart upload aborted");

    Ok(ApiResponse::ok((), "Multipart upload aborted"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::super::test_util::{post_json, post_raw, test_app, STORAGE_BASE};

    #[tokio::test]
    async fn test_single_upload() {
        let (app, _) = test_app();

        let (status, body) = post_json(
            app,
            "/api/v1/uploads/single-upload",
            json!({ "fileName": "cat.png", "contentType": "image/png" }),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["statusCode"], 201);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Presigned url created successfully");

        let key = body["data"]["key"].as_str().unwrap();
        let (millis, name) = key.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(name, "cat.png");

        assert_eq!(
            body["data"]["publicLink"],
            format!("{}/{}", STORAGE_BASE, key)
        );
        assert!(body["data"]["url"].as_str().unwrap().starts_with(STORAGE_BASE));
        assert_eq!(body["data"]["headers"]["content-type"], "image/png");
    }

    #[tokio::test]
    async fn test_single_upload_validation() {
        let (app, _) = test_app();

        let (status, body) = post_json(
            app.clone(),
            "/api/v1/uploads/single-upload",
            json!({ "contentType": "image/png" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Filename not present");
        assert_eq!(body["success"], false);

        let (status, body) = post_json(
            app.clone(),
            "/api/v1/uploads/single-upload",
            json!({ "fileName": "cat.png" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Content Type not present");

        let (status, body) = post_json(
            app,
            "/api/v1/uploads/single-upload",
            json!({ "fileName": "notes.pdf", "contentType": "application/pdf" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "Invalid content type. Only images and videos are allowed"
        );
    }

    #[tokio::test]
    async fn test_malformed_and_oversized_bodies() {
        let (app, _) = test_app();

        let (status, body) =
            post_raw(app.clone(), "/api/v1/uploads/single-upload", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let huge = json!({
            "fileName": "x".repeat(20 * 1024),
            "contentType": "image/png",
        });
        let (status, body) = post_json(app, "/api/v1/uploads/single-upload", huge).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["statusCode"], 413);
    }

    #[tokio::test]
    async fn test_multipart_flow() {
        let (app, storage) = test_app();

        let (status, body) = post_json(
            app.clone(),
            "/api/v1/uploads/start-multipart-upload",
            json!({ "fileName": "1700000000000-movie.mp4", "contentType": "video/mp4" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["key"], "1700000000000-movie.mp4");
        let upload_id = body["data"]["uploadId"].as_str().unwrap().to_string();

        let (status, body) = post_json(
            app.clone(),
            "/api/v1/uploads/generate-presigned-url",
            json!({
                "fileName": "1700000000000-movie.mp4",
                "uploadId": upload_id,
                "partNumbers": 3,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let urls = body["data"]["url"].as_array().unwrap();
        assert_eq!(urls.len(), 3);
        for (index, url) in urls.iter().enumerate() {
            let url = url.as_str().unwrap();
            assert!(url.contains(&format!("partNumber={}", index + 1)));
            assert!(url.contains(&format!("uploadId={}", upload_id)));
            assert!(url.contains("expires=10800"));
        }
        assert_eq!(body["data"]["parts"][2]["partNumber"], 3);

        let (status, body) = post_json(
            app,
            "/api/v1/uploads/complete-multipart-upload",
            json!({
                "fileName": "1700000000000-movie.mp4",
                "uploadId": upload_id,
                "parts": [{ "etag": "\"e1\"" }, { "etag": "\"e2\"" }, { "etag": "\"e3\"" }],
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Multipart upload completed successfully");
        assert_eq!(
            body["data"]["publicLink"],
            format!("{}/1700000000000-movie.mp4", STORAGE_BASE)
        );

        let parts = storage.completed_parts("1700000000000-movie.mp4").unwrap();
        let numbered: Vec<(i32, &str)> = parts
            .iter()
            .map(|p| (p.part_number, p.etag.as_str()))
            .collect();
        assert_eq!(numbered, vec![(1, "\"e1\""), (2, "\"e2\""), (3, "\"e3\"")]);
        assert_eq!(storage.open_uploads(), 0);
    }

    #[tokio::test]
    async fn test_complete_accepts_hundreds_of_parts() {
        let (app, storage) = test_app();

        let (_, body) = post_json(
            app.clone(),
            "/api/v1/uploads/start-multipart-upload",
            json!({ "fileName": "1700000000000-long.mp4", "contentType": "video/mp4" }),
        )
        .await;
        let upload_id = body["data"]["uploadId"].as_str().unwrap().to_string();

        let parts: Vec<_> = (1..=1000)
            .map(|n| json!({ "etag": format!("\"{:032x}\"", n), "partNumber": n }))
            .collect();
        let request = json!({
            "fileName": "1700000000000-long.mp4",
            "uploadId": upload_id,
            "parts": parts,
        });
        assert!(request.to_string().len() > super::super::JSON_BODY_LIMIT);

        let (status, body) =
            post_json(app, "/api/v1/uploads/complete-multipart-upload", request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let completed = storage.completed_parts("1700000000000-long.mp4").unwrap();
        assert_eq!(completed.len(), 1000);
        assert_eq!(completed[999].part_number, 1000);
    }

    #[tokio::test]
    async fn test_presign_part_count_validation() {
        let (app, _) = test_app();

        for count in [json!(0), json!(10_001), json!(-1)] {
            let (status, body) = post_json(
                app.clone(),
                "/api/v1/uploads/generate-presigned-url",
                json!({ "fileName": "a.mp4", "uploadId": "upload-1", "partNumbers": count }),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["success"], false);
        }

        let (status, body) = post_json(
            app,
            "/api/v1/uploads/generate-presigned-url",
            json!({ "fileName": "a.mp4", "partNumbers": 2 }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Upload id not present");
    }

    #[tokio::test]
    async fn test_complete_unknown_upload() {
        let (app, _) = test_app();

        let (status, body) = post_json(
            app.clone(),
            "/api/v1/uploads/complete-multipart-upload",
            json!({
                "fileName": "a.mp4",
                "uploadId": "missing",
                "parts": [{ "etag": "\"e1\"" }],
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, _) = post_json(
            app,
            "/api/v1/uploads/complete-multipart-upload",
            json!({ "fileName": "a.mp4", "uploadId": "missing", "parts": [] }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_abort_multipart_upload() {
        let (app, storage) = test_app();

        let (_, body) = post_json(
            app.clone(),
            "/api/v1/uploads/start-multipart-upload",
            json!({ "fileName": "clip.webm", "contentType": "video/webm" }),
        )
        .await;
        let upload_id = body["data"]["uploadId"].as_str().unwrap().to_string();

        let (status, body) = post_json(
            app,
            "/api/v1/uploads/abort-multipart-upload",
            json!({ "fileName": "clip.webm", "uploadId": upload_id }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"].is_null());
        assert_eq!(storage.aborted(), vec![upload_id]);
    }
}
