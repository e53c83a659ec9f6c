//! Helpers for driving the router in tests

use std::sync::Arc;

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::config::PresignConfig;
use crate::state::AppState;
use crate::storage::memory::MemoryStorage;

pub const STORAGE_BASE: &str = "https://storage.test/media";

pub fn test_app() -> (Router, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new(STORAGE_BASE));
    let state = AppState::new(PresignConfig::default(), storage.clone());
    (super::router(state), storage)
}

pub async fn get(app: Router, path: &str) -> (StatusCode, HeaderMap, String) {
    let response = app
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

pub async fn post_raw(app: Router, path: &str, body: impl Into<Body>) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(path)
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

pub async fn post_json(app: Router, path: &str, body: Value) -> (StatusCode, Value) {
    post_raw(app, path, body.to_string()).await
}
