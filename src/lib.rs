//! Presigned Uploads
//!
//! Hands out presigned S3 URLs for single-shot and multipart uploads, and
//! ships a client that drives a parallel chunked upload against them.
//!
//! # Modules
//!
//! - `routes`: axum endpoints under `/api/v1/uploads`
//! - `storage`: provider trait and the `aws-sdk-s3` implementation
//! - `upload`: request/response types and validation
//! - `client`: file slicing and parallel part uploads

pub mod client;
pub mod config;
pub mod error;
pub mod response;
pub mod routes;
pub mod state;
pub mod storage;
pub mod upload;
