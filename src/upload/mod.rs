//! Presigned Upload Module
//!
//! Protocol Flow (files of `CHUNK_SIZE` or more):
//! 1. Client starts a multipart upload and receives an upload id
//! 2. Client asks for one signed URL per part
//! 3. Client PUTs each part straight to storage and keeps the returned ETags
//! 4. Client sends the ETags back and the server completes the upload
//!
//! Smaller files get a single signed PUT URL instead.

pub mod keys;
pub mod types;
pub mod validation;

pub use keys::{sanitize_file_name, timestamped_key};
pub use types::*;
