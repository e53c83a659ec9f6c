//! Application state management

use std::sync::Arc;

use crate::config::PresignConfig;
use crate::storage::ObjectStorage;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    presign: PresignConfig,
    storage: Arc<dyn ObjectStorage>,
}

impl AppState {
    pub fn new(presign: PresignConfig, storage: Arc<dyn ObjectStorage>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { presign, storage }),
        }
    }

    /// Get the presigning settings
    pub fn presign(&self) -> &PresignConfig {
        &self.inner.presign
    }

    /// Get the storage backend
    pub fn storage(&self) -> &dyn ObjectStorage {
        self.inner.storage.as_ref()
    }
}
