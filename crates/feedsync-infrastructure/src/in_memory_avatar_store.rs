//! In-memory avatar upload transport.

use async_trait::async_trait;
use feedsync_core::error::{FeedsyncError, Result};
use feedsync_core::user::{AvatarPayload, AvatarUploader, UploadResult, UploadedFile};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Stores uploaded avatars in memory and serves them under `base_url`.
pub struct InMemoryAvatarStore {
    base_url: String,
    files: RwLock<HashMap<String, Vec<u8>>>,
    fail_next: AtomicBool,
}

impl InMemoryAvatarStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            files: RwLock::new(HashMap::new()),
            fail_next: AtomicBool::new(false),
        }
    }

    /// Makes the next upload fail.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.files.read().await.get(key).cloned()
    }
}

#[async_trait]
impl AvatarUploader for InMemoryAvatarStore {
    async fn upload_avatar(&self, payload: &AvatarPayload) -> Result<UploadResult> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(FeedsyncError::avatar_upload("simulated upload failure"));
        }
        if payload.is_empty() {
            return Err(FeedsyncError::avatar_upload("empty avatar payload"));
        }

        let key = format!("{}-{}", Uuid::new_v4(), payload.file_name);
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), key);
        self.files
            .write()
            .await
            .insert(key.clone(), payload.bytes.clone());
        tracing::debug!(
            "[InMemoryAvatarStore] Stored {} bytes as {}",
            payload.len(),
            key
        );

        Ok(UploadResult::single(UploadedFile {
            url,
            key,
            name: payload.file_name.clone(),
        }))
    }
}
