//! In-memory profile persistence.
//!
//! Stands in for the remote profile endpoint: holds user records and applies
//! edits to the signed-in user. Failure can be injected to exercise the
//! failure paths of the pipeline.

use async_trait::async_trait;
use feedsync_core::error::{FeedsyncError, Result};
use feedsync_core::user::{ProfileEditRequest, ProfileRepository, UserId, UserRecord};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

pub struct InMemoryProfileRepository {
    current_user: UserId,
    users: RwLock<HashMap<UserId, UserRecord>>,
    fail_next: AtomicBool,
}

impl InMemoryProfileRepository {
    /// Creates a repository where `current_user` is the signed-in user.
    pub fn new(current_user: UserRecord) -> Self {
        let id = current_user.id.clone();
        let mut users = HashMap::new();
        users.insert(id.clone(), current_user);
        Self {
            current_user: id,
            users: RwLock::new(users),
            fail_next: AtomicBool::new(false),
        }
    }

    /// Makes the next `persist_profile` call fail.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub async fn find(&self, id: &UserId) -> Option<UserRecord> {
        self.users.read().await.get(id).cloned()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn persist_profile(&self, request: &ProfileEditRequest) -> Result<Option<UserRecord>> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(FeedsyncError::profile_persistence("simulated persistence failure"));
        }

        let mut users = self.users.write().await;
        let Some(record) = users.get_mut(&self.current_user) else {
            tracing::warn!(
                "[InMemoryProfileRepository] Signed-in user {} not found",
                self.current_user
            );
            return Ok(None);
        };

        record.display_name = request.display_name.clone();
        record.bio = request.bio.clone();
        tracing::debug!("[InMemoryProfileRepository] Persisted profile for {}", record.id);
        Ok(Some(record.clone()))
    }
}
