//! Fork-join of the two halves of a profile edit.

use feedsync_core::error::FeedsyncError;
use feedsync_core::user::{
    AvatarUploader, ProfileEditRequest, ProfileRepository, UploadResult, UserRecord,
};
use std::sync::Arc;

/// Combined result of the profile write and the optional avatar upload.
///
/// Partial success is its own variant so callers cannot mistake it for either
/// a clean success or a clean failure.
#[derive(Debug, Clone)]
pub enum MutationOutcome {
    /// Profile persisted; `upload` is `None` when no avatar was submitted
    Completed {
        updated: UserRecord,
        upload: Option<UploadResult>,
    },
    /// Profile was not persisted. The upload outcome is irrelevant.
    ProfileFailed { error: FeedsyncError },
    /// Profile persisted but the avatar upload failed. There is no rollback
    /// of the profile write.
    UploadFailed {
        updated: UserRecord,
        error: FeedsyncError,
    },
}

/// Runs profile persistence and avatar upload concurrently.
pub struct MutationOrchestrator {
    profile_repository: Arc<dyn ProfileRepository>,
    avatar_uploader: Arc<dyn AvatarUploader>,
}

impl MutationOrchestrator {
    pub fn new(
        profile_repository: Arc<dyn ProfileRepository>,
        avatar_uploader: Arc<dyn AvatarUploader>,
    ) -> Self {
        Self {
            profile_repository,
            avatar_uploader,
        }
    }

    /// Invokes each collaborator at most once and waits for both to settle.
    pub async fn run(&self, request: &ProfileEditRequest) -> MutationOutcome {
        tracing::debug!(
            "[MutationOrchestrator] run() called, has_avatar={}",
            request.has_avatar()
        );

        let persist = self.profile_repository.persist_profile(request);
        let upload = async {
            match &request.avatar {
                Some(payload) => Some(self.avatar_uploader.upload_avatar(payload).await),
                None => None,
            }
        };

        let (persisted, uploaded) = tokio::join!(persist, upload);

        let updated = match persisted {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::warn!("[MutationOrchestrator] Profile persistence returned no record");
                return MutationOutcome::ProfileFailed {
                    error: FeedsyncError::profile_persistence("no user record returned"),
                };
            }
            Err(error) => {
                tracing::warn!("[MutationOrchestrator] Profile persistence failed: {}", error);
                return MutationOutcome::ProfileFailed { error };
            }
        };

        match uploaded {
            None => MutationOutcome::Completed {
                updated,
                upload: None,
            },
            Some(Ok(upload)) => MutationOutcome::Completed {
                updated,
                upload: Some(upload),
            },
            Some(Err(error)) => {
                tracing::warn!(
                    "[MutationOrchestrator] Avatar upload failed after profile for {} was persisted: {}",
                    updated.id,
                    error
                );
                MutationOutcome::UploadFailed { updated, error }
            }
        }
    }
}
