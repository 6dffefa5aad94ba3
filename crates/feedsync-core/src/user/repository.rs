//! Collaborator traits for the two halves of a profile edit.

use async_trait::async_trait;

use crate::error::Result;
use crate::user::model::{AvatarPayload, ProfileEditRequest, UploadResult, UserRecord};

/// Persists profile fields.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Writes the editable fields of `request` and returns the updated record.
    ///
    /// `Ok(None)` means the write did not produce a record and is treated as a
    /// persistence failure by the caller.
    async fn persist_profile(&self, request: &ProfileEditRequest) -> Result<Option<UserRecord>>;
}

/// Uploads a replacement avatar image.
#[async_trait]
pub trait AvatarUploader: Send + Sync {
    async fn upload_avatar(&self, payload: &AvatarPayload) -> Result<UploadResult>;
}
