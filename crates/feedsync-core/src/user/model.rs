//! User domain models.
//!
//! A profile edit carries editable fields plus an optional avatar payload.
//! The persisted [`UserRecord`] is the source of truth after the write; the
//! [`OwnerSnapshot`] is the denormalized copy embedded in every feed item.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the id is blank and cannot identify anyone.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Binary avatar image submitted with a profile edit.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarPayload {
    /// Original file name, forwarded to the upload transport
    pub file_name: String,
    /// MIME type of the image (e.g. `image/png`)
    pub content_type: String,
    /// Raw image bytes
    pub bytes: Vec<u8>,
}

impl AvatarPayload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Bytes are elided so payloads never end up verbatim in logs.
impl fmt::Debug for AvatarPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvatarPayload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A user's profile edit submission.
///
/// Created once per submission and consumed by the use case. Fields that the
/// user may edit are carried verbatim; the avatar is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEditRequest {
    /// New display name
    pub display_name: String,
    /// New biography text
    pub bio: String,
    /// Replacement avatar image, if the user picked one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<AvatarPayload>,
}

impl ProfileEditRequest {
    pub fn new(display_name: impl Into<String>, bio: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            bio: bio.into(),
            avatar: None,
        }
    }

    pub fn with_avatar(mut self, avatar: AvatarPayload) -> Self {
        self.avatar = Some(avatar);
        self
    }

    pub fn has_avatar(&self) -> bool {
        self.avatar.is_some()
    }
}

/// Authoritative user record returned after the profile write.
///
/// `avatar_url` is the avatar the user had before this edit; a freshly
/// uploaded avatar is only known from the [`UploadResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
    pub bio: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A single file accepted by the upload transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Public URL where the file is served
    pub url: String,
    /// Storage key assigned by the transport
    pub key: String,
    /// File name as stored
    pub name: String,
}

/// Result of an avatar upload.
///
/// The transport accepts a batch of files; only the first one is an avatar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub files: Vec<UploadedFile>,
}

impl UploadResult {
    pub fn single(file: UploadedFile) -> Self {
        Self { files: vec![file] }
    }

    /// Returns the persisted avatar reference, if the upload produced one.
    pub fn avatar_url(&self) -> Option<&str> {
        self.files
            .first()
            .map(|file| file.url.as_str())
            .filter(|url| !url.trim().is_empty())
    }
}

/// Denormalized projection of a user embedded in every feed item they author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerSnapshot {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
    pub bio: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}
