//! User domain module.
//!
//! This module contains the profile edit models, the collaborator traits that
//! persist profile fields and upload avatars, and the derivation of the owner
//! snapshot embedded in feed items.
//!
//! # Module Structure
//!
//! - `model`: Profile edit request, persisted user record, upload result, owner snapshot
//! - `repository`: Profile persistence and avatar upload traits
//! - `snapshot`: Pure derivation of the new owner snapshot
//!
//! # Usage
//!
//! ```ignore
//! use feedsync_core::user::{ProfileEditRequest, derive_owner_snapshot};
//! ```

mod model;
mod repository;
mod snapshot;

// Re-export public API
pub use model::{
    AvatarPayload, OwnerSnapshot, ProfileEditRequest, UploadResult, UploadedFile, UserId,
    UserRecord,
};
pub use repository::{AvatarUploader, ProfileRepository};
pub use snapshot::{derive_owner_snapshot, resolve_avatar_url};
