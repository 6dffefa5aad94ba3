//! Derivation of the owner snapshot that replaces embedded copies in the cache.

use crate::user::model::{OwnerSnapshot, UploadResult, UserRecord};

/// Picks the avatar reference for the new snapshot.
///
/// A non-empty uploaded URL wins; otherwise the record's existing avatar is
/// kept unchanged.
pub fn resolve_avatar_url(record: &UserRecord, upload: Option<&UploadResult>) -> Option<String> {
    upload
        .and_then(UploadResult::avatar_url)
        .map(str::to_string)
        .or_else(|| record.avatar_url.clone())
}

/// Builds the canonical owner snapshot from a persisted record and an optional
/// upload result. All fields except the avatar come verbatim from `record`.
pub fn derive_owner_snapshot(record: &UserRecord, upload: Option<&UploadResult>) -> OwnerSnapshot {
    OwnerSnapshot {
        id: record.id.clone(),
        username: record.username.clone(),
        display_name: record.display_name.clone(),
        bio: record.bio.clone(),
        avatar_url: resolve_avatar_url(record, upload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::model::{UploadedFile, UserId};

    fn record(avatar: Option<&str>) -> UserRecord {
        UserRecord {
            id: UserId::new("u1"),
            username: "alice".to_string(),
            display_name: "Alice".to_string(),
            bio: "new bio".to_string(),
            avatar_url: avatar.map(str::to_string),
        }
    }

    fn upload(url: &str) -> UploadResult {
        UploadResult::single(UploadedFile {
            url: url.to_string(),
            key: "key-1".to_string(),
            name: "avatar.png".to_string(),
        })
    }

    #[test]
    fn test_uploaded_avatar_wins() {
        let snapshot = derive_owner_snapshot(&record(Some("old.png")), Some(&upload("new.png")));
        assert_eq!(snapshot.avatar_url.as_deref(), Some("new.png"));
    }

    #[test]
    fn test_missing_upload_keeps_existing_avatar() {
        let snapshot = derive_owner_snapshot(&record(Some("old.png")), None);
        assert_eq!(snapshot.avatar_url.as_deref(), Some("old.png"));
    }

    #[test]
    fn test_empty_upload_url_keeps_existing_avatar() {
        let snapshot = derive_owner_snapshot(&record(Some("old.png")), Some(&upload("")));
        assert_eq!(snapshot.avatar_url.as_deref(), Some("old.png"));

        let snapshot = derive_owner_snapshot(&record(None), Some(&UploadResult::default()));
        assert_eq!(snapshot.avatar_url, None);
    }

    #[test]
    fn test_other_fields_copied_verbatim() {
        let source = record(Some("old.png"));
        for upload in [None, Some(upload("new.png"))] {
            let snapshot = derive_owner_snapshot(&source, upload.as_ref());
            assert_eq!(snapshot.id, source.id);
            assert_eq!(snapshot.username, source.username);
            assert_eq!(snapshot.display_name, source.display_name);
            assert_eq!(snapshot.bio, source.bio);
        }
    }
}
