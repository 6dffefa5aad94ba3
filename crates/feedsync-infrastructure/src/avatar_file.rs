//! Loading avatar images from disk.

use feedsync_core::error::{FeedsyncError, Result};
use feedsync_core::user::AvatarPayload;
use std::path::Path;
use tokio::fs;

/// Infers the MIME type from a filename extension using the `mime_guess` library.
fn infer_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

/// Reads an image file into an [`AvatarPayload`].
///
/// # Errors
///
/// Returns an error if the file cannot be read, is empty, or does not look
/// like an image.
pub async fn load_avatar_payload(path: &Path) -> Result<AvatarPayload> {
    let content_type = infer_mime_type(path);
    if !content_type.starts_with("image/") {
        return Err(FeedsyncError::config(format!(
            "{:?} is not an image ({})",
            path, content_type
        )));
    }

    let bytes = fs::read(path).await?;
    if bytes.is_empty() {
        return Err(FeedsyncError::config(format!("{:?} is empty", path)));
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "avatar".to_string());

    Ok(AvatarPayload::new(file_name, content_type, bytes))
}
