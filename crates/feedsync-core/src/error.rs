//! Error types for feedsync.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire feedsync workspace.
///
/// The first three variants form the mutation taxonomy: a failed profile
/// write is fatal, a failed avatar upload is partial, and a failed cache
/// patch is logged and compensated by a coarse refresh.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedsyncError {
    /// The profile persistence collaborator failed or returned no record
    #[error("Profile persistence failed: {message}")]
    ProfilePersistence { message: String },

    /// The avatar upload collaborator failed
    #[error("Avatar upload failed: {message}")]
    AvatarUpload { message: String },

    /// The cache store rejected or could not apply a reconciliation step
    #[error("Cache reconciliation failed: {message}")]
    CacheReconciliation { message: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FeedsyncError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a ProfilePersistence error
    pub fn profile_persistence(message: impl Into<String>) -> Self {
        Self::ProfilePersistence {
            message: message.into(),
        }
    }

    /// Creates an AvatarUpload error
    pub fn avatar_upload(message: impl Into<String>) -> Self {
        Self::AvatarUpload {
            message: message.into(),
        }
    }

    /// Creates a CacheReconciliation error
    pub fn cache_reconciliation(message: impl Into<String>) -> Self {
        Self::CacheReconciliation {
            message: message.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a ProfilePersistence error
    pub fn is_profile_persistence(&self) -> bool {
        matches!(self, Self::ProfilePersistence { .. })
    }

    /// Check if this is an AvatarUpload error
    pub fn is_avatar_upload(&self) -> bool {
        matches!(self, Self::AvatarUpload { .. })
    }

    /// Check if this is a CacheReconciliation error
    pub fn is_cache_reconciliation(&self) -> bool {
        matches!(self, Self::CacheReconciliation { .. })
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for FeedsyncError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for FeedsyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for FeedsyncError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for FeedsyncError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, FeedsyncError>`.
pub type Result<T> = std::result::Result<T, FeedsyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_helpers_set_variant() {
        assert!(FeedsyncError::profile_persistence("boom").is_profile_persistence());
        assert!(FeedsyncError::avatar_upload("boom").is_avatar_upload());
        assert!(FeedsyncError::cache_reconciliation("boom").is_cache_reconciliation());
        assert!(FeedsyncError::config("bad").is_config());
    }

    #[test]
    fn test_io_error_conversion_keeps_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: FeedsyncError = io.into();
        assert!(err.to_string().contains("NotFound"));
    }

    #[test]
    fn test_toml_error_conversion() {
        let parsed: std::result::Result<toml::Value, _> = toml::from_str("= nope");
        let err: FeedsyncError = parsed.unwrap_err().into();
        assert!(matches!(err, FeedsyncError::Serialization { ref format, .. } if format == "TOML"));
    }
}
