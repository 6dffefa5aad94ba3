//! Configuration model.
//!
//! Loaded from `config.toml` by the infrastructure layer. Every section has
//! defaults so a missing or partial file still yields a working pipeline.

use serde::{Deserialize, Serialize};

use crate::cache::{QueryKey, TopicPattern};

/// Root configuration.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FeedsyncConfig {
    /// Default tracing filter when `RUST_LOG` is not set
    pub log_level: String,
    pub reconcile: ReconcileSettings,
    pub messages: NotificationMessages,
}

impl Default for FeedsyncConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            reconcile: ReconcileSettings::default(),
            messages: NotificationMessages::default(),
        }
    }
}

/// Which cache entries get patched after a profile edit.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ReconcileSettings {
    /// Topics whose entries embed owner snapshots
    pub topics: Vec<TopicPattern>,
    /// Whether a partial failure also requests a coarse view refresh
    pub refresh_after_partial_failure: bool,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            topics: vec![TopicPattern::prefix(QueryKey::new(["post-feed"]))],
            refresh_after_partial_failure: true,
        }
    }
}

/// User-facing notification texts. These never include collaborator errors.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct NotificationMessages {
    pub success: String,
    pub failure: String,
    pub avatar_failure: String,
}

impl Default for NotificationMessages {
    fn default() -> Self {
        Self {
            success: "Profile updated successfully!".to_string(),
            failure: "Failed to update profile. Please try again.".to_string(),
            avatar_failure: "Profile saved, but the avatar could not be uploaded. Please try again."
                .to_string(),
        }
    }
}
