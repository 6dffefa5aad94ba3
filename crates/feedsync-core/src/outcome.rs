//! Outcome of a profile edit as seen by the caller.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::user::OwnerSnapshot;

/// Why a profile edit did not fully succeed.
///
/// Deliberately coarse: collaborator error text stays in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Profile fields were not persisted; nothing changed
    ProfilePersistence,
    /// Profile fields were persisted but the avatar upload failed
    AvatarUpload,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProfilePersistence => f.write_str("profile could not be saved"),
            Self::AvatarUpload => f.write_str("avatar could not be uploaded"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProfileEditOutcome {
    Success {
        owner_snapshot: OwnerSnapshot,
    },
    /// Fields were saved and reconciled; the avatar was not
    PartialFailure {
        owner_snapshot: OwnerSnapshot,
        reason: FailureReason,
    },
    Failure {
        reason: FailureReason,
    },
}

impl ProfileEditOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The snapshot written into the cache, if any reconciliation happened.
    pub fn owner_snapshot(&self) -> Option<&OwnerSnapshot> {
        match self {
            Self::Success { owner_snapshot } | Self::PartialFailure { owner_snapshot, .. } => {
                Some(owner_snapshot)
            }
            Self::Failure { .. } => None,
        }
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            Self::Success { .. } => None,
            Self::PartialFailure { reason, .. } | Self::Failure { reason } => Some(*reason),
        }
    }
}
