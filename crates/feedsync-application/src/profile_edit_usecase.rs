//! Profile edit use case implementation.
//!
//! This module provides the `ProfileEditUseCase` which persists a profile
//! edit, reconciles the updated user into every cached feed listing, and
//! reports the outcome through the notification side channel.

use crate::profile_edit::{CacheReconciler, MutationOrchestrator, MutationOutcome, OutcomeReporter};
use feedsync_core::cache::QueryCache;
use feedsync_core::config::FeedsyncConfig;
use feedsync_core::notification::{Notifier, ViewRefresher};
use feedsync_core::outcome::{FailureReason, ProfileEditOutcome};
use feedsync_core::user::{
    AvatarUploader, OwnerSnapshot, ProfileEditRequest, ProfileRepository, UserId,
    derive_owner_snapshot,
};
use std::sync::Arc;

/// Use case for submitting profile edits.
///
/// # Responsibilities
///
/// - Running the profile write and avatar upload as one logical mutation
/// - Deriving the owner snapshot that cached feed items should embed
/// - Patching cached feed listings in place instead of refetching them
/// - Notifying the user exactly once and requesting a backstop refresh
///
/// A failed profile write leaves the cache untouched. A failed avatar upload
/// still reconciles the new fields with the previous avatar. A failed cache
/// patch is logged and otherwise ignored, since the source of truth was
/// already updated and the refresh request covers the stale views.
pub struct ProfileEditUseCase {
    orchestrator: MutationOrchestrator,
    cache_reconciler: CacheReconciler,
    reporter: OutcomeReporter,
}

impl ProfileEditUseCase {
    /// Creates a new `ProfileEditUseCase` instance.
    ///
    /// # Arguments
    ///
    /// * `profile_repository` - Persists profile fields
    /// * `avatar_uploader` - Uploads replacement avatars
    /// * `cache` - Store holding the cached feed listings
    /// * `notifier` - Side channel for user-facing messages
    /// * `refresher` - Requests a coarse refresh of the current view
    /// * `config` - Topics to reconcile and notification texts
    pub fn new(
        profile_repository: Arc<dyn ProfileRepository>,
        avatar_uploader: Arc<dyn AvatarUploader>,
        cache: Arc<dyn QueryCache>,
        notifier: Arc<dyn Notifier>,
        refresher: Arc<dyn ViewRefresher>,
        config: &FeedsyncConfig,
    ) -> Self {
        Self {
            orchestrator: MutationOrchestrator::new(profile_repository, avatar_uploader),
            cache_reconciler: CacheReconciler::new(cache, config.reconcile.topics.clone()),
            reporter: OutcomeReporter::new(
                notifier,
                refresher,
                config.messages.clone(),
                config.reconcile.refresh_after_partial_failure,
            ),
        }
    }

    /// Submits a profile edit and returns its outcome.
    ///
    /// The request is consumed; a new submission needs a new request.
    pub async fn submit_profile_edit(&self, request: ProfileEditRequest) -> ProfileEditOutcome {
        tracing::info!(
            "[ProfileEditUseCase] Submitting profile edit (avatar: {})",
            request.has_avatar()
        );

        let (outcome, cache_reconciled) = match self.orchestrator.run(&request).await {
            MutationOutcome::Completed { updated, upload } => {
                let owner_snapshot = derive_owner_snapshot(&updated, upload.as_ref());
                let reconciled = self.reconcile(&updated.id, &owner_snapshot).await;
                (ProfileEditOutcome::Success { owner_snapshot }, reconciled)
            }
            MutationOutcome::UploadFailed { updated, error } => {
                tracing::warn!(
                    "[ProfileEditUseCase] Reconciling fields only for {}, avatar kept: {}",
                    updated.id,
                    error
                );
                let owner_snapshot = derive_owner_snapshot(&updated, None);
                let reconciled = self.reconcile(&updated.id, &owner_snapshot).await;
                (
                    ProfileEditOutcome::PartialFailure {
                        owner_snapshot,
                        reason: FailureReason::AvatarUpload,
                    },
                    reconciled,
                )
            }
            MutationOutcome::ProfileFailed { error } => {
                tracing::error!("[ProfileEditUseCase] Profile edit failed: {}", error);
                (
                    ProfileEditOutcome::Failure {
                        reason: FailureReason::ProfilePersistence,
                    },
                    true,
                )
            }
        };

        self.reporter.report(&outcome, cache_reconciled);
        outcome
    }

    /// Returns false when the patch failed and only a refresh can fix the views.
    async fn reconcile(&self, user_id: &UserId, owner_snapshot: &OwnerSnapshot) -> bool {
        match self.cache_reconciler.reconcile(user_id, owner_snapshot).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(
                    "[ProfileEditUseCase] Cache reconciliation failed, relying on refresh: {}",
                    e
                );
                false
            }
        }
    }
}
