//! Projection of an updated owner snapshot into cached feed collections.
//!
//! Reconciliation runs in two phases. Every matched entry first has its
//! in-flight fetch cancelled, and only once all cancellations have settled are
//! the entries patched. A fetch resolving after the patch would otherwise
//! overwrite it with pre-mutation data.

use feedsync_core::cache::{QueryCache, QueryKey, SwapStatus, TopicPattern};
use feedsync_core::error::Result;
use feedsync_core::feed::{PaginatedCollection, patch_owner_snapshots};
use feedsync_core::user::{OwnerSnapshot, UserId};
use futures::future::try_join_all;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts from one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Entries matched by any configured topic
    pub entries_matched: usize,
    /// Entries whose value was replaced
    pub entries_patched: usize,
    /// Embedded snapshots replaced across all entries
    pub items_patched: usize,
}

pub struct CacheReconciler {
    cache: Arc<dyn QueryCache>,
    topics: Vec<TopicPattern>,
}

impl CacheReconciler {
    pub fn new(cache: Arc<dyn QueryCache>, topics: Vec<TopicPattern>) -> Self {
        Self { cache, topics }
    }

    /// Rewrites every embedded snapshot owned by `target` in the matched
    /// entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails to list, cancel or update an
    /// entry. Entries patched before the failure keep their new value.
    pub async fn reconcile(
        &self,
        target: &UserId,
        snapshot: &OwnerSnapshot,
    ) -> Result<ReconcileReport> {
        let keys = self.matched_keys().await?;
        let mut report = ReconcileReport {
            entries_matched: keys.len(),
            ..ReconcileReport::default()
        };

        if keys.is_empty() {
            tracing::debug!("[CacheReconciler] No cache entries matched, nothing to patch");
            return Ok(report);
        }

        // Phase 1: every cancellation settles before any patch is applied.
        try_join_all(keys.iter().map(|key| self.cache.cancel_in_flight(key))).await?;
        tracing::debug!(
            "[CacheReconciler] Cancelled in-flight fetches for {} entries",
            keys.len()
        );

        // Phase 2: patch through the store's atomic update.
        for key in &keys {
            let items_patched = AtomicUsize::new(0);
            let transform = |collection: &Arc<PaginatedCollection>| {
                let (patched, summary) = patch_owner_snapshots(collection, target, snapshot);
                items_patched.store(summary.items_patched, Ordering::Relaxed);
                patched
            };

            match self.cache.compare_and_swap(key, &transform).await? {
                SwapStatus::Replaced => {
                    let count = items_patched.load(Ordering::Relaxed);
                    tracing::debug!("[CacheReconciler] Patched {} items in {}", count, key);
                    report.entries_patched += 1;
                    report.items_patched += count;
                }
                SwapStatus::Unchanged => {
                    tracing::debug!("[CacheReconciler] No items owned by {} in {}", target, key);
                }
                SwapStatus::NoData => {
                    tracing::debug!("[CacheReconciler] Entry {} holds no data, skipped", key);
                }
            }
        }

        tracing::info!(
            "[CacheReconciler] Reconciled owner {}: {} of {} entries patched, {} items",
            target,
            report.entries_patched,
            report.entries_matched,
            report.items_patched
        );

        Ok(report)
    }

    /// Keys matched by any topic, de-duplicated and in key order.
    async fn matched_keys(&self) -> Result<Vec<QueryKey>> {
        let mut keys = BTreeSet::new();
        for topic in &self.topics {
            keys.extend(self.cache.find_entries(topic).await?);
        }
        Ok(keys.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use feedsync_core::cache::CollectionTransform;
    use feedsync_core::error::FeedsyncError;
    use feedsync_core::feed::{FeedItem, FeedPage};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Cancel(QueryKey),
        Swap(QueryKey),
    }

    // Mock QueryCache recording the order of store calls
    #[derive(Default)]
    struct RecordingCache {
        entries: Mutex<HashMap<QueryKey, Option<Arc<PaginatedCollection>>>>,
        calls: Mutex<Vec<Call>>,
        fail_swap: bool,
    }

    impl RecordingCache {
        fn with_entry(self, key: QueryKey, data: Option<PaginatedCollection>) -> Self {
            self.entries
                .lock()
                .unwrap()
                .insert(key, data.map(Arc::new));
            self
        }

        fn get(&self, key: &QueryKey) -> Option<Arc<PaginatedCollection>> {
            self.entries.lock().unwrap().get(key).cloned().flatten()
        }
    }

    #[async_trait]
    impl QueryCache for RecordingCache {
        async fn find_entries(&self, topic: &TopicPattern) -> Result<Vec<QueryKey>> {
            let entries = self.entries.lock().unwrap();
            Ok(entries.keys().filter(|key| topic.matches(key)).cloned().collect())
        }

        async fn cancel_in_flight(&self, key: &QueryKey) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Cancel(key.clone()));
            Ok(())
        }

        async fn compare_and_swap(
            &self,
            key: &QueryKey,
            transform: &CollectionTransform<'_>,
        ) -> Result<SwapStatus> {
            self.calls.lock().unwrap().push(Call::Swap(key.clone()));
            if self.fail_swap {
                return Err(FeedsyncError::cache_reconciliation("store closed"));
            }
            let mut entries = self.entries.lock().unwrap();
            let Some(Some(current)) = entries.get(key).cloned() else {
                return Ok(SwapStatus::NoData);
            };
            let next = transform(&current);
            if Arc::ptr_eq(&current, &next) {
                return Ok(SwapStatus::Unchanged);
            }
            entries.insert(key.clone(), Some(next));
            Ok(SwapStatus::Replaced)
        }
    }

    fn owner(id: &str, bio: &str, avatar: &str) -> OwnerSnapshot {
        OwnerSnapshot {
            id: UserId::new(id),
            username: id.to_string(),
            display_name: id.to_string(),
            bio: bio.to_string(),
            avatar_url: Some(avatar.to_string()),
        }
    }

    fn collection(owners: &[&str]) -> PaginatedCollection {
        let items = owners
            .iter()
            .enumerate()
            .map(|(i, id)| FeedItem {
                id: format!("p{}", i),
                content: "hello".to_string(),
                created_at: Utc::now(),
                owner: owner(id, "old bio", "old.png"),
            })
            .collect();
        let mut collection = PaginatedCollection::new();
        collection.push_page(None, FeedPage::new(items, None));
        collection
    }

    fn key(segments: &[&str]) -> QueryKey {
        QueryKey::new(segments.iter().copied())
    }

    fn feed_topic() -> Vec<TopicPattern> {
        vec![TopicPattern::prefix(key(&["post-feed"]))]
    }

    #[tokio::test]
    async fn test_all_cancellations_precede_patches() {
        let cache = Arc::new(
            RecordingCache::default()
                .with_entry(key(&["post-feed", "for-you"]), Some(collection(&["u1"])))
                .with_entry(key(&["post-feed", "following"]), Some(collection(&["u1"])))
                .with_entry(key(&["post-feed", "user-posts", "u1"]), Some(collection(&["u1"]))),
        );
        let reconciler = CacheReconciler::new(cache.clone(), feed_topic());

        reconciler
            .reconcile(&UserId::new("u1"), &owner("u1", "new bio", "new.png"))
            .await
            .unwrap();

        let calls = cache.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 6);
        let first_swap = calls
            .iter()
            .position(|call| matches!(call, Call::Swap(_)))
            .unwrap();
        assert_eq!(first_swap, 3);
        assert!(calls[..3].iter().all(|call| matches!(call, Call::Cancel(_))));
    }

    #[tokio::test]
    async fn test_patches_matching_entries_only() {
        let cache = Arc::new(
            RecordingCache::default()
                .with_entry(key(&["post-feed", "for-you"]), Some(collection(&["u1", "u2", "u1"])))
                .with_entry(key(&["bookmarks"]), Some(collection(&["u1"]))),
        );
        let reconciler = CacheReconciler::new(cache.clone(), feed_topic());
        let snapshot = owner("u1", "new bio", "new.png");

        let report = reconciler
            .reconcile(&UserId::new("u1"), &snapshot)
            .await
            .unwrap();

        assert_eq!(
            report,
            ReconcileReport {
                entries_matched: 1,
                entries_patched: 1,
                items_patched: 2,
            }
        );
        let feed = cache.get(&key(&["post-feed", "for-you"])).unwrap();
        assert_eq!(feed.pages[0].items[0].owner, snapshot);
        assert_eq!(feed.pages[0].items[1].owner.bio, "old bio");
        assert_eq!(feed.pages[0].items[2].owner, snapshot);

        let bookmarks = cache.get(&key(&["bookmarks"])).unwrap();
        assert_eq!(bookmarks.pages[0].items[0].owner.bio, "old bio");
    }

    #[tokio::test]
    async fn test_overlapping_topics_patch_each_entry_once() {
        let cache = Arc::new(
            RecordingCache::default()
                .with_entry(key(&["post-feed", "for-you"]), Some(collection(&["u1"]))),
        );
        let topics = vec![
            TopicPattern::prefix(key(&["post-feed"])),
            TopicPattern::exact(key(&["post-feed", "for-you"])),
        ];
        let reconciler = CacheReconciler::new(cache.clone(), topics);

        let report = reconciler
            .reconcile(&UserId::new("u1"), &owner("u1", "new bio", "new.png"))
            .await
            .unwrap();

        assert_eq!(report.entries_matched, 1);
        assert_eq!(cache.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_and_unmatched_entries_are_noops() {
        let cache = Arc::new(
            RecordingCache::default()
                .with_entry(key(&["post-feed", "never-fetched"]), None)
                .with_entry(key(&["post-feed", "other-user"]), Some(collection(&["u2"])))
                .with_entry(key(&["post-feed", "empty"]), Some(PaginatedCollection::new())),
        );
        let before = cache.get(&key(&["post-feed", "other-user"])).unwrap();
        let reconciler = CacheReconciler::new(cache.clone(), feed_topic());

        let report = reconciler
            .reconcile(&UserId::new("u1"), &owner("u1", "new bio", "new.png"))
            .await
            .unwrap();

        assert_eq!(report.entries_matched, 3);
        assert_eq!(report.entries_patched, 0);
        let after = cache.get(&key(&["post-feed", "other-user"])).unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert!(cache.get(&key(&["post-feed", "never-fetched"])).is_none());
    }

    #[tokio::test]
    async fn test_zero_matching_entries_is_ok() {
        let cache = Arc::new(RecordingCache::default());
        let reconciler = CacheReconciler::new(cache.clone(), feed_topic());

        let report = reconciler
            .reconcile(&UserId::new("u1"), &owner("u1", "new bio", "new.png"))
            .await
            .unwrap();

        assert_eq!(report, ReconcileReport::default());
        assert!(cache.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reconcile_twice_is_idempotent() {
        let cache = Arc::new(
            RecordingCache::default()
                .with_entry(key(&["post-feed", "for-you"]), Some(collection(&["u1", "u2"]))),
        );
        let reconciler = CacheReconciler::new(cache.clone(), feed_topic());
        let snapshot = owner("u1", "new bio", "new.png");

        reconciler.reconcile(&UserId::new("u1"), &snapshot).await.unwrap();
        let once = cache.get(&key(&["post-feed", "for-you"])).unwrap();
        let report = reconciler.reconcile(&UserId::new("u1"), &snapshot).await.unwrap();
        let twice = cache.get(&key(&["post-feed", "for-you"])).unwrap();

        assert_eq!(report.entries_patched, 0);
        assert!(Arc::ptr_eq(&once, &twice));
    }

    #[tokio::test]
    async fn test_store_failure_is_reported() {
        let cache = RecordingCache {
            fail_swap: true,
            ..RecordingCache::default()
        }
        .with_entry(key(&["post-feed", "for-you"]), Some(collection(&["u1"])));
        let reconciler = CacheReconciler::new(Arc::new(cache), feed_topic());

        let err = reconciler
            .reconcile(&UserId::new("u1"), &owner("u1", "new bio", "new.png"))
            .await
            .unwrap_err();

        assert!(err.is_cache_reconciliation());
    }
}
