//! In-memory paginated query cache.
//!
//! Entries are keyed by [`QueryKey`] and hold the last successfully fetched
//! collection. Each fetch is tracked by a generation number and a
//! cancellation token; only the fetch that currently owns an entry may write
//! to it, so a fetch cancelled before a reconciliation patch can never land
//! on top of that patch.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feedsync_core::cache::{CollectionTransform, QueryCache, QueryKey, SwapStatus, TopicPattern};
use feedsync_core::error::{FeedsyncError, Result};
use feedsync_core::feed::PaginatedCollection;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Whether an entry has a fetch in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Fetching,
}

/// Handle returned by [`InMemoryQueryCache::begin_fetch`].
///
/// Completing the fetch hands the ticket back to the cache, which accepts the
/// data only while the ticket still owns the entry.
#[derive(Debug)]
pub struct FetchTicket {
    key: QueryKey,
    generation: u64,
    token: CancellationToken,
}

impl FetchTicket {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the fetch has been cancelled or superseded.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}

#[derive(Debug)]
struct InFlightFetch {
    generation: u64,
    token: CancellationToken,
}

#[derive(Debug, Default)]
struct CacheEntry {
    data: Option<Arc<PaginatedCollection>>,
    data_updated_at: Option<DateTime<Utc>>,
    in_flight: Option<InFlightFetch>,
}

impl CacheEntry {
    fn status(&self) -> FetchStatus {
        if self.in_flight.is_some() {
            FetchStatus::Fetching
        } else {
            FetchStatus::Idle
        }
    }

    fn store(&mut self, data: Arc<PaginatedCollection>) {
        self.data = Some(data);
        self.data_updated_at = Some(Utc::now());
    }

    /// Drops the in-flight fetch, if any, and cancels its token. The entry
    /// keeps its last-known-good data.
    fn abandon_fetch(&mut self) -> bool {
        match self.in_flight.take() {
            Some(fetch) => {
                fetch.token.cancel();
                true
            }
            None => false,
        }
    }
}

/// Process-wide cache of paginated feed collections.
#[derive(Debug, Default)]
pub struct InMemoryQueryCache {
    entries: Mutex<HashMap<QueryKey, CacheEntry>>,
    next_generation: AtomicU64,
    closed: AtomicBool,
}

impl InMemoryQueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(FeedsyncError::cache_reconciliation("query cache is closed"));
        }
        Ok(())
    }

    /// Stores `data` for `key` directly, as if a fetch had just completed.
    pub async fn insert(&self, key: QueryKey, data: PaginatedCollection) {
        let mut entries = self.entries.lock().await;
        entries.entry(key).or_default().store(Arc::new(data));
    }

    /// Registers `key` without data, like a query that has not fetched yet.
    pub async fn register(&self, key: QueryKey) {
        let mut entries = self.entries.lock().await;
        entries.entry(key).or_default();
    }

    pub async fn get(&self, key: &QueryKey) -> Option<Arc<PaginatedCollection>> {
        let entries = self.entries.lock().await;
        entries.get(key).and_then(|entry| entry.data.clone())
    }

    pub async fn status(&self, key: &QueryKey) -> Option<FetchStatus> {
        let entries = self.entries.lock().await;
        entries.get(key).map(CacheEntry::status)
    }

    pub async fn data_updated_at(&self, key: &QueryKey) -> Option<DateTime<Utc>> {
        let entries = self.entries.lock().await;
        entries.get(key).and_then(|entry| entry.data_updated_at)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Rejects every further store operation.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Starts a fetch for `key`, superseding any fetch already in flight.
    pub async fn begin_fetch(&self, key: QueryKey) -> Result<FetchTicket> {
        self.ensure_open()?;
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();

        let mut entries = self.entries.lock().await;
        let entry = entries.entry(key.clone()).or_default();
        if entry.abandon_fetch() {
            tracing::debug!("[InMemoryQueryCache] Superseded in-flight fetch for {}", key);
        }
        entry.in_flight = Some(InFlightFetch {
            generation,
            token: token.clone(),
        });

        Ok(FetchTicket {
            key,
            generation,
            token,
        })
    }

    /// Completes a fetch. Returns `false` when the ticket no longer owns the
    /// entry and the data was discarded.
    pub async fn complete_fetch(
        &self,
        ticket: FetchTicket,
        data: PaginatedCollection,
    ) -> Result<bool> {
        self.ensure_open()?;
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get_mut(&ticket.key) else {
            return Ok(false);
        };

        let owns_entry = entry
            .in_flight
            .as_ref()
            .is_some_and(|fetch| fetch.generation == ticket.generation);
        if !owns_entry {
            tracing::debug!(
                "[InMemoryQueryCache] Discarding stale fetch result for {}",
                ticket.key
            );
            return Ok(false);
        }

        entry.in_flight = None;
        entry.store(Arc::new(data));
        Ok(true)
    }

    /// Ends a failed fetch, keeping the entry's last-known-good data.
    pub async fn fail_fetch(&self, ticket: FetchTicket) {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get_mut(&ticket.key)
            && entry
                .in_flight
                .as_ref()
                .is_some_and(|fetch| fetch.generation == ticket.generation)
        {
            entry.in_flight = None;
        }
    }

    /// Drives `fetch` for `key` and stores its result.
    ///
    /// The fetch future is dropped as soon as the fetch is cancelled. Returns
    /// whether the result was stored.
    pub async fn fetch_with<F>(&self, key: QueryKey, fetch: F) -> Result<bool>
    where
        F: Future<Output = Result<PaginatedCollection>>,
    {
        let ticket = self.begin_fetch(key).await?;

        let result = tokio::select! {
            _ = ticket.cancelled() => None,
            result = fetch => Some(result),
        };

        match result {
            None => {
                tracing::debug!("[InMemoryQueryCache] Fetch for {} was cancelled", ticket.key);
                Ok(false)
            }
            Some(Ok(data)) => self.complete_fetch(ticket, data).await,
            Some(Err(e)) => {
                self.fail_fetch(ticket).await;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl QueryCache for InMemoryQueryCache {
    async fn find_entries(&self, topic: &TopicPattern) -> Result<Vec<QueryKey>> {
        self.ensure_open()?;
        let entries = self.entries.lock().await;
        let mut keys: Vec<QueryKey> = entries
            .keys()
            .filter(|key| topic.matches(key))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn cancel_in_flight(&self, key: &QueryKey) -> Result<()> {
        self.ensure_open()?;
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get_mut(key)
            && entry.abandon_fetch()
        {
            tracing::debug!("[InMemoryQueryCache] Cancelled in-flight fetch for {}", key);
        }
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        key: &QueryKey,
        transform: &CollectionTransform<'_>,
    ) -> Result<SwapStatus> {
        self.ensure_open()?;
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get_mut(key) else {
            return Ok(SwapStatus::NoData);
        };
        let Some(current) = entry.data.clone() else {
            return Ok(SwapStatus::NoData);
        };

        let next = transform(&current);
        if Arc::ptr_eq(&current, &next) {
            return Ok(SwapStatus::Unchanged);
        }
        entry.store(next);
        Ok(SwapStatus::Replaced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedsync_core::feed::{FeedItem, FeedPage, patch_owner_snapshots};
    use feedsync_core::user::{OwnerSnapshot, UserId};

    fn owner(bio: &str) -> OwnerSnapshot {
        OwnerSnapshot {
            id: UserId::new("u1"),
            username: "alice".to_string(),
            display_name: "Alice".to_string(),
            bio: bio.to_string(),
            avatar_url: Some("old.png".to_string()),
        }
    }

    fn collection(bio: &str) -> PaginatedCollection {
        let mut collection = PaginatedCollection::new();
        collection.push_page(
            None,
            FeedPage::new(
                vec![FeedItem {
                    id: "p1".to_string(),
                    content: "hello".to_string(),
                    created_at: Utc::now(),
                    owner: owner(bio),
                }],
                None,
            ),
        );
        collection
    }

    fn feed_key() -> QueryKey {
        QueryKey::new(["post-feed", "for-you"])
    }

    fn patch_to(
        bio: &'static str,
    ) -> impl Fn(&Arc<PaginatedCollection>) -> Arc<PaginatedCollection> + Send + Sync {
        move |collection: &Arc<PaginatedCollection>| {
            patch_owner_snapshots(collection, &UserId::new("u1"), &owner(bio)).0
        }
    }

    fn first_bio(collection: &PaginatedCollection) -> String {
        collection.pages[0].items[0].owner.bio.clone()
    }

    #[tokio::test]
    async fn test_find_entries_by_prefix() {
        let cache = InMemoryQueryCache::new();
        cache.insert(feed_key(), collection("a")).await;
        cache.register(QueryKey::new(["post-feed", "following"])).await;
        cache.insert(QueryKey::new(["bookmarks"]), collection("a")).await;

        let keys = cache
            .find_entries(&TopicPattern::prefix(QueryKey::new(["post-feed"])))
            .await
            .unwrap();

        assert_eq!(
            keys,
            vec![QueryKey::new(["post-feed", "following"]), feed_key()]
        );
    }

    #[tokio::test]
    async fn test_compare_and_swap_statuses() {
        let cache = InMemoryQueryCache::new();
        cache.insert(feed_key(), collection("old")).await;
        cache.register(QueryKey::new(["post-feed", "empty"])).await;

        let status = cache.compare_and_swap(&feed_key(), &patch_to("new")).await.unwrap();
        assert_eq!(status, SwapStatus::Replaced);
        assert_eq!(first_bio(&cache.get(&feed_key()).await.unwrap()), "new");

        let status = cache.compare_and_swap(&feed_key(), &patch_to("new")).await.unwrap();
        assert_eq!(status, SwapStatus::Unchanged);

        let status = cache
            .compare_and_swap(&QueryKey::new(["post-feed", "empty"]), &patch_to("new"))
            .await
            .unwrap();
        assert_eq!(status, SwapStatus::NoData);

        let status = cache
            .compare_and_swap(&QueryKey::new(["missing"]), &patch_to("new"))
            .await
            .unwrap();
        assert_eq!(status, SwapStatus::NoData);
    }

    #[tokio::test]
    async fn test_compare_and_swap_with_borrowing_transform() {
        let cache = InMemoryQueryCache::new();
        cache.insert(feed_key(), collection("old")).await;

        let target = UserId::new("u1");
        let snapshot = owner("borrowed");
        let calls = std::sync::atomic::AtomicUsize::new(0);
        let transform = |collection: &Arc<PaginatedCollection>| {
            calls.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            patch_owner_snapshots(collection, &target, &snapshot).0
        };

        let status = cache.compare_and_swap(&feed_key(), &transform).await.unwrap();

        assert_eq!(status, SwapStatus::Replaced);
        assert_eq!(calls.load(std::sync::atomic::Ordering::Relaxed), 1);
        assert_eq!(first_bio(&cache.get(&feed_key()).await.unwrap()), "borrowed");
    }

    #[tokio::test]
    async fn test_fetch_completes_when_not_cancelled() {
        let cache = InMemoryQueryCache::new();
        let ticket = cache.begin_fetch(feed_key()).await.unwrap();
        assert_eq!(ticket.key(), &feed_key());
        assert_eq!(cache.status(&feed_key()).await, Some(FetchStatus::Fetching));

        assert!(cache.complete_fetch(ticket, collection("fetched")).await.unwrap());
        assert_eq!(cache.status(&feed_key()).await, Some(FetchStatus::Idle));
        assert_eq!(first_bio(&cache.get(&feed_key()).await.unwrap()), "fetched");
        assert!(cache.data_updated_at(&feed_key()).await.is_some());
    }

    #[tokio::test]
    async fn test_cancel_resets_to_last_known_good() {
        let cache = InMemoryQueryCache::new();
        cache.insert(feed_key(), collection("good")).await;
        let ticket = cache.begin_fetch(feed_key()).await.unwrap();

        cache.cancel_in_flight(&feed_key()).await.unwrap();

        assert!(ticket.is_cancelled());
        assert_eq!(cache.status(&feed_key()).await, Some(FetchStatus::Idle));
        assert_eq!(first_bio(&cache.get(&feed_key()).await.unwrap()), "good");
    }

    #[tokio::test]
    async fn test_late_fetch_after_cancel_does_not_overwrite_patch() {
        let cache = InMemoryQueryCache::new();
        cache.insert(feed_key(), collection("old")).await;
        let ticket = cache.begin_fetch(feed_key()).await.unwrap();

        cache.cancel_in_flight(&feed_key()).await.unwrap();
        cache.compare_and_swap(&feed_key(), &patch_to("new")).await.unwrap();

        // Stale pre-mutation data resolves after the patch
        let stored = cache.complete_fetch(ticket, collection("old")).await.unwrap();

        assert!(!stored);
        assert_eq!(first_bio(&cache.get(&feed_key()).await.unwrap()), "new");
    }

    #[tokio::test]
    async fn test_newer_fetch_supersedes_older() {
        let cache = InMemoryQueryCache::new();
        let first = cache.begin_fetch(feed_key()).await.unwrap();
        let second = cache.begin_fetch(feed_key()).await.unwrap();

        assert!(first.is_cancelled());
        assert!(!cache.complete_fetch(first, collection("first")).await.unwrap());
        assert!(cache.complete_fetch(second, collection("second")).await.unwrap());
        assert_eq!(first_bio(&cache.get(&feed_key()).await.unwrap()), "second");
    }

    #[tokio::test]
    async fn test_fetch_with_stops_on_cancellation() {
        let cache = Arc::new(InMemoryQueryCache::new());
        cache.insert(feed_key(), collection("old")).await;
        let (release, gate) = tokio::sync::oneshot::channel::<()>();

        let fetching = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .fetch_with(feed_key(), async move {
                        let _ = gate.await;
                        Ok(collection("stale"))
                    })
                    .await
            })
        };

        while cache.status(&feed_key()).await != Some(FetchStatus::Fetching) {
            tokio::task::yield_now().await;
        }
        cache.cancel_in_flight(&feed_key()).await.unwrap();
        cache.compare_and_swap(&feed_key(), &patch_to("new")).await.unwrap();
        let _ = release.send(());

        assert!(!fetching.await.unwrap().unwrap());
        assert_eq!(first_bio(&cache.get(&feed_key()).await.unwrap()), "new");
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_data() {
        let cache = InMemoryQueryCache::new();
        cache.insert(feed_key(), collection("good")).await;

        let result = cache
            .fetch_with(feed_key(), async { Err(FeedsyncError::io("connection reset")) })
            .await;

        assert!(result.is_err());
        assert_eq!(cache.status(&feed_key()).await, Some(FetchStatus::Idle));
        assert_eq!(first_bio(&cache.get(&feed_key()).await.unwrap()), "good");
    }

    #[tokio::test]
    async fn test_closed_cache_rejects_operations() {
        let cache = InMemoryQueryCache::new();
        cache.insert(feed_key(), collection("old")).await;
        cache.close();

        let err = cache.cancel_in_flight(&feed_key()).await.unwrap_err();
        assert!(err.is_cache_reconciliation());
        assert!(cache.compare_and_swap(&feed_key(), &patch_to("new")).await.is_err());
    }
}
