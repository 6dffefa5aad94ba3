//! Cache store trait.
//!
//! The store owns every cached collection. Reconciliation only borrows write
//! access through [`QueryCache::compare_and_swap`], which applies a transform
//! atomically against whatever value the entry holds at that moment.

use async_trait::async_trait;
use std::sync::Arc;

use crate::cache::key::QueryKey;
use crate::cache::topic::TopicPattern;
use crate::error::Result;
use crate::feed::PaginatedCollection;

/// Rewrites a cached collection. Returning the input `Arc` unchanged signals
/// that nothing needs to be stored.
pub type CollectionTransform<'a> =
    dyn Fn(&Arc<PaginatedCollection>) -> Arc<PaginatedCollection> + Send + Sync + 'a;

/// What a compare-and-swap did to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapStatus {
    /// The transform produced a new value and the store holds it now
    Replaced,
    /// The transform returned the same value; nothing was written
    Unchanged,
    /// The entry holds no data (never fetched or evicted); transform not run
    NoData,
}

#[async_trait]
pub trait QueryCache: Send + Sync {
    /// Returns the keys of every entry matching `topic`.
    async fn find_entries(&self, topic: &TopicPattern) -> Result<Vec<QueryKey>>;

    /// Cancels any in-flight fetch for `key` and waits until it has settled.
    ///
    /// After this returns, a fetch started before the call can no longer write
    /// to the entry, and the entry is back on its last-known-good value.
    async fn cancel_in_flight(&self, key: &QueryKey) -> Result<()>;

    /// Applies `transform` to the current value of `key` atomically.
    async fn compare_and_swap(
        &self,
        key: &QueryKey,
        transform: &CollectionTransform<'_>,
    ) -> Result<SwapStatus>;
}
