//! Fan-out patch of embedded owner snapshots.
//!
//! Every item whose owner matches the target gets its snapshot replaced
//! wholesale. Pages and items without a match are returned as the same `Arc`,
//! and a collection without any match is returned as the same `Arc` too, so
//! the store can skip the write entirely.

use std::sync::Arc;

use crate::feed::model::{FeedItem, FeedPage, PaginatedCollection};
use crate::user::{OwnerSnapshot, UserId};

/// Counts produced by a single patch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchSummary {
    pub pages_patched: usize,
    pub items_patched: usize,
}

impl PatchSummary {
    pub fn is_noop(&self) -> bool {
        self.items_patched == 0
    }
}

/// Replaces the owner snapshot of every item authored by `target`.
///
/// Items already carrying an identical snapshot are left alone, which makes a
/// second pass with the same snapshot a no-op.
pub fn patch_owner_snapshots(
    collection: &Arc<PaginatedCollection>,
    target: &UserId,
    snapshot: &OwnerSnapshot,
) -> (Arc<PaginatedCollection>, PatchSummary) {
    let mut summary = PatchSummary::default();

    let pages: Vec<Arc<FeedPage>> = collection
        .pages
        .iter()
        .map(|page| {
            match patch_page(page, target, snapshot) {
                Some((patched, count)) => {
                    summary.pages_patched += 1;
                    summary.items_patched += count;
                    patched
                }
                None => Arc::clone(page),
            }
        })
        .collect();

    if summary.is_noop() {
        return (Arc::clone(collection), summary);
    }

    let patched = PaginatedCollection {
        pages,
        page_params: collection.page_params.clone(),
    };
    (Arc::new(patched), summary)
}

/// Returns the rewritten page and the number of items replaced, or `None`
/// when nothing on the page needed a change.
fn patch_page(
    page: &Arc<FeedPage>,
    target: &UserId,
    snapshot: &OwnerSnapshot,
) -> Option<(Arc<FeedPage>, usize)> {
    let needs_patch =
        |item: &Arc<FeedItem>| item.owner_id() == Some(target) && item.owner != *snapshot;

    if !page.items.iter().any(|item| needs_patch(item)) {
        return None;
    }

    let mut count = 0;
    let items = page
        .items
        .iter()
        .map(|item| {
            if needs_patch(item) {
                count += 1;
                Arc::new(FeedItem {
                    owner: snapshot.clone(),
                    ..FeedItem::clone(item)
                })
            } else {
                Arc::clone(item)
            }
        })
        .collect();

    let patched = FeedPage {
        items,
        next_cursor: page.next_cursor.clone(),
    };
    Some((Arc::new(patched), count))
}
