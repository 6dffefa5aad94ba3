//! Feed item and pagination models.
//!
//! Pages and items sit behind `Arc` so that a patch can hand back untouched
//! subtrees by pointer. Callers detecting changes compare with `Arc::ptr_eq`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::user::{OwnerSnapshot, UserId};

/// A single post in a feed listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Author snapshot, duplicated in every item the author wrote
    pub owner: OwnerSnapshot,
}

impl FeedItem {
    /// Returns the author identity, or `None` when it cannot be determined.
    pub fn owner_id(&self) -> Option<&UserId> {
        if self.owner.id.is_blank() {
            None
        } else {
            Some(&self.owner.id)
        }
    }
}

/// One fetched page of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedPage {
    pub items: Vec<Arc<FeedItem>>,
    /// Cursor for the following page, `None` on the last page
    pub next_cursor: Option<String>,
}

impl FeedPage {
    pub fn new(items: Vec<FeedItem>, next_cursor: Option<String>) -> Self {
        Self {
            items: items.into_iter().map(Arc::new).collect(),
            next_cursor,
        }
    }
}

/// Ordered pages of a cached, infinitely scrolled listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginatedCollection {
    pub pages: Vec<Arc<FeedPage>>,
    /// Cursor each page was fetched with, parallel to `pages`
    pub page_params: Vec<Option<String>>,
}

impl PaginatedCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a page fetched with `param`.
    pub fn push_page(&mut self, param: Option<String>, page: FeedPage) {
        self.page_params.push(param);
        self.pages.push(Arc::new(page));
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Iterates over every item across all pages, in order.
    pub fn items(&self) -> impl Iterator<Item = &Arc<FeedItem>> {
        self.pages.iter().flat_map(|page| page.items.iter())
    }

    pub fn item_count(&self) -> usize {
        self.pages.iter().map(|page| page.items.len()).sum()
    }
}
