//! Feed domain module.
//!
//! Cached feed listings are paginated collections of items, each embedding the
//! author's [`OwnerSnapshot`](crate::user::OwnerSnapshot) by value.

mod model;
mod patch;

pub use model::{FeedItem, FeedPage, PaginatedCollection};
pub use patch::{PatchSummary, patch_owner_snapshots};
