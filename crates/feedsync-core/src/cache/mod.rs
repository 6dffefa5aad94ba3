//! Query cache module.
//!
//! # Module Structure
//!
//! - `key`: Hierarchical query keys
//! - `topic`: Exact / prefix patterns addressing families of keys
//! - `store`: The cache store trait consumed during reconciliation

mod key;
mod store;
mod topic;

pub use key::QueryKey;
pub use store::{CollectionTransform, QueryCache, SwapStatus};
pub use topic::TopicPattern;
