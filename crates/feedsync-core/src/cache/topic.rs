//! Topic patterns.
//!
//! A topic names a group of cache entries that are reconciled together. It
//! is either one exact key or every key under a prefix.

use serde::{Deserialize, Serialize};

use crate::cache::key::QueryKey;

/// Matches cache keys either exactly or by leading segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "match", rename_all = "snake_case")]
pub enum TopicPattern {
    /// Only the given key
    Exact { key: QueryKey },
    /// The given key and every key that extends it
    Prefix { key: QueryKey },
}

impl TopicPattern {
    pub fn exact(key: QueryKey) -> Self {
        Self::Exact { key }
    }

    pub fn prefix(key: QueryKey) -> Self {
        Self::Prefix { key }
    }

    pub fn matches(&self, candidate: &QueryKey) -> bool {
        match self {
            Self::Exact { key } => candidate == key,
            Self::Prefix { key } => candidate.starts_with(key),
        }
    }
}
