//! Infrastructure layer for feedsync.
//!
//! In-memory adapters for the collaborator traits in `feedsync-core`, plus
//! configuration loading and path management.

pub mod avatar_file;
pub mod config_service;
pub mod in_memory_avatar_store;
pub mod in_memory_profile_repository;
pub mod in_memory_query_cache;
pub mod notifier;
pub mod paths;

pub use config_service::ConfigService;
pub use in_memory_avatar_store::InMemoryAvatarStore;
pub use in_memory_profile_repository::InMemoryProfileRepository;
pub use in_memory_query_cache::{FetchStatus, FetchTicket, InMemoryQueryCache};
pub use notifier::{ChannelNotifier, RefreshSignal};
pub use paths::FeedsyncPaths;
