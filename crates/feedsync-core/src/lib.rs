//! Domain layer for feedsync.
//!
//! Holds the models that flow through a profile edit, the collaborator
//! traits the application layer drives, and the pure functions that project
//! an updated user into cached feed pages.

pub mod cache;
pub mod config;
pub mod error;
pub mod feed;
pub mod notification;
pub mod outcome;
pub mod user;

// Re-export common error type
pub use error::FeedsyncError;
