//! Application layer for feedsync.
//!
//! This crate provides the profile edit use case, which coordinates the
//! collaborator traits from `feedsync-core` to persist an edit, reconcile it
//! into cached feed pages, and report the outcome.

pub mod profile_edit;
pub mod profile_edit_usecase;

pub use profile_edit_usecase::ProfileEditUseCase;
