//! Profile edit application services.
//!
//! The use case runs these in order: orchestrator, snapshot derivation,
//! cache reconciler, reporter.

mod cache_reconciler;
mod orchestrator;
mod reporter;

pub use cache_reconciler::{CacheReconciler, ReconcileReport};
pub use orchestrator::{MutationOrchestrator, MutationOutcome};
pub use reporter::OutcomeReporter;
