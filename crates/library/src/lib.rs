//! Game library reconciliation.
//!
//! Every launcher connector produces two imperfect views of a user's
//! library: a **local scan** of what the launcher left on disk and a
//! **remote query** of what the account owns. This crate merges both views
//! into one deduplicated catalog and owns the failure policy around them.
//! Connectors only supply the two adapters; the merge, the fault
//! containment and the error notification live here once.
//!
//! # Pipeline
//!
//! 1. **Local scan**: `LocalInstallAdapter::scan_installed` (if enabled)
//! 2. **Remote fetch**: `RemoteAccountAdapter::fetch_owned` (if enabled and authenticated)
//! 3. **Filter**: drop account-only titles unless uninstalled games are wanted
//! 4. **Merge**: enrich installed records with playtime/last activity, append the rest
//! 5. **Notify**: upsert or clear the per-platform import error

pub mod adapter;
pub mod catalog;
pub mod config;
pub mod error;
pub mod importer;
pub mod normalize;
pub mod notify;
pub mod reconcile;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-export primary types for convenience.
pub use adapter::{AuthState, LocalInstallAdapter, RemoteAccountAdapter};
pub use catalog::GameMap;
pub use config::ImportConfig;
pub use error::{AdapterError, FailureKind, ImportError, LibraryError};
pub use importer::{LibraryImporter, RunPhase};
pub use normalize::{IdNormalizer, normalize_name, remove_trademarks};
pub use notify::{Notification, NotificationAction, NotificationLevel, NotificationSink};
pub use reconcile::{ImportOutcome, Reconciler, merge};
pub use types::{ActionKind, GameAction, GameId, GameRecord, PC_PLATFORM, Platform};
