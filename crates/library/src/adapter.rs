//! Adapter traits implemented by each connector.
//!
//! A connector supplies one local and one remote adapter. Both stay free of
//! merge logic: they extract records, dedup them by id, and report failures.

use std::future::Future;
use std::pin::Pin;

use crate::catalog::GameMap;
use crate::config::ImportConfig;
use crate::error::AdapterError;
use crate::types::GameRecord;

/// Scans the machine for games installed by the launcher client.
///
/// The returned map must already be deduplicated by `GameId`
/// (first-seen wins when several installs map to one title).
pub trait LocalInstallAdapter: Send + Sync {
    fn scan_installed<'a>(
        &'a self,
        config: &'a ImportConfig,
    ) -> Pin<Box<dyn Future<Output = Result<GameMap, AdapterError>> + Send + 'a>>;
}

/// Whether the account behind a remote adapter can be queried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Authenticated,
    /// No session, missing credentials or an expired token.
    NotAuthenticated(String),
    /// The session could not be checked right now (network, service down).
    TransientFailure(String),
}

/// Queries the launcher's web service for account-owned games.
pub trait RemoteAccountAdapter: Send + Sync {
    /// Checks for a usable session without fetching the library.
    fn auth_state(&self) -> Pin<Box<dyn Future<Output = AuthState> + Send + '_>>;

    /// Fetches owned games. Ids must be unique and in canonical form.
    fn fetch_owned(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<GameRecord>, AdapterError>> + Send + '_>>;
}
