//! Reconciliation engine: merges the local and remote views of a library.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::adapter::{AuthState, LocalInstallAdapter, RemoteAccountAdapter};
use crate::catalog::GameMap;
use crate::config::ImportConfig;
use crate::error::{AdapterError, FailureKind, ImportError};
use crate::importer::RunPhase;
use crate::types::{GameRecord, Platform};

/// Result of one reconciliation run.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    /// Installed records first (scan order), then account-only records.
    pub games: Vec<GameRecord>,
    /// The surfaced failure of this run, if any.
    pub error: Option<ImportError>,
}

/// Merges the account list into the installed set.
///
/// Installed records keep their identity, name, path and actions; a
/// matching account record contributes only playtime and last activity.
/// Unless `import_uninstalled` is set, account records without an
/// installed counterpart are dropped. Remaining account-only records are
/// appended in their original order; a repeated id is skipped.
pub fn merge(
    config: &ImportConfig,
    installed: GameMap,
    remote: Vec<GameRecord>,
) -> Vec<GameRecord> {
    let mut installed = installed;
    let mut account_only = GameMap::new();

    for record in remote {
        if let Some(existing) = installed.get_mut(&record.game_id) {
            existing.enrich_from(&record);
        } else if config.import_uninstalled {
            account_only.insert_first(record);
        }
    }

    let mut games = installed.into_vec();
    games.extend(account_only.into_vec());
    games
}

/// Runs both adapters of one connector under independent fault containment.
pub struct Reconciler<L, R> {
    platform: Platform,
    local: L,
    remote: R,
    timeout: Option<Duration>,
}

impl<L, R> Reconciler<L, R>
where
    L: LocalInstallAdapter,
    R: RemoteAccountAdapter,
{
    pub fn new(platform: Platform, local: L, remote: R) -> Self {
        Self {
            platform,
            local,
            remote,
            timeout: None,
        }
    }

    /// Bounds each adapter call. An expired call fails its phase only.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Runs local scan, account fetch and merge for `config`.
    pub async fn reconcile(&self, config: &ImportConfig) -> ImportOutcome {
        self.reconcile_observed(config, |_| {}).await
    }

    pub(crate) async fn reconcile_observed(
        &self,
        config: &ImportConfig,
        mut on_phase: impl FnMut(RunPhase) + Send,
    ) -> ImportOutcome {
        let platform = self.platform;
        let mut failure: Option<ImportError> = None;
        let mut installed = GameMap::new();
        let mut remote = Vec::new();

        // The local result must exist before the account list is filtered.
        if config.import_installed {
            on_phase(RunPhase::ScanningLocal);
            match self.bounded(self.local.scan_installed(config)).await {
                Ok(games) => {
                    debug!(platform = platform.name, count = games.len(), "found installed games");
                    installed = games;
                }
                Err(e) => {
                    error!(
                        platform = platform.name,
                        error = %e,
                        "failed to import installed games"
                    );
                    let error = ImportError::new(platform.id, FailureKind::LocalScan, e);
                    record_failure(&mut failure, error);
                }
            }
        }

        if config.connect_account {
            on_phase(RunPhase::ScanningRemote);
            match self.fetch_account().await {
                Ok(games) => {
                    debug!(platform = platform.name, count = games.len(), "found account games");
                    remote = games;
                }
                Err((kind, e)) => {
                    error!(
                        platform = platform.name,
                        kind = %kind,
                        error = %e,
                        "failed to import account games"
                    );
                    record_failure(&mut failure, ImportError::new(platform.id, kind, e));
                }
            }
        }

        on_phase(RunPhase::Merging);
        let games = merge(config, installed, remote);

        ImportOutcome {
            games,
            error: failure,
        }
    }

    async fn fetch_account(&self) -> Result<Vec<GameRecord>, (FailureKind, AdapterError)> {
        let state = self
            .bounded(async { Ok(self.remote.auth_state().await) })
            .await
            .map_err(|e| (FailureKind::RemoteApi, e))?;

        match state {
            AuthState::Authenticated => {}
            AuthState::NotAuthenticated(reason) => {
                return Err((
                    FailureKind::Authentication,
                    AdapterError::NotAuthenticated(reason),
                ));
            }
            AuthState::TransientFailure(reason) => {
                return Err((
                    FailureKind::RemoteApi,
                    AdapterError::Other(format!("could not verify account session: {reason}")),
                ));
            }
        }

        self.bounded(self.remote.fetch_owned())
            .await
            .map_err(|e| match e {
                AdapterError::NotAuthenticated(_) => (FailureKind::Authentication, e),
                other => (FailureKind::RemoteApi, other),
            })
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, AdapterError>>,
    ) -> Result<T, AdapterError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| AdapterError::Timeout(limit))?,
            None => call.await,
        }
    }
}

/// Keeps the last failure as the surfaced one; earlier ones become suppressed.
fn record_failure(slot: &mut Option<ImportError>, next: ImportError) {
    *slot = Some(match slot.take() {
        Some(previous) => {
            warn!(
                platform = %previous.platform_id,
                error = %previous.source,
                "earlier import failure superseded"
            );
            previous.superseded_by(next)
        }
        None => next,
    });
}
