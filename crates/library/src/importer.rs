//! Per-platform import coordinator.
//!
//! Wraps a [`Reconciler`] with the run state machine, single-flight
//! protection and the notification side effect of each run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::adapter::{LocalInstallAdapter, RemoteAccountAdapter};
use crate::config::ImportConfig;
use crate::error::LibraryError;
use crate::notify::{Notification, NotificationSink};
use crate::reconcile::{ImportOutcome, Reconciler};
use crate::types::Platform;

/// Where an importer is in its current (or last) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RunPhase {
    Idle,
    ScanningLocal,
    ScanningRemote,
    Merging,
    /// Last run finished without an error.
    Clean,
    /// Last run surfaced an error; the notification is up.
    Faulted,
}

/// Runs imports for one platform and reports their failures.
pub struct LibraryImporter<L, R> {
    reconciler: Reconciler<L, R>,
    sink: Arc<dyn NotificationSink>,
    running: AtomicBool,
    phase: Mutex<RunPhase>,
}

/// Clears the running flag when a run ends, including on cancellation.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<L, R> LibraryImporter<L, R>
where
    L: LocalInstallAdapter,
    R: RemoteAccountAdapter,
{
    pub fn new(platform: Platform, local: L, remote: R, sink: Arc<dyn NotificationSink>) -> Self {
        Self::from_reconciler(Reconciler::new(platform, local, remote), sink)
    }

    pub fn from_reconciler(reconciler: Reconciler<L, R>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            reconciler,
            sink,
            running: AtomicBool::new(false),
            phase: Mutex::new(RunPhase::Idle),
        }
    }

    /// Bounds each adapter call of every run.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.reconciler = self.reconciler.with_timeout(timeout);
        self
    }

    pub fn platform(&self) -> Platform {
        self.reconciler.platform()
    }

    pub fn phase(&self) -> RunPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Runs one import.
    ///
    /// The outcome always carries the merged catalog; its error (if any) has
    /// already been turned into the platform notification. A clean run
    /// removes a notification left by an earlier failure.
    pub async fn run(&self, config: &ImportConfig) -> Result<ImportOutcome, LibraryError> {
        let platform = self.platform();
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!(platform = platform.name, "import already running, request rejected");
            return Err(LibraryError::RunInProgress(platform.name.to_string()));
        }
        let _guard = RunGuard(&self.running);

        self.set_phase(RunPhase::Idle);
        let outcome = self
            .reconciler
            .reconcile_observed(config, |phase| self.set_phase(phase))
            .await;

        match &outcome.error {
            Some(error) => {
                self.sink.upsert(Notification::import_error(&platform, error));
                self.set_phase(RunPhase::Faulted);
            }
            None => {
                self.sink.clear(&platform.notification_id());
                self.set_phase(RunPhase::Clean);
            }
        }

        info!(
            platform = platform.name,
            games = outcome.games.len(),
            failed = outcome.error.is_some(),
            "library import finished"
        );
        Ok(outcome)
    }

    fn set_phase(&self, phase: RunPhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase;
    }
}
