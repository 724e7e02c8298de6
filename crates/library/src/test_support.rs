//! Mock adapters and sinks shared by the unit tests.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::adapter::{AuthState, LocalInstallAdapter, RemoteAccountAdapter};
use crate::catalog::GameMap;
use crate::config::ImportConfig;
use crate::error::AdapterError;
use crate::notify::{Notification, NotificationSink};
use crate::types::{GameRecord, Platform};

pub const TEST_PLATFORM: Platform = Platform {
    id: "test",
    name: "TestLauncher",
};

pub fn installed(id: &str, name: &str) -> GameRecord {
    GameRecord::installed(TEST_PLATFORM.id, id, name, format!("/games/{id}"))
}

pub fn owned(id: &str, name: &str, playtime: u64) -> GameRecord {
    GameRecord::owned(TEST_PLATFORM.id, id, name).with_playtime(playtime)
}

/// Local adapter returning a canned result and counting calls.
pub struct MockLocal {
    result: Mutex<Option<Result<Vec<GameRecord>, AdapterError>>>,
    records: Vec<GameRecord>,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl MockLocal {
    pub fn ok(records: Vec<GameRecord>) -> Self {
        Self {
            result: Mutex::new(None),
            records,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(err: AdapterError) -> Self {
        Self {
            result: Mutex::new(Some(Err(err))),
            records: Vec::new(),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LocalInstallAdapter for MockLocal {
    fn scan_installed<'a>(
        &'a self,
        _config: &'a ImportConfig,
    ) -> Pin<Box<dyn Future<Output = Result<GameMap, AdapterError>> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            // A queued error is returned once; later calls succeed.
            if let Some(Err(e)) = self.result.lock().unwrap().take() {
                return Err(e);
            }
            Ok(self.records.iter().cloned().collect::<GameMap>())
        })
    }
}

/// Remote adapter with a fixed auth state and a canned owned list.
pub struct MockRemote {
    auth: AuthState,
    records: Vec<GameRecord>,
    error: Mutex<Option<AdapterError>>,
    delay: Option<Duration>,
    pub fetches: AtomicUsize,
}

impl MockRemote {
    pub fn ok(records: Vec<GameRecord>) -> Self {
        Self {
            auth: AuthState::Authenticated,
            records,
            error: Mutex::new(None),
            delay: None,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn with_auth(auth: AuthState) -> Self {
        Self {
            auth,
            ..Self::ok(Vec::new())
        }
    }

    pub fn failing(err: AdapterError) -> Self {
        Self {
            error: Mutex::new(Some(err)),
            ..Self::ok(Vec::new())
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl RemoteAccountAdapter for MockRemote {
    fn auth_state(&self) -> Pin<Box<dyn Future<Output = AuthState> + Send + '_>> {
        Box::pin(async move { self.auth.clone() })
    }

    fn fetch_owned(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<GameRecord>, AdapterError>> + Send + '_>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(e) = self.error.lock().unwrap().take() {
                return Err(e);
            }
            Ok::<_, AdapterError>(self.records.clone())
        })
    }
}

/// Records every sink call in order.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<SinkEvent>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Upsert(Notification),
    Clear(String),
}

impl RecordingSink {
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn upsert(&self, notification: Notification) {
        self.events
            .lock()
            .unwrap()
            .push(SinkEvent::Upsert(notification));
    }

    fn clear(&self, id: &str) {
        self.events
            .lock()
            .unwrap()
            .push(SinkEvent::Clear(id.to_string()));
    }
}
