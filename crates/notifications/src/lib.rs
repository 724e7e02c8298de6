//! Notification center for import runs.
//!
//! Holds the keyed notifications raised by the importers. Upserting a
//! notification with an existing id replaces it in place; clearing by id
//! removes it. The store can be saved to and restored from a JSON file so a
//! stale import error survives a restart until the next clean run clears it.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use gamedock_library::{Notification, NotificationLevel, NotificationSink};

/// Errors from loading or saving the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid notification file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Thread-safe, insertion-ordered notification store.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    items: Mutex<Vec<Notification>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a store saved by [`save`](Self::save).
    ///
    /// A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)?;
        let items: Vec<Notification> = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), count = items.len(), "notifications loaded");
        Ok(Self {
            items: Mutex::new(items),
        })
    }

    /// Writes all current notifications to `path`, creating parent dirs.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&*self.lock())?;
        std::fs::write(path, content)?;
        tracing::debug!(path = %path.display(), "notifications saved");
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Notification> {
        self.lock().iter().find(|n| n.id == id).cloned()
    }

    /// Snapshot of all notifications in insertion order.
    pub fn list(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    /// Notifications at `level`.
    pub fn by_level(&self, level: NotificationLevel) -> Vec<Notification> {
        self.lock()
            .iter()
            .filter(|n| n.level == level)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Removes the notification with `id`. Returns whether one existed.
    pub fn remove(&self, id: &str) -> bool {
        let mut items = self.lock();
        let before = items.len();
        items.retain(|n| n.id != id);
        items.len() != before
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NotificationSink for NotificationCenter {
    fn upsert(&self, notification: Notification) {
        let mut items = self.lock();
        match items.iter_mut().find(|n| n.id == notification.id) {
            Some(existing) => *existing = notification,
            None => items.push(notification),
        }
    }

    fn clear(&self, id: &str) {
        if self.remove(id) {
            tracing::debug!(id, "notification cleared");
        }
    }
}
