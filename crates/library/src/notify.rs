//! User-facing notifications raised by import runs.

use serde::{Deserialize, Serialize};

use crate::error::ImportError;
use crate::types::Platform;

/// Visual category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// What activating the notification does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum NotificationAction {
    /// Opens the settings view of the given connector.
    #[serde(rename_all = "camelCase")]
    OpenSettings { platform_id: String },
}

/// A keyed notification. Upserting with an existing id replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub level: NotificationLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<NotificationAction>,
}

impl Notification {
    /// Builds the import-failure notification for `platform`.
    pub fn import_error(platform: &Platform, error: &ImportError) -> Self {
        Self {
            id: platform.notification_id(),
            level: NotificationLevel::Error,
            message: format!(
                "Failed to import games from {} library.\n{}",
                platform.name,
                error.message()
            ),
            action: Some(NotificationAction::OpenSettings {
                platform_id: platform.id.to_string(),
            }),
        }
    }
}

/// Destination for notifications. Implemented by the host.
pub trait NotificationSink: Send + Sync {
    /// Adds `notification`, replacing any existing one with the same id.
    fn upsert(&self, notification: Notification);

    /// Removes the notification with `id`, if any.
    fn clear(&self, id: &str);
}
