//! Domain types shared by every connector.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform tag carried by every record produced by the PC connectors.
pub const PC_PLATFORM: &str = "PC";

/// Static description of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// Stable identifier, used as `GameRecord::source`.
    pub id: &'static str,
    /// Human-readable launcher name.
    pub name: &'static str,
}

impl Platform {
    /// Returns the notification key for this platform's import error.
    ///
    /// The key is stable across runs so a new failure replaces the
    /// previous notification instead of stacking a second one.
    pub fn notification_id(&self) -> String {
        format!("{}_libImportError", self.name)
    }
}

/// Canonical per-platform game identifier. This is the join key between
/// the local scan and the account query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for GameId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for GameId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// How a launch action is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    /// Handed to the OS URL handler (e.g. `steam://rungameid/440`).
    Url,
    /// Executable started directly.
    File,
}

/// A launch descriptor attached to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameAction {
    pub name: String,
    pub kind: ActionKind,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
}

impl GameAction {
    /// Creates a "Play" action that opens a launcher URL.
    pub fn play_url(url: impl Into<String>) -> Self {
        Self {
            name: "Play".into(),
            kind: ActionKind::Url,
            path: url.into(),
            arguments: None,
            working_dir: None,
        }
    }
}

/// One observed occurrence of a game, local or remote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub source: String,
    pub game_id: GameId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_directory: Option<PathBuf>,
    pub is_installed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_action: Option<GameAction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub other_actions: Vec<GameAction>,
    /// Only the account query carries authoritative playtime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playtime_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub developers: Vec<String>,
    pub platform: String,
}

impl GameRecord {
    /// Creates a record for a game found on disk.
    pub fn installed(
        source: &str,
        game_id: impl Into<GameId>,
        name: impl Into<String>,
        install_directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source: source.to_string(),
            game_id: game_id.into(),
            name: name.into(),
            install_directory: Some(install_directory.into()),
            is_installed: true,
            play_action: None,
            other_actions: Vec::new(),
            playtime_seconds: None,
            last_activity: None,
            developers: Vec::new(),
            platform: PC_PLATFORM.to_string(),
        }
    }

    /// Creates a record for a game owned by the account but not installed.
    pub fn owned(source: &str, game_id: impl Into<GameId>, name: impl Into<String>) -> Self {
        Self {
            source: source.to_string(),
            game_id: game_id.into(),
            name: name.into(),
            install_directory: None,
            is_installed: false,
            play_action: None,
            other_actions: Vec::new(),
            playtime_seconds: None,
            last_activity: None,
            developers: Vec::new(),
            platform: PC_PLATFORM.to_string(),
        }
    }

    pub fn with_play_action(mut self, action: GameAction) -> Self {
        self.play_action = Some(action);
        self
    }

    pub fn with_other_actions(mut self, actions: Vec<GameAction>) -> Self {
        self.other_actions = actions;
        self
    }

    pub fn with_playtime(mut self, seconds: u64) -> Self {
        self.playtime_seconds = Some(seconds);
        self
    }

    pub fn with_last_activity(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.last_activity = at;
        self
    }

    pub fn with_developers(mut self, developers: Vec<String>) -> Self {
        self.developers = developers;
        self
    }

    /// Copies the account-only fields of `remote` onto this record.
    ///
    /// Identity, name, install path and actions stay untouched.
    pub fn enrich_from(&mut self, remote: &GameRecord) {
        self.playtime_seconds = remote.playtime_seconds;
        self.last_activity = remote.last_activity;
    }
}
