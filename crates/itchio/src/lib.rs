//! itch.io connector.
//!
//! The itch app keeps its state in butler's SQLite database. Installed
//! games are its caves; owned games are the download keys of each logged
//! in profile. Only the `game` and `tool` classifications are imported.

pub mod butler;
pub mod local;
pub mod manifest;
pub mod remote;

use std::path::PathBuf;

use gamedock_library::{AdapterError, Platform};

// Re-export primary types.
pub use butler::{ButlerDb, Cave, ItchGame};
pub use local::ItchLocalScanner;
pub use remote::ItchAccount;

/// The itch.io connector.
pub const ITCHIO: Platform = Platform {
    id: "itchio",
    name: "itch.io",
};

/// Errors for itch.io operations.
#[derive(Debug, thiserror::Error)]
pub enum ItchError {
    #[error("itch.io app data not found")]
    NotInstalled,

    #[error("User is not authenticated.")]
    NotLoggedIn,

    #[error("butler database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid launch manifest: {0}")]
    Manifest(#[from] toml::de::Error),
}

impl From<ItchError> for AdapterError {
    fn from(e: ItchError) -> Self {
        match e {
            ItchError::NotInstalled => AdapterError::ClientNotInstalled(ITCHIO.name.into()),
            e @ ItchError::NotLoggedIn => AdapterError::NotAuthenticated(e.to_string()),
            e @ ItchError::Database(_) => AdapterError::Other(e.to_string()),
            ItchError::Io(e) => AdapterError::Io(e),
            ItchError::Manifest(e) => AdapterError::Parse(e.to_string()),
        }
    }
}

/// Default itch app data directory.
pub fn default_app_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("itch"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(|h| PathBuf::from(h).join("Library/Application Support/itch"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
            .map(|config| config.join("itch"))
    }
}

/// Launch URL handled by the itch app.
pub fn launch_url(cave_id: &str) -> String {
    format!("itch://caves/{cave_id}/launch")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_app_is_client_not_installed() {
        let err: AdapterError = ItchError::NotInstalled.into();
        assert_eq!(err.to_string(), "itch.io client is not installed");
    }

    #[test]
    fn not_logged_in_keeps_message() {
        let err: AdapterError = ItchError::NotLoggedIn.into();
        assert_eq!(err.to_string(), "user is not authenticated: User is not authenticated.");
    }

    #[test]
    fn launch_url_format() {
        assert_eq!(launch_url("a1b2"), "itch://caves/a1b2/launch");
    }
}
