//! Steam connector.
//!
//! Reads what the Steam client leaves on disk (app manifests, library
//! folders, mods, `localconfig.vdf`) and queries the Steam Web API for the
//! account's owned games. [`SteamLocalScanner`] and [`SteamAccount`] are the
//! two adapters handed to the library importer.

pub mod activity;
pub mod api;
pub mod game_id;
pub mod local;
pub mod manifest;
pub mod mods;
pub mod paths;
#[cfg(target_os = "linux")]
pub mod paths_linux;
#[cfg(target_os = "windows")]
pub mod paths_windows;
pub mod remote;
pub mod users;
pub mod vdf;

use gamedock_library::{AdapterError, GameId, IdNormalizer, Platform};

// Re-export primary types.
pub use api::{OwnedGame, WebApiClient};
pub use game_id::SteamGameId;
pub use local::SteamLocalScanner;
pub use paths::Paths;
pub use remote::SteamAccount;
pub use users::{User, get_most_recent_user, get_users_with_paths, steam_id_to_account_id};

/// The Steam connector.
pub const STEAM: Platform = Platform {
    id: "steam",
    name: "Steam",
};

/// Steamworks Common Redistributables; installed alongside games, not a game.
pub const REDIST_APP_ID: u32 = 228980;

/// Errors for Steam operations.
#[derive(Debug, thiserror::Error)]
pub enum SteamError {
    #[error("steam installation not found")]
    NotFound,

    #[error("steam user not found")]
    UserNotFound,

    #[error("VDF parse error: {0}")]
    Vdf(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Steam Web API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No games found on specified Steam account.")]
    NoGames,
}

impl From<SteamError> for AdapterError {
    fn from(e: SteamError) -> Self {
        match e {
            SteamError::NotFound => AdapterError::ClientNotInstalled(STEAM.name.into()),
            SteamError::UserNotFound => {
                AdapterError::NotAuthenticated("no Steam user configured".into())
            }
            SteamError::Vdf(msg) => AdapterError::Parse(msg),
            SteamError::Io(msg) => AdapterError::Io(std::io::Error::other(msg)),
            SteamError::Http(e) => AdapterError::Http(e.to_string()),
            SteamError::Api { status, .. } if status == 401 || status == 403 => {
                AdapterError::NotAuthenticated(format!(
                    "Steam Web API rejected the API key (HTTP {status})"
                ))
            }
            SteamError::Api { status, body } => AdapterError::Api { status, body },
            SteamError::Json(e) => AdapterError::Json(e),
            e @ SteamError::NoGames => AdapterError::Other(e.to_string()),
        }
    }
}

/// Steam id canonicalization.
///
/// Canonical ids are the decimal rendering of the 64-bit game id, so plain
/// apps are their app id and mods are the composed id. `localconfig.vdf`
/// mod keys (`"215_2287856061"`) map to the same canonical form.
#[derive(Debug, Clone, Copy, Default)]
pub struct SteamIds;

impl IdNormalizer for SteamIds {
    fn normalize_id(&self, raw: &str) -> GameId {
        let raw = raw.trim();
        if let Ok(id) = raw.parse::<SteamGameId>() {
            return GameId::from(id.to_string());
        }
        match SteamGameId::parse_config_key(raw) {
            Some(id) => GameId::from(id.to_string()),
            None => GameId::from(raw),
        }
    }
}

impl From<SteamGameId> for GameId {
    fn from(id: SteamGameId) -> Self {
        GameId::from(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_id_canonical_forms() {
        let ids = SteamIds;
        assert_eq!(ids.normalize_id("440").as_str(), "440");
        assert_eq!(ids.normalize_id(" 0440 ").as_str(), "440");
        assert_eq!(
            ids.normalize_id("215_2287856061"),
            GameId::from(SteamGameId::game_mod(215, 2_287_856_061))
        );
        assert_eq!(ids.normalize_id("weird").as_str(), "weird");
    }

    #[test]
    fn normalize_id_is_idempotent() {
        let ids = SteamIds;
        for raw in ["440", "215_2287856061", "00012", "x_y", ""] {
            let once = ids.normalize_id(raw);
            assert_eq!(ids.normalize_id(once.as_str()), once, "input {raw:?}");
        }
    }

    #[test]
    fn auth_errors_map_to_not_authenticated() {
        let err: AdapterError = SteamError::Api {
            status: 403,
            body: "Forbidden".into(),
        }
        .into();
        assert!(matches!(err, AdapterError::NotAuthenticated(_)));

        let err: AdapterError = SteamError::Api {
            status: 500,
            body: "oops".into(),
        }
        .into();
        assert!(matches!(err, AdapterError::Api { status: 500, .. }));
    }

    #[test]
    fn not_found_maps_to_client_not_installed() {
        let err: AdapterError = SteamError::NotFound.into();
        assert_eq!(err.to_string(), "Steam client is not installed");
    }

    #[test]
    fn no_games_keeps_message() {
        let err: AdapterError = SteamError::NoGames.into();
        assert_eq!(err.to_string(), "No games found on specified Steam account.");
    }
}
