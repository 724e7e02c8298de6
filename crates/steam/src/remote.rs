//! Remote account adapter: owned games from the Steam Web API.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use gamedock_library::{
    AdapterError, AuthState, GameMap, GameRecord, IdNormalizer, RemoteAccountAdapter,
};
use tracing::{debug, warn};

use crate::activity::last_activity;
use crate::api::{OwnedGame, WebApiClient};
use crate::game_id::SteamGameId;
use crate::paths::Paths;
use crate::users::get_most_recent_user;
use crate::{STEAM, SteamError, SteamIds};

/// A Steam account queried through the Web API.
pub struct SteamAccount {
    client: Option<WebApiClient>,
    steam_id: Option<u64>,
    base_dir: Option<PathBuf>,
    include_free_sub: bool,
}

impl SteamAccount {
    /// Creates the adapter.
    ///
    /// Without an API key the account reports itself as not authenticated.
    /// Without a SteamID64 the most recent local login is used.
    pub fn new(api_key: Option<String>, steam_id: Option<u64>) -> Result<Self, SteamError> {
        let client = match api_key.filter(|k| !k.trim().is_empty()) {
            Some(key) => Some(WebApiClient::new(key)?),
            None => None,
        };
        Ok(Self {
            client,
            steam_id,
            base_dir: None,
            include_free_sub: false,
        })
    }

    /// Steam installation used for user lookup and last activity.
    pub fn with_base_dir(mut self, base_dir: Option<PathBuf>) -> Self {
        self.base_dir = base_dir;
        self
    }

    /// Also return free-to-keep licenses.
    pub fn with_free_sub(mut self, include_free_sub: bool) -> Self {
        self.include_free_sub = include_free_sub;
        self
    }

    fn paths(&self) -> Option<Paths> {
        Paths::resolve(self.base_dir.clone()).ok()
    }

    /// Configured SteamID64, or the most recent local login.
    async fn resolve_steam_id(&self) -> Result<u64, SteamError> {
        if let Some(id) = self.steam_id {
            return Ok(id);
        }
        let paths = self.paths().ok_or(SteamError::UserNotFound)?;
        tokio::task::spawn_blocking(move || get_most_recent_user(&paths))
            .await
            .map_err(|e| SteamError::Io(format!("user lookup task failed: {e}")))??
            .map(|u| u.id)
            .ok_or(SteamError::UserNotFound)
    }

    async fn check(&self) -> AuthState {
        if self.client.is_none() {
            return AuthState::NotAuthenticated("no Steam Web API key configured".into());
        }
        match self.resolve_steam_id().await {
            Ok(_) => AuthState::Authenticated,
            Err(e) => AuthState::NotAuthenticated(e.to_string()),
        }
    }

    async fn fetch(&self) -> Result<Vec<GameRecord>, AdapterError> {
        let client = self.client.as_ref().ok_or_else(|| {
            AdapterError::NotAuthenticated("no Steam Web API key configured".into())
        })?;
        let steam_id = self.resolve_steam_id().await?;

        let owned = client.owned_games(steam_id, self.include_free_sub).await?;
        debug!(count = owned.len(), "Steam owned games received");

        let activity = match self.paths() {
            Some(paths) => tokio::task::spawn_blocking(move || last_activity(&paths, steam_id))
                .await
                .map_err(|e| SteamError::Io(e.to_string()))
                .and_then(|r| r),
            None => Err(SteamError::NotFound),
        };
        let activity = activity.unwrap_or_else(|e| {
            warn!(error = %e, "failed to import Steam last activity");
            HashMap::new()
        });

        Ok(owned_records(owned, &activity))
    }
}

/// Converts Web API entries to records, dropping unnamed entries and
/// repeated ids. Playtime saturates instead of overflowing.
fn owned_records(
    owned: Vec<OwnedGame>,
    activity: &HashMap<SteamGameId, DateTime<Utc>>,
) -> Vec<GameRecord> {
    let ids = SteamIds;
    let mut games = GameMap::new();
    for game in owned {
        // Some entries (e.g. 243870) come back without a name.
        let Some(name) = game.name.as_deref().filter(|n| !n.is_empty()) else {
            continue;
        };
        let id = SteamGameId::app(game.appid);
        games.insert_first(
            GameRecord::owned(STEAM.id, id, ids.normalize_name(name))
                .with_playtime(game.playtime_forever.saturating_mul(60))
                .with_last_activity(activity.get(&id).copied()),
        );
    }
    games.into_vec()
}

impl RemoteAccountAdapter for SteamAccount {
    fn auth_state(&self) -> Pin<Box<dyn Future<Output = AuthState> + Send + '_>> {
        Box::pin(self.check())
    }

    fn fetch_owned(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<GameRecord>, AdapterError>> + Send + '_>> {
        Box::pin(self.fetch())
    }
}
