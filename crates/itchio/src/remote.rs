//! Remote account adapter: download keys of the logged in profiles.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use gamedock_library::{
    AdapterError, AuthState, GameMap, GameRecord, RemoteAccountAdapter, remove_trademarks,
};
use tracing::debug;

use crate::butler::ButlerDb;
use crate::{ITCHIO, ItchError, default_app_dir};

/// The accounts logged in to the itch app.
#[derive(Debug, Clone, Default)]
pub struct ItchAccount {
    app_dir: Option<PathBuf>,
}

impl ItchAccount {
    /// Account of the default itch app directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Account of the itch app directory at `app_dir`.
    pub fn with_app_dir(app_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_dir: Some(app_dir.into()),
        }
    }

    /// Runs `query` against the database off the async runtime.
    async fn with_db<T, F>(&self, query: F) -> Result<T, ItchError>
    where
        T: Send + 'static,
        F: FnOnce(&ButlerDb) -> Result<T, ItchError> + Send + 'static,
    {
        let app_dir = self.app_dir.clone();
        tokio::task::spawn_blocking(move || {
            let app_dir = app_dir.or_else(default_app_dir).ok_or(ItchError::NotInstalled)?;
            query(&ButlerDb::open(&app_dir)?)
        })
        .await
        .map_err(|e| std::io::Error::other(format!("butler query task failed: {e}")))?
    }

    async fn check(&self) -> AuthState {
        match self.with_db(|db| db.profiles()).await {
            Ok(profiles) if profiles.is_empty() => {
                AuthState::NotAuthenticated(ItchError::NotLoggedIn.to_string())
            }
            Ok(_) => AuthState::Authenticated,
            Err(e @ ItchError::NotInstalled) => AuthState::NotAuthenticated(e.to_string()),
            Err(e) => AuthState::TransientFailure(e.to_string()),
        }
    }

    async fn fetch(&self) -> Result<Vec<GameRecord>, AdapterError> {
        let games = self.with_db(owned_records).await?;
        debug!(count = games.len(), "itch.io owned games received");
        Ok(games)
    }
}

/// Importable games across every profile, first key wins.
fn owned_records(db: &ButlerDb) -> Result<Vec<GameRecord>, ItchError> {
    let profiles = db.profiles()?;
    if profiles.is_empty() {
        return Err(ItchError::NotLoggedIn);
    }

    let mut games = GameMap::new();
    for profile in profiles {
        for game in db.owned_games(profile)? {
            if !game.is_importable() {
                continue;
            }
            let name = remove_trademarks(&game.title);
            games.insert_first(GameRecord::owned(
                ITCHIO.id,
                game.id.to_string(),
                name.trim(),
            ));
        }
    }
    Ok(games.into_vec())
}

impl RemoteAccountAdapter for ItchAccount {
    fn auth_state(&self) -> Pin<Box<dyn Future<Output = AuthState> + Send + '_>> {
        Box::pin(self.check())
    }

    fn fetch_owned(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<GameRecord>, AdapterError>> + Send + '_>> {
        Box::pin(self.fetch())
    }
}
