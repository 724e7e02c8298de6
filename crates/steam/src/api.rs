//! Steam Web API client.
//!
//! Only `IPlayerService/GetOwnedGames` is used; it needs a Web API key and
//! works for private profiles as long as the key belongs to the account.

use serde::Deserialize;

use crate::SteamError;

const DEFAULT_BASE_URL: &str = "https://api.steampowered.com";

/// One owned game as returned by the Web API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OwnedGame {
    pub appid: u32,
    #[serde(default)]
    pub name: Option<String>,
    /// Total playtime in minutes.
    #[serde(default)]
    pub playtime_forever: u64,
}

#[derive(Debug, Deserialize)]
struct OwnedGamesEnvelope {
    response: OwnedGamesResponse,
}

#[derive(Debug, Deserialize)]
struct OwnedGamesResponse {
    #[serde(default)]
    games: Option<Vec<OwnedGame>>,
}

/// Steam Web API client.
pub struct WebApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WebApiClient {
    /// Creates a new client with the given Web API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self, SteamError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        })
    }

    /// Sets a custom base URL (for testing).
    #[cfg(test)]
    pub(crate) fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Returns the games owned by `steam_id`, including free games the
    /// user played and, if `include_free_sub`, free-to-keep licenses.
    pub async fn owned_games(
        &self,
        steam_id: u64,
        include_free_sub: bool,
    ) -> Result<Vec<OwnedGame>, SteamError> {
        let url = format!("{}/IPlayerService/GetOwnedGames/v0001/", self.base_url);
        let mut params = vec![
            ("key", self.api_key.clone()),
            ("include_appinfo", "1".to_string()),
            ("include_played_free_games", "1".to_string()),
            ("format", "json".to_string()),
            ("steamid", steam_id.to_string()),
        ];
        if include_free_sub {
            params.push(("include_free_sub", "1".to_string()));
        }

        let resp = self.http.get(&url).query(&params).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SteamError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.bytes().await?;
        let envelope: OwnedGamesEnvelope = serde_json::from_slice(&body)?;
        envelope.response.games.ok_or(SteamError::NoGames)
    }
}
