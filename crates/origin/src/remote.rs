//! Remote account adapter: Origin entitlements.

use std::future::Future;
use std::pin::Pin;

use gamedock_library::{
    AdapterError, AuthState, GameMap, GameRecord, IdNormalizer, RemoteAccountAdapter,
};
use tracing::{debug, warn};

use crate::api::{CatalogClient, Entitlement, OfferData, OriginClient};
use crate::{ORIGIN, OriginError, OriginIds};

/// An Origin account queried with an access token.
pub struct OriginAccount {
    client: Option<OriginClient>,
    catalog: CatalogClient,
    user_id: Option<u64>,
}

impl OriginAccount {
    /// Creates the adapter. Without a token the account is not logged in;
    /// without a user id it is looked up from the token.
    pub fn new(access_token: Option<&str>, user_id: Option<u64>) -> Result<Self, OriginError> {
        let client = match access_token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => Some(OriginClient::new(token)?),
            None => None,
        };
        Ok(Self {
            client,
            catalog: CatalogClient::new()?,
            user_id,
        })
    }

    /// The client and the user id it acts for.
    async fn authenticate(&self) -> Result<(&OriginClient, u64), OriginError> {
        let client = self.client.as_ref().ok_or(OriginError::NotLoggedIn)?;
        let user_id = match self.user_id {
            Some(id) => id,
            None => client.user_id().await?,
        };
        Ok((client, user_id))
    }

    async fn check(&self) -> AuthState {
        match self.authenticate().await {
            Ok(_) => AuthState::Authenticated,
            Err(e @ (OriginError::NotLoggedIn | OriginError::InvalidToken)) => {
                AuthState::NotAuthenticated(e.to_string())
            }
            Err(OriginError::Api { status, body }) if status == 401 || status == 403 => {
                AuthState::NotAuthenticated(format!("access error: {body}"))
            }
            Err(e) => AuthState::TransientFailure(e.to_string()),
        }
    }

    /// Unique base-game entitlements, named from the catalog and carrying
    /// their usage statistics.
    async fn fetch(&self) -> Result<Vec<GameRecord>, AdapterError> {
        let (client, user_id) = self.authenticate().await?;
        let entitlements = client.entitlements(user_id).await?;
        debug!(count = entitlements.len(), "Origin entitlements received");

        let ids = OriginIds;
        let mut games = GameMap::new();
        for entitlement in entitlements.into_iter().filter(Entitlement::is_base_game) {
            let game_id = ids.normalize_id(&entitlement.offer_id);
            if games.contains(&game_id) {
                continue;
            }

            let name = self.offer_name(&entitlement.offer_id).await;
            let mut record = GameRecord::owned(ORIGIN.id, game_id, name);
            match client.usage(user_id, &entitlement.offer_id).await {
                Ok(usage) => {
                    record = record
                        .with_playtime(usage.playtime_seconds)
                        .with_last_activity(usage.last_session_end);
                }
                Err(e) => {
                    warn!(
                        id = %entitlement.offer_id,
                        error = %e,
                        "failed to get Origin usage data"
                    );
                }
            }
            games.insert_first(record);
        }
        Ok(games.into_vec())
    }

    /// The catalog's display name, or the offer id when it has none.
    async fn offer_name(&self, offer_id: &str) -> String {
        let offer = match self.catalog.offer(offer_id).await {
            Ok(offer) => offer,
            Err(e) => {
                warn!(id = %offer_id, error = %e, "failed to look up Origin offer");
                None
            }
        };
        offer
            .as_ref()
            .and_then(OfferData::display_name)
            .map(|name| OriginIds.normalize_name(name))
            .unwrap_or_else(|| offer_id.to_string())
    }
}

impl RemoteAccountAdapter for OriginAccount {
    fn auth_state(&self) -> Pin<Box<dyn Future<Output = AuthState> + Send + '_>> {
        Box::pin(self.check())
    }

    fn fetch_owned(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<GameRecord>, AdapterError>> + Send + '_>> {
        Box::pin(self.fetch())
    }
}
