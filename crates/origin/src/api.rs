//! Origin web API clients.
//!
//! `OriginClient` talks to the account endpoints with the user's token;
//! `CatalogClient` reads public offer metadata and needs no credentials.

use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;

use crate::OriginError;

const DEFAULT_API_URL: &str = "https://api1.origin.com";
const DEFAULT_IDENTITY_URL: &str = "https://gateway.ea.com";
const CATALOG_LOCALE: &str = "en_US";

/// An owned offer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlement {
    pub offer_id: String,
    #[serde(default)]
    pub offer_type: String,
}

impl Entitlement {
    /// Whether the offer is a full game (not DLC or an add-on).
    pub fn is_base_game(&self) -> bool {
        self.offer_type.eq_ignore_ascii_case("basegame")
    }
}

#[derive(Debug, Deserialize)]
struct EntitlementsResponse {
    #[serde(default)]
    entitlements: Vec<Entitlement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityResponse {
    pid: Pid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pid {
    pid_id: u64,
}

/// Public store metadata of an offer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferData {
    #[serde(default)]
    pub offer_id: String,
    #[serde(default)]
    pub offer_type: String,
    #[serde(default)]
    pub localizable_attributes: Option<LocalizableAttributes>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizableAttributes {
    #[serde(default)]
    pub display_name: Option<String>,
}

impl OfferData {
    /// Full games and demos. DLC shares its base game's install folder.
    pub fn is_importable(&self) -> bool {
        matches!(self.offer_type.as_str(), "Base Game" | "DEMO")
    }

    pub fn display_name(&self) -> Option<&str> {
        self.localizable_attributes
            .as_ref()?
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Play statistics of one offer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Usage {
    pub playtime_seconds: u64,
    pub last_session_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageResponse {
    #[serde(default)]
    total: Option<String>,
    #[serde(default)]
    last_session_end_time_stamp: Option<String>,
}

impl Usage {
    /// Parses the usage XML document. `total` is in seconds and the last
    /// session end is epoch milliseconds; zero or empty means never.
    pub fn from_xml(xml: &str) -> Result<Self, OriginError> {
        let resp: UsageResponse = quick_xml::de::from_str(xml)?;

        let playtime_seconds = match resp.total.as_deref().map(str::trim) {
            None | Some("") => 0,
            Some(total) => total
                .parse()
                .map_err(|_| OriginError::Usage(format!("invalid total {total:?}")))?,
        };

        let last_session_end = match resp.last_session_end_time_stamp.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(stamp) => {
                let millis: i64 = stamp
                    .parse()
                    .map_err(|_| OriginError::Usage(format!("invalid timestamp {stamp:?}")))?;
                Some(millis)
                    .filter(|m| *m > 0)
                    .and_then(DateTime::from_timestamp_millis)
            }
        };

        Ok(Self {
            playtime_seconds,
            last_session_end,
        })
    }
}

/// Sends a request, turning non-success statuses into `OriginError::Api`.
async fn send(request: reqwest::RequestBuilder) -> Result<Vec<u8>, OriginError> {
    let resp = request.send().await?;
    let status = resp.status();

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(OriginError::Api {
            status: status.as_u16(),
            body,
        });
    }

    Ok(resp.bytes().await?.to_vec())
}

/// Origin API client.
pub struct OriginClient {
    http: reqwest::Client,
    auth_token: HeaderValue,
    api_url: String,
    identity_url: String,
}

impl OriginClient {
    /// Creates a new client with the given access token.
    pub fn new(access_token: &str) -> Result<Self, OriginError> {
        let auth_token =
            HeaderValue::from_str(access_token).map_err(|_| OriginError::InvalidToken)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {access_token}"))
                .map_err(|_| OriginError::InvalidToken)?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.origin.v3+json; x-cache/force-write"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            auth_token,
            api_url: DEFAULT_API_URL.to_string(),
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
        })
    }

    /// Sets a custom base URL for both services (for testing).
    #[cfg(test)]
    pub(crate) fn with_base_url(mut self, url: String) -> Self {
        self.api_url = url.clone();
        self.identity_url = url;
        self
    }

    /// Returns the user id the token belongs to.
    pub async fn user_id(&self) -> Result<u64, OriginError> {
        let url = format!("{}/proxy/identity/pids/me", self.identity_url);
        let body = send(self.http.get(url)).await?;
        let resp: IdentityResponse = serde_json::from_slice(&body)?;
        Ok(resp.pid.pid_id)
    }

    /// Returns every entitlement of `user_id`.
    pub async fn entitlements(&self, user_id: u64) -> Result<Vec<Entitlement>, OriginError> {
        let url = format!(
            "{}/ecommerce2/consolidatedentitlements/{user_id}?machine_hash=1",
            self.api_url
        );
        let body = send(self.http.get(url)).await?;
        let resp: EntitlementsResponse = serde_json::from_slice(&body)?;
        Ok(resp.entitlements)
    }

    /// Returns the play statistics of `offer_id` for `user_id`.
    pub async fn usage(&self, user_id: u64, offer_id: &str) -> Result<Usage, OriginError> {
        let url = format!(
            "{}/atom/users/{user_id}/games/{offer_id}/usage",
            self.api_url
        );
        let request = self
            .http
            .get(url)
            .header("authtoken", self.auth_token.clone())
            .header(ACCEPT, "application/xml");
        let body = send(request).await?;
        Usage::from_xml(&String::from_utf8_lossy(&body))
    }
}

/// Public offer catalog client.
pub struct CatalogClient {
    http: reqwest::Client,
    api_url: String,
}

impl CatalogClient {
    pub fn new() -> Result<Self, OriginError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            api_url: DEFAULT_API_URL.to_string(),
        })
    }

    /// Sets a custom base URL (for testing).
    #[cfg(test)]
    pub(crate) fn with_base_url(mut self, url: String) -> Self {
        self.api_url = url;
        self
    }

    /// Looks up `offer_id`. An offer the store does not know is `None`.
    pub async fn offer(&self, offer_id: &str) -> Result<Option<OfferData>, OriginError> {
        let url = format!(
            "{}/ecommerce2/public/{offer_id}/{CATALOG_LOCALE}",
            self.api_url
        );
        match send(self.http.get(url)).await {
            Ok(body) => Ok(Some(serde_json::from_slice(&body)?)),
            Err(OriginError::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
