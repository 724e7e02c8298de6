//! Origin connector.
//!
//! Installed games come from the `.mfst` files Origin keeps under
//! `LocalContent`; owned games come from the account's entitlements.
//! Both are named from the public offer catalog.

pub mod api;
pub mod local;
pub mod manifest;
pub mod remote;

use std::path::PathBuf;
use std::sync::LazyLock;

use gamedock_library::{AdapterError, GameId, IdNormalizer, Platform};
use regex::Regex;

// Re-export primary types.
pub use api::{CatalogClient, Entitlement, OfferData, OriginClient, Usage};
pub use local::OriginLocalScanner;
pub use manifest::Manifest;
pub use remote::OriginAccount;

/// The Origin connector.
pub const ORIGIN: Platform = Platform {
    id: "origin",
    name: "Origin",
};

/// Errors for Origin operations.
#[derive(Debug, thiserror::Error)]
pub enum OriginError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid manifest: {0}")]
    Manifest(String),

    #[error("User is not logged in.")]
    NotLoggedIn,

    #[error("invalid access token")]
    InvalidToken,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Origin API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::de::DeError),

    #[error("invalid usage data: {0}")]
    Usage(String),
}

impl From<OriginError> for AdapterError {
    fn from(e: OriginError) -> Self {
        match e {
            OriginError::Io(e) => AdapterError::Io(e),
            OriginError::Manifest(msg) => AdapterError::Parse(msg),
            e @ (OriginError::NotLoggedIn | OriginError::InvalidToken) => {
                AdapterError::NotAuthenticated(e.to_string())
            }
            OriginError::Http(e) => AdapterError::Http(e.to_string()),
            OriginError::Api { status, body } if status == 401 || status == 403 => {
                AdapterError::NotAuthenticated(format!("access error: {body}"))
            }
            OriginError::Api { status, body } => AdapterError::Api { status, body },
            OriginError::Json(e) => AdapterError::Json(e),
            OriginError::Xml(e) => AdapterError::Parse(e.to_string()),
            OriginError::Usage(msg) => AdapterError::Parse(msg),
        }
    }
}

static TRAILING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)(\d+)$").expect("valid regex"));

/// Origin id canonicalization.
///
/// Manifest file names drop the `:` of offer ids (`OFB-EAST52017` for
/// `OFB-EAST:52017`). Names starting with `Origin` are already canonical
/// (`Origin.OFR.50.0001452`), as is anything containing `:`. Other values
/// pass through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct OriginIds;

impl IdNormalizer for OriginIds {
    fn normalize_id(&self, raw: &str) -> GameId {
        let raw = raw.trim();
        if raw.starts_with("Origin") || raw.contains(':') {
            return GameId::from(raw);
        }
        match TRAILING_NUMBER.captures(raw) {
            Some(caps) => GameId::from(format!("{}:{}", &caps[1], &caps[2])),
            None => GameId::from(raw),
        }
    }

    fn name_suffixes(&self) -> &'static [&'static str] {
        &["Standard Edition", "Base Game"]
    }
}

/// Launch URL handled by the Origin client.
pub fn launch_url(id: &GameId) -> String {
    format!("origin://launchgame/{id}")
}

/// Default Origin data directory (`%PROGRAMDATA%\Origin`).
pub fn default_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("PROGRAMDATA").map(|p| PathBuf::from(p).join("Origin"))
    }

    #[cfg(not(target_os = "windows"))]
    {
        None
    }
}
