//! Error types for library import.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Errors produced by a local or remote adapter call.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("{0} client is not installed")]
    ClientNotInstalled(String),

    #[error("user is not authenticated: {0}")]
    NotAuthenticated(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Other(String),
}

/// Which part of a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Filesystem, registry or manifest failure; the installed set is empty.
    LocalScan,
    /// No session or expired credentials; the account import is skipped.
    Authentication,
    /// Network, HTTP or payload failure during the account import.
    RemoteApi,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::LocalScan => write!(f, "local scan"),
            FailureKind::Authentication => write!(f, "authentication"),
            FailureKind::RemoteApi => write!(f, "remote API"),
        }
    }
}

/// The single surfaced error of an import run.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind} failure on {platform_id}: {source}")]
pub struct ImportError {
    pub platform_id: String,
    pub kind: FailureKind,
    #[source]
    pub source: Arc<AdapterError>,
    /// Earlier failures of the same run that this one replaced.
    pub suppressed: Vec<(FailureKind, Arc<AdapterError>)>,
}

impl ImportError {
    pub fn new(platform_id: impl Into<String>, kind: FailureKind, source: AdapterError) -> Self {
        Self {
            platform_id: platform_id.into(),
            kind,
            source: Arc::new(source),
            suppressed: Vec::new(),
        }
    }

    /// The underlying failure's message, as shown to the user.
    pub fn message(&self) -> String {
        self.source.to_string()
    }

    /// Replaces this error with `next`, keeping this one as suppressed.
    pub(crate) fn superseded_by(self, mut next: ImportError) -> ImportError {
        next.suppressed = self.suppressed;
        next.suppressed.push((self.kind, self.source));
        next
    }
}

/// Errors returned by the importer itself.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("an import for {0} is already running")]
    RunInProgress(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_error_message_is_source_message() {
        let err = ImportError::new(
            "steam",
            FailureKind::Authentication,
            AdapterError::NotAuthenticated("no API key".into()),
        );
        assert_eq!(err.message(), "user is not authenticated: no API key");
        assert!(err.to_string().contains("authentication failure on steam"));
    }

    #[test]
    fn superseded_keeps_previous_failures() {
        let local = ImportError::new(
            "steam",
            FailureKind::LocalScan,
            AdapterError::Parse("bad acf".into()),
        );
        let remote = ImportError::new(
            "steam",
            FailureKind::RemoteApi,
            AdapterError::Http("connection reset".into()),
        );

        let merged = local.superseded_by(remote);
        assert_eq!(merged.kind, FailureKind::RemoteApi);
        assert_eq!(merged.suppressed.len(), 1);
        assert_eq!(merged.suppressed[0].0, FailureKind::LocalScan);
    }

    #[test]
    fn timeout_display() {
        let err = AdapterError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "timed out after 30s");
    }
}
