//! Per-connector import configuration.

use serde::{Deserialize, Serialize};

/// Which sources take part in an import run.
///
/// The flags are independent: no flag implies another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Scan the machine for installed games.
    #[serde(default = "default_true")]
    pub import_installed: bool,

    /// Keep account-owned games that are not installed.
    #[serde(default)]
    pub import_uninstalled: bool,

    /// Query the launcher account.
    #[serde(default)]
    pub connect_account: bool,

    /// Include locally installed mods (Steam only).
    #[serde(default = "default_true")]
    pub include_mods: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            import_installed: true,
            import_uninstalled: false,
            connect_account: false,
            include_mods: true,
        }
    }
}
