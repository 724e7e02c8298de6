//! GameDock configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/gamedock/gamedock.toml`
//! - Windows: `%APPDATA%/gamedock/gamedock.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use gamedock_library::ImportConfig;
use serde::{Deserialize, Serialize};

/// GameDock configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Upper bound for each adapter call in seconds (0 = no limit).
    #[serde(default = "default_adapter_timeout")]
    pub adapter_timeout_secs: u64,

    /// Where notifications are persisted between runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications_path: Option<PathBuf>,

    #[serde(default)]
    pub steam: SteamSettings,

    #[serde(default)]
    pub origin: OriginSettings,

    #[serde(default)]
    pub itchio: ItchioSettings,
}

/// Steam connector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteamSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(flatten)]
    pub import: ImportConfig,

    /// Steam installation directory (auto-detected when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_dir: Option<PathBuf>,

    /// SteamID64 of the account (most recent login when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,

    /// Steam Web API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Include free-to-keep licenses in the account list.
    #[serde(default)]
    pub include_free_sub: bool,
}

/// Origin connector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(flatten)]
    pub import: ImportConfig,

    /// Origin data directory holding `LocalContent`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Account user id (looked up from the token when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,

    /// Bearer access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// itch.io connector settings. Off unless enabled, since a machine
/// without the itch app would report it missing on every run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItchioSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(flatten)]
    pub import: ImportConfig,

    /// itch app data directory holding `db/butler.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_dir: Option<PathBuf>,
}

fn default_adapter_timeout() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            adapter_timeout_secs: default_adapter_timeout(),
            notifications_path: None,
            steam: SteamSettings::default(),
            origin: OriginSettings::default(),
            itchio: ItchioSettings::default(),
        }
    }
}

impl Default for SteamSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            import: ImportConfig::default(),
            install_dir: None,
            user_id: None,
            api_key: None,
            include_free_sub: false,
        }
    }
}

impl Default for OriginSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            import: ImportConfig::default(),
            data_dir: None,
            user_id: None,
            access_token: None,
        }
    }
}

impl Config {
    /// Loads configuration from disk, or creates a default if not found.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path()?)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Saves the configuration to `path`.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        // Credentials live here; restrict permissions on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Per-adapter timeout, `None` when disabled.
    pub fn adapter_timeout(&self) -> Option<Duration> {
        (self.adapter_timeout_secs > 0).then(|| Duration::from_secs(self.adapter_timeout_secs))
    }

    /// Notification store location (next to the config file by default).
    pub fn notifications_path(&self) -> anyhow::Result<PathBuf> {
        match &self.notifications_path {
            Some(path) => Ok(path.clone()),
            None => Ok(config_path()?.with_file_name("notifications.json")),
        }
    }
}

/// Returns the platform-specific configuration file path.
fn config_path() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join(".config")
            .join("gamedock")
            .join("gamedock.toml"))
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata).join("gamedock").join("gamedock.toml"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        Ok(PathBuf::from("/tmp/gamedock/gamedock.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.adapter_timeout_secs, 60);
        assert_eq!(config.adapter_timeout(), Some(Duration::from_secs(60)));
        assert!(config.steam.enabled);
        assert!(config.steam.import.import_installed);
        assert!(!config.steam.import.connect_account);
        assert!(config.origin.enabled);
        assert!(config.origin.access_token.is_none());
        assert!(!config.itchio.enabled);
        assert!(config.itchio.import.import_installed);
    }

    #[test]
    fn config_partial_toml() {
        let toml_str = r#"
adapter_timeout_secs = 0

[steam]
connect_account = true
import_uninstalled = true
api_key = "ABC"
user_id = 76561197960287930

[origin]
enabled = false

[itchio]
enabled = true
app_dir = "/home/me/.config/itch"
connect_account = true
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.adapter_timeout(), None);
        assert!(config.steam.import.connect_account);
        assert!(config.steam.import.import_uninstalled);
        assert!(config.steam.import.import_installed);
        assert!(config.steam.import.include_mods);
        assert_eq!(config.steam.api_key.as_deref(), Some("ABC"));
        assert_eq!(config.steam.user_id, Some(76561197960287930));
        assert!(!config.origin.enabled);
        assert!(!config.origin.import.connect_account);
        assert!(config.itchio.enabled);
        assert!(config.itchio.import.connect_account);
        assert_eq!(
            config.itchio.app_dir.as_deref(),
            Some(Path::new("/home/me/.config/itch"))
        );
    }

    #[test]
    fn config_roundtrip_toml() {
        let mut config = Config::default();
        config.steam.install_dir = Some(PathBuf::from("/opt/steam"));
        config.steam.import.include_mods = false;
        config.origin.access_token = Some("token".into());
        config.origin.import.import_installed = false;
        config.itchio.enabled = true;
        config.itchio.app_dir = Some(PathBuf::from("/srv/itch"));

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn config_path_not_empty() {
        let path = config_path().unwrap();
        assert!(path.to_string_lossy().contains("gamedock"));
    }

    #[test]
    fn load_creates_default_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("gamedock.toml");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn save_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("gamedock.toml");

        let mut config = Config::default();
        config.origin.user_id = Some(42);
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.origin.user_id, Some(42));
    }

    #[test]
    fn notifications_path_override() {
        let config = Config {
            notifications_path: Some(PathBuf::from("/var/lib/gamedock/n.json")),
            ..Config::default()
        };
        assert_eq!(
            config.notifications_path().unwrap(),
            PathBuf::from("/var/lib/gamedock/n.json")
        );
        assert!(
            Config::default()
                .notifications_path()
                .unwrap()
                .ends_with("gamedock/notifications.json")
        );
    }
}
