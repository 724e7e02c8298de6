//! App manifests (`appmanifest_*.acf`) and library folders.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::SteamError;
use crate::game_id::SteamGameId;
use crate::paths::Paths;
use crate::vdf::{KeyValue, load_text_vdf, parse_text_vdf};

/// An installed app described by its manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppManifest {
    pub game_id: SteamGameId,
    /// Raw manifest name; normalization is up to the caller.
    pub name: String,
    /// Resolved install directory, if it exists on disk.
    pub install_dir: Option<PathBuf>,
    /// Whether the install lives under `steamapps/music` (a soundtrack).
    pub is_soundtrack: bool,
}

/// Parses one manifest file located in a `steamapps` directory.
pub fn load_app_manifest(path: &Path) -> Result<AppManifest, SteamError> {
    let kv = load_text_vdf(path)?;
    let steamapps = path
        .parent()
        .ok_or_else(|| SteamError::Vdf(format!("manifest {} has no parent", path.display())))?;
    app_manifest_from(&kv, steamapps)
}

fn app_manifest_from(kv: &KeyValue, steamapps: &Path) -> Result<AppManifest, SteamError> {
    let app_id = kv
        .u64("appid")
        .and_then(|id| u32::try_from(id).ok())
        .ok_or_else(|| SteamError::Vdf("manifest has no valid appid".into()))?;

    let name = kv
        .str("name")
        .filter(|n| !n.is_empty())
        .or_else(|| kv.path(&["UserConfig", "name"]).and_then(|n| n.value.as_deref()))
        .unwrap_or_default()
        .to_string();

    let (install_dir, is_soundtrack) = match kv.str("installdir").filter(|d| !d.is_empty()) {
        Some(dir) => resolve_install_dir(steamapps, dir),
        None => (None, false),
    };

    Ok(AppManifest {
        game_id: SteamGameId::app(app_id),
        name,
        install_dir,
        is_soundtrack,
    })
}

/// Looks for `dir` under `common`, then `music`.
fn resolve_install_dir(steamapps: &Path, dir: &str) -> (Option<PathBuf>, bool) {
    let common = steamapps.join("common").join(dir);
    if common.is_dir() {
        return (Some(common), false);
    }
    let music = steamapps.join("music").join(dir);
    if music.is_dir() {
        return (Some(music), true);
    }
    (None, false)
}

/// Loads every manifest in a `steamapps` directory.
///
/// Steam occasionally writes broken manifests; those are logged and skipped
/// so one bad file cannot fail the scan. Soundtracks and manifests whose
/// install directory is missing are skipped as well.
pub fn load_app_manifests(steamapps: &Path) -> Result<Vec<AppManifest>, SteamError> {
    let entries = fs::read_dir(steamapps)
        .map_err(|e| SteamError::Io(format!("failed to read {}: {e}", steamapps.display())))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("appmanifest") && n.ends_with(".acf"))
        })
        .collect();
    files.sort();

    let mut apps = Vec::new();
    for file in files {
        match load_app_manifest(&file) {
            Ok(app) if app.install_dir.is_none() || app.is_soundtrack => {
                info!(
                    name = %app.name,
                    "Steam game is not properly installed or is a soundtrack, skipping"
                );
            }
            Ok(app) => apps.push(app),
            Err(e) => {
                error!(path = %file.display(), error = %e, "failed to read app manifest");
            }
        }
    }

    debug!(path = %steamapps.display(), count = apps.len(), "app manifests loaded");
    Ok(apps)
}

/// Returns all library folders: the base directory first, then every
/// existing folder listed in `libraryfolders.vdf`.
pub fn library_folders(paths: &Paths) -> Vec<PathBuf> {
    let mut folders = vec![paths.base_dir().clone()];
    let config = paths.library_folders_path();
    if !config.exists() {
        return folders;
    }

    match fs::read(&config)
        .map_err(|e| SteamError::Io(e.to_string()))
        .and_then(|data| parse_text_vdf(&data))
    {
        Ok(kv) => {
            for folder in parse_library_folders(&kv) {
                if !folder.is_dir() {
                    warn!(path = %folder.display(), "Steam library folder not found");
                    continue;
                }
                if !folders.contains(&folder) {
                    folders.push(folder);
                }
            }
        }
        Err(e) => error!(error = %e, "failed to get additional Steam library folders"),
    }

    folders
}

/// Extracts folder paths from numeric children of `libraryfolders.vdf`.
///
/// Handles both the legacy `"1" "D:\\Lib"` shape and the current
/// `"0" { "path" "..." }` shape.
fn parse_library_folders(kv: &KeyValue) -> Vec<PathBuf> {
    kv.children
        .iter()
        .filter(|c| c.name.parse::<u32>().is_ok())
        .filter_map(|c| match &c.value {
            Some(path) => Some(path.as_str()),
            None => c.str("path"),
        })
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect()
}
