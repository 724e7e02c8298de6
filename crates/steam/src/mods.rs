//! Locally installed GoldSrc and Source mods.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::SteamError;
use crate::game_id::SteamGameId;
use crate::vdf::load_text_vdf;

/// App id mods of Half-Life (GoldSrc) run under.
pub const HALF_LIFE_APP_ID: u32 = 70;

/// App id Source mods run under unless `gameinfo.txt` says otherwise
/// (Source SDK Base 2006).
pub const SOURCE_SDK_APP_ID: u32 = 215;

/// Folders in the Half-Life directory that are Valve's own games.
const FIRST_PARTY_MODS: &[&str] = &[
    "bshift", "cstrike", "czero", "czeror", "dmc", "dod", "gearbox", "ricochet", "tfc", "valve",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModKind {
    GoldSrc,
    Source,
}

/// An installed mod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModInfo {
    pub game_id: SteamGameId,
    pub name: String,
    pub install_dir: PathBuf,
    pub developer: Option<String>,
}

/// Reads the mod in `folder`. Returns `None` when the folder holds no
/// mod description file or the file names no game.
pub fn load_mod(folder: &Path, kind: ModKind) -> Result<Option<ModInfo>, SteamError> {
    let Some(dir_name) = folder.file_name().and_then(|n| n.to_str()) else {
        return Ok(None);
    };

    let (app_id, name, developer) = match kind {
        ModKind::GoldSrc => {
            let path = folder.join("liblist.gam");
            if !path.is_file() {
                return Ok(None);
            }
            let content = fs::read_to_string(&path)
                .map_err(|e| SteamError::Io(format!("failed to read {}: {e}", path.display())))?;
            let entries = parse_liblist(&content);
            let get = |key: &str| {
                entries
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(key))
                    .map(|(_, v)| v.clone())
            };
            (HALF_LIFE_APP_ID, get("game"), get("developer"))
        }
        ModKind::Source => {
            let path = folder.join("gameinfo.txt");
            if !path.is_file() {
                return Ok(None);
            }
            let kv = load_text_vdf(&path)?;
            let app_id = kv
                .get("FileSystem")
                .and_then(|fs| fs.u64("SteamAppId"))
                .and_then(|id| u32::try_from(id).ok())
                .unwrap_or(SOURCE_SDK_APP_ID);
            (
                app_id,
                kv.str("game").map(str::to_string),
                kv.str("developer").map(str::to_string),
            )
        }
    };

    let Some(name) = name.filter(|n| !n.trim().is_empty()) else {
        return Ok(None);
    };

    Ok(Some(ModInfo {
        game_id: SteamGameId::for_mod_folder(app_id, dir_name),
        name,
        install_dir: folder.to_path_buf(),
        developer: developer.filter(|d| !d.is_empty()),
    }))
}

/// Parses `liblist.gam` lines of the form `key "value"`.
fn parse_liblist(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("//"))
        .filter_map(|line| {
            let (key, rest) = line.split_once(char::is_whitespace)?;
            let value = rest.trim().trim_matches('"');
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Scans the Half-Life directory for third-party GoldSrc mods.
pub fn gold_src_mods(dir: &Path) -> Result<Vec<ModInfo>, SteamError> {
    scan_mod_dir(dir, ModKind::GoldSrc, |name| {
        !FIRST_PARTY_MODS.contains(&name)
    })
}

/// Scans `sourcemods` for Source mods.
pub fn source_mods(dir: &Path) -> Result<Vec<ModInfo>, SteamError> {
    scan_mod_dir(dir, ModKind::Source, |_| true)
}

fn scan_mod_dir(
    dir: &Path,
    kind: ModKind,
    keep: impl Fn(&str) -> bool,
) -> Result<Vec<ModInfo>, SteamError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| SteamError::Io(format!("failed to read {}: {e}", dir.display())))?;

    let mut folders: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|ft| ft.is_dir()).unwrap_or(false))
        .filter(|e| e.file_name().to_str().is_some_and(&keep))
        .map(|e| e.path())
        .collect();
    folders.sort();

    let mut mods = Vec::new();
    for folder in folders {
        match load_mod(&folder, kind) {
            Ok(Some(info)) => mods.push(info),
            Ok(None) => {}
            Err(e) => {
                error!(path = %folder.display(), error = %e, "failed to read installed mod");
            }
        }
    }

    debug!(path = %dir.display(), ?kind, count = mods.len(), "mods found");
    Ok(mods)
}
