use std::path::PathBuf;

use winreg::RegKey;
use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};

use crate::SteamError;

const MACHINE_KEYS: [&str; 2] = [r"SOFTWARE\Wow6432Node\Valve\Steam", r"SOFTWARE\Valve\Steam"];
const USER_KEY: &str = r"Software\Valve\Steam";

/// Locates Steam through the registry: the machine-wide `InstallPath`
/// (64-bit view, then 32-bit), then the per-user `SteamPath`.
pub(crate) fn get_base_dir() -> Result<PathBuf, SteamError> {
    let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
    MACHINE_KEYS
        .iter()
        .find_map(|subkey| string_value(&hklm, subkey, "InstallPath"))
        .or_else(|| user_path_value("SteamPath"))
        .filter(|dir| dir.is_dir())
        .ok_or(SteamError::NotFound)
}

/// Reads a per-user path value (`SteamPath`, `ModInstallPath`,
/// `SourceModInstallPath`).
pub(crate) fn user_path_value(value: &str) -> Option<PathBuf> {
    string_value(&RegKey::predef(HKEY_CURRENT_USER), USER_KEY, value)
}

fn string_value(root: &RegKey, subkey: &str, value: &str) -> Option<PathBuf> {
    let path: String = root.open_subkey(subkey).ok()?.get_value(value).ok()?;
    (!path.is_empty()).then(|| PathBuf::from(path))
}
