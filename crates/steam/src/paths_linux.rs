use std::path::PathBuf;

use crate::SteamError;

/// Returns the Steam base directory on Linux.
pub(crate) fn get_base_dir() -> Result<PathBuf, SteamError> {
    let home = std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or(SteamError::NotFound)?;

    candidates(&home)
        .into_iter()
        .find(|dir| dir.join("steamapps").is_dir())
        .ok_or(SteamError::NotFound)
}

/// Known install locations, most common first.
fn candidates(home: &std::path::Path) -> [PathBuf; 3] {
    [
        home.join(".steam").join("steam"),
        home.join(".local").join("share").join("Steam"),
        // Flatpak
        home.join(".var")
            .join("app")
            .join("com.valvesoftware.Steam")
            .join(".steam")
            .join("steam"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_order() {
        let dirs = candidates(std::path::Path::new("/home/u"));
        assert_eq!(dirs[0], PathBuf::from("/home/u/.steam/steam"));
        assert_eq!(dirs[1], PathBuf::from("/home/u/.local/share/Steam"));
        assert!(dirs[2].ends_with("com.valvesoftware.Steam/.steam/steam"));
    }
}
