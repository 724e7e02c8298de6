//! Local install adapter: installed apps and mods.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use gamedock_library::{
    AdapterError, GameAction, GameMap, GameRecord, IdNormalizer, ImportConfig, LocalInstallAdapter,
    remove_trademarks,
};
use tracing::{debug, error, info, warn};

use crate::game_id::SteamGameId;
use crate::manifest::{library_folders, load_app_manifests};
use crate::mods::{ModInfo, gold_src_mods, source_mods};
use crate::paths::Paths;
use crate::{REDIST_APP_ID, STEAM, SteamError, SteamIds};

/// Scans Steam library folders for installed games.
#[derive(Debug, Clone, Default)]
pub struct SteamLocalScanner {
    base_dir: Option<PathBuf>,
}

impl SteamLocalScanner {
    /// Scanner for the auto-detected Steam installation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scanner for the installation at `base_dir`.
    pub fn with_base(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }
}

impl LocalInstallAdapter for SteamLocalScanner {
    fn scan_installed<'a>(
        &'a self,
        config: &'a ImportConfig,
    ) -> Pin<Box<dyn Future<Output = Result<GameMap, AdapterError>> + Send + 'a>> {
        Box::pin(scan_in_background(self.base_dir.clone(), config.include_mods))
    }
}

async fn scan_in_background(
    base_dir: Option<PathBuf>,
    include_mods: bool,
) -> Result<GameMap, AdapterError> {
    let games = tokio::task::spawn_blocking(move || {
        let paths = match Paths::resolve(base_dir.clone()) {
            Ok(paths) => paths,
            // Not having Steam installed is not an error.
            Err(SteamError::NotFound) if base_dir.is_none() => {
                info!("Steam installation not found, no installed games");
                return Ok(GameMap::new());
            }
            Err(e) => return Err(e),
        };
        scan_installed_games(&paths, include_mods)
    })
    .await
    .map_err(|e| AdapterError::Other(format!("Steam scan task failed: {e}")))??;
    Ok(games)
}

/// Collects installed apps from every library folder, then mods.
///
/// First-seen wins when an app appears in several library folders.
pub fn scan_installed_games(paths: &Paths, include_mods: bool) -> Result<GameMap, SteamError> {
    let ids = SteamIds;
    let mut games = GameMap::new();

    for folder in library_folders(paths) {
        let steamapps = Paths::steamapps_dir(&folder);
        if !steamapps.is_dir() {
            warn!(path = %steamapps.display(), "Steam library not found");
            continue;
        }

        for app in load_app_manifests(&steamapps)? {
            if app.game_id == SteamGameId::app(REDIST_APP_ID) {
                continue;
            }
            let Some(dir) = app.install_dir else {
                continue;
            };
            games.insert_first(
                GameRecord::installed(STEAM.id, app.game_id, ids.normalize_name(&app.name), dir)
                    .with_play_action(GameAction::play_url(app.game_id.launch_url())),
            );
        }
    }

    if include_mods {
        for info in installed_mods(paths) {
            games.insert_first(mod_record(info));
        }
    }

    debug!(count = games.len(), "Steam installed games scanned");
    Ok(games)
}

/// GoldSrc mods from the Half-Life directory, then Source mods.
///
/// Mod discovery is best effort: a failure is logged and yields no mods.
fn installed_mods(paths: &Paths) -> Vec<ModInfo> {
    let mut mods = Vec::new();

    let gold_src = paths.gold_src_mods_dir();
    if gold_src.is_dir() {
        match gold_src_mods(&gold_src) {
            Ok(found) => mods.extend(found),
            Err(e) => error!(error = %e, "failed to import GoldSrc mods"),
        }
    }

    let source = paths.source_mods_dir();
    if source.is_dir() {
        match source_mods(&source) {
            Ok(found) => mods.extend(found),
            Err(e) => error!(error = %e, "failed to import Source mods"),
        }
    }

    mods
}

fn mod_record(info: ModInfo) -> GameRecord {
    debug!(
        app = info.game_id.app_id(),
        mod_id = info.game_id.mod_id(),
        name = %info.name,
        "Steam mod found"
    );
    GameRecord::installed(
        STEAM.id,
        info.game_id,
        remove_trademarks(&info.name).trim(),
        info.install_dir,
    )
    .with_play_action(GameAction::play_url(info.game_id.launch_url()))
    .with_developers(info.developer.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamedock_library::ActionKind;
    use std::fs;
    use std::path::Path;

    fn install(steamapps: &Path, app_id: u32, name: &str, dir: &str) {
        fs::create_dir_all(steamapps.join("common").join(dir)).unwrap();
        fs::write(
            steamapps.join(format!("appmanifest_{app_id}.acf")),
            format!(
                "\"AppState\" {{ \"appid\" \"{app_id}\" \"name\" \"{name}\" \"installdir\" \"{dir}\" }}"
            ),
        )
        .unwrap();
    }

    fn steam_root() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("steamapps")).unwrap();
        tmp
    }

    #[test]
    fn scans_base_library() {
        let tmp = steam_root();
        let steamapps = tmp.path().join("steamapps");
        install(&steamapps, 440, "Team Fortress 2", "Team Fortress 2");
        install(&steamapps, 620, "Portal™ 2", "Portal 2");
        install(
            &steamapps,
            REDIST_APP_ID,
            "Steamworks Common Redistributables",
            "Steamworks Shared",
        );

        let games = scan_installed_games(&Paths::with_base(tmp.path()), false).unwrap();

        let names: Vec<&str> = games.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Team Fortress 2", "Portal 2"]);

        let tf2 = games.get(&"440".into()).unwrap();
        assert!(tf2.is_installed);
        assert_eq!(tf2.source, "steam");
        assert_eq!(tf2.platform, "PC");
        let action = tf2.play_action.as_ref().unwrap();
        assert_eq!(action.kind, ActionKind::Url);
        assert_eq!(action.path, "steam://rungameid/440");
    }

    #[test]
    fn first_library_wins_on_duplicates() {
        let tmp = steam_root();
        let extra = tmp.path().join("extra");
        fs::create_dir_all(extra.join("steamapps")).unwrap();
        install(&tmp.path().join("steamapps"), 440, "TF2 Base", "TF2");
        install(&extra.join("steamapps"), 440, "TF2 Extra", "TF2");
        install(&extra.join("steamapps"), 10, "Counter-Strike", "CS");
        fs::write(
            tmp.path().join("steamapps").join("libraryfolders.vdf"),
            format!("\"libraryfolders\" {{ \"1\" \"{}\" }}", extra.display()),
        )
        .unwrap();

        let games = scan_installed_games(&Paths::with_base(tmp.path()), false).unwrap();

        assert_eq!(games.len(), 2);
        assert_eq!(games.get(&"440".into()).unwrap().name, "TF2 Base");
        assert!(games.contains(&"10".into()));
    }

    #[test]
    fn mods_only_when_enabled() {
        let tmp = steam_root();
        let sourcemods = tmp.path().join("steamapps").join("sourcemods").join("mymod");
        fs::create_dir_all(&sourcemods).unwrap();
        fs::write(
            sourcemods.join("gameinfo.txt"),
            r#""GameInfo" { game "My Mod®" developer "Mod Team" }"#,
        )
        .unwrap();

        let paths = Paths::with_base(tmp.path());
        assert!(scan_installed_games(&paths, false).unwrap().is_empty());

        let games = scan_installed_games(&paths, true).unwrap();
        assert_eq!(games.len(), 1);
        let record = games.iter().next().unwrap();
        let expected = SteamGameId::for_mod_folder(215, "mymod");
        assert_eq!(record.game_id.as_str(), expected.to_string());
        assert_eq!(record.name, "My Mod");
        assert_eq!(record.developers, vec!["Mod Team".to_string()]);
        assert_eq!(
            record.play_action.as_ref().unwrap().path,
            format!("steam://rungameid/{expected}")
        );
    }

    #[test]
    fn broken_mod_does_not_fail_scan() {
        let tmp = steam_root();
        let steamapps = tmp.path().join("steamapps");
        install(&steamapps, 440, "TF2", "TF2");
        let bad = steamapps.join("sourcemods").join("bad");
        fs::create_dir_all(&bad).unwrap();
        fs::write(bad.join("gameinfo.txt"), "\"GameInfo\" {").unwrap();

        let games = scan_installed_games(&Paths::with_base(tmp.path()), true).unwrap();
        assert_eq!(games.len(), 1);
    }

    #[tokio::test]
    async fn adapter_uses_base_dir() {
        let tmp = steam_root();
        install(&tmp.path().join("steamapps"), 440, "TF2", "TF2");

        let scanner = SteamLocalScanner::with_base(tmp.path());
        let games = scanner
            .scan_installed(&ImportConfig::default())
            .await
            .unwrap();
        assert_eq!(games.len(), 1);
    }

    #[tokio::test]
    async fn adapter_missing_explicit_dir_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let scanner = SteamLocalScanner::with_base(tmp.path().join("missing"));
        let err = scanner
            .scan_installed(&ImportConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::ClientNotInstalled(_)));
    }
}
