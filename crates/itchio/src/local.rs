//! Local install adapter: butler caves.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use gamedock_library::{
    AdapterError, GameAction, GameId, GameMap, GameRecord, ImportConfig, LocalInstallAdapter,
    remove_trademarks,
};
use tracing::{debug, warn};

use crate::butler::{ButlerDb, Cave};
use crate::manifest::{self, LaunchManifest};
use crate::{ITCHIO, ItchError, default_app_dir, launch_url};

/// Lists the games the itch app has installed.
#[derive(Debug, Clone, Default)]
pub struct ItchLocalScanner {
    app_dir: Option<PathBuf>,
}

impl ItchLocalScanner {
    /// Scanner for the default itch app directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scanner for the itch app directory at `app_dir`.
    pub fn with_app_dir(app_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_dir: Some(app_dir.into()),
        }
    }
}

impl LocalInstallAdapter for ItchLocalScanner {
    fn scan_installed<'a>(
        &'a self,
        _config: &'a ImportConfig,
    ) -> Pin<Box<dyn Future<Output = Result<GameMap, AdapterError>> + Send + 'a>> {
        Box::pin(scan_in_background(self.app_dir.clone()))
    }
}

async fn scan_in_background(app_dir: Option<PathBuf>) -> Result<GameMap, AdapterError> {
    let games = tokio::task::spawn_blocking(move || {
        let app_dir = app_dir.or_else(default_app_dir).ok_or(ItchError::NotInstalled)?;
        scan_installed_games(&app_dir)
    })
    .await
    .map_err(|e| AdapterError::Other(format!("itch.io scan task failed: {e}")))??;
    Ok(games)
}

/// One record per game, from its first cave whose folder exists.
fn scan_installed_games(app_dir: &Path) -> Result<GameMap, ItchError> {
    let db = ButlerDb::open(app_dir)?;
    let mut games = GameMap::new();

    for cave in db.caves()? {
        if !cave.game.is_importable() {
            continue;
        }
        let game_id = GameId::from(cave.game.id.to_string());
        // Only one installed version of a game is kept.
        if games.contains(&game_id) {
            continue;
        }
        let Some(install_dir) = cave.install_folder.clone().filter(|dir| dir.is_dir()) else {
            debug!(cave = %cave.id, "itch.io cave folder missing, skipping");
            continue;
        };
        games.insert_first(installed_record(&cave, game_id, install_dir));
    }

    debug!(count = games.len(), "itch.io installed games scanned");
    Ok(games)
}

fn installed_record(cave: &Cave, game_id: GameId, install_dir: PathBuf) -> GameRecord {
    let other_actions = other_actions(&install_dir);
    GameRecord::installed(
        ITCHIO.id,
        game_id,
        remove_trademarks(&cave.game.title).trim(),
        install_dir,
    )
    .with_play_action(GameAction::play_url(launch_url(&cave.id)))
    .with_other_actions(other_actions)
}

/// Extra actions from the game's launch manifest. A broken manifest
/// only costs the extra actions.
fn other_actions(install_dir: &Path) -> Vec<GameAction> {
    let Some(path) = manifest::find(install_dir) else {
        return Vec::new();
    };
    match LaunchManifest::load(&path) {
        Ok(manifest) => manifest.other_actions(install_dir),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read itch.io launch manifest");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::butler::tests::{add_cave, add_game, add_location, create_db};
    use gamedock_library::ActionKind;
    use std::fs;

    #[test]
    fn scans_importable_caves() {
        let tmp = tempfile::tempdir().unwrap();
        let apps = tmp.path().join("apps");
        for folder in ["celeste", "celeste-old", "ost", "sprite-tool"] {
            fs::create_dir_all(apps.join(folder)).unwrap();
        }
        fs::write(
            apps.join("celeste").join(manifest::FILE_NAME),
            "[[actions]]\nname = \"play\"\npath = \"celeste.exe\"\n\n\
             [[actions]]\nname = \"Level Editor\"\npath = \"editor.exe\"\n",
        )
        .unwrap();

        let conn = create_db(tmp.path());
        add_game(&conn, 1, "Celeste™ Classic", "game");
        add_game(&conn, 2, "Celeste OST", "soundtrack");
        add_game(&conn, 3, "Sprite Tool", "tool");
        add_game(&conn, 4, "Removed Game", "game");
        add_location(&conn, "loc", &apps);
        add_cave(&conn, "cave-1", 1, "loc", "celeste");
        add_cave(&conn, "cave-1b", 1, "loc", "celeste-old");
        add_cave(&conn, "cave-2", 2, "loc", "ost");
        add_cave(&conn, "cave-3", 3, "loc", "sprite-tool");
        add_cave(&conn, "cave-4", 4, "loc", "deleted");
        drop(conn);

        let games = scan_installed_games(tmp.path()).unwrap();
        let ids: Vec<&str> = games.iter().map(|g| g.game_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        let celeste = games.get(&"1".into()).unwrap();
        assert_eq!(celeste.name, "Celeste Classic");
        assert_eq!(celeste.source, "itchio");
        assert!(celeste.is_installed);
        assert_eq!(
            celeste.install_directory.as_deref(),
            Some(apps.join("celeste").as_path())
        );
        let play = celeste.play_action.as_ref().unwrap();
        assert_eq!(play.kind, ActionKind::Url);
        assert_eq!(play.path, "itch://caves/cave-1/launch");
        assert_eq!(celeste.other_actions.len(), 1);
        assert_eq!(celeste.other_actions[0].name, "Level Editor");

        assert!(games.get(&"3".into()).unwrap().other_actions.is_empty());
    }

    #[test]
    fn broken_launch_manifest_keeps_game() {
        let tmp = tempfile::tempdir().unwrap();
        let apps = tmp.path().join("apps");
        fs::create_dir_all(apps.join("game")).unwrap();
        fs::write(apps.join("game").join(manifest::FILE_NAME), "[[actions]").unwrap();

        let conn = create_db(tmp.path());
        add_game(&conn, 7, "Game", "game");
        add_location(&conn, "loc", &apps);
        add_cave(&conn, "c", 7, "loc", "game");
        drop(conn);

        let games = scan_installed_games(tmp.path()).unwrap();
        assert_eq!(games.len(), 1);
        assert!(games.get(&"7".into()).unwrap().other_actions.is_empty());
    }

    #[tokio::test]
    async fn adapter_without_app_is_client_not_installed() {
        let tmp = tempfile::tempdir().unwrap();
        let scanner = ItchLocalScanner::with_app_dir(tmp.path());
        let err = scanner
            .scan_installed(&ImportConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::ClientNotInstalled(_)));
    }
}
