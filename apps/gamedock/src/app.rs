//! Import orchestration: runs every enabled connector and prints the catalog.

use std::sync::Arc;

use gamedock_itchio::{ITCHIO, ItchAccount, ItchLocalScanner};
use gamedock_library::{
    GameRecord, ImportConfig, LibraryImporter, LocalInstallAdapter, NotificationLevel,
    NotificationSink, RemoteAccountAdapter,
};
use gamedock_notifications::NotificationCenter;
use gamedock_origin::{ORIGIN, OriginAccount, OriginLocalScanner};
use gamedock_steam::{STEAM, SteamAccount, SteamLocalScanner};
use tracing::{info, warn};

use crate::config::{Config, ItchioSettings, OriginSettings, SteamSettings};

type SteamImporter = LibraryImporter<SteamLocalScanner, SteamAccount>;
type OriginImporter = LibraryImporter<OriginLocalScanner, OriginAccount>;
type ItchioImporter = LibraryImporter<ItchLocalScanner, ItchAccount>;

/// Main application loop.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let store_path = config.notifications_path()?;
    let center = match NotificationCenter::load(&store_path) {
        Ok(center) => Arc::new(center),
        Err(e) => {
            warn!(
                path = %store_path.display(),
                error = %e,
                "notification store unreadable, starting empty"
            );
            Arc::new(NotificationCenter::new())
        }
    };

    let catalog = import_all(&config, center.clone()).await?;

    for notification in center.by_level(NotificationLevel::Error) {
        warn!(id = %notification.id, "{}", notification.message);
    }
    center.save(&store_path)?;

    println!("{}", serde_json::to_string_pretty(&catalog)?);
    info!(games = catalog.len(), "catalog written");
    Ok(())
}

/// Runs every enabled importer concurrently and concatenates their catalogs.
async fn import_all(
    config: &Config,
    sink: Arc<dyn NotificationSink>,
) -> anyhow::Result<Vec<GameRecord>> {
    let steam = steam_importer(config, sink.clone())?;
    let origin = origin_importer(config, sink.clone())?;
    let itchio = itchio_importer(config, sink);

    let (mut games, origin_games, itchio_games) = tokio::join!(
        import(steam.as_ref(), &config.steam.import),
        import(origin.as_ref(), &config.origin.import),
        import(itchio.as_ref(), &config.itchio.import),
    );
    games.extend(origin_games);
    games.extend(itchio_games);
    Ok(games)
}

async fn import<L, R>(
    importer: Option<&LibraryImporter<L, R>>,
    config: &ImportConfig,
) -> Vec<GameRecord>
where
    L: LocalInstallAdapter,
    R: RemoteAccountAdapter,
{
    let Some(importer) = importer else {
        return Vec::new();
    };
    match importer.run(config).await {
        Ok(outcome) => {
            if let Some(error) = &outcome.error {
                warn!(
                    platform = importer.platform().name,
                    error = %error,
                    "import finished with errors"
                );
            }
            outcome.games
        }
        Err(e) => {
            warn!(error = %e, "import skipped");
            Vec::new()
        }
    }
}

fn steam_importer(
    config: &Config,
    sink: Arc<dyn NotificationSink>,
) -> anyhow::Result<Option<SteamImporter>> {
    let SteamSettings {
        enabled,
        install_dir,
        user_id,
        api_key,
        include_free_sub,
        ..
    } = &config.steam;
    if !enabled {
        return Ok(None);
    }

    let local = match install_dir {
        Some(dir) => SteamLocalScanner::with_base(dir.clone()),
        None => SteamLocalScanner::new(),
    };
    let remote = SteamAccount::new(api_key.clone(), *user_id)?
        .with_base_dir(install_dir.clone())
        .with_free_sub(*include_free_sub);

    let importer = LibraryImporter::new(STEAM, local, remote, sink);
    Ok(Some(with_timeout(importer, config)))
}

fn origin_importer(
    config: &Config,
    sink: Arc<dyn NotificationSink>,
) -> anyhow::Result<Option<OriginImporter>> {
    let OriginSettings {
        enabled,
        data_dir,
        user_id,
        access_token,
        ..
    } = &config.origin;
    if !enabled {
        return Ok(None);
    }

    let local = match data_dir {
        Some(dir) => OriginLocalScanner::new()?.with_data_dir(dir.clone()),
        None => OriginLocalScanner::new()?,
    };
    let remote = OriginAccount::new(access_token.as_deref(), *user_id)?;

    let importer = LibraryImporter::new(ORIGIN, local, remote, sink);
    Ok(Some(with_timeout(importer, config)))
}

fn itchio_importer(config: &Config, sink: Arc<dyn NotificationSink>) -> Option<ItchioImporter> {
    let ItchioSettings { enabled, app_dir, .. } = &config.itchio;
    if !enabled {
        return None;
    }

    let (local, remote) = match app_dir {
        Some(dir) => (
            ItchLocalScanner::with_app_dir(dir.clone()),
            ItchAccount::with_app_dir(dir.clone()),
        ),
        None => (ItchLocalScanner::new(), ItchAccount::new()),
    };

    let importer = LibraryImporter::new(ITCHIO, local, remote, sink);
    Some(with_timeout(importer, config))
}

fn with_timeout<L, R>(importer: LibraryImporter<L, R>, config: &Config) -> LibraryImporter<L, R>
where
    L: LocalInstallAdapter,
    R: RemoteAccountAdapter,
{
    match config.adapter_timeout() {
        Some(timeout) => importer.with_timeout(timeout),
        None => importer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config(steam_dir: &std::path::Path, origin_dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.steam.install_dir = Some(steam_dir.to_path_buf());
        config.origin.data_dir = Some(origin_dir.to_path_buf());
        config
    }

    #[tokio::test]
    async fn disabled_connectors_import_nothing() {
        let mut config = Config::default();
        config.steam.enabled = false;
        config.origin.enabled = false;
        let center = Arc::new(NotificationCenter::new());

        let games = import_all(&config, center.clone()).await.unwrap();
        assert!(games.is_empty());
        assert!(center.is_empty());
    }

    #[tokio::test]
    async fn catalog_concatenates_platforms() {
        let tmp = tempfile::tempdir().unwrap();

        let steam = tmp.path().join("steam");
        let steamapps = steam.join("steamapps");
        fs::create_dir_all(steamapps.join("common").join("Portal")).unwrap();
        fs::write(
            steamapps.join("appmanifest_400.acf"),
            "\"AppState\"\n{\n\t\"appid\"\t\"400\"\n\t\"name\"\t\"Portal\"\n\
             \t\"installdir\"\t\"Portal\"\n}\n",
        )
        .unwrap();

        let origin = tmp.path().join("origin");
        fs::create_dir_all(origin.join("LocalContent")).unwrap();

        let mut config = config(&steam, &origin);
        config.steam.import.include_mods = false;
        let center = Arc::new(NotificationCenter::new());

        let games = import_all(&config, center.clone()).await.unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].name, "Portal");
        assert_eq!(games[0].source, "steam");
        assert!(center.is_empty());
    }

    #[tokio::test]
    async fn failing_platform_leaves_notification() {
        let tmp = tempfile::tempdir().unwrap();
        let origin = tmp.path().join("origin");
        fs::create_dir_all(&origin).unwrap();

        let config = config(&tmp.path().join("no-steam-here"), &origin);
        let center = Arc::new(NotificationCenter::new());

        let games = import_all(&config, center.clone()).await.unwrap();
        assert!(games.is_empty());
        assert!(center.get(&STEAM.notification_id()).is_some());
        assert!(center.get(&ORIGIN.notification_id()).is_none());
        assert!(center.get(&ITCHIO.notification_id()).is_none());
    }

    #[tokio::test]
    async fn enabled_itchio_without_app_leaves_notification() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.steam.enabled = false;
        config.origin.enabled = false;
        config.itchio.enabled = true;
        config.itchio.app_dir = Some(tmp.path().join("itch"));
        let center = Arc::new(NotificationCenter::new());

        let games = import_all(&config, center.clone()).await.unwrap();
        assert!(games.is_empty());
        let notification = center.get(&ITCHIO.notification_id()).unwrap();
        assert_eq!(notification.level, NotificationLevel::Error);
        assert_eq!(center.by_level(NotificationLevel::Error).len(), 1);
    }
}
