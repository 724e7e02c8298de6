//! Local install adapter: `LocalContent` package manifests.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use gamedock_library::{
    AdapterError, GameAction, GameId, GameMap, GameRecord, IdNormalizer, ImportConfig,
    LocalInstallAdapter,
};
use tracing::{debug, error, info};

use crate::api::CatalogClient;
use crate::manifest::Manifest;
use crate::{ORIGIN, OriginError, OriginIds, default_data_dir, launch_url};

/// Scans Origin's `LocalContent` directory for installed games.
pub struct OriginLocalScanner {
    data_dir: Option<PathBuf>,
    catalog: CatalogClient,
}

/// A package whose install directory exists.
#[derive(Debug, Clone, PartialEq, Eq)]
struct InstalledPackage {
    game_id: GameId,
    install_dir: PathBuf,
}

impl InstalledPackage {
    fn folder_name(&self) -> &str {
        self.install_dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(self.game_id.as_str())
    }
}

impl OriginLocalScanner {
    /// Scanner for the default data directory.
    pub fn new() -> Result<Self, OriginError> {
        Ok(Self {
            data_dir: None,
            catalog: CatalogClient::new()?,
        })
    }

    /// Scans the data directory at `data_dir` instead.
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(data_dir.into());
        self
    }

    #[cfg(test)]
    pub(crate) fn with_catalog(mut self, catalog: CatalogClient) -> Self {
        self.catalog = catalog;
        self
    }

    /// Collects packages off the async runtime, then keeps the ones the
    /// catalog lists as games or demos.
    ///
    /// An offer that cannot be looked up is skipped, as is DLC, which
    /// points at its base game's folder.
    async fn scan(&self) -> Result<GameMap, AdapterError> {
        let data_dir = self.data_dir.clone();
        let packages =
            tokio::task::spawn_blocking(move || match data_dir.or_else(default_data_dir) {
                Some(dir) => installed_packages(&dir),
                None => {
                    info!("Origin data directory unknown, no installed games");
                    Ok(Vec::new())
                }
            })
            .await
            .map_err(|e| AdapterError::Other(format!("Origin scan task failed: {e}")))??;

        let ids = OriginIds;
        let mut games = GameMap::new();
        for package in packages {
            if games.contains(&package.game_id) {
                continue;
            }

            let offer = match self.catalog.offer(package.game_id.as_str()).await {
                Ok(Some(offer)) => offer,
                Ok(None) => {
                    debug!(id = %package.game_id, "offer not in the Origin catalog, skipping");
                    continue;
                }
                Err(e) => {
                    error!(id = %package.game_id, error = %e, "failed to look up Origin offer");
                    continue;
                }
            };
            if !offer.is_importable() {
                debug!(
                    id = %package.game_id,
                    offer_type = %offer.offer_type,
                    "not a game, skipping"
                );
                continue;
            }

            let name = ids.normalize_name(offer.display_name().unwrap_or(package.folder_name()));
            let action = GameAction::play_url(launch_url(&package.game_id));
            games.insert_first(
                GameRecord::installed(ORIGIN.id, package.game_id, name, package.install_dir)
                    .with_play_action(action),
            );
        }

        debug!(count = games.len(), "Origin installed games scanned");
        Ok(games)
    }
}

impl LocalInstallAdapter for OriginLocalScanner {
    fn scan_installed<'a>(
        &'a self,
        _config: &'a ImportConfig,
    ) -> Pin<Box<dyn Future<Output = Result<GameMap, AdapterError>> + Send + 'a>> {
        Box::pin(self.scan())
    }
}

/// Reads every `.mfst` under `<data_dir>/LocalContent`, in path order.
///
/// A manifest that cannot be read, or whose install directory is missing,
/// is skipped; only failing to walk the directory fails the scan.
fn installed_packages(data_dir: &Path) -> Result<Vec<InstalledPackage>, OriginError> {
    let content = data_dir.join("LocalContent");
    if !content.is_dir() {
        debug!(path = %content.display(), "no Origin LocalContent directory");
        return Ok(Vec::new());
    }

    let mut manifests = Vec::new();
    walk_dir(&content, &mut manifests)?;
    manifests.sort();

    let mut packages = Vec::new();
    for manifest in manifests {
        match installed_package(&manifest) {
            Ok(Some(package)) => packages.push(package),
            Ok(None) => {}
            Err(e) => {
                error!(
                    path = %manifest.display(),
                    error = %e,
                    "failed to import installed Origin game"
                );
            }
        }
    }
    Ok(packages)
}

fn walk_dir(current: &Path, manifests: &mut Vec<PathBuf>) -> Result<(), OriginError> {
    for entry in std::fs::read_dir(current)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            walk_dir(&path, manifests)?;
        } else if file_type.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("mfst"))
        {
            manifests.push(path);
        }
    }
    Ok(())
}

fn installed_package(manifest: &Path) -> Result<Option<InstalledPackage>, OriginError> {
    let stem = manifest
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| OriginError::Manifest("non UTF-8 manifest name".into()))?;
    let game_id = OriginIds.normalize_id(stem);

    let Some(install_dir) = Manifest::load(manifest)?.install_path.filter(|p| p.is_dir()) else {
        debug!(id = %game_id, "Origin game is not installed, skipping");
        return Ok(None);
    };
    Ok(Some(InstalledPackage {
        game_id,
        install_dir,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::mock_server;
    use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
    use std::fs;

    const BF1_OFFER: &str = r#"{"offerId":"OFB-EAST:52017","offerType":"Base Game",
        "localizableAttributes":{"displayName":"Battlefield™ 1"}}"#;
    const BF1_DLC_OFFER: &str = r#"{"offerId":"OFB-EAST:109552316","offerType":"Extra Content",
        "localizableAttributes":{"displayName":"Battlefield 1 They Shall Not Pass"}}"#;
    const SIMS_OFFER: &str = r#"{"offerId":"Origin.OFR.50.0001452","offerType":"Base Game",
        "localizableAttributes":{"displayName":"The Sims™ 4 Standard Edition"}}"#;

    fn write_package(data_dir: &Path, sub: &str, file: &str, install: &Path) {
        let dir = data_dir.join("LocalContent").join(sub);
        fs::create_dir_all(&dir).unwrap();
        let path = install.to_string_lossy();
        let encoded = utf8_percent_encode(&path, NON_ALPHANUMERIC);
        fs::write(
            dir.join(file),
            format!("?currentstate=kReadyToStart&dipinstallpath={encoded}"),
        )
        .unwrap();
    }

    fn scanner(data_dir: &Path, url: String) -> OriginLocalScanner {
        OriginLocalScanner::new()
            .unwrap()
            .with_data_dir(data_dir)
            .with_catalog(CatalogClient::new().unwrap().with_base_url(url))
    }

    async fn scan(scanner: &OriginLocalScanner) -> GameMap {
        scanner
            .scan_installed(&ImportConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn scans_nested_manifests() {
        let (url, requests, handle) = mock_server(vec![
            ("/ecommerce2/public/OFB-EAST:52017/", 200, BF1_OFFER),
            ("/ecommerce2/public/Origin.OFR.50.0001452/", 200, SIMS_OFFER),
        ])
        .await;

        let tmp = tempfile::tempdir().unwrap();
        let data = tmp.path().join("Origin");
        let bf1 = tmp.path().join("Games").join("Battlefield 1");
        let sims = tmp.path().join("Games").join("The Sims 4");
        fs::create_dir_all(&bf1).unwrap();
        fs::create_dir_all(&sims).unwrap();

        write_package(&data, "Battlefield 1", "OFB-EAST52017.mfst", &bf1);
        write_package(&data, "Sims/Base", "Origin.OFR.50.0001452.mfst", &sims);
        write_package(&data, "Gone", "OFB-EAST1.mfst", &tmp.path().join("missing"));
        fs::write(data.join("LocalContent").join("readme.txt"), "x").unwrap();

        let games = scan(&scanner(&data, url)).await;
        assert_eq!(games.len(), 2);

        let bf = games.get(&"OFB-EAST:52017".into()).unwrap();
        assert_eq!(bf.name, "Battlefield 1");
        assert!(bf.is_installed);
        assert_eq!(bf.source, "origin");
        assert_eq!(bf.install_directory.as_deref(), Some(bf1.as_path()));
        assert_eq!(
            bf.play_action.as_ref().unwrap().path,
            "origin://launchgame/OFB-EAST:52017"
        );

        let sims = games.get(&"Origin.OFR.50.0001452".into()).unwrap();
        assert_eq!(sims.name, "The Sims 4");

        // The uninstalled package is never looked up.
        assert_eq!(requests.lock().unwrap().len(), 2);

        handle.abort();
    }

    #[tokio::test]
    async fn dlc_sharing_the_game_folder_is_skipped() {
        let (url, _requests, handle) = mock_server(vec![
            ("/ecommerce2/public/OFB-EAST:52017/", 200, BF1_OFFER),
            ("/ecommerce2/public/OFB-EAST:109552316/", 200, BF1_DLC_OFFER),
        ])
        .await;

        let tmp = tempfile::tempdir().unwrap();
        let bf1 = tmp.path().join("Battlefield 1");
        fs::create_dir_all(&bf1).unwrap();
        write_package(tmp.path(), "Battlefield 1", "OFB-EAST52017.mfst", &bf1);
        write_package(tmp.path(), "Battlefield 1", "OFB-EAST109552316.mfst", &bf1);

        let games = scan(&scanner(tmp.path(), url)).await;
        assert_eq!(games.len(), 1);
        assert!(games.contains(&"OFB-EAST:52017".into()));

        handle.abort();
    }

    #[tokio::test]
    async fn unknown_or_failing_offers_are_skipped() {
        let (url, _requests, handle) = mock_server(vec![
            ("/ecommerce2/public/OFB-EAST:52017/", 200, BF1_OFFER),
            ("/ecommerce2/public/OFB-EAST:2/", 500, "down"),
        ])
        .await;

        let tmp = tempfile::tempdir().unwrap();
        for name in ["bf1", "flaky", "delisted"] {
            fs::create_dir_all(tmp.path().join(name)).unwrap();
        }
        write_package(tmp.path(), "", "OFB-EAST52017.mfst", &tmp.path().join("bf1"));
        write_package(tmp.path(), "", "OFB-EAST2.mfst", &tmp.path().join("flaky"));
        write_package(tmp.path(), "", "OFB-EAST3.mfst", &tmp.path().join("delisted"));

        let games = scan(&scanner(tmp.path(), url)).await;
        let ids: Vec<&str> = games.iter().map(|g| g.game_id.as_str()).collect();
        assert_eq!(ids, vec!["OFB-EAST:52017"]);

        handle.abort();
    }

    #[tokio::test]
    async fn name_falls_back_to_install_folder() {
        let (url, _requests, handle) = mock_server(vec![(
            "/ecommerce2/public/DR:225064/",
            200,
            r#"{"offerId":"DR:225064","offerType":"DEMO"}"#,
        )])
        .await;

        let tmp = tempfile::tempdir().unwrap();
        let game = tmp.path().join("Mass Effect™");
        fs::create_dir_all(&game).unwrap();
        write_package(tmp.path(), "", "DR225064.mfst", &game);

        let games = scan(&scanner(tmp.path(), url)).await;
        let record = games.get(&"DR:225064".into()).unwrap();
        assert_eq!(record.name, "Mass Effect");

        handle.abort();
    }

    #[test]
    fn broken_manifest_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let content = tmp.path().join("LocalContent");
        fs::create_dir_all(&content).unwrap();
        fs::write(content.join("OFB-EAST2.mfst"), "").unwrap();

        assert!(installed_packages(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_local_content_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(installed_packages(tmp.path()).unwrap().is_empty());
    }
}
