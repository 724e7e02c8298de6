//! `.itch.toml` launch manifests shipped inside game folders.

use std::path::{Path, PathBuf};

use gamedock_library::{ActionKind, GameAction};
use serde::Deserialize;

use crate::ItchError;

pub const FILE_NAME: &str = ".itch.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LaunchManifest {
    #[serde(default)]
    pub actions: Vec<ManifestAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestAction {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl LaunchManifest {
    pub fn parse(content: &str) -> Result<Self, ItchError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ItchError> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    /// Actions other than `play`, which the itch app handles itself.
    pub fn other_actions(&self, install_dir: &Path) -> Vec<GameAction> {
        self.actions
            .iter()
            .filter(|action| !action.name.eq_ignore_ascii_case("play"))
            .map(|action| action.to_game_action(install_dir))
            .collect()
    }
}

impl ManifestAction {
    fn to_game_action(&self, install_dir: &Path) -> GameAction {
        let is_url = is_http_url(&self.path);
        GameAction {
            name: self.name.clone(),
            kind: if is_url { ActionKind::Url } else { ActionKind::File },
            path: self.path.clone(),
            arguments: (!self.args.is_empty()).then(|| self.args.join(" ")),
            working_dir: (!is_url).then(|| install_dir.to_string_lossy().into_owned()),
        }
    }
}

fn is_http_url(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// First manifest in `dir`, then in its subdirectories in name order.
///
/// Unreadable directories are skipped.
pub fn find(dir: &Path) -> Option<PathBuf> {
    let candidate = dir.join(FILE_NAME);
    if candidate.is_file() {
        return Some(candidate);
    }

    let mut subdirs: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .map(|entry| entry.path())
        .collect();
    subdirs.sort();
    subdirs.iter().find_map(|sub| find(sub))
}
