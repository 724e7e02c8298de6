use std::fs;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

use crate::OriginError;

/// The install location recorded in an Origin `.mfst` package manifest.
///
/// The file is a single url-encoded query string, e.g.
/// `?currentstate=kReadyToStart&id=OFB-EAST%3a52017&dipinstallpath=C%3a%5cGames%5cBF1%5c`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub install_path: Option<PathBuf>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, OriginError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, OriginError> {
        let query = content.trim().trim_start_matches('?');
        if query.is_empty() {
            return Err(OriginError::Manifest("empty manifest".into()));
        }

        let mut manifest = Manifest::default();
        for pair in query.split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            let value = percent_decode_str(value).decode_utf8_lossy().into_owned();
            if value.is_empty() {
                continue;
            }
            if key.eq_ignore_ascii_case("dipinstallpath") {
                manifest.install_path = Some(install_path(&value));
            }
        }
        Ok(manifest)
    }
}

/// Strips the trailing separator Origin writes after install paths.
fn install_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim_end_matches(['\\', '/']);
    PathBuf::from(if trimmed.is_empty() { raw } else { trimmed })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_manifest() {
        let m = Manifest::parse(
            "?currentstate=kReadyToStart&id=OFB-EAST%3a52017\
             &dipinstallpath=%2fgames%2fBattlefield%201%2f&previousstate=kInstalling",
        )
        .unwrap();
        assert_eq!(m.install_path, Some(PathBuf::from("/games/Battlefield 1")));
    }

    #[test]
    fn windows_path_trailing_separator() {
        let m = Manifest::parse("?dipinstallpath=C%3a%5cGames%5cBF1%5c").unwrap();
        assert_eq!(m.install_path, Some(PathBuf::from(r"C:\Games\BF1")));
    }

    #[test]
    fn missing_and_empty_fields() {
        let m = Manifest::parse("?id=&dipinstallpath&currentstate=kPaused").unwrap();
        assert!(m.install_path.is_none());

        let m = Manifest::parse("?DipInstallPath=&currentstate=kPaused").unwrap();
        assert!(m.install_path.is_none());
    }

    #[test]
    fn empty_manifest_errors() {
        assert!(Manifest::parse("").is_err());
        assert!(Manifest::parse("  ?  ").is_err());
    }

    #[test]
    fn load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("OFB-EAST52017.mfst");
        fs::write(&path, "?id=OFB-EAST%3a52017&dipinstallpath=%2fgames%2fbf1").unwrap();
        let m = Manifest::load(&path).unwrap();
        assert_eq!(m.install_path, Some(PathBuf::from("/games/bf1")));
    }
}
