use std::path::PathBuf;

use crate::SteamError;

/// Provides access to Steam directory paths.
#[derive(Debug, Clone)]
pub struct Paths {
    base_dir: PathBuf,
}

impl Paths {
    /// Creates a new `Paths` instance with auto-detected Steam directory.
    pub fn new() -> Result<Self, SteamError> {
        let base_dir = get_base_dir()?;
        Ok(Self { base_dir })
    }

    /// Creates a new `Paths` instance with a custom base directory.
    pub fn with_base(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Uses `base_dir` if given, otherwise detects the installation.
    ///
    /// An explicit directory that does not exist is reported as not found.
    pub fn resolve(base_dir: Option<PathBuf>) -> Result<Self, SteamError> {
        match base_dir {
            Some(dir) if dir.is_dir() => Ok(Self::with_base(dir)),
            Some(_) => Err(SteamError::NotFound),
            None => Self::new(),
        }
    }

    /// Returns the Steam base directory.
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Returns the `steamapps` directory of a library folder.
    pub fn steamapps_dir(library: &std::path::Path) -> PathBuf {
        library.join("steamapps")
    }

    /// Returns the path to libraryfolders.vdf.
    pub fn library_folders_path(&self) -> PathBuf {
        Self::steamapps_dir(&self.base_dir).join("libraryfolders.vdf")
    }

    /// Returns the path to loginusers.vdf.
    pub fn login_users_path(&self) -> PathBuf {
        self.base_dir.join("config").join("loginusers.vdf")
    }

    /// Returns the userdata directory.
    pub fn user_data_dir(&self) -> PathBuf {
        self.base_dir.join("userdata")
    }

    /// Returns the config directory for an account id.
    pub fn config_dir(&self, account_id: u32) -> PathBuf {
        self.user_data_dir()
            .join(account_id.to_string())
            .join("config")
    }

    /// Returns the path to localconfig.vdf for an account id.
    pub fn local_config_path(&self, account_id: u32) -> PathBuf {
        self.config_dir(account_id).join("localconfig.vdf")
    }

    /// Returns the Source mod directory.
    pub fn source_mods_dir(&self) -> PathBuf {
        registry_override("SourceModInstallPath")
            .unwrap_or_else(|| Self::steamapps_dir(&self.base_dir).join("sourcemods"))
    }

    /// Returns the GoldSrc mod directory (the Half-Life install).
    pub fn gold_src_mods_dir(&self) -> PathBuf {
        registry_override("ModInstallPath").unwrap_or_else(|| {
            Self::steamapps_dir(&self.base_dir)
                .join("common")
                .join("Half-Life")
        })
    }
}

// Platform-specific base directory detection.
#[cfg(target_os = "linux")]
fn get_base_dir() -> Result<PathBuf, SteamError> {
    crate::paths_linux::get_base_dir()
}

#[cfg(target_os = "windows")]
fn get_base_dir() -> Result<PathBuf, SteamError> {
    crate::paths_windows::get_base_dir()
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
fn get_base_dir() -> Result<PathBuf, SteamError> {
    Err(SteamError::NotFound)
}

#[cfg(target_os = "windows")]
fn registry_override(value: &str) -> Option<PathBuf> {
    crate::paths_windows::user_path_value(value)
}

#[cfg(not(target_os = "windows"))]
fn registry_override(_value: &str) -> Option<PathBuf> {
    None
}
