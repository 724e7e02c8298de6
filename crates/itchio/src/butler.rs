//! Read-only access to butler's SQLite database.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags, Row, params};

use crate::ItchError;

/// A game as butler caches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItchGame {
    pub id: i64,
    pub title: String,
    pub classification: String,
}

impl ItchGame {
    /// Games and tools; assets, soundtracks, books and the like are not.
    pub fn is_importable(&self) -> bool {
        matches!(self.classification.as_str(), "game" | "tool")
    }

    fn from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(offset)?,
            title: row.get::<_, Option<String>>(offset + 1)?.unwrap_or_default(),
            classification: row.get::<_, Option<String>>(offset + 2)?.unwrap_or_default(),
        })
    }
}

/// An installed copy of a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cave {
    pub id: String,
    pub game: ItchGame,
    /// `None` when the install location is gone from the database.
    pub install_folder: Option<PathBuf>,
}

/// An open butler database.
pub struct ButlerDb {
    conn: Connection,
}

impl ButlerDb {
    /// Database path inside the itch app data directory.
    pub fn path(app_dir: &Path) -> PathBuf {
        app_dir.join("db").join("butler.db")
    }

    /// Opens the database of the itch app at `app_dir` read-only.
    pub fn open(app_dir: &Path) -> Result<Self, ItchError> {
        let path = Self::path(app_dir);
        if !path.is_file() {
            return Err(ItchError::NotInstalled);
        }
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Every cave with its game, oldest install first.
    pub fn caves(&self) -> Result<Vec<Cave>, ItchError> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.custom_install_folder, c.install_folder_name, l.path,
                    g.id, g.title, g.classification
             FROM caves c
             JOIN games g ON g.id = c.game_id
             LEFT JOIN install_locations l ON l.id = c.install_location_id
             ORDER BY c.installed_at, c.id",
        )?;
        let caves = stmt
            .query_map([], |row| {
                let custom: Option<String> = row.get(1)?;
                let folder_name: Option<String> = row.get(2)?;
                let location: Option<String> = row.get(3)?;
                Ok(Cave {
                    id: row.get(0)?,
                    game: ItchGame::from_row(row, 4)?,
                    install_folder: install_folder(custom, location, folder_name),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(caves)
    }

    /// Ids of the logged in profiles.
    pub fn profiles(&self) -> Result<Vec<i64>, ItchError> {
        let mut stmt = self.conn.prepare("SELECT id FROM profiles ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    /// Games `profile_id` holds a download key for.
    pub fn owned_games(&self, profile_id: i64) -> Result<Vec<ItchGame>, ItchError> {
        let mut stmt = self.conn.prepare(
            "SELECT g.id, g.title, g.classification
             FROM download_keys k
             JOIN games g ON g.id = k.game_id
             WHERE k.owner_id = ?1
             ORDER BY k.id",
        )?;
        let games = stmt
            .query_map(params![profile_id], |row| ItchGame::from_row(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(games)
    }
}

/// A custom folder wins; otherwise the folder name under its location.
fn install_folder(
    custom: Option<String>,
    location: Option<String>,
    folder_name: Option<String>,
) -> Option<PathBuf> {
    if let Some(custom) = custom.filter(|c| !c.is_empty()) {
        return Some(PathBuf::from(custom));
    }
    Some(Path::new(&location?).join(folder_name.filter(|n| !n.is_empty())?))
}
