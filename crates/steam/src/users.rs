use serde::{Deserialize, Serialize};

use crate::SteamError;
use crate::paths::Paths;
use crate::vdf::load_text_vdf;

/// A Steam account that has logged in on this machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// SteamID64.
    pub id: u64,
    pub account_name: String,
    pub persona_name: String,
    pub most_recent: bool,
}

impl User {
    /// The 32-bit account id used for `userdata/<id>` directories.
    pub fn account_id(&self) -> u32 {
        steam_id_to_account_id(self.id)
    }
}

/// Lower 32 bits of a SteamID64.
pub fn steam_id_to_account_id(steam_id: u64) -> u32 {
    (steam_id & 0xFFFF_FFFF) as u32
}

/// Returns the users listed in `config/loginusers.vdf`.
///
/// A missing file means no user ever logged in and yields an empty list.
pub fn get_users_with_paths(paths: &Paths) -> Result<Vec<User>, SteamError> {
    let path = paths.login_users_path();
    if !path.exists() {
        return Ok(Vec::new());
    }

    let kv = load_text_vdf(&path)?;
    let mut users = Vec::new();
    for entry in &kv.children {
        // Skip anything that is not a SteamID64 object.
        let Ok(id) = entry.name.parse::<u64>() else {
            continue;
        };
        if !entry.is_object() {
            continue;
        }

        users.push(User {
            id,
            account_name: entry.str("AccountName").unwrap_or_default().to_string(),
            persona_name: entry.str("PersonaName").unwrap_or_default().to_string(),
            most_recent: entry.bool("MostRecent"),
        });
    }

    Ok(users)
}

/// Returns the most recently logged-in user, or the first user if none is
/// flagged.
pub fn get_most_recent_user(paths: &Paths) -> Result<Option<User>, SteamError> {
    let users = get_users_with_paths(paths)?;

    for u in &users {
        if u.most_recent {
            return Ok(Some(u.clone()));
        }
    }

    Ok(users.into_iter().next())
}
