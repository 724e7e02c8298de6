use std::fmt;
use std::str::FromStr;

const APP_ID_MASK: u64 = 0x00FF_FFFF;
const MOD_ID_FLAG: u32 = 0x8000_0000;
const GAME_MOD_TYPE: u64 = 1;

/// Steam's 64-bit game id.
///
/// Layout: bits 0..24 app id, 24..32 game type, 32..64 mod id. Plain apps
/// render as their app id; mods render as the full 64-bit number, which is
/// also what `steam://rungameid/` expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SteamGameId(u64);

impl SteamGameId {
    pub fn app(app_id: u32) -> Self {
        Self(u64::from(app_id) & APP_ID_MASK)
    }

    pub fn game_mod(app_id: u32, mod_id: u32) -> Self {
        Self(
            (u64::from(app_id) & APP_ID_MASK)
                | (GAME_MOD_TYPE << 24)
                | (u64::from(mod_id) << 32),
        )
    }

    /// Id of a mod installed in `folder` for base game `app_id`.
    ///
    /// The mod id is the CRC32 of the folder name with the high bit set.
    pub fn for_mod_folder(app_id: u32, folder: &str) -> Self {
        Self::game_mod(app_id, crc32fast::hash(folder.as_bytes()) | MOD_ID_FLAG)
    }

    /// Parses an app key of `localconfig.vdf`.
    ///
    /// Plain keys are app ids; mods are keyed as `"<appId>_<modId>"`.
    pub fn parse_config_key(key: &str) -> Option<Self> {
        match key.split_once('_') {
            Some((app, game_mod)) => {
                let app = app.parse::<u32>().ok()?;
                let game_mod = game_mod.parse::<u32>().ok()?;
                Some(Self::game_mod(app, game_mod))
            }
            None => key.parse::<u32>().ok().map(Self::app),
        }
    }

    pub fn app_id(self) -> u32 {
        (self.0 & APP_ID_MASK) as u32
    }

    pub fn mod_id(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// `steam://rungameid/` launch URL.
    pub fn launch_url(self) -> String {
        format!("steam://rungameid/{self}")
    }
}

impl fmt::Display for SteamGameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SteamGameId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}
