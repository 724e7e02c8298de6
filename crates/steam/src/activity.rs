//! Last-played timestamps from `localconfig.vdf`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::SteamError;
use crate::game_id::SteamGameId;
use crate::paths::Paths;
use crate::users::steam_id_to_account_id;
use crate::vdf::{KeyValue, load_text_vdf};

/// Reads the last-played time of every app of user `steam_id`.
///
/// Mods are keyed `"<appId>_<modId>"` in the file and are returned under
/// their composed 64-bit id so they join with scanned mods.
pub fn last_activity(
    paths: &Paths,
    steam_id: u64,
) -> Result<HashMap<SteamGameId, DateTime<Utc>>, SteamError> {
    let path = paths.local_config_path(steam_id_to_account_id(steam_id));
    let kv = load_text_vdf(&path)?;
    let result = last_activity_from(&kv);
    debug!(path = %path.display(), count = result.len(), "last activity loaded");
    Ok(result)
}

fn last_activity_from(kv: &KeyValue) -> HashMap<SteamGameId, DateTime<Utc>> {
    let Some(apps) = kv.path(&["Software", "Valve", "Steam", "apps"]) else {
        return HashMap::new();
    };

    apps.children
        .iter()
        .filter(|app| !app.children.is_empty())
        .filter_map(|app| {
            let id = SteamGameId::parse_config_key(&app.name)?;
            // Never-played apps carry 0.
            let secs = app.u64("LastPlayed").filter(|s| *s > 0)?;
            let at = DateTime::from_timestamp(i64::try_from(secs).ok()?, 0)?;
            Some((id, at))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vdf::parse_text_vdf;
    use std::fs;

    const LOCAL_CONFIG: &str = r#"
"UserLocalConfigStore"
{
	"Software"
	{
		"Valve"
		{
			"Steam"
			{
				"Apps"
				{
					"440"
					{
						"LastPlayed"		"1700000000"
						"Playtime"		"12"
					}
					"215_2287856061"
					{
						"LastPlayed"		"1600000000"
					}
					"620"
					{
						"LastPlayed"		"0"
					}
					"bogus_key"
					{
						"LastPlayed"		"1"
					}
					"730"		""
				}
			}
		}
	}
}
"#;

    #[test]
    fn parses_apps_and_mods() {
        let kv = parse_text_vdf(LOCAL_CONFIG.as_bytes()).unwrap();
        let result = last_activity_from(&kv);

        assert_eq!(result.len(), 2);
        assert_eq!(
            result[&SteamGameId::app(440)],
            DateTime::from_timestamp(1_700_000_000, 0).unwrap()
        );
        assert_eq!(
            result[&SteamGameId::game_mod(215, 2_287_856_061)],
            DateTime::from_timestamp(1_600_000_000, 0).unwrap()
        );
        assert!(!result.contains_key(&SteamGameId::app(620)));
    }

    #[test]
    fn missing_apps_section_is_empty() {
        let kv = parse_text_vdf(br#""UserLocalConfigStore" { "friends" { } }"#).unwrap();
        assert!(last_activity_from(&kv).is_empty());
    }

    #[test]
    fn reads_from_userdata() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = Paths::with_base(tmp.path());
        let steam_id = 76561197960287930;
        let config = paths.local_config_path(22202);
        fs::create_dir_all(config.parent().unwrap()).unwrap();
        fs::write(&config, LOCAL_CONFIG).unwrap();

        let result = last_activity(&paths, steam_id).unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn missing_file_errors() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(last_activity(&Paths::with_base(tmp.path()), 1).is_err());
    }
}
