//! Configuration for the studioops binary.
//!
//! `~/.studioops/config.json` identifies the studio owner and optionally
//! points at a non-default database file. The `STUDIOOPS_OWNER` environment
//! variable overrides the owner so headless schedulers can run the refresh
//! without a config file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::CallerIdentity;

/// Environment override for the owner id.
pub const OWNER_ENV_VAR: &str = "STUDIOOPS_OWNER";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Studio owner all reads and writes are partitioned by.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    /// Database file override; defaults to `~/.studioops/studioops.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
}

/// Path of the config file: `~/.studioops/config.json`.
pub fn config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".studioops").join("config.json"))
}

/// Load the config file. A missing file reads as an empty config so the env
/// override still works on a fresh machine; a file that exists but does not
/// parse is an error worth surfacing.
pub fn load_config() -> Result<Config, String> {
    load_config_from(&config_path()?)
}

fn load_config_from(path: &Path) -> Result<Config, String> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read config: {}", e))?;
    serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))
}

/// Resolve the caller identity: `STUDIOOPS_OWNER` wins over the config file,
/// and blank values count as unset.
pub fn resolve_identity(config: &Config) -> Option<CallerIdentity> {
    let owner = std::env::var(OWNER_ENV_VAR)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| config.owner_id.clone().filter(|v| !v.trim().is_empty()))?;
    Some(CallerIdentity { owner_id: owner })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reads_as_empty_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config_from(&dir.path().join("config.json")).expect("load");
        assert!(config.owner_id.is_none());
        assert!(config.db_path.is_none());
    }

    #[test]
    fn test_parse_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "ownerId": "owner-1", "dbPath": "/tmp/studio.db" }"#,
        )
        .expect("write");

        let config = load_config_from(&path).expect("load");
        assert_eq!(config.owner_id.as_deref(), Some("owner-1"));
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/studio.db")));
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").expect("write");
        assert!(load_config_from(&path).is_err());
    }

    /// One test covers the whole precedence chain: env mutation is process
    /// global, so splitting these cases into parallel tests would race.
    #[test]
    fn test_resolve_identity_precedence() {
        std::env::remove_var(OWNER_ENV_VAR);

        let empty = Config::default();
        assert!(resolve_identity(&empty).is_none());

        let configured = Config {
            owner_id: Some("cfg-owner".to_string()),
            db_path: None,
        };
        assert_eq!(
            resolve_identity(&configured).map(|i| i.owner_id),
            Some("cfg-owner".to_string())
        );

        std::env::set_var(OWNER_ENV_VAR, "env-owner");
        assert_eq!(
            resolve_identity(&configured).map(|i| i.owner_id),
            Some("env-owner".to_string())
        );

        // Blank env value falls back to the file.
        std::env::set_var(OWNER_ENV_VAR, "   ");
        assert_eq!(
            resolve_identity(&configured).map(|i| i.owner_id),
            Some("cfg-owner".to_string())
        );

        std::env::remove_var(OWNER_ENV_VAR);
    }
}
