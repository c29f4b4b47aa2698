use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_DIR: &str = "nodistractions";
pub const DEFAULT_LOG: &str = "work_log.txt";
pub const MAX_TICK_SECS: u64 = 3600;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    pub log_path: PathBuf,
    pub notifications: bool,
    pub tick_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from(DEFAULT_LOG),
            notifications: true,
            tick_secs: 1,
        }
    }
}

impl Config {
    pub fn tick(&self) -> Duration {
        Duration::from_secs(self.tick_secs.clamp(1, MAX_TICK_SECS))
    }
}

/// Path of a file inside the per-directory state folder.
pub fn get_path(filename: &str) -> PathBuf {
    let mut path = PathBuf::from(".");
    path.push(APP_DIR);
    path.push(filename);
    path
}

/// Reads the config at `path`. `Ok(None)` when the file does not exist yet.
pub fn load(path: &Path) -> Result<Option<Config>, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(error) => return Err(ConfigError::Read(error)),
    };
    serde_json::from_str(&raw).map(Some).map_err(ConfigError::Parse)
}

pub fn save(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(ConfigError::Write)?;
    }
    let text = serde_json::to_string_pretty(config).map_err(ConfigError::Encode)?;
    fs::write(path, text).map_err(ConfigError::Write)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_config_is_none() {
        let dir = tempdir().expect("tempdir");
        assert_eq!(load(&dir.path().join("config.json")).expect("load"), None);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "notifications": false }"#).expect("write");

        let config = load(&path).expect("load").expect("config");
        assert!(!config.notifications);
        assert_eq!(config.log_path, PathBuf::from(DEFAULT_LOG));
        assert_eq!(config.tick(), Duration::from_secs(1));
    }

    #[test]
    fn saves_and_reloads() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("state/config.json");
        let config = Config {
            log_path: PathBuf::from("/tmp/focus.txt"),
            notifications: false,
            tick_secs: 2,
        };
        save(&path, &config).expect("save");
        assert_eq!(load(&path).expect("load"), Some(config));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").expect("write");
        assert!(matches!(load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn zero_tick_is_clamped() {
        let config = Config { tick_secs: 0, ..Config::default() };
        assert_eq!(config.tick(), Duration::from_secs(1));
    }

    #[test]
    fn huge_tick_is_clamped() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "tick_secs": 18446744073709551615 }"#).expect("write");

        let config = load(&path).expect("load").expect("config");
        assert_eq!(config.tick(), Duration::from_secs(MAX_TICK_SECS));
    }
}
