//! Host settings loaded from YAML.
//!
//! ```yaml
//! data_dir: ~/.local/share/serene
//! user: user-1          # omit to run signed out
//! poll_interval_ms: 500
//! ```
//!
//! Lookup order: `--config`, then `$SERENE_CONFIG`, then `./serene.yaml`.
//! A missing default file means defaults; an explicitly named file must
//! exist.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable naming the settings file.
pub const CONFIG_ENV: &str = "SERENE_CONFIG";
/// Settings file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "serene.yaml";

/// Host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory holding the profile document and the local cache.
    pub data_dir: PathBuf,
    /// Signed-in user, if any.
    pub user: Option<String>,
    /// How often the OS preference is re-read while watching.
    pub poll_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".serene"),
            user: None,
            poll_interval_ms: 1000,
        }
    }
}

impl Settings {
    /// Loads settings from the first configured location.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            return Self::from_file(fallback);
        }
        Ok(Self::default())
    }

    /// Parses a settings file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Parses settings from YAML text. Empty text yields defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Applies command-line overrides.
    pub fn with_overrides(mut self, data_dir: Option<PathBuf>, user: Option<String>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        if user.is_some() {
            self.user = user;
        }
        self
    }

    /// Path of the profile document standing in for the remote store.
    pub fn profiles_path(&self) -> PathBuf {
        self.data_dir.join("profiles.json")
    }

    /// Path of the device-local cache.
    pub fn cache_path(&self) -> PathBuf {
        self.data_dir.join("cache.json")
    }

    /// The OS preference poll interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(50))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(Settings::from_yaml("").unwrap(), Settings::default());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let settings = Settings::from_yaml("user: u1\n").unwrap();
        assert_eq!(settings.user.as_deref(), Some("u1"));
        assert_eq!(settings.data_dir, PathBuf::from(".serene"));
        assert_eq!(settings.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Settings::from_yaml("colour: dark\n").is_err());
    }

    #[test]
    fn overrides_win() {
        let settings = Settings::from_yaml("data_dir: /tmp/a\nuser: u1\n")
            .unwrap()
            .with_overrides(Some(PathBuf::from("/tmp/b")), None);
        assert_eq!(settings.data_dir, PathBuf::from("/tmp/b"));
        assert_eq!(settings.user.as_deref(), Some("u1"));
        assert_eq!(settings.cache_path(), PathBuf::from("/tmp/b/cache.json"));
    }

    #[test]
    fn poll_interval_has_a_floor() {
        let settings = Settings::from_yaml("poll_interval_ms: 0\n").unwrap();
        assert_eq!(settings.poll_interval(), Duration::from_millis(50));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = Settings::load(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}
