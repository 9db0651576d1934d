//! TOML-based application configuration.
//!
//! Stores:
//! - Tracker tuning (grace window, soon threshold, refresh cadence)
//! - Which record store backend to use
//! - Connection details for the hosted REST store
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::board::DEFAULT_SOON_MINUTES;
use crate::error::ConfigError;
use crate::refresh::DEFAULT_REFRESH_SECS;
use crate::respawn::DEFAULT_GRACE_MINUTES;
use crate::tracker::TrackerSettings;

/// Overrides `store.rest.url` when set.
pub const REST_URL_ENV: &str = "BOSSTIMER_REST_URL";
/// Overrides `store.rest.api_key` when set.
pub const REST_KEY_ENV: &str = "BOSSTIMER_REST_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default = "default_grace_minutes")]
    pub grace_minutes: u32,
    #[serde(default = "default_soon_minutes")]
    pub soon_minutes: u32,
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Rest,
}

/// Hosted PostgREST-style store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_boss_table")]
    pub boss_table: String,
    #[serde(default = "default_cut_table")]
    pub cut_table: String,
    #[serde(default = "default_settings_table")]
    pub settings_table: String,
    #[serde(default = "default_settings_row")]
    pub settings_row: i64,
    /// Rows requested per page when listing a table. Keep it at or below
    /// the server's max-rows cap.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default)]
    pub rest: RestConfig,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

// Default functions
fn default_grace_minutes() -> u32 {
    DEFAULT_GRACE_MINUTES
}
fn default_soon_minutes() -> u32 {
    DEFAULT_SOON_MINUTES
}
fn default_refresh_secs() -> u64 {
    DEFAULT_REFRESH_SECS
}
fn default_boss_table() -> String {
    "boss_list".into()
}
fn default_cut_table() -> String {
    "boss_cut_list".into()
}
fn default_settings_table() -> String {
    "boss_cut_settings".into()
}
fn default_settings_row() -> i64 {
    1
}
fn default_page_size() -> usize {
    1000
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            grace_minutes: default_grace_minutes(),
            soon_minutes: default_soon_minutes(),
            refresh_secs: default_refresh_secs(),
        }
    }
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            boss_table: default_boss_table(),
            cut_table: default_cut_table(),
            settings_table: default_settings_table(),
            settings_row: default_settings_row(),
            page_size: default_page_size(),
        }
    }
}

impl RestConfig {
    /// Apply environment overrides for url and key.
    pub fn resolved(&self) -> Self {
        self.with_overrides(
            std::env::var(REST_URL_ENV).ok(),
            std::env::var(REST_KEY_ENV).ok(),
        )
    }

    fn with_overrides(&self, url: Option<String>, api_key: Option<String>) -> Self {
        let mut out = self.clone();
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            out.url = url;
        }
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            out.api_key = key;
        }
        out
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("cannot replace a whole section".into()));
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// `<data_dir>/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default, writing the default out.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, creating it with defaults when absent.
    ///
    /// # Errors
    /// See [`Config::load`].
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    /// See [`Config::save`].
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key in memory. Call [`Config::save`] to persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    pub fn tracker_settings(&self) -> TrackerSettings {
        TrackerSettings {
            grace_minutes: self.tracker.grace_minutes,
            soon_minutes: self.tracker.soon_minutes,
            refresh_secs: self.tracker.refresh_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.tracker.grace_minutes, 60);
        assert_eq!(parsed.store.backend, StoreBackend::Sqlite);
        assert_eq!(parsed.store.rest.cut_table, "boss_cut_list");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[tracker]\ngrace_minutes = 15\n").unwrap();
        assert_eq!(parsed.tracker.grace_minutes, 15);
        assert_eq!(parsed.tracker.soon_minutes, 10);
        assert_eq!(parsed.store.rest.settings_row, 1);
        assert_eq!(parsed.store.rest.page_size, 1000);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("tracker.grace_minutes").as_deref(), Some("60"));
        assert_eq!(cfg.get("store.backend").as_deref(), Some("sqlite"));
        assert!(cfg.get("tracker.missing_key").is_none());
    }

    #[test]
    fn set_updates_number_and_enum() {
        let mut cfg = Config::default();
        cfg.set("tracker.soon_minutes", "5").unwrap();
        cfg.set("store.backend", "rest").unwrap();
        assert_eq!(cfg.tracker.soon_minutes, 5);
        assert_eq!(cfg.store.backend, StoreBackend::Rest);
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("tracker.nope", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(cfg.set("tracker.grace_minutes", "soon").is_err());
        assert!(cfg.set("store.backend", "postgres").is_err());
        assert!(cfg.set("tracker", "1").is_err());
        assert_eq!(cfg.tracker.grace_minutes, 60);
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.tracker.refresh_secs, 30);
        assert!(path.exists());

        let mut cfg = cfg;
        cfg.set("tracker.refresh_secs", "10").unwrap();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().tracker.refresh_secs, 10);
    }

    #[test]
    fn load_from_rejects_broken_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "tracker = [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }

    #[test]
    fn env_overrides_replace_non_empty_values() {
        let rest = RestConfig {
            url: "https://file.example".into(),
            api_key: "file-key".into(),
            ..RestConfig::default()
        };
        let out = rest.with_overrides(Some("https://env.example".into()), Some("  ".into()));
        assert_eq!(out.url, "https://env.example");
        assert_eq!(out.api_key, "file-key");
    }
}
