mod config;
pub mod database;
pub mod migrations;
pub mod rest;
mod traits;

pub use config::{Config, RestConfig, StoreBackend, StoreConfig, TrackerConfig, REST_KEY_ENV, REST_URL_ENV};
pub use database::Database;
pub use rest::RestStore;
pub use traits::RecordStore;

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Overrides the data directory entirely when set.
pub const DATA_DIR_ENV: &str = "BOSSTIMER_DATA_DIR";

/// Returns the data directory, creating it if needed.
///
/// `BOSSTIMER_DATA_DIR` wins when set; otherwise `~/.config/bosstimer[-dev]/`
/// based on `BOSSTIMER_ENV` (set `BOSSTIMER_ENV=dev` for the development
/// directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var(DATA_DIR_ENV) {
        Ok(explicit) if !explicit.trim().is_empty() => PathBuf::from(explicit),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env =
                std::env::var("BOSSTIMER_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("bosstimer-dev")
            } else {
                base_dir.join("bosstimer")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Open the record store selected by `config.store.backend`.
///
/// # Errors
/// Returns an error if the backend cannot be opened or is misconfigured.
pub fn open_store(config: &Config) -> Result<Box<dyn RecordStore>> {
    match config.store.backend {
        StoreBackend::Sqlite => Ok(Box::new(Database::open()?)),
        StoreBackend::Rest => Ok(Box::new(RestStore::new(config.store.rest.resolved())?)),
    }
}
