//! Core error types for bosstimer-core.
//!
//! Validation failures are resolved locally and shown to the user, store
//! failures abort the running operation and are never retried here.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for bosstimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Record store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Manual time input errors
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Boss reference data has not been fetched yet.
    #[error("Boss list is still loading, try again shortly")]
    NotLoaded,

    #[error("Unknown boss: {boss_id}")]
    UnknownBoss { boss_id: i64 },

    #[error("Unknown boss: {0}")]
    UnknownBossName(String),

    /// A respawn interval of zero would make every cycle count infinite.
    #[error("Invalid respawn interval: {respawn_minutes} minutes (must be greater than zero)")]
    InvalidInterval { respawn_minutes: u32 },

    /// A bulk reset stopped part way through.
    #[error("Reset failed while trying to {step}: {source}")]
    ResetFailed {
        step: ResetStep,
        #[source]
        source: StoreError,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Record store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// The remote store could not be reached.
    #[error("Request failed: {0}")]
    Http(String),

    /// The remote store answered with a non-success status.
    #[error("Store rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// A row came back in a shape we cannot decode.
    #[error("Malformed row: {0}")]
    Malformed(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created.
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Errors from manual "HH:MM" cut entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Hour and minute must be whole numbers")]
    InvalidNumber,

    #[error("Hour must be between 0 and 23 (got {0})")]
    HourOutOfRange(i64),

    #[error("Minute must be between 0 and 59 (got {0})")]
    MinuteOutOfRange(i64),

    #[error("A cut time cannot be in the future")]
    FutureTime,

    #[error("That time is too old (only the last {respawn_minutes} minutes can be entered)")]
    TooOld { respawn_minutes: u32 },

    #[error("Expected a time in HH:MM form (got '{0}')")]
    MalformedClock(String),

    #[error("{hour:02}:{minute:02} does not exist in the local time zone today")]
    NonexistentLocalTime { hour: u32, minute: u32 },
}

/// Steps of the bulk reset sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetStep {
    DeleteRecords,
    SetEventMode,
    SeedInitialCuts,
    Reload,
}

impl fmt::Display for ResetStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ResetStep::DeleteRecords => "delete cut records",
            ResetStep::SetEventMode => "update the event mode",
            ResetStep::SeedInitialCuts => "seed initial cut records",
            ResetStep::Reload => "reload records",
        };
        f.write_str(text)
    }
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseLocked
                    || code.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Http(err.to_string())
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Store(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
