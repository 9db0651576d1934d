//! # Bosstimer Core Library
//!
//! This library provides the core logic for tracking field-boss respawns.
//! It follows a CLI-first layout: every operation lives here and the
//! `bosstimer` binary is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Respawn engine**: pure functions over epoch milliseconds for planning
//!   cuts and reconciling stale next-spawn times against a grace window
//! - **Storage**: a [`RecordStore`] trait with SQLite and hosted REST
//!   backends, plus TOML-based configuration
//! - **Tracker**: the [`BossTracker`] service that caches store data and
//!   sequences writes, including the bulk reset
//! - **Board**: the derived, sorted respawn view with readiness buckets
//!
//! ## Key Components
//!
//! - [`BossTracker`]: Cache and write sequencing
//! - [`adjust_with_grace`]: Stale next-spawn reconciliation
//! - [`RespawnBoard`]: Display-ready board
//! - [`Database`]: Local persistence
//! - [`Config`]: Application configuration management

pub mod board;
pub mod boss;
pub mod error;
pub mod events;
pub mod refresh;
pub mod respawn;
pub mod storage;
pub mod tracker;

pub use board::{
    build_board, latest_per_boss, remaining_human, BoardEntry, BoardOptions, Readiness,
    RespawnBoard,
};
pub use boss::{Boss, CutRecord, NewCutRecord, MINUTE_MS};
pub use error::{ConfigError, CoreError, ResetStep, StoreError, ValidationError};
pub use events::Event;
pub use refresh::RefreshTicker;
pub use respawn::{
    adjust_with_grace, interval_ms, now_ms, plan_cut, plan_initial_cuts,
    resolve_manual_cut_instant, resolve_server_open, EventMode, GraceAdjustment,
};
pub use storage::{Config, Database, RecordStore, RestStore};
pub use tracker::{BossTracker, ResetRequest, ResetSummary, TrackerSettings};
