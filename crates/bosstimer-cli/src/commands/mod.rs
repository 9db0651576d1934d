pub mod board;
pub mod boss;
pub mod completions;
pub mod config;
pub mod cut;
pub mod mode;
pub mod reset;
pub mod watch;

use bosstimer_core::storage::{open_store, Config};
use bosstimer_core::{BossTracker, RecordStore};
use chrono::{Local, TimeZone};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub type Tracker = BossTracker<Box<dyn RecordStore>>;

/// Open the configured store and load the tracker cache.
pub fn open_tracker() -> Result<Tracker, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    open_tracker_with(&config)
}

pub fn open_tracker_with(config: &Config) -> Result<Tracker, Box<dyn std::error::Error>> {
    let store = open_store(config)?;
    let mut tracker = BossTracker::new(store, config.tracker_settings());
    tracker.load()?;
    Ok(tracker)
}

/// "HH:MM" in the local time zone.
pub fn local_clock(ms: i64) -> String {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

/// Print events drained from the tracker at debug level.
pub fn log_events(tracker: &mut Tracker) {
    for event in tracker.drain_events() {
        match serde_json::to_string(&event) {
            Ok(json) => tracing::debug!(event = %json, "tracker event"),
            Err(e) => tracing::warn!(error = %e, "unserializable event"),
        }
    }
}
