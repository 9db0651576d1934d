//! Tracker service.
//!
//! Owns a [`RecordStore`] and a local cache of bosses, cut records and the
//! event mode. The cache only changes after the store confirms a write, and
//! every view is recomputed from the cache on demand.
//!
//! ## Bulk reset
//!
//! `reset_all` runs delete -> set mode -> seed (optional) -> reload with no
//! transaction across steps. A failure halts the sequence and is reported as
//! [`CoreError::ResetFailed`] naming the step; nothing is rolled back. After
//! a failure past the delete step the store holds zero records, possibly
//! with the new mode already applied. That is an expected state: run the
//! reset again without seeding, or seed on its own.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::board::{build_board, BoardOptions, RespawnBoard, DEFAULT_SOON_MINUTES};
use crate::boss::{ms_to_utc, Boss, CutRecord, NewCutRecord};
use crate::error::{CoreError, ResetStep, Result, StoreError};
use crate::events::Event;
use crate::refresh::{RefreshTicker, DEFAULT_REFRESH_SECS};
use crate::respawn::{
    interval_ms, plan_cut, plan_initial_cuts, resolve_manual_cut_instant, EventMode,
    DEFAULT_GRACE_MINUTES,
};
use crate::storage::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerSettings {
    pub grace_minutes: u32,
    pub soon_minutes: u32,
    pub refresh_secs: u64,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            grace_minutes: DEFAULT_GRACE_MINUTES,
            soon_minutes: DEFAULT_SOON_MINUTES,
            refresh_secs: DEFAULT_REFRESH_SECS,
        }
    }
}

impl TrackerSettings {
    pub fn board_options(&self, mode: EventMode) -> BoardOptions {
        BoardOptions {
            mode,
            grace_minutes: self.grace_minutes,
            soon_minutes: self.soon_minutes,
        }
    }

    pub fn ticker(&self) -> RefreshTicker {
        RefreshTicker::new(self.refresh_secs)
    }
}

/// Operator-confirmed reset choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetRequest {
    pub mode: EventMode,
    /// Seed first-cycle records from this server-open instant.
    pub server_open_ms: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetSummary {
    pub deleted: usize,
    pub mode: EventMode,
    pub seeded: usize,
}

pub struct BossTracker<S: RecordStore> {
    store: S,
    settings: TrackerSettings,
    bosses: Vec<Boss>,
    records: Vec<CutRecord>,
    mode: EventMode,
    events: Vec<Event>,
}

impl<S: RecordStore> BossTracker<S> {
    /// Create a tracker with an empty cache. Call [`BossTracker::load`]
    /// before cutting.
    pub fn new(store: S, settings: TrackerSettings) -> Self {
        Self {
            store,
            settings,
            bosses: Vec::new(),
            records: Vec::new(),
            mode: EventMode::Normal,
            events: Vec::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    pub fn bosses(&self) -> &[Boss] {
        &self.bosses
    }

    pub fn records(&self) -> &[CutRecord] {
        &self.records
    }

    pub fn mode(&self) -> EventMode {
        self.mode
    }

    pub fn is_loaded(&self) -> bool {
        !self.bosses.is_empty()
    }

    /// # Errors
    /// [`CoreError::NotLoaded`] before the boss list arrives,
    /// [`CoreError::UnknownBoss`] for an id not in it.
    pub fn boss(&self, boss_id: i64) -> Result<&Boss> {
        if self.bosses.is_empty() {
            return Err(CoreError::NotLoaded);
        }
        self.bosses
            .iter()
            .find(|b| b.id == boss_id)
            .ok_or(CoreError::UnknownBoss { boss_id })
    }

    /// Look a boss up by id (numeric input) or exact name, case-insensitive.
    ///
    /// # Errors
    /// Same as [`BossTracker::boss`]; an unmatched name is
    /// [`CoreError::UnknownBossName`].
    pub fn resolve_boss(&self, key: &str) -> Result<&Boss> {
        if let Ok(id) = key.trim().parse::<i64>() {
            return self.boss(id);
        }
        if self.bosses.is_empty() {
            return Err(CoreError::NotLoaded);
        }
        self.bosses
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(key.trim()))
            .ok_or_else(|| CoreError::UnknownBossName(key.trim().to_string()))
    }

    /// Board at `now_ms` from the cached data.
    ///
    /// # Errors
    /// Fails if a cached boss has a zero-minute interval.
    pub fn board(&self, now_ms: i64) -> Result<RespawnBoard> {
        build_board(
            &self.bosses,
            &self.records,
            self.settings.board_options(self.mode),
            now_ms,
        )
    }

    /// Take the events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Fetch bosses, records and mode. The cache is replaced only when all
    /// three reads succeed.
    ///
    /// # Errors
    /// Returns the first store error.
    pub fn load(&mut self) -> Result<()> {
        let bosses = self.store.list_bosses()?;
        let records = self.store.list_cut_records()?;
        let mode = self.store.get_event_mode()?;

        tracing::info!(
            store = self.store.name(),
            bosses = bosses.len(),
            records = records.len(),
            %mode,
            "loaded tracker state"
        );

        self.bosses = bosses;
        self.records = records;
        self.mode = mode;
        Ok(())
    }

    /// Record a cut of `boss_id` at `cut_ms` under the current mode.
    ///
    /// # Errors
    /// Fails when bosses are not loaded, the boss is unknown, its interval
    /// is zero, or the store rejects the insert.
    pub fn apply_cut(&mut self, boss_id: i64, cut_ms: i64) -> Result<CutRecord> {
        let planned = plan_cut(self.boss(boss_id)?, cut_ms, self.mode)?;
        let stored = self.store.insert_cut_record(&planned)?;

        tracing::info!(
            record_id = stored.id,
            boss_id = stored.boss_id,
            cut_time = %stored.cut_time,
            next_gen_time = %stored.next_gen_time,
            "cut recorded"
        );

        self.records.push(stored.clone());
        self.events.push(Event::CutRecorded {
            record: stored.clone(),
            at: Utc::now(),
        });
        Ok(stored)
    }

    /// # Errors
    /// See [`BossTracker::apply_cut`].
    pub fn cut_now(&mut self, boss_id: i64, now_ms: i64) -> Result<CutRecord> {
        self.apply_cut(boss_id, now_ms)
    }

    /// Record a cut at a typed HH:MM, resolved against `now`'s local date.
    ///
    /// # Errors
    /// Validation errors leave the store and cache untouched; otherwise see
    /// [`BossTracker::apply_cut`].
    pub fn cut_at<Tz: TimeZone>(
        &mut self,
        boss_id: i64,
        hour: &str,
        minute: &str,
        now: &DateTime<Tz>,
    ) -> Result<CutRecord> {
        let boss = self.boss(boss_id)?;
        interval_ms(boss.respawn_minutes, EventMode::Normal)?;
        let cut_ms = resolve_manual_cut_instant(boss.respawn_minutes, hour, minute, now)?;
        self.apply_cut(boss_id, cut_ms)
    }

    /// Seed one first-cycle record per boss from a server-open instant.
    ///
    /// # Errors
    /// Fails when bosses are not loaded, any boss has a zero interval, or
    /// the store rejects the batch.
    pub fn bootstrap_initial_cuts(
        &mut self,
        server_open_ms: i64,
        mode: EventMode,
    ) -> Result<Vec<CutRecord>> {
        if self.bosses.is_empty() {
            return Err(CoreError::NotLoaded);
        }
        let planned = plan_initial_cuts(server_open_ms, &self.bosses, mode)?;
        Ok(self.seed(&planned, server_open_ms, mode)?)
    }

    /// Wipe all records, switch mode, optionally seed, then reload.
    ///
    /// # Errors
    /// [`CoreError::NotLoaded`] (before anything is touched) when seeding is
    /// requested without bosses; [`CoreError::ResetFailed`] naming the step
    /// that failed otherwise.
    pub fn reset_all(&mut self, request: ResetRequest) -> Result<ResetSummary> {
        let planned = match request.server_open_ms {
            Some(open_ms) => {
                if self.bosses.is_empty() {
                    return Err(CoreError::NotLoaded);
                }
                Some((open_ms, plan_initial_cuts(open_ms, &self.bosses, request.mode)?))
            }
            None => None,
        };

        let deleted = self
            .store
            .delete_all_cut_records()
            .map_err(reset_failed(ResetStep::DeleteRecords))?;
        self.records.clear();
        self.events.push(Event::RecordsCleared {
            deleted,
            at: Utc::now(),
        });

        self.store
            .set_event_mode(request.mode)
            .map_err(reset_failed(ResetStep::SetEventMode))?;
        self.mode = request.mode;
        self.events.push(Event::EventModeChanged {
            mode: request.mode,
            at: Utc::now(),
        });

        let seeded = match planned {
            Some((open_ms, planned)) => self
                .seed(&planned, open_ms, request.mode)
                .map_err(reset_failed(ResetStep::SeedInitialCuts))?
                .len(),
            None => 0,
        };

        self.records = self
            .store
            .list_cut_records()
            .map_err(reset_failed(ResetStep::Reload))?;
        self.mode = self
            .store
            .get_event_mode()
            .map_err(reset_failed(ResetStep::Reload))?;

        tracing::info!(deleted, seeded, mode = %self.mode, "reset complete");
        Ok(ResetSummary {
            deleted,
            mode: self.mode,
            seeded,
        })
    }

    fn seed(
        &mut self,
        planned: &[NewCutRecord],
        server_open_ms: i64,
        mode: EventMode,
    ) -> Result<Vec<CutRecord>, StoreError> {
        let stored = self.store.insert_cut_records(planned)?;
        tracing::info!(count = stored.len(), %mode, "seeded initial cuts");

        self.records.extend(stored.iter().cloned());
        self.events.push(Event::InitialCutsSeeded {
            count: stored.len(),
            server_open: ms_to_utc(server_open_ms)?,
            mode,
            at: Utc::now(),
        });
        Ok(stored)
    }
}

fn reset_failed(step: ResetStep) -> impl FnOnce(StoreError) -> CoreError {
    move |source| {
        tracing::warn!(%step, error = %source, "reset halted");
        CoreError::ResetFailed { step, source }
    }
}
