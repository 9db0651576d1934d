//! Derived board views.
//!
//! Rebuilt from the full record list on every read:
//! - latest cut per boss (greatest id wins)
//! - each latest cut reconciled against the grace window
//! - sorted ascending by adjusted next spawn
//! - split into ready / upcoming, with "soon" inside upcoming
//! - bosses without any cut listed separately

mod format;

pub use format::remaining_human;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::boss::{Boss, CutRecord, MINUTE_MS};
use crate::error::Result;
use crate::respawn::{adjust_with_grace, EventMode, GraceAdjustment, DEFAULT_GRACE_MINUTES};

/// Upcoming spawns closer than this are flagged as soon.
pub const DEFAULT_SOON_MINUTES: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Readiness {
    Ready,
    Soon,
    Upcoming,
}

impl Readiness {
    pub fn classify(adjusted_next_ms: i64, now_ms: i64, soon_minutes: u32) -> Self {
        if adjusted_next_ms <= now_ms {
            Readiness::Ready
        } else if adjusted_next_ms - now_ms <= i64::from(soon_minutes) * MINUTE_MS {
            Readiness::Soon
        } else {
            Readiness::Upcoming
        }
    }
}

/// Parameters for one board build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardOptions {
    pub mode: EventMode,
    pub grace_minutes: u32,
    pub soon_minutes: u32,
}

impl Default for BoardOptions {
    fn default() -> Self {
        Self {
            mode: EventMode::Normal,
            grace_minutes: DEFAULT_GRACE_MINUTES,
            soon_minutes: DEFAULT_SOON_MINUTES,
        }
    }
}

/// One boss's current cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardEntry {
    pub record: CutRecord,
    /// `None` when the record points at a boss that is no longer listed.
    pub respawn_minutes: Option<u32>,
    pub adjusted_next_ms: i64,
    pub skipped_cycles: u64,
    pub readiness: Readiness,
}

impl BoardEntry {
    pub fn boss_id(&self) -> i64 {
        self.record.boss_id
    }

    pub fn boss_name(&self) -> &str {
        &self.record.boss_name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RespawnBoard {
    pub generated_at_ms: i64,
    /// Sorted ascending by `adjusted_next_ms`.
    pub entries: Vec<BoardEntry>,
    /// Bosses with no cut record at all.
    pub no_record: Vec<Boss>,
}

impl RespawnBoard {
    pub fn ready(&self) -> impl Iterator<Item = &BoardEntry> {
        self.entries
            .iter()
            .filter(|e| e.readiness == Readiness::Ready)
    }

    /// Everything not yet spawned, soon included.
    pub fn upcoming(&self) -> impl Iterator<Item = &BoardEntry> {
        self.entries
            .iter()
            .filter(|e| e.readiness != Readiness::Ready)
    }

    pub fn soon(&self) -> impl Iterator<Item = &BoardEntry> {
        self.entries
            .iter()
            .filter(|e| e.readiness == Readiness::Soon)
    }

    pub fn entry_for(&self, boss_id: i64) -> Option<&BoardEntry> {
        self.entries.iter().find(|e| e.boss_id() == boss_id)
    }
}

/// Latest record per boss id.
pub fn latest_per_boss(records: &[CutRecord]) -> BTreeMap<i64, &CutRecord> {
    let mut latest: BTreeMap<i64, &CutRecord> = BTreeMap::new();
    for record in records {
        match latest.get(&record.boss_id) {
            Some(existing) if existing.id >= record.id => {}
            _ => {
                latest.insert(record.boss_id, record);
            }
        }
    }
    latest
}

/// Build the board at `now_ms`.
///
/// # Errors
/// Fails if a listed boss has a zero-minute respawn interval.
pub fn build_board(
    bosses: &[Boss],
    records: &[CutRecord],
    options: BoardOptions,
    now_ms: i64,
) -> Result<RespawnBoard> {
    let latest = latest_per_boss(records);
    let by_id: BTreeMap<i64, &Boss> = bosses.iter().map(|b| (b.id, b)).collect();

    let mut entries = Vec::with_capacity(latest.len());
    for record in latest.values() {
        let boss = by_id.get(&record.boss_id);
        let adjustment = match boss {
            Some(boss) => adjust_with_grace(
                record.next_gen_ms(),
                boss.respawn_minutes,
                options.mode,
                options.grace_minutes,
                now_ms,
            )?,
            None => {
                tracing::warn!(
                    record_id = record.id,
                    boss_id = record.boss_id,
                    "cut record references a boss missing from the boss list"
                );
                GraceAdjustment::on_schedule(record.next_gen_ms())
            }
        };

        tracing::debug!(
            boss_id = record.boss_id,
            adjusted_next_ms = adjustment.adjusted_next_ms,
            skipped_cycles = adjustment.skipped_cycles,
            "reconciled"
        );

        entries.push(BoardEntry {
            record: (*record).clone(),
            respawn_minutes: boss.map(|b| b.respawn_minutes),
            adjusted_next_ms: adjustment.adjusted_next_ms,
            skipped_cycles: adjustment.skipped_cycles,
            readiness: Readiness::classify(adjustment.adjusted_next_ms, now_ms, options.soon_minutes),
        });
    }
    entries.sort_by_key(|e| (e.adjusted_next_ms, e.boss_id()));

    let no_record = bosses
        .iter()
        .filter(|b| !latest.contains_key(&b.id))
        .cloned()
        .collect();

    Ok(RespawnBoard {
        generated_at_ms: now_ms,
        entries,
        no_record,
    })
}
