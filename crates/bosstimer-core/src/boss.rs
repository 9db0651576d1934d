//! Boss reference data and cut records.
//!
//! Timestamps are `DateTime<Utc>` at the store boundary (RFC 3339 on the wire
//! and on disk); the reconciliation engine works on epoch milliseconds and
//! reads them through the `*_ms` accessors.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Milliseconds in one minute.
pub const MINUTE_MS: i64 = 60_000;

/// A boss as loaded from the store. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boss {
    pub id: i64,
    pub name: String,
    /// Base respawn interval, before any event multiplier.
    pub respawn_minutes: u32,
    /// Minutes after server open until the first spawn.
    #[serde(rename = "first_respawn_mins", alias = "first_respawn_minutes")]
    pub first_respawn_minutes: u32,
}

impl Boss {
    pub fn base_interval_ms(&self) -> i64 {
        i64::from(self.respawn_minutes) * MINUTE_MS
    }
}

/// A stored cut. Never mutated after insert; the highest id per boss wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CutRecordRow")]
pub struct CutRecord {
    pub id: i64,
    pub boss_id: i64,
    pub boss_name: String,
    pub cut_time: DateTime<Utc>,
    /// Raw next spawn computed at insert time. Not rewritten when the event
    /// mode changes later.
    pub next_gen_time: DateTime<Utc>,
}

/// Wire shape of a cut row. Hosted rows may carry a null next spawn; such
/// a row falls back to its cut time.
#[derive(Deserialize)]
struct CutRecordRow {
    id: i64,
    boss_id: i64,
    boss_name: String,
    cut_time: DateTime<Utc>,
    #[serde(default)]
    next_gen_time: Option<DateTime<Utc>>,
}

impl From<CutRecordRow> for CutRecord {
    fn from(row: CutRecordRow) -> Self {
        Self {
            id: row.id,
            boss_id: row.boss_id,
            boss_name: row.boss_name,
            cut_time: row.cut_time,
            next_gen_time: row.next_gen_time.unwrap_or(row.cut_time),
        }
    }
}

impl CutRecord {
    pub fn cut_ms(&self) -> i64 {
        self.cut_time.timestamp_millis()
    }

    pub fn next_gen_ms(&self) -> i64 {
        self.next_gen_time.timestamp_millis()
    }
}

/// A cut waiting to be inserted; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCutRecord {
    pub boss_id: i64,
    pub boss_name: String,
    pub cut_time: DateTime<Utc>,
    pub next_gen_time: DateTime<Utc>,
}

impl NewCutRecord {
    /// Build from epoch milliseconds.
    ///
    /// # Errors
    /// Returns an error if either instant is outside chrono's range.
    pub fn from_ms(boss: &Boss, cut_ms: i64, next_ms: i64) -> Result<Self, StoreError> {
        Ok(Self {
            boss_id: boss.id,
            boss_name: boss.name.clone(),
            cut_time: ms_to_utc(cut_ms)?,
            next_gen_time: ms_to_utc(next_ms)?,
        })
    }

    pub fn with_id(self, id: i64) -> CutRecord {
        CutRecord {
            id,
            boss_id: self.boss_id,
            boss_name: self.boss_name,
            cut_time: self.cut_time,
            next_gen_time: self.next_gen_time,
        }
    }
}

pub(crate) fn ms_to_utc(ms: i64) -> Result<DateTime<Utc>, StoreError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| StoreError::Malformed(format!("timestamp out of range: {ms}")))
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Malformed(format!("bad timestamp '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boss() -> Boss {
        Boss {
            id: 7,
            name: "Kzarka".into(),
            respawn_minutes: 120,
            first_respawn_minutes: 30,
        }
    }

    #[test]
    fn boss_reads_legacy_column_name() {
        let json = r#"{"id":1,"name":"Nouver","respawn_minutes":60,"first_respawn_mins":15}"#;
        let boss: Boss = serde_json::from_str(json).unwrap();
        assert_eq!(boss.first_respawn_minutes, 15);
        assert_eq!(boss.base_interval_ms(), 3_600_000);
    }

    #[test]
    fn cut_record_accepts_offset_timestamps() {
        let json = r#"{"id":3,"boss_id":7,"boss_name":"Kzarka",
            "cut_time":"2024-05-01T10:00:00+09:00",
            "next_gen_time":"2024-05-01T03:00:00.000Z"}"#;
        let rec: CutRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.cut_ms(), rec.next_gen_ms() - 2 * 3_600_000);
    }

    #[test]
    fn null_next_gen_time_falls_back_to_cut_time() {
        let json = r#"[
            {"id":4,"boss_id":7,"boss_name":"Kzarka",
             "cut_time":"2024-05-01T01:00:00Z","next_gen_time":null},
            {"id":5,"boss_id":7,"boss_name":"Kzarka",
             "cut_time":"2024-05-01T02:00:00Z"}
        ]"#;
        let recs: Vec<CutRecord> = serde_json::from_str(json).unwrap();
        assert!(recs.iter().all(|r| r.next_gen_ms() == r.cut_ms()));
    }

    #[test]
    fn new_record_from_ms() {
        let rec = NewCutRecord::from_ms(&boss(), 0, 7_200_000).unwrap().with_id(9);
        assert_eq!(rec.id, 9);
        assert_eq!(rec.boss_name, "Kzarka");
        assert_eq!(rec.next_gen_ms(), 7_200_000);
    }

    #[test]
    fn parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
        assert_eq!(
            parse_timestamp("1970-01-01T00:01:00Z").unwrap().timestamp_millis(),
            MINUTE_MS
        );
    }
}
