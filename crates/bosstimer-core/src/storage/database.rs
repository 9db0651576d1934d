//! SQLite-backed record store.
//!
//! Provides persistent storage for:
//! - Boss reference data
//! - Cut records (append-only, cleared only by a bulk reset)
//! - The event-mode settings row

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use super::data_dir;
use super::migrations;
use super::traits::RecordStore;
use crate::boss::{parse_timestamp, Boss, CutRecord, NewCutRecord};
use crate::error::{Result, StoreError};
use crate::respawn::EventMode;

/// SQLite database for bosses and cut records.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/bosstimer.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable or the database
    /// cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("bosstimer.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        migrations::migrate(&conn).map_err(|e| StoreError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Insert or replace a boss by id.
    ///
    /// # Errors
    /// Returns an error if the row violates the schema (zero interval,
    /// duplicate name) or the write fails.
    pub fn upsert_boss(&self, boss: &Boss) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO bosses (id, name, respawn_minutes, first_respawn_minutes)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                respawn_minutes = excluded.respawn_minutes,
                first_respawn_minutes = excluded.first_respawn_minutes",
            params![
                boss.id,
                boss.name,
                boss.respawn_minutes,
                boss.first_respawn_minutes
            ],
        )?;
        Ok(())
    }

    /// Next free boss id.
    pub fn next_boss_id(&self) -> Result<i64, StoreError> {
        let id = self
            .conn
            .query_row("SELECT COALESCE(MAX(id), 0) + 1 FROM bosses", [], |row| {
                row.get::<_, i64>(0)
            })?;
        Ok(id)
    }

    /// Remove a boss. Its cut records stay for audit.
    ///
    /// Returns whether a row was removed.
    pub fn remove_boss(&self, boss_id: i64) -> Result<bool, StoreError> {
        let n = self
            .conn
            .execute("DELETE FROM bosses WHERE id = ?1", params![boss_id])?;
        Ok(n > 0)
    }

    fn insert_with(conn: &Connection, record: &NewCutRecord) -> Result<CutRecord, StoreError> {
        conn.execute(
            "INSERT INTO cut_records (boss_id, boss_name, cut_time, next_gen_time)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.boss_id,
                record.boss_name,
                record.cut_time.to_rfc3339(),
                record.next_gen_time.to_rfc3339(),
            ],
        )?;
        Ok(record.clone().with_id(conn.last_insert_rowid()))
    }
}

fn boss_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Boss> {
    Ok(Boss {
        id: row.get(0)?,
        name: row.get(1)?,
        respawn_minutes: row.get(2)?,
        first_respawn_minutes: row.get(3)?,
    })
}

impl RecordStore for Database {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn list_bosses(&self) -> Result<Vec<Boss>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, respawn_minutes, first_respawn_minutes
             FROM bosses ORDER BY id ASC",
        )?;
        let bosses = stmt
            .query_map([], boss_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(bosses)
    }

    fn list_cut_records(&self) -> Result<Vec<CutRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, boss_id, boss_name, cut_time, next_gen_time
             FROM cut_records ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, boss_id, boss_name, cut_time, next_gen_time) = row?;
            records.push(CutRecord {
                id,
                boss_id,
                boss_name,
                cut_time: parse_timestamp(&cut_time)?,
                next_gen_time: parse_timestamp(&next_gen_time)?,
            });
        }
        Ok(records)
    }

    fn insert_cut_record(&self, record: &NewCutRecord) -> Result<CutRecord, StoreError> {
        Self::insert_with(&self.conn, record)
    }

    fn insert_cut_records(&self, records: &[NewCutRecord]) -> Result<Vec<CutRecord>, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let inserted = records
            .iter()
            .map(|r| Self::insert_with(&tx, r))
            .collect::<Result<Vec<_>, _>>()?;
        tx.commit()?;
        Ok(inserted)
    }

    fn delete_all_cut_records(&self) -> Result<usize, StoreError> {
        Ok(self.conn.execute("DELETE FROM cut_records", [])?)
    }

    fn get_event_mode(&self) -> Result<EventMode, StoreError> {
        let flag = self
            .conn
            .query_row(
                "SELECT is_double_event FROM settings WHERE id = 1",
                [],
                |row| row.get::<_, bool>(0),
            )
            .optional()?;
        Ok(EventMode::from_double(flag.unwrap_or(false)))
    }

    fn set_event_mode(&self, mode: EventMode) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO settings (id, is_double_event) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET is_double_event = excluded.is_double_event",
            params![mode.is_double_event()],
        )?;
        Ok(())
    }
}
