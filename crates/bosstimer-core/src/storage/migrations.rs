//! Database schema migrations for bosstimer.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Returns 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> SqliteResult<i32> {
    match conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    }) {
        Ok(version) => Ok(version),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: bosses, cut records and the single settings row.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS bosses (
            id                   INTEGER PRIMARY KEY,
            name                 TEXT NOT NULL UNIQUE,
            respawn_minutes      INTEGER NOT NULL CHECK (respawn_minutes > 0),
            first_respawn_minutes INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS cut_records (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            boss_id       INTEGER NOT NULL,
            boss_name     TEXT NOT NULL,
            cut_time      TEXT NOT NULL,
            next_gen_time TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS settings (
            id              INTEGER PRIMARY KEY CHECK (id = 1),
            is_double_event INTEGER NOT NULL DEFAULT 0
        );

        INSERT OR IGNORE INTO settings (id, is_double_event) VALUES (1, 0);",
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: index for the latest-per-boss scan.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_cut_records_boss_id ON cut_records(boss_id, id);",
    )?;
    set_schema_version(&tx, 2)?;
    tx.commit()
}
