// src/db/migrations.rs
//
// Relational schema initialization and migrations
//
// PRINCIPLES:
// - Explicit schema versions
// - No automatic migrations
// - Idempotent operations

use rusqlite::Connection;
use crate::error::{AppError, AppResult};

/// Current schema version
/// Increment this when adding migrations
const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
///
/// Checks the recorded version, applies the initial schema to a fresh
/// database and refuses to touch one from another version.
/// Safe to call multiple times.
pub fn initialize_database(conn: &Connection) -> AppResult<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        apply_initial_schema(conn)?;
        set_schema_version(conn, CURRENT_SCHEMA_VERSION)?;
        log::info!("Applied relational schema version {}", CURRENT_SCHEMA_VERSION);
    } else if current_version < CURRENT_SCHEMA_VERSION {
        return Err(AppError::Config(format!(
            "Schema version {} is outdated. Expected {}. Manual migration required.",
            current_version, CURRENT_SCHEMA_VERSION
        )));
    } else if current_version > CURRENT_SCHEMA_VERSION {
        return Err(AppError::Config(format!(
            "Schema version {} is newer than supported {}. Update the application.",
            current_version, CURRENT_SCHEMA_VERSION
        )));
    }

    Ok(())
}

/// Get current schema version
/// Returns 0 if schema_version table doesn't exist (fresh database)
fn get_schema_version(conn: &Connection) -> AppResult<i32> {
    let table_exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;

    Ok(version.unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: i32) -> AppResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, datetime('now'))",
        [version],
    )?;
    Ok(())
}

/// Apply initial schema (version 1) from the embedded schema.sql
fn apply_initial_schema(conn: &Connection) -> AppResult<()> {
    let schema = include_str!("../../schema.sql");

    conn.execute_batch(schema)
        .map_err(|e| AppError::Other(format!("Failed to apply initial schema: {}", e)))?;

    Ok(())
}

/// Verify database integrity
///
/// Runs SQLite's integrity check.
pub fn verify_database_integrity(conn: &Connection) -> AppResult<()> {
    let result: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;

    if result != "ok" {
        return Err(AppError::Other(format!("Database integrity check failed: {}", result)));
    }

    Ok(())
}

/// Get database statistics
///
/// Size and row counts of the main catalog tables
pub fn get_database_stats(conn: &Connection) -> AppResult<DatabaseStats> {
    let page_count: i64 = conn.query_row("PRAGMA page_count", [], |row| row.get(0))?;
    let page_size: i64 = conn.query_row("PRAGMA page_size", [], |row| row.get(0))?;

    let count = |table: &str| -> AppResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        Ok(conn.query_row(&sql, [], |row| row.get(0))?)
    };

    Ok(DatabaseStats {
        size_bytes: page_count * page_size,
        page_count,
        page_size,
        serial_count: count("serials")?,
        episode_count: count("episodes")?,
        user_count: count("users")?,
    })
}

/// Database statistics
#[derive(Debug)]
pub struct DatabaseStats {
    pub size_bytes: i64,
    pub page_count: i64,
    pub page_size: i64,
    pub serial_count: i64,
    pub episode_count: i64,
    pub user_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::create_test_connection;

    #[test]
    fn test_initialize_fresh_database() {
        let conn = create_test_connection().unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), 0);
        initialize_database(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), 1);

        let table_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
                [],
                |row| row.get(0),
            )
            .unwrap();

        // 12 catalog tables + schema_version
        assert_eq!(table_count, 13);
    }

    #[test]
    fn test_initialize_idempotent() {
        let conn = create_test_connection().unwrap();

        initialize_database(&conn).unwrap();
        initialize_database(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), 1);
    }

    #[test]
    fn test_statistic_singleton_seeded() {
        let conn = create_test_connection().unwrap();
        initialize_database(&conn).unwrap();

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM statistic", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);

        let second = conn.execute("INSERT INTO statistic (st_id) VALUES (2)", []);
        assert!(second.is_err(), "statistic must stay a singleton");
    }

    #[test]
    fn test_duration_view() {
        let conn = create_test_connection().unwrap();
        initialize_database(&conn).unwrap();

        conn.execute_batch(
            "INSERT INTO seasons (ss_idSerial, ss_name, ss_num, ss_date) VALUES (5, 'S1', 1, '2020-01-01');
             INSERT INTO seasons (ss_idSerial, ss_name, ss_num, ss_date) VALUES (5, 'S2', 2, '2021-01-01');
             INSERT INTO episodes (e_idSeason, e_name, e_num, e_duration, e_date) VALUES (1, 'a', 1, 30, '2020-01-01');
             INSERT INTO episodes (e_idSeason, e_name, e_num, e_duration, e_date) VALUES (1, 'b', 2, 45, '2020-01-08');
             INSERT INTO episodes (e_idSeason, e_name, e_num, e_duration, e_date) VALUES (2, 'c', 1, 50, '2021-01-01');",
        )
        .unwrap();

        let (episodes, minutes): (i64, i64) = conn
            .query_row(
                "SELECT episodes, minutes FROM serial_episode_durations WHERE serial_id = 5",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!((episodes, minutes), (3, 125));
    }

    #[test]
    fn test_database_stats() {
        let conn = create_test_connection().unwrap();
        initialize_database(&conn).unwrap();

        let stats = get_database_stats(&conn).unwrap();

        assert!(stats.size_bytes > 0);
        assert_eq!(stats.serial_count, 0);
        assert_eq!(stats.episode_count, 0);
        assert_eq!(stats.user_count, 0);
    }

    #[test]
    fn test_integrity_check() {
        let conn = create_test_connection().unwrap();
        initialize_database(&conn).unwrap();
        verify_database_integrity(&conn).unwrap();
    }
}
