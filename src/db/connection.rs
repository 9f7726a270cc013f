// src/db/connection.rs
//
// Relational connection management
//
// PRINCIPLES:
// - Explicit connection pooling
// - Every checkout and every statement is bounded by the operation timeout
// - Clear error propagation
// - Thread-safe access

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::functions::register_functions;
use crate::error::{AppError, AppResult};

/// Type alias for connection pool
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled connection
pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// VM instructions between two deadline checks.
const PROGRESS_STEPS: i32 = 1_000;

/// Get the default database file path
///
/// Path structure: {APP_DATA}/serialhub/serialhub.db
pub fn get_database_path() -> AppResult<PathBuf> {
    let app_data_dir = dirs::data_dir()
        .ok_or_else(|| AppError::Config("Could not determine app data directory".to_string()))?;

    let serialhub_dir = app_data_dir.join("serialhub");
    std::fs::create_dir_all(&serialhub_dir)?;

    Ok(serialhub_dir.join("serialhub.db"))
}

/// Create a connection pool
///
/// Pool configuration:
/// - `pool_size` connections, checkout bounded by `timeout`
/// - SQLite in WAL mode for concurrent readers
/// - Busy timeout equal to the operation timeout
/// - `REGEXP` available on every connection
pub fn create_connection_pool(
    db_path: &Path,
    pool_size: u32,
    timeout: Duration,
) -> AppResult<ConnectionPool> {
    let manager = SqliteConnectionManager::file(db_path).with_init(move |conn| {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        conn.busy_timeout(timeout)?;
        register_functions(conn)?;
        Ok(())
    });

    let pool = Pool::builder()
        .max_size(pool_size)
        .connection_timeout(timeout)
        .build(manager)
        .map_err(|e| AppError::Pool(format!("Failed to create connection pool: {}", e)))?;

    log::debug!(
        "Connection pool ready at {} (size {}, timeout {:?})",
        db_path.display(),
        pool_size,
        timeout
    );
    Ok(pool)
}

/// Create a standalone in-memory connection (for testing)
pub fn create_test_connection() -> AppResult<Connection> {
    let conn = Connection::open_in_memory()?;
    register_functions(&conn)?;
    Ok(conn)
}

/// Shared relational store handle.
///
/// Cloned into every relational repository. Each `connection()` call
/// starts a fresh deadline of `timeout`.
#[derive(Clone)]
pub struct RelationalHandle {
    pool: Arc<ConnectionPool>,
    timeout: Duration,
}

impl RelationalHandle {
    pub fn new(pool: Arc<ConnectionPool>, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Check out a connection whose statements are interrupted once the
    /// operation timeout has elapsed.
    pub fn connection(&self) -> AppResult<TimedConnection> {
        let conn = self.pool.get_timeout(self.timeout).map_err(|e| {
            AppError::Timeout(format!("waiting for a database connection: {}", e))
        })?;

        let deadline = Instant::now() + self.timeout;
        conn.progress_handler(PROGRESS_STEPS, Some(move || Instant::now() >= deadline));

        Ok(TimedConnection { conn })
    }
}

/// A pooled connection carrying a deadline.
/// The deadline is removed before the connection goes back to the pool.
pub struct TimedConnection {
    conn: PooledConn,
}

impl Deref for TimedConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl Drop for TimedConnection {
    fn drop(&mut self) {
        self.conn.progress_handler(0, None::<fn() -> bool>);
    }
}
