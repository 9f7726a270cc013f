// src/db/mod.rs
//
// Relational database module
//
// Provides:
// - Connection pooling with per-operation deadlines
// - Schema migrations
// - SQL functions (REGEXP)
// - Database utilities

pub mod connection;
pub mod functions;
pub mod migrations;
pub mod values;

pub use connection::{
    create_connection_pool, get_database_path, ConnectionPool, PooledConn, RelationalHandle,
    TimedConnection,
};

pub use functions::register_functions;

pub use migrations::{
    get_database_stats, initialize_database, verify_database_integrity, DatabaseStats,
};
