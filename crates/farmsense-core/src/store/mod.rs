//! `SQLite` persistence for users, sessions, records, and alerts.
//!
//! One database file holds everything. The schema is embedded and applied
//! idempotently at startup, so a fresh deployment needs no migration step:
//! point the server at a path and the file is created and shaped on first
//! run.
//!
//! All record and alert access goes through the repository traits in
//! [`repository`], which keep every query scoped to one `user_id`. Identity
//! rows (users, sessions) are owned by the repository in
//! [`crate::auth::repository`]; both share the pool created here.

pub mod repository;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use std::str::FromStr;
use thiserror::Error;

use crate::records::RecordError;

pub use repository::{AlertCounts, AlertRepository, RecordCounts, RecordRepository, SqliteStore};

/// Error type for persistence operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(String),

    /// A stored row carries a `record_type` outside the known vocabulary.
    /// Only a defective writer can produce this; it is never coerced.
    #[error("invalid record type in stored row: {0}")]
    InvalidRecordType(String),

    /// A stored metrics payload no longer matches its record type's schema.
    #[error("invalid metrics in stored row: {0}")]
    InvalidMetrics(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<RecordError> for StoreError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::InvalidRecordType(v) => Self::InvalidRecordType(v),
            RecordError::InvalidMetrics(v) => Self::InvalidMetrics(v),
        }
    }
}

/// Embedded schema, applied on every startup. Everything is `IF NOT EXISTS`
/// so reapplication is a no-op.
const SCHEMA: &str = r"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        full_name TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'farmer',
        farm_name TEXT,
        location TEXT,
        phone TEXT,
        is_active BOOLEAN NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS sessions (
        token_hash TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        created_at TEXT NOT NULL,
        expires_at TEXT NOT NULL,
        FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS health_records (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        record_type TEXT NOT NULL,
        subject_name TEXT NOT NULL,
        metrics TEXT,
        status TEXT NOT NULL,
        notes TEXT,
        created_at TEXT NOT NULL,
        FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS alerts (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        title TEXT NOT NULL,
        message TEXT NOT NULL,
        severity TEXT NOT NULL,
        category TEXT NOT NULL,
        is_read BOOLEAN NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
    CREATE INDEX IF NOT EXISTS idx_sessions_expires ON sessions(expires_at);
    CREATE INDEX IF NOT EXISTS idx_records_user_created ON health_records(user_id, created_at DESC);
    CREATE INDEX IF NOT EXISTS idx_records_user_type ON health_records(user_id, record_type);
    CREATE INDEX IF NOT EXISTS idx_alerts_user_created ON alerts(user_id, created_at DESC);
    CREATE INDEX IF NOT EXISTS idx_alerts_user_unread ON alerts(user_id, is_read);
";

/// Opens (and creates, if missing) the database and returns the shared pool.
///
/// # Errors
///
/// Returns [`StoreError::Database`] if the URL is malformed or the
/// connection cannot be established.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<Pool<Sqlite>, StoreError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| StoreError::Database(format!("invalid database url: {e}")))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema. Safe to call on every startup.
///
/// # Errors
///
/// Returns [`StoreError::Database`] if schema execution fails.
pub async fn ensure_schema(pool: &Pool<Sqlite>) -> Result<(), StoreError> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}
