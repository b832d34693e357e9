//! SQLite local-store bootstrap.
//!
//! # Responsibility
//! - Open file or in-memory connections for the survey local store.
//! - Apply schema migrations before handing the connection out.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and all migrations applied.
//! - Schema version is tracked via `PRAGMA user_version`.

use log::{error, info};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Instant;

pub mod migrations;

use migrations::apply_migrations;

pub type DbResult<T> = Result<T, DbError>;

/// Errors from store bootstrap and migration.
#[derive(Debug)]
pub enum DbError {
    /// Underlying SQLite failure.
    Sqlite(rusqlite::Error),
    /// The store was written by a newer build than this one supports.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "store schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Opens the store at `path` and applies pending migrations.
pub fn open_store(path: impl AsRef<Path>) -> DbResult<Connection> {
    let started_at = Instant::now();
    let mut conn = Connection::open(path).inspect_err(|err| {
        error!(
            "event=store_open module=db status=error mode=file duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        );
    })?;
    bootstrap(&mut conn, "file", started_at)?;
    Ok(conn)
}

/// Opens a fresh in-memory store, fully migrated. Used by tests and previews.
pub fn open_store_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    let mut conn = Connection::open_in_memory().inspect_err(|err| {
        error!(
            "event=store_open module=db status=error mode=memory duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        );
    })?;
    bootstrap(&mut conn, "memory", started_at)?;
    Ok(conn)
}

fn bootstrap(conn: &mut Connection, mode: &str, started_at: Instant) -> DbResult<()> {
    let result = conn
        .pragma_update(None, "foreign_keys", "ON")
        .map_err(DbError::from)
        .and_then(|()| apply_migrations(conn));
    match &result {
        Ok(()) => info!(
            "event=store_open module=db status=ok mode={mode} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=store_open module=db status=error mode={mode} duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        ),
    }
    result
}
