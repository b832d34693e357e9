//! Persistence contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access traits for the local store.
//! - Keep SQL and JSON-document details inside the repository boundary.
//!
//! # Invariants
//! - Listing order is deterministic (`created_at ASC, uuid ASC`).
//! - Read paths reject invalid persisted bodies instead of masking them.

pub mod post_submit_repo;
pub mod question_bank_repo;
pub mod survey_repo;

use crate::db::migrations::latest_version;
use rusqlite::Connection;

/// Checks that the connection carries the schema this build expects.
///
/// Repositories call this in their constructors so later queries can assume
/// migrated tables.
pub(crate) fn schema_version_matches(conn: &Connection) -> Result<(), SchemaMismatch> {
    let expected = latest_version();
    let actual: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .map_err(|_| SchemaMismatch {
            expected_version: expected,
            actual_version: 0,
        })?;
    if actual != expected {
        return Err(SchemaMismatch {
            expected_version: expected,
            actual_version: actual,
        });
    }
    Ok(())
}

/// Connection is not at the migrated schema version repositories require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaMismatch {
    pub expected_version: u32,
    pub actual_version: u32,
}

impl std::fmt::Display for SchemaMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "repository requires schema version {}, got {}",
            self.expected_version, self.actual_version
        )
    }
}

impl std::error::Error for SchemaMismatch {}
