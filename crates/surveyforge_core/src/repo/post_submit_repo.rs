//! Post-submit info panel persistence.
//!
//! # Responsibility
//! - Store the panel as one JSON document under the fixed settings key.
//! - Apply the legacy-payload migration while loading.
//!
//! # Invariants
//! - Loading never writes: the migrated shape is materialized in memory and
//!   only persisted again on the next save.

use crate::db::DbError;
use crate::model::post_submit::{migrate_stored_payload, PostSubmitInfo, POST_SUBMIT_STORAGE_KEY};
use crate::repo::{schema_version_matches, SchemaMismatch};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PostSubmitRepoResult<T> = Result<T, PostSubmitRepoError>;

/// Errors from post-submit panel persistence.
#[derive(Debug)]
pub enum PostSubmitRepoError {
    /// Underlying store failure.
    Db(DbError),
    /// Connection schema is not at the expected version.
    Schema(SchemaMismatch),
    /// Stored document cannot be decoded, even after migration.
    InvalidBody(String),
}

impl Display for PostSubmitRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Schema(err) => write!(f, "{err}"),
            Self::InvalidBody(message) => {
                write!(f, "invalid post-submit info body: {message}")
            }
        }
    }
}

impl Error for PostSubmitRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Schema(err) => Some(err),
            Self::InvalidBody(_) => None,
        }
    }
}

impl From<DbError> for PostSubmitRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PostSubmitRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<SchemaMismatch> for PostSubmitRepoError {
    fn from(value: SchemaMismatch) -> Self {
        Self::Schema(value)
    }
}

/// Repository interface for the post-submit panel document.
pub trait PostSubmitRepository {
    /// Loads the panel, upgrading legacy payloads. `None` when never saved.
    fn load_info(&self) -> PostSubmitRepoResult<Option<PostSubmitInfo>>;
    /// Writes the panel document, replacing any previous version.
    fn save_info(&self, info: &PostSubmitInfo) -> PostSubmitRepoResult<()>;
}

/// SQLite-backed post-submit panel repository.
pub struct SqlitePostSubmitRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePostSubmitRepository<'conn> {
    /// Creates a repository over a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> PostSubmitRepoResult<Self> {
        schema_version_matches(conn)?;
        Ok(Self { conn })
    }
}

impl PostSubmitRepository for SqlitePostSubmitRepository<'_> {
    fn load_info(&self) -> PostSubmitRepoResult<Option<PostSubmitInfo>> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM settings WHERE key = ?1;",
                [POST_SUBMIT_STORAGE_KEY],
                |row| row.get(0),
            )
            .optional()?;
        let Some(body) = body else {
            return Ok(None);
        };

        let payload: serde_json::Value = serde_json::from_str(&body)
            .map_err(|err| PostSubmitRepoError::InvalidBody(err.to_string()))?;
        let info = serde_json::from_value(migrate_stored_payload(payload))
            .map_err(|err| PostSubmitRepoError::InvalidBody(err.to_string()))?;
        Ok(Some(info))
    }

    fn save_info(&self, info: &PostSubmitInfo) -> PostSubmitRepoResult<()> {
        let body = serde_json::to_string(info)
            .map_err(|err| PostSubmitRepoError::InvalidBody(err.to_string()))?;
        self.conn.execute(
            "INSERT INTO settings (key, body)
             VALUES (?1, ?2)
             ON CONFLICT (key) DO UPDATE
             SET body = excluded.body,
                 updated_at = (strftime('%s', 'now') * 1000);",
            params![POST_SUBMIT_STORAGE_KEY, body],
        )?;
        Ok(())
    }
}
