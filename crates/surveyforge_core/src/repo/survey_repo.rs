//! Survey document repository.
//!
//! # Responsibility
//! - Persist survey aggregates as JSON documents in the `surveys` table.
//! - Keep SQL and body encoding inside the repository boundary.
//!
//! # Invariants
//! - `list_surveys` order is `created_at ASC, survey_uuid ASC`.
//! - Save paths never write a body whose id differs from the row key.

use crate::db::DbError;
use crate::model::survey::{Survey, SurveyId};
use crate::repo::{schema_version_matches, SchemaMismatch};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SurveyRepoResult<T> = Result<T, SurveyRepoError>;

/// Errors from survey persistence operations.
#[derive(Debug)]
pub enum SurveyRepoError {
    /// Underlying store failure.
    Db(DbError),
    /// Connection schema is not at the expected version.
    Schema(SchemaMismatch),
    /// Target survey does not exist.
    SurveyNotFound(SurveyId),
    /// Persisted body cannot be decoded into a survey.
    InvalidBody { survey_uuid: String, message: String },
}

impl Display for SurveyRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Schema(err) => write!(f, "{err}"),
            Self::SurveyNotFound(id) => write!(f, "survey not found: {id}"),
            Self::InvalidBody {
                survey_uuid,
                message,
            } => write!(f, "invalid survey body for {survey_uuid}: {message}"),
        }
    }
}

impl Error for SurveyRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Schema(err) => Some(err),
            Self::SurveyNotFound(_) => None,
            Self::InvalidBody { .. } => None,
        }
    }
}

impl From<DbError> for SurveyRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SurveyRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<SchemaMismatch> for SurveyRepoError {
    fn from(value: SchemaMismatch) -> Self {
        Self::Schema(value)
    }
}

/// Repository interface for survey aggregates.
pub trait SurveyRepository {
    /// Persists a freshly created survey.
    fn insert_survey(&self, survey: &Survey) -> SurveyRepoResult<SurveyId>;
    /// Rewrites the document of an existing survey.
    fn save_survey(&self, survey: &Survey) -> SurveyRepoResult<()>;
    /// Loads one survey by id.
    fn get_survey(&self, id: SurveyId) -> SurveyRepoResult<Option<Survey>>;
    /// Loads all surveys in deterministic order.
    fn list_surveys(&self) -> SurveyRepoResult<Vec<Survey>>;
    /// Deletes one survey with everything it owns. `false` when absent.
    fn delete_survey(&self, id: SurveyId) -> SurveyRepoResult<bool>;
    /// Number of stored surveys; feeds sequential code assignment.
    fn count_surveys(&self) -> SurveyRepoResult<u64>;
}

/// SQLite-backed survey repository.
pub struct SqliteSurveyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSurveyRepository<'conn> {
    /// Creates a repository over a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> SurveyRepoResult<Self> {
        schema_version_matches(conn)?;
        Ok(Self { conn })
    }

    fn decode(survey_uuid: &str, body: &str) -> SurveyRepoResult<Survey> {
        serde_json::from_str(body).map_err(|err| SurveyRepoError::InvalidBody {
            survey_uuid: survey_uuid.to_string(),
            message: err.to_string(),
        })
    }

    fn encode(survey: &Survey) -> SurveyRepoResult<String> {
        serde_json::to_string(survey).map_err(|err| SurveyRepoError::InvalidBody {
            survey_uuid: survey.id.to_string(),
            message: err.to_string(),
        })
    }
}

impl SurveyRepository for SqliteSurveyRepository<'_> {
    fn insert_survey(&self, survey: &Survey) -> SurveyRepoResult<SurveyId> {
        let body = Self::encode(survey)?;
        self.conn.execute(
            "INSERT INTO surveys (survey_uuid, body, created_at)
             VALUES (?1, ?2, ?3);",
            params![survey.id.to_string(), body, survey.created_at],
        )?;
        Ok(survey.id)
    }

    fn save_survey(&self, survey: &Survey) -> SurveyRepoResult<()> {
        let body = Self::encode(survey)?;
        let changed = self.conn.execute(
            "UPDATE surveys
             SET body = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE survey_uuid = ?1;",
            params![survey.id.to_string(), body],
        )?;
        if changed == 0 {
            return Err(SurveyRepoError::SurveyNotFound(survey.id));
        }
        Ok(())
    }

    fn get_survey(&self, id: SurveyId) -> SurveyRepoResult<Option<Survey>> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT survey_uuid, body FROM surveys WHERE survey_uuid = ?1;",
                [id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        match row {
            Some((survey_uuid, body)) => Ok(Some(Self::decode(&survey_uuid, &body)?)),
            None => Ok(None),
        }
    }

    fn list_surveys(&self) -> SurveyRepoResult<Vec<Survey>> {
        let mut stmt = self.conn.prepare(
            "SELECT survey_uuid, body
             FROM surveys
             ORDER BY created_at ASC, survey_uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut surveys = Vec::new();
        while let Some(row) = rows.next()? {
            let survey_uuid: String = row.get(0)?;
            let body: String = row.get(1)?;
            surveys.push(Self::decode(&survey_uuid, &body)?);
        }
        Ok(surveys)
    }

    fn delete_survey(&self, id: SurveyId) -> SurveyRepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM surveys WHERE survey_uuid = ?1;",
            [id.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn count_surveys(&self) -> SurveyRepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM surveys;", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
