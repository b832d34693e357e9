//! Question bank repository.
//!
//! # Responsibility
//! - CRUD, bulk import and lookup queries over reusable question snippets.
//!
//! # Invariants
//! - Listing and search order is `created_at ASC, item_uuid ASC`.
//! - Bulk import is transactional: either every item lands or none does.

use crate::db::DbError;
use crate::model::question::QuestionType;
use crate::model::question_bank::{BankItemId, QuestionBankItem};
use crate::repo::{schema_version_matches, SchemaMismatch};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ITEM_SELECT_SQL: &str = "SELECT item_uuid, question, question_type, created_at, updated_at
FROM question_bank";

pub type BankRepoResult<T> = Result<T, BankRepoError>;

/// Errors from question bank persistence.
#[derive(Debug)]
pub enum BankRepoError {
    /// Underlying store failure.
    Db(DbError),
    /// Connection schema is not at the expected version.
    Schema(SchemaMismatch),
    /// Target item does not exist.
    ItemNotFound(BankItemId),
    /// Persisted row cannot be converted to a valid item.
    InvalidData(String),
}

impl Display for BankRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Schema(err) => write!(f, "{err}"),
            Self::ItemNotFound(id) => write!(f, "question bank item not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid question bank data: {message}"),
        }
    }
}

impl Error for BankRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Schema(err) => Some(err),
            Self::ItemNotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for BankRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for BankRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<SchemaMismatch> for BankRepoError {
    fn from(value: SchemaMismatch) -> Self {
        Self::Schema(value)
    }
}

/// Repository interface for question bank items.
pub trait QuestionBankRepository {
    fn create_item(&self, item: &QuestionBankItem) -> BankRepoResult<BankItemId>;
    /// Full replace by id; bumps nothing itself, callers stamp `updated_at`.
    fn update_item(&self, item: &QuestionBankItem) -> BankRepoResult<()>;
    fn delete_item(&self, id: BankItemId) -> BankRepoResult<bool>;
    fn get_item(&self, id: BankItemId) -> BankRepoResult<Option<QuestionBankItem>>;
    fn list_items(&self) -> BankRepoResult<Vec<QuestionBankItem>>;
    /// Inserts many items in one transaction.
    fn import_items(&self, items: &[QuestionBankItem]) -> BankRepoResult<()>;
    /// Removes every item. Returns the number removed.
    fn clear_items(&self) -> BankRepoResult<usize>;
    /// Case-insensitive substring search over the question text.
    fn search_items(&self, query: &str) -> BankRepoResult<Vec<QuestionBankItem>>;
    fn items_by_type(&self, question_type: QuestionType) -> BankRepoResult<Vec<QuestionBankItem>>;
}

/// SQLite-backed question bank repository.
#[derive(Debug)]
pub struct SqliteQuestionBankRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteQuestionBankRepository<'conn> {
    /// Creates a repository over a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> BankRepoResult<Self> {
        schema_version_matches(conn)?;
        Ok(Self { conn })
    }

    fn collect_items(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> BankRepoResult<Vec<QuestionBankItem>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }
}

impl QuestionBankRepository for SqliteQuestionBankRepository<'_> {
    fn create_item(&self, item: &QuestionBankItem) -> BankRepoResult<BankItemId> {
        self.conn.execute(
            "INSERT INTO question_bank (item_uuid, question, question_type, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                item.id.to_string(),
                item.question.as_str(),
                question_type_to_db(item.question_type),
                item.created_at,
                item.updated_at,
            ],
        )?;
        Ok(item.id)
    }

    fn update_item(&self, item: &QuestionBankItem) -> BankRepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE question_bank
             SET question = ?2,
                 question_type = ?3,
                 updated_at = ?4
             WHERE item_uuid = ?1;",
            params![
                item.id.to_string(),
                item.question.as_str(),
                question_type_to_db(item.question_type),
                item.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(BankRepoError::ItemNotFound(item.id));
        }
        Ok(())
    }

    fn delete_item(&self, id: BankItemId) -> BankRepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM question_bank WHERE item_uuid = ?1;",
            [id.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn get_item(&self, id: BankItemId) -> BankRepoResult<Option<QuestionBankItem>> {
        let sql = format!("{ITEM_SELECT_SQL} WHERE item_uuid = ?1;");
        let mut stmt = self.conn.prepare(&sql)?;
        let item = stmt
            .query_row([id.to_string()], |row| Ok(parse_item_row(row)))
            .optional()?;
        item.transpose()
    }

    fn list_items(&self) -> BankRepoResult<Vec<QuestionBankItem>> {
        let sql = format!("{ITEM_SELECT_SQL} ORDER BY created_at ASC, item_uuid ASC;");
        self.collect_items(&sql, &[])
    }

    fn import_items(&self, items: &[QuestionBankItem]) -> BankRepoResult<()> {
        let tx = rusqlite::Transaction::new_unchecked(
            self.conn,
            rusqlite::TransactionBehavior::Immediate,
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO question_bank (item_uuid, question, question_type, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
            )?;
            for item in items {
                stmt.execute(params![
                    item.id.to_string(),
                    item.question.as_str(),
                    question_type_to_db(item.question_type),
                    item.created_at,
                    item.updated_at,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn clear_items(&self) -> BankRepoResult<usize> {
        let removed = self.conn.execute("DELETE FROM question_bank;", [])?;
        Ok(removed)
    }

    fn search_items(&self, query: &str) -> BankRepoResult<Vec<QuestionBankItem>> {
        let sql = format!(
            r"{ITEM_SELECT_SQL}
             WHERE question LIKE ?1 ESCAPE '\'
             ORDER BY created_at ASC, item_uuid ASC;"
        );
        let pattern = format!("%{}%", escape_like(query));
        self.collect_items(&sql, &[&pattern])
    }

    fn items_by_type(&self, question_type: QuestionType) -> BankRepoResult<Vec<QuestionBankItem>> {
        let sql = format!(
            "{ITEM_SELECT_SQL}
             WHERE question_type = ?1
             ORDER BY created_at ASC, item_uuid ASC;"
        );
        self.collect_items(&sql, &[&question_type_to_db(question_type)])
    }
}

fn question_type_to_db(value: QuestionType) -> &'static str {
    match value {
        QuestionType::ShortAnswer => "short_answer",
        QuestionType::Paragraph => "paragraph",
        QuestionType::SingleSelect => "single_select",
        QuestionType::MultiSelect => "multi_select",
        QuestionType::Dropdown => "dropdown",
    }
}

fn question_type_from_db(value: &str) -> Option<QuestionType> {
    match value {
        "short_answer" => Some(QuestionType::ShortAnswer),
        "paragraph" => Some(QuestionType::Paragraph),
        "single_select" => Some(QuestionType::SingleSelect),
        "multi_select" => Some(QuestionType::MultiSelect),
        "dropdown" => Some(QuestionType::Dropdown),
        _ => None,
    }
}

// LIKE wildcards in user input would silently widen the search.
fn escape_like(query: &str) -> String {
    query
        .replace('\\', r"\\")
        .replace('%', r"\%")
        .replace('_', r"\_")
}

fn parse_item_row(row: &Row<'_>) -> BankRepoResult<QuestionBankItem> {
    let item_uuid: String = row.get(0)?;
    let id = Uuid::parse_str(&item_uuid)
        .map_err(|_| BankRepoError::InvalidData(format!("invalid uuid `{item_uuid}`")))?;
    let type_text: String = row.get(2)?;
    let question_type = question_type_from_db(&type_text).ok_or_else(|| {
        BankRepoError::InvalidData(format!("invalid question type `{type_text}`"))
    })?;
    Ok(QuestionBankItem {
        id,
        question: row.get(1)?,
        question_type,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}
