//! Reusable question bank model.
//!
//! Bank items are standalone question snippets authors pull from when
//! composing a survey; they carry no instrument assignment or numbering.

use crate::model::question::QuestionType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable question bank item identifier.
pub type BankItemId = Uuid;

/// One reusable question snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBankItem {
    /// Stable item id.
    pub id: BankItemId,
    /// Question text.
    pub question: String,
    /// Answer type the snippet is meant for.
    pub question_type: QuestionType,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds, bumped on every update.
    pub updated_at: i64,
}

impl QuestionBankItem {
    /// Creates an item with a generated id and equal create/update stamps.
    pub fn new(question: impl Into<String>, question_type: QuestionType, now: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            question: question.into(),
            question_type,
            created_at: now,
            updated_at: now,
        }
    }
}
