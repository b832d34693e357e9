//! Post-submission info panel model and stored-payload migration.
//!
//! # Responsibility
//! - Define the panel shown to respondents after submitting, persisted as a
//!   single JSON document under a fixed settings key.
//! - Upgrade the legacy single-survey payload shape on load.
//!
//! # Invariants
//! - The migration is idempotent: already-migrated payloads pass through
//!   unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fixed settings key the panel document is stored under.
pub const POST_SUBMIT_STORAGE_KEY: &str = "postSubmitInfo";

/// Post-submission info panel configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSubmitInfo {
    /// Singleton record id.
    pub id: String,
    pub title: String,
    pub description: String,
    /// Surveys the panel links to after submission.
    pub selected_survey_ids: Vec<String>,
    pub is_active: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

/// Caller-supplied panel fields; id and timestamps are managed on save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSubmitDraft {
    pub title: String,
    pub description: String,
    pub selected_survey_ids: Vec<String>,
    pub is_active: bool,
}

/// Upgrades a stored panel payload from the legacy schema in place.
///
/// The legacy shape carried a singular `selectedSurveyId`; it becomes
/// `selectedSurveyIds: [value]` (or `[]` for an empty value) and the old key
/// is dropped. Payloads already carrying `selectedSurveyIds` are returned
/// unchanged, so applying the migration twice equals applying it once.
pub fn migrate_stored_payload(mut payload: Value) -> Value {
    let Some(object) = payload.as_object_mut() else {
        return payload;
    };
    if object.contains_key("selectedSurveyIds") {
        object.remove("selectedSurveyId");
        return payload;
    }
    if let Some(legacy) = object.remove("selectedSurveyId") {
        let ids = match legacy {
            Value::String(id) if !id.is_empty() => vec![Value::String(id)],
            _ => Vec::new(),
        };
        object.insert("selectedSurveyIds".to_string(), Value::Array(ids));
    }
    payload
}
