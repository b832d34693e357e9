//! Respondent submissions and staff verification.
//!
//! # Responsibility
//! - Model one submitted response set per respondent.
//! - Track the verification workflow: submissions arrive pending and staff
//!   mark them verified.
//!
//! The registry is an in-process working set for the verification screens;
//! it is not part of the persisted survey documents.

use crate::model::survey::SurveyId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Stable respondent identifier.
pub type RespondentId = Uuid;

/// Staff verification state of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// Submitted, awaiting staff review.
    PendingVerification,
    /// Reviewed and accepted by staff.
    Verified,
}

/// One submitted answer value, keyed by question id in [`Respondent::answers`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// Free-text or single-select answer.
    Text(String),
    /// Multi-select answer.
    Selection(Vec<String>),
    /// Numeric answer.
    Number(i64),
}

/// One respondent's submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Respondent {
    /// Stable respondent id.
    pub id: RespondentId,
    pub name: String,
    pub email: String,
    /// Survey the submission belongs to.
    pub survey_id: Option<SurveyId>,
    pub verification_status: VerificationStatus,
    /// Unix epoch milliseconds.
    pub submitted_at: i64,
    /// Set when staff verify the submission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<i64>,
    /// Answers keyed by question id.
    #[serde(default)]
    pub answers: HashMap<String, AnswerValue>,
}

impl Respondent {
    /// Creates a pending submission.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        survey_id: Option<SurveyId>,
        submitted_at: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            survey_id,
            verification_status: VerificationStatus::PendingVerification,
            submitted_at,
            verified_at: None,
            answers: HashMap::new(),
        }
    }
}

/// In-memory working set of submissions for the verification screens.
#[derive(Debug, Default)]
pub struct RespondentRegistry {
    respondents: Vec<Respondent>,
}

impl RespondentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a submission in arrival order.
    pub fn add(&mut self, respondent: Respondent) -> RespondentId {
        let id = respondent.id;
        self.respondents.push(respondent);
        id
    }

    /// Marks a submission verified and stamps the verification time.
    ///
    /// Returns `false` as a no-op for unknown ids; verifying an already
    /// verified submission keeps the original stamp.
    pub fn mark_verified(&mut self, id: RespondentId, verified_at: i64) -> bool {
        match self.respondents.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                if entry.verification_status != VerificationStatus::Verified {
                    entry.verification_status = VerificationStatus::Verified;
                    entry.verified_at = Some(verified_at);
                }
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: RespondentId) -> Option<&Respondent> {
        self.respondents.iter().find(|entry| entry.id == id)
    }

    /// Submissions still awaiting review, in arrival order.
    pub fn incoming(&self) -> Vec<&Respondent> {
        self.respondents
            .iter()
            .filter(|entry| entry.verification_status == VerificationStatus::PendingVerification)
            .collect()
    }

    /// Verified submissions, in arrival order.
    pub fn verified(&self) -> Vec<&Respondent> {
        self.respondents
            .iter()
            .filter(|entry| entry.verification_status == VerificationStatus::Verified)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.respondents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.respondents.is_empty()
    }
}
