//! Question domain model.
//!
//! # Responsibility
//! - Define the question shape, answer-type enum and option list.
//! - Keep the option-presence invariant tied to the answer type.
//!
//! # Invariants
//! - `options` is a non-empty list exactly when the type is option-bearing
//!   (single select, multi select, dropdown) and absent otherwise.
//! - `question_number` is owned by the survey aggregate; this module never
//!   assigns or rewrites it.

use crate::model::instrument::NodeId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable question identifier.
pub type QuestionId = Uuid;

/// Job-type tag meaning the question targets every respondent.
pub const ALL_RESPONDENTS: &str = "all";

/// Answer type of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// Single-line free text.
    ShortAnswer,
    /// Multi-line free text.
    Paragraph,
    /// Pick exactly one option.
    SingleSelect,
    /// Pick any number of options.
    MultiSelect,
    /// Pick one option from a dropdown list.
    Dropdown,
}

impl QuestionType {
    /// Whether this type requires an option list.
    pub fn has_options(self) -> bool {
        matches!(self, Self::SingleSelect | Self::MultiSelect | Self::Dropdown)
    }
}

impl Display for QuestionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::ShortAnswer => "short_answer",
            Self::Paragraph => "paragraph",
            Self::SingleSelect => "single_select",
            Self::MultiSelect => "multi_select",
            Self::Dropdown => "dropdown",
        };
        write!(f, "{label}")
    }
}

/// One selectable answer option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Option id, unique within the question.
    pub id: String,
    /// Display text.
    pub text: String,
    /// Stored answer value.
    pub value: String,
}

/// Violations of the question shape invariants.
#[derive(Debug, PartialEq, Eq)]
pub enum QuestionValidationError {
    /// Title is empty after trimming.
    BlankTitle,
    /// An option-bearing type has no options.
    MissingOptions(QuestionType),
    /// A free-text type carries options.
    UnexpectedOptions(QuestionType),
}

impl Display for QuestionValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "question title must not be blank"),
            Self::MissingOptions(kind) => {
                write!(f, "question type `{kind}` requires a non-empty option list")
            }
            Self::UnexpectedOptions(kind) => {
                write!(f, "question type `{kind}` must not carry options")
            }
        }
    }
}

impl Error for QuestionValidationError {}

/// Caller-supplied question data, before the survey assigns id and number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    /// Instrument node the question is assigned to (any level).
    pub instrument_id: NodeId,
    /// Question text shown to respondents.
    pub title: String,
    /// Answer type.
    pub kind: QuestionType,
    /// Whether an answer is mandatory.
    pub required: bool,
    /// Options for option-bearing types, `None` otherwise.
    pub options: Option<Vec<QuestionOption>>,
    /// Input placeholder for free-text types.
    pub placeholder: Option<String>,
    /// Respondent job-type filter, [`ALL_RESPONDENTS`] for no filtering.
    pub respondent_job_type: String,
}

/// Canonical question record inside a survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Stable question id.
    pub id: QuestionId,
    /// Owning instrument node id.
    pub instrument_id: NodeId,
    /// Survey-wide display position, densely packed `1..=N`.
    pub question_number: u32,
    /// Question text shown to respondents.
    pub title: String,
    /// Serialized as `type` to match the external schema naming.
    #[serde(rename = "type")]
    pub kind: QuestionType,
    /// Whether an answer is mandatory.
    pub required: bool,
    /// Options for option-bearing types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<QuestionOption>>,
    /// Input placeholder for free-text types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Respondent job-type filter.
    pub respondent_job_type: String,
}

impl Question {
    /// Materializes a draft into a question with a fresh id and the number
    /// handed out by the owning survey.
    pub fn from_draft(draft: QuestionDraft, question_number: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            instrument_id: draft.instrument_id,
            question_number,
            title: draft.title,
            kind: draft.kind,
            required: draft.required,
            options: draft.options,
            placeholder: draft.placeholder,
            respondent_job_type: draft.respondent_job_type,
        }
    }

    /// Changes the answer type, clearing options when the new type does not
    /// carry any. Options for a newly option-bearing type are the caller's
    /// responsibility (and checked by [`Question::validate`]).
    pub fn set_kind(&mut self, kind: QuestionType) {
        self.kind = kind;
        if !kind.has_options() {
            self.options = None;
        }
    }

    /// Checks the shape invariants.
    ///
    /// # Errors
    /// - [`QuestionValidationError::BlankTitle`]
    /// - [`QuestionValidationError::MissingOptions`]
    /// - [`QuestionValidationError::UnexpectedOptions`]
    pub fn validate(&self) -> Result<(), QuestionValidationError> {
        if self.title.trim().is_empty() {
            return Err(QuestionValidationError::BlankTitle);
        }
        let has_options = self
            .options
            .as_ref()
            .map(|options| !options.is_empty())
            .unwrap_or(false);
        if self.kind.has_options() && !has_options {
            return Err(QuestionValidationError::MissingOptions(self.kind));
        }
        if !self.kind.has_options() && self.options.is_some() {
            return Err(QuestionValidationError::UnexpectedOptions(self.kind));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Question, QuestionDraft, QuestionOption, QuestionType, QuestionValidationError,
        ALL_RESPONDENTS,
    };
    use uuid::Uuid;

    fn draft(kind: QuestionType, options: Option<Vec<QuestionOption>>) -> QuestionDraft {
        QuestionDraft {
            instrument_id: Uuid::new_v4(),
            title: "How satisfied are you?".to_string(),
            kind,
            required: true,
            options,
            placeholder: None,
            respondent_job_type: ALL_RESPONDENTS.to_string(),
        }
    }

    fn sample_options() -> Vec<QuestionOption> {
        vec![
            QuestionOption {
                id: "opt1".to_string(),
                text: "Satisfied".to_string(),
                value: "4".to_string(),
            },
            QuestionOption {
                id: "opt2".to_string(),
                text: "Unsatisfied".to_string(),
                value: "2".to_string(),
            },
        ]
    }

    #[test]
    fn option_presence_follows_the_type() {
        let valid = Question::from_draft(
            draft(QuestionType::SingleSelect, Some(sample_options())),
            1,
        );
        assert_eq!(valid.validate(), Ok(()));

        let missing = Question::from_draft(draft(QuestionType::Dropdown, None), 1);
        assert_eq!(
            missing.validate(),
            Err(QuestionValidationError::MissingOptions(
                QuestionType::Dropdown
            ))
        );

        let empty = Question::from_draft(draft(QuestionType::MultiSelect, Some(Vec::new())), 1);
        assert_eq!(
            empty.validate(),
            Err(QuestionValidationError::MissingOptions(
                QuestionType::MultiSelect
            ))
        );

        let unexpected = Question::from_draft(
            draft(QuestionType::ShortAnswer, Some(sample_options())),
            1,
        );
        assert_eq!(
            unexpected.validate(),
            Err(QuestionValidationError::UnexpectedOptions(
                QuestionType::ShortAnswer
            ))
        );
    }

    #[test]
    fn set_kind_clears_options_when_leaving_option_bearing_type() {
        let mut question = Question::from_draft(
            draft(QuestionType::SingleSelect, Some(sample_options())),
            3,
        );
        question.set_kind(QuestionType::Paragraph);
        assert_eq!(question.options, None);
        assert_eq!(question.validate(), Ok(()));
        assert_eq!(question.question_number, 3);
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut question = Question::from_draft(draft(QuestionType::ShortAnswer, None), 1);
        question.title = "   ".to_string();
        assert_eq!(
            question.validate(),
            Err(QuestionValidationError::BlankTitle)
        );
    }
}
