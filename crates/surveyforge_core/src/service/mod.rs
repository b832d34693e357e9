//! Use-case services over the survey domain and local store.
//!
//! # Responsibility
//! - Orchestrate load-mutate-save cycles around the model operations.
//! - Keep presentation layers decoupled from storage and tree details.
//!
//! # Invariants
//! - A rejected mutation never reaches the store; the persisted document
//!   only changes after the model accepted the operation.

pub mod instrument_service;
pub mod post_submit_service;
pub mod question_service;
pub mod survey_service;

use crate::model::instrument::TreeError;
use crate::model::question::QuestionValidationError;
use crate::model::survey::{SurveyId, SurveyValidationError};
use crate::repo::survey_repo::SurveyRepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors from survey-editing services.
#[derive(Debug)]
pub enum ServiceError {
    /// Create-survey form fields failed validation.
    Survey(SurveyValidationError),
    /// Question shape invariants failed.
    Question(QuestionValidationError),
    /// Instrument tree rejected the mutation; the tree is unchanged.
    Tree(TreeError),
    /// Target survey does not exist.
    SurveyNotFound(SurveyId),
    /// Persistence failure.
    Repo(SurveyRepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Survey(err) => write!(f, "{err}"),
            Self::Question(err) => write!(f, "{err}"),
            Self::Tree(err) => write!(f, "{err}"),
            Self::SurveyNotFound(id) => write!(f, "survey not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Survey(err) => Some(err),
            Self::Question(err) => Some(err),
            Self::Tree(err) => Some(err),
            Self::SurveyNotFound(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<SurveyValidationError> for ServiceError {
    fn from(value: SurveyValidationError) -> Self {
        Self::Survey(value)
    }
}

impl From<QuestionValidationError> for ServiceError {
    fn from(value: QuestionValidationError) -> Self {
        Self::Question(value)
    }
}

impl From<TreeError> for ServiceError {
    fn from(value: TreeError) -> Self {
        Self::Tree(value)
    }
}

impl From<SurveyRepoError> for ServiceError {
    fn from(value: SurveyRepoError) -> Self {
        match value {
            SurveyRepoError::SurveyNotFound(id) => Self::SurveyNotFound(id),
            other => Self::Repo(other),
        }
    }
}
