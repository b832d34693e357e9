//! Core domain logic for SurveyForge: survey authoring, instrument
//! hierarchies and question ordering. This crate is the single source of
//! truth for the editing invariants; presentation layers call in through
//! the services and never mutate stored documents directly.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::code::{instrument_code, is_instrument_code, is_survey_code, survey_code};
pub use model::instrument::{InstrumentNode, InstrumentTree, NodeId, NodeLevel, TreeError};
pub use model::post_submit::{PostSubmitDraft, PostSubmitInfo, POST_SUBMIT_STORAGE_KEY};
pub use model::question::{
    Question, QuestionDraft, QuestionId, QuestionOption, QuestionType, QuestionValidationError,
    ALL_RESPONDENTS,
};
pub use model::question_bank::{BankItemId, QuestionBankItem};
pub use model::respondent::{
    AnswerValue, Respondent, RespondentId, RespondentRegistry, VerificationStatus,
};
pub use model::survey::{
    CreateSurveyRequest, Survey, SurveyId, SurveyStatus, SurveyValidationError,
};
pub use repo::post_submit_repo::{PostSubmitRepository, SqlitePostSubmitRepository};
pub use repo::question_bank_repo::{QuestionBankRepository, SqliteQuestionBankRepository};
pub use repo::survey_repo::{SqliteSurveyRepository, SurveyRepoError, SurveyRepository};
pub use service::instrument_service::InstrumentService;
pub use service::post_submit_service::PostSubmitService;
pub use service::question_service::QuestionService;
pub use service::survey_service::SurveyService;
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
