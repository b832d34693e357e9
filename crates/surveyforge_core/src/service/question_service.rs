//! Question assignment and ordering use-case service.
//!
//! # Responsibility
//! - Add, update, delete and reorder questions of a stored survey.
//!
//! # Invariants
//! - After every persisted mutation the survey's question numbers are the
//!   dense permutation `1..=N`.
//! - Boundary moves and unknown targets are no-ops that skip the save.

use crate::model::question::{Question, QuestionDraft, QuestionId};
use crate::model::survey::{Survey, SurveyId};
use crate::repo::survey_repo::SurveyRepository;
use crate::service::{ServiceError, ServiceResult};
use log::{info, warn};

/// Use-case facade for question editing.
pub struct QuestionService<R: SurveyRepository> {
    repo: R,
}

impl<R: SurveyRepository> QuestionService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Appends a question with the next sequential number.
    ///
    /// # Errors
    /// - [`ServiceError::Question`] when the draft violates the shape
    ///   invariants (blank title, option/type mismatch).
    /// - [`ServiceError::SurveyNotFound`] when the survey id is unknown.
    pub fn add_question(
        &self,
        survey_id: SurveyId,
        draft: QuestionDraft,
    ) -> ServiceResult<QuestionId> {
        let mut survey = self.load(survey_id)?;
        let question_id = survey.add_question(draft)?;
        self.repo.save_survey(&survey)?;
        info!(
            "event=question_added module=service status=ok survey={survey_id} question={question_id} total={}",
            survey.total_questions
        );
        Ok(question_id)
    }

    /// Replaces a question in place; number and ordering stay untouched.
    ///
    /// Unknown question ids are a logged no-op returning `false`.
    pub fn update_question(&self, survey_id: SurveyId, question: Question) -> ServiceResult<bool> {
        let mut survey = self.load(survey_id)?;
        let question_id = question.id;
        if !survey.update_question(question)? {
            warn!(
                "event=question_updated module=service status=noop survey={survey_id} question={question_id}"
            );
            return Ok(false);
        }
        self.repo.save_survey(&survey)?;
        Ok(true)
    }

    /// Deletes a question and renumbers the survivors densely.
    ///
    /// Unknown question ids are a logged no-op returning `false`.
    pub fn delete_question(
        &self,
        survey_id: SurveyId,
        question_id: QuestionId,
    ) -> ServiceResult<bool> {
        let mut survey = self.load(survey_id)?;
        if !survey.delete_question(question_id) {
            warn!(
                "event=question_deleted module=service status=noop survey={survey_id} question={question_id}"
            );
            return Ok(false);
        }
        self.repo.save_survey(&survey)?;
        info!(
            "event=question_deleted module=service status=ok survey={survey_id} question={question_id} total={}",
            survey.total_questions
        );
        Ok(true)
    }

    /// Swaps the question with its survey-wide predecessor.
    ///
    /// The first question (and unknown ids) are a no-op returning `false`.
    pub fn move_question_up(
        &self,
        survey_id: SurveyId,
        question_id: QuestionId,
    ) -> ServiceResult<bool> {
        let mut survey = self.load(survey_id)?;
        if !survey.move_question_up(question_id) {
            return Ok(false);
        }
        self.repo.save_survey(&survey)?;
        Ok(true)
    }

    /// Swaps the question with its survey-wide successor.
    ///
    /// The last question (and unknown ids) are a no-op returning `false`.
    pub fn move_question_down(
        &self,
        survey_id: SurveyId,
        question_id: QuestionId,
    ) -> ServiceResult<bool> {
        let mut survey = self.load(survey_id)?;
        if !survey.move_question_down(question_id) {
            return Ok(false);
        }
        self.repo.save_survey(&survey)?;
        Ok(true)
    }

    fn load(&self, survey_id: SurveyId) -> ServiceResult<Survey> {
        self.repo
            .get_survey(survey_id)?
            .ok_or(ServiceError::SurveyNotFound(survey_id))
    }
}
