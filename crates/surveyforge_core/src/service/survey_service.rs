//! Survey aggregate use-case service.
//!
//! # Responsibility
//! - Create, list, filter, status-toggle and delete surveys.
//! - Assign sequential survey codes from the stored count.
//!
//! # Invariants
//! - Deleting a survey discards its tree and question list in one step;
//!   no partial-delete state is observable through this service.

use crate::model::code::survey_code;
use crate::model::now_epoch_ms;
use crate::model::survey::{CreateSurveyRequest, Survey, SurveyId, SurveyStatus};
use crate::repo::survey_repo::SurveyRepository;
use crate::service::{ServiceError, ServiceResult};
use log::{info, warn};

/// Use-case facade for survey CRUD and filtering.
pub struct SurveyService<R: SurveyRepository> {
    repo: R,
}

impl<R: SurveyRepository> SurveyService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a survey from validated form data and persists it.
    ///
    /// The code is `SRV` + zero-padded sequential index derived from the
    /// stored survey count.
    ///
    /// # Errors
    /// - [`ServiceError::Survey`] for blank title/description.
    pub fn create_survey(&self, request: CreateSurveyRequest) -> ServiceResult<Survey> {
        request.validate()?;
        let code = survey_code(self.repo.count_surveys()? as usize + 1);
        let survey = Survey::create(code, request, now_epoch_ms());
        self.repo.insert_survey(&survey)?;
        info!(
            "event=survey_created module=service status=ok survey={} code={} nodes={}",
            survey.id,
            survey.code,
            survey.instrument_structure.len()
        );
        Ok(survey)
    }

    /// Loads one survey by id.
    pub fn get_survey(&self, id: SurveyId) -> ServiceResult<Option<Survey>> {
        Ok(self.repo.get_survey(id)?)
    }

    /// Loads all surveys in creation order.
    pub fn list_surveys(&self) -> ServiceResult<Vec<Survey>> {
        Ok(self.repo.list_surveys()?)
    }

    /// Surveys matching a case-insensitive substring of title or code,
    /// intersected with a status (`None` keeps all statuses).
    pub fn filter_surveys(
        &self,
        search_term: &str,
        status: Option<SurveyStatus>,
    ) -> ServiceResult<Vec<Survey>> {
        let surveys = self.repo.list_surveys()?;
        Ok(surveys
            .into_iter()
            .filter(|survey| survey.matches_filter(search_term, status))
            .collect())
    }

    /// Sets the publication status of a survey.
    ///
    /// # Errors
    /// - [`ServiceError::SurveyNotFound`] when the id is unknown.
    pub fn update_survey_status(&self, id: SurveyId, status: SurveyStatus) -> ServiceResult<()> {
        let mut survey = self
            .repo
            .get_survey(id)?
            .ok_or(ServiceError::SurveyNotFound(id))?;
        survey.status = status;
        self.repo.save_survey(&survey)?;
        info!("event=survey_status module=service status=ok survey={id} value={status}");
        Ok(())
    }

    /// Deletes a survey with everything it owns.
    ///
    /// Unknown ids are a logged no-op returning `false`.
    pub fn delete_survey(&self, id: SurveyId) -> ServiceResult<bool> {
        let deleted = self.repo.delete_survey(id)?;
        match deleted {
            true => info!("event=survey_deleted module=service status=ok survey={id}"),
            false => warn!("event=survey_deleted module=service status=noop survey={id}"),
        }
        Ok(deleted)
    }
}
