//! Instrument tree use-case service.
//!
//! # Responsibility
//! - Apply tree mutations to a stored survey and persist the result.
//! - Serve per-node question lookups for the editing screens.
//!
//! # Invariants
//! - Tree rejections (`InvalidLevel` family) never touch the store.
//! - Node deletion cascade-deletes the questions of the removed subtree.

use crate::model::instrument::{NodeId, NodeLevel};
use crate::model::question::Question;
use crate::model::survey::{Survey, SurveyId};
use crate::repo::survey_repo::SurveyRepository;
use crate::service::{ServiceError, ServiceResult};
use log::{info, warn};

/// Use-case facade for instrument tree editing.
pub struct InstrumentService<R: SurveyRepository> {
    repo: R,
}

impl<R: SurveyRepository> InstrumentService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Inserts a node at `level` under `parent_id` and returns its id.
    ///
    /// # Errors
    /// - [`ServiceError::Tree`] when the level/parent pairing is invalid;
    ///   the survey document is left unchanged.
    /// - [`ServiceError::SurveyNotFound`] when the survey id is unknown.
    pub fn create_node(
        &self,
        survey_id: SurveyId,
        level: NodeLevel,
        parent_id: Option<NodeId>,
        name: &str,
    ) -> ServiceResult<NodeId> {
        let mut survey = self.load(survey_id)?;
        let node_id = survey
            .instrument_structure
            .insert_node(level, parent_id, name)?;
        self.repo.save_survey(&survey)?;
        info!(
            "event=node_created module=service status=ok survey={survey_id} node={node_id} level={level}"
        );
        Ok(node_id)
    }

    /// Deletes a node and its subtree, cascading to assigned questions.
    ///
    /// Returns the removed node ids; unknown node ids are a logged no-op
    /// returning an empty vec.
    pub fn delete_node(&self, survey_id: SurveyId, node_id: NodeId) -> ServiceResult<Vec<NodeId>> {
        let mut survey = self.load(survey_id)?;
        let removed = survey.remove_instrument_node(node_id);
        if removed.is_empty() {
            warn!("event=node_deleted module=service status=noop survey={survey_id} node={node_id}");
            return Ok(removed);
        }
        self.repo.save_survey(&survey)?;
        info!(
            "event=node_deleted module=service status=ok survey={survey_id} node={node_id} removed={} questions_left={}",
            removed.len(),
            survey.total_questions
        );
        Ok(removed)
    }

    /// Renames a node. Unknown node ids are a logged no-op returning `false`.
    pub fn rename_node(
        &self,
        survey_id: SurveyId,
        node_id: NodeId,
        name: &str,
    ) -> ServiceResult<bool> {
        let mut survey = self.load(survey_id)?;
        if !survey.instrument_structure.rename_node(node_id, name) {
            warn!("event=node_renamed module=service status=noop survey={survey_id} node={node_id}");
            return Ok(false);
        }
        self.repo.save_survey(&survey)?;
        Ok(true)
    }

    /// Questions directly assigned to the node, in number order.
    pub fn questions_for_instrument(
        &self,
        survey_id: SurveyId,
        node_id: NodeId,
    ) -> ServiceResult<Vec<Question>> {
        let survey = self.load(survey_id)?;
        Ok(survey
            .questions_for_instrument(node_id)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Question count over the node and all its descendants.
    pub fn count_questions_recursive(
        &self,
        survey_id: SurveyId,
        node_id: NodeId,
    ) -> ServiceResult<usize> {
        let survey = self.load(survey_id)?;
        Ok(survey.count_questions_recursive(node_id))
    }

    fn load(&self, survey_id: SurveyId) -> ServiceResult<Survey> {
        self.repo
            .get_survey(survey_id)?
            .ok_or(ServiceError::SurveyNotFound(survey_id))
    }
}
