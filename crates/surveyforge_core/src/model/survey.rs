//! Survey aggregate: metadata, instrument tree and the ordered question list.
//!
//! # Responsibility
//! - Compose the instrument tree, the flat question list and survey metadata
//!   into the persisted unit.
//! - Own question numbering: assignment, compaction and neighbor swaps.
//!
//! # Invariants
//! - After any sequence of add/delete/move operations the question numbers
//!   are exactly the permutation `1..=N`, no gaps, no duplicates.
//! - `total_questions` always equals `questions.len()`.
//! - Removing an instrument node cascade-deletes the questions assigned to
//!   the removed subtree; no dangling `instrument_id` survives.

use crate::model::instrument::{InstrumentNode, InstrumentTree, NodeId};
use crate::model::question::{Question, QuestionDraft, QuestionId, QuestionValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable survey identifier.
pub type SurveyId = Uuid;

/// Publication state of a survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveyStatus {
    /// Open for respondents.
    Active,
    /// Hidden from respondents.
    Inactive,
}

impl Display for SurveyStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

/// Violations of the survey creation contract.
#[derive(Debug, PartialEq, Eq)]
pub enum SurveyValidationError {
    /// Title is empty after trimming.
    BlankTitle,
    /// Description is empty after trimming.
    BlankDescription,
}

impl Display for SurveyValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "survey title must not be blank"),
            Self::BlankDescription => write!(f, "survey description must not be blank"),
        }
    }
}

impl Error for SurveyValidationError {}

/// Request model for creating a survey.
///
/// The instrument structure is supplied wholesale here; incremental edits
/// remain available afterwards through the tree operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSurveyRequest {
    pub title: String,
    pub description: String,
    pub is_active: bool,
    pub instrument_structure: Vec<InstrumentNode>,
}

impl CreateSurveyRequest {
    /// Checks the form-level required fields.
    pub fn validate(&self) -> Result<(), SurveyValidationError> {
        if self.title.trim().is_empty() {
            return Err(SurveyValidationError::BlankTitle);
        }
        if self.description.trim().is_empty() {
            return Err(SurveyValidationError::BlankDescription);
        }
        Ok(())
    }
}

/// Persisted survey aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    /// Stable survey id.
    pub id: SurveyId,
    /// Sequential display code (`SRV001`), its own namespace distinct from
    /// instrument codes.
    pub code: String,
    pub title: String,
    pub description: String,
    pub status: SurveyStatus,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Instrument hierarchy in display order.
    pub instrument_structure: InstrumentTree,
    /// Flat question list; display order is `question_number` order.
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Derived count, kept equal to `questions.len()` by every mutation.
    pub total_questions: u32,
}

impl Survey {
    /// Creates a survey with a fresh id, no questions, and the supplied
    /// instrument structure.
    pub fn create(code: String, request: CreateSurveyRequest, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            code,
            title: request.title,
            description: request.description,
            status: match request.is_active {
                true => SurveyStatus::Active,
                false => SurveyStatus::Inactive,
            },
            created_at,
            instrument_structure: InstrumentTree::from(request.instrument_structure),
            questions: Vec::new(),
            total_questions: 0,
        }
    }

    /// Appends a question with the next free number.
    ///
    /// The number is `max(existing) + 1`, so it is dense as long as the list
    /// was dense before, which every mutation here maintains.
    pub fn add_question(
        &mut self,
        draft: QuestionDraft,
    ) -> Result<QuestionId, QuestionValidationError> {
        let next_number = self
            .questions
            .iter()
            .map(|question| question.question_number)
            .max()
            .unwrap_or(0)
            + 1;
        let question = Question::from_draft(draft, next_number);
        question.validate()?;
        let id = question.id;
        self.questions.push(question);
        self.total_questions = self.questions.len() as u32;
        Ok(id)
    }

    /// Replaces the question with the matching id in place.
    ///
    /// The stored `question_number` wins over whatever the update carries;
    /// ordering is only changed through the move operations. Returns `false`
    /// as a no-op when the id is unknown.
    pub fn update_question(
        &mut self,
        updated: Question,
    ) -> Result<bool, QuestionValidationError> {
        let Some(existing) = self
            .questions
            .iter_mut()
            .find(|question| question.id == updated.id)
        else {
            return Ok(false);
        };
        let number = existing.question_number;
        let mut replacement = updated;
        replacement.question_number = number;
        replacement.validate()?;
        *existing = replacement;
        Ok(true)
    }

    /// Deletes a question and renumbers the survivors densely.
    ///
    /// Survivors keep their relative order: they are sorted by the current
    /// number and reassigned `1..=N`. Returns `false` as a no-op when the id
    /// is unknown.
    pub fn delete_question(&mut self, id: QuestionId) -> bool {
        let before = self.questions.len();
        self.questions.retain(|question| question.id != id);
        if self.questions.len() == before {
            return false;
        }
        self.renumber_questions();
        true
    }

    /// Swaps the question with its survey-wide predecessor in number order.
    ///
    /// Returns `false` without changes for the first question or an unknown
    /// id. The neighbor is taken from the full flat list, not scoped to the
    /// question's instrument.
    pub fn move_question_up(&mut self, id: QuestionId) -> bool {
        self.swap_with_neighbor(id, Direction::Up)
    }

    /// Swaps the question with its survey-wide successor in number order.
    ///
    /// Returns `false` without changes for the last question or an unknown id.
    pub fn move_question_down(&mut self, id: QuestionId) -> bool {
        self.swap_with_neighbor(id, Direction::Down)
    }

    /// Questions directly assigned to `node_id` (not recursive), in number
    /// order. Unknown ids yield an empty list.
    pub fn questions_for_instrument(&self, node_id: NodeId) -> Vec<&Question> {
        let mut matched: Vec<&Question> = self
            .questions
            .iter()
            .filter(|question| question.instrument_id == node_id)
            .collect();
        matched.sort_by_key(|question| question.question_number);
        matched
    }

    /// Count of questions assigned to `node_id` plus all its descendants.
    pub fn count_questions_recursive(&self, node_id: NodeId) -> usize {
        let subtree: HashSet<NodeId> = self
            .instrument_structure
            .subtree_ids(node_id)
            .into_iter()
            .collect();
        self.questions
            .iter()
            .filter(|question| subtree.contains(&question.instrument_id))
            .count()
    }

    /// Removes an instrument node with its subtree and cascade-deletes every
    /// question assigned to a removed node, then renumbers.
    ///
    /// Returns the removed node ids; empty for unknown ids (no-op).
    pub fn remove_instrument_node(&mut self, node_id: NodeId) -> Vec<NodeId> {
        let removed = self.instrument_structure.remove_node(node_id);
        if removed.is_empty() {
            return removed;
        }
        let removed_set: HashSet<NodeId> = removed.iter().copied().collect();
        let before = self.questions.len();
        self.questions
            .retain(|question| !removed_set.contains(&question.instrument_id));
        if self.questions.len() != before {
            self.renumber_questions();
        }
        removed
    }

    /// Whether this survey matches a case-insensitive substring search over
    /// title or code, intersected with an optional status filter.
    pub fn matches_filter(&self, search_term: &str, status: Option<SurveyStatus>) -> bool {
        let needle = search_term.to_lowercase();
        let matches_search = needle.is_empty()
            || self.title.to_lowercase().contains(&needle)
            || self.code.to_lowercase().contains(&needle);
        let matches_status = match status {
            Some(wanted) => self.status == wanted,
            None => true,
        };
        matches_search && matches_status
    }

    fn renumber_questions(&mut self) {
        self.questions
            .sort_by_key(|question| question.question_number);
        for (index, question) in self.questions.iter_mut().enumerate() {
            question.question_number = index as u32 + 1;
        }
        self.total_questions = self.questions.len() as u32;
    }

    fn swap_with_neighbor(&mut self, id: QuestionId, direction: Direction) -> bool {
        let mut order: Vec<(u32, usize)> = self
            .questions
            .iter()
            .enumerate()
            .map(|(index, question)| (question.question_number, index))
            .collect();
        order.sort_by_key(|(number, _)| *number);

        let Some(position) = order
            .iter()
            .position(|(_, index)| self.questions[*index].id == id)
        else {
            return false;
        };
        let neighbor_position = match direction {
            Direction::Up => match position.checked_sub(1) {
                Some(previous) => previous,
                None => return false,
            },
            Direction::Down => {
                if position + 1 >= order.len() {
                    return false;
                }
                position + 1
            }
        };

        let (own_number, own_index) = order[position];
        let (neighbor_number, neighbor_index) = order[neighbor_position];
        self.questions[own_index].question_number = neighbor_number;
        self.questions[neighbor_index].question_number = own_number;
        true
    }
}

enum Direction {
    Up,
    Down,
}
