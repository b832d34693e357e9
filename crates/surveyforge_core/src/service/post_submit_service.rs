//! Post-submit info panel use-case service.
//!
//! # Responsibility
//! - Save and load the singleton panel document, managing id and timestamps.
//!
//! The panel is a single record: saving keeps the original `created_at`
//! once one exists and bumps `updated_at` on every save.

use crate::model::now_epoch_ms;
use crate::model::post_submit::{PostSubmitDraft, PostSubmitInfo};
use crate::repo::post_submit_repo::{PostSubmitRepoResult, PostSubmitRepository};
use log::info;

/// Fixed id of the singleton panel record.
const PANEL_RECORD_ID: &str = "1";

/// Use-case facade for the post-submit panel.
pub struct PostSubmitService<R: PostSubmitRepository> {
    repo: R,
}

impl<R: PostSubmitRepository> PostSubmitService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Writes the panel from form data and returns the stored document.
    pub fn save_info(&self, draft: PostSubmitDraft) -> PostSubmitRepoResult<PostSubmitInfo> {
        let now = now_epoch_ms();
        let created_at = self
            .repo
            .load_info()?
            .map(|existing| existing.created_at)
            .unwrap_or(now);
        let info = PostSubmitInfo {
            id: PANEL_RECORD_ID.to_string(),
            title: draft.title,
            description: draft.description,
            selected_survey_ids: draft.selected_survey_ids,
            is_active: draft.is_active,
            created_at,
            updated_at: now,
        };
        self.repo.save_info(&info)?;
        info!(
            "event=post_submit_saved module=service status=ok surveys={} active={}",
            info.selected_survey_ids.len(),
            info.is_active
        );
        Ok(info)
    }

    /// Loads the panel; legacy stored payloads come back already migrated.
    pub fn load_info(&self) -> PostSubmitRepoResult<Option<PostSubmitInfo>> {
        self.repo.load_info()
    }
}
