//! Transactional commit of processed paragraphs.

use snowday_error::SnowdayResult;
use snowday_interface::{CommitSummary, PersistPlan, StorylineRepository, TransactionLimits};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Commits a storyline's content through the repository.
#[derive(Clone)]
pub struct PersistenceCoordinator {
    repository: Arc<dyn StorylineRepository>,
    limits: TransactionLimits,
}

impl PersistenceCoordinator {
    /// Create a coordinator committing with `limits`.
    pub fn new(repository: Arc<dyn StorylineRepository>, limits: TransactionLimits) -> Self {
        Self { repository, limits }
    }

    /// Transaction limits in use.
    pub fn limits(&self) -> &TransactionLimits {
        &self.limits
    }

    /// Write every story, step, question and link in the plan and mark the
    /// storyline completed, all or nothing.
    #[instrument(
        skip(self, plan),
        fields(
            storyline_id = plan.storyline_id(),
            paragraphs = plan.paragraphs().len(),
            questions = plan.question_count()
        )
    )]
    pub async fn persist(&self, plan: PersistPlan) -> SnowdayResult<CommitSummary> {
        match self.repository.commit_storyline(&plan, &self.limits).await {
            Ok(summary) => {
                info!(stories = summary.story_ids.len(), "Storyline committed");
                Ok(summary)
            }
            Err(e) => {
                error!(error = %e, "Storyline commit rolled back");
                Err(e)
            }
        }
    }
}
