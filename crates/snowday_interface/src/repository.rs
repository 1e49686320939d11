//! Relational store contract.

use async_trait::async_trait;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use snowday_core::{ProcessedParagraph, StorylineRecord, StorylineRequest, WordProgress};
use snowday_error::SnowdayResult;
use std::time::Duration;

/// Time ceilings for a commit transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLimits {
    /// How long to wait for a connection before giving up
    pub max_wait: Duration,
    /// How long the transaction may run once started
    pub timeout: Duration,
}

impl Default for TransactionLimits {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_millis(10_000),
            timeout: Duration::from_millis(15_000),
        }
    }
}

/// Everything one commit writes for a storyline.
#[derive(Debug, Clone, Getters)]
pub struct PersistPlan {
    storyline_id: i32,
    vocab_id: i32,
    first_step: usize,
    paragraphs: Vec<ProcessedParagraph>,
}

impl PersistPlan {
    /// Plan a commit of whole-story paragraphs numbered from step 1.
    pub fn new(storyline_id: i32, vocab_id: i32, mut paragraphs: Vec<ProcessedParagraph>) -> Self {
        paragraphs.sort_by_key(|p| *p.index());
        Self {
            storyline_id,
            vocab_id,
            first_step: 1,
            paragraphs,
        }
    }

    /// Plan a commit whose steps start after `index` earlier steps, as when
    /// appending chapter `index` to a storyline.
    pub fn at_index(storyline_id: i32, vocab_id: i32, index: usize, paragraphs: Vec<ProcessedParagraph>) -> Self {
        Self {
            first_step: index + 1,
            ..Self::new(storyline_id, vocab_id, paragraphs)
        }
    }

    /// Step number for the paragraph at `position` in the plan.
    pub fn step_for(&self, position: usize) -> i32 {
        (self.first_step + position) as i32
    }

    /// Total questions across all paragraphs.
    pub fn question_count(&self) -> usize {
        self.paragraphs.iter().map(|p| p.questions().len()).sum()
    }
}

/// Rows created by a successful commit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommitSummary {
    /// Story ids in step order
    pub story_ids: Vec<i32>,
    /// StorylineStep ids in step order
    pub step_ids: Vec<i32>,
    /// Question ids in creation order
    pub question_ids: Vec<i32>,
}

/// Storage for storylines and the tables the pipeline reads and writes.
#[async_trait]
pub trait StorylineRepository: Send + Sync {
    /// Load a storyline by id.
    async fn load_storyline(&self, id: i32) -> SnowdayResult<Option<StorylineRecord>>;

    /// Create a `pending` storyline from a request snapshot.
    async fn create_storyline(&self, request: &StorylineRequest) -> SnowdayResult<StorylineRecord>;

    /// Comma-delimited word list of a vocabulary, `None` when it does not exist.
    async fn vocab_words(&self, vocab_id: i32) -> SnowdayResult<Option<String>>;

    /// Every progress record of a student, joined to the word it tested.
    async fn student_progress(&self, student_id: i32) -> SnowdayResult<Vec<WordProgress>>;

    /// Write stories, steps, questions and links for the plan and mark the
    /// storyline `completed`, all in one transaction.
    ///
    /// On any failure nothing is written and the status is unchanged.
    async fn commit_storyline(
        &self,
        plan: &PersistPlan,
        limits: &TransactionLimits,
    ) -> SnowdayResult<CommitSummary>;

    /// Delete a storyline's generated content and set it back to `pending`.
    ///
    /// Returns `false` when the storyline does not exist.
    async fn reset_storyline(&self, id: i32) -> SnowdayResult<bool>;

    /// Mark a `pending` storyline `failed`.
    async fn mark_failed(&self, id: i32) -> SnowdayResult<()>;
}
