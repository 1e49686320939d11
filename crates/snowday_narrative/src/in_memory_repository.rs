//! In-memory implementation of StorylineRepository.
//!
//! Keeps every table in a HashMap or Vec behind one RwLock. Commits build the
//! new state on a copy and swap it in only when every insert succeeds, which
//! gives the same all-or-nothing behavior as the database transaction.

use async_trait::async_trait;
use snowday_core::{QuizQuestion, StorylineRecord, StorylineRequest, StorylineStatus, WordProgress};
use snowday_error::{
    DatabaseError, DatabaseErrorKind, SnowdayResult, StorylineError, StorylineErrorKind,
};
use snowday_interface::{CommitSummary, PersistPlan, StorylineRepository, TransactionLimits};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Stored storyline row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorylineRow {
    /// Generation status
    pub status: StorylineStatus,
    /// Request snapshot
    pub original_request: Option<String>,
}

/// Stored story row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryRow {
    /// Row id
    pub id: i32,
    /// Canonical paragraph text
    pub content: String,
    /// Narration URL
    pub audio: Option<String>,
    /// Serialized word alignment
    pub map: Option<String>,
}

/// Stored storyline step row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRow {
    /// Row id
    pub id: i32,
    /// Owning storyline
    pub storyline_id: i32,
    /// 1-based position
    pub step: i32,
    /// The step's story
    pub story_id: i32,
}

/// Stored question row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRow {
    /// Row id
    pub id: i32,
    /// `select` or `comprehension`
    pub kind: String,
    /// Prompt text
    pub question: String,
    /// Classification key
    pub key: String,
    /// Correct answer
    pub correct: String,
    /// Comma-delimited answers
    pub answers: String,
    /// Classroom tag
    pub classroom: String,
}

/// Stored story-question link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryQuestionRow {
    /// Row id
    pub id: i32,
    /// Linked story
    pub story_id: i32,
    /// Linked question
    pub question_id: i32,
}

/// Full contents of the in-memory store.
#[derive(Debug, Clone, Default)]
pub struct RepositorySnapshot {
    /// Storylines by id
    pub storylines: BTreeMap<i32, StorylineRow>,
    /// Stories
    pub stories: Vec<StoryRow>,
    /// Storyline steps
    pub steps: Vec<StepRow>,
    /// Questions
    pub questions: Vec<QuestionRow>,
    /// Story-question links
    pub story_questions: Vec<StoryQuestionRow>,
    /// Vocabulary word lists by id
    pub vocab: HashMap<i32, String>,
    /// Progress records by student id
    pub progress: HashMap<i32, Vec<WordProgress>>,
    next_id: i32,
}

impl RepositorySnapshot {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    /// Steps of a storyline in step order.
    pub fn steps_for(&self, storyline_id: i32) -> Vec<&StepRow> {
        let mut steps: Vec<&StepRow> = self
            .steps
            .iter()
            .filter(|s| s.storyline_id == storyline_id)
            .collect();
        steps.sort_by_key(|s| s.step);
        steps
    }

    /// Stories of a storyline in step order.
    pub fn stories_for(&self, storyline_id: i32) -> Vec<&StoryRow> {
        self.steps_for(storyline_id)
            .into_iter()
            .filter_map(|step| self.stories.iter().find(|s| s.id == step.story_id))
            .collect()
    }

    /// Questions linked to a storyline's stories.
    pub fn questions_for(&self, storyline_id: i32) -> Vec<&QuestionRow> {
        let story_ids: HashSet<i32> = self.stories_for(storyline_id).iter().map(|s| s.id).collect();
        let question_ids: HashSet<i32> = self
            .story_questions
            .iter()
            .filter(|link| story_ids.contains(&link.story_id))
            .map(|link| link.question_id)
            .collect();
        self.questions
            .iter()
            .filter(|q| question_ids.contains(&q.id))
            .collect()
    }

    /// Links whose story belongs to a storyline.
    pub fn story_questions_for(&self, storyline_id: i32) -> Vec<&StoryQuestionRow> {
        let story_ids: HashSet<i32> = self.stories_for(storyline_id).iter().map(|s| s.id).collect();
        self.story_questions
            .iter()
            .filter(|link| story_ids.contains(&link.story_id))
            .collect()
    }

    /// Status of a storyline.
    pub fn status(&self, storyline_id: i32) -> Option<StorylineStatus> {
        self.storylines.get(&storyline_id).map(|s| s.status)
    }
}

/// In-memory storyline repository.
///
/// Stores storylines and their content behind an RwLock. All data is lost
/// when the repository is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorylineRepository {
    state: Arc<RwLock<RepositorySnapshot>>,
    #[cfg(feature = "test-util")]
    fail_question_insert: Arc<RwLock<Option<usize>>>,
}

impl InMemoryStorylineRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a vocabulary list.
    pub async fn insert_vocab(&self, vocab_id: i32, words: impl Into<String>) {
        self.state.write().await.vocab.insert(vocab_id, words.into());
    }

    /// Record a student's attempt history for a word.
    pub async fn insert_progress(&self, student_id: i32, progress: WordProgress) {
        self.state
            .write()
            .await
            .progress
            .entry(student_id)
            .or_default()
            .push(progress);
    }

    /// Insert a storyline with an explicit status and raw snapshot.
    pub async fn insert_storyline(&self, status: StorylineStatus, original_request: Option<String>) -> i32 {
        let mut state = self.state.write().await;
        let id = state.next_id();
        state.storylines.insert(
            id,
            StorylineRow {
                status,
                original_request,
            },
        );
        id
    }

    /// Make the `n`th question insert (0-based) of the next commits fail.
    #[cfg(feature = "test-util")]
    pub async fn fail_question_insert_at(&self, n: Option<usize>) {
        *self.fail_question_insert.write().await = n;
    }

    /// Copy of the current contents.
    pub async fn snapshot(&self) -> RepositorySnapshot {
        self.state.read().await.clone()
    }
}

fn transition(state: &mut RepositorySnapshot, id: i32, next: StorylineStatus) -> SnowdayResult<()> {
    let row = state
        .storylines
        .get_mut(&id)
        .ok_or_else(|| StorylineError::new(StorylineErrorKind::NotFound(id)))?;
    if !row.status.can_transition_to(next) {
        return Err(DatabaseError::new(DatabaseErrorKind::InvalidTransition {
            from: row.status.to_string(),
            to: next.to_string(),
        })
        .into());
    }
    row.status = next;
    Ok(())
}

#[async_trait]
impl StorylineRepository for InMemoryStorylineRepository {
    async fn load_storyline(&self, id: i32) -> SnowdayResult<Option<StorylineRecord>> {
        let state = self.state.read().await;
        Ok(state
            .storylines
            .get(&id)
            .map(|row| StorylineRecord::new(id, row.status, row.original_request.clone())))
    }

    async fn create_storyline(&self, request: &StorylineRequest) -> SnowdayResult<StorylineRecord> {
        let snapshot = request.to_snapshot()?;
        let id = self
            .insert_storyline(StorylineStatus::Pending, Some(snapshot.clone()))
            .await;
        Ok(StorylineRecord::new(id, StorylineStatus::Pending, Some(snapshot)))
    }

    async fn vocab_words(&self, vocab_id: i32) -> SnowdayResult<Option<String>> {
        Ok(self.state.read().await.vocab.get(&vocab_id).cloned())
    }

    async fn student_progress(&self, student_id: i32) -> SnowdayResult<Vec<WordProgress>> {
        Ok(self
            .state
            .read()
            .await
            .progress
            .get(&student_id)
            .cloned()
            .unwrap_or_default())
    }

    #[instrument(skip(self, plan, _limits), fields(storyline_id = plan.storyline_id()))]
    async fn commit_storyline(
        &self,
        plan: &PersistPlan,
        _limits: &TransactionLimits,
    ) -> SnowdayResult<CommitSummary> {
        #[cfg(feature = "test-util")]
        let fail_at = *self.fail_question_insert.read().await;
        #[cfg(not(feature = "test-util"))]
        let fail_at: Option<usize> = None;
        let mut state = self.state.write().await;
        let mut work = state.clone();
        let mut summary = CommitSummary::default();
        let vocab_id = *plan.vocab_id();

        for (position, paragraph) in plan.paragraphs().iter().enumerate() {
            let story_id = work.next_id();
            let map = paragraph
                .narration()
                .alignment()
                .to_json()
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Serialization(e.to_string())))?;
            work.stories.push(StoryRow {
                id: story_id,
                content: paragraph.content().as_str().to_string(),
                audio: Some(paragraph.narration().url().clone()),
                map: Some(map),
            });
            summary.story_ids.push(story_id);

            let step_id = work.next_id();
            work.steps.push(StepRow {
                id: step_id,
                storyline_id: *plan.storyline_id(),
                step: plan.step_for(position),
                story_id,
            });
            summary.step_ids.push(step_id);
        }

        for (position, paragraph) in plan.paragraphs().iter().enumerate() {
            for question in paragraph.questions() {
                if fail_at == Some(summary.question_ids.len()) {
                    return Err(DatabaseError::new(DatabaseErrorKind::Query(format!(
                        "injected failure inserting question {}",
                        summary.question_ids.len()
                    )))
                    .into());
                }
                let question_id = work.next_id();
                work.questions.push(question_row(question_id, question, vocab_id));
                summary.question_ids.push(question_id);

                let link_id = work.next_id();
                work.story_questions.push(StoryQuestionRow {
                    id: link_id,
                    story_id: summary.story_ids[position],
                    question_id,
                });
            }
        }

        transition(&mut work, *plan.storyline_id(), StorylineStatus::Completed)?;

        *state = work;
        debug!(stories = summary.story_ids.len(), "Commit applied");
        Ok(summary)
    }

    async fn reset_storyline(&self, id: i32) -> SnowdayResult<bool> {
        let mut state = self.state.write().await;
        let Some(row) = state.storylines.get_mut(&id) else {
            return Ok(false);
        };
        row.status = StorylineStatus::Pending;

        let story_ids: HashSet<i32> = state
            .steps
            .iter()
            .filter(|s| s.storyline_id == id)
            .map(|s| s.story_id)
            .collect();
        let question_ids: HashSet<i32> = state
            .story_questions
            .iter()
            .filter(|link| story_ids.contains(&link.story_id))
            .map(|link| link.question_id)
            .collect();

        state.steps.retain(|s| s.storyline_id != id);
        state.story_questions.retain(|link| !story_ids.contains(&link.story_id));
        state.questions.retain(|q| !question_ids.contains(&q.id));
        state.stories.retain(|s| !story_ids.contains(&s.id));
        Ok(true)
    }

    async fn mark_failed(&self, id: i32) -> SnowdayResult<()> {
        let mut state = self.state.write().await;
        transition(&mut state, id, StorylineStatus::Failed)
    }
}

fn question_row(id: i32, question: &QuizQuestion, vocab_id: i32) -> QuestionRow {
    QuestionRow {
        id,
        kind: question.kind().to_string(),
        question: question.prompt().clone(),
        key: question.key(vocab_id),
        correct: question.correct().clone(),
        answers: question.answers_csv(),
        classroom: QuizQuestion::classroom(vocab_id),
    }
}
