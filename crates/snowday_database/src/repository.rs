//! PostgreSQL implementation of StorylineRepository.

use crate::connection::{PgPool, create_pool};
use crate::models::{
    NewQuestion, NewStory, NewStoryQuestion, NewStoryline, NewStorylineStep, StorylineRow,
};
use crate::schema::{question, story, story_question, storyline, storyline_progress, storyline_step, vocab};
use crate::DatabaseResult;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use snowday_core::{QuestionKind, StorylineRecord, StorylineRequest, StorylineStatus, WordProgress};
use snowday_error::{
    DatabaseError, DatabaseErrorKind, SnowdayResult, StorylineError, StorylineErrorKind,
};
use snowday_interface::{CommitSummary, PersistPlan, StorylineRepository, TransactionLimits};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Storyline repository backed by a diesel connection pool.
///
/// Every call checks a connection out of the pool on the blocking thread
/// pool, waiting at most `max_wait` for one.
#[derive(Clone)]
pub struct PgStorylineRepository {
    pool: PgPool,
    limits: TransactionLimits,
}

impl std::fmt::Debug for PgStorylineRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgStorylineRepository")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl PgStorylineRepository {
    /// Create a repository over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            limits: TransactionLimits::default(),
        }
    }

    /// Create a repository from `DATABASE_URL`.
    pub fn from_env() -> DatabaseResult<Self> {
        Ok(Self::new(create_pool()?))
    }

    /// Use `limits` for reads, resets and status changes.
    pub fn with_limits(mut self, limits: TransactionLimits) -> Self {
        self.limits = limits;
        self
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn run<T, F>(&self, max_wait: Duration, operation: F) -> DatabaseResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> DatabaseResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get_timeout(max_wait).map_err(|e| {
                warn!(wait_ms = max_wait.as_millis() as u64, error = %e, "No connection available");
                DatabaseError::new(DatabaseErrorKind::Timeout(format!(
                    "no connection within {} ms: {}",
                    max_wait.as_millis(),
                    e
                )))
            })?;
            operation(&mut conn)
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(format!("Task join error: {}", e))))?
    }
}

/// Lock the storyline row and return its status, `None` when it is missing.
fn lock_status(conn: &mut PgConnection, id: i32) -> DatabaseResult<Option<StorylineStatus>> {
    let status: Option<String> = storyline::table
        .find(id)
        .select(storyline::status)
        .for_update()
        .first(conn)
        .optional()?;
    status
        .map(|s| {
            s.parse::<StorylineStatus>().map_err(|_| {
                DatabaseError::new(DatabaseErrorKind::Serialization(format!(
                    "unknown storyline status '{}'",
                    s
                )))
            })
        })
        .transpose()
}

fn set_status(conn: &mut PgConnection, id: i32, current: StorylineStatus, next: StorylineStatus) -> DatabaseResult<()> {
    if !current.can_transition_to(next) {
        return Err(DatabaseError::new(DatabaseErrorKind::InvalidTransition {
            from: current.to_string(),
            to: next.to_string(),
        }));
    }
    diesel::update(storyline::table.find(id))
        .set(storyline::status.eq(next.to_string()))
        .execute(conn)?;
    Ok(())
}

fn missing_storyline(id: i32) -> StorylineError {
    StorylineError::new(StorylineErrorKind::NotFound(id))
}

/// Body of the commit transaction. Returns `None` when the storyline is gone.
fn write_plan(conn: &mut PgConnection, plan: &PersistPlan, timeout: Duration) -> DatabaseResult<Option<CommitSummary>> {
    let started = Instant::now();
    diesel::sql_query(format!("SET LOCAL statement_timeout = {}", timeout.as_millis())).execute(conn)?;

    let storyline_id = *plan.storyline_id();
    let Some(current) = lock_status(conn, storyline_id)? else {
        return Ok(None);
    };

    let mut summary = CommitSummary::default();
    for (position, paragraph) in plan.paragraphs().iter().enumerate() {
        let story_id: i32 = diesel::insert_into(story::table)
            .values(&NewStory::from_paragraph(paragraph)?)
            .returning(story::id)
            .get_result(conn)?;
        summary.story_ids.push(story_id);

        let step_id: i32 = diesel::insert_into(storyline_step::table)
            .values(&NewStorylineStep {
                storyline_id,
                step: plan.step_for(position),
                story_id,
            })
            .returning(storyline_step::storyline_step_id)
            .get_result(conn)?;
        summary.step_ids.push(step_id);
    }

    for (position, paragraph) in plan.paragraphs().iter().enumerate() {
        let story_id = summary.story_ids[position];
        for quiz in paragraph.questions() {
            let question_id: i32 = diesel::insert_into(question::table)
                .values(&NewQuestion::from_question(quiz, *plan.vocab_id()))
                .returning(question::id)
                .get_result(conn)?;
            diesel::insert_into(story_question::table)
                .values(&NewStoryQuestion { story_id, question_id })
                .execute(conn)?;
            summary.question_ids.push(question_id);
        }
    }

    if started.elapsed() > timeout {
        return Err(DatabaseError::new(DatabaseErrorKind::Timeout(format!(
            "commit ran {} ms, limit {} ms",
            started.elapsed().as_millis(),
            timeout.as_millis()
        ))));
    }
    set_status(conn, storyline_id, current, StorylineStatus::Completed)?;
    Ok(Some(summary))
}

#[async_trait]
impl StorylineRepository for PgStorylineRepository {
    #[instrument(name = "database.load_storyline", skip(self))]
    async fn load_storyline(&self, id: i32) -> SnowdayResult<Option<StorylineRecord>> {
        let row = self
            .run(self.limits.max_wait, move |conn| {
                Ok(storyline::table
                    .find(id)
                    .select(StorylineRow::as_select())
                    .first(conn)
                    .optional()?)
            })
            .await?;
        Ok(row.map(StorylineRow::into_record).transpose()?)
    }

    #[instrument(name = "database.create_storyline", skip(self, request))]
    async fn create_storyline(&self, request: &StorylineRequest) -> SnowdayResult<StorylineRecord> {
        let new = NewStoryline {
            original_request: Some(request.to_snapshot()?),
            status: StorylineStatus::Pending.to_string(),
        };
        let row = self
            .run(self.limits.max_wait, move |conn| {
                Ok(diesel::insert_into(storyline::table)
                    .values(&new)
                    .returning(StorylineRow::as_returning())
                    .get_result(conn)?)
            })
            .await?;
        info!(storyline_id = row.storyline_id, "Created storyline");
        Ok(row.into_record()?)
    }

    #[instrument(name = "database.vocab_words", skip(self))]
    async fn vocab_words(&self, vocab_id: i32) -> SnowdayResult<Option<String>> {
        Ok(self
            .run(self.limits.max_wait, move |conn| {
                Ok(vocab::table
                    .find(vocab_id)
                    .select(vocab::list)
                    .first(conn)
                    .optional()?)
            })
            .await?)
    }

    #[instrument(name = "database.student_progress", skip(self))]
    async fn student_progress(&self, student_id: i32) -> SnowdayResult<Vec<WordProgress>> {
        let rows: Vec<(String, Option<i32>, Option<i32>)> = self
            .run(self.limits.max_wait, move |conn| {
                Ok(storyline_progress::table
                    .inner_join(story_question::table.inner_join(question::table))
                    .filter(storyline_progress::student_id.eq(student_id))
                    .filter(question::type_.eq(QuestionKind::Select.to_string()))
                    .select((
                        question::correct,
                        storyline_progress::attempts,
                        storyline_progress::duration,
                    ))
                    .load(conn)?)
            })
            .await?;
        debug!(records = rows.len(), "Loaded progress");
        Ok(rows
            .into_iter()
            .map(|(word, attempts, duration)| WordProgress::new(word, attempts, duration))
            .collect())
    }

    #[instrument(
        name = "database.commit_storyline",
        skip(self, plan, limits),
        fields(storyline_id = plan.storyline_id(), paragraphs = plan.paragraphs().len())
    )]
    async fn commit_storyline(
        &self,
        plan: &PersistPlan,
        limits: &TransactionLimits,
    ) -> SnowdayResult<CommitSummary> {
        let storyline_id = *plan.storyline_id();
        let owned = plan.clone();
        let timeout = limits.timeout;
        let summary = self
            .run(limits.max_wait, move |conn| {
                conn.transaction(|conn| write_plan(conn, &owned, timeout))
            })
            .await?
            .ok_or_else(|| missing_storyline(storyline_id))?;

        info!(
            stories = summary.story_ids.len(),
            questions = summary.question_ids.len(),
            "Storyline committed"
        );
        Ok(summary)
    }

    #[instrument(name = "database.reset_storyline", skip(self))]
    async fn reset_storyline(&self, id: i32) -> SnowdayResult<bool> {
        let reset = self
            .run(self.limits.max_wait, move |conn| {
                conn.transaction(|conn| {
                    if lock_status(conn, id)?.is_none() {
                        return Ok(false);
                    }
                    let story_ids: Vec<i32> = storyline_step::table
                        .filter(storyline_step::storyline_id.eq(id))
                        .select(storyline_step::story_id)
                        .load(conn)?;
                    let question_ids: Vec<i32> = story_question::table
                        .filter(story_question::story_id.eq_any(&story_ids))
                        .select(story_question::question_id)
                        .load(conn)?;

                    diesel::delete(storyline_progress::table.filter(storyline_progress::storyline_id.eq(id)))
                        .execute(conn)?;
                    diesel::delete(storyline_step::table.filter(storyline_step::storyline_id.eq(id)))
                        .execute(conn)?;
                    diesel::delete(story_question::table.filter(story_question::story_id.eq_any(&story_ids)))
                        .execute(conn)?;
                    diesel::delete(question::table.filter(question::id.eq_any(&question_ids)))
                        .execute(conn)?;
                    diesel::delete(story::table.filter(story::id.eq_any(&story_ids))).execute(conn)?;
                    diesel::update(storyline::table.find(id))
                        .set(storyline::status.eq(StorylineStatus::Pending.to_string()))
                        .execute(conn)?;
                    Ok(true)
                })
            })
            .await?;
        if reset {
            info!("Storyline reset to pending");
        }
        Ok(reset)
    }

    #[instrument(name = "database.mark_failed", skip(self))]
    async fn mark_failed(&self, id: i32) -> SnowdayResult<()> {
        let found = self
            .run(self.limits.max_wait, move |conn| {
                conn.transaction(|conn| {
                    let Some(current) = lock_status(conn, id)? else {
                        return Ok(false);
                    };
                    set_status(conn, id, current, StorylineStatus::Failed)?;
                    Ok(true)
                })
            })
            .await?;
        if !found {
            return Err(missing_storyline(id).into());
        }
        warn!("Storyline marked failed");
        Ok(())
    }
}
