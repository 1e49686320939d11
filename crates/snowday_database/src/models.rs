//! Diesel models for the storyline tables.

use chrono::{DateTime, Utc};
use derive_builder::Builder;
use derive_getters::Getters;
use diesel::prelude::*;
use snowday_core::{ProcessedParagraph, QuizQuestion, StorylineRecord, StorylineStatus};
use snowday_error::{DatabaseError, DatabaseErrorKind};

/// Database row for the storyline table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = crate::schema::storyline)]
#[diesel(primary_key(storyline_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StorylineRow {
    /// Storyline identifier
    pub storyline_id: i32,
    /// JSON request snapshot
    pub original_request: Option<String>,
    /// `pending`, `completed` or `failed`
    pub status: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl StorylineRow {
    /// Parse the stored status.
    pub fn status(&self) -> Result<StorylineStatus, DatabaseError> {
        self.status.parse().map_err(|_| {
            DatabaseError::new(DatabaseErrorKind::Serialization(format!(
                "unknown storyline status '{}'",
                self.status
            )))
        })
    }

    /// Convert into the domain record.
    pub fn into_record(self) -> Result<StorylineRecord, DatabaseError> {
        let status = self.status()?;
        Ok(StorylineRecord::new(self.storyline_id, status, self.original_request))
    }
}

/// Insertable storyline.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::storyline)]
pub struct NewStoryline {
    /// JSON request snapshot
    pub original_request: Option<String>,
    /// Initial status
    pub status: String,
}

/// Insertable story.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::story)]
pub struct NewStory {
    /// Canonical paragraph text
    pub content: String,
    /// Narration URL
    pub audio: Option<String>,
    /// Serialized word alignment
    pub map: Option<String>,
}

impl NewStory {
    /// Story row for a processed paragraph.
    pub fn from_paragraph(paragraph: &ProcessedParagraph) -> Result<Self, DatabaseError> {
        Ok(Self {
            content: paragraph.content().as_str().to_string(),
            audio: Some(paragraph.narration().url().clone()),
            map: Some(paragraph.narration().alignment().to_json()?),
        })
    }
}

/// Insertable storyline step.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::storyline_step)]
pub struct NewStorylineStep {
    /// Owning storyline
    pub storyline_id: i32,
    /// 1-based position
    pub step: i32,
    /// The step's story
    pub story_id: i32,
}

/// Insertable question.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::question)]
pub struct NewQuestion {
    /// `select` or `comprehension`
    pub type_: String,
    /// Prompt text
    #[diesel(column_name = question_)]
    pub question: String,
    /// Classification key
    pub key: String,
    /// Correct answer
    pub correct: String,
    /// Comma-delimited answers
    pub answers: Option<String>,
    /// Classroom tag
    pub classroom: String,
}

impl NewQuestion {
    /// Question row tagged for a vocabulary.
    pub fn from_question(question: &QuizQuestion, vocab_id: i32) -> Self {
        Self {
            type_: question.kind().to_string(),
            question: question.prompt().clone(),
            key: question.key(vocab_id),
            correct: question.correct().clone(),
            answers: Some(question.answers_csv()),
            classroom: QuizQuestion::classroom(vocab_id),
        }
    }
}

/// Insertable story-question link.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::story_question)]
pub struct NewStoryQuestion {
    /// Linked story
    pub story_id: i32,
    /// Linked question
    pub question_id: i32,
}

/// Insertable vocabulary list.
#[derive(Debug, Clone, Insertable, Getters, Builder)]
#[diesel(table_name = crate::schema::vocab)]
#[builder(setter(into))]
pub struct NewVocab {
    /// Display title
    #[builder(default)]
    pub title: String,
    /// Comma-delimited words
    pub list: String,
}

/// Insertable progress record.
#[derive(Debug, Clone, Insertable, Getters, Builder)]
#[diesel(table_name = crate::schema::storyline_progress)]
#[builder(setter(into))]
pub struct NewStorylineProgress {
    /// Storyline the attempt belongs to
    pub storyline_id: i32,
    /// Step the attempt belongs to
    pub storyline_step_id: i32,
    /// Question link that was answered
    pub story_question_id: i32,
    /// Student who answered
    pub student_id: i32,
    /// Time spent in milliseconds
    #[builder(default)]
    pub duration: Option<i32>,
    /// Score
    #[builder(default)]
    pub score: Option<i32>,
    /// Attempts before the right answer
    #[builder(default)]
    pub attempts: Option<i32>,
}
