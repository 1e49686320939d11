//! Quiz questions.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use snowday_error::{GenerationError, GenerationErrorKind, SnowdayResult};

/// Kind of quiz item, stored in `question.type`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QuestionKind {
    /// Pick the correct spelling of a word
    Select,
    /// Answer a question about the paragraph
    Comprehension,
}

/// One quiz item.
///
/// The answer set always contains the correct answer exactly once and no
/// answer contains a comma, so the set survives its comma-delimited storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct QuizQuestion {
    kind: QuestionKind,
    prompt: String,
    correct: String,
    answers: Vec<String>,
}

impl QuizQuestion {
    /// Build a question, checking the answer set.
    ///
    /// # Errors
    ///
    /// Returns `GenerationErrorKind::MalformedResponse` when an answer is
    /// blank or contains a comma, or when the correct answer does not appear
    /// exactly once.
    pub fn new(
        kind: QuestionKind,
        prompt: impl Into<String>,
        correct: impl Into<String>,
        answers: Vec<String>,
    ) -> SnowdayResult<Self> {
        let correct = correct.into().trim().to_string();
        let answers: Vec<String> = answers.into_iter().map(|a| a.trim().to_string()).collect();

        if let Some(bad) = answers.iter().find(|a| a.is_empty() || a.contains(',')) {
            return Err(malformed(format!("answer '{}' is blank or contains a comma", bad)));
        }
        let occurrences = answers.iter().filter(|a| **a == correct).count();
        if occurrences != 1 {
            return Err(malformed(format!(
                "correct answer '{}' appears {} times in {:?}",
                correct, occurrences, answers
            )));
        }

        Ok(Self {
            kind,
            prompt: prompt.into(),
            correct,
            answers,
        })
    }

    /// Rebuild a question from its stored comma-delimited answer set.
    pub fn from_csv(
        kind: QuestionKind,
        prompt: impl Into<String>,
        correct: impl Into<String>,
        answers: &str,
    ) -> SnowdayResult<Self> {
        Self::new(
            kind,
            prompt,
            correct,
            answers.split(',').map(str::to_string).collect(),
        )
    }

    /// Answer set as stored.
    pub fn answers_csv(&self) -> String {
        self.answers.join(",")
    }

    /// Classification key shared by every question about the same word in a
    /// vocabulary list.
    pub fn key(&self, vocab_id: i32) -> String {
        format!("vocab_{}_{}", vocab_id, self.correct)
    }

    /// Classroom tag for a vocabulary list.
    pub fn classroom(vocab_id: i32) -> String {
        format!("vocab_{}", vocab_id)
    }
}

#[track_caller]
fn malformed(message: String) -> snowday_error::SnowdayError {
    GenerationError::new(GenerationErrorKind::MalformedResponse(message)).into()
}
