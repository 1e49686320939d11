//! Generation requests.

use crate::Role;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// What a generation call is for.
///
/// Used to route each call to a configured model and to label tracing spans.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GenerationTask {
    /// Whole multi-paragraph story in one shot
    Draft,
    /// One chapter of a framework-driven story
    Chapter,
    /// Rewrite of a paragraph to include missing words
    Rewrite,
    /// Misspelling distractors for a select question
    Misspellings,
    /// Comprehension question text
    ComprehensionQuestion,
    /// Candidate answers for a comprehension question
    ComprehensionAnswers,
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who wrote it
    pub role: Role,
    /// Message text
    pub content: String,
}

impl Message {
    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// A system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// A prompt sent to the generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct GenerateRequest {
    task: GenerationTask,
    messages: Vec<Message>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    model: Option<String>,
}

impl GenerateRequest {
    /// Create a request from a task and its messages.
    pub fn new(task: GenerationTask, messages: Vec<Message>) -> Self {
        Self {
            task,
            messages,
            max_tokens: None,
            temperature: None,
            model: None,
        }
    }

    /// Single user prompt.
    pub fn prompt(task: GenerationTask, prompt: impl Into<String>) -> Self {
        Self::new(task, vec![Message::user(prompt)])
    }

    /// Override the model used for this request.
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Cap the completion length.
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Text of the last user message, if any.
    pub fn user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}
