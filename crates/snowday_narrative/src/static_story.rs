//! Hand-written stories loaded from TOML.
//!
//! ```toml
//! [storyline]
//! student_id = 3
//! vocab_id = 7
//! words = ["whale", "brave"]
//! genre = "adventure"
//!
//! [[paragraphs]]
//! text = "A brave little whale swam north."
//! words = ["whale", "brave"]
//! comprehension = true
//! ```

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use snowday_core::StorylineRequest;
use snowday_error::{ConfigError, SnowdayResult};
use std::path::Path;

/// One prewritten paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct StaticParagraph {
    /// Paragraph text, markdown allowed
    text: String,
    /// Words this paragraph must contain and be quizzed on
    #[serde(default)]
    words: Vec<String>,
    /// Whether to add a comprehension question
    #[serde(default)]
    comprehension: bool,
}

/// A storyline with prewritten paragraphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct StaticStory {
    storyline: StorylineRequest,
    paragraphs: Vec<StaticParagraph>,
}

impl StaticStory {
    /// Load a story file.
    #[tracing::instrument(skip(path))]
    pub fn from_file(path: impl AsRef<Path>) -> SnowdayResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read story file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parse a story from TOML text.
    pub fn from_toml(content: &str) -> SnowdayResult<Self> {
        let story: StaticStory = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse story file: {}", e)))?;
        if story.paragraphs.is_empty() {
            return Err(ConfigError::new("Story file has no [[paragraphs]]").into());
        }
        Ok(story)
    }
}
