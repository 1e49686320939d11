//! Output of the per-paragraph pipeline.

use crate::{AlignmentMap, CanonicalText, QuizQuestion};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Narration artifact for a paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct Narration {
    url: String,
    alignment: AlignmentMap,
}

impl Narration {
    /// Create a narration from its public URL and word alignment.
    pub fn new(url: impl Into<String>, alignment: AlignmentMap) -> Self {
        Self {
            url: url.into(),
            alignment,
        }
    }
}

/// A fully processed paragraph, ready to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct ProcessedParagraph {
    index: usize,
    content: CanonicalText,
    narration: Narration,
    questions: Vec<QuizQuestion>,
}

impl ProcessedParagraph {
    /// Assemble a processed paragraph.
    pub fn new(
        index: usize,
        content: CanonicalText,
        narration: Narration,
        questions: Vec<QuizQuestion>,
    ) -> Self {
        Self {
            index,
            content,
            narration,
            questions,
        }
    }
}
