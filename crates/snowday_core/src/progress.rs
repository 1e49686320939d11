//! Student progress records consumed by the prioritizer.

use serde::{Deserialize, Serialize};

/// One historical attempt record joined to the word it tested.
///
/// `attempts` and `duration` are nullable in storage. A record with no
/// attempt count still counts as one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordProgress {
    /// Word the question tested (the question's correct answer)
    pub word: String,
    /// Attempts recorded for the question
    pub attempts: Option<i32>,
    /// Time spent, in seconds
    pub duration: Option<i32>,
}

impl WordProgress {
    /// Create a progress record.
    pub fn new(word: impl Into<String>, attempts: Option<i32>, duration: Option<i32>) -> Self {
        Self {
            word: word.into(),
            attempts,
            duration,
        }
    }
}
