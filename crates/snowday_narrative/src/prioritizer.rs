//! Vocabulary prioritization.
//!
//! Picks the words a student should practice next: never-seen words first,
//! then words with few attempts, then frequently missed words, with time spent
//! breaking ties.

use snowday_core::WordProgress;
use snowday_error::SnowdayResult;
use snowday_interface::StorylineRepository;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Attempts at which a word counts as likely mastered.
const MASTERY_ATTEMPTS: i64 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct WordStats {
    attempts: i64,
    duration: i64,
}

/// Rank a comma-delimited word list against a student's progress.
///
/// Words are trimmed, lowercased and deduplicated in first-seen order, then
/// stably sorted so that:
///
/// 1. words without progress come first,
/// 2. words with fewer than two attempts come before words with more,
/// 3. among words with two or more attempts, more attempts come first,
/// 4. higher total duration breaks remaining ties.
///
/// # Examples
///
/// ```
/// use snowday_core::WordProgress;
/// use snowday_narrative::prioritize_words;
///
/// let progress = vec![
///     WordProgress::new("cat", Some(3), Some(50)),
///     WordProgress::new("dog", Some(1), Some(5)),
/// ];
/// assert_eq!(prioritize_words("cat,dog", &progress, 2), vec!["dog", "cat"]);
/// ```
pub fn prioritize_words(vocab_words: &str, progress: &[WordProgress], count: usize) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    for word in vocab_words.split(',') {
        let word = word.trim().to_lowercase();
        if !word.is_empty() && !words.contains(&word) {
            words.push(word);
        }
    }

    let mut stats: HashMap<String, WordStats> = HashMap::new();
    for record in progress {
        let entry = stats.entry(record.word.trim().to_lowercase()).or_default();
        entry.attempts += i64::from(record.attempts.unwrap_or(1));
        entry.duration += i64::from(record.duration.unwrap_or(0));
    }

    words.sort_by(|a, b| compare(stats.get(a), stats.get(b)));
    words.truncate(count);
    words
}

fn compare(a: Option<&WordStats>, b: Option<&WordStats>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => {
            let a_mastered = a.attempts >= MASTERY_ATTEMPTS;
            let b_mastered = b.attempts >= MASTERY_ATTEMPTS;
            match (a_mastered, b_mastered) {
                (false, true) => Ordering::Less,
                (true, false) => Ordering::Greater,
                (true, true) => b
                    .attempts
                    .cmp(&a.attempts)
                    .then_with(|| b.duration.cmp(&a.duration)),
                (false, false) => b.duration.cmp(&a.duration),
            }
        }
    }
}

/// Prioritizer backed by the storyline repository.
#[derive(Clone)]
pub struct VocabularyPrioritizer {
    repository: Arc<dyn StorylineRepository>,
}

impl VocabularyPrioritizer {
    /// Create a prioritizer reading from `repository`.
    pub fn new(repository: Arc<dyn StorylineRepository>) -> Self {
        Self { repository }
    }

    /// Next `count` words for a student from a vocabulary list.
    ///
    /// An unknown vocabulary yields an empty list.
    #[instrument(skip(self))]
    pub async fn pick_next_words(
        &self,
        vocab_id: i32,
        student_id: i32,
        count: usize,
    ) -> SnowdayResult<Vec<String>> {
        let (vocab, progress) = futures::try_join!(
            self.repository.vocab_words(vocab_id),
            self.repository.student_progress(student_id)
        )?;

        let Some(vocab) = vocab else {
            debug!(vocab_id, "Vocabulary not found");
            return Ok(Vec::new());
        };

        let words = prioritize_words(&vocab, &progress, count);
        debug!(?words, records = progress.len(), "Prioritized words");
        Ok(words)
    }
}
