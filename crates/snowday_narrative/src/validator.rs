//! Required-word validation with rewrite rounds.

use crate::{RoutedGenerator, prompts};
use snowday_core::{CanonicalText, strip_markup};
use snowday_error::{GenerationError, GenerationErrorKind, SnowdayResult};
use tracing::{debug, info, instrument, warn};

/// Required words whose lowercase form does not occur in `text`.
pub fn missing_words(text: &str, required: &[String]) -> Vec<String> {
    let lowered = text.to_lowercase();
    required
        .iter()
        .filter(|word| !lowered.contains(&word.to_lowercase()))
        .cloned()
        .collect()
}

/// Ensures paragraphs contain their required words, asking for rewrites
/// when they do not.
#[derive(Clone)]
pub struct ConstraintValidator {
    generation: RoutedGenerator,
    max_attempts: i32,
    max_missing_allowed: usize,
}

impl ConstraintValidator {
    /// Create a validator allowing `max_attempts` rewrite rounds.
    pub fn new(generation: RoutedGenerator, max_attempts: i32, max_missing_allowed: usize) -> Self {
        Self {
            generation,
            max_attempts,
            max_missing_allowed,
        }
    }

    /// Whether a paragraph missing `missing` of `required` words passes.
    ///
    /// A paragraph passes when nothing is missing, when the tolerance covers
    /// every required word, or when the missing count already reaches
    /// `required − tolerance`.
    fn accepts(&self, missing: usize, required: usize) -> bool {
        missing == 0
            || self.max_missing_allowed >= required
            || missing >= required.saturating_sub(self.max_missing_allowed)
    }

    /// Validate `text`, rewriting until it passes or the rounds run out.
    ///
    /// Each rewrite is a single generation call; its output is stripped to
    /// canonical text before being checked again.
    ///
    /// # Errors
    ///
    /// `ValidationExhausted` when words are still missing after the last
    /// round, `Empty` when a rewrite comes back blank, and any error from the
    /// generation backend.
    #[instrument(skip(self, text, required), fields(required = required.len()))]
    pub async fn validate(&self, text: CanonicalText, required: &[String]) -> SnowdayResult<CanonicalText> {
        let mut text = text;
        let mut attempts_left = self.max_attempts;
        let mut missing = missing_words(text.as_str(), required);

        loop {
            if self.accepts(missing.len(), required.len()) {
                debug!(missing = missing.len(), "Paragraph accepted");
                return Ok(text);
            }
            if attempts_left <= 0 {
                warn!(?missing, "Rewrite rounds exhausted");
                return Err(GenerationError::new(GenerationErrorKind::ValidationExhausted { missing }).into());
            }

            info!(?missing, attempts_left, "Requesting rewrite");
            let rewritten = self
                .generation
                .complete(prompts::rewrite(text.as_str(), &missing))
                .await?;
            let rewritten = strip_markup(&rewritten);
            if rewritten.is_empty() {
                return Err(GenerationError::new(GenerationErrorKind::Empty("rewrite".to_string())).into());
            }

            missing = missing_words(rewritten.as_str(), required);
            text = rewritten;
            if missing.is_empty() {
                return Ok(text);
            }
            attempts_left -= 1;
        }
    }
}
