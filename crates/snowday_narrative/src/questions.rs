//! Quiz question synthesis.

use crate::{RetryPolicy, RoutedGenerator, prompts, retry};
use rand::seq::SliceRandom;
use snowday_core::{CanonicalText, QuestionKind, QuizQuestion};
use snowday_error::{GenerationError, GenerationErrorKind, SnowdayError, SnowdayResult};
use std::ops::RangeInclusive;
use tracing::instrument;

/// Prompt shown with every spelling question.
pub const SELECT_PROMPT: &str = "Pick the correct spelling.";

#[track_caller]
fn malformed(message: impl Into<String>) -> SnowdayError {
    GenerationError::new(GenerationErrorKind::MalformedResponse(message.into())).into()
}

/// Remove a surrounding markdown code fence, if any.
fn unfence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parse a misspellings response.
///
/// Accepts a JSON array of strings or an object with an `answers` array.
/// Entries are trimmed; blanks, entries with commas, duplicates and the word
/// itself are dropped. At most `count` entries are kept.
pub fn parse_misspellings(raw: &str, word: &str, count: usize) -> SnowdayResult<Vec<String>> {
    let value: serde_json::Value =
        serde_json::from_str(unfence(raw)).map_err(|e| malformed(format!("not JSON: {}", e)))?;
    let items = match &value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(map) => match map.get("answers") {
            Some(serde_json::Value::Array(items)) => items,
            _ => return Err(malformed("object without an 'answers' array")),
        },
        _ => return Err(malformed("expected an array of strings")),
    };

    let mut misspellings: Vec<String> = Vec::new();
    for item in items {
        let serde_json::Value::String(candidate) = item else {
            return Err(malformed(format!("non-string entry {}", item)));
        };
        let candidate = candidate.trim();
        if candidate.is_empty()
            || candidate.contains(',')
            || candidate.eq_ignore_ascii_case(word)
            || misspellings.iter().any(|m| m == candidate)
        {
            continue;
        }
        misspellings.push(candidate.to_string());
    }

    misspellings.truncate(count);
    if misspellings.is_empty() {
        return Err(malformed(format!("no usable misspellings of '{}'", word)));
    }
    Ok(misspellings)
}

/// Parse a comma-delimited answer list, correct answer first.
pub fn parse_answers(raw: &str, bounds: &RangeInclusive<usize>) -> SnowdayResult<Vec<String>> {
    let line = unfence(raw)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");
    let answers: Vec<String> = line
        .split(',')
        .map(|a| a.trim().trim_matches('"').trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();

    if !bounds.contains(&answers.len()) {
        return Err(malformed(format!(
            "expected {} to {} answers, got {}",
            bounds.start(),
            bounds.end(),
            answers.len()
        )));
    }
    for (i, answer) in answers.iter().enumerate() {
        if answers[..i].contains(answer) {
            return Err(malformed(format!("duplicate answer '{}'", answer)));
        }
    }
    Ok(answers)
}

fn parse_question(raw: String) -> SnowdayResult<String> {
    unfence(&raw)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .ok_or_else(|| malformed("blank question"))
}

/// Generates spelling and comprehension questions.
#[derive(Clone)]
pub struct QuestionSynthesizer {
    generation: RoutedGenerator,
    policy: RetryPolicy,
    misspellings: usize,
    answer_bounds: RangeInclusive<usize>,
}

impl QuestionSynthesizer {
    /// Create a synthesizer.
    pub fn new(
        generation: RoutedGenerator,
        policy: RetryPolicy,
        misspellings: usize,
        answer_bounds: RangeInclusive<usize>,
    ) -> Self {
        Self {
            generation,
            policy,
            misspellings,
            answer_bounds,
        }
    }

    /// Spelling question for `word`: the word shuffled among misspellings.
    #[instrument(skip(self))]
    pub async fn select_question(&self, word: &str) -> SnowdayResult<QuizQuestion> {
        let label = format!("misspellings of '{}'", word);
        let count = self.misspellings;
        let misspellings = retry(
            &self.policy,
            &label,
            || self.generation.complete(prompts::misspellings(word, count)),
            |raw| parse_misspellings(&raw, word, count),
        )
        .await?;

        let mut answers = Vec::with_capacity(misspellings.len() + 1);
        answers.push(word.to_string());
        answers.extend(misspellings);
        answers.shuffle(&mut rand::thread_rng());

        QuizQuestion::new(QuestionKind::Select, SELECT_PROMPT, word, answers)
    }

    /// Comprehension question about a paragraph.
    ///
    /// The question and its answers come from two calls, each retried on
    /// its own. The first parsed answer is the correct one.
    #[instrument(skip(self, paragraph))]
    pub async fn comprehension_question(&self, paragraph: &CanonicalText) -> SnowdayResult<QuizQuestion> {
        let question = retry(
            &self.policy,
            "comprehension question",
            || self.generation.complete(prompts::comprehension_question(paragraph.as_str())),
            parse_question,
        )
        .await?;

        let mut answers = retry(
            &self.policy,
            "comprehension answers",
            || {
                self.generation
                    .complete(prompts::comprehension_answers(paragraph.as_str(), &question))
            },
            |raw| parse_answers(&raw, &self.answer_bounds),
        )
        .await?;

        let correct = answers
            .first()
            .cloned()
            .ok_or_else(|| malformed("no comprehension answers"))?;
        answers.shuffle(&mut rand::thread_rng());
        QuizQuestion::new(QuestionKind::Comprehension, question, correct, answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_misspellings_from_object_or_array() {
        let parsed = parse_misspellings(r#"{"answers": ["wale", "whail", "whaal"]}"#, "whale", 3).unwrap();
        assert_eq!(parsed, vec!["wale", "whail", "whaal"]);

        let fenced = "```json\n[\"brav\", \"braev\"]\n```";
        assert_eq!(parse_misspellings(fenced, "brave", 3).unwrap(), vec!["brav", "braev"]);
    }

    #[test]
    fn test_misspellings_filtering() {
        let raw = r#"["Whale", "wale", "wale", "wh,ale", " ", "whail", "whal", "whayl"]"#;
        assert_eq!(parse_misspellings(raw, "whale", 3).unwrap(), vec!["wale", "whail", "whal"]);
    }

    #[test]
    fn test_misspellings_rejects_wrong_types() {
        assert!(parse_misspellings(r#"["wale", 3]"#, "whale", 3).is_err());
        assert!(parse_misspellings(r#"{"words": []}"#, "whale", 3).is_err());
        assert!(parse_misspellings("wale, whail", "whale", 3).is_err());
        assert!(parse_misspellings(r#"["whale"]"#, "whale", 3).is_err());
    }

    #[test]
    fn test_answer_bounds() {
        let bounds = 2..=5;
        assert_eq!(
            parse_answers("The whale, A crab, \"An otter\"", &bounds).unwrap(),
            vec!["The whale", "A crab", "An otter"]
        );
        assert!(parse_answers("Only one", &bounds).is_err());
        assert!(parse_answers("a,b,c,d,e,f", &bounds).is_err());
        assert!(parse_answers("a,b,a", &bounds).is_err());
    }
}
