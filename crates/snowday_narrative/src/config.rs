//! Pipeline configuration loaded from TOML.
//!
//! Every section and field has a default, so an empty file (or no file) is a
//! valid configuration.
//!
//! ```toml
//! [pipeline]
//! mode = "chapters"
//! framework = "story-circle"
//!
//! [questions]
//! retry_delay_ms = 250
//! ```

use crate::RetryPolicy;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use snowday_core::GenerationTask;
use snowday_error::{ConfigError, SnowdayResult};
use snowday_interface::TransactionLimits;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "snowday.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct SnowdayConfig {
    /// Generation settings
    pipeline: PipelineConfig,
    /// Required-word validation
    validation: ValidationConfig,
    /// Quiz question synthesis
    questions: QuestionConfig,
    /// Narration artifacts
    narration: NarrationConfig,
    /// Commit transaction limits
    persistence: PersistenceConfig,
    /// External service endpoints
    services: ServicesConfig,
}

impl SnowdayConfig {
    /// Load configuration from a TOML file.
    #[tracing::instrument(skip(path))]
    pub fn from_file(path: impl AsRef<Path>) -> SnowdayResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> SnowdayResult<Self> {
        let config: SnowdayConfig = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.check()?;
        Ok(config)
    }

    /// Load from `path` if given, else from `snowday.toml` when present,
    /// else use defaults.
    pub fn load(path: Option<&Path>) -> SnowdayResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn check(&self) -> SnowdayResult<()> {
        let questions = &self.questions;
        if questions.min_answers < 2 || questions.min_answers > questions.max_answers {
            return Err(ConfigError::new(format!(
                "questions.min_answers ({}) must be at least 2 and no more than questions.max_answers ({})",
                questions.min_answers, questions.max_answers
            ))
            .into());
        }
        if questions.misspellings == 0 {
            return Err(ConfigError::new("questions.misspellings must be at least 1").into());
        }
        if self.pipeline.word_count == 0 {
            return Err(ConfigError::new("pipeline.word_count must be at least 1").into());
        }
        Ok(())
    }
}

/// How draft text is produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum GenerationMode {
    /// One multi-paragraph draft
    #[default]
    SingleShot,
    /// One chapter per framework stage
    Chapters,
}

/// Generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct PipelineConfig {
    /// Draft mode used by `generate`
    mode: GenerationMode,
    /// Framework used by chapter generation
    framework: String,
    /// Words the prioritizer selects per chapter
    word_count: usize,
    /// Paragraphs requested from a single-shot draft
    paragraphs: usize,
    /// Sampling temperature for every generation call
    temperature: Option<f32>,
    /// Model per generation task
    models: ModelRouting,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: GenerationMode::SingleShot,
            framework: "story-circle".to_string(),
            word_count: 5,
            paragraphs: 4,
            temperature: Some(1.0),
            models: ModelRouting::default(),
        }
    }
}

/// Model names per generation task.
///
/// Tasks without an explicit model use `fallback`; when that is unset too,
/// the backend's own default applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct ModelRouting {
    fallback: Option<String>,
    draft: Option<String>,
    chapter: Option<String>,
    rewrite: Option<String>,
    misspellings: Option<String>,
    comprehension_question: Option<String>,
    comprehension_answers: Option<String>,
}

impl Default for ModelRouting {
    fn default() -> Self {
        Self {
            fallback: Some("gpt-4o-mini".to_string()),
            draft: None,
            chapter: None,
            rewrite: None,
            misspellings: None,
            comprehension_question: None,
            comprehension_answers: None,
        }
    }
}

impl ModelRouting {
    /// Route every task to one model.
    pub fn single(model: impl Into<String>) -> Self {
        Self {
            fallback: Some(model.into()),
            ..Self::unrouted()
        }
    }

    /// No models at all; the backend decides.
    pub fn unrouted() -> Self {
        Self {
            fallback: None,
            draft: None,
            chapter: None,
            rewrite: None,
            misspellings: None,
            comprehension_question: None,
            comprehension_answers: None,
        }
    }

    /// Model for a task.
    pub fn model_for(&self, task: GenerationTask) -> Option<String> {
        let specific = match task {
            GenerationTask::Draft => &self.draft,
            GenerationTask::Chapter => &self.chapter,
            GenerationTask::Rewrite => &self.rewrite,
            GenerationTask::Misspellings => &self.misspellings,
            GenerationTask::ComprehensionQuestion => &self.comprehension_question,
            GenerationTask::ComprehensionAnswers => &self.comprehension_answers,
        };
        specific.clone().or_else(|| self.fallback.clone())
    }
}

/// Required-word validation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct ValidationConfig {
    /// Rewrite rounds before giving up
    max_attempts: i32,
    /// Missing words tolerated without a rewrite
    max_missing_allowed: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            max_missing_allowed: 0,
        }
    }
}

/// Quiz question settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct QuestionConfig {
    /// Attempts per generation call
    max_attempts: usize,
    /// Linear backoff unit; attempt k waits k times this
    retry_delay_ms: u64,
    /// Misspellings requested per word
    misspellings: usize,
    /// Fewest comprehension answers accepted
    min_answers: usize,
    /// Most comprehension answers accepted
    max_answers: usize,
}

impl Default for QuestionConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay_ms: 500,
            misspellings: 3,
            min_answers: 2,
            max_answers: 5,
        }
    }
}

impl QuestionConfig {
    /// Retry policy for question generation calls.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::linear(self.max_attempts, Duration::from_millis(self.retry_delay_ms))
    }
}

/// Narration artifact settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct NarrationConfig {
    /// Object path prefix for audio files
    path_prefix: String,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            path_prefix: "snow_day/audio".to_string(),
        }
    }
}

/// Commit transaction limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Longest wait for a database connection
    max_wait_ms: u64,
    /// Longest the transaction may run
    timeout_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            max_wait_ms: 10_000,
            timeout_ms: 15_000,
        }
    }
}

impl PersistenceConfig {
    /// Limits to pass to the repository.
    pub fn limits(&self) -> TransactionLimits {
        TransactionLimits {
            max_wait: Duration::from_millis(self.max_wait_ms),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

/// External service endpoints.
///
/// Secrets are not stored here; they come from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct ServicesConfig {
    /// OpenAI-compatible API base URL
    openai_base_url: String,
    /// Text-to-speech model
    speech_model: String,
    /// Text-to-speech voice
    voice: String,
    /// Forced alignment service base URL
    aligner_url: String,
    /// Alignment language code
    aligner_language: String,
    /// Cloud Storage bucket; `GCS_BUCKET_NAME` overrides it
    bucket: Option<String>,
    /// Write audio to this directory instead of Cloud Storage
    local_audio_dir: Option<PathBuf>,
    /// Public base URL for locally stored audio
    local_audio_base_url: Option<String>,
    /// HTTP timeout for every service call
    request_timeout_secs: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            openai_base_url: "https://api.openai.com/v1".to_string(),
            speech_model: "tts-1".to_string(),
            voice: "sage".to_string(),
            aligner_url: "http://localhost:8765".to_string(),
            aligner_language: "en".to_string(),
            bucket: None,
            local_audio_dir: None,
            local_audio_base_url: None,
            request_timeout_secs: 120,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SnowdayConfig::from_toml("").unwrap();
        assert_eq!(config, SnowdayConfig::default());
        assert_eq!(*config.validation().max_attempts(), 3);
        assert_eq!(*config.validation().max_missing_allowed(), 0);
        assert_eq!(*config.questions().retry_delay_ms(), 500);
        assert_eq!(config.narration().path_prefix(), "snow_day/audio");
        assert_eq!(
            config.persistence().limits(),
            TransactionLimits {
                max_wait: Duration::from_millis(10_000),
                timeout: Duration::from_millis(15_000),
            }
        );
    }

    #[test]
    fn test_partial_sections() {
        let config = SnowdayConfig::from_toml(
            r#"
            [pipeline]
            mode = "chapters"
            framework = "three-act"

            [pipeline.models]
            chapter = "gpt-5-nano"

            [questions]
            max_answers = 4
            "#,
        )
        .unwrap();
        assert_eq!(*config.pipeline().mode(), GenerationMode::Chapters);
        assert_eq!(config.pipeline().framework(), "three-act");
        assert_eq!(*config.pipeline().word_count(), 5);
        let models = config.pipeline().models();
        assert_eq!(models.model_for(GenerationTask::Chapter).as_deref(), Some("gpt-5-nano"));
        assert_eq!(models.model_for(GenerationTask::Rewrite).as_deref(), Some("gpt-4o-mini"));
        assert_eq!(*config.questions().max_answers(), 4);
        assert_eq!(*config.questions().min_answers(), 2);
    }

    #[test]
    fn test_invalid_answer_bounds_rejected() {
        let err = SnowdayConfig::from_toml("[questions]\nmin_answers = 1").unwrap_err();
        assert!(err.to_string().contains("min_answers"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snowday.toml");
        std::fs::write(&path, "[narration]\npath_prefix = \"audio\"\n").unwrap();
        let config = SnowdayConfig::load(Some(&path)).unwrap();
        assert_eq!(config.narration().path_prefix(), "audio");
        assert!(SnowdayConfig::from_file(dir.path().join("missing.toml")).is_err());
    }
}
