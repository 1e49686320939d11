//! Draft and chapter generation.

use crate::{ModelRouting, NarrativeFramework, prompts};
use snowday_core::{GenerateRequest, StorylineRequest, strip_markup};
use snowday_error::{GenerationError, GenerationErrorKind, SnowdayResult};
use snowday_interface::TextGenerator;
use std::sync::Arc;
use tracing::{debug, instrument};

/// A text generator with per-task model routing and shared sampling settings.
///
/// Empty completions are reported as `GenerationErrorKind::Empty`.
#[derive(Clone)]
pub struct RoutedGenerator {
    backend: Arc<dyn TextGenerator>,
    routing: ModelRouting,
    temperature: Option<f32>,
}

impl RoutedGenerator {
    /// Wrap a backend.
    pub fn new(backend: Arc<dyn TextGenerator>, routing: ModelRouting, temperature: Option<f32>) -> Self {
        Self {
            backend,
            routing,
            temperature,
        }
    }

    /// Send a request, returning the trimmed non-empty completion.
    #[instrument(skip(self, request), fields(task = %request.task(), provider = self.backend.provider_name()))]
    pub async fn complete(&self, request: GenerateRequest) -> SnowdayResult<String> {
        let task = *request.task();
        let model = request.model().clone().or_else(|| self.routing.model_for(task));
        let temperature = (*request.temperature()).or(self.temperature);
        let request = request.with_model(model).with_temperature(temperature);

        let text = self.backend.generate(&request).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(GenerationError::new(GenerationErrorKind::Empty(task.to_string())).into());
        }
        debug!(chars = text.len(), "Generation complete");
        Ok(text.to_string())
    }
}

/// Split generated text into paragraphs at blank lines, dropping empty ones.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }
    paragraphs
}

/// Produces draft text in single-shot or chapter mode.
#[derive(Clone)]
pub struct StoryGenerator {
    generation: RoutedGenerator,
    paragraphs: usize,
}

impl StoryGenerator {
    /// Create a generator asking for about `paragraphs` paragraphs per draft.
    pub fn new(generation: RoutedGenerator, paragraphs: usize) -> Self {
        Self {
            generation,
            paragraphs,
        }
    }

    /// Generate a whole story and split it into paragraphs.
    #[instrument(skip(self, request))]
    pub async fn draft(&self, request: &StorylineRequest) -> SnowdayResult<Vec<String>> {
        let text = self
            .generation
            .complete(prompts::draft(request, self.paragraphs))
            .await?;
        // Blocks that are only markup (rules, lone tags) narrate as nothing.
        let paragraphs: Vec<String> = split_paragraphs(&text)
            .into_iter()
            .filter(|block| !strip_markup(block).is_empty())
            .collect();
        if paragraphs.is_empty() {
            return Err(GenerationError::new(GenerationErrorKind::Empty("draft".to_string())).into());
        }
        debug!(count = paragraphs.len(), "Draft split into paragraphs");
        Ok(paragraphs)
    }

    /// Generate chapter `index` of `framework`, or `None` past its last chapter.
    #[instrument(skip(self, request, framework, words, previous), fields(framework = framework.name()))]
    pub async fn chapter(
        &self,
        request: &StorylineRequest,
        framework: &NarrativeFramework,
        index: usize,
        words: &[String],
        previous: Option<&str>,
    ) -> SnowdayResult<Option<String>> {
        let Some(goal) = framework.chapter_goal(index) else {
            debug!(index, "Framework exhausted");
            return Ok(None);
        };
        let text = self
            .generation
            .complete(prompts::chapter(request, framework, index, goal, words, previous))
            .await?;
        Ok(Some(text))
    }
}
