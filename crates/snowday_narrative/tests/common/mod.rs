//! Test doubles for the pipeline's collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use snowday_core::{GenerateRequest, GenerationTask, TimelineNode, TimelineSpan, WordAlignment};
use snowday_error::{SnowdayResult, StorageError, StorageErrorKind, SynthesisError, SynthesisErrorKind};
use snowday_interface::{ForcedAligner, ObjectStore, SpeechSynthesizer, TextGenerator};
use snowday_narrative::{
    InMemoryStorylineRepository, ModelRouting, PipelineServices, RoutedGenerator, SnowdayConfig,
    StoryPipeline,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub type Handler = Arc<dyn Fn(&str) -> SnowdayResult<String> + Send + Sync>;

/// Text between `start` and the next `end` after it.
pub fn between<'a>(text: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = text.find(start)? + start.len();
    let len = text[from..].find(end)?;
    Some(&text[from..from + len])
}

/// Generator that answers each task with a canned or computed response.
///
/// Rewrites append every missing word; misspellings are derived from the
/// word; chapters mention every target word.
pub struct MockGenerator {
    draft: String,
    overrides: Mutex<HashMap<GenerationTask, Handler>>,
    delays: Mutex<HashMap<GenerationTask, Duration>>,
    calls: Mutex<Vec<(GenerationTask, String)>>,
}

impl MockGenerator {
    pub fn new(draft: &str) -> Self {
        Self {
            draft: draft.to_string(),
            overrides: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with(self, task: GenerationTask, handler: impl Fn(&str) -> SnowdayResult<String> + Send + Sync + 'static) -> Self {
        self.overrides.lock().unwrap().insert(task, Arc::new(handler));
        self
    }

    /// Sleep for `delay` before answering `task`.
    pub fn delayed(self, task: GenerationTask, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(task, delay);
        self
    }

    pub fn calls(&self, task: GenerationTask) -> usize {
        self.calls.lock().unwrap().iter().filter(|(t, _)| *t == task).count()
    }

    pub fn prompts(&self, task: GenerationTask) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| *t == task)
            .map(|(_, p)| p.clone())
            .collect()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn default_response(&self, task: GenerationTask, prompt: &str) -> String {
        match task {
            GenerationTask::Draft => self.draft.clone(),
            GenerationTask::Chapter => {
                let words = between(prompt, "following words: ", ".").unwrap_or("");
                format!("## A chapter\n\nOnce upon a time there was {}.", words)
            }
            GenerationTask::Rewrite => {
                let missing = between(prompt, "include the words: ", ".\n").unwrap_or("");
                let original = between(prompt, "Original paragraph:\n\"", "\"\n").unwrap_or("");
                format!("{} Then came {}.", original, missing.replace(", ", " and "))
            }
            GenerationTask::Misspellings => {
                let word = between(prompt, "of the word \"", "\"").unwrap_or("word");
                format!(
                    r#"{{"answers": ["{w}x", "x{w}", "{w}{w}"]}}"#,
                    w = word
                )
            }
            GenerationTask::ComprehensionQuestion => "Who was the hero?".to_string(),
            GenerationTask::ComprehensionAnswers => "The whale, A crab, An otter".to_string(),
        }
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, request: &GenerateRequest) -> SnowdayResult<String> {
        let prompt = request.user_text().unwrap_or_default().to_string();
        let task = *request.task();
        self.calls.lock().unwrap().push((task, prompt.clone()));

        let delay = self.delays.lock().unwrap().get(&task).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let handler = self.overrides.lock().unwrap().get(&task).cloned();
        match handler {
            Some(handler) => handler(&prompt),
            None => Ok(self.default_response(task, &prompt)),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Speech stub returning fixed bytes.
#[derive(Default)]
pub struct StubSpeech {
    pub fail: bool,
    pub delay: Duration,
    pub inputs: Mutex<Vec<String>>,
}

#[async_trait]
impl SpeechSynthesizer for StubSpeech {
    async fn synthesize(&self, text: &str) -> SnowdayResult<Vec<u8>> {
        self.inputs.lock().unwrap().push(text.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(SynthesisError::new(SynthesisErrorKind::Speech("tts offline".into())).into());
        }
        Ok(b"ID3 fake mp3".to_vec())
    }
}

/// Aligner stub that computes word offsets from the text itself.
///
/// `shift` moves every offset, producing a misaligned timeline.
#[derive(Default)]
pub struct StubAligner {
    pub shift: usize,
    pub inputs: Mutex<Vec<String>>,
}

pub fn word_timeline(text: &str, shift: usize) -> Vec<TimelineNode> {
    let chars: Vec<char> = text.chars().collect();
    let mut words = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_alphanumeric() {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '\'') {
                i += 1;
            }
            let n = words.len() as f64;
            words.push(TimelineNode::Word(WordAlignment {
                text: chars[start..i].iter().collect(),
                start_time: n * 0.4,
                end_time: n * 0.4 + 0.3,
                start_offset_utf32: start + shift,
                end_offset_utf32: i + shift,
            }));
        } else {
            i += 1;
        }
    }
    let span = |timeline| TimelineSpan {
        text: text.to_string(),
        start_time: 0.0,
        end_time: 1.0,
        timeline,
    };
    vec![TimelineNode::Segment(span(vec![TimelineNode::Sentence(span(words))]))]
}

#[async_trait]
impl ForcedAligner for StubAligner {
    async fn align(&self, audio: &[u8], text: &str) -> SnowdayResult<Vec<TimelineNode>> {
        assert!(!audio.is_empty());
        self.inputs.lock().unwrap().push(text.to_string());
        Ok(word_timeline(text, self.shift))
    }
}

/// Object store keeping uploads in memory.
#[derive(Default)]
pub struct MemoryStore {
    pub objects: Mutex<HashMap<String, Vec<u8>>>,
    pub fail: bool,
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, path: &str, bytes: Vec<u8>, _content_type: &str) -> SnowdayResult<String> {
        if self.fail {
            return Err(StorageError::new(StorageErrorKind::Unavailable("bucket offline".into())).into());
        }
        self.objects.lock().unwrap().insert(path.to_string(), bytes);
        Ok(format!("https://storage.test/{}", path))
    }
}

/// Config with near-zero retry delays.
pub fn fast_config() -> SnowdayConfig {
    SnowdayConfig::from_toml(
        r#"
        [questions]
        retry_delay_ms = 1
        "#,
    )
    .unwrap()
}

pub struct Harness {
    pub pipeline: StoryPipeline,
    pub repo: InMemoryStorylineRepository,
    pub generator: Arc<MockGenerator>,
    pub speech: Arc<StubSpeech>,
    pub aligner: Arc<StubAligner>,
    pub store: Arc<MemoryStore>,
}

pub fn harness(generator: MockGenerator) -> Harness {
    harness_with(generator, StubSpeech::default(), StubAligner::default(), MemoryStore::default(), fast_config())
}

pub fn harness_with(
    generator: MockGenerator,
    speech: StubSpeech,
    aligner: StubAligner,
    store: MemoryStore,
    config: SnowdayConfig,
) -> Harness {
    let repo = InMemoryStorylineRepository::new();
    let generator = Arc::new(generator);
    let speech = Arc::new(speech);
    let aligner = Arc::new(aligner);
    let store = Arc::new(store);
    let services = PipelineServices {
        generator: generator.clone(),
        speech: speech.clone(),
        aligner: aligner.clone(),
        store: store.clone(),
        repository: Arc::new(repo.clone()),
    };
    Harness {
        pipeline: StoryPipeline::new(services, &config),
        repo,
        generator,
        speech,
        aligner,
        store,
    }
}

pub fn routed(generator: Arc<MockGenerator>) -> RoutedGenerator {
    RoutedGenerator::new(generator, ModelRouting::unrouted(), None)
}
