//! Storyline generation pipeline.

use crate::{
    ConstraintValidator, GenerationMode, NarrationSynthesizer, NarrativeFramework,
    PersistenceCoordinator, QuestionSynthesizer, RoutedGenerator, SnowdayConfig, StaticStory,
    StoryGenerator, VocabularyPrioritizer,
};
use futures::future;
use snowday_core::{ProcessedParagraph, StorylineRecord, StorylineRequest, StorylineStatus, strip_markup};
use snowday_error::{
    GenerationError, GenerationErrorKind, SnowdayError, SnowdayResult, StorylineError,
    StorylineErrorKind,
};
use snowday_interface::{
    CommitSummary, ForcedAligner, ObjectStore, PersistPlan, SpeechSynthesizer, StorylineRepository,
    TextGenerator,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// External collaborators the pipeline runs against.
#[derive(Clone)]
pub struct PipelineServices {
    /// Text generation backend
    pub generator: Arc<dyn TextGenerator>,
    /// Text-to-speech backend
    pub speech: Arc<dyn SpeechSynthesizer>,
    /// Forced alignment backend
    pub aligner: Arc<dyn ForcedAligner>,
    /// Audio storage
    pub store: Arc<dyn ObjectStore>,
    /// Relational store
    pub repository: Arc<dyn StorylineRepository>,
}

/// Generates, validates, narrates, quizzes and commits storylines.
///
/// # Example
///
/// ```no_run
/// use snowday_narrative::{PipelineServices, SnowdayConfig, StoryPipeline};
///
/// # async fn run(services: PipelineServices) -> snowday_error::SnowdayResult<()> {
/// let pipeline = StoryPipeline::new(services, &SnowdayConfig::default());
/// let summary = pipeline.generate_and_persist_storyline(42).await?;
/// println!("{} stories", summary.story_ids.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct StoryPipeline {
    repository: Arc<dyn StorylineRepository>,
    prioritizer: VocabularyPrioritizer,
    generator: StoryGenerator,
    validator: ConstraintValidator,
    questions: QuestionSynthesizer,
    narration: NarrationSynthesizer,
    persistence: PersistenceCoordinator,
    mode: GenerationMode,
    framework: String,
    word_count: usize,
}

impl StoryPipeline {
    /// Assemble a pipeline from its collaborators and configuration.
    pub fn new(services: PipelineServices, config: &SnowdayConfig) -> Self {
        let pipeline = config.pipeline();
        let generation = RoutedGenerator::new(
            services.generator,
            pipeline.models().clone(),
            *pipeline.temperature(),
        );
        let questions = config.questions();

        Self {
            prioritizer: VocabularyPrioritizer::new(services.repository.clone()),
            generator: StoryGenerator::new(generation.clone(), *pipeline.paragraphs()),
            validator: ConstraintValidator::new(
                generation.clone(),
                *config.validation().max_attempts(),
                *config.validation().max_missing_allowed(),
            ),
            questions: QuestionSynthesizer::new(
                generation,
                questions.retry_policy(),
                *questions.misspellings(),
                *questions.min_answers()..=*questions.max_answers(),
            ),
            narration: NarrationSynthesizer::new(
                services.speech,
                services.aligner,
                services.store,
                config.narration().path_prefix().clone(),
            ),
            persistence: PersistenceCoordinator::new(
                services.repository.clone(),
                config.persistence().limits(),
            ),
            repository: services.repository,
            mode: *pipeline.mode(),
            framework: pipeline.framework().clone(),
            word_count: *pipeline.word_count(),
        }
    }

    /// The repository the pipeline reads and commits through.
    pub fn repository(&self) -> &Arc<dyn StorylineRepository> {
        &self.repository
    }

    /// Load a storyline that is ready to process and parse its request.
    ///
    /// # Errors
    ///
    /// `StorylineErrorKind::NotFound` for an unknown id, `NotPending` when
    /// the storyline was already processed, `InvalidRequest` when its
    /// snapshot cannot be read.
    #[instrument(skip(self))]
    pub async fn fetch_storyline(&self, storyline_id: i32) -> SnowdayResult<(StorylineRecord, StorylineRequest)> {
        let record = self
            .repository
            .load_storyline(storyline_id)
            .await?
            .ok_or_else(|| StorylineError::new(StorylineErrorKind::NotFound(storyline_id)))?;

        if *record.status() != StorylineStatus::Pending {
            return Err(StorylineError::new(StorylineErrorKind::NotPending {
                id: storyline_id,
                status: record.status().to_string(),
            })
            .into());
        }

        let request = record.request()?;
        Ok((record, request))
    }

    /// Process a storyline in the configured generation mode.
    pub async fn run(&self, storyline_id: i32) -> SnowdayResult<Vec<CommitSummary>> {
        match self.mode {
            GenerationMode::SingleShot => Ok(vec![self.generate_and_persist_storyline(storyline_id).await?]),
            GenerationMode::Chapters => self.append_chapters(storyline_id, None).await,
        }
    }

    /// Generate a whole story for a pending storyline and commit it.
    ///
    /// Every paragraph is processed concurrently; the first failure aborts the
    /// rest and nothing is committed. The storyline stays `pending` on failure.
    #[instrument(skip(self))]
    pub async fn generate_and_persist_storyline(&self, storyline_id: i32) -> SnowdayResult<CommitSummary> {
        let (_, request) = self.fetch_storyline(storyline_id).await?;
        let required = request.required_words();

        let drafts = self.generator.draft(&request).await?;
        info!(paragraphs = drafts.len(), "Draft generated");

        let processed = future::try_join_all(
            drafts
                .iter()
                .enumerate()
                .map(|(index, draft)| self.process_paragraph(storyline_id, draft, &required, index)),
        )
        .await?;

        self.persistence
            .persist(PersistPlan::new(storyline_id, *request.vocab_id(), processed))
            .await
    }

    /// Validate, quiz and narrate one paragraph, with a comprehension question.
    pub async fn process_paragraph(
        &self,
        storyline_id: i32,
        text: &str,
        required: &[String],
        index: usize,
    ) -> SnowdayResult<ProcessedParagraph> {
        self.process_paragraph_with(storyline_id, text, required, index, true)
            .await
    }

    /// Validate, quiz and narrate one paragraph.
    ///
    /// The text is stripped to canonical form once; that value is validated,
    /// then questions and narration run concurrently on the validated text.
    /// Errors carry the paragraph index and the stage that failed.
    #[instrument(skip(self, text, required), fields(required = required.len()))]
    pub async fn process_paragraph_with(
        &self,
        storyline_id: i32,
        text: &str,
        required: &[String],
        index: usize,
        comprehension: bool,
    ) -> SnowdayResult<ProcessedParagraph> {
        let canonical = strip_markup(text);
        if canonical.is_empty() {
            let err: SnowdayError =
                GenerationError::new(GenerationErrorKind::Empty("paragraph".to_string())).into();
            return Err(err.in_paragraph(index, "validation"));
        }

        let validated = self
            .validator
            .validate(canonical, required)
            .await
            .map_err(|e| e.in_paragraph(index, "validation"))?;

        let lowered = validated.as_str().to_lowercase();
        let mut present: Vec<&String> = Vec::new();
        for word in required {
            if lowered.contains(&word.to_lowercase()) && !present.iter().any(|p| p.eq_ignore_ascii_case(word)) {
                present.push(word);
            }
        }

        let selects = future::try_join_all(present.iter().map(|word| async move {
            self.questions
                .select_question(word)
                .await
                .map_err(|e| e.in_paragraph(index, format!("question:{}", word)))
        }));
        let comprehension_question = async {
            if !comprehension {
                return Ok(None);
            }
            self.questions
                .comprehension_question(&validated)
                .await
                .map(Some)
                .map_err(|e| e.in_paragraph(index, "comprehension"))
        };
        let narration = async {
            self.narration
                .narrate(&validated, storyline_id, index)
                .await
                .map_err(|e| e.in_paragraph(index, "narration"))
        };

        let (mut questions, comprehension_question, narration) =
            futures::try_join!(selects, comprehension_question, narration)?;
        questions.extend(comprehension_question);

        info!(questions = questions.len(), "Paragraph processed");
        Ok(ProcessedParagraph::new(index, validated, narration, questions))
    }

    /// Next words a student should practice from a vocabulary list.
    pub async fn pick_next_words(&self, vocab_id: i32, student_id: i32, count: usize) -> SnowdayResult<Vec<String>> {
        self.prioritizer.pick_next_words(vocab_id, student_id, count).await
    }

    /// Generate and commit a storyline chapter by chapter.
    ///
    /// Each chapter targets freshly prioritized words (falling back to the
    /// request's words), builds on the previous chapter, and is committed in
    /// its own transaction at step `index + 1`. A failure stops the loop;
    /// chapters already committed stay.
    #[instrument(skip(self))]
    pub async fn append_chapters(
        &self,
        storyline_id: i32,
        framework: Option<&str>,
    ) -> SnowdayResult<Vec<CommitSummary>> {
        let framework = NarrativeFramework::by_name(framework.unwrap_or(&self.framework))?;
        let (_, request) = self.fetch_storyline(storyline_id).await?;
        let mut previous: Option<String> = None;
        let mut commits = Vec::new();

        for index in 0.. {
            let mut words = self
                .pick_next_words(*request.vocab_id(), *request.student_id(), self.word_count)
                .await?;
            if words.is_empty() {
                warn!(index, "No prioritized words, using request words");
                words = request.required_words();
            }

            let Some(chapter) = self
                .generator
                .chapter(&request, &framework, index, &words, previous.as_deref())
                .await?
            else {
                break;
            };

            let processed = self
                .process_paragraph(storyline_id, &chapter, &words, index)
                .await?;
            previous = Some(processed.content().as_str().to_string());

            let summary = self
                .persistence
                .persist(PersistPlan::at_index(storyline_id, *request.vocab_id(), index, vec![processed]))
                .await?;
            info!(index, framework = framework.name(), "Chapter committed");
            commits.push(summary);
        }

        Ok(commits)
    }

    /// Create a pending storyline for a static story.
    pub async fn create_static_storyline(&self, story: &StaticStory) -> SnowdayResult<StorylineRecord> {
        let record = self.repository.create_storyline(story.storyline()).await?;
        info!(storyline_id = record.id(), "Created storyline");
        Ok(record)
    }

    /// Process every paragraph of a static story and commit them together.
    ///
    /// Paragraphs use their own word lists; a comprehension question is
    /// added only where the paragraph asks for one.
    #[instrument(skip(self, story), fields(paragraphs = story.paragraphs().len()))]
    pub async fn persist_static_story(&self, storyline_id: i32, story: &StaticStory) -> SnowdayResult<CommitSummary> {
        let words: Vec<Vec<String>> = story
            .paragraphs()
            .iter()
            .map(|p| {
                p.words()
                    .iter()
                    .map(|w| w.trim().to_string())
                    .filter(|w| !w.is_empty())
                    .collect()
            })
            .collect();

        let processed = future::try_join_all(story.paragraphs().iter().zip(&words).enumerate().map(
            |(index, (paragraph, words))| {
                self.process_paragraph_with(storyline_id, paragraph.text(), words, index, *paragraph.comprehension())
            },
        ))
        .await?;

        self.persistence
            .persist(PersistPlan::new(storyline_id, *story.storyline().vocab_id(), processed))
            .await
    }

    /// Create and fill a storyline from a static story.
    pub async fn load_static_story(&self, story: &StaticStory) -> SnowdayResult<(StorylineRecord, CommitSummary)> {
        let record = self.create_static_storyline(story).await?;
        let summary = self.persist_static_story(*record.id(), story).await?;
        Ok((record, summary))
    }
}
