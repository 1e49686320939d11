//! Story generation pipeline for Snowday.
//!
//! Turns a pending storyline into validated paragraphs with quiz questions and
//! word-aligned narration, then commits everything in one transaction.
//!
//! # Flow
//!
//! ```text
//! prioritizer → generator → validator ⟲ → { questions ‖ narration } → persistence
//! ```
//!
//! Every external service is an injected trait object from
//! `snowday_interface`, so the pipeline runs unchanged against real clients or
//! test doubles.

mod config;
mod framework;
mod generator;
mod in_memory_repository;
mod narration;
mod persistence;
mod pipeline;
mod prioritizer;
mod prompts;
mod questions;
mod retry;
mod static_story;
mod validator;

pub use config::{
    GenerationMode, ModelRouting, NarrationConfig, PersistenceConfig, PipelineConfig,
    QuestionConfig, ServicesConfig, SnowdayConfig, ValidationConfig,
};
pub use framework::NarrativeFramework;
pub use generator::{RoutedGenerator, StoryGenerator, split_paragraphs};
pub use in_memory_repository::{InMemoryStorylineRepository, RepositorySnapshot};
pub use narration::NarrationSynthesizer;
pub use persistence::PersistenceCoordinator;
pub use pipeline::{PipelineServices, StoryPipeline};
pub use prioritizer::{VocabularyPrioritizer, prioritize_words};
pub use questions::{QuestionSynthesizer, parse_answers, parse_misspellings};
pub use retry::{RetryPolicy, retry};
pub use static_story::{StaticParagraph, StaticStory};
pub use validator::{ConstraintValidator, missing_words};
