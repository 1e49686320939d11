//! Trait definitions for the collaborators of the Snowday pipeline.
//!
//! The pipeline receives every external service as an injected handle
//! implementing one of these traits, so tests can substitute doubles for
//! generation, speech, alignment, storage and the database.

mod repository;
mod services;

pub use repository::{CommitSummary, PersistPlan, StorylineRepository, TransactionLimits};
pub use services::{ForcedAligner, ObjectStore, SpeechSynthesizer, TextGenerator};
