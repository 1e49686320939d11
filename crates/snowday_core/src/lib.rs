//! Core data types for the Snowday story generation pipeline.
//!
//! This crate provides the typed records shared by every stage: the storyline
//! request snapshot and status lifecycle, generation requests, quiz questions,
//! forced-alignment timelines and the canonical narrated text.

mod alignment;
mod paragraph;
mod progress;
mod question;
mod request;
mod role;
mod status;
mod storyline;
mod text;

pub use alignment::{AlignmentMap, TimelineNode, TimelineSpan, WordAlignment};
pub use paragraph::{Narration, ProcessedParagraph};
pub use progress::WordProgress;
pub use question::{QuestionKind, QuizQuestion};
pub use request::{GenerateRequest, GenerationTask, Message};
pub use role::Role;
pub use status::StorylineStatus;
pub use storyline::{StorylineRecord, StorylineRequest, StorylineRequestBuilder, REQUEST_VERSION};
pub use text::{CanonicalText, strip_markup};
