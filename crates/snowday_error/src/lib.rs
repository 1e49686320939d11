//! Error types for the Snowday story generation pipeline.
//!
//! Every domain has its own error struct carrying a kind plus the source
//! location where it was raised. [`SnowdayError`] aggregates them so pipeline
//! stages can propagate any failure with `?`.

mod config;
mod database;
mod error;
mod generation;
mod http;
mod storage;
mod storyline;
mod synthesis;

pub use config::ConfigError;
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{ParagraphError, SnowdayError, SnowdayErrorKind, SnowdayResult};
pub use generation::{GenerationError, GenerationErrorKind};
pub use http::HttpError;
pub use storage::{StorageError, StorageErrorKind};
pub use storyline::{StorylineError, StorylineErrorKind};
pub use synthesis::{SynthesisError, SynthesisErrorKind};
