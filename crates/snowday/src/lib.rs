//! Snowday: vocabulary stories with quizzes and word-aligned narration.
//!
//! This crate re-exports the workspace crates and wires the production
//! service clients into a [`StoryPipeline`].
//!
//! ```no_run
//! use snowday::{SnowdayConfig, build_pipeline};
//! use std::sync::Arc;
//!
//! # async fn run() -> snowday::SnowdayResult<()> {
//! let config = SnowdayConfig::load(None)?;
//! let repository = Arc::new(snowday::InMemoryStorylineRepository::new());
//! let pipeline = build_pipeline(&config, repository)?;
//! pipeline.generate_and_persist_storyline(42).await?;
//! # Ok(())
//! # }
//! ```

mod services;

pub use services::{build_pipeline, build_services, open_repository};

pub use snowday_core::*;
pub use snowday_error::*;
pub use snowday_interface::*;
pub use snowday_models::*;
pub use snowday_narrative::*;

#[cfg(feature = "database")]
pub use snowday_database::{PgStorylineRepository, create_pool, establish_connection, run_migrations};
