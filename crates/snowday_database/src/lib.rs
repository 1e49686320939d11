//! PostgreSQL persistence for Snowday.
//!
//! Provides the diesel schema for storylines, stories and questions, embedded
//! migrations, connection pooling and [`PgStorylineRepository`], the
//! transactional implementation of `StorylineRepository`.

mod connection;
mod migrations;
mod models;
mod repository;
pub mod schema;

pub use connection::{PgPool, create_pool, create_pool_for, establish_connection};
pub use migrations::{MIGRATIONS, run_migrations};
pub use models::{
    NewQuestion, NewStory, NewStoryQuestion, NewStoryline, NewStorylineProgress,
    NewStorylineProgressBuilder, NewStorylineStep, NewVocab, NewVocabBuilder, StorylineRow,
};
pub use repository::PgStorylineRepository;

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, snowday_error::DatabaseError>;
