//! Command-line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Vocabulary stories with quizzes and word-aligned narration.
#[derive(Parser, Debug)]
#[command(name = "snowday")]
#[command(about = "Snowday - Vocabulary story generation pipeline")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (defaults to ./snowday.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate, enrich and persist a pending storyline
    Generate {
        /// Storyline to fill
        storyline_id: i32,
    },

    /// Append chapters to a storyline following a narrative framework
    Chapters {
        /// Storyline to extend
        storyline_id: i32,

        /// Framework name (overrides the configured one)
        #[arg(short, long)]
        framework: Option<String>,
    },

    /// Print the words a student should practice next
    PickWords {
        /// Vocabulary list id
        #[arg(long)]
        vocab: i32,

        /// Student id
        #[arg(long)]
        student: i32,

        /// How many words to pick
        #[arg(long, default_value_t = 5)]
        count: usize,
    },

    /// Load a hand-written story from a TOML file
    Load {
        /// Static story file
        file: PathBuf,

        /// Mark the new storyline failed if loading does not finish
        #[arg(long)]
        mark_failed: bool,
    },

    /// Return a storyline to pending, discarding its generated content
    Reset {
        /// Storyline to reset
        storyline_id: i32,
    },

    /// Run pending database migrations
    Migrate,
}
