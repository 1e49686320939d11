//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the snowday binary.

mod commands;
mod handlers;

pub use commands::{Cli, Commands};
pub use handlers::{
    handle_chapters, handle_generate, handle_load, handle_migrate, handle_pick_words, handle_reset,
};
