//! Snowday command-line entry point.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use snowday::SnowdayConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = SnowdayConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate { storyline_id } => cli::handle_generate(&config, storyline_id).await,
        Commands::Chapters {
            storyline_id,
            framework,
        } => cli::handle_chapters(&config, storyline_id, framework).await,
        Commands::PickWords {
            vocab,
            student,
            count,
        } => cli::handle_pick_words(&config, vocab, student, count).await,
        Commands::Load { file, mark_failed } => cli::handle_load(&config, &file, mark_failed).await,
        Commands::Reset { storyline_id } => cli::handle_reset(&config, storyline_id).await,
        Commands::Migrate => cli::handle_migrate(),
    }
}
