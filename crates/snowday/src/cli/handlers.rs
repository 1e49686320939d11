//! Command handlers.

use snowday::{SnowdayConfig, StaticStory, build_pipeline, open_repository};
use std::path::Path;
use tracing::{error, info, instrument, warn};

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Handle the `generate` command
#[instrument(skip(config))]
pub async fn handle_generate(config: &SnowdayConfig, storyline_id: i32) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config, open_repository(config)?)?;
    let commits = pipeline.run(storyline_id).await?;
    info!(commits = commits.len(), "Storyline generated");
    print_json(&commits)
}

/// Handle the `chapters` command
#[instrument(skip(config))]
pub async fn handle_chapters(
    config: &SnowdayConfig,
    storyline_id: i32,
    framework: Option<String>,
) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config, open_repository(config)?)?;
    let commits = pipeline.append_chapters(storyline_id, framework.as_deref()).await?;
    info!(chapters = commits.len(), "Chapters appended");
    print_json(&commits)
}

/// Handle the `pick-words` command
#[instrument(skip(config))]
pub async fn handle_pick_words(config: &SnowdayConfig, vocab: i32, student: i32, count: usize) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config, open_repository(config)?)?;
    for word in pipeline.pick_next_words(vocab, student, count).await? {
        println!("{}", word);
    }
    Ok(())
}

/// Handle the `load` command.
///
/// With `mark_failed`, a storyline created by this command is flipped to
/// `failed` when its paragraphs cannot be processed or committed.
#[instrument(skip_all, fields(file = %file.display(), mark_failed = mark_failed))]
pub async fn handle_load(config: &SnowdayConfig, file: &Path, mark_failed: bool) -> anyhow::Result<()> {
    let story = StaticStory::from_file(file)?;
    let pipeline = build_pipeline(config, open_repository(config)?)?;

    let record = pipeline.create_static_storyline(&story).await?;
    let storyline_id = *record.id();
    match pipeline.persist_static_story(storyline_id, &story).await {
        Ok(summary) => {
            info!(storyline_id, stories = summary.story_ids.len(), "Static story loaded");
            print_json(&summary)
        }
        Err(e) => {
            error!(storyline_id, error = %e, "Static story failed to load");
            if mark_failed {
                if let Err(mark) = pipeline.repository().mark_failed(storyline_id).await {
                    warn!(storyline_id, error = %mark, "Could not mark storyline failed");
                } else {
                    info!(storyline_id, "Storyline marked failed");
                }
            }
            Err(e.into())
        }
    }
}

/// Handle the `reset` command
#[instrument(skip(config))]
pub async fn handle_reset(config: &SnowdayConfig, storyline_id: i32) -> anyhow::Result<()> {
    let repository = open_repository(config)?;
    if repository.reset_storyline(storyline_id).await? {
        info!(storyline_id, "Storyline reset to pending");
    } else {
        warn!(storyline_id, "Storyline not found, nothing to reset");
    }
    Ok(())
}

/// Handle the `migrate` command
#[cfg(feature = "database")]
#[instrument]
pub fn handle_migrate() -> anyhow::Result<()> {
    let mut conn = snowday::establish_connection()?;
    let applied = snowday::run_migrations(&mut conn)?;
    if applied.is_empty() {
        info!("Database schema is up to date");
    }
    for version in applied {
        info!(version = %version, "Applied migration");
    }
    Ok(())
}

/// Handle the `migrate` command
#[cfg(not(feature = "database"))]
pub fn handle_migrate() -> anyhow::Result<()> {
    anyhow::bail!("snowday was built without the `database` feature")
}
