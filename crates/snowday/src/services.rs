//! Production wiring of the pipeline's collaborators.

use snowday_error::{ConfigError, SnowdayResult};
use snowday_interface::{ObjectStore, StorylineRepository};
use snowday_models::{
    AlignerConfigBuilder, GcsConfig, GcsObjectStore, HttpAlignmentClient, LocalObjectStore,
    OpenAICompatibleClient, OpenAIConfigBuilder, OpenAISpeechClient,
};
use snowday_narrative::{PipelineServices, ServicesConfig, SnowdayConfig, StoryPipeline};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

const DEFAULT_MODEL: &str = "gpt-4o-mini";

fn object_store(services: &ServicesConfig) -> SnowdayResult<Arc<dyn ObjectStore>> {
    if let Some(dir) = services.local_audio_dir() {
        info!(dir = %dir.display(), "Storing narration on the local filesystem");
        return Ok(Arc::new(LocalObjectStore::new(
            dir.clone(),
            services.local_audio_base_url().clone(),
        )));
    }
    let gcs = GcsConfig::from_env(services.bucket().as_deref())?;
    info!(bucket = %gcs.bucket(), "Storing narration in Cloud Storage");
    Ok(Arc::new(GcsObjectStore::new(gcs)?))
}

/// Build every collaborator from configuration and the environment.
///
/// Reads `OPENAI_API_KEY` (and `OPENAI_BASE_URL` to override the configured
/// base URL). Without a local audio directory, `GCS_ACCESS_TOKEN` and a
/// bucket are required too.
#[instrument(skip_all)]
pub fn build_services(
    config: &SnowdayConfig,
    repository: Arc<dyn StorylineRepository>,
) -> SnowdayResult<PipelineServices> {
    let services = config.services();
    let timeout = Duration::from_secs(*services.request_timeout_secs());

    let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| ConfigError::new("OPENAI_API_KEY not set"))?;
    let base_url = std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| services.openai_base_url().clone());
    let openai = OpenAIConfigBuilder::default()
        .api_key(api_key)
        .base_url(base_url)
        .timeout(timeout)
        .build()
        .map_err(|e| ConfigError::new(format!("Invalid OpenAI config: {}", e)))?;

    let default_model = config
        .pipeline()
        .models()
        .fallback()
        .clone()
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let generator = OpenAICompatibleClient::new(openai.clone(), default_model, "openai")?;
    let speech = OpenAISpeechClient::new(openai, services.speech_model().clone(), services.voice().clone())?;

    let aligner = AlignerConfigBuilder::default()
        .base_url(services.aligner_url().clone())
        .language(services.aligner_language().clone())
        .timeout(timeout)
        .build()
        .map_err(|e| ConfigError::new(format!("Invalid aligner config: {}", e)))?;

    Ok(PipelineServices {
        generator: Arc::new(generator),
        speech: Arc::new(speech),
        aligner: Arc::new(HttpAlignmentClient::new(aligner)?),
        store: object_store(services)?,
        repository,
    })
}

/// Build a pipeline over production clients.
pub fn build_pipeline(
    config: &SnowdayConfig,
    repository: Arc<dyn StorylineRepository>,
) -> SnowdayResult<StoryPipeline> {
    Ok(StoryPipeline::new(build_services(config, repository)?, config))
}

/// Open the storyline repository named by `DATABASE_URL`.
#[cfg(feature = "database")]
pub fn open_repository(config: &SnowdayConfig) -> SnowdayResult<Arc<dyn StorylineRepository>> {
    let repository = snowday_database::PgStorylineRepository::from_env()?.with_limits(config.persistence().limits());
    Ok(Arc::new(repository))
}

/// Open the storyline repository. Requires the `database` feature.
#[cfg(not(feature = "database"))]
pub fn open_repository(_config: &SnowdayConfig) -> SnowdayResult<Arc<dyn StorylineRepository>> {
    Err(ConfigError::new("snowday was built without the `database` feature").into())
}
