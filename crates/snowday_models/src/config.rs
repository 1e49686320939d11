//! Connection settings for the service clients.

use derive_getters::Getters;
use snowday_error::{ConfigError, SnowdayResult};
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

fn required_env(name: &str) -> SnowdayResult<String> {
    std::env::var(name).map_err(|_| ConfigError::new(format!("{} not set", name)).into())
}

fn builder_error(what: &str, err: impl std::fmt::Display) -> ConfigError {
    ConfigError::new(format!("Invalid {}: {}", what, err))
}

/// Settings for OpenAI-compatible endpoints (chat and speech).
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct OpenAIConfig {
    /// Bearer token
    api_key: String,
    /// API root, e.g. "https://api.openai.com/v1"
    #[builder(default = "\"https://api.openai.com/v1\".to_string()")]
    base_url: String,
    /// Per-request timeout
    #[builder(default = "DEFAULT_TIMEOUT")]
    timeout: Duration,
}

impl OpenAIConfig {
    /// Create config from environment variables.
    ///
    /// Reads:
    /// - `OPENAI_API_KEY` (required)
    /// - `OPENAI_BASE_URL` (default: "https://api.openai.com/v1")
    pub fn from_env() -> SnowdayResult<Self> {
        let api_key = required_env("OPENAI_API_KEY")?;
        let mut builder = OpenAIConfigBuilder::default();
        builder.api_key(api_key);
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            builder.base_url(base_url);
        }
        Ok(builder.build().map_err(|e| builder_error("OpenAI config", e))?)
    }

    /// Full URL of an endpoint below the API root.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

/// Settings for the forced alignment service.
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct AlignerConfig {
    /// Service root, e.g. "http://localhost:8765"
    base_url: String,
    /// Language code passed with every request
    #[builder(default = "\"en\".to_string()")]
    language: String,
    /// Per-request timeout
    #[builder(default = "DEFAULT_TIMEOUT")]
    timeout: Duration,
}

impl AlignerConfig {
    /// Create config from environment variables.
    ///
    /// Reads:
    /// - `ALIGNER_URL` (default: "http://localhost:8765")
    /// - `ALIGNER_LANGUAGE` (default: "en")
    pub fn from_env() -> SnowdayResult<Self> {
        let base_url = std::env::var("ALIGNER_URL").unwrap_or_else(|_| "http://localhost:8765".to_string());
        let mut builder = AlignerConfigBuilder::default();
        builder.base_url(base_url);
        if let Ok(language) = std::env::var("ALIGNER_LANGUAGE") {
            builder.language(language);
        }
        Ok(builder.build().map_err(|e| builder_error("aligner config", e))?)
    }
}

/// Settings for Google Cloud Storage uploads.
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct GcsConfig {
    /// Bucket receiving narration audio
    bucket: String,
    /// OAuth2 access token with write access to the bucket
    access_token: String,
    /// JSON API upload root
    #[builder(default = "\"https://storage.googleapis.com/upload/storage/v1\".to_string()")]
    upload_base_url: String,
    /// Root of public object URLs
    #[builder(default = "\"https://storage.googleapis.com\".to_string()")]
    public_base_url: String,
    /// Per-request timeout
    #[builder(default = "DEFAULT_TIMEOUT")]
    timeout: Duration,
}

impl GcsConfig {
    /// Create config from environment variables.
    ///
    /// Reads:
    /// - `GCS_BUCKET_NAME` (required unless `bucket` is given)
    /// - `GCS_ACCESS_TOKEN` (required)
    pub fn from_env(bucket: Option<&str>) -> SnowdayResult<Self> {
        let bucket = match std::env::var("GCS_BUCKET_NAME") {
            Ok(bucket) => bucket,
            Err(_) => bucket
                .map(str::to_string)
                .ok_or_else(|| ConfigError::new("GCS_BUCKET_NAME not set"))?,
        };
        let access_token = required_env("GCS_ACCESS_TOKEN")?;
        Ok(GcsConfigBuilder::default()
            .bucket(bucket)
            .access_token(access_token)
            .build()
            .map_err(|e| builder_error("storage config", e))?)
    }

    /// Public URL of an object.
    pub fn public_url(&self, object: &str) -> String {
        format!("{}/{}/{}", self.public_base_url.trim_end_matches('/'), self.bucket, object)
    }
}
