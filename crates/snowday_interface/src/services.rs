//! External service traits.

use async_trait::async_trait;
use snowday_core::{GenerateRequest, TimelineNode};
use snowday_error::SnowdayResult;

/// A text generation backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for the request.
    ///
    /// Returns the raw completion text, which may be empty. Callers decide
    /// whether empty output is an error.
    async fn generate(&self, request: &GenerateRequest) -> SnowdayResult<String>;

    /// Backend name for logging.
    fn provider_name(&self) -> &'static str;
}

/// Text-to-speech backend.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize speech for `text`, returning encoded audio bytes.
    async fn synthesize(&self, text: &str) -> SnowdayResult<Vec<u8>>;

    /// MIME type of the audio produced.
    fn content_type(&self) -> &'static str {
        "audio/mpeg"
    }

    /// File extension matching [`content_type`](Self::content_type).
    fn extension(&self) -> &'static str {
        "mp3"
    }
}

/// Forced alignment of audio against the text it narrates.
#[async_trait]
pub trait ForcedAligner: Send + Sync {
    /// Align `audio` with `text`, returning the hierarchical timeline.
    ///
    /// Word offsets are UTF-32 codepoint indices into `text`.
    async fn align(&self, audio: &[u8], text: &str) -> SnowdayResult<Vec<TimelineNode>>;
}

/// Durable, publicly readable object storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `bytes` at `path`, overwriting any existing object, and return
    /// its public URL.
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> SnowdayResult<String>;
}
