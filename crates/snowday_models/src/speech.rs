//! OpenAI text-to-speech client.

use crate::config::OpenAIConfig;
use crate::http::{build_client, ensure_success, transport_error};
use async_trait::async_trait;
use derive_getters::Getters;
use reqwest::Client;
use serde::Serialize;
use snowday_error::{SnowdayResult, SynthesisError, SynthesisErrorKind};
use snowday_interface::SpeechSynthesizer;
use tracing::{debug, instrument};

/// Body of an `audio/speech` request.
#[derive(Debug, Clone, Serialize, Getters)]
pub struct SpeechRequest {
    model: String,
    input: String,
    voice: String,
    response_format: &'static str,
}

impl SpeechRequest {
    /// MP3 speech request.
    pub fn mp3(model: impl Into<String>, voice: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
            voice: voice.into(),
            response_format: "mp3",
        }
    }
}

/// Speech synthesizer backed by the OpenAI `audio/speech` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAISpeechClient {
    client: Client,
    config: OpenAIConfig,
    model: String,
    voice: String,
}

impl OpenAISpeechClient {
    /// Create a client speaking with `voice` through `model` (e.g. `tts-1`).
    pub fn new(config: OpenAIConfig, model: impl Into<String>, voice: impl Into<String>) -> SnowdayResult<Self> {
        Ok(Self {
            client: build_client(*config.timeout())?,
            config,
            model: model.into(),
            voice: voice.into(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAISpeechClient {
    #[instrument(skip(self, text), fields(model = %self.model, voice = %self.voice, chars = text.chars().count()))]
    async fn synthesize(&self, text: &str) -> SnowdayResult<Vec<u8>> {
        let body = SpeechRequest::mp3(&self.model, &self.voice, text);
        let response = self
            .client
            .post(self.config.endpoint("audio/speech"))
            .bearer_auth(self.config.api_key())
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("speech", e))?;
        let response = ensure_success("speech", response).await?;

        let bytes = response.bytes().await.map_err(|e| {
            SynthesisError::new(SynthesisErrorKind::Speech(format!("Failed to read audio: {}", e)))
        })?;
        debug!(bytes = bytes.len(), "Received audio");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_request_body() {
        let body = serde_json::to_value(SpeechRequest::mp3("tts-1", "sage", "The cat sat.")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "tts-1",
                "input": "The cat sat.",
                "voice": "sage",
                "response_format": "mp3"
            })
        );
    }
}
