//! HTTP forced-alignment client.
//!
//! The alignment service receives base64 audio plus the exact narrated text
//! and answers with a segment/sentence/word timeline whose word nodes carry
//! UTF-32 offsets into that text.

use crate::config::AlignerConfig;
use crate::http::{build_client, ensure_success, transport_error};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use snowday_core::TimelineNode;
use snowday_error::{SnowdayResult, SynthesisError, SynthesisErrorKind};
use snowday_interface::ForcedAligner;
use tracing::{debug, instrument};

/// Body of an alignment request.
#[derive(Debug, Clone, Serialize)]
pub struct AlignRequest {
    /// Base64-encoded audio
    pub audio: String,
    /// Text spoken in the audio
    pub text: String,
    /// Language code
    pub language: String,
}

/// Alignment response: either a bare timeline or an object wrapping one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AlignResponse {
    /// `[...]`
    Bare(Vec<TimelineNode>),
    /// `{"timeline": [...]}`
    Wrapped {
        /// Top-level timeline nodes
        timeline: Vec<TimelineNode>,
    },
}

impl AlignResponse {
    /// The top-level timeline nodes.
    pub fn into_timeline(self) -> Vec<TimelineNode> {
        match self {
            AlignResponse::Bare(timeline) | AlignResponse::Wrapped { timeline } => timeline,
        }
    }
}

/// Forced aligner reached over HTTP at `{base_url}/align`.
#[derive(Debug, Clone)]
pub struct HttpAlignmentClient {
    client: Client,
    config: AlignerConfig,
}

impl HttpAlignmentClient {
    /// Create a client for the configured service.
    pub fn new(config: AlignerConfig) -> SnowdayResult<Self> {
        Ok(Self {
            client: build_client(*config.timeout())?,
            config,
        })
    }
}

#[async_trait]
impl ForcedAligner for HttpAlignmentClient {
    #[instrument(skip(self, audio, text), fields(audio_bytes = audio.len(), language = %self.config.language()))]
    async fn align(&self, audio: &[u8], text: &str) -> SnowdayResult<Vec<TimelineNode>> {
        let body = AlignRequest {
            audio: STANDARD.encode(audio),
            text: text.to_string(),
            language: self.config.language().clone(),
        };
        let url = format!("{}/align", self.config.base_url().trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("aligner", e))?;
        let response = ensure_success("aligner", response).await?;

        let parsed: AlignResponse = response.json().await.map_err(|e| {
            SynthesisError::new(SynthesisErrorKind::Alignment(format!(
                "Failed to parse timeline: {}",
                e
            )))
        })?;
        let timeline = parsed.into_timeline();
        debug!(nodes = timeline.len(), "Received timeline");
        Ok(timeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snowday_core::AlignmentMap;

    const TIMELINE: &str = r#"[{
        "type": "segment", "text": "The cat sat.", "startTime": 0.0, "endTime": 1.0,
        "timeline": [{
            "type": "sentence", "text": "The cat sat.", "startTime": 0.0, "endTime": 1.0,
            "timeline": [
                {"type": "word", "text": "The", "startTime": 0.0, "endTime": 0.2, "startOffsetUtf32": 0, "endOffsetUtf32": 3},
                {"type": "word", "text": "cat", "startTime": 0.3, "endTime": 0.5, "startOffsetUtf32": 4, "endOffsetUtf32": 7},
                {"type": "word", "text": "sat", "startTime": 0.6, "endTime": 0.9, "startOffsetUtf32": 8, "endOffsetUtf32": 11}
            ]
        }]
    }]"#;

    #[test]
    fn test_bare_and_wrapped_responses() {
        let bare: AlignResponse = serde_json::from_str(TIMELINE).unwrap();
        let wrapped: AlignResponse =
            serde_json::from_str(&format!(r#"{{"timeline": {}}}"#, TIMELINE)).unwrap();

        let words = AlignmentMap::from_timeline(&bare.into_timeline());
        assert_eq!(words.len(), 3);
        assert_eq!(AlignmentMap::from_timeline(&wrapped.into_timeline()), words);
    }
}
