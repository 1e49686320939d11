//! Narration synthesis: speech, forced alignment and upload.

use snowday_core::{AlignmentMap, CanonicalText, Narration};
use snowday_error::{SnowdayResult, SynthesisError, SynthesisErrorKind};
use snowday_interface::{ForcedAligner, ObjectStore, SpeechSynthesizer};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Produces narration audio and its word alignment for a paragraph.
#[derive(Clone)]
pub struct NarrationSynthesizer {
    speech: Arc<dyn SpeechSynthesizer>,
    aligner: Arc<dyn ForcedAligner>,
    store: Arc<dyn ObjectStore>,
    path_prefix: String,
}

impl NarrationSynthesizer {
    /// Create a synthesizer writing audio under `path_prefix`.
    pub fn new(
        speech: Arc<dyn SpeechSynthesizer>,
        aligner: Arc<dyn ForcedAligner>,
        store: Arc<dyn ObjectStore>,
        path_prefix: impl Into<String>,
    ) -> Self {
        Self {
            speech,
            aligner,
            store,
            path_prefix: path_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    /// Object path for a paragraph's audio.
    ///
    /// Deterministic, so a rerun overwrites the previous upload.
    pub fn artifact_path(&self, storyline_id: i32, index: usize) -> String {
        format!(
            "{}/story_{}_para_{}.{}",
            self.path_prefix,
            storyline_id,
            index,
            self.speech.extension()
        )
    }

    /// Narrate `text` and upload the audio.
    ///
    /// The same text is sent to speech synthesis and alignment, and the
    /// flattened alignment is checked against it before upload. Any failure
    /// is a single synthesis error and nothing is returned.
    #[instrument(skip(self, text), fields(chars = text.len_utf32()))]
    pub async fn narrate(
        &self,
        text: &CanonicalText,
        storyline_id: i32,
        index: usize,
    ) -> SnowdayResult<Narration> {
        let audio = self
            .speech
            .synthesize(text.as_str())
            .await
            .map_err(|e| SynthesisError::new(SynthesisErrorKind::Speech(e.to_string())))?;
        if audio.is_empty() {
            return Err(SynthesisError::new(SynthesisErrorKind::Speech("no audio returned".to_string())).into());
        }
        debug!(bytes = audio.len(), "Speech synthesized");

        let timeline = self
            .aligner
            .align(&audio, text.as_str())
            .await
            .map_err(|e| SynthesisError::new(SynthesisErrorKind::Alignment(e.to_string())))?;
        let alignment = AlignmentMap::from_timeline(&timeline);
        if alignment.is_empty() && !text.is_empty() {
            return Err(SynthesisError::new(SynthesisErrorKind::Alignment(
                "timeline contains no words".to_string(),
            ))
            .into());
        }
        alignment
            .verify(text)
            .map_err(|e| SynthesisError::new(SynthesisErrorKind::OffsetMismatch(e)))?;

        let path = self.artifact_path(storyline_id, index);
        let url = self
            .store
            .put(&path, audio, self.speech.content_type())
            .await
            .map_err(|e| SynthesisError::new(SynthesisErrorKind::Upload(e.to_string())))?;

        info!(%url, words = alignment.len(), "Narration uploaded");
        Ok(Narration::new(url, alignment))
    }
}
