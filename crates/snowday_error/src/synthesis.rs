//! Narration synthesis error types.

/// Which narration step failed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SynthesisErrorKind {
    /// Text-to-speech call failed or produced no audio
    #[display("Speech synthesis failed: {}", _0)]
    Speech(String),
    /// Forced alignment call failed
    #[display("Forced alignment failed: {}", _0)]
    Alignment(String),
    /// Alignment records disagree with the narrated text
    #[display("Alignment offsets do not match narrated text: {}", _0)]
    OffsetMismatch(String),
    /// Audio upload failed
    #[display("Audio upload failed: {}", _0)]
    Upload(String),
}

/// Synthesis error with source location tracking.
///
/// # Examples
///
/// ```
/// use snowday_error::{SynthesisError, SynthesisErrorKind};
///
/// let err = SynthesisError::new(SynthesisErrorKind::Speech("no audio".to_string()));
/// assert!(format!("{}", err).contains("Speech synthesis failed"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Synthesis Error: {} at line {} in {}", kind, line, file)]
pub struct SynthesisError {
    /// The kind of error that occurred
    pub kind: SynthesisErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl SynthesisError {
    /// Create a new SynthesisError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SynthesisErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
