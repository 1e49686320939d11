//! Text generation error types.

/// Failures of a generation call or of the constraints placed on its output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum GenerationErrorKind {
    /// The service answered with no usable content
    #[display("Generation returned empty content ({})", _0)]
    Empty(String),
    /// Structural validation of a generated payload failed
    #[display("Malformed generation response: {}", _0)]
    MalformedResponse(String),
    /// A bounded retry loop ran out of attempts
    #[display("Retry budget exhausted after {} attempts for {}: {}", attempts, operation, last_error)]
    RetryBudgetExhausted {
        /// What was being retried
        operation: String,
        /// Number of attempts made
        attempts: usize,
        /// Message of the final failure
        last_error: String,
    },
    /// Required words still missing after every rewrite round
    #[display("Required words still missing after rewrites: {:?}", missing)]
    ValidationExhausted {
        /// Words that never made it into the paragraph
        missing: Vec<String>,
    },
}

impl GenerationErrorKind {
    /// Empty and malformed responses are worth asking for again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationErrorKind::Empty(_) | GenerationErrorKind::MalformedResponse(_)
        )
    }
}

/// Generation error with source location tracking.
///
/// # Examples
///
/// ```
/// use snowday_error::{GenerationError, GenerationErrorKind};
///
/// let err = GenerationError::new(GenerationErrorKind::ValidationExhausted {
///     missing: vec!["whale".to_string()],
/// });
/// assert!(format!("{}", err).contains("whale"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generation Error: {} at line {} in {}", kind, line, file)]
pub struct GenerationError {
    /// The kind of error that occurred
    pub kind: GenerationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl GenerationError {
    /// Create a new GenerationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GenerationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
