//! Storyline lookup and request errors.

/// Problems with the storyline a pipeline run was asked to process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum StorylineErrorKind {
    /// No storyline with this id
    #[display("Storyline {} not found", _0)]
    NotFound(i32),
    /// Storyline was already processed
    #[display("Storyline {} has status '{}', expected 'pending'", id, status)]
    NotPending {
        /// Storyline id
        id: i32,
        /// Status found in the store
        status: String,
    },
    /// The stored request snapshot could not be read
    #[display("Invalid request snapshot: {}", _0)]
    InvalidRequest(String),
    /// Unknown chapter framework name
    #[display("Unknown narrative framework '{}'", _0)]
    UnknownFramework(String),
}

/// Storyline error with source location tracking.
///
/// # Examples
///
/// ```
/// use snowday_error::{StorylineError, StorylineErrorKind};
///
/// let err = StorylineError::new(StorylineErrorKind::NotFound(42));
/// assert!(format!("{}", err).contains("42"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storyline Error: {} at line {} in {}", kind, line, file)]
pub struct StorylineError {
    /// The kind of error that occurred
    pub kind: StorylineErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorylineError {
    /// Create a new StorylineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorylineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
