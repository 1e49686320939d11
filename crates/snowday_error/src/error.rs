//! Crate-level error aggregation.

use crate::{
    ConfigError, DatabaseError, GenerationError, HttpError, StorageError, StorylineError,
    SynthesisError,
};

/// Crate-level error variants.
#[derive(Debug, derive_more::From)]
pub enum SnowdayErrorKind {
    /// HTTP error
    Http(HttpError),
    /// Configuration error
    Config(ConfigError),
    /// Database / persistence error
    Database(DatabaseError),
    /// Object storage error
    Storage(StorageError),
    /// Text generation error
    Generation(GenerationError),
    /// Narration synthesis error
    Synthesis(SynthesisError),
    /// Storyline lookup error
    Storyline(StorylineError),
    /// Failure inside one paragraph's pipeline
    Paragraph(ParagraphError),
}

impl std::fmt::Display for SnowdayErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnowdayErrorKind::Http(e) => write!(f, "{}", e),
            SnowdayErrorKind::Config(e) => write!(f, "{}", e),
            SnowdayErrorKind::Database(e) => write!(f, "{}", e),
            SnowdayErrorKind::Storage(e) => write!(f, "{}", e),
            SnowdayErrorKind::Generation(e) => write!(f, "{}", e),
            SnowdayErrorKind::Synthesis(e) => write!(f, "{}", e),
            SnowdayErrorKind::Storyline(e) => write!(f, "{}", e),
            SnowdayErrorKind::Paragraph(e) => write!(f, "{}", e),
        }
    }
}

/// An error raised while processing one paragraph, tagged with where it happened.
///
/// The wrapped error stays reachable through [`std::error::Error::source`].
#[derive(Debug)]
pub struct ParagraphError {
    /// Paragraph index within the storyline (0-based)
    pub index: usize,
    /// Pipeline stage, e.g. `"validation"` or `"question:whale"`
    pub stage: String,
    /// The underlying failure
    pub source: Box<SnowdayError>,
}

impl std::fmt::Display for ParagraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Paragraph {} failed during {}: {}",
            self.index, self.stage, self.source
        )
    }
}

impl std::error::Error for ParagraphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Snowday error with kind discrimination.
#[derive(Debug)]
pub struct SnowdayError(Box<SnowdayErrorKind>);

impl SnowdayError {
    /// Create a new error from a kind.
    pub fn new(kind: SnowdayErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &SnowdayErrorKind {
        &self.0
    }

    /// Wrap this error with the paragraph index and stage it came from.
    ///
    /// # Examples
    ///
    /// ```
    /// use snowday_error::{ConfigError, SnowdayError, SnowdayErrorKind};
    ///
    /// let err: SnowdayError = ConfigError::new("missing voice").into();
    /// let wrapped = err.in_paragraph(2, "narration");
    /// assert!(matches!(wrapped.kind(), SnowdayErrorKind::Paragraph(p) if p.index == 2));
    /// ```
    pub fn in_paragraph(self, index: usize, stage: impl Into<String>) -> Self {
        ParagraphError {
            index,
            stage: stage.into(),
            source: Box::new(self),
        }
        .into()
    }

    /// Whether a bounded local retry may resolve this failure.
    pub fn is_retryable(&self) -> bool {
        match self.kind() {
            SnowdayErrorKind::Http(e) => e.is_retryable(),
            SnowdayErrorKind::Generation(e) => e.kind.is_retryable(),
            _ => false,
        }
    }

    /// The innermost error, looking through paragraph wrappers.
    pub fn root(&self) -> &SnowdayError {
        match self.kind() {
            SnowdayErrorKind::Paragraph(p) => p.source.root(),
            _ => self,
        }
    }
}

impl std::fmt::Display for SnowdayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Snowday Error: {}", self.0)
    }
}

impl std::error::Error for SnowdayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind() {
            SnowdayErrorKind::Paragraph(p) => Some(p),
            _ => None,
        }
    }
}

// Generic From implementation for any type that converts to SnowdayErrorKind
impl<T> From<T> for SnowdayError
where
    T: Into<SnowdayErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Snowday operations.
pub type SnowdayResult<T> = std::result::Result<T, SnowdayError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GenerationErrorKind, SynthesisErrorKind};
    use std::error::Error;

    #[test]
    fn test_paragraph_wrapper_keeps_causal_chain() {
        let inner: SnowdayError =
            SynthesisError::new(SynthesisErrorKind::Upload("bucket offline".into())).into();
        let wrapped = inner.in_paragraph(3, "narration");

        let source = wrapped.source().expect("paragraph error is a source");
        assert!(source.to_string().contains("Paragraph 3"));
        let root = source.source().expect("synthesis error below paragraph");
        assert!(root.to_string().contains("bucket offline"));
        assert!(matches!(
            wrapped.root().kind(),
            SnowdayErrorKind::Synthesis(_)
        ));
    }

    #[test]
    fn test_retryable_classification() {
        let empty: SnowdayError =
            GenerationError::new(GenerationErrorKind::Empty("draft".into())).into();
        assert!(empty.is_retryable());

        let exhausted: SnowdayError = GenerationError::new(GenerationErrorKind::ValidationExhausted {
            missing: vec!["cat".into()],
        })
        .into();
        assert!(!exhausted.is_retryable());

        let unauthorized: SnowdayError = HttpError::with_status(401, "bad key").into();
        assert!(!unauthorized.is_retryable());

        let throttled: SnowdayError = HttpError::with_status(429, "slow down").into();
        assert!(throttled.is_retryable());
    }
}
