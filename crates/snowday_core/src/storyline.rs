//! Storyline records and the versioned request snapshot.

use crate::StorylineStatus;
use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use snowday_error::{SnowdayResult, StorylineError, StorylineErrorKind};

/// Current version of the request snapshot format.
pub const REQUEST_VERSION: u32 = 1;

/// Parameters a storyline was requested with.
///
/// Persisted as JSON in `storyline.original_request`. Documents carry a
/// `version` field; documents written before versioning have none and are
/// read as version 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, Builder)]
#[builder(setter(into))]
pub struct StorylineRequest {
    /// Words the story must contain
    #[serde(default, deserialize_with = "null_as_default")]
    #[builder(default)]
    words: Vec<String>,
    /// Genre such as "adventure"
    #[serde(default, deserialize_with = "null_as_default")]
    #[builder(default)]
    genre: String,
    /// Where the story takes place
    #[serde(default, deserialize_with = "null_as_default")]
    #[builder(default)]
    location: String,
    /// Writing style
    #[serde(default, deserialize_with = "null_as_default")]
    #[builder(default)]
    style: String,
    /// Student interests to weave in
    #[serde(default, deserialize_with = "null_as_default")]
    #[builder(default)]
    selected_interests: Vec<String>,
    /// Companion character
    #[serde(default, deserialize_with = "null_as_default")]
    #[builder(default)]
    friend: String,
    /// Vocabulary list the words were drawn from
    #[serde(default)]
    #[builder(default)]
    vocab_id: i32,
    /// Student the story is for
    #[serde(default)]
    #[builder(default)]
    student_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    student_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    student_age: Option<u32>,
}

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Serialize)]
struct Envelope<'a> {
    version: u32,
    #[serde(flatten)]
    request: &'a StorylineRequest,
}

impl StorylineRequest {
    /// Create a builder.
    pub fn builder() -> StorylineRequestBuilder {
        StorylineRequestBuilder::default()
    }

    /// Parse a persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorylineErrorKind::InvalidRequest` when the document is not
    /// valid JSON, is not an object, or carries an unsupported version.
    pub fn from_snapshot(snapshot: &str) -> SnowdayResult<Self> {
        let value: serde_json::Value = serde_json::from_str(snapshot).map_err(|e| {
            StorylineError::new(StorylineErrorKind::InvalidRequest(e.to_string()))
        })?;

        let version = match value.get("version") {
            None | Some(serde_json::Value::Null) => REQUEST_VERSION as u64,
            Some(v) => v.as_u64().ok_or_else(|| {
                StorylineError::new(StorylineErrorKind::InvalidRequest(format!(
                    "version must be an integer, got {}",
                    v
                )))
            })?,
        };

        if version != REQUEST_VERSION as u64 {
            return Err(StorylineError::new(StorylineErrorKind::InvalidRequest(format!(
                "unsupported request version {}",
                version
            )))
            .into());
        }

        let request: StorylineRequest = serde_json::from_value(value).map_err(|e| {
            StorylineError::new(StorylineErrorKind::InvalidRequest(e.to_string()))
        })?;
        Ok(request)
    }

    /// Serialize as a version 1 snapshot.
    pub fn to_snapshot(&self) -> SnowdayResult<String> {
        serde_json::to_string(&Envelope {
            version: REQUEST_VERSION,
            request: self,
        })
        .map_err(|e| StorylineError::new(StorylineErrorKind::InvalidRequest(e.to_string())).into())
    }

    /// Required words, trimmed, with blanks removed.
    pub fn required_words(&self) -> Vec<String> {
        self.words
            .iter()
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .collect()
    }
}

/// A storyline row as seen by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct StorylineRecord {
    id: i32,
    status: StorylineStatus,
    original_request: Option<String>,
}

impl StorylineRecord {
    /// Create a record.
    pub fn new(id: i32, status: StorylineStatus, original_request: Option<String>) -> Self {
        Self {
            id,
            status,
            original_request,
        }
    }

    /// Parse the stored request snapshot.
    pub fn request(&self) -> SnowdayResult<StorylineRequest> {
        match &self.original_request {
            Some(snapshot) => StorylineRequest::from_snapshot(snapshot),
            None => Err(StorylineError::new(StorylineErrorKind::InvalidRequest(format!(
                "storyline {} has no request snapshot",
                self.id
            )))
            .into()),
        }
    }
}
