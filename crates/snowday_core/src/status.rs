//! Storyline status lifecycle.

use serde::{Deserialize, Serialize};

/// Generation status of a storyline.
///
/// Stored as lowercase text. Status only moves forward:
/// `pending → completed`, `pending → failed`, and `completed → completed`
/// when a chapter is appended to an already completed storyline.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorylineStatus {
    /// Created, waiting for the pipeline
    Pending,
    /// Content committed
    Completed,
    /// Marked failed by a supervisory layer
    Failed,
}

impl StorylineStatus {
    /// Whether moving from `self` to `next` is allowed.
    ///
    /// # Examples
    ///
    /// ```
    /// use snowday_core::StorylineStatus;
    ///
    /// assert!(StorylineStatus::Pending.can_transition_to(StorylineStatus::Completed));
    /// assert!(!StorylineStatus::Completed.can_transition_to(StorylineStatus::Pending));
    /// ```
    pub fn can_transition_to(self, next: StorylineStatus) -> bool {
        matches!(
            (self, next),
            (StorylineStatus::Pending, StorylineStatus::Completed)
                | (StorylineStatus::Pending, StorylineStatus::Failed)
                | (StorylineStatus::Completed, StorylineStatus::Completed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_text_round_trip() {
        assert_eq!(StorylineStatus::Pending.as_ref(), "pending");
        assert_eq!(
            StorylineStatus::from_str("completed").unwrap(),
            StorylineStatus::Completed
        );
        assert!(StorylineStatus::from_str("GENERATED").is_err());
    }

    #[test]
    fn test_no_backward_transitions() {
        assert!(!StorylineStatus::Failed.can_transition_to(StorylineStatus::Completed));
        assert!(!StorylineStatus::Failed.can_transition_to(StorylineStatus::Pending));
        assert!(!StorylineStatus::Completed.can_transition_to(StorylineStatus::Failed));
        assert!(StorylineStatus::Completed.can_transition_to(StorylineStatus::Completed));
    }
}
