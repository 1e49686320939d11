//! Narrative frameworks for chapter-by-chapter generation.

use snowday_error::{SnowdayResult, StorylineError, StorylineErrorKind};

const THREE_ACT: &[&str] = &[
    "set up the hero, their world, and the problem that pulls them into the story.",
    "raise the stakes as the hero struggles, fails, and learns what it will really take to win.",
    "bring the hero to a final showdown and show how they have changed once it is resolved.",
];

const HEROS_JOURNEY: &[&str] = &[
    "show the hero in their ordinary world.",
    "deliver a call to adventure that disturbs the ordinary world.",
    "have the hero refuse the call out of fear or doubt.",
    "introduce a mentor who gives advice, training, or a special gift.",
    "have the hero cross the threshold into an unfamiliar world.",
    "test the hero with challenges while they meet allies and enemies.",
    "bring the hero to the edge of the most dangerous place in the new world.",
    "put the hero through a great ordeal where everything seems lost.",
    "reward the hero with the treasure or knowledge they came for.",
    "set the hero on the road back while danger follows them.",
    "face the hero with one last test that shows how much they have grown.",
    "return the hero home, changed, with something to share with everyone.",
];

const STORY_CIRCLE: &[&str] = &[
    "introduce the protagonist in their ordinary world, showing their life, personality, and setting.",
    "show what is missing in their life and set the stakes; reveal a magical creature or item whose use is not yet clear.",
    "force the protagonist to choose to leave their comfort zone and begin the journey.",
    "put obstacles in their way; they fail a first challenge and must unlearn something from home to go on.",
    "let them find what they sought and gain something valuable along with knowledge that brings unexpected consequences.",
    "make them pay a real price that forces them to grow.",
    "bring them home with what they found and a new way of seeing their world that solves old problems.",
    "show how they have changed and resolve the journey with their new wisdom.",
];

const ORDINALS: &[&str] = &[
    "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth", "ninth", "tenth",
    "eleventh", "twelfth",
];

/// An ordered list of chapter goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrativeFramework {
    name: &'static str,
    display_name: &'static str,
    chapters: &'static [&'static str],
}

impl NarrativeFramework {
    /// Three-act structure.
    pub const THREE_ACT: Self = Self {
        name: "three-act",
        display_name: "three-act structure",
        chapters: THREE_ACT,
    };

    /// The hero's journey in twelve stages.
    pub const HEROS_JOURNEY: Self = Self {
        name: "heros-journey",
        display_name: "Hero's Journey",
        chapters: HEROS_JOURNEY,
    };

    /// Dan Harmon's eight-step story circle.
    pub const STORY_CIRCLE: Self = Self {
        name: "story-circle",
        display_name: "Dan Harmon Story Circle",
        chapters: STORY_CIRCLE,
    };

    /// All known frameworks.
    pub const ALL: [Self; 3] = [Self::THREE_ACT, Self::HEROS_JOURNEY, Self::STORY_CIRCLE];

    /// Look up a framework by name.
    pub fn by_name(name: &str) -> SnowdayResult<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.name == name)
            .ok_or_else(|| StorylineError::new(StorylineErrorKind::UnknownFramework(name.to_string())).into())
    }

    /// Framework name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Human-readable name used in prompts.
    pub fn display_name(&self) -> &'static str {
        self.display_name
    }

    /// Number of chapters.
    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    /// Always false; every framework has chapters.
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// Goal of the chapter at `index`, `None` past the end.
    pub fn chapter_goal(&self, index: usize) -> Option<&'static str> {
        self.chapters.get(index).copied()
    }

    /// "first", "second", ... for a 0-based index.
    pub fn ordinal(index: usize) -> String {
        ORDINALS
            .get(index)
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("{}th", index + 1))
    }
}
