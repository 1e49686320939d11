//! Forced-alignment timelines and the persisted word alignment.

use crate::CanonicalText;
use serde::{Deserialize, Serialize};

/// One word of narration mapped onto the narrated text.
///
/// Offsets are UTF-32 codepoint indices into the [`CanonicalText`] that was
/// narrated, as a half-open range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordAlignment {
    /// Word as it appears in the text
    pub text: String,
    /// Seconds from the start of the audio
    pub start_time: f64,
    /// Seconds from the start of the audio
    pub end_time: f64,
    /// First codepoint of the word
    pub start_offset_utf32: usize,
    /// One past the last codepoint of the word
    pub end_offset_utf32: usize,
}

/// A container level of the alignment timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSpan {
    /// Text covered by the span
    #[serde(default)]
    pub text: String,
    /// Seconds from the start of the audio
    #[serde(default)]
    pub start_time: f64,
    /// Seconds from the start of the audio
    #[serde(default)]
    pub end_time: f64,
    /// Nested nodes
    #[serde(default)]
    pub timeline: Vec<TimelineNode>,
}

/// Hierarchical timeline returned by the forced aligner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TimelineNode {
    /// Top-level segment
    Segment(TimelineSpan),
    /// Sentence within a segment
    Sentence(TimelineSpan),
    /// A word, the only level that is kept
    Word(WordAlignment),
    /// Levels the pipeline ignores (phones, tokens)
    #[serde(other)]
    Other,
}

/// Ordered word alignment for one narrated paragraph.
///
/// Persisted as a JSON array of [`WordAlignment`] records alongside the
/// story text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlignmentMap(Vec<WordAlignment>);

impl AlignmentMap {
    /// Wrap records that are already flat.
    pub fn new(records: Vec<WordAlignment>) -> Self {
        Self(records)
    }

    /// Flatten a timeline, keeping word nodes in document order.
    pub fn from_timeline(timeline: &[TimelineNode]) -> Self {
        fn walk(nodes: &[TimelineNode], out: &mut Vec<WordAlignment>) {
            for node in nodes {
                match node {
                    TimelineNode::Segment(span) | TimelineNode::Sentence(span) => {
                        walk(&span.timeline, out)
                    }
                    TimelineNode::Word(word) => out.push(word.clone()),
                    TimelineNode::Other => {}
                }
            }
        }

        let mut records = Vec::new();
        walk(timeline, &mut records);
        Self(records)
    }

    /// The records.
    pub fn records(&self) -> &[WordAlignment] {
        &self.0
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no words.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check every record against the narrated text.
    ///
    /// Each record's range must lie within the text, slice exactly its own
    /// `text`, and start no earlier than the previous record ended.
    pub fn verify(&self, narrated: &CanonicalText) -> Result<(), String> {
        let mut previous_end = 0;
        for (i, record) in self.0.iter().enumerate() {
            let (start, end) = (record.start_offset_utf32, record.end_offset_utf32);
            if start < previous_end {
                return Err(format!(
                    "record {} ('{}') starts at {} before previous end {}",
                    i, record.text, start, previous_end
                ));
            }
            match narrated.slice_utf32(start, end) {
                Some(slice) if slice == record.text => {}
                Some(slice) => {
                    return Err(format!(
                        "record {} covers '{}' but claims '{}'",
                        i, slice, record.text
                    ));
                }
                None => {
                    return Err(format!(
                        "record {} range {}..{} is outside text of length {}",
                        i,
                        start,
                        end,
                        narrated.len_utf32()
                    ));
                }
            }
            previous_end = end;
        }
        Ok(())
    }

    /// Serialize for storage.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    /// Read a stored alignment.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strip_markup;

    fn word(text: &str, start: usize, end: usize) -> WordAlignment {
        WordAlignment {
            text: text.to_string(),
            start_time: start as f64 * 0.1,
            end_time: end as f64 * 0.1,
            start_offset_utf32: start,
            end_offset_utf32: end,
        }
    }

    #[test]
    fn test_flatten_keeps_words_in_order() {
        let json = r#"[
          {"type":"segment","text":"The cat sat.","startTime":0,"endTime":1,"timeline":[
            {"type":"sentence","text":"The cat sat.","startTime":0,"endTime":1,"timeline":[
              {"type":"word","text":"The","startTime":0.0,"endTime":0.2,"startOffsetUtf32":0,"endOffsetUtf32":3,
               "timeline":[{"type":"phone","text":"DH","startTime":0.0,"endTime":0.1}]},
              {"type":"word","text":"cat","startTime":0.2,"endTime":0.5,"startOffsetUtf32":4,"endOffsetUtf32":7},
              {"type":"word","text":"sat","startTime":0.5,"endTime":0.9,"startOffsetUtf32":8,"endOffsetUtf32":11}
            ]}
          ]}
        ]"#;
        let timeline: Vec<TimelineNode> = serde_json::from_str(json).unwrap();
        let map = AlignmentMap::from_timeline(&timeline);
        let words: Vec<&str> = map.records().iter().map(|w| w.text.as_str()).collect();
        assert_eq!(words, vec!["The", "cat", "sat"]);
        assert!(map.verify(&strip_markup("The cat sat.")).is_ok());
    }

    #[test]
    fn test_persisted_field_names() {
        let map = AlignmentMap::new(vec![word("cat", 4, 7)]);
        let json = map.to_json().unwrap();
        assert!(json.starts_with('['));
        for field in ["startTime", "endTime", "startOffsetUtf32", "endOffsetUtf32"] {
            assert!(json.contains(field), "missing {}", field);
        }
        assert_eq!(AlignmentMap::from_json(&json).unwrap(), map);
    }

    #[test]
    fn test_verify_rejects_overlap_and_mismatch() {
        let text = strip_markup("The cat sat.");
        let overlapping = AlignmentMap::new(vec![word("The", 0, 3), word("he", 1, 3)]);
        assert!(overlapping.verify(&text).is_err());

        let shifted = AlignmentMap::new(vec![word("cat", 5, 8)]);
        assert!(shifted.verify(&text).unwrap_err().contains("claims 'cat'"));

        let outside = AlignmentMap::new(vec![word("sat.", 8, 13)]);
        assert!(outside.verify(&text).unwrap_err().contains("outside"));
    }
}
