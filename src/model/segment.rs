//! Typed text segments produced by the pattern segmenter.

use serde::{Deserialize, Serialize};

/// Kind of a text segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// Letters only; the only kind eligible for emphasis
    Word,
    /// Math, unit or scientific-notation token kept verbatim
    Math,
    /// Plain number
    Number,
    /// Whitespace run
    Space,
    /// Anything else, kept verbatim
    Punctuation,
}

impl SegmentKind {
    /// Whether segments of this kind may receive emphasis.
    pub fn is_emphasizable(&self) -> bool {
        matches!(self, SegmentKind::Word)
    }
}

/// A run of text with its segment kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Segment text, exactly as it appears in the input
    pub text: String,
    /// Segment kind
    pub kind: SegmentKind,
}

impl Segment {
    /// Create a new segment.
    pub fn new(text: impl Into<String>, kind: SegmentKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    /// Create a word segment.
    pub fn word(text: impl Into<String>) -> Self {
        Self::new(text, SegmentKind::Word)
    }

    /// Check if this is a word segment.
    pub fn is_word(&self) -> bool {
        self.kind == SegmentKind::Word
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Concatenate segment texts back into a string.
pub fn join_segments(segments: &[Segment]) -> String {
    segments.iter().map(|s| s.text.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_constructors() {
        let seg = Segment::word("hello");
        assert!(seg.is_word());
        assert!(seg.kind.is_emphasizable());
        assert_eq!(seg.char_len(), 5);

        let seg = Segment::new("25kg", SegmentKind::Math);
        assert!(!seg.is_word());
        assert!(!seg.kind.is_emphasizable());
    }

    #[test]
    fn test_join_segments() {
        let segments = vec![
            Segment::word("Hi"),
            Segment::new(" ", SegmentKind::Space),
            Segment::new("42", SegmentKind::Number),
            Segment::new("!", SegmentKind::Punctuation),
        ];
        assert_eq!(join_segments(&segments), "Hi 42!");
    }

    #[test]
    fn test_segment_kind_serde() {
        let json = serde_json::to_string(&SegmentKind::Punctuation).unwrap();
        assert_eq!(json, "\"punctuation\"");
    }
}
