//! Lossless segmentation of raw text into typed segments.

use regex::Regex;

use super::math::MathDetector;
use super::static_regex;
use crate::model::{Segment, SegmentKind};

/// Token pattern in priority order.
///
/// The last three alternatives cover every character class (numbers,
/// whitespace, anything that is neither a letter nor a digit nor
/// whitespace), and letters are always consumed by the word alternative,
/// so every character of the input belongs to exactly one match.
const TOKEN_PATTERN: &str = concat!(
    // letters=alphanumeric
    r"\p{L}+=[\p{L}0-9²³⁴⁵⁶⁷⁸⁹⁰¹±]+",
    // scientific notation
    r"|\d+\.?\d*[eE][+-]?\d+",
    r"|\d+\.?\d*×10[⁻⁺]?[0-9⁰¹²³⁴⁵⁶⁷⁸⁹]+",
    // number with unit, percentage or degree
    r"|\d+\.?\d*(?:\p{L}+(?:/\p{L}+)?|%|°[CFK]?)",
    // function(args)
    r"|\p{L}+\([^)\n]*\)",
    // identifiers mixing letters and digits
    r"|\p{L}+\d[\p{L}\d]*",
    // words
    r"|\p{L}[\p{L}\p{M}]*",
    // numbers
    r"|\d+(?:[.,]\d+)*",
    // whitespace
    r"|\s+",
    // everything else
    r"|[^\p{L}\d\s]+",
);

/// Splits text into word, math, number, space and punctuation segments.
#[derive(Debug, Clone)]
pub struct Segmenter {
    token: Regex,
    number: Regex,
    detector: MathDetector,
}

impl Segmenter {
    /// Create a segmenter with its own math detector.
    pub fn new() -> Self {
        Self::with_detector(MathDetector::new())
    }

    /// Create a segmenter using the given detector.
    pub fn with_detector(detector: MathDetector) -> Self {
        Self {
            token: static_regex(TOKEN_PATTERN),
            number: static_regex(r"^\d+(?:[.,]\d+)*$"),
            detector,
        }
    }

    /// The math detector used to tag segments.
    pub fn detector(&self) -> &MathDetector {
        &self.detector
    }

    /// Segment text. Concatenating the result reproduces `text` exactly.
    pub fn segment(&self, text: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut cursor = 0;

        for m in self.token.find_iter(text) {
            if m.start() > cursor {
                // Unreachable with TOKEN_PATTERN, kept so the partition
                // stays lossless if the pattern changes.
                segments.push(Segment::new(
                    &text[cursor..m.start()],
                    SegmentKind::Punctuation,
                ));
            }
            segments.push(Segment::new(m.as_str(), self.kind_of(m.as_str())));
            cursor = m.end();
        }
        if cursor < text.len() {
            segments.push(Segment::new(&text[cursor..], SegmentKind::Punctuation));
        }

        segments
    }

    /// Number of word segments in text.
    pub fn word_count(&self, text: &str) -> usize {
        self.segment(text).iter().filter(|s| s.is_word()).count()
    }

    fn kind_of(&self, token: &str) -> SegmentKind {
        if token.chars().all(char::is_whitespace) {
            SegmentKind::Space
        } else if self.detector.should_preserve(token) {
            SegmentKind::Math
        } else if is_letters_only(token) {
            SegmentKind::Word
        } else if self.number.is_match(token) {
            SegmentKind::Number
        } else {
            SegmentKind::Punctuation
        }
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Letters, optionally followed by combining marks.
pub fn is_letters_only(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphabetic() || is_combining_mark(c))
}

/// Unicode combining marks.
pub fn is_combining_mark(c: char) -> bool {
    unicode_normalization::char::is_combining_mark(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::join_segments;

    fn kinds(text: &str) -> Vec<(String, SegmentKind)> {
        Segmenter::new()
            .segment(text)
            .into_iter()
            .map(|s| (s.text, s.kind))
            .collect()
    }

    #[test]
    fn test_simple_sentence() {
        let segs = kinds("The quick fox.");
        assert_eq!(
            segs,
            vec![
                ("The".to_string(), SegmentKind::Word),
                (" ".to_string(), SegmentKind::Space),
                ("quick".to_string(), SegmentKind::Word),
                (" ".to_string(), SegmentKind::Space),
                ("fox".to_string(), SegmentKind::Word),
                (".".to_string(), SegmentKind::Punctuation),
            ]
        );
    }

    #[test]
    fn test_math_tokens() {
        let segs = kinds("E=mc2 weighs 25kg at 1.5e10 and sin(x)");
        let math: Vec<_> = segs
            .iter()
            .filter(|(_, k)| *k == SegmentKind::Math)
            .map(|(t, _)| t.as_str())
            .collect();
        assert_eq!(math, vec!["E=mc2", "25kg", "1.5e10", "sin(x)"]);
    }

    #[test]
    fn test_numbers_and_units() {
        let segs = kinds("Pay 42 or 3.14 with 45% off");
        assert!(segs.contains(&("42".to_string(), SegmentKind::Number)));
        assert!(segs.contains(&("3.14".to_string(), SegmentKind::Number)));
        assert!(segs.contains(&("45%".to_string(), SegmentKind::Math)));
    }

    #[test]
    fn test_unicode_words() {
        let segs = kinds("naïve café");
        assert_eq!(segs[0], ("naïve".to_string(), SegmentKind::Word));
        assert_eq!(segs[2], ("café".to_string(), SegmentKind::Word));

        // decomposed e + combining acute stays in one word
        let segs = kinds("cafe\u{301}s");
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].1, SegmentKind::Word);
    }

    #[test]
    fn test_identifiers_are_not_words() {
        let segs = kinds("mp3 snake_case");
        assert_eq!(segs[0], ("mp3".to_string(), SegmentKind::Punctuation));
        assert_eq!(segs[2], ("snake".to_string(), SegmentKind::Word));
        assert_eq!(segs[3], ("_".to_string(), SegmentKind::Punctuation));
        assert_eq!(segs[4], ("case".to_string(), SegmentKind::Word));
    }

    #[test]
    fn test_lossless_on_awkward_input() {
        let seg = Segmenter::new();
        for text in [
            "",
            "   ",
            "\u{301}leading mark",
            "tabs\tand\r\nnewlines",
            "emoji 🎉 and CJK 漢字",
            "a)b(c",
            "x = (y + 2) * 3;",
            "__init__",
        ] {
            assert_eq!(join_segments(&seg.segment(text)), text);
        }
    }

    #[test]
    fn test_word_count() {
        let seg = Segmenter::new();
        assert_eq!(seg.word_count("The quick brown fox"), 4);
        assert_eq!(seg.word_count("25kg E=mc2"), 0);
    }
}
