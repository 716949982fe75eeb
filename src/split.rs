//! Bionic word splitting.
//!
//! A word is split into an emphasized prefix and a plain suffix. The prefix
//! length is a step function of the strength, counted in characters (Unicode
//! scalar values), and never separates a combining mark from its base.

use serde::{Deserialize, Serialize};

use crate::analysis::is_combining_mark;
use crate::model::Segment;

/// A word split into an emphasized prefix and a plain suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordSplit {
    pub prefix: String,
    pub suffix: String,
}

impl WordSplit {
    /// Split that emphasizes nothing.
    pub fn unchanged(word: &str) -> Self {
        Self {
            prefix: String::new(),
            suffix: word.to_string(),
        }
    }

    /// Whether the split emphasizes anything.
    pub fn is_emphasized(&self) -> bool {
        !self.prefix.is_empty()
    }

    /// The whole word.
    pub fn word(&self) -> String {
        format!("{}{}", self.prefix, self.suffix)
    }

    /// Prefix length in characters.
    pub fn prefix_chars(&self) -> usize {
        self.prefix.chars().count()
    }
}

/// Strength bands of the split step function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitThresholds {
    /// Up to here a single character is emphasized
    pub minimal: f32,
    /// Up to here 40% of the word
    pub light: f32,
    /// Up to here 60%; above it 70% (at least 2)
    pub strong: f32,
}

impl Default for SplitThresholds {
    fn default() -> Self {
        Self {
            minimal: 0.3,
            light: 0.5,
            strong: 0.7,
        }
    }
}

/// A segment paired with its split, if it is an emphasized word.
pub type PlannedSegment = (Segment, Option<WordSplit>);

/// Computes word splits.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordSplitter {
    thresholds: SplitThresholds,
}

impl WordSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom strength bands.
    pub fn with_thresholds(thresholds: SplitThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &SplitThresholds {
        &self.thresholds
    }

    /// Number of characters to emphasize in a word of `len` characters,
    /// before clamping.
    fn raw_prefix_len(&self, len: usize, strength: f32) -> usize {
        let t = &self.thresholds;
        if strength <= t.minimal {
            usize::from(len >= 3)
        } else if strength <= t.light {
            (len as f32 * 0.4).floor() as usize
        } else if strength <= t.strong {
            (len as f32 * 0.6).floor() as usize
        } else {
            ((len as f32 * 0.7).floor() as usize).max(2)
        }
    }

    /// Split a word at the given strength.
    pub fn split(&self, word: &str, strength: f32) -> WordSplit {
        let chars: Vec<char> = word.chars().collect();
        let len = chars.len();
        if strength <= 0.0 || strength.is_nan() || len <= 1 {
            return WordSplit::unchanged(word);
        }

        let n = self.raw_prefix_len(len, strength).clamp(1, len - 1);
        let Some(n) = cluster_boundary(&chars, n) else {
            return WordSplit::unchanged(word);
        };

        let byte_idx = word
            .char_indices()
            .nth(n)
            .map(|(idx, _)| idx)
            .unwrap_or(word.len());
        WordSplit {
            prefix: word[..byte_idx].to_string(),
            suffix: word[byte_idx..].to_string(),
        }
    }

    /// Pair each segment with its split; only word segments are split.
    pub fn plan(&self, segments: Vec<Segment>, strength: f32) -> Vec<PlannedSegment> {
        segments
            .into_iter()
            .map(|segment| {
                let split = if segment.kind.is_emphasizable() {
                    Some(self.split(&segment.text, strength)).filter(WordSplit::is_emphasized)
                } else {
                    None
                };
                (segment, split)
            })
            .collect()
    }
}

/// Move `n` off combining marks: forward first, backward when the marks
/// run to the end of the word.
fn cluster_boundary(chars: &[char], n: usize) -> Option<usize> {
    let len = chars.len();
    let mut forward = n;
    while forward < len && is_combining_mark(chars[forward]) {
        forward += 1;
    }
    if forward < len {
        return Some(forward);
    }

    let mut backward = n;
    while backward > 0 && is_combining_mark(chars[backward]) {
        backward -= 1;
    }
    (backward >= 1).then_some(backward)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix(word: &str, strength: f32) -> String {
        WordSplitter::new().split(word, strength).prefix
    }

    #[test]
    fn test_standard_strength() {
        assert_eq!(prefix("The", 0.4), "T");
        assert_eq!(prefix("quick", 0.4), "qu");
        assert_eq!(prefix("brown", 0.4), "br");
        assert_eq!(prefix("fox", 0.4), "f");
    }

    #[test]
    fn test_step_bands() {
        assert_eq!(prefix("reading", 0.2), "r");
        assert_eq!(prefix("reading", 0.5), "re");
        assert_eq!(prefix("reading", 0.6), "read");
        assert_eq!(prefix("reading", 0.9), "read");
        assert_eq!(prefix("extraordinary", 0.9), "extraordi");
        assert_eq!(prefix("at", 0.9), "a");
    }

    #[test]
    fn test_no_emphasis() {
        let s = WordSplitter::new();
        assert_eq!(s.split("word", 0.0), WordSplit::unchanged("word"));
        assert_eq!(s.split("a", 0.9), WordSplit::unchanged("a"));
        assert_eq!(s.split("", 0.9), WordSplit::unchanged(""));
    }

    #[test]
    fn test_short_words_lifted_to_one() {
        assert_eq!(prefix("to", 0.2), "t");
        assert_eq!(prefix("to", 0.4), "t");
    }

    #[test]
    fn test_multibyte_characters() {
        let split = WordSplitter::new().split("żółw", 0.6);
        assert_eq!(split.prefix, "żó");
        assert_eq!(split.suffix, "łw");

        let split = WordSplitter::new().split("日本語です", 0.4);
        assert_eq!(split.prefix_chars(), 2);
        assert_eq!(split.word(), "日本語です");
    }

    #[test]
    fn test_combining_marks_stay_with_base() {
        // "cafe" + combining acute: 5 scalars
        let word = "cafe\u{301}";
        let split = WordSplitter::new().split(word, 0.9);
        assert_eq!(split.word(), word);
        assert!(!split.suffix.starts_with('\u{301}'));

        // base + mark only: no valid boundary
        let split = WordSplitter::new().split("e\u{301}", 0.9);
        assert!(!split.is_emphasized());
    }

    #[test]
    fn test_monotone_in_strength() {
        let s = WordSplitter::new();
        for word in ["a", "to", "the", "reading", "extraordinary"] {
            let mut last = 0;
            for step in 0..=20 {
                let n = s.split(word, step as f32 / 20.0).prefix_chars();
                assert!(n >= last, "{word} at {step}");
                last = n;
            }
        }
    }

    #[test]
    fn test_custom_thresholds() {
        let s = WordSplitter::with_thresholds(SplitThresholds {
            minimal: 0.5,
            light: 0.6,
            strong: 0.8,
        });
        assert_eq!(s.split("reading", 0.45).prefix, "r");
    }

    #[test]
    fn test_plan_only_splits_words() {
        let segments = vec![
            Segment::word("hello"),
            Segment::new(" ", crate::model::SegmentKind::Space),
            Segment::new("25kg", crate::model::SegmentKind::Math),
        ];
        let plan = WordSplitter::new().plan(segments, 0.4);
        assert_eq!(plan[0].1.as_ref().map(|s| s.prefix.as_str()), Some("he"));
        assert!(plan[1].1.is_none());
        assert!(plan[2].1.is_none());
    }
}
