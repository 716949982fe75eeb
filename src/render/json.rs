//! JSON rendering of emphasized units.

use serde::{Deserialize, Serialize};

use super::text::upper_prefix;
use super::JsonFormat;
use crate::error::{Error, Result};
use crate::split::PlannedSegment;

/// One emphasized word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordJson {
    pub original: String,
    pub prefix: String,
    pub suffix: String,
    pub strength: f32,
    /// Index among the emphasized words of the unit
    pub position: usize,
}

/// JSON shape of a rendered unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitJson {
    pub original_text: String,
    /// Plain-text rendering with upper-cased prefixes
    pub bionic_text: String,
    pub words: Vec<WordJson>,
    /// Number of word segments, emphasized or not
    pub word_count: usize,
    pub intensity: f32,
    pub processed: bool,
}

impl UnitJson {
    /// Build the JSON shape for a planned unit.
    pub fn from_plan(text: &str, plan: &[PlannedSegment], strength: f32) -> Self {
        let mut words = Vec::new();
        let mut bionic_text = String::with_capacity(text.len());
        let mut word_count = 0;

        for (segment, split) in plan {
            if segment.is_word() {
                word_count += 1;
            }
            match split {
                Some(split) => {
                    bionic_text.push_str(&upper_prefix(&split.prefix));
                    bionic_text.push_str(&split.suffix);
                    words.push(WordJson {
                        original: segment.text.clone(),
                        prefix: split.prefix.clone(),
                        suffix: split.suffix.clone(),
                        strength,
                        position: words.len(),
                    });
                }
                None => bionic_text.push_str(&segment.text),
            }
        }

        Self {
            original_text: text.to_string(),
            bionic_text,
            processed: !words.is_empty(),
            words,
            word_count,
            intensity: strength,
        }
    }

    /// Wrap text that was produced in another format.
    pub fn wrap(original: &str, output: &str) -> Self {
        Self {
            original_text: original.to_string(),
            bionic_text: output.to_string(),
            words: Vec::new(),
            word_count: 0,
            intensity: 0.0,
            processed: original != output,
        }
    }
}

/// Serialize a value with the requested layout.
pub fn to_json<T: Serialize>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Render a planned unit as compact JSON.
pub fn render_json(text: &str, plan: &[PlannedSegment], strength: f32) -> Result<String> {
    to_json(&UnitJson::from_plan(text, plan, strength), JsonFormat::Compact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Segmenter;
    use crate::split::WordSplitter;

    fn plan(text: &str, strength: f32) -> Vec<PlannedSegment> {
        WordSplitter::new().plan(Segmenter::new().segment(text), strength)
    }

    #[test]
    fn test_unit_json_shape() {
        let text = "The quick fox";
        let json = render_json(text, &plan(text, 0.4), 0.4).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["original_text"], "The quick fox");
        assert_eq!(value["bionic_text"], "The QUick Fox");
        assert_eq!(value["word_count"], 3);
        assert_eq!(value["processed"], true);
        assert_eq!(value["words"][1]["prefix"], "qu");
        assert_eq!(value["words"][1]["position"], 1);
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_unprocessed_unit() {
        let json = render_json("25kg", &plan("25kg", 0.4), 0.4).unwrap();
        let unit: UnitJson = serde_json::from_str(&json).unwrap();
        assert!(!unit.processed);
        assert_eq!(unit.bionic_text, "25kg");
        assert_eq!(unit.word_count, 0);
    }

    #[test]
    fn test_to_json_pretty() {
        let unit = UnitJson::wrap("a", "A");
        let json = to_json(&unit, JsonFormat::Pretty).unwrap();
        assert!(json.contains('\n'));
    }
}
