//! Output quality scoring.

use crate::render::{markup_balanced, OutputFormat, RenderedUnit};

/// Score for output identical to its input.
pub const UNCHANGED_SCORE: f32 = 0.5;
/// Score for output whose readable length drifted too far.
pub const LENGTH_MISMATCH_SCORE: f32 = 0.3;
/// Score for output with unpaired emphasis markup.
pub const UNBALANCED_SCORE: f32 = 0.4;

/// Score a rendered unit against its input, in `[0, 1]`.
///
/// The length ratio is taken on the readable content, so markup added by
/// HTML or Markdown does not count against the output.
pub fn quality_score(
    input: &str,
    rendered: &RenderedUnit,
    format: OutputFormat,
    confidence: f32,
) -> f32 {
    if rendered.output == input {
        return UNCHANGED_SCORE;
    }

    let ratio = length_ratio(input, &rendered.content);
    if !(0.8..=1.5).contains(&ratio) {
        return LENGTH_MISMATCH_SCORE;
    }
    if !markup_balanced(&rendered.output, format) {
        return UNBALANCED_SCORE;
    }

    let mut score = 0.3 + 0.6 * confidence.clamp(0.0, 1.0);
    if (0.9..=1.2).contains(&ratio) {
        score += 0.1;
    }
    score.min(1.0)
}

fn length_ratio(input: &str, content: &str) -> f32 {
    let input_len = input.chars().count();
    if input_len == 0 {
        return 1.0;
    }
    content.chars().count() as f32 / input_len as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(output: &str, content: &str) -> RenderedUnit {
        RenderedUnit {
            output: output.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_unchanged_output() {
        let score = quality_score("abc", &unit("abc", "abc"), OutputFormat::PlainText, 0.9);
        assert_eq!(score, UNCHANGED_SCORE);
    }

    #[test]
    fn test_good_output() {
        let score = quality_score(
            "The fox",
            &unit("<strong>T</strong>he <strong>f</strong>ox", "The fox"),
            OutputFormat::Html,
            0.8,
        );
        assert!((score - 0.88).abs() < 1e-6);
    }

    #[test]
    fn test_length_mismatch() {
        let score = quality_score("The fox", &unit("T", "T"), OutputFormat::PlainText, 0.8);
        assert_eq!(score, LENGTH_MISMATCH_SCORE);
    }

    #[test]
    fn test_unbalanced_markup() {
        let score = quality_score(
            "The fox",
            &unit("<strong>The fox", "The fox"),
            OutputFormat::Html,
            0.8,
        );
        assert_eq!(score, UNBALANCED_SCORE);
    }

    #[test]
    fn test_capped_at_one() {
        let score = quality_score("ab", &unit("Ab", "Ab"), OutputFormat::PlainText, 1.0);
        assert_eq!(score, 1.0);
    }
}
