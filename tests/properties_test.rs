//! Property tests for segmentation, splitting and rendering.

use bionify::analysis::{ElementClassifier, IntensityManager, MathDetector, Segmenter};
use bionify::render::{render_html, render_markdown, strip_emphasis};
use bionify::{
    ElementContext, OutputFormat, Pipeline, ProcessingConfig, ReadingProfile, WordSplitter,
};
use proptest::prelude::*;

/// Prose-like text with punctuation, digits and markup-significant characters.
fn prose() -> impl Strategy<Value = String> {
    "[A-Za-zéüßж0-9 ,.;:!?'\"&<>*_\\[\\]()\\-\n]{0,80}"
}

fn word() -> impl Strategy<Value = String> {
    "[A-Za-zéüöñжσ]{1,20}"
}

proptest! {
    #[test]
    fn segmentation_is_lossless(text in any::<String>()) {
        let segments = Segmenter::new().segment(&text);
        let joined: String = segments.iter().map(|s| s.text.as_str()).collect();
        prop_assert_eq!(joined, text);
    }

    #[test]
    fn split_keeps_word_and_bounds_prefix(w in word(), strength in 0.01f32..=1.0) {
        let split = WordSplitter::new().split(&w, strength);
        prop_assert_eq!(format!("{}{}", split.prefix, split.suffix), w.clone());

        let len = w.chars().count();
        if len > 1 {
            let n = split.prefix.chars().count();
            prop_assert!(n >= 1 && n <= len - 1, "prefix {} of {}", n, len);
        }
    }

    #[test]
    fn prefix_grows_with_strength(w in word(), a in 0.0f32..=1.0, b in 0.0f32..=1.0) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let splitter = WordSplitter::new();
        let low_len = splitter.split(&w, low).prefix.chars().count();
        let high_len = splitter.split(&w, high).prefix.chars().count();
        prop_assert!(low_len <= high_len);
    }

    #[test]
    fn zero_strength_changes_nothing(text in prose()) {
        let config = ProcessingConfig::new().with_intensity(0.0);
        let plan = Pipeline::new(config.clone()).unwrap().plan_words(&text, 0.0);
        prop_assert!(plan.iter().all(|(_, split)| split.is_none()));

        for format in [OutputFormat::PlainText, OutputFormat::Html, OutputFormat::Markdown] {
            let pipeline = Pipeline::new(config.clone().with_format(format)).unwrap();
            prop_assert_eq!(pipeline.process_text(&text, None).output, text.clone());
        }
    }

    #[test]
    fn markup_strips_back_to_input(text in prose(), strength in 0.0f32..=1.0) {
        let plan = WordSplitter::new().plan(Segmenter::new().segment(&text), strength);
        prop_assert_eq!(strip_emphasis(&render_html(&plan), OutputFormat::Html), text.clone());
        prop_assert_eq!(strip_emphasis(&render_markdown(&plan), OutputFormat::Markdown), text);
    }

    #[test]
    fn classification_is_deterministic(
        text in prose(),
        size in proptest::option::of(6.0f32..40.0),
    ) {
        let classifier = ElementClassifier::new();
        let context = size.map(|s| ElementContext::new().with_font_size(s));
        prop_assert_eq!(
            classifier.classify(&text, context.as_ref()),
            classifier.classify(&text, context.as_ref())
        );
    }

    #[test]
    fn units_and_notation_are_preserved(
        value in 1u32..100_000,
        unit in "(kg|mg|km|cm|mm|ms|Hz|kHz|MB|GB)",
    ) {
        let detector = MathDetector::new();
        let token = format!("{}{}", value, unit);
        prop_assert!(detector.should_preserve(&token));

        let sci = format!("{}.5e{}", value % 10, value % 30);
        prop_assert!(detector.should_preserve(&sci));
    }

    #[test]
    fn notation_tokens_are_never_processed(
        value in 1u32..10_000,
        frac in 0u32..100,
        exp in 1u32..30,
        shape in 0usize..6,
    ) {
        let token = match shape {
            0 => format!("{}%", value),
            1 => format!("{}.{}°C", value, frac),
            2 => format!("{}kg", value),
            3 => format!("{}km/h", value),
            4 => format!("{}.{}e{}", value % 10, frac, exp),
            _ => format!("{}.{}×10⁻{}", value % 10, frac, exp % 10),
        };
        let manager = IntensityManager::new();
        for profile in ReadingProfile::ALL {
            let decision = manager.intensity_for(&token, None, profile);
            prop_assert!(!decision.should_process, "{} under {:?}", token, profile);
        }
    }
}
