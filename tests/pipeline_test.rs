//! Integration tests for the text pipeline.

use bionify::analysis::MathDetector;
use bionify::render::strip_emphasis;
use bionify::{
    bionify_text, ElementRole, OutputFormat, Pipeline, ProcessingConfig, ReadingProfile,
    SegmentKind, Segmenter, WordSplitter,
};

fn standard(format: OutputFormat) -> Pipeline {
    Pipeline::new(
        ProcessingConfig::new()
            .with_profile(ReadingProfile::Standard)
            .with_format(format),
    )
    .unwrap()
}

// ==================== Scenarios ====================

#[test]
fn test_quick_brown_fox_standard_profile() {
    let pipeline = standard(OutputFormat::Markdown);
    let result = pipeline.process_text("The quick brown fox", None);

    assert!(result.success);
    assert_eq!(result.metadata.role, Some(ElementRole::Paragraph));
    assert!((result.metadata.intensity_used - 0.4).abs() < 1e-6);

    let plan = pipeline.plan_words("The quick brown fox", 0.4);
    let mut rebuilt = String::new();
    for (segment, split) in &plan {
        if segment.kind == SegmentKind::Word && segment.text.chars().count() >= 2 {
            let split = split.as_ref().unwrap();
            assert!(!split.prefix.is_empty());
            assert!(!split.suffix.is_empty());
        }
        rebuilt.push_str(&segment.text);
    }
    assert_eq!(rebuilt, "The quick brown fox");
    assert_eq!(plan[0].1.as_ref().unwrap().prefix, "T");

    assert_eq!(result.output, "**T**he **qu**ick **br**own **f**ox");
    assert_eq!(
        strip_emphasis(&result.output, OutputFormat::Markdown),
        "The quick brown fox"
    );
}

#[test]
fn test_equation_is_untouched() {
    for format in OutputFormat::ALL {
        let result = standard(format).process_text("E=mc2", None);
        assert!(result.success);
        assert_eq!(result.output, "E=mc2");
        let decision = result.decision.unwrap();
        assert!(!decision.should_process);
    }
    let segments = Segmenter::new().segment("E=mc2");
    assert!(segments.iter().all(|s| s.kind == SegmentKind::Math));
}

#[test]
fn test_unit_with_number_is_untouched() {
    assert!(MathDetector::new().is_unit_with_number("25kg"));
    let result = standard(OutputFormat::Html).process_text("25kg", None);
    assert!(result.success);
    assert_eq!(result.output, "25kg");
}

#[test]
fn test_batch_isolates_failed_unit() {
    let pipeline = standard(OutputFormat::PlainText);
    let texts: Vec<String> = vec![
        "first text body".to_string(),
        "second text body".to_string(),
        "third\0text body".to_string(),
        "fourth text body".to_string(),
        "fifth text body".to_string(),
    ];

    let results = pipeline.process_batch(&texts);
    assert_eq!(results.len(), 5);

    let failed = &results[2];
    assert!(!failed.success);
    assert_eq!(failed.output, "third\0text body");
    assert!(failed.failed_in("analysis"));

    for (i, result) in results.iter().enumerate().filter(|(i, _)| *i != 2) {
        assert!(result.success, "result {} failed", i);
        assert_eq!(
            result.output.to_lowercase(),
            texts[i].to_lowercase(),
            "result {} out of order",
            i
        );
    }

    let snapshot = pipeline.stats().snapshot();
    assert_eq!(snapshot.failed, 1);
}

// ==================== Documents ====================

#[test]
fn test_mixed_document_keeps_technical_content() {
    let text = "Results\n\nThe sample weighed 25kg after drying.\n\nE=mc2";
    let config = ProcessingConfig::new()
        .with_profile(ReadingProfile::Standard)
        .with_format(OutputFormat::PlainText);

    let output = bionify_text(text, &config).unwrap();
    assert!(output.contains(" 25kg "));
    assert!(output.ends_with("E=mc2"));
    assert_ne!(output, text);
    assert_eq!(output.to_lowercase(), text.to_lowercase());
}

#[test]
fn test_zero_intensity_is_identity() {
    let text = "Nothing here should change at all";
    for format in [OutputFormat::PlainText, OutputFormat::Markdown, OutputFormat::Html] {
        let config = ProcessingConfig::new().with_intensity(0.0).with_format(format);
        let pipeline = Pipeline::new(config).unwrap();
        assert_eq!(pipeline.process_text(text, None).output, text);
    }
}

#[test]
fn test_parallel_document_matches_sequential() {
    let text = (0..8)
        .map(|i| format!("Paragraph {} explains something useful", i))
        .collect::<Vec<_>>()
        .join("\n\n");

    let sequential = ProcessingConfig::new().with_format(OutputFormat::Html);
    let parallel = sequential.clone().with_parallel(4);

    assert_eq!(
        bionify_text(&text, &sequential).unwrap(),
        bionify_text(&text, &parallel).unwrap()
    );
}

#[test]
fn test_splitter_is_shared_with_pipeline() {
    let pipeline = standard(OutputFormat::PlainText);
    let split = pipeline.splitter().split("reading", 0.4);
    assert_eq!(split, WordSplitter::new().split("reading", 0.4));
}
