//! Structural role classification for text units.
//!
//! Classification is a fixed-priority decision list. When text matches
//! several patterns the earliest rule wins, so the same `(text, context)`
//! pair always yields the same role.

use regex::Regex;

use super::math::MathDetector;
use super::static_regex;
use crate::model::{ElementContext, ElementRole};

/// Thresholds used by the classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierConfig {
    /// Font size above which text is a heading
    pub large_text_threshold: f32,
    /// Font size above which bold text is a heading
    pub bold_heading_threshold: f32,
    /// Longest line accepted by the shape-based heading rules
    pub max_heading_chars: usize,
    /// Longest text accepted as a table cell
    pub max_table_cell_chars: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            large_text_threshold: 16.0,
            bold_heading_threshold: 14.0,
            max_heading_chars: 120,
            max_table_cell_chars: 50,
        }
    }
}

impl ClassifierConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the large-text heading threshold.
    pub fn with_large_text_threshold(mut self, size: f32) -> Self {
        self.large_text_threshold = size;
        self
    }

    /// Set the bold heading threshold.
    pub fn with_bold_heading_threshold(mut self, size: f32) -> Self {
        self.bold_heading_threshold = size;
        self
    }
}

/// Assigns an [`ElementRole`] to a text unit.
#[derive(Debug, Clone)]
pub struct ElementClassifier {
    config: ClassifierConfig,
    detector: MathDetector,
    heading: Vec<Regex>,
    list: Vec<Regex>,
    quote: Vec<Regex>,
    technical: Vec<Regex>,
    math: Vec<Regex>,
    code: Vec<Regex>,
    caption: Regex,
}

impl ElementClassifier {
    /// Create a classifier with default thresholds.
    pub fn new() -> Self {
        Self::with_config(ClassifierConfig::default())
    }

    /// Create a classifier with custom thresholds.
    pub fn with_config(config: ClassifierConfig) -> Self {
        Self {
            config,
            detector: MathDetector::new(),
            heading: vec![
                static_regex(r"^[A-Z][A-Z\s]+$"),
                static_regex(r"^\d+(?:\.\d+)*\.?\s+[A-Z]"),
                static_regex(r"^[A-Z][\.\)]\s+[A-Z]"),
            ],
            list: vec![
                static_regex(r"^\s*[-•·*]\s+"),
                static_regex(r"^\s*\d+[\.\)]\s+"),
                static_regex(r"^\s*[a-zA-Z][\.\)]\s+"),
            ],
            quote: vec![
                static_regex(r#"(?s)^["'“‘].*["'”’]$"#),
                static_regex(r"^\s*>\s*"),
            ],
            technical: vec![
                static_regex(r"\b[A-Z]{2,}\b"),
                static_regex(r"\b\w+\(\w*\)"),
                static_regex(r"\b\d+[a-zA-Z]+\b"),
            ],
            math: vec![
                static_regex(r"[=<>±∑∫∏√∞]"),
                static_regex(r"\d+\s*[+\-*/]\s*\d+"),
                static_regex(r"[a-zA-Z]\^?\d+"),
                static_regex(r"\([^)]*[+\-*/][^)]*\)"),
            ],
            code: vec![
                static_regex(r"(?s)\{.*\}"),
                static_regex(r"function\s*\("),
                static_regex(r"if\s*\("),
                static_regex(r"[a-zA-Z_]\w*\(\)"),
                static_regex(r"[<>]=?|!=|=="),
            ],
            caption: static_regex(r"(?i)^(?:figure|table|chart|diagram|image)\s+\d+"),
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Check whether the whole text is one unit, number-with-unit or
    /// notation token.
    pub fn is_notation(&self, text: &str) -> bool {
        self.detector.is_notation(text)
    }

    /// Classify a text unit.
    pub fn classify(&self, text: &str, context: Option<&ElementContext>) -> ElementRole {
        // A lone unit or notation token is never emphasized, whatever its
        // typography.
        if self.is_notation(text) {
            return ElementRole::MathContent;
        }

        if let Some(ctx) = context {
            if let Some(size) = ctx.font_size {
                let bold = ctx.is_bold.unwrap_or(false);
                if size > self.config.large_text_threshold
                    || (size > self.config.bold_heading_threshold && bold)
                {
                    return ElementRole::Heading;
                }
            }
        }

        let text = text.trim();
        if text.is_empty() {
            return ElementRole::Paragraph;
        }

        if text.chars().count() <= self.config.max_heading_chars && matches_any(&self.heading, text)
        {
            ElementRole::Heading
        } else if matches_any(&self.list, text) {
            ElementRole::ListItem
        } else if matches_any(&self.quote, text) {
            ElementRole::Quote
        } else if matches_any(&self.technical, text) {
            ElementRole::TechnicalTerm
        } else if matches_any(&self.math, text) {
            ElementRole::MathContent
        } else if matches_any(&self.code, text) {
            ElementRole::Code
        } else if text.chars().count() < self.config.max_table_cell_chars
            && (text.contains('\t') || text.contains('|'))
        {
            ElementRole::TableCell
        } else if self.caption.is_match(text) {
            ElementRole::Caption
        } else {
            ElementRole::Paragraph
        }
    }

    /// Classify and report how certain the role is.
    ///
    /// Unambiguous roles start at 0.95, everything else at 0.8; each
    /// context field present adds a small bonus.
    pub fn classify_with_confidence(
        &self,
        text: &str,
        context: Option<&ElementContext>,
    ) -> (ElementRole, f32) {
        let role = self.classify(text, context);
        (role, role_confidence(role, context))
    }
}

impl Default for ElementClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Confidence for a role given the available context.
pub fn role_confidence(role: ElementRole, context: Option<&ElementContext>) -> f32 {
    let mut confidence: f32 = match role {
        ElementRole::Heading
        | ElementRole::Code
        | ElementRole::MathContent
        | ElementRole::TechnicalTerm => 0.95,
        _ => 0.8,
    };

    if let Some(ctx) = context {
        if ctx.font_size.is_some() {
            confidence += 0.05;
        }
        if ctx.is_bold.is_some() {
            confidence += 0.05;
        }
        if ctx.position.is_some() {
            confidence += 0.03;
        }
    }

    confidence.min(1.0)
}

fn matches_any(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|re| re.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DocumentPosition;

    fn classify(text: &str) -> ElementRole {
        ElementClassifier::new().classify(text, None)
    }

    // ==================== Context rules ====================

    #[test]
    fn test_large_font_is_heading() {
        let c = ElementClassifier::new();
        let ctx = ElementContext::new().with_font_size(18.0);
        assert_eq!(c.classify("just some words", Some(&ctx)), ElementRole::Heading);

        let ctx = ElementContext::new().with_font_size(15.0).with_bold(true);
        assert_eq!(c.classify("just some words", Some(&ctx)), ElementRole::Heading);

        let ctx = ElementContext::new().with_font_size(15.0).with_bold(false);
        assert_eq!(c.classify("just some words", Some(&ctx)), ElementRole::Paragraph);
    }

    #[test]
    fn test_custom_threshold() {
        let config = ClassifierConfig::new().with_large_text_threshold(30.0);
        let c = ElementClassifier::with_config(config);
        let ctx = ElementContext::new().with_font_size(18.0);
        assert_eq!(c.classify("just some words", Some(&ctx)), ElementRole::Paragraph);
    }

    // ==================== Shape rules ====================

    #[test]
    fn test_headings() {
        assert_eq!(classify("INTRODUCTION"), ElementRole::Heading);
        assert_eq!(classify("2.1 Related work"), ElementRole::Heading);
        assert_eq!(classify("A. Background"), ElementRole::Heading);
    }

    #[test]
    fn test_list_items() {
        assert_eq!(classify("- buy milk"), ElementRole::ListItem);
        assert_eq!(classify("• first point"), ElementRole::ListItem);
        assert_eq!(classify("3) lowercase item"), ElementRole::ListItem);
        assert_eq!(classify("b. another one"), ElementRole::ListItem);
    }

    #[test]
    fn test_numbered_capitalized_line_is_heading_before_list() {
        // heading rule precedes the list rule
        assert_eq!(classify("1. Buy milk"), ElementRole::Heading);
    }

    #[test]
    fn test_quotes() {
        assert_eq!(classify("\"To be or not to be\""), ElementRole::Quote);
        assert_eq!(classify("> quoted reply"), ElementRole::Quote);
        assert_eq!(classify("“curly quoted”"), ElementRole::Quote);
    }

    #[test]
    fn test_technical_math_code() {
        assert_eq!(classify("The NASA mission"), ElementRole::TechnicalTerm);
        assert_eq!(classify("call init() first"), ElementRole::TechnicalTerm);
        assert_eq!(classify("it weighs 25kg"), ElementRole::TechnicalTerm);
        assert_eq!(classify("E=mc2"), ElementRole::MathContent);
        assert_eq!(classify("add 2 + 3 together"), ElementRole::MathContent);
        assert_eq!(classify("while (true) { loop; }"), ElementRole::Code);
    }

    #[test]
    fn test_standalone_notation_is_math() {
        for text in ["45%", "30°C", "1.5×10⁻⁶", "60km/h", "6.02e23"] {
            assert_eq!(classify(text), ElementRole::MathContent, "{text}");
        }
        let c = ElementClassifier::new();
        let large = ElementContext::new().with_font_size(24.0);
        assert_eq!(c.classify("45%", Some(&large)), ElementRole::MathContent);
        assert_eq!(classify("growth of 45% this year"), ElementRole::Paragraph);
    }

    #[test]
    fn test_table_cell_and_caption() {
        assert_eq!(classify("Name\tValue"), ElementRole::TableCell);
        assert_eq!(classify("Figure 3: a chart of sales"), ElementRole::Caption);
        assert_eq!(classify("table 2 shows results"), ElementRole::Caption);
    }

    #[test]
    fn test_default_paragraph() {
        assert_eq!(classify("The quick brown fox"), ElementRole::Paragraph);
        assert_eq!(classify(""), ElementRole::Paragraph);
    }

    #[test]
    fn test_deterministic() {
        let c = ElementClassifier::new();
        let ctx = ElementContext::new().with_position(DocumentPosition::Middle);
        for text in ["E=mc2", "1. Buy milk", "The NASA mission", "plain words here"] {
            assert_eq!(c.classify(text, Some(&ctx)), c.classify(text, Some(&ctx)));
        }
    }

    // ==================== Confidence ====================

    #[test]
    fn test_confidence() {
        assert_eq!(role_confidence(ElementRole::Paragraph, None), 0.8);
        assert_eq!(role_confidence(ElementRole::Code, None), 0.95);

        let ctx = ElementContext::new()
            .with_font_size(12.0)
            .with_bold(false)
            .with_position(DocumentPosition::End);
        let conf = role_confidence(ElementRole::Paragraph, Some(&ctx));
        assert!((conf - 0.93).abs() < 1e-6);
        assert_eq!(role_confidence(ElementRole::Heading, Some(&ctx)), 1.0);
    }
}
