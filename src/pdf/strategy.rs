//! Choosing between the morphing and redaction rewrite methods.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::extract::PageSample;
use crate::error::Error;

/// How original glyphs are erased and replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfMethod {
    /// Pick per document with [`select_method`]
    #[default]
    Auto,
    /// Cover each span as it is processed and redraw at its origin
    Morphing,
    /// Remove all processed text per page first, then redraw from the bbox
    Redaction,
}

impl PdfMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PdfMethod::Auto => "auto",
            PdfMethod::Morphing => "morphing",
            PdfMethod::Redaction => "redaction",
        }
    }

    /// The method to retry with when this one fails.
    pub fn fallback(&self) -> PdfMethod {
        match self {
            PdfMethod::Redaction => PdfMethod::Morphing,
            PdfMethod::Auto | PdfMethod::Morphing => PdfMethod::Redaction,
        }
    }
}

impl fmt::Display for PdfMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PdfMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(PdfMethod::Auto),
            "morphing" | "morph" => Ok(PdfMethod::Morphing),
            "redaction" | "redact" => Ok(PdfMethod::Redaction),
            other => Err(Error::Config(format!("unknown PDF method: {}", other))),
        }
    }
}

/// Limits under which a document counts as simple enough for morphing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionThresholds {
    /// Most distinct fonts across sampled pages
    pub max_fonts: usize,
    /// Most text blocks on any sampled page
    pub max_blocks_per_page: usize,
    /// Average spans per page must stay below this
    pub max_avg_spans: f32,
}

impl Default for SelectionThresholds {
    fn default() -> Self {
        Self {
            max_fonts: 5,
            max_blocks_per_page: 20,
            max_avg_spans: 200.0,
        }
    }
}

/// What method selection saw in the sampled pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodAnalysis {
    pub pages_sampled: usize,
    pub distinct_fonts: usize,
    pub max_blocks_per_page: usize,
    pub avg_spans_per_page: f32,
    pub images: usize,
    pub has_forms: bool,
    /// Why redaction was preferred; empty when morphing was chosen
    pub reasons: Vec<String>,
}

/// Pick a rewrite method from sampled pages with default thresholds.
pub fn select_method(samples: &[PageSample], has_forms: bool) -> (PdfMethod, MethodAnalysis) {
    select_method_with(samples, has_forms, &SelectionThresholds::default())
}

/// Pick a rewrite method from sampled pages.
pub fn select_method_with(
    samples: &[PageSample],
    has_forms: bool,
    thresholds: &SelectionThresholds,
) -> (PdfMethod, MethodAnalysis) {
    let fonts: BTreeSet<&String> = samples.iter().flat_map(|s| s.fonts.iter()).collect();
    let total_spans: usize = samples.iter().map(|s| s.spans).sum();
    let avg_spans = if samples.is_empty() {
        0.0
    } else {
        total_spans as f32 / samples.len() as f32
    };

    let mut analysis = MethodAnalysis {
        pages_sampled: samples.len(),
        distinct_fonts: fonts.len(),
        max_blocks_per_page: samples.iter().map(|s| s.text_blocks).max().unwrap_or(0),
        avg_spans_per_page: avg_spans,
        images: samples.iter().map(|s| s.images).sum(),
        has_forms,
        reasons: Vec::new(),
    };

    if analysis.distinct_fonts > thresholds.max_fonts {
        analysis
            .reasons
            .push(format!("{} distinct fonts", analysis.distinct_fonts));
    }
    if analysis.max_blocks_per_page > thresholds.max_blocks_per_page {
        analysis.reasons.push(format!(
            "{} text blocks on one page",
            analysis.max_blocks_per_page
        ));
    }
    if analysis.avg_spans_per_page >= thresholds.max_avg_spans {
        analysis
            .reasons
            .push(format!("{:.0} spans per page", analysis.avg_spans_per_page));
    }
    if has_forms {
        analysis.reasons.push("interactive form".to_string());
    }

    let method = if analysis.reasons.is_empty() {
        PdfMethod::Morphing
    } else {
        PdfMethod::Redaction
    };
    debug!(
        "Selected {} for {} sampled page(s): fonts={}, max blocks={}, avg spans={:.1}",
        method,
        analysis.pages_sampled,
        analysis.distinct_fonts,
        analysis.max_blocks_per_page,
        analysis.avg_spans_per_page
    );
    (method, analysis)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(fonts: &[&str], blocks: usize, spans: usize) -> PageSample {
        PageSample {
            page_number: 1,
            fonts: fonts.iter().map(|f| f.to_string()).collect(),
            text_blocks: blocks,
            spans,
            images: 0,
        }
    }

    #[test]
    fn test_simple_document_morphs() {
        let samples = vec![
            sample(&["Helvetica", "Helvetica-Bold"], 8, 40),
            sample(&["Helvetica"], 12, 60),
        ];
        let (method, analysis) = select_method(&samples, false);
        assert_eq!(method, PdfMethod::Morphing);
        assert_eq!(analysis.distinct_fonts, 2);
        assert_eq!(analysis.max_blocks_per_page, 12);
        assert_eq!(analysis.avg_spans_per_page, 50.0);
        assert!(analysis.reasons.is_empty());
    }

    #[test]
    fn test_complex_documents_redact() {
        let many_fonts = vec![sample(&["A", "B", "C", "D", "E", "F"], 5, 10)];
        assert_eq!(select_method(&many_fonts, false).0, PdfMethod::Redaction);

        let dense = vec![sample(&["A"], 21, 10)];
        assert_eq!(select_method(&dense, false).0, PdfMethod::Redaction);

        let busy = vec![sample(&["A"], 5, 250), sample(&["A"], 5, 150)];
        assert_eq!(select_method(&busy, false).0, PdfMethod::Redaction);

        let (method, analysis) = select_method(&[sample(&["A"], 1, 1)], true);
        assert_eq!(method, PdfMethod::Redaction);
        assert_eq!(analysis.reasons, vec!["interactive form".to_string()]);
    }

    #[test]
    fn test_method_parse_and_fallback() {
        assert_eq!("Morphing".parse::<PdfMethod>().unwrap(), PdfMethod::Morphing);
        assert_eq!("redact".parse::<PdfMethod>().unwrap(), PdfMethod::Redaction);
        assert!("hybrid".parse::<PdfMethod>().is_err());
        assert_eq!(PdfMethod::Morphing.fallback(), PdfMethod::Redaction);
        assert_eq!(PdfMethod::Redaction.fallback(), PdfMethod::Morphing);
    }
}
