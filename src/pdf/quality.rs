//! Span-level quality metrics for rewritten documents.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse rating of a rewrite's success rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLabel {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl QualityLabel {
    /// Rate a success rate in `[0, 1]`.
    pub fn from_rate(rate: f32) -> Self {
        if rate >= 0.8 {
            QualityLabel::Excellent
        } else if rate >= 0.6 {
            QualityLabel::Good
        } else if rate >= 0.4 {
            QualityLabel::Fair
        } else {
            QualityLabel::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityLabel::Excellent => "excellent",
            QualityLabel::Good => "good",
            QualityLabel::Fair => "fair",
            QualityLabel::Poor => "poor",
        }
    }
}

impl fmt::Display for QualityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Counters collected while rewriting spans.
///
/// Every span lands in exactly one of `enhanced`, `fallback`, `failed` or
/// `skipped`; the first three together make up `attempted`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Spans with at least one emphasized word
    pub spans_attempted: usize,
    /// Spans redrawn with emphasis
    pub spans_enhanced: usize,
    /// Spans redrawn as original text after emphasis failed
    pub spans_fallback: usize,
    /// Spans that could not be redrawn at all
    pub spans_failed: usize,
    /// Spans left untouched because nothing needed emphasis
    pub spans_skipped: usize,
    pub pages_processed: usize,
}

impl QualityMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// `spans_enhanced / spans_attempted`, zero when nothing was attempted.
    pub fn success_rate(&self) -> f32 {
        if self.spans_attempted == 0 {
            0.0
        } else {
            self.spans_enhanced as f32 / self.spans_attempted as f32
        }
    }

    pub fn label(&self) -> QualityLabel {
        QualityLabel::from_rate(self.success_rate())
    }

    /// Merge counters from another page or document.
    pub fn merge(&mut self, other: &QualityMetrics) {
        self.spans_attempted += other.spans_attempted;
        self.spans_enhanced += other.spans_enhanced;
        self.spans_fallback += other.spans_fallback;
        self.spans_failed += other.spans_failed;
        self.spans_skipped += other.spans_skipped;
        self.pages_processed += other.pages_processed;
    }
}

impl fmt::Display for QualityMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} spans enhanced ({:.0}%, {}), {} fallback, {} failed, {} skipped",
            self.spans_enhanced,
            self.spans_attempted,
            self.success_rate() * 100.0,
            self.label(),
            self.spans_fallback,
            self.spans_failed,
            self.spans_skipped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_thresholds() {
        assert_eq!(QualityLabel::from_rate(0.8), QualityLabel::Excellent);
        assert_eq!(QualityLabel::from_rate(0.79), QualityLabel::Good);
        assert_eq!(QualityLabel::from_rate(0.6), QualityLabel::Good);
        assert_eq!(QualityLabel::from_rate(0.4), QualityLabel::Fair);
        assert_eq!(QualityLabel::from_rate(0.39), QualityLabel::Poor);
    }

    #[test]
    fn test_success_rate_and_merge() {
        let mut total = QualityMetrics::new();
        assert_eq!(total.success_rate(), 0.0);

        let page = QualityMetrics {
            spans_attempted: 3,
            spans_enhanced: 2,
            spans_fallback: 1,
            pages_processed: 1,
            ..Default::default()
        };
        total.merge(&page);
        total.merge(&QualityMetrics {
            spans_skipped: 4,
            pages_processed: 1,
            ..Default::default()
        });

        assert_eq!(total.pages_processed, 2);
        assert_eq!(total.spans_skipped, 4);
        assert!((total.success_rate() - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(total.label(), QualityLabel::Good);
        assert!(total.to_string().starts_with("2/3 spans enhanced (67%, good)"));
    }
}
