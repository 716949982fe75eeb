//! Text analysis: segmentation, math detection, role classification and
//! emphasis intensity.

mod classifier;
mod document;
mod intensity;
mod math;
mod profile;
mod segmenter;

pub use classifier::{role_confidence, ClassifierConfig, ElementClassifier};
pub use document::{
    analyze_document, classify_units, recommend_profile, summarize, DocumentAnalysis,
    ProcessingSummary,
};
pub use intensity::{IntensityConfig, IntensityDecision, IntensityManager};
pub use math::{is_math_symbol, MathDetector, MATH_FUNCTIONS, MATH_SYMBOLS};
pub use profile::{ReadingProfile, StrengthTable};
pub use segmenter::{is_combining_mark, is_letters_only, Segmenter};

use regex::Regex;

/// Compile a pattern that is a literal in this crate.
pub(crate) fn static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern must compile")
}
