//! Processing results and metadata.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ProcessingStrategy;
use crate::analysis::{DocumentAnalysis, IntensityDecision, ProcessingSummary, ReadingProfile};
use crate::error::Error;
use crate::model::ElementRole;
use crate::render::{OutputFormat, RenderStats};

/// Metadata describing how a unit was processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    /// Strength used for the accepted output
    pub intensity_used: f32,
    pub profile_used: ReadingProfile,
    pub strategy_used: ProcessingStrategy,
    pub processing_time: Duration,
    pub quality_score: f32,
    /// Format the accepted output is in
    pub format_used: OutputFormat,
    /// Role assigned during analysis; `None` when analysis failed
    pub role: Option<ElementRole>,
    pub confidence: f32,
}

/// Result of processing one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub success: bool,
    /// Rendered output; the original text when processing failed
    pub output: String,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub quality_score: f32,
    pub fallback_used: bool,
    pub metadata: ResultMetadata,
    /// Stage of the first error (`analysis`, `render`, `timeout`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<String>,
    /// Intensity decision for the unit
    #[serde(skip)]
    pub decision: Option<IntensityDecision>,
    /// Word counts of the accepted output
    #[serde(skip)]
    pub render_stats: RenderStats,
}

impl ProcessingResult {
    /// Failed result that carries the original text.
    pub fn failed(original: &str, error: &Error, metadata: ResultMetadata) -> Self {
        Self {
            success: false,
            output: original.to_string(),
            warnings: Vec::new(),
            errors: vec![error.to_string()],
            quality_score: 0.0,
            fallback_used: false,
            metadata,
            failed_stage: Some(error.stage().to_string()),
            decision: None,
            render_stats: RenderStats::default(),
        }
    }

    /// Whether the unit failed in the given stage.
    pub fn failed_in(&self, stage: &str) -> bool {
        self.failed_stage.as_deref() == Some(stage)
    }
}

/// Result of processing a whole document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResult {
    /// Assembled document in the configured format
    pub output: String,
    /// Per-unit results in document order
    pub units: Vec<ProcessingResult>,
    pub warnings: Vec<String>,
    pub analysis: DocumentAnalysis,
    pub summary: ProcessingSummary,
    pub render_stats: RenderStats,
    pub processing_time: Duration,
}

impl DocumentResult {
    /// Number of failed units.
    pub fn failed_units(&self) -> usize {
        self.units.iter().filter(|r| !r.success).count()
    }

    /// Number of units that used a fallback.
    pub fn fallback_units(&self) -> usize {
        self.units.iter().filter(|r| r.fallback_used).count()
    }
}
