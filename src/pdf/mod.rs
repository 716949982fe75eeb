//! PDF spatial reconstruction.
//!
//! Pages are rewritten in place: text spans are extracted from the content
//! streams, run through the same analysis and word splitting as plain text,
//! erased, and redrawn with their leading letters emphasized in a standard
//! substitute font.
//!
//! # Example
//!
//! ```no_run
//! use bionify::pdf::{PdfMethod, PdfOptions, SpatialEngine};
//! use bionify::{Pipeline, ProcessingConfig};
//! use std::path::Path;
//!
//! fn main() -> bionify::Result<()> {
//!     let pipeline = Pipeline::new(ProcessingConfig::default())?;
//!     let engine = SpatialEngine::new(pipeline)
//!         .with_options(PdfOptions::new().with_method(PdfMethod::Auto));
//!
//!     let outcome = engine.process_file(Path::new("paper.pdf"), Path::new("paper.bionic.pdf"))?;
//!     println!("{}: {}", outcome.method_used, outcome.quality_metrics);
//!     Ok(())
//! }
//! ```

mod canvas;
mod engine;
mod extract;
mod fonts;
mod quality;
mod strategy;

pub use canvas::{LopdfCanvas, PageCanvas, RedactionArea};
pub use engine::{PdfOptions, PdfOutcome, SpatialEngine, BOLD_OFFSETS};
pub use extract::{extract_page_spans, has_interactive_form, page_content, sample_page, PageSample};
pub use fonts::{map_font_name, win_ansi_code, FontFamily, StandardFont};
pub use quality::{QualityLabel, QualityMetrics};
pub use strategy::{
    select_method, select_method_with, MethodAnalysis, PdfMethod, SelectionThresholds,
};
