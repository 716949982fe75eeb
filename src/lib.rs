//! # bionify
//!
//! Bionic reading conversion for text and PDF documents.
//!
//! Each eligible word gets its leading letters emphasized so the eye can
//! anchor on them, while numbers, units, formulas, code and technical terms
//! are left untouched. Text is rendered as plain text, HTML, Markdown or
//! JSON; PDFs are rewritten in place with the emphasized prefixes drawn
//! over the original layout.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bionify::{bionify_text, OutputFormat, ProcessingConfig, ReadingProfile};
//!
//! fn main() -> bionify::Result<()> {
//!     let config = ProcessingConfig::new()
//!         .with_profile(ReadingProfile::Standard)
//!         .with_format(OutputFormat::Markdown);
//!
//!     let output = bionify_text("Reading is faster with anchors.", &config)?;
//!     println!("{}", output);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Content-aware emphasis**: headings, paragraphs, captions, code and math
//!   are classified and scaled independently
//! - **Multiple output formats**: plain text, HTML, Markdown, JSON
//! - **PDF rewriting**: morphing and redaction methods with automatic fallback
//! - **Parallel processing**: bounded worker pool with a deadline for batches
//! - **Async I/O**: optional `async` feature backed by tokio

pub mod analysis;
pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod pdf;
pub mod pipeline;
pub mod render;
pub mod split;

// Re-export commonly used types
pub use analysis::{
    recommend_profile, DocumentAnalysis, ElementClassifier, IntensityDecision, IntensityManager,
    MathDetector, ReadingProfile, Segmenter, StrengthTable,
};
pub use convert::{
    ConvertOptions, ConvertResult, ConvertedContent, ConverterRegistry, DocumentConverter,
    PdfConverter, TextConverter,
};
pub use detect::{detect_input_kind, detect_input_kind_from_bytes, validate_input, InputKind};
pub use error::{Error, Result};
pub use model::{ElementContext, ElementRole, Segment, SegmentKind, TextDocument, TextUnit};
pub use pdf::{PdfMethod, PdfOptions, PdfOutcome, QualityLabel, QualityMetrics, SpatialEngine};
pub use pipeline::{
    DocumentResult, Pipeline, ProcessingConfig, ProcessingResult, ProcessingStrategy,
};
pub use render::{JsonFormat, OutputFormat, RenderOptions};
pub use split::{WordSplit, WordSplitter};

use std::path::Path;
use std::time::Duration;

/// Convert text to bionic reading output.
///
/// Blank lines separate paragraphs; each paragraph is classified and
/// emphasized on its own and the separators are kept.
///
/// # Arguments
///
/// * `text` - Input text
/// * `config` - Pipeline configuration, including the output format
///
/// # Example
///
/// ```no_run
/// use bionify::{bionify_text, ProcessingConfig};
///
/// let output = bionify_text("The quick brown fox", &ProcessingConfig::default()).unwrap();
/// println!("{}", output);
/// ```
pub fn bionify_text(text: &str, config: &ProcessingConfig) -> Result<String> {
    let pipeline = Pipeline::new(config.clone())?;
    let result = pipeline.process_document(&TextDocument::from_text(text))?;
    Ok(result.output)
}

/// Convert a text or PDF file.
///
/// The input is validated first; the converter is chosen by extension, or
/// by the detected input kind when the extension is unknown.
///
/// # Arguments
///
/// * `path` - Path to a `.txt`, `.md` or `.pdf` file
/// * `options` - Conversion options
///
/// # Example
///
/// ```no_run
/// use bionify::{bionify_file, ConvertOptions};
///
/// let result = bionify_file("notes.md", &ConvertOptions::default()).unwrap();
/// std::fs::write("notes.bionic.txt", result.as_bytes()).unwrap();
/// ```
pub fn bionify_file<P: AsRef<Path>>(path: P, options: &ConvertOptions) -> Result<ConvertResult> {
    ConverterRegistry::with_defaults().convert(path.as_ref(), options)
}

/// Rewrite a PDF with bionic emphasis and save it to `output`.
///
/// # Example
///
/// ```no_run
/// use bionify::{bionify_pdf, PdfOptions, ProcessingConfig};
///
/// let outcome = bionify_pdf(
///     "paper.pdf",
///     "paper.bionic.pdf",
///     &ProcessingConfig::default(),
///     &PdfOptions::default(),
/// )
/// .unwrap();
/// println!("{} ({})", outcome.method_used, outcome.quality_metrics.label());
/// ```
pub fn bionify_pdf<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    config: &ProcessingConfig,
    options: &PdfOptions,
) -> Result<PdfOutcome> {
    let input = input.as_ref();
    match validate_input(input, detect::DEFAULT_MAX_INPUT_BYTES)? {
        InputKind::Pdf => {}
        kind => {
            return Err(Error::UnsupportedInputKind(format!(
                "expected pdf, found {}",
                kind
            )))
        }
    }
    let engine = SpatialEngine::new(Pipeline::new(config.clone())?).with_options(options.clone());
    engine.process_file(input, output.as_ref())
}

/// Builder for converting text, files and PDFs with one configuration.
///
/// # Example
///
/// ```no_run
/// use bionify::{Bionify, OutputFormat, PdfMethod, ReadingProfile};
///
/// let bionify = Bionify::new()
///     .with_profile(ReadingProfile::SpeedReading)
///     .with_format(OutputFormat::Html)
///     .with_pdf_method(PdfMethod::Redaction);
///
/// let html = bionify.text("Reading is faster with anchors.")?.output;
/// let outcome = bionify.pdf("paper.pdf", "paper.bionic.pdf")?;
/// # Ok::<(), bionify::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Bionify {
    options: ConvertOptions,
}

impl Bionify {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole pipeline configuration.
    pub fn with_config(mut self, config: ProcessingConfig) -> Self {
        self.options.config = config;
        self
    }

    /// Set the reading profile.
    pub fn with_profile(mut self, profile: ReadingProfile) -> Self {
        self.options.config = self.options.config.with_profile(profile);
        self
    }

    /// Force a strength for emphasized roles.
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.options.config = self.options.config.with_intensity(intensity);
        self
    }

    /// Set the output format for text inputs.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.options.config = self.options.config.with_format(format);
        self
    }

    /// Set the strength scaling strategy.
    pub fn with_strategy(mut self, strategy: ProcessingStrategy) -> Self {
        self.options.config = self.options.config.with_strategy(strategy);
        self
    }

    /// Process paragraphs on `workers` threads.
    pub fn with_parallel(mut self, workers: usize) -> Self {
        self.options.config = self.options.config.with_parallel(workers);
        self
    }

    /// Set the processing deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.config = self.options.config.with_timeout(timeout);
        self
    }

    /// Set the PDF rewrite method.
    pub fn with_pdf_method(mut self, method: PdfMethod) -> Self {
        self.options.pdf = self.options.pdf.clone().with_method(method);
        self
    }

    /// Replace the PDF options.
    pub fn with_pdf_options(mut self, options: PdfOptions) -> Self {
        self.options.pdf = options;
        self
    }

    /// Set document rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.options.render = options;
        self
    }

    /// Set the input size limit for files.
    pub fn with_max_input_bytes(mut self, max: u64) -> Self {
        self.options.max_input_bytes = max;
        self
    }

    /// Current conversion options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Build a pipeline from the current configuration.
    pub fn pipeline(&self) -> Result<Pipeline> {
        Ok(Pipeline::new(self.options.config.clone())?
            .with_render_options(self.options.render.clone()))
    }

    /// Convert text, returning per-paragraph results.
    pub fn text(&self, text: &str) -> Result<DocumentResult> {
        self.pipeline()?
            .process_document(&TextDocument::from_text(text))
    }

    /// Process independent texts in input order.
    pub fn batch(&self, texts: &[String]) -> Result<Vec<ProcessingResult>> {
        Ok(self.pipeline()?.process_batch(texts))
    }

    /// Convert a text or PDF file.
    pub fn file<P: AsRef<Path>>(&self, path: P) -> Result<ConvertResult> {
        bionify_file(path, &self.options)
    }

    /// Rewrite a PDF file to `output`.
    pub fn pdf<P: AsRef<Path>, Q: AsRef<Path>>(&self, input: P, output: Q) -> Result<PdfOutcome> {
        bionify_pdf(input, output, &self.options.config, &self.options.pdf)
    }
}

/// Async wrappers running conversions on tokio's blocking pool.
#[cfg(feature = "async")]
pub mod nonblocking {
    use super::*;

    /// Read a file with tokio and convert it off the async runtime.
    pub async fn bionify_file<P: AsRef<Path>>(
        path: P,
        options: &ConvertOptions,
    ) -> Result<ConvertResult> {
        let path = path.as_ref().to_path_buf();
        let data = tokio::fs::read(&path).await?;
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_string(),
            None => detect_input_kind_from_bytes(&data, None)?.as_str().to_string(),
        };
        let options = options.clone();
        tokio::task::spawn_blocking(move || {
            ConverterRegistry::with_defaults().convert_bytes(&data, &ext, &options)
        })
        .await
        .map_err(|e| Error::Other(format!("conversion task failed: {}", e)))?
    }

    /// Convert text off the async runtime.
    pub async fn bionify_text(text: String, config: ProcessingConfig) -> Result<String> {
        tokio::task::spawn_blocking(move || super::bionify_text(&text, &config))
            .await
            .map_err(|e| Error::Other(format!("conversion task failed: {}", e)))?
    }
}
