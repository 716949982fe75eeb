//! Converters dispatching input files to the text or PDF path.
//!
//! Each input kind has a [`DocumentConverter`]; the [`ConverterRegistry`]
//! picks one by file extension, or by sniffing the file when the extension
//! is unknown.
//!
//! # Example
//!
//! ```no_run
//! use bionify::convert::{ConvertOptions, ConverterRegistry};
//! use std::path::Path;
//!
//! fn main() -> bionify::Result<()> {
//!     let registry = ConverterRegistry::with_defaults();
//!     let result = registry.convert(Path::new("notes.md"), &ConvertOptions::default())?;
//!     if let Some(text) = result.as_text() {
//!         println!("{}", text);
//!     }
//!     Ok(())
//! }
//! ```

mod pdf;
mod text;

pub use pdf::PdfConverter;
pub use text::TextConverter;

use crate::detect::{validate_input, InputKind, DEFAULT_MAX_INPUT_BYTES};
use crate::error::{Error, Result};
use crate::pdf::{PdfOptions, PdfOutcome};
use crate::pipeline::{DocumentResult, ProcessingConfig};
use crate::render::RenderOptions;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Options for document conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Pipeline configuration
    pub config: ProcessingConfig,

    /// PDF reconstruction options
    pub pdf: PdfOptions,

    /// Document-level rendering options
    pub render: RenderOptions,

    /// Inputs larger than this are rejected
    pub max_input_bytes: u64,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            config: ProcessingConfig::default(),
            pdf: PdfOptions::default(),
            render: RenderOptions::default(),
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pipeline configuration.
    pub fn with_config(mut self, config: ProcessingConfig) -> Self {
        self.config = config;
        self
    }

    /// Set PDF options.
    pub fn with_pdf_options(mut self, options: PdfOptions) -> Self {
        self.pdf = options;
        self
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Set the input size limit.
    pub fn with_max_input_bytes(mut self, max: u64) -> Self {
        self.max_input_bytes = max;
        self
    }
}

/// Converted output: text in the configured format, or a rewritten PDF.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertedContent {
    Text(String),
    Pdf(Vec<u8>),
}

/// Result of document conversion.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// Converted content
    pub content: ConvertedContent,

    /// MIME type of the output
    pub mime_type: &'static str,

    /// Per-unit results for text inputs
    pub document: Option<DocumentResult>,

    /// Method and quality report for PDF inputs
    pub pdf: Option<PdfOutcome>,
}

impl ConvertResult {
    /// Create a new conversion result.
    pub fn new(content: ConvertedContent) -> Self {
        let mime_type = match content {
            ConvertedContent::Text(_) => "text/plain",
            ConvertedContent::Pdf(_) => "application/pdf",
        };
        Self {
            content,
            mime_type,
            document: None,
            pdf: None,
        }
    }

    /// Attach the document result.
    pub fn with_document(mut self, document: DocumentResult) -> Self {
        self.document = Some(document);
        self
    }

    /// Attach the PDF outcome.
    pub fn with_pdf_outcome(mut self, outcome: PdfOutcome) -> Self {
        self.pdf = Some(outcome);
        self
    }

    /// Set MIME type.
    pub fn with_mime_type(mut self, mime_type: &'static str) -> Self {
        self.mime_type = mime_type;
        self
    }

    /// Text output, if this was a text conversion.
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            ConvertedContent::Text(text) => Some(text),
            ConvertedContent::Pdf(_) => None,
        }
    }

    /// Content as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.content {
            ConvertedContent::Text(text) => text.as_bytes(),
            ConvertedContent::Pdf(bytes) => bytes,
        }
    }

    /// Get content length in bytes.
    pub fn content_len(&self) -> usize {
        self.as_bytes().len()
    }
}

/// Trait for document converters.
///
/// Implement this trait to add support for a new input kind.
pub trait DocumentConverter: Send + Sync {
    /// Lowercase extensions without the leading dot (e.g., `["pdf"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Get the name of this converter.
    fn name(&self) -> &str;

    /// Convert a file at the given path.
    fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult>;

    /// Convert from bytes.
    fn convert_bytes(&self, bytes: &[u8], options: &ConvertOptions) -> Result<ConvertResult>;

    /// Check if this converter supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry for document converters.
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<dyn DocumentConverter>>,
    by_name: HashMap<String, Arc<dyn DocumentConverter>>,
}

impl ConverterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the text and PDF converters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(TextConverter::new()));
        registry.register(Arc::new(PdfConverter::new()));
        registry
    }

    /// Register a converter for all its supported extensions.
    pub fn register(&mut self, converter: Arc<dyn DocumentConverter>) {
        for ext in converter.supported_extensions() {
            self.converters
                .insert(ext.to_lowercase(), converter.clone());
        }
        self.by_name
            .insert(converter.name().to_lowercase(), converter);
    }

    /// Get a converter by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.converters.get(&ext.to_lowercase()).cloned()
    }

    /// Get a converter by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.converters.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.converters.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// Validate a file and convert it with the matching converter.
    ///
    /// Unknown or missing extensions fall back to the sniffed input kind.
    pub fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult> {
        let kind = validate_input(path, options.max_input_bytes)?;
        let converter = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| self.get_by_extension(ext))
            .or_else(|| self.get_by_kind(kind))
            .ok_or_else(|| Error::UnsupportedInputKind(kind.to_string()))?;

        converter.convert(path, options)
    }

    /// Convert bytes using the specified extension to determine the converter.
    pub fn convert_bytes(
        &self,
        bytes: &[u8],
        ext: &str,
        options: &ConvertOptions,
    ) -> Result<ConvertResult> {
        let converter = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::UnsupportedInputKind(format!("no converter for .{}", ext)))?;

        converter.convert_bytes(bytes, options)
    }

    fn get_by_kind(&self, kind: InputKind) -> Option<Arc<dyn DocumentConverter>> {
        self.get_by_extension(kind.as_str())
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
