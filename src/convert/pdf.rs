//! PDF converter backed by the spatial reconstruction engine.

use crate::error::Result;
use crate::pdf::SpatialEngine;
use crate::pipeline::Pipeline;
use std::path::Path;

use super::{ConvertOptions, ConvertResult, ConvertedContent, DocumentConverter};

/// Rewrites PDF documents with bionic emphasis.
#[derive(Debug, Clone, Default)]
pub struct PdfConverter {
    _private: (),
}

impl PdfConverter {
    /// Create a new PDF converter.
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn engine(&self, options: &ConvertOptions) -> Result<SpatialEngine> {
        let pipeline = Pipeline::new(options.config.clone())?;
        Ok(SpatialEngine::new(pipeline).with_options(options.pdf.clone()))
    }
}

impl DocumentConverter for PdfConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn name(&self) -> &str {
        "pdf"
    }

    fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult> {
        let data = std::fs::read(path)?;
        self.convert_bytes(&data, options)
    }

    fn convert_bytes(&self, bytes: &[u8], options: &ConvertOptions) -> Result<ConvertResult> {
        let (output, outcome) = self.engine(options)?.process_bytes(bytes)?;
        Ok(ConvertResult::new(ConvertedContent::Pdf(output))
            .with_mime_type("application/pdf")
            .with_pdf_outcome(outcome))
    }
}
