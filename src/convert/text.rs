//! Plain text and Markdown converter.

use crate::error::{Error, Result};
use crate::model::TextDocument;
use crate::pipeline::Pipeline;
use log::debug;
use std::path::Path;

use super::{ConvertOptions, ConvertResult, ConvertedContent, DocumentConverter};

/// Converts UTF-8 text files paragraph by paragraph.
#[derive(Debug, Clone, Default)]
pub struct TextConverter {
    _private: (),
}

impl TextConverter {
    /// Create a new text converter.
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn convert_text(&self, text: &str, options: &ConvertOptions) -> Result<ConvertResult> {
        let doc = TextDocument::from_text(text);
        debug!("Text input split into {} units", doc.len());

        let pipeline =
            Pipeline::new(options.config.clone())?.with_render_options(options.render.clone());
        let result = pipeline.process_document(&doc)?;

        Ok(ConvertResult::new(ConvertedContent::Text(result.output.clone()))
            .with_mime_type(options.config.format.mime_type())
            .with_document(result))
    }
}

impl DocumentConverter for TextConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["txt", "text", "md", "markdown"]
    }

    fn name(&self) -> &str {
        "text"
    }

    fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult> {
        let text = std::fs::read_to_string(path)?;
        self.convert_text(&text, options)
    }

    fn convert_bytes(&self, bytes: &[u8], options: &ConvertOptions) -> Result<ConvertResult> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| Error::MalformedInput(format!("input is not UTF-8: {}", e)))?;
        self.convert_text(text, options)
    }
}
