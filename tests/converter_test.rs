//! Integration tests for the converter module.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use bionify::convert::{
    ConvertOptions, ConvertResult, ConvertedContent, ConverterRegistry, DocumentConverter,
    PdfConverter, TextConverter,
};
use bionify::error::{Error, Result};
use bionify::{OutputFormat, ProcessingConfig};

/// Mock converter for testing.
struct MockConverter {
    extensions: Vec<&'static str>,
    name: &'static str,
}

impl MockConverter {
    fn new(extensions: Vec<&'static str>, name: &'static str) -> Self {
        Self { extensions, name }
    }
}

impl DocumentConverter for MockConverter {
    fn supported_extensions(&self) -> &[&str] {
        &self.extensions
    }

    fn name(&self) -> &str {
        self.name
    }

    fn convert(&self, _path: &Path, _options: &ConvertOptions) -> Result<ConvertResult> {
        Ok(ConvertResult::new(ConvertedContent::Text(format!(
            "Converted by {}",
            self.name
        ))))
    }

    fn convert_bytes(&self, _bytes: &[u8], _options: &ConvertOptions) -> Result<ConvertResult> {
        Ok(ConvertResult::new(ConvertedContent::Text(format!(
            "Converted bytes by {}",
            self.name
        ))))
    }
}

fn text_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_converter_registry_new() {
    let registry = ConverterRegistry::new();

    // Empty registry should support nothing
    assert!(!registry.supports("pdf"));
    assert!(!registry.supports("txt"));
}

#[test]
fn test_converter_registry_with_defaults() {
    let registry = ConverterRegistry::with_defaults();

    assert!(registry.supports("pdf"));
    assert!(registry.supports("PDF")); // Case insensitive
    assert!(registry.supports("txt"));
    assert!(registry.supports("markdown"));
    assert!(!registry.supports("docx"));
}

#[test]
fn test_converter_registry_register() {
    let mut registry = ConverterRegistry::new();
    registry.register(Arc::new(MockConverter::new(vec!["rst", "adoc"], "markup")));

    assert!(registry.supports("rst"));
    assert!(registry.supports("ADOC"));
    assert_eq!(registry.get_by_name("Markup").unwrap().name(), "markup");
}

#[test]
fn test_registered_converter_replaces_default() {
    let mut registry = ConverterRegistry::with_defaults();
    registry.register(Arc::new(MockConverter::new(vec!["txt"], "custom")));

    let result = registry
        .convert_bytes(b"anything", "txt", &ConvertOptions::default())
        .unwrap();
    assert_eq!(result.as_text(), Some("Converted bytes by custom"));
    // the text converter still owns its other extensions
    assert_eq!(registry.get_by_extension("md").unwrap().name(), "text");
}

#[test]
fn test_converter_extensions() {
    let pdf = PdfConverter::new();
    assert_eq!(pdf.supported_extensions(), &["pdf"]);
    assert!(pdf.supports_extension("PDF"));
    assert!(!pdf.supports_extension("txt"));

    let text = TextConverter::new();
    assert_eq!(text.name(), "text");
    assert!(text.supports_extension("md"));
    assert!(!text.supports_extension("pdf"));
}

#[test]
fn test_convert_result_methods() {
    let result = ConvertResult::new(ConvertedContent::Text("HELlo".to_string()));
    assert_eq!(result.as_text(), Some("HELlo"));
    assert_eq!(result.content_len(), 5);
    assert_eq!(result.mime_type, "text/plain");
    assert!(result.document.is_none());

    let pdf = ConvertResult::new(ConvertedContent::Pdf(b"%PDF-1.7".to_vec()));
    assert_eq!(pdf.mime_type, "application/pdf");
    assert!(pdf.as_text().is_none());
    assert_eq!(pdf.as_bytes(), b"%PDF-1.7");
}

#[test]
fn test_convert_markdown_file_to_html() {
    let file = text_file(".md", "A short introduction\n\nThe second paragraph follows");
    let options = ConvertOptions::new()
        .with_config(ProcessingConfig::new().with_format(OutputFormat::Html));

    let result = ConverterRegistry::with_defaults()
        .convert(file.path(), &options)
        .unwrap();

    assert_eq!(result.mime_type, "text/html");
    let html = result.as_text().unwrap();
    assert!(html.contains("<strong>"));
    let document = result.document.unwrap();
    assert_eq!(document.units.len(), 2);
    assert_eq!(document.failed_units(), 0);
}

#[test]
fn test_registry_convert_missing_file() {
    let registry = ConverterRegistry::with_defaults();
    let result = registry.convert(Path::new("does-not-exist.txt"), &ConvertOptions::default());
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_registry_convert_rejects_docx() {
    let mut file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
    file.write_all(b"PK\x03\x04word/document.xml").unwrap();

    let result =
        ConverterRegistry::with_defaults().convert(file.path(), &ConvertOptions::default());
    assert!(matches!(result, Err(Error::UnsupportedInputKind(_))));
}

#[test]
fn test_registry_convert_rejects_oversized_input() {
    let file = text_file(".txt", "This text is longer than the limit");
    let options = ConvertOptions::new().with_max_input_bytes(8);

    let result = ConverterRegistry::with_defaults().convert(file.path(), &options);
    assert!(matches!(result, Err(Error::MalformedInput(_))));
}

#[test]
fn test_registry_convert_bytes_unsupported() {
    let registry = ConverterRegistry::with_defaults();
    let result = registry.convert_bytes(b"test", "xyz", &ConvertOptions::default());
    assert!(result.is_err());
}

#[test]
fn test_pdf_converter_rejects_garbage() {
    let result =
        PdfConverter::new().convert_bytes(b"%PDF-1.7\ngarbage", &ConvertOptions::default());
    assert!(result.is_err());
}
