//! Input kind detection and validation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Largest input accepted by [`validate_input`] unless told otherwise.
pub const DEFAULT_MAX_INPUT_BYTES: u64 = 50 * 1024 * 1024;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_MAGIC_LEN: usize = 5;
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// ZIP local file header, the container of word-processing documents.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Bytes read from the head of a file for detection.
const SNIFF_LEN: usize = 1024;

/// Kind of input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// Plain text or Markdown
    Text,
    /// PDF document
    Pdf,
    /// Word-processing document (recognized, not processed)
    Docx,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Text => "txt",
            InputKind::Pdf => "pdf",
            InputKind::Docx => "docx",
        }
    }

    /// Map a file extension to an input kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" | "text" | "md" | "markdown" => Some(InputKind::Text),
            "pdf" => Some(InputKind::Pdf),
            "docx" => Some(InputKind::Docx),
            _ => None,
        }
    }
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// PDF format information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFormat {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
}

impl std::fmt::Display for PdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

/// Read the PDF header from bytes.
pub fn detect_pdf_format(data: &[u8]) -> Result<PdfFormat> {
    if data.len() < PDF_MAGIC_LEN + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::MalformedInput("missing PDF header".to_string()));
    }

    // Extract version string (e.g., "1.7" from "%PDF-1.7")
    let version_bytes = &data[PDF_MAGIC_LEN..PDF_MAGIC_LEN + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_valid_version(&version) {
        return Err(Error::MalformedInput(format!(
            "unsupported PDF version: {}",
            version
        )));
    }

    Ok(PdfFormat { version })
}

/// Check if a version string is valid.
fn is_valid_version(version: &str) -> bool {
    let chars: Vec<char> = version.chars().collect();
    chars.len() == 3 && chars[0].is_ascii_digit() && chars[1] == '.' && chars[2].is_ascii_digit()
}

/// Detect the input kind from leading bytes and an optional extension.
///
/// Magic bytes win over the extension; the extension only decides
/// between kinds the bytes cannot tell apart.
pub fn detect_input_kind_from_bytes(data: &[u8], extension: Option<&str>) -> Result<InputKind> {
    let by_extension = extension.and_then(InputKind::from_extension);

    if data.starts_with(PDF_MAGIC) {
        detect_pdf_format(data)?;
        return Ok(InputKind::Pdf);
    }
    if data.starts_with(ZIP_MAGIC) {
        return match by_extension {
            Some(InputKind::Docx) => Ok(InputKind::Docx),
            _ if contains(data, b"word/") => Ok(InputKind::Docx),
            _ => Err(Error::UnsupportedInputKind("zip archive".to_string())),
        };
    }

    match by_extension {
        Some(InputKind::Pdf) => Err(Error::MalformedInput("missing PDF header".to_string())),
        Some(InputKind::Docx) => Err(Error::MalformedInput(
            "docx file is not a zip container".to_string(),
        )),
        _ if looks_like_text(data) => Ok(InputKind::Text),
        _ => Err(Error::UnsupportedInputKind("binary data".to_string())),
    }
}

/// Detect the input kind of a file.
pub fn detect_input_kind<P: AsRef<Path>>(path: P) -> Result<InputKind> {
    let path = path.as_ref();
    let mut head = Vec::with_capacity(SNIFF_LEN);
    File::open(path)?
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut head)?;
    let ext = path.extension().and_then(|e| e.to_str());
    detect_input_kind_from_bytes(&head, ext)
}

/// Pre-check an input file: it must exist, be non-empty, fit in
/// `max_bytes` and be of a kind this library processes.
pub fn validate_input<P: AsRef<Path>>(path: P, max_bytes: u64) -> Result<InputKind> {
    let path = path.as_ref();
    let size = std::fs::metadata(path)?.len();
    if size == 0 {
        return Err(Error::MalformedInput(format!(
            "{} is empty",
            path.display()
        )));
    }
    if size > max_bytes {
        return Err(Error::MalformedInput(format!(
            "{} is {} bytes, limit is {}",
            path.display(),
            size,
            max_bytes
        )));
    }
    match detect_input_kind(path)? {
        InputKind::Docx => Err(Error::UnsupportedInputKind("docx".to_string())),
        kind => Ok(kind),
    }
}

fn looks_like_text(data: &[u8]) -> bool {
    if data.contains(&0) {
        return false;
    }
    match std::str::from_utf8(data) {
        Ok(_) => true,
        // A multi-byte character cut off by the sniff window is fine.
        Err(e) => e.error_len().is_none(),
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // ==== PDF header ====

    #[test]
    fn test_detect_valid_pdf() {
        let format = detect_pdf_format(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3").unwrap();
        assert_eq!(format.version, "1.7");
        assert_eq!(format.to_string(), "PDF 1.7");
    }

    #[test]
    fn test_detect_bad_pdf_header() {
        assert!(matches!(
            detect_pdf_format(b"%PDF"),
            Err(Error::MalformedInput(_))
        ));
        assert!(matches!(
            detect_pdf_format(b"%PDF-x.y\n"),
            Err(Error::MalformedInput(_))
        ));
    }

    // ==== Kind detection ====

    #[test]
    fn test_magic_bytes_win() {
        assert_eq!(
            detect_input_kind_from_bytes(b"%PDF-1.4\n", Some("txt")).unwrap(),
            InputKind::Pdf
        );
        assert_eq!(
            detect_input_kind_from_bytes(b"PK\x03\x04....word/document.xml", None).unwrap(),
            InputKind::Docx
        );
        assert!(matches!(
            detect_input_kind_from_bytes(b"PK\x03\x04....", None),
            Err(Error::UnsupportedInputKind(_))
        ));
    }

    #[test]
    fn test_extension_fallback() {
        assert_eq!(
            detect_input_kind_from_bytes("# Notes\nplain words".as_bytes(), Some("md")).unwrap(),
            InputKind::Text
        );
        assert!(matches!(
            detect_input_kind_from_bytes(b"hello", Some("pdf")),
            Err(Error::MalformedInput(_))
        ));
        assert!(matches!(
            detect_input_kind_from_bytes(b"\x00\x01\x02", None),
            Err(Error::UnsupportedInputKind(_))
        ));
    }

    #[test]
    fn test_truncated_utf8_is_text() {
        let bytes = "naïve".as_bytes();
        // cut inside the two-byte ï
        assert_eq!(
            detect_input_kind_from_bytes(&bytes[..3], None).unwrap(),
            InputKind::Text
        );
    }

    // ==== Validation ====

    #[test]
    fn test_validate_input() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "Some readable text").unwrap();
        assert_eq!(validate_input(file.path(), 1024).unwrap(), InputKind::Text);
        assert!(matches!(
            validate_input(file.path(), 4),
            Err(Error::MalformedInput(_))
        ));

        let empty = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        assert!(matches!(
            validate_input(empty.path(), 1024),
            Err(Error::MalformedInput(_))
        ));

        let mut docx = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        docx.write_all(b"PK\x03\x04 archive").unwrap();
        assert!(matches!(
            validate_input(docx.path(), 1024),
            Err(Error::UnsupportedInputKind(_))
        ));
    }
}
