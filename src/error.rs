//! Error types for bionify library.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for bionify operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while analysing, rendering or rewriting documents.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input kind is recognized but not handled by this library.
    #[error("Unsupported input kind: {0}")]
    UnsupportedInputKind(String),

    /// Input failed validation before analysis started.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Segmentation or classification failed on pathological input.
    #[error("Analysis failed: {0}")]
    AnalysisFailure(String),

    /// Error during rendering (plain text, HTML, Markdown, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// A span could not be erased or redrawn on a page.
    #[error("Spatial reconstruction failed: {0}")]
    SpatialReconstruction(String),

    /// Both PDF rewriting methods failed.
    #[error("All PDF methods failed (primary: {primary}; fallback: {fallback})")]
    MethodExhausted {
        /// Failure reported by the primary method
        primary: String,
        /// Failure reported by the fallback method
        fallback: String,
    },

    /// The worker pool wait exceeded the configured timeout.
    #[error("Timed out after {elapsed:?} with {pending} unit(s) pending")]
    Timeout {
        /// Time spent waiting
        elapsed: Duration,
        /// Number of units without a result
        pending: usize,
    },

    /// Error parsing or writing PDF structure.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Short stage name used in result metadata and CLI output.
    pub fn stage(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::UnsupportedInputKind(_) | Error::MalformedInput(_) => "validation",
            Error::AnalysisFailure(_) => "analysis",
            Error::Render(_) => "render",
            Error::SpatialReconstruction(_) | Error::MethodExhausted { .. } => "reconstruction",
            Error::Timeout { .. } => "timeout",
            Error::Pdf(_) | Error::Encrypted => "pdf",
            Error::Config(_) => "config",
            Error::Other(_) => "other",
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::Pdf(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Render(format!("JSON serialization error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MethodExhausted {
            primary: "no fonts".to_string(),
            fallback: "save failed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "All PDF methods failed (primary: no fonts; fallback: save failed)"
        );

        let err = Error::UnsupportedInputKind("docx".to_string());
        assert_eq!(err.to_string(), "Unsupported input kind: docx");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.stage(), "io");
    }

    #[test]
    fn test_timeout_display() {
        let err = Error::Timeout {
            elapsed: Duration::from_millis(1500),
            pending: 2,
        };
        assert!(err.to_string().contains("2 unit(s) pending"));
        assert_eq!(err.stage(), "timeout");
    }
}
