//! Output formats and rendering options.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Target representation for emphasized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Emphasized prefixes upper-cased
    #[default]
    PlainText,
    /// `<strong>` prefixes, HTML-escaped text
    Html,
    /// `**` prefixes, Markdown-escaped text
    Markdown,
    /// Structured word data
    Json,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::PlainText,
        OutputFormat::Html,
        OutputFormat::Markdown,
        OutputFormat::Json,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::PlainText => "plain_text",
            OutputFormat::Html => "html",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
        }
    }

    /// File extension for documents in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::PlainText => "txt",
            OutputFormat::Html => "html",
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::PlainText => "text/plain",
            OutputFormat::Html => "text/html",
            OutputFormat::Markdown => "text/markdown",
            OutputFormat::Json => "application/json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "plain_text" | "plain" | "text" | "txt" => Ok(OutputFormat::PlainText),
            "html" | "htm" => Ok(OutputFormat::Html),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            _ => Err(Error::Config(format!("unknown output format: {}", s))),
        }
    }
}

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Options for whole-document rendering.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Title of the generated HTML page
    pub title: String,

    /// Layout of document-level JSON
    pub json_format: JsonFormat,

    /// Extra CSS appended to the HTML stylesheet
    pub extra_css: Option<String>,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTML page title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the JSON layout.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }

    /// Append custom CSS to the HTML stylesheet.
    pub fn with_extra_css(mut self, css: impl Into<String>) -> Self {
        self.extra_css = Some(css.into());
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: "Bionic Reading Document".to_string(),
            json_format: JsonFormat::Pretty,
            extra_css: None,
        }
    }
}
