//! Whole-document assembly.

use chrono::Utc;
use serde::Serialize;

use super::html::render_html_document;
use super::json::{to_json, UnitJson};
use super::markdown::render_markdown_document;
use super::strip::escape_for;
use super::{OutputFormat, RenderOptions};
use crate::error::Result;
use crate::model::ElementRole;

/// A processed unit ready for document assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedElement {
    pub role: ElementRole,
    /// Source text of the unit
    pub original: String,
    /// Rendered output
    pub output: String,
    /// Format the output was actually produced in
    pub format: OutputFormat,
    /// Strength used
    pub strength: f32,
    /// Separator following the unit in the source
    pub separator: String,
}

impl RenderedElement {
    pub fn new(
        role: ElementRole,
        original: impl Into<String>,
        output: impl Into<String>,
        format: OutputFormat,
    ) -> Self {
        Self {
            role,
            original: original.into(),
            output: output.into(),
            format,
            strength: 0.0,
            separator: String::new(),
        }
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Whether the output differs from the source.
    pub fn processed(&self) -> bool {
        self.output != self.original
    }

    /// Output usable inside a document of `target` format.
    ///
    /// Output produced in a different format (after a fallback) is
    /// escaped for the target.
    pub fn body_for(&self, target: OutputFormat) -> String {
        if self.format == target {
            self.output.clone()
        } else {
            escape_for(&self.output, target)
        }
    }

    fn unit_json(&self) -> UnitJson {
        if self.format == OutputFormat::Json {
            if let Ok(unit) = serde_json::from_str::<UnitJson>(&self.output) {
                return unit;
            }
        }
        UnitJson::wrap(&self.original, &self.output)
    }
}

#[derive(Serialize)]
struct JsonElement {
    index: usize,
    role: ElementRole,
    strength: f32,
    bionic: UnitJson,
}

#[derive(Serialize)]
struct ProcessingInfo {
    total_elements: usize,
    processed_elements: usize,
    average_intensity: f32,
    generated_at: String,
}

#[derive(Serialize)]
struct JsonDocument {
    title: String,
    elements: Vec<JsonElement>,
    processing_info: ProcessingInfo,
}

fn render_json_document(elements: &[RenderedElement], options: &RenderOptions) -> Result<String> {
    let json_elements: Vec<JsonElement> = elements
        .iter()
        .enumerate()
        .map(|(index, element)| JsonElement {
            index,
            role: element.role,
            strength: element.strength,
            bionic: element.unit_json(),
        })
        .collect();

    let processed: Vec<&JsonElement> =
        json_elements.iter().filter(|e| e.bionic.processed).collect();
    let average_intensity = if processed.is_empty() {
        0.0
    } else {
        processed.iter().map(|e| e.strength).sum::<f32>() / processed.len() as f32
    };

    let doc = JsonDocument {
        title: options.title.clone(),
        processing_info: ProcessingInfo {
            total_elements: json_elements.len(),
            processed_elements: processed.len(),
            average_intensity,
            generated_at: Utc::now().to_rfc3339(),
        },
        elements: json_elements,
    };
    to_json(&doc, options.json_format)
}

fn render_text_document(elements: &[RenderedElement], leading: &str) -> String {
    let mut out = leading.to_string();
    for element in elements {
        out.push_str(&element.output);
        out.push_str(&element.separator);
    }
    out
}

/// Assemble rendered elements into one document.
///
/// Plain text keeps `leading` and every element's separator, so an
/// unprocessed document reassembles to its source exactly.
pub fn render_document(
    elements: &[RenderedElement],
    leading: &str,
    format: OutputFormat,
    options: &RenderOptions,
) -> Result<String> {
    match format {
        OutputFormat::PlainText => Ok(render_text_document(elements, leading)),
        OutputFormat::Html => Ok(render_html_document(elements, options)),
        OutputFormat::Markdown => Ok(render_markdown_document(elements)),
        OutputFormat::Json => render_json_document(elements, options),
    }
}
