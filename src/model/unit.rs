//! Text units and flat text documents.

use super::{DocumentPosition, ElementContext, ElementRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One paragraph, span or cell submitted to the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextUnit {
    /// Unit text
    pub text: String,
    /// Layout context, if known
    pub context: Option<ElementContext>,
    /// Explicit role; skips shape classification when set
    pub role: Option<ElementRole>,
}

impl TextUnit {
    /// Create a unit with no context.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            context: None,
            role: None,
        }
    }

    /// Attach layout context.
    pub fn with_context(mut self, context: ElementContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Force a structural role.
    pub fn with_role(mut self, role: ElementRole) -> Self {
        self.role = Some(role);
        self
    }
}

/// Source metadata for a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Source file name, if any
    pub source: Option<String>,
    /// Input kind ("txt", "pdf", ...)
    pub kind: Option<String>,
    /// Time the document was loaded
    pub loaded_at: Option<DateTime<Utc>>,
}

/// An ordered list of text units plus the exact separators between them.
///
/// `separators[i]` follows `units[i]`; joining units and separators in
/// order reproduces the source text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextDocument {
    /// Document metadata
    pub metadata: DocumentMetadata,
    /// Units in document order
    pub units: Vec<TextUnit>,
    /// Separator after each unit
    pub separators: Vec<String>,
    /// Leading text before the first unit (blank lines)
    pub leading: String,
}

impl TextDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Split plain text into paragraph units on blank lines.
    ///
    /// Every unit receives a position context when the document has more
    /// than one unit.
    pub fn from_text(text: &str) -> Self {
        let mut doc = Self::new();
        let mut rest = text;

        let trimmed_start = rest.trim_start_matches(['\n', '\r']);
        doc.leading = rest[..rest.len() - trimmed_start.len()].to_string();
        rest = trimmed_start;

        while !rest.is_empty() {
            let (unit, separator, next) = match find_blank_line(rest) {
                Some((start, end)) => (&rest[..start], &rest[start..end], &rest[end..]),
                None => (rest, "", ""),
            };
            doc.units.push(TextUnit::new(unit));
            doc.separators.push(separator.to_string());
            rest = next;
        }

        doc.assign_positions();
        doc
    }

    /// Push a unit with an empty separator.
    pub fn push(&mut self, unit: TextUnit) {
        self.units.push(unit);
        self.separators.push(String::new());
    }

    /// Set position context on every unit from its index.
    pub fn assign_positions(&mut self) {
        let total = self.units.len();
        for (index, unit) in self.units.iter_mut().enumerate() {
            if let Some(position) = DocumentPosition::for_index(index, total) {
                let context = unit.context.unwrap_or_default().with_position(position);
                unit.context = Some(context);
            }
        }
    }

    /// Number of units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Check if the document has no units.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Separator following unit `index`, or `"\n\n"` when missing.
    pub fn separator(&self, index: usize) -> &str {
        self.separators
            .get(index)
            .map(|s| s.as_str())
            .unwrap_or("\n\n")
    }

    /// Reassemble the source text.
    pub fn plain_text(&self) -> String {
        let mut out = self.leading.clone();
        for (i, unit) in self.units.iter().enumerate() {
            out.push_str(&unit.text);
            out.push_str(self.separators.get(i).map(|s| s.as_str()).unwrap_or(""));
        }
        out
    }
}

/// Find the first run of two or more line breaks (with optional spaces between).
///
/// Returns the byte range of the separator.
fn find_blank_line(text: &str) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\n' {
            let start = if i > 0 && bytes[i - 1] == b'\r' { i - 1 } else { i };
            let mut j = i + 1;
            let mut newlines = 1;
            let mut end = j;
            while j < bytes.len() && matches!(bytes[j], b'\n' | b'\r' | b' ' | b'\t') {
                if bytes[j] == b'\n' {
                    newlines += 1;
                    end = j + 1;
                }
                j += 1;
            }
            if newlines >= 2 {
                return Some((start, end));
            }
            i += 1;
        } else {
            i += 1;
        }
    }
    None
}
