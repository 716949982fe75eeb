//! Text spans extracted from fixed-layout pages.

use super::{Point, Rect, Rgb};
use serde::{Deserialize, Serialize};

/// Style flags derived from the source font.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleFlags {
    pub bold: bool,
    pub italic: bool,
    pub monospace: bool,
    pub serif: bool,
}

impl StyleFlags {
    /// Infer style flags from a PDF base font name.
    pub fn from_font_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        Self {
            bold: lower.contains("bold")
                || lower.contains("black")
                || lower.contains("heavy")
                || lower.contains("semibold"),
            italic: lower.contains("italic") || lower.contains("oblique"),
            monospace: lower.contains("mono") || lower.contains("courier"),
            serif: (lower.contains("serif") && !lower.contains("sans"))
                || lower.contains("times")
                || lower.contains("georgia"),
        }
    }
}

/// A run of text sharing one font, size and colour on a page.
///
/// Spans are read-only input to the reconstruction engine; the engine
/// emits new drawing instructions instead of editing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSpan {
    /// Decoded text
    pub text: String,
    /// Bounding box in user space
    pub bbox: Rect,
    /// Baseline origin of the first glyph
    pub origin: Point,
    /// Effective font size in points
    pub font_size: f32,
    /// Source base font name
    pub font_name: String,
    /// Fill colour
    pub color: Rgb,
    /// Style flags
    pub flags: StyleFlags,
    /// Index of the text-showing operator in the page content
    #[serde(skip)]
    pub(crate) source_op: Option<usize>,
    /// How far the source operator moves the text position, as a `TJ`
    /// number (negative thousandths of the unscaled font size)
    #[serde(skip)]
    pub(crate) source_advance: f32,
}

impl PageSpan {
    /// Create a span with default colour and flags inferred from the font name.
    pub fn new(
        text: impl Into<String>,
        origin: Point,
        bbox: Rect,
        font_size: f32,
        font_name: impl Into<String>,
    ) -> Self {
        let font_name = font_name.into();
        let flags = StyleFlags::from_font_name(&font_name);
        Self {
            text: text.into(),
            bbox,
            origin,
            font_size,
            font_name,
            color: Rgb::BLACK,
            flags,
            source_op: None,
            source_advance: 0.0,
        }
    }

    /// Set the fill colour.
    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub(crate) fn with_source_op(mut self, index: usize) -> Self {
        self.source_op = Some(index);
        self
    }

    pub(crate) fn with_source_advance(mut self, advance: f32) -> Self {
        self.source_advance = advance;
        self
    }

    /// Check if the span carries no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
