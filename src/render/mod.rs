//! Rendering of emphasized text in plain text, HTML, Markdown and JSON.

mod document;
mod html;
mod json;
mod markdown;
mod options;
mod result;
mod strip;
mod text;

pub use document::{render_document, RenderedElement};
pub use html::render_html;
pub use json::{render_json, to_json, UnitJson, WordJson};
pub use markdown::render_markdown;
pub use options::{JsonFormat, OutputFormat, RenderOptions};
pub use result::RenderStats;
pub use strip::{escape_for, escape_html, escape_markdown, markup_balanced, strip_emphasis};
pub use text::{render_text, upper_prefix};

use crate::error::Result;
use crate::split::PlannedSegment;

/// Output of rendering one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedUnit {
    /// Rendered output in the requested format
    pub output: String,
    /// Readable content without markup or escapes
    pub content: String,
}

/// Render a planned unit in the requested format.
pub fn render_unit(
    text: &str,
    plan: &[PlannedSegment],
    strength: f32,
    format: OutputFormat,
) -> Result<RenderedUnit> {
    let output = match format {
        OutputFormat::PlainText => render_text(plan),
        OutputFormat::Html => render_html(plan),
        OutputFormat::Markdown => render_markdown(plan),
        OutputFormat::Json => render_json(text, plan, strength)?,
    };
    let content = match format {
        OutputFormat::Json => render_text(plan),
        other => strip_emphasis(&output, other),
    };
    Ok(RenderedUnit { output, content })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Segmenter;
    use crate::split::WordSplitter;

    #[test]
    fn test_render_unit_all_formats() {
        let text = "Read <this> now";
        let plan = WordSplitter::new().plan(Segmenter::new().segment(text), 0.6);

        for format in OutputFormat::ALL {
            let unit = render_unit(text, &plan, 0.6, format).unwrap();
            assert_ne!(unit.output, text, "{format}");
            assert_eq!(unit.content.to_lowercase(), text.to_lowercase(), "{format}");
            if matches!(format, OutputFormat::Html | OutputFormat::Markdown) {
                assert_eq!(strip_emphasis(&unit.output, format), text);
            }
            assert!(markup_balanced(&unit.output, format));
        }
    }
}
