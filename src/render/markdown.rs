//! Markdown rendering: `**` prefixes with escaped text.

use super::strip::escape_markdown;
use super::{OutputFormat, RenderedElement};
use crate::model::ElementRole;
use crate::split::PlannedSegment;

/// Render a planned unit as Markdown with `**` prefixes.
pub fn render_markdown(plan: &[PlannedSegment]) -> String {
    let mut out = String::new();
    for (segment, split) in plan {
        match split {
            Some(split) => {
                out.push_str("**");
                out.push_str(&escape_markdown(&split.prefix));
                out.push_str("**");
                out.push_str(&escape_markdown(&split.suffix));
            }
            None => out.push_str(&escape_markdown(&segment.text)),
        }
    }
    out
}

fn has_list_marker(text: &str) -> bool {
    let trimmed = text.trim_start();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some('-' | '*' | '•' | '·' | '+') => chars.next().is_some_and(char::is_whitespace),
        Some(c) if c.is_ascii_alphanumeric() => {
            let rest = trimmed.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
            rest.starts_with(". ") || rest.starts_with(") ")
        }
        _ => false,
    }
}

/// Assemble a Markdown document from rendered elements.
pub fn render_markdown_document(elements: &[RenderedElement]) -> String {
    let mut blocks = Vec::with_capacity(elements.len());

    for element in elements {
        let original = element.original.trim();
        let block = match element.role {
            ElementRole::Code => {
                if original.contains('\n') {
                    format!("```\n{}\n```", original)
                } else {
                    format!("`{}`", original)
                }
            }
            role => {
                let body = element.body_for(OutputFormat::Markdown);
                let body = body.trim();
                match role {
                    ElementRole::Heading if !original.starts_with('#') => format!("# {}", body),
                    ElementRole::ListItem if !has_list_marker(original) => format!("- {}", body),
                    ElementRole::Quote if !original.starts_with('>') => format!("> {}", body),
                    _ => body.to_string(),
                }
            }
        };
        blocks.push(block);
    }

    blocks.join("\n\n")
}
