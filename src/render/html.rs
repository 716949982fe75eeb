//! HTML rendering: `<strong>` prefixes and a styled document page.

use super::strip::escape_html;
use super::{RenderOptions, RenderedElement};
use crate::model::ElementRole;
use crate::split::PlannedSegment;

const STYLESHEET: &str = r#"
        .bionic-document {
            max-width: 800px;
            margin: 0 auto;
            padding: 20px;
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.6;
            color: #333;
        }
        .bionic-document strong { font-weight: 700; }
        .bionic-document h1 { margin-top: 1.5em; margin-bottom: 0.5em; }
        .bionic-document p { margin-bottom: 1em; }
        .bionic-document ul { margin-bottom: 1em; padding-left: 2em; }
        .bionic-document blockquote {
            border-left: 4px solid #ddd;
            margin: 1em 0;
            padding-left: 1em;
            color: #666;
        }
        .bionic-document table { border-collapse: collapse; width: 100%; margin: 1em 0; }
        .bionic-document td { border: 1px solid #ddd; padding: 8px; text-align: left; }
        .bionic-document pre { background: #f6f8fa; padding: 12px; overflow-x: auto; }
        .bionic-document .preserved { font-family: monospace; }
"#;

/// Render a planned unit as escaped HTML with `<strong>` prefixes.
pub fn render_html(plan: &[PlannedSegment]) -> String {
    let mut out = String::new();
    for (segment, split) in plan {
        match split {
            Some(split) => {
                out.push_str("<strong>");
                out.push_str(&escape_html(&split.prefix));
                out.push_str("</strong>");
                out.push_str(&escape_html(&split.suffix));
            }
            None => out.push_str(&escape_html(&segment.text)),
        }
    }
    out
}

/// Container a role is grouped into, if any.
fn group_of(role: ElementRole) -> Option<(&'static str, &'static str)> {
    match role {
        ElementRole::ListItem => Some(("<ul>", "</ul>")),
        ElementRole::TableCell => Some(("<table>", "</table>")),
        _ => None,
    }
}

fn wrap_element(role: ElementRole, body: &str) -> String {
    match role {
        ElementRole::Heading => format!("<h1>{}</h1>", body),
        ElementRole::Paragraph => format!("<p>{}</p>", body),
        ElementRole::ListItem => format!("<li>{}</li>", body),
        ElementRole::Quote => format!("<blockquote>{}</blockquote>", body),
        ElementRole::TableCell => format!("<tr><td>{}</td></tr>", body),
        ElementRole::Code => format!("<pre><code>{}</code></pre>", body),
        ElementRole::Caption => format!("<figure><figcaption>{}</figcaption></figure>", body),
        ElementRole::TechnicalTerm | ElementRole::MathContent => {
            format!("<p class=\"preserved\">{}</p>", body)
        }
        ElementRole::Reference => format!("<p class=\"reference\">{}</p>", body),
    }
}

/// Assemble a complete HTML page from rendered elements.
pub fn render_html_document(elements: &[RenderedElement], options: &RenderOptions) -> String {
    let mut lines = vec![
        "<!DOCTYPE html>".to_string(),
        "<html lang=\"en\">".to_string(),
        "<head>".to_string(),
        "    <meta charset=\"UTF-8\">".to_string(),
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">".to_string(),
        format!("    <title>{}</title>", escape_html(&options.title)),
        "    <style>".to_string(),
        STYLESHEET.trim_matches('\n').to_string(),
    ];
    if let Some(css) = &options.extra_css {
        lines.push(css.clone());
    }
    lines.extend([
        "    </style>".to_string(),
        "</head>".to_string(),
        "<body>".to_string(),
        "    <div class=\"bionic-document\">".to_string(),
    ]);

    let mut open_group: Option<(&str, &str)> = None;
    for element in elements {
        let group = group_of(element.role);
        if open_group != group {
            if let Some((_, close)) = open_group {
                lines.push(format!("        {}", close));
            }
            if let Some((open, _)) = group {
                lines.push(format!("        {}", open));
            }
            open_group = group;
        }
        let body = element.body_for(super::OutputFormat::Html);
        lines.push(format!("        {}", wrap_element(element.role, &body)));
    }
    if let Some((_, close)) = open_group {
        lines.push(format!("        {}", close));
    }

    lines.extend([
        "    </div>".to_string(),
        "</body>".to_string(),
        "</html>".to_string(),
    ]);
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Segmenter;
    use crate::render::OutputFormat;
    use crate::split::WordSplitter;

    #[test]
    fn test_render_html_escapes() {
        let plan = WordSplitter::new().plan(Segmenter::new().segment("Tom & Jerry <3"), 0.4);
        assert_eq!(
            render_html(&plan),
            "<strong>T</strong>om &amp; <strong>Je</strong>rry &lt;3"
        );
    }

    #[test]
    fn test_document_groups_list_items() {
        let elements = vec![
            RenderedElement::new(
                ElementRole::Heading,
                "Intro",
                "<strong>In</strong>tro",
                OutputFormat::Html,
            ),
            RenderedElement::new(ElementRole::ListItem, "- one", "- one", OutputFormat::Html),
            RenderedElement::new(ElementRole::ListItem, "- two", "- two", OutputFormat::Html),
            RenderedElement::new(ElementRole::Paragraph, "a < b", "a < b", OutputFormat::PlainText),
        ];
        let page = render_html_document(&elements, &RenderOptions::new().with_title("T & C"));

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>T &amp; C</title>"));
        assert!(page.contains("<h1><strong>In</strong>tro</h1>"));
        assert_eq!(page.matches("<ul>").count(), 1);
        assert_eq!(page.matches("<li>").count(), 2);
        // plain-text fallback output is escaped
        assert!(page.contains("<p>a &lt; b</p>"));
    }
}
