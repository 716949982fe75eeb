//! Escaping and emphasis removal.

use super::json::UnitJson;
use super::OutputFormat;

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape characters that would change inline Markdown formatting.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if is_markdown_special(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn is_markdown_special(c: char) -> bool {
    matches!(c, '\\' | '`' | '*' | '_' | '[' | ']' | '|')
}

/// Escape text for embedding in a document of the given format.
///
/// Plain text and JSON bodies are returned unchanged.
pub fn escape_for(text: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Html => escape_html(text),
        OutputFormat::Markdown => escape_markdown(text),
        OutputFormat::PlainText | OutputFormat::Json => text.to_string(),
    }
}

fn unescape_html(text: &str) -> String {
    const ENTITIES: [(&str, char); 5] = [
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&#x27;", '\''),
    ];

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, c)) => {
                out.push(*c);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn unescape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if is_markdown_special(next) {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// Remove emphasis markup and escapes from a rendered unit.
///
/// HTML and Markdown output strip back to the exact input. Plain text
/// output is returned as is, so equality with the input holds only
/// case-insensitively. JSON output yields its `original_text`.
pub fn strip_emphasis(output: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::PlainText => output.to_string(),
        OutputFormat::Html => {
            unescape_html(&output.replace("<strong>", "").replace("</strong>", ""))
        }
        OutputFormat::Markdown => unescape_markdown(&remove_bold_markers(output)),
        OutputFormat::Json => serde_json::from_str::<UnitJson>(output)
            .map(|unit| unit.original_text)
            .unwrap_or_else(|_| output.to_string()),
    }
}

/// Drop `**` pairs that are not escaped.
fn remove_bold_markers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push(c);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}

/// Check that emphasis markup opens and closes in pairs.
pub fn markup_balanced(output: &str, format: OutputFormat) -> bool {
    match format {
        OutputFormat::Html => {
            let mut depth: i64 = 0;
            let mut rest = output;
            let next_tag =
                |s: &str| s.find("<strong>").into_iter().chain(s.find("</strong>")).min();
            while let Some(pos) = next_tag(rest) {
                if rest[pos..].starts_with("</strong>") {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                    rest = &rest[pos + "</strong>".len()..];
                } else {
                    depth += 1;
                    if depth > 1 {
                        return false;
                    }
                    rest = &rest[pos + "<strong>".len()..];
                }
            }
            depth == 0
        }
        OutputFormat::Markdown => {
            let stripped_len = remove_bold_markers(output).chars().count();
            let removed = output.chars().count() - stripped_len;
            // each pair of markers removes four characters
            removed % 4 == 0
        }
        OutputFormat::PlainText | OutputFormat::Json => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape_round_trip() {
        let text = r#"a < b && "c" > 'd'"#;
        assert_eq!(unescape_html(&escape_html(text)), text);
        assert_eq!(escape_html("<b>"), "&lt;b&gt;");
        // literal tags in the source survive stripping
        let out = escape_html("<strong>x</strong>");
        assert_eq!(strip_emphasis(&out, OutputFormat::Html), "<strong>x</strong>");
    }

    #[test]
    fn test_markdown_escape_round_trip() {
        let text = r"snake_case **bold** [link] \ | `code`";
        let escaped = escape_markdown(text);
        assert_eq!(strip_emphasis(&escaped, OutputFormat::Markdown), text);
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(
            strip_emphasis("<strong>Th</strong>e &amp; <strong>f</strong>ox", OutputFormat::Html),
            "The & fox"
        );
        assert_eq!(strip_emphasis("**Th**e \\*x", OutputFormat::Markdown), "The *x");
        assert_eq!(strip_emphasis("THe", OutputFormat::PlainText), "THe");
    }

    #[test]
    fn test_markup_balance() {
        assert!(markup_balanced("<strong>a</strong>b", OutputFormat::Html));
        assert!(!markup_balanced("<strong>a b", OutputFormat::Html));
        assert!(!markup_balanced("a</strong><strong>b", OutputFormat::Html));
        assert!(markup_balanced("**a**b \\*", OutputFormat::Markdown));
        assert!(!markup_balanced("**a b", OutputFormat::Markdown));
        assert!(markup_balanced("anything", OutputFormat::PlainText));
    }

    #[test]
    fn test_escape_for() {
        assert_eq!(escape_for("a*b", OutputFormat::Markdown), "a\\*b");
        assert_eq!(escape_for("a&b", OutputFormat::Html), "a&amp;b");
        assert_eq!(escape_for("a&b", OutputFormat::PlainText), "a&b");
    }
}
