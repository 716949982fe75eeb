//! Plain text rendering: emphasized prefixes are upper-cased.

use crate::split::PlannedSegment;

/// Upper-case a prefix without changing its character count.
///
/// Characters whose upper case is not a single character, or does not
/// lower-case back to the same letter, are kept as they are.
pub fn upper_prefix(prefix: &str) -> String {
    prefix.chars().map(upper_char).collect()
}

fn upper_char(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) if u.to_lowercase().eq(c.to_lowercase()) => u,
        _ => c,
    }
}

/// Render a planned unit as plain text.
pub fn render_text(plan: &[PlannedSegment]) -> String {
    let mut out = String::new();
    for (segment, split) in plan {
        match split {
            Some(split) => {
                out.push_str(&upper_prefix(&split.prefix));
                out.push_str(&split.suffix);
            }
            None => out.push_str(&segment.text),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Segmenter;
    use crate::split::WordSplitter;

    #[test]
    fn test_render_text() {
        let plan = WordSplitter::new().plan(Segmenter::new().segment("reading is fun, 25kg"), 0.6);
        assert_eq!(render_text(&plan), "READing Is Fun, 25kg");
    }

    #[test]
    fn test_upper_prefix_keeps_length() {
        assert_eq!(upper_prefix("straße"), "STRAßE");
        assert_eq!(upper_prefix("ıi"), "ıI");
    }
}
