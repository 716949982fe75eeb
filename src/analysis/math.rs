//! Math, unit and scientific-notation detection.
//!
//! The detector decides whether a token must be kept verbatim. It is
//! conservative: tokens made only of letters never fire, so ordinary words
//! are always left to the word splitter.

use regex::Regex;

use super::static_regex;

/// Symbols that mark a token as mathematical.
pub const MATH_SYMBOLS: &[char] = &[
    '+', '-', '*', '/', '=', '^', '<', '>', '≤', '≥', '≠', '≈', '∼', 'π', '∞', '∑', '∏', '∫', '∂',
    '∇', '∆', '∈', '∉', '⊂', '⊃', '⊆', '⊇', '∪', '∩', '∅', '∧', '∨', '¬', '→', '↔', '∀', '∃',
    '±', '∓', '×', '÷', '√', '∝', '°', '%', '⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹', '₀',
    '₁', '₂', '₃', '₄', '₅', '₆', '₇', '₈', '₉',
];

/// Function names recognized when applied with parentheses.
pub const MATH_FUNCTIONS: &[&str] = &[
    "sin", "cos", "tan", "sinh", "cosh", "tanh", "log", "ln", "exp", "sqrt", "abs", "min", "max",
    "sum", "prod", "lim", "int", "diff", "grad", "det", "tr", "rank", "dim",
];

/// Check whether a character belongs to the math symbol set.
pub fn is_math_symbol(c: char) -> bool {
    MATH_SYMBOLS.contains(&c)
}

/// Check whether a token starts with a known function name and `(`.
fn starts_with_math_function(token: &str) -> bool {
    token
        .find('(')
        .map(|idx| MATH_FUNCTIONS.contains(&&token[..idx]))
        .unwrap_or(false)
}

/// Classifies tokens as "preserve verbatim" or "candidate word".
#[derive(Debug, Clone)]
pub struct MathDetector {
    scientific: Vec<Regex>,
    equation_operand: Vec<Regex>,
    function_call: Regex,
    script: Vec<Regex>,
    unit: Vec<Regex>,
}

impl MathDetector {
    /// Create a detector with the built-in pattern set.
    pub fn new() -> Self {
        Self {
            scientific: vec![
                static_regex(r"^\d+\.?\d*[eE][+-]?\d+$"),
                static_regex(r"^\d+\.?\d*\s*×\s*10[⁻⁺]?[0-9⁰¹²³⁴⁵⁶⁷⁸⁹]+$"),
                static_regex(r"\d\s*\*\s*10\^"),
                static_regex(r"\d\s*×\s*10\^"),
            ],
            equation_operand: vec![
                static_regex(r"[\p{L}0-9]+\s*=\s*[\p{L}0-9]"),
                static_regex(r"^[a-zA-Z]\([a-zA-Z]\)\s*="),
            ],
            function_call: static_regex(r"\p{L}+\([^)]+\)"),
            script: vec![static_regex(r"_\d+"), static_regex(r"\^\d+")],
            unit: vec![
                static_regex(r"^\d+\.?\d*\s?\p{L}+(?:/\p{L}+)?$"),
                static_regex(r"^\d+\.?\d*\s?%$"),
                static_regex(r"^\d+\.?\d*\s?°[CFK]?$"),
            ],
        }
    }

    /// Check whether a token should be preserved verbatim.
    pub fn should_preserve(&self, token: &str) -> bool {
        let token = token.trim();
        if token.is_empty() || !Self::passes_gate(token) {
            return false;
        }

        self.is_scientific_notation(token)
            || self.is_unit_with_number(token)
            || self.is_equation(token)
            || self.is_formula(token)
    }

    /// Scientific notation such as `6.02e23` or `1.5×10⁻⁶`.
    pub fn is_scientific_notation(&self, token: &str) -> bool {
        self.scientific.iter().any(|re| re.is_match(token))
    }

    /// Equation shape: `=` with operands, or any math symbol.
    pub fn is_equation(&self, token: &str) -> bool {
        if token.contains('=') && self.equation_operand.iter().any(|re| re.is_match(token)) {
            return true;
        }
        self.contains_math_symbols(token)
    }

    /// Function application or sub/superscript pattern.
    pub fn is_formula(&self, token: &str) -> bool {
        starts_with_math_function(token)
            || self.function_call.is_match(token)
            || self.script.iter().any(|re| re.is_match(token))
    }

    /// Number followed by a unit, percentage or degree mark.
    pub fn is_unit_with_number(&self, token: &str) -> bool {
        self.unit.iter().any(|re| re.is_match(token))
    }

    /// Check whether a whole text is a single number, unit or notation
    /// token such as `45%`, `30 °C` or `1.5×10⁻⁶`.
    ///
    /// Text with inner whitespace only qualifies through the anchored unit
    /// and scientific-notation shapes, so sentences that merely contain a
    /// symbol are not caught.
    pub fn is_notation(&self, text: &str) -> bool {
        let text = text.trim();
        if !text.chars().any(char::is_numeric) {
            return false;
        }
        if text.contains(char::is_whitespace) {
            return self.is_unit_with_number(text)
                || self.scientific[..2].iter().any(|re| re.is_match(text));
        }
        self.should_preserve(text)
    }

    /// Check for any character of the math symbol set.
    pub fn contains_math_symbols(&self, token: &str) -> bool {
        token.chars().any(is_math_symbol)
    }

    /// Split text on whitespace into `(token, preserve)` pairs.
    ///
    /// Whitespace runs are returned as their own tokens with
    /// `preserve == false`, so joining the tokens reproduces `text`.
    pub fn split_preserving_math<'a>(&self, text: &'a str) -> Vec<(&'a str, bool)> {
        let mut out = Vec::new();
        let mut start = 0;
        let mut in_space: Option<bool> = None;

        for (idx, c) in text.char_indices() {
            let space = c.is_whitespace();
            match in_space {
                Some(prev) if prev != space => {
                    let token = &text[start..idx];
                    out.push((token, !prev && self.should_preserve(token)));
                    start = idx;
                }
                _ => {}
            }
            in_space = Some(space);
        }
        if let Some(prev) = in_space {
            let token = &text[start..];
            out.push((token, !prev && self.should_preserve(token)));
        }
        out
    }

    /// Only tokens with digits, scripts or symbols can be math.
    fn passes_gate(token: &str) -> bool {
        token
            .chars()
            .any(|c| c.is_numeric() || is_math_symbol(c) || matches!(c, '(' | '_' | '^'))
    }
}

impl Default for MathDetector {
    fn default() -> Self {
        Self::new()
    }
}
