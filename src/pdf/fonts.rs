//! Standard font substitution and metrics.
//!
//! Source fonts are arbitrary embedded or system fonts; the only faces a
//! rewritten page can rely on are the PDF Base-14 fonts. Every drawing
//! path goes through [`map_font_name`] and measures with the Adobe font
//! metrics tables below.

use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};

/// Base-14 font faces used for redrawn text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
    Symbol,
    ZapfDingbats,
}

/// Font family of a [`StandardFont`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFamily {
    Sans,
    Serif,
    Mono,
    Symbol,
    Dingbats,
}

impl StandardFont {
    /// PostScript base font name.
    pub fn base_name(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
            StandardFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
            StandardFont::TimesItalic => "Times-Italic",
            StandardFont::TimesBoldItalic => "Times-BoldItalic",
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "Courier-Bold",
            StandardFont::CourierOblique => "Courier-Oblique",
            StandardFont::CourierBoldOblique => "Courier-BoldOblique",
            StandardFont::Symbol => "Symbol",
            StandardFont::ZapfDingbats => "ZapfDingbats",
        }
    }

    /// Resource name used in page font dictionaries.
    pub fn resource_name(&self) -> String {
        format!("BnF{}", self.base_name().replace('-', ""))
    }

    pub fn family(&self) -> FontFamily {
        match self {
            StandardFont::Helvetica
            | StandardFont::HelveticaBold
            | StandardFont::HelveticaOblique
            | StandardFont::HelveticaBoldOblique => FontFamily::Sans,
            StandardFont::TimesRoman
            | StandardFont::TimesBold
            | StandardFont::TimesItalic
            | StandardFont::TimesBoldItalic => FontFamily::Serif,
            StandardFont::Courier
            | StandardFont::CourierBold
            | StandardFont::CourierOblique
            | StandardFont::CourierBoldOblique => FontFamily::Mono,
            StandardFont::Symbol => FontFamily::Symbol,
            StandardFont::ZapfDingbats => FontFamily::Dingbats,
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(
            self,
            StandardFont::HelveticaBold
                | StandardFont::HelveticaBoldOblique
                | StandardFont::TimesBold
                | StandardFont::TimesBoldItalic
                | StandardFont::CourierBold
                | StandardFont::CourierBoldOblique
        )
    }

    pub fn is_italic(&self) -> bool {
        matches!(
            self,
            StandardFont::HelveticaOblique
                | StandardFont::HelveticaBoldOblique
                | StandardFont::TimesItalic
                | StandardFont::TimesBoldItalic
                | StandardFont::CourierOblique
                | StandardFont::CourierBoldOblique
        )
    }

    /// Face for a family with the given weight and slant.
    pub fn variant(family: FontFamily, bold: bool, italic: bool) -> Self {
        match (family, bold, italic) {
            (FontFamily::Sans, false, false) => StandardFont::Helvetica,
            (FontFamily::Sans, true, false) => StandardFont::HelveticaBold,
            (FontFamily::Sans, false, true) => StandardFont::HelveticaOblique,
            (FontFamily::Sans, true, true) => StandardFont::HelveticaBoldOblique,
            (FontFamily::Serif, false, false) => StandardFont::TimesRoman,
            (FontFamily::Serif, true, false) => StandardFont::TimesBold,
            (FontFamily::Serif, false, true) => StandardFont::TimesItalic,
            (FontFamily::Serif, true, true) => StandardFont::TimesBoldItalic,
            (FontFamily::Mono, false, false) => StandardFont::Courier,
            (FontFamily::Mono, true, false) => StandardFont::CourierBold,
            (FontFamily::Mono, false, true) => StandardFont::CourierOblique,
            (FontFamily::Mono, true, true) => StandardFont::CourierBoldOblique,
            (FontFamily::Symbol, _, _) => StandardFont::Symbol,
            (FontFamily::Dingbats, _, _) => StandardFont::ZapfDingbats,
        }
    }

    /// Bold face of the same family and slant.
    pub fn bold(&self) -> Self {
        Self::variant(self.family(), true, self.is_italic())
    }

    /// Whether the face uses WinAnsiEncoding (symbolic fonts use their built-in encoding).
    pub fn uses_win_ansi(&self) -> bool {
        !matches!(self.family(), FontFamily::Symbol | FontFamily::Dingbats)
    }

    /// Ascender and descender in 1/1000 em.
    pub fn metrics(&self) -> (f32, f32) {
        match self.family() {
            FontFamily::Sans => (718.0, -207.0),
            FontFamily::Serif => (683.0, -217.0),
            FontFamily::Mono => (629.0, -157.0),
            FontFamily::Symbol => (1010.0, -293.0),
            FontFamily::Dingbats => (820.0, -143.0),
        }
    }

    /// Glyph width in 1/1000 em.
    pub fn char_width(&self, c: char) -> f32 {
        match self.family() {
            FontFamily::Mono => 600.0,
            FontFamily::Symbol => 500.0,
            FontFamily::Dingbats => 788.0,
            FontFamily::Sans | FontFamily::Serif => self.text_char_width(c),
        }
    }

    fn text_char_width(&self, c: char) -> f32 {
        let table = match self {
            StandardFont::HelveticaBold | StandardFont::HelveticaBoldOblique => &HELVETICA_BOLD,
            StandardFont::TimesBold | StandardFont::TimesBoldItalic => &TIMES_BOLD,
            StandardFont::TimesRoman | StandardFont::TimesItalic => &TIMES_ROMAN,
            _ => &HELVETICA,
        };
        let serif = self.family() == FontFamily::Serif;

        if let Some(w) = ascii_width(table, c) {
            return w;
        }
        if let Some(w) = special_width(c, serif) {
            return w;
        }
        // Accented letters take the width of their base letter.
        if let Some(w) = c.nfd().next().and_then(|base| ascii_width(table, base)) {
            return w;
        }
        if serif {
            500.0
        } else {
            556.0
        }
    }

    /// Width of `text` at `size` points.
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        text.chars().map(|c| self.char_width(c)).sum::<f32>() * size / 1000.0
    }

    /// Encode text for a string operand in this font.
    ///
    /// Fails on characters the font's encoding cannot represent.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(text.len());
        for c in text.chars() {
            let c = if c == '\t' || c == '\u{00A0}' { ' ' } else { c };
            let code = if self.uses_win_ansi() {
                win_ansi_code(c)
            } else if (' '..='~').contains(&c) {
                Some(c as u8)
            } else {
                None
            };
            match code {
                Some(b) => bytes.push(b),
                None => {
                    return Err(Error::SpatialReconstruction(format!(
                        "character {:?} cannot be encoded in {}",
                        c,
                        self.base_name()
                    )))
                }
            }
        }
        Ok(bytes)
    }
}

/// Map an arbitrary source font name to a standard substitute.
///
/// Subset prefixes (`ABCDEF+`) are ignored; weight and slant are taken from
/// the name.
pub fn map_font_name(name: &str) -> StandardFont {
    let name = name.split_once('+').map_or(name, |(_, rest)| rest);
    let lower = name.to_lowercase();

    let family = if ["courier", "mono", "consol"].iter().any(|k| lower.contains(k)) {
        FontFamily::Mono
    } else if lower.contains("zapf") || lower.contains("dingbat") {
        FontFamily::Dingbats
    } else if lower.contains("symbol") {
        FontFamily::Symbol
    } else if [
        "helvetica",
        "arial",
        "calibri",
        "verdana",
        "tahoma",
        "trebuchet",
        "sans",
    ]
    .iter()
    .any(|k| lower.contains(k))
    {
        FontFamily::Sans
    } else if ["times", "georgia", "serif", "garamond", "cambria"]
        .iter()
        .any(|k| lower.contains(k))
    {
        FontFamily::Serif
    } else {
        FontFamily::Sans
    };

    let bold = ["bold", "black", "heavy", "semibold"]
        .iter()
        .any(|k| lower.contains(k));
    let italic = lower.contains("italic") || lower.contains("oblique");

    StandardFont::variant(family, bold, italic)
}

fn ascii_width(table: &[u16; 95], c: char) -> Option<f32> {
    let code = c as u32;
    if (32..=126).contains(&code) {
        Some(f32::from(table[(code - 32) as usize]))
    } else {
        None
    }
}

fn special_width(c: char, serif: bool) -> Option<f32> {
    let w = match c {
        '\u{2018}' | '\u{2019}' | '\u{201A}' => {
            if serif {
                333.0
            } else {
                222.0
            }
        }
        '\u{201C}' | '\u{201D}' | '\u{201E}' => {
            if serif {
                444.0
            } else {
                333.0
            }
        }
        '\u{2013}' => {
            if serif {
                500.0
            } else {
                556.0
            }
        }
        '\u{2014}' | '\u{2026}' | '\u{2122}' => 1000.0,
        '\u{2022}' => 350.0,
        '\u{20AC}' => 556.0,
        '\u{00A0}' | '\t' => {
            if serif {
                250.0
            } else {
                278.0
            }
        }
        _ => return None,
    };
    Some(w)
}

/// WinAnsiEncoding code for a character.
pub fn win_ansi_code(c: char) -> Option<u8> {
    let code = c as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => match c {
            '\u{20AC}' => Some(0x80),
            '\u{201A}' => Some(0x82),
            '\u{201E}' => Some(0x84),
            '\u{2026}' => Some(0x85),
            '\u{2018}' => Some(0x91),
            '\u{2019}' => Some(0x92),
            '\u{201C}' => Some(0x93),
            '\u{201D}' => Some(0x94),
            '\u{2022}' => Some(0x95),
            '\u{2013}' => Some(0x96),
            '\u{2014}' => Some(0x97),
            '\u{2122}' => Some(0x99),
            _ => None,
        },
    }
}

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

#[cfg(test)]
mod tests {
    use super::*;

    // ==== Mapping ====

    #[test]
    fn test_map_font_name_families() {
        assert_eq!(map_font_name("ArialMT"), StandardFont::Helvetica);
        assert_eq!(map_font_name("ABCDEF+Calibri"), StandardFont::Helvetica);
        assert_eq!(map_font_name("TimesNewRomanPSMT"), StandardFont::TimesRoman);
        assert_eq!(map_font_name("Georgia"), StandardFont::TimesRoman);
        assert_eq!(map_font_name("CourierNewPSMT"), StandardFont::Courier);
        assert_eq!(map_font_name("DejaVuSansMono"), StandardFont::Courier);
        assert_eq!(map_font_name("SymbolMT"), StandardFont::Symbol);
        assert_eq!(map_font_name("ZapfDingbats"), StandardFont::ZapfDingbats);
        assert_eq!(map_font_name("F1"), StandardFont::Helvetica);
    }

    #[test]
    fn test_map_font_name_variants() {
        assert_eq!(map_font_name("Arial-BoldMT"), StandardFont::HelveticaBold);
        assert_eq!(
            map_font_name("Helvetica-BoldOblique"),
            StandardFont::HelveticaBoldOblique
        );
        assert_eq!(map_font_name("Times-Italic"), StandardFont::TimesItalic);
        assert_eq!(map_font_name("DejaVuSerif-Bold"), StandardFont::TimesBold);
        assert_eq!(StandardFont::TimesItalic.bold(), StandardFont::TimesBoldItalic);
        assert_eq!(StandardFont::Symbol.bold(), StandardFont::Symbol);
    }

    // ==== Metrics ====

    #[test]
    fn test_measure_uses_real_widths() {
        // "Hi" in Helvetica: H=722, i=222
        let width = StandardFont::Helvetica.measure("Hi", 10.0);
        assert!((width - 9.44).abs() < 1e-3);
        // Courier is fixed pitch
        assert!((StandardFont::Courier.measure("iiii", 10.0) - 24.0).abs() < 1e-3);
        // Bold is wider than regular
        assert!(
            StandardFont::HelveticaBold.measure("reading", 12.0)
                > StandardFont::Helvetica.measure("reading", 12.0)
        );
    }

    #[test]
    fn test_accented_letters_use_base_width() {
        assert_eq!(
            StandardFont::TimesRoman.char_width('é'),
            StandardFont::TimesRoman.char_width('e')
        );
        assert_eq!(StandardFont::Helvetica.char_width('\u{2014}'), 1000.0);
    }

    // ==== Encoding ====

    #[test]
    fn test_win_ansi_encoding() {
        let bytes = StandardFont::Helvetica.encode("café \u{2019}ok\u{2019}").unwrap();
        assert_eq!(bytes, b"caf\xE9 \x92ok\x92".to_vec());
        assert!(StandardFont::Helvetica.encode("日本").is_err());
        assert!(StandardFont::Symbol.encode("é").is_err());
        assert_eq!(StandardFont::Courier.encode("a\tb").unwrap(), b"a b".to_vec());
    }

    #[test]
    fn test_resource_names_are_unique() {
        let names: std::collections::HashSet<String> = [
            StandardFont::Helvetica,
            StandardFont::HelveticaBold,
            StandardFont::TimesRoman,
            StandardFont::ZapfDingbats,
        ]
        .iter()
        .map(|f| f.resource_name())
        .collect();
        assert_eq!(names.len(), 4);
        assert_eq!(StandardFont::HelveticaBold.resource_name(), "BnFHelveticaBold");
    }
}
