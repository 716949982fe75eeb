//! Text span extraction from page content streams.
//!
//! Walks the content operators of a page, tracking the graphics state
//! (`cm`, `q`/`Q`, fill colour) and the text state (`Tf`, `Tm`, `Td`, `TL`,
//! spacing), and emits one [`PageSpan`] per text-showing operator with its
//! position, measured extent and colour in user space.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{BTreeMap, BTreeSet};

use super::fonts::{map_font_name, StandardFont};
use crate::error::{Error, Result};
use crate::model::{PageSpan, Point, Rect, Rgb};

/// TJ adjustments beyond this (in 1/1000 em) are read as word spaces.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Structural summary of one page, used for method selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageSample {
    /// 1-based page number
    pub page_number: u32,
    /// Distinct base font names used by text
    pub fonts: BTreeSet<String>,
    /// Number of `BT ... ET` blocks
    pub text_blocks: usize,
    /// Number of non-blank text spans
    pub spans: usize,
    /// Number of XObjects painted (`Do`)
    pub images: usize,
}

/// Everything one walk over a page's operators produces.
#[derive(Debug, Default)]
pub(crate) struct PageScan {
    pub spans: Vec<PageSpan>,
    pub text_blocks: usize,
    pub fonts: BTreeSet<String>,
    pub images: usize,
}

/// Extract the text spans of a page in content order.
pub fn extract_page_spans(doc: &Document, page_id: ObjectId) -> Result<Vec<PageSpan>> {
    Ok(scan_page(doc, page_id)?.spans)
}

/// Summarize a page for method selection.
pub fn sample_page(doc: &Document, page_number: u32, page_id: ObjectId) -> Result<PageSample> {
    let scan = scan_page(doc, page_id)?;
    Ok(PageSample {
        page_number,
        fonts: scan.fonts,
        text_blocks: scan.text_blocks,
        spans: scan.spans.len(),
        images: scan.images,
    })
}

/// Check whether the document carries an interactive form.
pub fn has_interactive_form(doc: &Document) -> bool {
    doc.trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .and_then(|id| doc.get_dictionary(id))
        .map(|root| root.has(b"AcroForm"))
        .unwrap_or(false)
}

pub(crate) fn scan_page(doc: &Document, page_id: ObjectId) -> Result<PageScan> {
    let content = page_content(doc, page_id)?;
    let content = Content::decode(&content).map_err(|e| Error::Pdf(e.to_string()))?;
    scan_operations(doc, page_id, &content.operations)
}

/// Decoded bytes of a page's content streams, concatenated.
pub fn page_content(doc: &Document, page_id: ObjectId) -> Result<Vec<u8>> {
    let page = doc.get_dictionary(page_id)?;
    let contents = match page.get(b"Contents") {
        Ok(obj) => obj,
        Err(_) => return Ok(Vec::new()),
    };

    let refs: Vec<ObjectId> = match contents {
        Object::Reference(id) => match doc.get_object(*id)? {
            Object::Array(arr) => arr.iter().filter_map(|o| o.as_reference().ok()).collect(),
            _ => vec![*id],
        },
        Object::Array(arr) => arr.iter().filter_map(|o| o.as_reference().ok()).collect(),
        _ => return Err(Error::Pdf("Invalid content stream".to_string())),
    };

    let mut content = Vec::new();
    for id in refs {
        if let Ok(Object::Stream(stream)) = doc.get_object(id) {
            let data = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());
            content.extend_from_slice(&data);
            content.push(b'\n');
        }
    }
    Ok(content)
}

/// Walk decoded operators and collect spans with their operator index.
pub(crate) fn scan_operations(
    doc: &Document,
    page_id: ObjectId,
    operations: &[Operation],
) -> Result<PageScan> {
    let page_fonts = doc.get_page_fonts(page_id)?;
    let mut fonts: BTreeMap<Vec<u8>, FontInfo> = BTreeMap::new();
    for (key, dict) in &page_fonts {
        fonts.insert(key.clone(), FontInfo::from_dict(doc, dict));
    }

    let mut scan = PageScan::default();
    let mut gs = GraphicsState::default();
    let mut stack: Vec<GraphicsState> = Vec::new();
    let mut ts = TextState::default();
    let mut in_text = false;

    for (index, op) in operations.iter().enumerate() {
        let operands = &op.operands;
        match op.operator.as_str() {
            "q" => stack.push(gs),
            "Q" => {
                if let Some(saved) = stack.pop() {
                    gs = saved;
                }
            }
            "cm" => {
                if let Some(m) = matrix_operands(operands) {
                    gs.ctm = m.then(&gs.ctm);
                }
            }
            "rg" | "g" | "k" | "sc" | "scn" => {
                if let Some(color) = color_operands(operands) {
                    gs.fill = color;
                }
            }
            "Do" => scan.images += 1,
            "BT" => {
                in_text = true;
                scan.text_blocks += 1;
                ts.matrix = Matrix::IDENTITY;
                ts.line_matrix = Matrix::IDENTITY;
            }
            "ET" => in_text = false,
            "Tf" => {
                if let Some(Object::Name(name)) = operands.first() {
                    ts.font = name.clone();
                }
                ts.font_size = operands.get(1).and_then(get_number).unwrap_or(12.0);
            }
            "Tc" => ts.char_spacing = operands.first().and_then(get_number).unwrap_or(0.0),
            "Tw" => ts.word_spacing = operands.first().and_then(get_number).unwrap_or(0.0),
            "Tz" => ts.h_scale = operands.first().and_then(get_number).unwrap_or(100.0) / 100.0,
            "TL" => ts.leading = operands.first().and_then(get_number).unwrap_or(0.0),
            "Td" | "TD" => {
                let tx = operands.first().and_then(get_number).unwrap_or(0.0);
                let ty = operands.get(1).and_then(get_number).unwrap_or(0.0);
                if op.operator == "TD" {
                    ts.leading = -ty;
                }
                ts.move_line(tx, ty);
            }
            "Tm" => {
                if let Some(m) = matrix_operands(operands) {
                    ts.matrix = m;
                    ts.line_matrix = m;
                }
            }
            "T*" => ts.next_line(),
            "Tj" | "TJ" | "'" | "\"" => {
                if op.operator == "'" {
                    ts.next_line();
                }
                if op.operator == "\"" {
                    ts.word_spacing = operands.first().and_then(get_number).unwrap_or(0.0);
                    ts.char_spacing = operands.get(1).and_then(get_number).unwrap_or(0.0);
                    ts.next_line();
                }
                if !in_text {
                    continue;
                }
                let font = fonts.get(&ts.font);
                if let Some(span) = show_text(doc, op, font, &mut ts, &gs) {
                    if !span.is_blank() {
                        scan.fonts.insert(span.font_name.clone());
                        scan.spans.push(span.with_source_op(index));
                    }
                }
            }
            _ => {}
        }
    }

    Ok(scan)
}

/// Decode one text-showing operator, advance the text matrix and build the span.
fn show_text(
    doc: &Document,
    op: &Operation,
    font: Option<&FontInfo>,
    ts: &mut TextState,
    gs: &GraphicsState,
) -> Option<PageSpan> {
    let start = ts.matrix;
    let mut text = String::new();
    let mut shift = 0.0_f32;

    let pieces: Vec<&Object> = match op.operator.as_str() {
        "TJ" => match op.operands.first() {
            Some(Object::Array(arr)) => arr.iter().collect(),
            _ => return None,
        },
        "\"" => op.operands.get(2).into_iter().collect(),
        _ => op.operands.first().into_iter().collect(),
    };

    for piece in pieces {
        match piece {
            Object::String(bytes, _) => {
                let decoded = decode_with_font(doc, font, bytes);
                let advance = ts.advance_for(font, bytes, &decoded);
                ts.matrix = Matrix::translate(advance, 0.0).then(&ts.matrix);
                shift += advance;
                text.push_str(&decoded);
            }
            other => {
                if let Some(adjust) = get_number(other) {
                    let advance = -adjust / 1000.0 * ts.font_size * ts.h_scale;
                    ts.matrix = Matrix::translate(advance, 0.0).then(&ts.matrix);
                    shift += advance;
                    if -adjust > TJ_SPACE_THRESHOLD && needs_space(&text) {
                        text.push(' ');
                    }
                }
            }
        }
    }

    let trm_start = start.then(&gs.ctm);
    let trm_end = ts.matrix.then(&gs.ctm);
    let size = ts.font_size * trm_start.vertical_scale();
    let (ascent, descent) = font
        .map(|f| (f.ascent, f.descent))
        .unwrap_or_else(|| StandardFont::Helvetica.metrics());

    let (x0, y0) = trm_start.apply(0.0, 0.0);
    let (x1, _) = trm_end.apply(0.0, 0.0);
    let bbox = Rect::new(
        x0,
        y0 + descent / 1000.0 * size,
        x1,
        y0 + ascent / 1000.0 * size,
    );
    let font_name = font
        .map(|f| f.base_name.clone())
        .unwrap_or_else(|| String::from_utf8_lossy(&ts.font).to_string());

    let scale = ts.font_size * ts.h_scale;
    let tj_advance = if scale.abs() > f32::EPSILON {
        -shift * 1000.0 / scale
    } else {
        0.0
    };

    Some(
        PageSpan::new(text, Point::new(x0, y0), bbox, size, font_name)
            .with_color(gs.fill)
            .with_source_advance(tj_advance),
    )
}

fn needs_space(text: &str) -> bool {
    match text.chars().last() {
        Some(c) => !c.is_whitespace() && !is_spaceless_script_char(c),
        None => false,
    }
}

fn decode_with_font(doc: &Document, font: Option<&FontInfo>, bytes: &[u8]) -> String {
    if let Some(dict) = font.and_then(|f| f.dict.as_ref()) {
        if let Ok(encoding) = dict.get_font_encoding(doc) {
            if let Ok(text) = Document::decode_text(&encoding, bytes) {
                return text;
            }
        }
    }
    decode_text_simple(bytes)
}

/// Font facts needed for measuring shown text.
#[derive(Debug, Clone)]
struct FontInfo {
    base_name: String,
    dict: Option<Dictionary>,
    first_char: u32,
    widths: Vec<f32>,
    missing_width: f32,
    two_byte: bool,
    substitute: StandardFont,
    ascent: f32,
    descent: f32,
}

impl FontInfo {
    fn from_dict(doc: &Document, dict: &Dictionary) -> Self {
        let base_name = dict
            .get(b"BaseFont")
            .and_then(Object::as_name)
            .map(|n| String::from_utf8_lossy(n).to_string())
            .unwrap_or_else(|_| "Unknown".to_string());
        let substitute = map_font_name(&base_name);
        let two_byte = dict
            .get(b"Subtype")
            .and_then(Object::as_name)
            .map(|s| s == b"Type0")
            .unwrap_or(false);

        let first_char = dict
            .get(b"FirstChar")
            .ok()
            .and_then(get_number)
            .map(|n| n.max(0.0) as u32)
            .unwrap_or(0);
        let widths = dict
            .get(b"Widths")
            .ok()
            .map(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_array().ok())
            .map(|arr| arr.iter().map(|w| get_number(resolve(doc, w)).unwrap_or(0.0)).collect())
            .unwrap_or_default();

        let descriptor = dict
            .get(b"FontDescriptor")
            .ok()
            .map(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_dict().ok());
        let (default_ascent, default_descent) = substitute.metrics();
        let read = |key: &[u8]| descriptor.and_then(|d| d.get(key).ok()).and_then(get_number);
        let ascent = read(b"Ascent").filter(|a| *a > 0.0).unwrap_or(default_ascent);
        let descent = read(b"Descent").filter(|d| *d < 0.0).unwrap_or(default_descent);
        let missing_width = read(b"MissingWidth").unwrap_or(0.0);

        Self {
            base_name,
            dict: Some(dict.clone()),
            first_char,
            widths,
            missing_width,
            two_byte,
            substitute,
            ascent,
            descent,
        }
    }

    /// Width of the shown bytes in 1/1000 em.
    fn glyph_units(&self, bytes: &[u8], decoded: &str) -> f32 {
        if self.two_byte || self.widths.is_empty() {
            return self.substitute.measure(decoded, 1000.0);
        }
        bytes
            .iter()
            .map(|&b| {
                let code = u32::from(b);
                code.checked_sub(self.first_char)
                    .and_then(|i| self.widths.get(i as usize))
                    .copied()
                    .unwrap_or(self.missing_width)
            })
            .sum()
    }
}

#[derive(Debug, Clone, Copy)]
struct GraphicsState {
    ctm: Matrix,
    fill: Rgb,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            fill: Rgb::BLACK,
        }
    }
}

#[derive(Debug, Clone)]
struct TextState {
    matrix: Matrix,
    line_matrix: Matrix,
    font: Vec<u8>,
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    h_scale: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            font: Vec::new(),
            font_size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scale: 1.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translate(tx, ty).then(&self.line_matrix);
        self.matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        // Without TL the leading is zero in the PDF model; fall back to the font size.
        let leading = if self.leading != 0.0 {
            self.leading
        } else {
            self.font_size
        };
        self.move_line(0.0, -leading);
    }

    /// Horizontal advance in text space for a shown string.
    fn advance_for(&self, font: Option<&FontInfo>, bytes: &[u8], decoded: &str) -> f32 {
        let units = match font {
            Some(f) => f.glyph_units(bytes, decoded),
            None => StandardFont::Helvetica.measure(decoded, 1000.0),
        };
        let glyphs = decoded.chars().count() as f32;
        let spaces = decoded.chars().filter(|c| *c == ' ').count() as f32;
        (units / 1000.0 * self.font_size + glyphs * self.char_spacing + spaces * self.word_spacing)
            * self.h_scale
    }
}

/// Affine matrix `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    pub(crate) const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    fn translate(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self × other`: apply `self` first, then `other`.
    fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

fn matrix_operands(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let n: Vec<f32> = operands.iter().take(6).filter_map(get_number).collect();
    if n.len() == 6 {
        Some(Matrix::new(n[0], n[1], n[2], n[3], n[4], n[5]))
    } else {
        None
    }
}

fn color_operands(operands: &[Object]) -> Option<Rgb> {
    let n: Vec<f32> = operands.iter().filter_map(get_number).collect();
    match n.as_slice() {
        [g] => Some(Rgb::gray(*g)),
        [r, g, b] => Some(Rgb::new(*r, *g, *b)),
        [c, m, y, k] => Some(Rgb::from_cmyk(*c, *m, *y, *k)),
        _ => None,
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Helper to extract number from PDF object.
pub(crate) fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Chinese and Japanese scripts do not separate words with spaces.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        || (0x3040..=0x30FF).contains(&code)
        || (0x3000..=0x303F).contains(&code)
}

/// Fallback decoding when the font has no usable encoding.
fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::test_support::one_page_doc;

    // ==== Positions ====

    #[test]
    fn test_spans_with_positions() {
        let (doc, page) = one_page_doc(
            b"BT /F1 12 Tf 72 700 Td (Hello world) Tj 0 -20 Td (Second line) Tj ET",
        );
        let spans = extract_page_spans(&doc, page).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Hello world");
        assert_eq!(spans[0].origin, Point::new(72.0, 700.0));
        assert_eq!(spans[0].font_name, "Helvetica");
        assert_eq!(spans[0].font_size, 12.0);
        assert_eq!(spans[1].origin, Point::new(72.0, 680.0));

        let width = StandardFont::Helvetica.measure("Hello world", 12.0);
        assert!((spans[0].bbox.width() - width).abs() < 0.01);
        assert!(spans[0].bbox.y0 < 700.0 && spans[0].bbox.y1 > 700.0);
    }

    #[test]
    fn test_consecutive_shows_advance() {
        let (doc, page) = one_page_doc(b"BT /F1 10 Tf 100 500 Td (Hi) Tj (there) Tj ET");
        let spans = extract_page_spans(&doc, page).unwrap();
        assert_eq!(spans.len(), 2);
        let advance = StandardFont::Helvetica.measure("Hi", 10.0);
        assert!((spans[1].origin.x - (100.0 + advance)).abs() < 0.01);
    }

    #[test]
    fn test_ctm_and_tm_scale() {
        let (doc, page) =
            one_page_doc(b"q 2 0 0 2 10 10 cm BT /F1 6 Tf 1 0 0 1 5 5 Tm (Scaled) Tj ET Q");
        let spans = extract_page_spans(&doc, page).unwrap();
        assert_eq!(spans[0].origin, Point::new(20.0, 20.0));
        assert_eq!(spans[0].font_size, 12.0);
    }

    #[test]
    fn test_leading_and_quote_operator() {
        let (doc, page) = one_page_doc(b"BT /F1 10 Tf 14 TL 50 400 Td (One) Tj (Two) ' ET");
        let spans = extract_page_spans(&doc, page).unwrap();
        assert_eq!(spans[1].text, "Two");
        assert_eq!(spans[1].origin, Point::new(50.0, 386.0));
    }

    // ==== Text and colour ====

    #[test]
    fn test_tj_array_spacing() {
        let (doc, page) =
            one_page_doc(b"BT /F1 12 Tf 0 0 Td [(Bionic) -250 (reading) 30 (!)] TJ ET");
        let spans = extract_page_spans(&doc, page).unwrap();
        assert_eq!(spans[0].text, "Bionic reading!");
        assert_eq!(spans[0].source_op, Some(3));
    }

    #[test]
    fn test_fill_color_tracked_through_q() {
        let (doc, page) = one_page_doc(
            b"q 1 0 0 rg BT /F1 12 Tf 0 0 Td (Red) Tj ET Q BT /F1 12 Tf 0 20 Td (Black) Tj ET",
        );
        let spans = extract_page_spans(&doc, page).unwrap();
        assert_eq!(spans[0].color, Rgb::new(1.0, 0.0, 0.0));
        assert_eq!(spans[1].color, Rgb::BLACK);
    }

    #[test]
    fn test_blank_and_outside_text_ignored() {
        let (doc, page) = one_page_doc(b"(stray) Tj BT /F1 12 Tf (   ) Tj ET");
        assert!(extract_page_spans(&doc, page).unwrap().is_empty());
    }

    // ==== Sampling ====

    #[test]
    fn test_sample_page_counts() {
        let (doc, page) = one_page_doc(
            b"BT /F1 12 Tf 0 0 Td (A line) Tj ET BT /F1 12 Tf 0 20 Td (Another) Tj ET /Im1 Do",
        );
        let sample = sample_page(&doc, 1, page).unwrap();
        assert_eq!(sample.text_blocks, 2);
        assert_eq!(sample.spans, 2);
        assert_eq!(sample.images, 1);
        assert_eq!(sample.fonts.len(), 1);
        assert!(!has_interactive_form(&doc));
    }

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x41]), "A");
        assert_eq!(decode_text_simple(&[0x63, 0x61, 0x66, 0xE9]), "café");
    }
}
