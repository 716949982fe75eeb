//! Drawing surface for rewritten pages.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use super::extract::page_content;
use super::fonts::StandardFont;
use crate::error::{Error, Result};
use crate::model::{PageSpan, Point, Rect, Rgb};

/// A text span to take off the page during redaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RedactionArea {
    /// Area painted over once the text is removed
    pub rect: Rect,
    /// Index of the text-showing operator in the page's decoded content
    pub source_op: Option<usize>,
    /// `TJ` number that moves the text position as far as the removed
    /// operator did
    pub advance: f32,
}

impl RedactionArea {
    /// An area with no operator behind it; only the paint is applied.
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            source_op: None,
            advance: 0.0,
        }
    }

    /// The area covering `span`, removing the operator that showed it.
    pub fn for_span(span: &PageSpan, rect: Rect) -> Self {
        Self {
            rect,
            source_op: span.source_op,
            advance: span.source_advance,
        }
    }
}

/// Operations the reconstruction engine needs from a page.
pub trait PageCanvas {
    /// Paint a filled rectangle over existing content.
    fn cover(&mut self, rect: Rect, fill: Rgb) -> Result<()>;

    /// Remove the text operators behind `areas`, then paint the areas
    /// with `fill`. Text not listed stays on the page.
    fn redact(&mut self, areas: &[RedactionArea], fill: Rgb) -> Result<()>;

    /// Width of `text` in `font` at `size` points.
    fn measure(&self, text: &str, font: StandardFont, size: f32) -> Result<f32>;

    /// Draw `text` with its baseline starting at `origin`.
    fn draw_text(
        &mut self,
        origin: Point,
        text: &str,
        font: StandardFont,
        size: f32,
        color: Rgb,
    ) -> Result<()>;
}

/// [`PageCanvas`] over one page of a lopdf document.
///
/// Drawing operations are buffered and written by [`LopdfCanvas::finish`]
/// as one new compressed content stream. The original content is wrapped
/// in `q`/`Q` so its graphics state does not leak into the new stream.
pub struct LopdfCanvas<'a> {
    doc: &'a mut Document,
    page_id: ObjectId,
    operations: Vec<Operation>,
    fonts: BTreeSet<StandardFont>,
}

impl<'a> LopdfCanvas<'a> {
    pub fn new(doc: &'a mut Document, page_id: ObjectId) -> Self {
        Self {
            doc,
            page_id,
            operations: Vec::new(),
            fonts: BTreeSet::new(),
        }
    }

    /// Number of buffered drawing operations.
    pub fn pending_operations(&self) -> usize {
        self.operations.len()
    }

    /// Write buffered operations and font resources into the page.
    pub fn finish(self) -> Result<()> {
        if self.operations.is_empty() {
            return Ok(());
        }
        let LopdfCanvas {
            doc,
            page_id,
            mut operations,
            fonts,
        } = self;

        register_fonts(doc, page_id, &fonts)?;

        operations.insert(0, Operation::new("Q", vec![]));
        let ours = Content { operations }
            .encode()
            .map_err(|e| Error::Pdf(e.to_string()))?;
        let save_id = doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
        let ours_id = doc.add_object(compressed_stream(&ours)?);

        let mut contents: Vec<Object> = vec![save_id.into()];
        contents.extend(content_refs(doc, page_id)?.into_iter().map(Object::from));
        contents.push(ours_id.into());
        doc.get_dictionary_mut(page_id)?
            .set("Contents", Object::Array(contents));
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, fill: Rgb) {
        self.operations.extend([
            Operation::new("rg", rgb_operands(fill)),
            Operation::new(
                "re",
                vec![
                    Object::Real(rect.x0),
                    Object::Real(rect.y0),
                    Object::Real(rect.width()),
                    Object::Real(rect.height()),
                ],
            ),
            Operation::new("f", vec![]),
        ]);
    }
}

impl PageCanvas for LopdfCanvas<'_> {
    fn cover(&mut self, rect: Rect, fill: Rgb) -> Result<()> {
        self.fill_rect(rect, fill);
        Ok(())
    }

    fn redact(&mut self, areas: &[RedactionArea], fill: Rgb) -> Result<()> {
        if areas.is_empty() {
            return Ok(());
        }
        let content = page_content(self.doc, self.page_id)?;
        let content = Content::decode(&content).map_err(|e| Error::Pdf(e.to_string()))?;

        let mut targets: BTreeMap<usize, f32> = BTreeMap::new();
        for area in areas {
            let Some(index) = area.source_op else { continue };
            match content.operations.get(index) {
                Some(op) if is_text_showing(&op.operator) => {
                    targets.insert(index, area.advance);
                }
                _ => log::warn!(
                    "Operator {} on page {:?} does not show text, leaving it",
                    index,
                    self.page_id
                ),
            }
        }

        let mut kept = Vec::with_capacity(content.operations.len());
        for (index, op) in content.operations.into_iter().enumerate() {
            let Some(&advance) = targets.get(&index) else {
                kept.push(op);
                continue;
            };
            // Keep the line movement of ' and " without their text.
            match op.operator.as_str() {
                "'" => kept.push(Operation::new("T*", vec![])),
                "\"" => {
                    let mut operands = op.operands.into_iter();
                    if let (Some(aw), Some(ac)) = (operands.next(), operands.next()) {
                        kept.push(Operation::new("Tw", vec![aw]));
                        kept.push(Operation::new("Tc", vec![ac]));
                    }
                    kept.push(Operation::new("T*", vec![]));
                }
                _ => {}
            }
            // Later text on the same line keeps its position.
            if advance != 0.0 {
                kept.push(Operation::new(
                    "TJ",
                    vec![Object::Array(vec![Object::Real(advance)])],
                ));
            }
        }
        log::debug!(
            "Redacted {} text operator(s) on page {:?}",
            targets.len(),
            self.page_id
        );

        let encoded = Content { operations: kept }
            .encode()
            .map_err(|e| Error::Pdf(e.to_string()))?;
        let stream_id = self.doc.add_object(compressed_stream(&encoded)?);
        self.doc
            .get_dictionary_mut(self.page_id)?
            .set("Contents", Object::Reference(stream_id));

        for area in areas {
            self.fill_rect(area.rect, fill);
        }
        Ok(())
    }

    fn measure(&self, text: &str, font: StandardFont, size: f32) -> Result<f32> {
        font.encode(text)?;
        Ok(font.measure(text, size))
    }

    fn draw_text(
        &mut self,
        origin: Point,
        text: &str,
        font: StandardFont,
        size: f32,
        color: Rgb,
    ) -> Result<()> {
        let bytes = font.encode(text)?;
        self.fonts.insert(font);
        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(font.resource_name().into_bytes()),
                    Object::Real(size),
                ],
            ),
            Operation::new("rg", rgb_operands(color)),
            Operation::new(
                "Tm",
                vec![
                    1.into(),
                    0.into(),
                    0.into(),
                    1.into(),
                    Object::Real(origin.x),
                    Object::Real(origin.y),
                ],
            ),
            Operation::new("Tj", vec![Object::String(bytes, StringFormat::Hexadecimal)]),
            Operation::new("ET", vec![]),
        ]);
        Ok(())
    }
}

fn is_text_showing(operator: &str) -> bool {
    matches!(operator, "Tj" | "TJ" | "'" | "\"")
}

fn rgb_operands(color: Rgb) -> Vec<Object> {
    vec![
        Object::Real(color.r),
        Object::Real(color.g),
        Object::Real(color.b),
    ]
}

fn compressed_stream(content: &[u8]) -> Result<Stream> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content)?;
    let compressed = encoder.finish()?;
    Ok(Stream::new(
        dictionary! { "Filter" => "FlateDecode" },
        compressed,
    ))
}

/// References of the page's current content streams.
fn content_refs(doc: &Document, page_id: ObjectId) -> Result<Vec<ObjectId>> {
    let page = doc.get_dictionary(page_id)?;
    let refs = match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id)? {
            Object::Array(arr) => arr.iter().filter_map(|o| o.as_reference().ok()).collect(),
            _ => vec![*id],
        },
        Ok(Object::Array(arr)) => arr.iter().filter_map(|o| o.as_reference().ok()).collect(),
        _ => Vec::new(),
    };
    Ok(refs)
}

/// Add Base-14 font entries to the page's own resource dictionary.
///
/// Inherited or shared resources are copied into the page first so other
/// pages are not touched.
fn register_fonts(
    doc: &mut Document,
    page_id: ObjectId,
    fonts: &BTreeSet<StandardFont>,
) -> Result<()> {
    if fonts.is_empty() {
        return Ok(());
    }
    let mut resources = inherited_resources(doc, page_id)?;
    let mut font_dict = match resources.get(b"Font") {
        Ok(Object::Dictionary(d)) => d.clone(),
        Ok(Object::Reference(id)) => doc.get_dictionary(*id).cloned().unwrap_or_default(),
        _ => Dictionary::new(),
    };

    for font in fonts {
        let mut dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_name(),
        };
        if font.uses_win_ansi() {
            dict.set("Encoding", "WinAnsiEncoding");
        }
        let id = doc.add_object(dict);
        font_dict.set(font.resource_name(), Object::Reference(id));
    }

    resources.set("Font", Object::Dictionary(font_dict));
    doc.get_dictionary_mut(page_id)?
        .set("Resources", Object::Dictionary(resources));
    Ok(())
}

fn inherited_resources(doc: &Document, page_id: ObjectId) -> Result<Dictionary> {
    let mut current = Some(page_id);
    // Page trees are shallow; the bound guards against Parent cycles.
    for _ in 0..32 {
        let Some(id) = current else { break };
        let node = doc.get_dictionary(id)?;
        match node.get(b"Resources") {
            Ok(Object::Dictionary(d)) => return Ok(d.clone()),
            Ok(Object::Reference(rid)) => return Ok(doc.get_dictionary(*rid)?.clone()),
            _ => {}
        }
        current = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    Ok(Dictionary::new())
}
