//! Erase-and-redraw reconstruction of PDF pages.

use log::{debug, info, warn};
use lopdf::Document;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::canvas::{LopdfCanvas, PageCanvas, RedactionArea};
use super::extract::{extract_page_spans, has_interactive_form, sample_page};
use super::fonts::{map_font_name, StandardFont};
use super::quality::QualityMetrics;
use super::strategy::{select_method_with, MethodAnalysis, PdfMethod, SelectionThresholds};
use crate::error::{Error, Result};
use crate::model::{ElementContext, PageSpan, Point, Rect, Rgb, TextUnit};
use crate::pipeline::Pipeline;
use crate::split::PlannedSegment;

/// Offsets (in points) at which emphasized runs are overdrawn.
pub const BOLD_OFFSETS: [(f32, f32); 4] = [(0.0, 0.0), (0.5, 0.0), (0.0, 0.3), (0.5, 0.3)];

/// Options for PDF reconstruction.
#[derive(Debug, Clone)]
pub struct PdfOptions {
    /// Rewrite method; `Auto` samples the document
    pub method: PdfMethod,
    /// Number of leading pages sampled by `Auto`
    pub sample_pages: usize,
    /// Extra margin above and below span boxes when erasing
    pub cover_padding: f32,
    /// Primary results at or below this success rate trigger the fallback method
    pub min_success_rate: f32,
    /// Draw emphasis with a real bold face instead of overdrawing
    pub true_bold: bool,
    pub thresholds: SelectionThresholds,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            method: PdfMethod::Auto,
            sample_pages: 3,
            cover_padding: 1.0,
            min_success_rate: 0.1,
            true_bold: false,
            thresholds: SelectionThresholds::default(),
        }
    }
}

impl PdfOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: PdfMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_sample_pages(mut self, pages: usize) -> Self {
        self.sample_pages = pages.max(1);
        self
    }

    pub fn with_cover_padding(mut self, padding: f32) -> Self {
        self.cover_padding = padding.max(0.0);
        self
    }

    pub fn with_min_success_rate(mut self, rate: f32) -> Self {
        self.min_success_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_true_bold(mut self, enabled: bool) -> Self {
        self.true_bold = enabled;
        self
    }

    pub fn with_thresholds(mut self, thresholds: SelectionThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

/// Result of rewriting a PDF.
#[derive(Debug, Clone, Serialize)]
pub struct PdfOutcome {
    /// Where the rewritten document was saved; `None` for in-memory rewrites
    pub output_path: Option<PathBuf>,
    /// `"morphing"`, `"redaction"` or `"<primary> -> <fallback> (fallback)"`
    pub method_used: String,
    pub quality_metrics: QualityMetrics,
    /// Sampling result when the method was chosen automatically
    pub analysis: Option<MethodAnalysis>,
    pub processing_time: Duration,
}

/// A contiguous piece of span text drawn in one style.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Run {
    pub text: String,
    pub emphasized: bool,
}

/// Rewrites PDF pages with bionic emphasis.
///
/// Text decisions come from the wrapped [`Pipeline`]; each span is erased
/// and redrawn in a standard substitute font.
#[derive(Debug, Clone)]
pub struct SpatialEngine {
    pipeline: Pipeline,
    options: PdfOptions,
}

impl SpatialEngine {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            options: PdfOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PdfOptions) -> Self {
        self.options = options;
        self
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn options(&self) -> &PdfOptions {
        &self.options
    }

    /// Sample the first pages and choose a method.
    pub fn analyze(&self, doc: &Document) -> (PdfMethod, MethodAnalysis) {
        let samples: Vec<_> = doc
            .get_pages()
            .into_iter()
            .take(self.options.sample_pages)
            .filter_map(|(number, id)| match sample_page(doc, number, id) {
                Ok(sample) => Some(sample),
                Err(e) => {
                    warn!("Could not sample page {}: {}", number, e);
                    None
                }
            })
            .collect();
        select_method_with(&samples, has_interactive_form(doc), &self.options.thresholds)
    }

    /// Load a PDF and choose a method without rewriting it.
    pub fn analyze_file(&self, input: &Path) -> Result<(PdfMethod, MethodAnalysis)> {
        let doc = Document::load(input)?;
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(self.analyze(&doc))
    }

    /// Rewrite a PDF file and save the result.
    pub fn process_file(&self, input: &Path, output: &Path) -> Result<PdfOutcome> {
        let doc = Document::load(input)?;
        let (mut rewritten, mut outcome) = self.rewrite(&doc)?;
        rewritten.save(output)?;
        info!(
            "Wrote {} using {}: {}",
            output.display(),
            outcome.method_used,
            outcome.quality_metrics
        );
        outcome.output_path = Some(output.to_path_buf());
        Ok(outcome)
    }

    /// Rewrite a PDF held in memory.
    pub fn process_bytes(&self, data: &[u8]) -> Result<(Vec<u8>, PdfOutcome)> {
        let doc = Document::load_mem(data)?;
        let (mut rewritten, outcome) = self.rewrite(&doc)?;
        let mut bytes = Vec::new();
        rewritten.save_to(&mut bytes)?;
        Ok((bytes, outcome))
    }

    /// Rewrite a loaded document, leaving the input untouched.
    ///
    /// The primary method runs on a copy of `doc`; if it errors or its
    /// success rate is too low, the other method runs on a fresh copy.
    pub fn rewrite(&self, doc: &Document) -> Result<(Document, PdfOutcome)> {
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        let start = Instant::now();
        let (primary, analysis) = match self.options.method {
            PdfMethod::Auto => {
                let (method, analysis) = self.analyze(doc);
                (method, Some(analysis))
            }
            method => (method, None),
        };

        let (document, quality_metrics, method_used) =
            run_with_fallback(primary, self.options.min_success_rate, |method| {
                let mut copy = doc.clone();
                let metrics = self.run_method(&mut copy, method)?;
                Ok((copy, metrics))
            })?;

        let outcome = PdfOutcome {
            output_path: None,
            method_used,
            quality_metrics,
            analysis,
            processing_time: start.elapsed(),
        };
        Ok((document, outcome))
    }

    /// Apply one method to every page of `doc`.
    pub fn run_method(&self, doc: &mut Document, method: PdfMethod) -> Result<QualityMetrics> {
        let mut total = QualityMetrics::new();
        for (number, page_id) in doc.get_pages() {
            let spans = match extract_page_spans(doc, page_id) {
                Ok(spans) => spans,
                Err(e) => {
                    warn!("Skipping page {}: {}", number, e);
                    continue;
                }
            };
            let mut canvas = LopdfCanvas::new(doc, page_id);
            let page_metrics = self.process_page(&mut canvas, &spans, method);
            canvas.finish()?;
            debug!("Page {} ({}): {}", number, method, page_metrics);
            total.merge(&page_metrics);
        }
        Ok(total)
    }

    /// Rewrite the spans of one page on `canvas`.
    ///
    /// Span failures are isolated: a span whose emphasized runs cannot be
    /// drawn is redrawn as plain original text, and only counts as failed
    /// when that also fails.
    pub fn process_page<C: PageCanvas>(
        &self,
        canvas: &mut C,
        spans: &[PageSpan],
        method: PdfMethod,
    ) -> QualityMetrics {
        let mut metrics = QualityMetrics {
            pages_processed: 1,
            ..Default::default()
        };
        let mut batched: Vec<(&PageSpan, Vec<Run>, StandardFont)> = Vec::new();

        for span in spans {
            let Some(runs) = self.plan_span(span) else {
                metrics.spans_skipped += 1;
                continue;
            };
            metrics.spans_attempted += 1;
            let font = map_font_name(&span.font_name);

            if method == PdfMethod::Redaction {
                batched.push((span, runs, font));
                continue;
            }
            if let Err(e) = canvas.cover(self.erase_rect(span), Rgb::WHITE) {
                warn!("Could not erase span {:?}: {}", span.text, e);
                metrics.spans_failed += 1;
                continue;
            }
            self.redraw(canvas, span, &runs, font, span.origin, &mut metrics);
        }

        if batched.is_empty() {
            return metrics;
        }
        let areas: Vec<RedactionArea> = batched
            .iter()
            .map(|(span, _, _)| RedactionArea::for_span(span, self.erase_rect(span)))
            .collect();
        if let Err(e) = canvas.redact(&areas, Rgb::WHITE) {
            warn!("Redaction of {} span(s) failed: {}", areas.len(), e);
            metrics.spans_failed += batched.len();
            return metrics;
        }
        for (span, runs, font) in &batched {
            let (_, descent) = font.metrics();
            let origin = Point::new(
                span.bbox.x0,
                span.bbox.y0 + descent.abs() * span.font_size / 1000.0,
            );
            self.redraw(canvas, span, runs, *font, origin, &mut metrics);
        }
        metrics
    }

    /// Area painted over a span. Padding is vertical only: the next span
    /// on the line starts at this one's right edge.
    fn erase_rect(&self, span: &PageSpan) -> Rect {
        span.bbox.padded_vertically(self.options.cover_padding)
    }

    /// Draw a span with emphasis, falling back to its original text.
    fn redraw<C: PageCanvas>(
        &self,
        canvas: &mut C,
        span: &PageSpan,
        runs: &[Run],
        font: StandardFont,
        origin: Point,
        metrics: &mut QualityMetrics,
    ) {
        match self.draw_runs(canvas, span, runs, font, origin) {
            Ok(()) => metrics.spans_enhanced += 1,
            Err(e) => {
                debug!("Emphasis failed for {:?}: {}", span.text, e);
                match canvas.draw_text(origin, &span.text, font, span.font_size, span.color) {
                    Ok(()) => metrics.spans_fallback += 1,
                    Err(e) => {
                        warn!("Could not redraw span {:?}: {}", span.text, e);
                        metrics.spans_failed += 1;
                    }
                }
            }
        }
    }

    fn draw_runs<C: PageCanvas>(
        &self,
        canvas: &mut C,
        span: &PageSpan,
        runs: &[Run],
        font: StandardFont,
        origin: Point,
    ) -> Result<()> {
        let size = span.font_size;
        let bold = if self.options.true_bold { font.bold() } else { font };
        let face = |run: &Run| if run.emphasized { bold } else { font };

        // Measure everything before drawing so a bad run leaves no partial output.
        let widths = runs
            .iter()
            .map(|run| canvas.measure(&run.text, face(run), size))
            .collect::<Result<Vec<f32>>>()?;

        let mut x = origin.x;
        for (run, width) in runs.iter().zip(widths) {
            if run.emphasized && !self.options.true_bold {
                for (dx, dy) in BOLD_OFFSETS {
                    canvas.draw_text(
                        Point::new(x + dx, origin.y + dy),
                        &run.text,
                        font,
                        size,
                        span.color,
                    )?;
                }
            } else {
                canvas.draw_text(Point::new(x, origin.y), &run.text, face(run), size, span.color)?;
            }
            x += width;
        }
        Ok(())
    }

    /// Decide emphasis for a span; `None` when nothing would be emphasized.
    pub(crate) fn plan_span(&self, span: &PageSpan) -> Option<Vec<Run>> {
        let context = ElementContext::new()
            .with_font_size(span.font_size)
            .with_bold(span.flags.bold);
        let unit = TextUnit::new(span.text.clone()).with_context(context);

        let (decision, segments) = match self.pipeline.analyze(&unit) {
            Ok(analysis) => analysis,
            Err(e) => {
                debug!("Leaving span {:?} untouched: {}", span.text, e);
                return None;
            }
        };
        let strength = self
            .pipeline
            .config()
            .strategy
            .apply(decision.strength, decision.confidence);
        if !decision.should_process || strength <= 0.0 {
            return None;
        }

        let runs = build_runs(&self.pipeline.splitter().plan(segments, strength));
        if runs.iter().any(|r| r.emphasized) {
            Some(runs)
        } else {
            None
        }
    }
}

/// Collapse a word plan into alternating plain and emphasized runs.
pub(crate) fn build_runs(plan: &[PlannedSegment]) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    let mut push = |text: &str, emphasized: bool| {
        if text.is_empty() {
            return;
        }
        match runs.last_mut() {
            Some(last) if last.emphasized == emphasized => last.text.push_str(text),
            _ => runs.push(Run {
                text: text.to_string(),
                emphasized,
            }),
        }
    };
    for (segment, split) in plan {
        match split {
            Some(split) => {
                push(&split.prefix, true);
                push(&split.suffix, false);
            }
            None => push(&segment.text, false),
        }
    }
    runs
}

/// Run `primary`, then its fallback method when it fails or scores too low.
///
/// Returns the accepted value, its metrics and the `method_used` label.
pub(crate) fn run_with_fallback<T, F>(
    primary: PdfMethod,
    min_success_rate: f32,
    mut run: F,
) -> Result<(T, QualityMetrics, String)>
where
    F: FnMut(PdfMethod) -> Result<(T, QualityMetrics)>,
{
    let primary_failure = match run(primary) {
        Ok((value, metrics)) => {
            if metrics.spans_attempted > 0 && metrics.success_rate() <= min_success_rate {
                format!(
                    "success rate {:.2} at or below {:.2}",
                    metrics.success_rate(),
                    min_success_rate
                )
            } else {
                return Ok((value, metrics, primary.as_str().to_string()));
            }
        }
        Err(e) => e.to_string(),
    };

    let fallback = primary.fallback();
    warn!("{} failed ({}), retrying with {}", primary, primary_failure, fallback);
    match run(fallback) {
        Ok((value, metrics)) => Ok((
            value,
            metrics,
            format!("{} -> {} (fallback)", primary, fallback),
        )),
        Err(e) => Err(Error::MethodExhausted {
            primary: primary_failure,
            fallback: e.to_string(),
        }),
    }
}
