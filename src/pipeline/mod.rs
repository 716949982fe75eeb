//! Processing pipeline.
//!
//! Each unit moves through `Analyze → Decide → [Skip | Format →
//! QualityCheck → Done | FallbackChain]`. Failures are local: a unit that
//! cannot be analysed or rendered yields a failed result carrying its
//! original text, and the rest of the document or batch proceeds.

mod config;
mod fallback;
pub mod pool;
mod quality;
mod result;
mod stats;

pub use config::{ProcessingConfig, ProcessingStrategy};
pub use fallback::{FallbackStep, FALLBACK_CHAIN, MINIMAL_STRENGTH};
pub use quality::quality_score;
pub use result::{DocumentResult, ProcessingResult, ResultMetadata};
pub use stats::{PipelineStats, StatsSnapshot};

use log::{debug, info, warn};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::analysis::{
    analyze_document, summarize, IntensityDecision, IntensityManager, Segmenter,
};
use crate::error::{Error, Result};
use crate::model::{ElementContext, ElementRole, Segment, TextDocument, TextUnit};
use crate::render::{
    render_document, render_unit, OutputFormat, RenderOptions, RenderStats, RenderedElement,
    RenderedUnit,
};
use crate::split::{PlannedSegment, WordSplitter};

/// Documents with more units than this use the worker pool when
/// parallel processing is enabled.
const PARALLEL_MIN_UNITS: usize = 5;

/// Output accepted for one unit.
struct Accepted {
    output: String,
    strength: f32,
    format: OutputFormat,
    quality: f32,
    plan: Vec<PlannedSegment>,
}

/// How a unit counts in [`PipelineStats`].
#[derive(Debug, Clone, Copy)]
enum Tally {
    Failed,
    Skipped,
    Processed { fallback: bool },
}

/// The bionic processing pipeline.
///
/// Holds configuration and analyzers only; every call is independent
/// apart from the shared [`PipelineStats`] counters.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: ProcessingConfig,
    segmenter: Segmenter,
    intensity: IntensityManager,
    splitter: WordSplitter,
    render_options: RenderOptions,
    stats: Arc<PipelineStats>,
}

impl Pipeline {
    /// Create a pipeline from a validated configuration.
    pub fn new(config: ProcessingConfig) -> Result<Self> {
        config.validate()?;
        let intensity = IntensityManager::new().with_custom_table(config.custom_table.clone());
        Ok(Self {
            config,
            segmenter: Segmenter::new(),
            intensity,
            splitter: WordSplitter::new(),
            render_options: RenderOptions::default(),
            stats: Arc::new(PipelineStats::new()),
        })
    }

    /// Use a custom word splitter.
    pub fn with_splitter(mut self, splitter: WordSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    /// Use a custom intensity manager.
    pub fn with_intensity_manager(mut self, manager: IntensityManager) -> Self {
        self.intensity = manager;
        self
    }

    /// Set document rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }

    pub fn splitter(&self) -> &WordSplitter {
        &self.splitter
    }

    pub fn intensity_manager(&self) -> &IntensityManager {
        &self.intensity
    }

    /// Shared throughput counters.
    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Process a single text with optional layout context.
    pub fn process_text(&self, text: &str, context: Option<&ElementContext>) -> ProcessingResult {
        let mut unit = TextUnit::new(text);
        unit.context = context.copied();
        self.process_unit(&unit)
    }

    /// Segment and split a text at the given strength.
    pub fn plan_words(&self, text: &str, strength: f32) -> Vec<PlannedSegment> {
        self.splitter.plan(self.segmenter.segment(text), strength)
    }

    /// Analysis stage: validate, segment, classify and decide.
    ///
    /// A panic inside analysis is caught and reported as an analysis
    /// failure for this unit only.
    pub fn analyze(&self, unit: &TextUnit) -> Result<(IntensityDecision, Vec<Segment>)> {
        self.validate_unit(&unit.text)?;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let role = unit.role.unwrap_or_else(|| {
                self.intensity
                    .classifier()
                    .classify(&unit.text, unit.context.as_ref())
            });
            let decision = self.intensity.intensity_for_role(
                &unit.text,
                role,
                unit.context.as_ref(),
                self.config.profile,
                self.config.intensity_override,
            );
            let segments = if decision.should_process {
                self.segmenter.segment(&unit.text)
            } else {
                Vec::new()
            };
            (decision, segments)
        }));

        outcome.map_err(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Error::AnalysisFailure(message)
        })
    }

    fn validate_unit(&self, text: &str) -> Result<()> {
        if text.contains('\0') {
            return Err(Error::AnalysisFailure(
                "text contains a NUL character".to_string(),
            ));
        }
        let chars = text.chars().count();
        if chars > self.config.max_unit_chars {
            return Err(Error::MalformedInput(format!(
                "unit has {} characters, limit is {}",
                chars, self.config.max_unit_chars
            )));
        }
        Ok(())
    }

    fn base_metadata(&self, elapsed: Duration) -> ResultMetadata {
        ResultMetadata {
            intensity_used: 0.0,
            profile_used: self.config.profile,
            strategy_used: self.config.strategy,
            processing_time: elapsed,
            quality_score: 0.0,
            format_used: self.config.format,
            role: None,
            confidence: 0.0,
        }
    }

    /// Process one unit.
    pub fn process_unit(&self, unit: &TextUnit) -> ProcessingResult {
        let (result, tally) = self.evaluate_unit(unit);
        self.record(&result, tally);
        result
    }

    fn record(&self, result: &ProcessingResult, tally: Tally) {
        let elapsed = result.metadata.processing_time;
        match tally {
            Tally::Failed => self.stats.record_failure(elapsed),
            Tally::Skipped => self.stats.record_success(elapsed, false, true),
            Tally::Processed { fallback } => self.stats.record_success(elapsed, fallback, false),
        }
    }

    /// Process one unit without touching the shared counters.
    fn evaluate_unit(&self, unit: &TextUnit) -> (ProcessingResult, Tally) {
        let start = Instant::now();
        let text = unit.text.as_str();

        let (decision, segments) = match self.analyze(unit) {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!("Analysis failed: {}", e);
                let metadata = self.base_metadata(start.elapsed());
                return (ProcessingResult::failed(text, &e, metadata), Tally::Failed);
            }
        };

        let mut metadata = self.base_metadata(Duration::ZERO);
        metadata.role = Some(decision.role);
        metadata.confidence = decision.confidence;

        let strength = self.config.strategy.apply(decision.strength, decision.confidence);
        if !decision.should_process || strength <= 0.0 {
            debug!("Skipping {} unit ({} chars)", decision.role, text.len());
            let elapsed = start.elapsed();
            metadata.processing_time = elapsed;
            metadata.quality_score = 1.0;
            metadata.format_used = OutputFormat::PlainText;
            let result = ProcessingResult {
                success: true,
                output: text.to_string(),
                warnings: Vec::new(),
                errors: Vec::new(),
                quality_score: 1.0,
                fallback_used: false,
                metadata,
                failed_stage: None,
                decision: Some(decision),
                render_stats: RenderStats::default(),
            };
            return (result, Tally::Skipped);
        }

        let mut warnings = Vec::new();
        let primary = self.attempt(
            text,
            &segments,
            strength,
            self.config.format,
            decision.confidence,
        );

        let (accepted, fallback_used) = match primary {
            Ok(accepted) if accepted.quality >= self.config.quality_threshold => (accepted, false),
            Ok(accepted) if !self.config.enable_fallbacks => {
                warnings.push(format!(
                    "quality {:.2} below threshold {:.2}",
                    accepted.quality, self.config.quality_threshold
                ));
                (accepted, false)
            }
            Err(e) if !self.config.enable_fallbacks => {
                warn!("Render failed without fallbacks: {}", e);
                metadata.processing_time = start.elapsed();
                let mut result = ProcessingResult::failed(text, &e, metadata);
                result.decision = Some(decision);
                return (result, Tally::Failed);
            }
            primary => {
                match &primary {
                    Ok(accepted) => warnings.push(format!(
                        "quality {:.2} below threshold {:.2}, trying fallbacks",
                        accepted.quality, self.config.quality_threshold
                    )),
                    Err(e) => warnings.push(format!("primary render failed: {}", e)),
                }
                let accepted = self.run_fallbacks(
                    text,
                    &segments,
                    strength,
                    decision.confidence,
                    &mut warnings,
                );
                (accepted, true)
            }
        };

        metadata.processing_time = start.elapsed();
        metadata.intensity_used = accepted.strength;
        metadata.format_used = accepted.format;
        metadata.quality_score = accepted.quality;

        let mut render_stats = RenderStats::new();
        render_stats.record(decision.role, &accepted.plan);

        let result = ProcessingResult {
            success: true,
            output: accepted.output,
            warnings,
            errors: Vec::new(),
            quality_score: accepted.quality,
            fallback_used,
            metadata,
            failed_stage: None,
            decision: Some(decision),
            render_stats,
        };
        (result, Tally::Processed { fallback: fallback_used })
    }

    /// Render once and score the output.
    fn attempt(
        &self,
        text: &str,
        segments: &[Segment],
        strength: f32,
        format: OutputFormat,
        confidence: f32,
    ) -> Result<Accepted> {
        let plan = self.splitter.plan(segments.to_vec(), strength);
        let RenderedUnit { output, content } = render_unit(text, &plan, strength, format)?;
        let quality = quality_score(
            text,
            &RenderedUnit {
                output: output.clone(),
                content,
            },
            format,
            confidence,
        );
        Ok(Accepted {
            output,
            strength,
            format,
            quality,
            plan,
        })
    }

    /// Walk the fallback chain; the first output differing from the input wins.
    fn run_fallbacks(
        &self,
        text: &str,
        segments: &[Segment],
        strength: f32,
        confidence: f32,
        warnings: &mut Vec<String>,
    ) -> Accepted {
        for step in FALLBACK_CHAIN {
            let Some((step_strength, step_format)) = step.params(strength, self.config.format)
            else {
                break;
            };
            match self.attempt(text, segments, step_strength, step_format, confidence) {
                Ok(accepted) if accepted.output != text => {
                    debug!("Fallback {} accepted", step.as_str());
                    warnings.push(format!("used fallback: {}", step.as_str()));
                    return accepted;
                }
                Ok(_) => debug!("Fallback {} left the text unchanged", step.as_str()),
                Err(e) => warnings.push(format!("fallback {} failed: {}", step.as_str(), e)),
            }
        }

        warnings.push(format!("used fallback: {}", FallbackStep::Original.as_str()));
        Accepted {
            output: text.to_string(),
            strength: 0.0,
            format: OutputFormat::PlainText,
            quality: quality::UNCHANGED_SCORE,
            plan: Vec::new(),
        }
    }

    /// Process many units, keeping input order.
    ///
    /// Uses the worker pool when parallel processing is enabled and there
    /// are more than five units. Units without a result when the timeout
    /// expires become failed results holding their original text.
    fn process_units(&self, units: Vec<TextUnit>) -> Vec<ProcessingResult> {
        let total = units.len();
        let timeout = self.config.timeout;

        if self.config.parallel && total > PARALLEL_MIN_UNITS {
            debug!(
                "Processing {} units on {} workers",
                total, self.config.max_workers
            );
            let originals: Vec<String> = units.iter().map(|u| u.text.clone()).collect();
            let pipeline = Arc::new(self.clone());
            // Workers only evaluate; counting happens here so a unit abandoned
            // at the deadline is not counted again when its worker finishes.
            let output = pool::run_indexed(units, self.config.max_workers, timeout, move |unit| {
                pipeline.evaluate_unit(&unit)
            });

            let pending = output.pending();
            let elapsed = output.elapsed;
            return output
                .results
                .into_iter()
                .zip(originals)
                .map(|(outcome, original)| match outcome {
                    Some((result, tally)) => {
                        self.record(&result, tally);
                        result
                    }
                    None => self.timed_out(&original, elapsed, pending),
                })
                .collect();
        }

        let start = Instant::now();
        let mut results = Vec::with_capacity(total);
        for (index, unit) in units.iter().enumerate() {
            let elapsed = start.elapsed();
            if elapsed > timeout {
                let pending = total - index;
                results.push(self.timed_out(&unit.text, elapsed, pending));
                continue;
            }
            results.push(self.process_unit(unit));
        }
        results
    }

    fn timed_out(&self, original: &str, elapsed: Duration, pending: usize) -> ProcessingResult {
        self.stats.record_failure(Duration::ZERO);
        let error = Error::Timeout { elapsed, pending };
        ProcessingResult::failed(original, &error, self.base_metadata(elapsed))
    }

    /// Process independent texts, returning results in input order.
    pub fn process_batch(&self, texts: &[String]) -> Vec<ProcessingResult> {
        info!("Processing batch of {} texts", texts.len());
        self.process_units(texts.iter().map(TextUnit::new).collect())
    }

    /// Process every unit of a document and assemble the output.
    ///
    /// Fails only when every unit failed.
    pub fn process_document(&self, doc: &TextDocument) -> Result<DocumentResult> {
        let start = Instant::now();
        info!("Processing document with {} units", doc.len());

        let results = self.process_units(doc.units.clone());
        let total = results.len();
        let failed = results.iter().filter(|r| !r.success).count();

        if total > 0 && failed == total {
            let timed_out = results.iter().all(|r| r.failed_in("timeout"));
            let first = results
                .first()
                .and_then(|r| r.errors.first())
                .cloned()
                .unwrap_or_default();
            return Err(if timed_out {
                Error::Timeout {
                    elapsed: start.elapsed(),
                    pending: total,
                }
            } else {
                Error::AnalysisFailure(format!("all {} units failed; first: {}", total, first))
            });
        }

        let mut warnings = Vec::new();
        if failed * 2 > total {
            warnings.push(format!("{} of {} units failed", failed, total));
        }

        let roles: Vec<ElementRole> = results
            .iter()
            .map(|r| r.metadata.role.unwrap_or_default())
            .collect();
        let decisions: Vec<IntensityDecision> =
            results.iter().filter_map(|r| r.decision).collect();

        let mut render_stats = RenderStats::new();
        for result in &results {
            render_stats.merge(&result.render_stats);
        }

        let elements: Vec<RenderedElement> = doc
            .units
            .iter()
            .zip(&results)
            .enumerate()
            .map(|(index, (unit, result))| {
                let format = if result.success {
                    result.metadata.format_used
                } else {
                    OutputFormat::PlainText
                };
                RenderedElement::new(
                    result.metadata.role.unwrap_or_default(),
                    unit.text.clone(),
                    result.output.clone(),
                    format,
                )
                .with_strength(result.metadata.intensity_used)
                .with_separator(doc.separator(index).to_string())
            })
            .collect();

        let output = render_document(
            &elements,
            &doc.leading,
            self.config.format,
            &self.render_options,
        )?;

        Ok(DocumentResult {
            output,
            units: results,
            warnings,
            analysis: analyze_document(&roles),
            summary: summarize(&decisions),
            render_stats,
            processing_time: start.elapsed(),
        })
    }
}
