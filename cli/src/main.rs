//! bionify CLI - bionic reading for text and PDF documents

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use bionify::analysis::{analyze_document, classify_units, recommend_profile};
use bionify::{
    Bionify, ConvertedContent, InputKind, OutputFormat, PdfMethod, PdfOptions, ProcessingConfig,
    ProcessingStrategy, ReadingProfile, SpatialEngine, TextDocument,
};

#[derive(Parser)]
#[command(name = "bionify")]
#[command(version)]
#[command(about = "Convert text and PDF documents to bionic reading output", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert text given on the command line or stdin
    Text {
        /// Text to convert ("-" reads stdin)
        #[arg(value_name = "TEXT")]
        text: String,

        #[command(flatten)]
        process: ProcessArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Convert a text, Markdown or PDF file
    File {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        process: ProcessArgs,

        #[command(flatten)]
        pdf: PdfArgs,

        /// Output file (stdout for text if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Rewrite a PDF with bionic emphasis
    Pdf {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output PDF file (defaults to <stem>.bionic.pdf)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        process: ProcessArgs,

        #[command(flatten)]
        pdf: PdfArgs,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert many files into an output directory
    Batch {
        /// Input files
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = "bionic_output")]
        output: PathBuf,

        #[command(flatten)]
        process: ProcessArgs,

        #[command(flatten)]
        pdf: PdfArgs,
    },

    /// Show element composition and the recommended profile or PDF method
    Analyze {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// List reading profiles and their strength tables
    Profiles {
        /// Print strength tables as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

/// Options shared by every converting command.
#[derive(Args)]
struct ProcessArgs {
    /// Reading profile
    #[arg(short, long, value_enum, env = "BIONIFY_PROFILE")]
    profile: Option<ProfileArg>,

    /// Output format for text inputs
    #[arg(short, long, value_enum, env = "BIONIFY_FORMAT")]
    format: Option<FormatArg>,

    /// Fixed emphasis strength in [0, 1]
    #[arg(short, long, env = "BIONIFY_INTENSITY")]
    intensity: Option<f32>,

    /// Strength scaling strategy
    #[arg(long, value_enum, env = "BIONIFY_STRATEGY")]
    strategy: Option<StrategyArg>,

    /// Worker threads for paragraph processing
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Deadline in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Disable the fallback chain
    #[arg(long)]
    no_fallback: bool,
}

impl ProcessArgs {
    fn config(&self) -> ProcessingConfig {
        let mut config = ProcessingConfig::new().with_fallbacks(!self.no_fallback);
        if let Some(profile) = self.profile {
            config = config.with_profile(profile.into());
        }
        if let Some(format) = self.format {
            config = config.with_format(format.into());
        }
        if let Some(intensity) = self.intensity {
            config = config.with_intensity(intensity);
        }
        if let Some(strategy) = self.strategy {
            config = config.with_strategy(strategy.into());
        }
        if let Some(workers) = self.workers {
            config = config.with_parallel(workers);
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }
}

/// Options for PDF rewriting.
#[derive(Args)]
struct PdfArgs {
    /// PDF rewrite method
    #[arg(long, value_enum, default_value = "auto")]
    method: MethodArg,

    /// Draw emphasis with a bold face instead of overdrawing
    #[arg(long)]
    true_bold: bool,
}

impl PdfArgs {
    fn options(&self) -> PdfOptions {
        PdfOptions::new()
            .with_method(self.method.into())
            .with_true_bold(self.true_bold)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ProfileArg {
    /// Strongest emphasis
    SpeedReading,
    /// Balanced emphasis (default)
    Accessibility,
    /// Moderate emphasis
    Standard,
    /// Light emphasis for technical material
    Technical,
    /// Minimal emphasis
    Preservation,
}

impl From<ProfileArg> for ReadingProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::SpeedReading => ReadingProfile::SpeedReading,
            ProfileArg::Accessibility => ReadingProfile::Accessibility,
            ProfileArg::Standard => ReadingProfile::Standard,
            ProfileArg::Technical => ReadingProfile::Technical,
            ProfileArg::Preservation => ReadingProfile::Preservation,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// Upper-cased prefixes
    Text,
    /// <strong> prefixes
    Html,
    /// ** prefixes
    Markdown,
    /// Structured word data
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::PlainText,
            FormatArg::Html => OutputFormat::Html,
            FormatArg::Markdown => OutputFormat::Markdown,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Conservative,
    Balanced,
    Aggressive,
    Adaptive,
}

impl From<StrategyArg> for ProcessingStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Conservative => ProcessingStrategy::Conservative,
            StrategyArg::Balanced => ProcessingStrategy::Balanced,
            StrategyArg::Aggressive => ProcessingStrategy::Aggressive,
            StrategyArg::Adaptive => ProcessingStrategy::Adaptive,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum MethodArg {
    /// Choose from the first pages
    Auto,
    /// Cover and redraw each span
    Morphing,
    /// Remove page text first, then redraw
    Redaction,
}

impl From<MethodArg> for PdfMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Auto => PdfMethod::Auto,
            MethodArg::Morphing => PdfMethod::Morphing,
            MethodArg::Redaction => PdfMethod::Redaction,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Text {
            text,
            process,
            output,
        } => cmd_text(&text, &process, output.as_deref()),
        Commands::File {
            input,
            process,
            pdf,
            output,
        } => cmd_file(&input, &process, &pdf, output.as_deref()),
        Commands::Pdf {
            input,
            output,
            process,
            pdf,
            json,
        } => cmd_pdf(&input, output.as_deref(), &process, &pdf, json),
        Commands::Batch {
            inputs,
            output,
            process,
            pdf,
        } => cmd_batch(&inputs, &output, &process, &pdf),
        Commands::Analyze { input, json } => cmd_analyze(&input, json),
        Commands::Profiles { json } => cmd_profiles(json),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn write_or_print(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_text(
    text: &str,
    process: &ProcessArgs,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let input = if text == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        text.to_string()
    };

    let result = Bionify::new().with_config(process.config()).text(&input)?;
    for warning in &result.warnings {
        eprintln!("{}: {}", "Warning".yellow().bold(), warning);
    }
    write_or_print(output, &result.output)
}

fn cmd_file(
    input: &Path,
    process: &ProcessArgs,
    pdf: &PdfArgs,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let bionify = Bionify::new()
        .with_config(process.config())
        .with_pdf_options(pdf.options());
    let result = bionify.file(input)?;

    match &result.content {
        ConvertedContent::Text(text) => write_or_print(output, text),
        ConvertedContent::Pdf(bytes) => {
            let path = output
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| default_pdf_output(input));
            fs::write(&path, bytes)?;
            if let Some(outcome) = &result.pdf {
                println!(
                    "{} {} ({}: {})",
                    "Saved to".green(),
                    path.display(),
                    outcome.method_used,
                    outcome.quality_metrics
                );
            }
            Ok(())
        }
    }
}

fn cmd_pdf(
    input: &Path,
    output: Option<&Path>,
    process: &ProcessArgs,
    pdf: &PdfArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| default_pdf_output(input));

    let pb = ProgressBar::new_spinner();
    pb.set_message(format!("Rewriting {}...", input.display()));
    pb.enable_steady_tick(Duration::from_millis(100));

    let outcome = Bionify::new()
        .with_config(process.config())
        .with_pdf_options(pdf.options())
        .pdf(input, &output);
    pb.finish_and_clear();
    let outcome = outcome?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let metrics = &outcome.quality_metrics;
    println!("{}", "PDF Rewritten".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Output".bold(), output.display());
    println!("{}: {}", "Method".bold(), outcome.method_used);
    println!("{}: {}", "Pages".bold(), metrics.pages_processed);
    println!(
        "{}: {}/{} ({:.0}%)",
        "Spans enhanced".bold(),
        metrics.spans_enhanced,
        metrics.spans_attempted,
        metrics.success_rate() * 100.0
    );
    println!("{}: {}", "Fallback spans".bold(), metrics.spans_fallback);
    println!("{}: {}", "Failed spans".bold(), metrics.spans_failed);
    println!("{}: {}", "Quality".bold(), metrics.label());
    println!(
        "{}: {:.2}s",
        "Time".bold(),
        outcome.processing_time.as_secs_f64()
    );
    Ok(())
}

fn cmd_batch(
    inputs: &[PathBuf],
    output_dir: &Path,
    process: &ProcessArgs,
    pdf: &PdfArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(output_dir)?;
    let config = process.config();
    let extension = config.format.extension();
    let bionify = Bionify::new()
        .with_config(config)
        .with_pdf_options(pdf.options());

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut failures = Vec::new();
    for input in inputs {
        pb.set_message(input.display().to_string());
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        match bionify.file(input) {
            Ok(result) => {
                let name = match result.content {
                    ConvertedContent::Text(_) => format!("{}.bionic.{}", stem, extension),
                    ConvertedContent::Pdf(_) => format!("{}.bionic.pdf", stem),
                };
                fs::write(output_dir.join(name), result.as_bytes())?;
            }
            Err(e) => failures.push((input.clone(), e)),
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    println!(
        "\n{} {} converted, {} failed",
        "Batch:".green().bold(),
        inputs.len() - failures.len(),
        failures.len()
    );
    for (path, error) in &failures {
        println!("  {} {}: {}", "✗".red(), path.display(), error);
    }
    Ok(())
}

fn cmd_analyze(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let kind = bionify::validate_input(input, bionify::detect::DEFAULT_MAX_INPUT_BYTES)?;
    let pipeline = Bionify::new().pipeline()?;

    match kind {
        InputKind::Pdf => {
            let (method, analysis) = SpatialEngine::new(pipeline).analyze_file(input)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
                return Ok(());
            }
            println!("{}", "PDF Analysis".cyan().bold());
            println!("{}", "─".repeat(40).dimmed());
            println!("{}: {}", "Pages sampled".bold(), analysis.pages_sampled);
            println!("{}: {}", "Fonts".bold(), analysis.distinct_fonts);
            println!("{}: {}", "Max blocks/page".bold(), analysis.max_blocks_per_page);
            println!("{}: {:.1}", "Spans/page".bold(), analysis.avg_spans_per_page);
            println!("{}: {}", "Images".bold(), analysis.images);
            println!(
                "{}: {}",
                "Form".bold(),
                if analysis.has_forms { "Yes" } else { "No" }
            );
            println!("{}: {}", "Method".bold(), method.to_string().green());
            for reason in &analysis.reasons {
                println!("  {} {}", "•".dimmed(), reason);
            }
        }
        _ => {
            let doc = TextDocument::from_text(&fs::read_to_string(input)?);
            let roles = classify_units(pipeline.intensity_manager().classifier(), &doc.units);
            let analysis = analyze_document(&roles);
            let profile = recommend_profile(&analysis);
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
                return Ok(());
            }
            println!("{}", "Document Analysis".cyan().bold());
            println!("{}", "─".repeat(40).dimmed());
            println!("{}: {}", "Elements".bold(), analysis.total);
            for (role, count) in &analysis.distribution {
                println!("  {} {}: {}", "•".dimmed(), role, count);
            }
            println!("{}: {:.2}", "Technical ratio".bold(), analysis.technical_ratio);
            println!("{}: {:.2}", "Complexity".bold(), analysis.complexity_score);
            println!(
                "{}: {:.2}",
                "Recommended intensity".bold(),
                analysis.recommended_intensity
            );
            println!("{}: {}", "Recommended profile".bold(), profile.to_string().green());
        }
    }
    Ok(())
}

fn cmd_profiles(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let profiles = ReadingProfile::ALL
        .iter()
        .filter(|p| **p != ReadingProfile::Custom);

    if json {
        let tables: serde_json::Map<String, serde_json::Value> = profiles
            .map(|p| Ok((p.as_str().to_string(), serde_json::to_value(p.table())?)))
            .collect::<Result<_, serde_json::Error>>()?;
        println!("{}", serde_json::to_string_pretty(&tables)?);
        return Ok(());
    }

    println!("{}", "Reading Profiles".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for profile in profiles {
        println!("{}  {}", profile.as_str().bold(), profile.description().dimmed());
        for (role, strength) in profile.table().iter() {
            println!("  {:<16} {:.2}", role.as_str(), strength);
        }
    }
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "bionify".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Bionic reading for text and PDF documents");
    println!();
    println!("License: MIT");
}

fn default_pdf_output(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    input.with_file_name(format!("{}.bionic.pdf", stem))
}
