//! bgstrip command line front end
//!
//! `remove` handles one file, `batch` a directory, `info` prints usage notes.
//! Status lines go to stdout, failures to stderr, diagnostics through tracing.

use super::backend_factory::{BackendFactory, TractBackendFactory};
use super::config::CliConfigBuilder;
use crate::{
    backends::ModelLocator,
    batch::{create_output_dir, process_file, BatchJob, BatchSummary},
    config::ProcessingOptions,
    paths::{derive_output_dir, derive_output_path},
    processor::ImageProcessor,
    services::{BatchProcessingStats, ProcessingStage, ProgressReporter, ProgressUpdate},
    tracing_config::{init_cli_tracing, spans, TracingFormat},
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::{OwoColorize, Stream};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;

/// Remove image backgrounds with an ONNX segmentation model
#[derive(Parser, Debug)]
#[command(name = "bgstrip", author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (-v: INFO, -vv: DEBUG, -vvv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Diagnostic log format on stderr
    #[arg(long, value_enum, global = true, default_value_t = CliLogFormat::Console)]
    pub log_format: CliLogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Remove the background from one image and save the result
    Remove(RemoveArgs),
    /// Process all images in a directory
    Batch(BatchArgs),
    /// Display information about the background removal tool
    Info,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Remove(_) => "remove",
            Command::Batch(_) => "batch",
            Command::Info => "info",
        }
    }
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Path to the input image
    #[arg(value_name = "INPUT_PATH", value_parser = existing_path)]
    pub input: PathBuf,

    /// Where to save the result [default: <INPUT_STEM>_output.<FORMAT> next to the input]
    #[arg(value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub processing: ProcessingArgs,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Directory containing images to process
    #[arg(value_name = "INPUT_DIR", value_parser = existing_dir)]
    pub input: PathBuf,

    /// Directory for the results [default: <INPUT_DIR>_output beside the input]
    #[arg(value_name = "OUTPUT_DIR")]
    pub output: Option<PathBuf>,

    /// Process subdirectories recursively
    #[arg(long, overrides_with = "no_recursive")]
    pub recursive: bool,

    /// Only process the top level of INPUT_DIR (default)
    #[arg(long = "no-recursive", overrides_with = "recursive")]
    pub no_recursive: bool,

    #[command(flatten)]
    pub processing: ProcessingArgs,
}

impl BatchArgs {
    /// Effective recursion after `--recursive`/`--no-recursive` overrides
    #[must_use]
    pub fn recursive(&self) -> bool {
        self.recursive && !self.no_recursive
    }
}

/// Flags shared by `remove` and `batch`
#[derive(Args, Debug)]
pub struct ProcessingArgs {
    /// Output image format
    #[arg(short, long, value_enum, ignore_case = true, default_value_t = CliOutputFormat::Png)]
    pub format: CliOutputFormat,

    /// Replace the transparent background with a color, e.g. `255 0 0` for red
    #[arg(
        short = 'c',
        long = "bg-color",
        num_args = 3,
        value_names = ["R", "G", "B"],
        value_parser = clap::value_parser!(u8),
        action = clap::ArgAction::Set,
        allow_negative_numbers = true
    )]
    pub bg_color: Option<Vec<u8>>,

    /// Segmentation model (.onnx) [default: $BGSTRIP_MODEL, then the cache directory]
    #[arg(long, value_name = "PATH")]
    pub model: Option<PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CliOutputFormat {
    #[value(name = "PNG")]
    Png,
    #[value(name = "JPEG", alias = "jpg")]
    Jpeg,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliLogFormat {
    /// Colored compact lines
    Console,
    /// Compact lines without ANSI colors
    Compact,
    /// One JSON object per event (needs the `tracing-json` feature)
    Json,
}

fn existing_path(value: &str) -> std::result::Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.exists() {
        Ok(path)
    } else {
        Err(format!("Path '{value}' does not exist."))
    }
}

fn existing_dir(value: &str) -> std::result::Result<PathBuf, String> {
    let path = existing_path(value)?;
    if path.is_dir() {
        Ok(path)
    } else {
        Err(format!("Directory '{value}' is a file."))
    }
}

/// Parse arguments and run the selected command
///
/// Argument errors exit with status 2 from inside clap.
pub fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    run(&cli)
}

/// Install tracing, then run an already parsed command line on the Tract backend
pub fn run(cli: &Cli) -> Result<ExitCode> {
    let format = TracingFormat::try_from(cli.log_format)?;
    let session_id =
        init_cli_tracing(cli.verbose, format).context("Failed to initialize tracing")?;
    let _session = spans::session(&session_id, cli.command.name()).entered();

    execute(cli, &TractBackendFactory, &mut std::io::stdout(), &mut std::io::stderr())
}

/// Run a parsed command line with backends from `factory`
///
/// Status lines go to `out` and failure lines to `err`. The returned code is
/// 1 for a failed `remove` or a batch that could not run, otherwise 0.
pub fn execute<F: BackendFactory>(
    cli: &Cli,
    factory: &F,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<ExitCode> {
    match &cli.command {
        Command::Remove(args) => run_remove(args, factory, out, err),
        Command::Batch(args) => run_batch(args, cli.verbose, factory, out, err),
        Command::Info => {
            show_info(out)?;
            Ok(ExitCode::SUCCESS)
        },
    }
}

fn run_remove<F: BackendFactory>(
    args: &RemoveArgs,
    factory: &F,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<ExitCode> {
    match remove_single(args, factory, out) {
        Ok(output) => {
            writeln!(
                out,
                "{}",
                "✓ Successfully processed image!".if_supports_color(Stream::Stdout, |t| t.green())
            )?;
            writeln!(out, "Output saved to: {}", absolute(&output).display())?;
            Ok(ExitCode::SUCCESS)
        },
        Err(e) => {
            writeln!(
                err,
                "{}",
                format!("✗ Error processing image: {e:#}")
                    .if_supports_color(Stream::Stderr, |t| t.red())
            )?;
            Ok(ExitCode::FAILURE)
        },
    }
}

fn remove_single<F: BackendFactory>(
    args: &RemoveArgs,
    factory: &F,
    out: &mut dyn Write,
) -> Result<PathBuf> {
    let options = CliConfigBuilder::processing_options(&args.processing)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| derive_output_path(&args.input, &options));

    writeln!(out, "Processing image: {}", args.input.display())?;
    print_options(out, &options)?;
    writeln!(out, "Output will be saved to: {}", output.display())?;

    let _span = spans::file_processing(&args.input, options.output_format.as_str()).entered();
    let processor = ImageProcessor::new(factory.create_backend(&args.processing)?);

    let reporter = BarReporter::new(progress_bar(2)?, false);
    let result = process_file(&processor, &args.input, &output, &options, &reporter);
    if result.is_ok() {
        reporter.finish();
    } else {
        reporter.bar.abandon();
    }
    result?;

    Ok(output)
}

fn run_batch<F: BackendFactory>(
    args: &BatchArgs,
    verbose: u8,
    factory: &F,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<ExitCode> {
    match batch(args, verbose, factory, out) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            writeln!(
                err,
                "{}",
                format!("✗ Batch processing failed: {e:#}")
                    .if_supports_color(Stream::Stderr, |t| t.red())
            )?;
            Ok(ExitCode::FAILURE)
        },
    }
}

fn batch<F: BackendFactory>(
    args: &BatchArgs,
    verbose: u8,
    factory: &F,
    out: &mut dyn Write,
) -> Result<()> {
    let options = CliConfigBuilder::processing_options(&args.processing)?;
    let output_dir = match &args.output {
        Some(dir) => dir.clone(),
        None => derive_output_dir(&args.input, &options)?,
    };

    writeln!(out, "Processing images from: {}", args.input.display())?;
    print_options(out, &options)?;
    writeln!(out, "Output will be saved to: {}", output_dir.display())?;

    if create_output_dir(&output_dir)? {
        writeln!(out, "Created output directory: {}", output_dir.display())?;
    }

    let job = BatchJob::plan(&args.input, &output_dir, &options, args.recursive())?;
    if job.is_empty() {
        writeln!(
            out,
            "{}",
            "No image files found!".if_supports_color(Stream::Stdout, |t| t.yellow())
        )?;
        return Ok(());
    }

    writeln!(out, "Found {} images to process", job.len())?;
    debug!(candidates = ?job.entries(), "Planned batch");

    let processor = ImageProcessor::new(factory.create_backend(&args.processing)?);
    let _span = spans::batch_processing(job.len()).entered();

    let reporter = BarReporter::new(progress_bar(job.len() as u64)?, true);
    let summary = job.run(&processor, &options, &reporter);

    print_summary(out, &summary, verbose)?;
    Ok(())
}

fn print_options(out: &mut dyn Write, options: &ProcessingOptions) -> std::io::Result<()> {
    writeln!(out, "Output format: {}", options.output_format)?;
    if let Some(color) = options.background_color {
        writeln!(out, "Background color: {color}")?;
    }
    Ok(())
}

fn print_summary(out: &mut dyn Write, summary: &BatchSummary, verbose: u8) -> std::io::Result<()> {
    writeln!(out, "\nBatch processing complete:")?;
    writeln!(
        out,
        "{}",
        format!("✓ Successfully processed: {} images", summary.succeeded)
            .if_supports_color(Stream::Stdout, |t| t.green())
    )?;
    if summary.failed > 0 {
        writeln!(
            out,
            "{}",
            format!("✗ Failed to process: {} images", summary.failed)
                .if_supports_color(Stream::Stdout, |t| t.red())
        )?;
        if verbose > 0 {
            for (path, cause) in &summary.failures {
                writeln!(out, "  {}: {}", path.display(), cause)?;
            }
        }
    }
    writeln!(out, "Output saved to: {}", absolute(&summary.output_dir).display())
}

fn show_info(out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "Background Removal Tool")?;
    writeln!(out, "----------------------")?;
    writeln!(
        out,
        "This tool uses an ONNX segmentation model (U²-Net family) to remove backgrounds from images."
    )?;
    writeln!(out, "Supported output formats: PNG, JPEG")?;
    writeln!(out, "Supported input files: .jpg .jpeg .png .bmp .webp")?;

    writeln!(out, "\nModel lookup order:")?;
    writeln!(out, "  1. --model PATH")?;
    writeln!(out, "  2. $BGSTRIP_MODEL")?;
    match ModelLocator::default_model_path() {
        Ok(path) => writeln!(out, "  3. {}", path.display())?,
        Err(e) => writeln!(out, "  3. (unavailable: {e})")?,
    }

    writeln!(out, "\nExample usage:")?;
    writeln!(out, "  bgstrip remove input.jpg output.png --format PNG")?;
    writeln!(out, "  bgstrip batch photos/ --recursive --bg-color 255 255 255")
}

fn progress_bar(len: u64) -> Result<ProgressBar> {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );
    Ok(bar)
}

fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    })
}

/// Drives an indicatif bar from progress updates
struct BarReporter {
    bar: ProgressBar,
    batch: bool,
}

impl BarReporter {
    fn new(bar: ProgressBar, batch: bool) -> Self {
        Self { bar, batch }
    }
}

impl ProgressReporter for BarReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        if !self.batch {
            self.bar.set_position(update.stage.step());
        }
        self.bar.set_message(update.description);
    }

    fn report_error(&self, stage: ProcessingStage, error: &str) {
        debug!(stage = stage.description(), error, "Reported failure");
    }

    fn report_batch_progress(&self, stats: &BatchProcessingStats) {
        self.bar.set_position(stats.attempted() as u64);
        let name = Path::new(&stats.current_item_name)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.bar.set_message(name);
    }

    fn finish(&self) {
        self.bar.finish();
    }
}
