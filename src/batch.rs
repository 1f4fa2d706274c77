//! File-level processing: one image on disk, or a directory of them
//!
//! A [`BatchJob`] is planned once (candidates enumerated, output paths
//! mirrored) and then run strictly in order. Every per-image failure is
//! counted and reported; the run always reaches its summary.

use crate::{
    config::ProcessingOptions,
    error::{BgStripError, Result},
    paths::mirror_output_path,
    processor::ImageProcessor,
    remover::BackgroundRemover,
    services::{
        BatchProcessingStats, ImageIOService, NoOpProgressReporter, ProcessingStage,
        ProgressReporter, ProgressUpdate,
    },
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info_span, warn};

/// Read `input`, run the configured pipeline and write the result to `output`
///
/// Reports the `Processing` and `Saving` stages to `reporter`.
///
/// # Errors
/// Any error from reading, processing or writing
pub fn process_file<R: BackgroundRemover>(
    processor: &ImageProcessor<R>,
    input: &Path,
    output: &Path,
    options: &ProcessingOptions,
    reporter: &dyn ProgressReporter,
) -> Result<()> {
    let start = Instant::now();

    reporter.report_progress(ProgressUpdate::new(ProcessingStage::Processing, start));
    let bytes = ImageIOService::read_bytes(input)?;
    let encoded = processor.process(&bytes, options)?;

    reporter.report_progress(ProgressUpdate::new(ProcessingStage::Saving, start));
    ImageIOService::write_bytes(output, &encoded.data)?;

    reporter.report_progress(ProgressUpdate::new(ProcessingStage::Completed, start));
    Ok(())
}

/// Create `dir` and its parents when missing
///
/// Returns `true` if the directory was created by this call.
///
/// # Errors
/// `BgStripError::Io` if the directory cannot be created, or the path
/// exists but is not a directory
pub fn create_output_dir(dir: &Path) -> Result<bool> {
    if dir.is_dir() {
        return Ok(false);
    }
    if dir.exists() {
        return Err(BgStripError::file_io_error(
            "create output directory",
            dir,
            &std::io::Error::new(std::io::ErrorKind::AlreadyExists, "path is not a directory"),
        ));
    }

    std::fs::create_dir_all(dir)
        .map_err(|e| BgStripError::file_io_error("create output directory", dir, &e))?;
    Ok(true)
}

/// Outcome of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub output_dir: PathBuf,
    /// Failed inputs with the rendered cause
    pub failures: Vec<(PathBuf, String)>,
}

impl BatchSummary {
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Planned `(input, output)` pairs for one batch invocation
#[derive(Debug, Clone)]
pub struct BatchJob {
    input_dir: PathBuf,
    output_dir: PathBuf,
    entries: Vec<(PathBuf, PathBuf)>,
}

impl BatchJob {
    /// Enumerate candidates under `input_dir` and mirror them into `output_dir`
    ///
    /// # Errors
    /// `BgStripError::Io` if `input_dir` cannot be listed
    pub fn plan(
        input_dir: &Path,
        output_dir: &Path,
        options: &ProcessingOptions,
        recursive: bool,
    ) -> Result<Self> {
        let files = ImageIOService::find_images(input_dir, recursive, Some(output_dir))?;
        let entries = files
            .into_iter()
            .map(|file| {
                let output =
                    mirror_output_path(input_dir, &file, output_dir, options.output_format);
                (file, output)
            })
            .collect();

        Ok(Self {
            input_dir: input_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            entries,
        })
    }

    #[must_use]
    pub fn entries(&self) -> &[(PathBuf, PathBuf)] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Process every entry in order, counting failures instead of stopping
    pub fn run<R: BackgroundRemover>(
        &self,
        processor: &ImageProcessor<R>,
        options: &ProcessingOptions,
        reporter: &dyn ProgressReporter,
    ) -> BatchSummary {
        let start = Instant::now();
        let mut stats = BatchProcessingStats {
            items_total: self.entries.len(),
            ..BatchProcessingStats::default()
        };
        let mut failures = Vec::new();

        for (input, output) in &self.entries {
            let _span = info_span!("batch_item", input = %input.display()).entered();
            stats.current_item_name = input.display().to_string();

            match process_file(processor, input, output, options, &NoOpProgressReporter) {
                Ok(()) => {
                    stats.items_completed += 1;
                    tracing::debug!(output = %output.display(), "Processed");
                },
                Err(e) => {
                    stats.items_failed += 1;
                    warn!("Failed to process {}: {}", input.display(), e);
                    reporter.report_error(
                        ProcessingStage::BatchItemProcessing,
                        &format!("{}: {}", input.display(), e),
                    );
                    failures.push((input.clone(), e.to_string()));
                },
            }

            reporter.report_batch_progress(&stats);
        }

        reporter.report_progress(ProgressUpdate::new(ProcessingStage::BatchFinalization, start));
        reporter.finish();

        BatchSummary {
            succeeded: stats.items_completed,
            failed: stats.items_failed,
            output_dir: self.output_dir.clone(),
            failures,
        }
    }
}
