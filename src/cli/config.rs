//! Configuration conversion utilities for CLI arguments

use crate::backends::ModelLocator;
use crate::cli::main_impl::{CliLogFormat, CliOutputFormat, ProcessingArgs};
use crate::config::{OutputFormat, ProcessingOptions, RgbColor};
use crate::tracing_config::TracingFormat;
use anyhow::{Context, Result};
use std::path::PathBuf;

impl From<CliOutputFormat> for OutputFormat {
    fn from(format: CliOutputFormat) -> Self {
        match format {
            CliOutputFormat::Png => OutputFormat::Png,
            CliOutputFormat::Jpeg => OutputFormat::Jpeg,
        }
    }
}

impl TryFrom<CliLogFormat> for TracingFormat {
    type Error = anyhow::Error;

    fn try_from(format: CliLogFormat) -> Result<Self> {
        match format {
            CliLogFormat::Console => Ok(TracingFormat::Console),
            CliLogFormat::Compact => Ok(TracingFormat::Compact),
            #[cfg(feature = "tracing-json")]
            CliLogFormat::Json => Ok(TracingFormat::Json),
            #[cfg(not(feature = "tracing-json"))]
            CliLogFormat::Json => {
                anyhow::bail!("--log-format json needs bgstrip built with the tracing-json feature")
            },
        }
    }
}

/// Convert CLI arguments to library configuration
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build the per-run processing options
    pub(crate) fn processing_options(args: &ProcessingArgs) -> Result<ProcessingOptions> {
        let background_color = args
            .bg_color
            .as_deref()
            .map(RgbColor::try_from)
            .transpose()
            .context("Invalid --bg-color")?;

        Ok(ProcessingOptions::new(args.format.into(), background_color))
    }

    /// Resolve the model file: `--model`, then `BGSTRIP_MODEL`, then the cache default
    pub(crate) fn model_path(args: &ProcessingArgs) -> Result<PathBuf> {
        ModelLocator::resolve(args.model.as_deref()).context("Failed to resolve model path")
    }
}
