#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # bgstrip
//!
//! Strip image backgrounds with a segmentation model, then convert the result
//! to another format or composite it onto a solid color.
//!
//! The segmentation step sits behind the [`BackgroundRemover`] trait. The crate
//! ships [`TractRemover`], a pure Rust ONNX runner for U²-Net style models
//! (enable with the `tract` feature, on by default). Model files are supplied
//! by the user and never downloaded.
//!
//! ## Features
//!
//! - **Facade**: [`ImageProcessor`] with `remove_background`,
//!   `process_and_convert` and `replace_background` over encoded bytes
//! - **Formats**: PNG (with transparency) and JPEG output; JPEG, PNG, BMP and
//!   WebP input
//! - **Batch**: [`BatchJob`] plans and runs a directory, counting failures
//! - **CLI**: `bgstrip remove|batch|info` (enable with the `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bgstrip::{ImageProcessor, OutputFormat, RgbColor, TractRemover};
//! use std::path::Path;
//!
//! # fn example() -> bgstrip::Result<()> {
//! let remover = TractRemover::load(Path::new("models/u2net.onnx"))?;
//! let processor = ImageProcessor::new(remover);
//!
//! let input = std::fs::read("photo.jpg")?;
//! let cutout = processor.process_and_convert(&input, OutputFormat::Png)?;
//! std::fs::write("photo_output.png", &cutout.data)?;
//!
//! let on_white = processor.replace_background(&input, RgbColor::WHITE)?;
//! assert_eq!(on_white.mime_type(), "image/png");
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom backends
//!
//! ```rust
//! use bgstrip::{BackgroundRemover, ImageProcessor, Result};
//!
//! struct Identity;
//!
//! impl BackgroundRemover for Identity {
//!     fn remove(&self, image: &[u8]) -> Result<Vec<u8>> {
//!         Ok(image.to_vec())
//!     }
//! }
//!
//! let processor = ImageProcessor::new(Identity);
//! assert_eq!(processor.remove_background(b"bytes").unwrap(), b"bytes");
//! ```

pub mod backends;
pub mod batch;
pub mod config;
pub mod error;
pub mod paths;
pub mod processor;
pub mod remover;
pub mod services;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "cli")]
pub mod tracing_config;

pub use backends::{ModelLocator, PreprocessingConfig};
#[cfg(feature = "tract")]
pub use backends::TractRemover;
pub use batch::{create_output_dir, process_file, BatchJob, BatchSummary};
pub use config::{OutputFormat, ProcessingOptions, RgbColor};
pub use error::{BgStripError, Result};
pub use paths::{derive_output_dir, derive_output_path, mirror_output_path};
pub use processor::{reencode, EncodedImage, ImageProcessor};
pub use remover::BackgroundRemover;
pub use services::{
    ImageIOService, NoOpProgressReporter, OutputFormatHandler, ProcessingStage, ProgressReporter,
};
