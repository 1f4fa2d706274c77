//! Services separating I/O, codec work and progress reporting from the facade

pub mod format;
pub mod io;
pub mod progress;

pub use format::OutputFormatHandler;
pub use io::{ImageIOService, SUPPORTED_EXTENSIONS};
pub use progress::{
    BatchProcessingStats, NoOpProgressReporter, ProcessingStage, ProgressReporter, ProgressUpdate,
};
