//! Progress reporting service
//!
//! This module separates progress reporting concerns from business logic,
//! allowing different frontends to implement their own progress handling.

use std::time::Instant;

/// Progress stages during background stripping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Reading input, removing the background, recoloring and encoding
    Processing,
    /// Writing the result to disk
    Saving,
    /// Processing completed
    Completed,

    // Batch processing stages
    /// Processing individual item in batch
    BatchItemProcessing,
    /// All candidates attempted, summary pending
    BatchFinalization,
}

impl ProcessingStage {
    /// Get a human-readable description of the processing stage
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ProcessingStage::Processing => "Removing background",
            ProcessingStage::Saving => "Saving result",
            ProcessingStage::Completed => "Processing completed",
            ProcessingStage::BatchItemProcessing => "Processing images",
            ProcessingStage::BatchFinalization => "Finalizing batch processing",
        }
    }

    /// Step index within a single-file run (two discrete steps)
    #[must_use]
    pub fn step(&self) -> u64 {
        match self {
            ProcessingStage::Processing => 0,
            ProcessingStage::Saving => 1,
            ProcessingStage::Completed
            | ProcessingStage::BatchItemProcessing
            | ProcessingStage::BatchFinalization => 2,
        }
    }
}

/// Progress update containing stage and timing information
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Current processing stage
    pub stage: ProcessingStage,
    /// Human-readable stage description
    pub description: String,
    /// Elapsed time since processing started (milliseconds)
    pub elapsed_ms: u64,
}

impl ProgressUpdate {
    #[must_use]
    pub fn new(stage: ProcessingStage, start_time: Instant) -> Self {
        Self {
            description: stage.description().to_string(),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
            stage,
        }
    }
}

/// Counters for a batch run, updated strictly in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchProcessingStats {
    /// Number of items that succeeded
    pub items_completed: usize,
    /// Total number of items to process
    pub items_total: usize,
    /// Number of items that failed processing
    pub items_failed: usize,
    /// Path of the item just attempted
    pub current_item_name: String,
}

impl BatchProcessingStats {
    /// Items attempted so far
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.items_completed + self.items_failed
    }
}

/// Trait for reporting progress during processing
pub trait ProgressReporter {
    /// Report a progress update
    fn report_progress(&self, update: ProgressUpdate);

    /// Report an error during processing
    fn report_error(&self, stage: ProcessingStage, error: &str);

    /// Report batch counters after each attempted item
    fn report_batch_progress(&self, stats: &BatchProcessingStats) {
        let _ = stats;
    }

    /// Called once when no further updates will follow
    fn finish(&self) {}
}

/// No-op progress reporter that discards all progress updates
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_progress(&self, _update: ProgressUpdate) {}

    fn report_error(&self, _stage: ProcessingStage, _error: &str) {}
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records everything it is told, for assertions
    #[derive(Default)]
    pub(crate) struct RecordingProgressReporter {
        pub(crate) stages: RefCell<Vec<ProcessingStage>>,
        pub(crate) errors: RefCell<Vec<String>>,
        pub(crate) batch: RefCell<Vec<BatchProcessingStats>>,
        pub(crate) finished: RefCell<bool>,
    }

    impl ProgressReporter for RecordingProgressReporter {
        fn report_progress(&self, update: ProgressUpdate) {
            self.stages.borrow_mut().push(update.stage);
        }

        fn report_error(&self, _stage: ProcessingStage, error: &str) {
            self.errors.borrow_mut().push(error.to_string());
        }

        fn report_batch_progress(&self, stats: &BatchProcessingStats) {
            self.batch.borrow_mut().push(stats.clone());
        }

        fn finish(&self) {
            *self.finished.borrow_mut() = true;
        }
    }

    #[test]
    fn test_stage_descriptions() {
        assert_eq!(ProcessingStage::Processing.description(), "Removing background");
        assert_eq!(ProcessingStage::Saving.description(), "Saving result");
        assert_eq!(ProcessingStage::Processing.step(), 0);
        assert_eq!(ProcessingStage::Saving.step(), 1);
        assert_eq!(ProcessingStage::Completed.step(), 2);
    }

    #[test]
    fn test_progress_update_carries_stage() {
        let update = ProgressUpdate::new(ProcessingStage::Saving, Instant::now());
        assert_eq!(update.stage, ProcessingStage::Saving);
        assert_eq!(update.description, "Saving result");
    }

    #[test]
    fn test_batch_stats_attempted() {
        let stats = BatchProcessingStats {
            items_completed: 3,
            items_total: 5,
            items_failed: 1,
            current_item_name: "x.png".to_string(),
        };
        assert_eq!(stats.attempted(), 4);
    }

    #[test]
    fn test_reporters_accept_updates() {
        let start = Instant::now();
        NoOpProgressReporter.report_progress(ProgressUpdate::new(ProcessingStage::Processing, start));
        NoOpProgressReporter.report_error(ProcessingStage::Processing, "ignored");
        NoOpProgressReporter.report_batch_progress(&BatchProcessingStats::default());
        NoOpProgressReporter.finish();
    }
}
