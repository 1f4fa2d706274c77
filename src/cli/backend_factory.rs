//! Backend construction for the CLI
//!
//! Commands ask a [`BackendFactory`] for their remover once they know there
//! is work to do, so `info`, usage errors and empty batches never load a model.

use super::config::CliConfigBuilder;
use super::main_impl::ProcessingArgs;
use crate::{backends::TractRemover, remover::BackgroundRemover, tracing_config::spans};
use anyhow::Result;
use tracing::info;

/// Creates the segmentation backend for a command
pub trait BackendFactory {
    type Remover: BackgroundRemover;

    /// Build a remover from the shared processing flags
    fn create_backend(&self, args: &ProcessingArgs) -> Result<Self::Remover>;
}

/// Loads a [`TractRemover`] from the resolved model path
#[derive(Debug, Default)]
pub struct TractBackendFactory;

impl BackendFactory for TractBackendFactory {
    type Remover = TractRemover;

    fn create_backend(&self, args: &ProcessingArgs) -> Result<TractRemover> {
        let model_path = CliConfigBuilder::model_path(args)?;
        let _span = spans::model_loading(&model_path).entered();
        info!("Using model {}", model_path.display());

        Ok(TractRemover::load(&model_path)?)
    }
}
