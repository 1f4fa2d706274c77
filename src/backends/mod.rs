//! Background removal backends
//!
//! - Tract backend (pure Rust ONNX inference, behind the `tract` feature)
//! - Model location and preprocessing parameters shared by backends

pub mod model;

#[cfg(feature = "tract")]
pub mod tract;

// Test utilities for backend testing
#[cfg(test)]
pub(crate) mod test_utils;

pub use self::model::{ModelLocator, PreprocessingConfig};

#[cfg(feature = "tract")]
pub use self::tract::TractRemover;
