//! Model location and preprocessing parameters
//!
//! The crate never downloads models. A model is found, in order, from an
//! explicit path, the `BGSTRIP_MODEL` environment variable, or the default
//! file inside the cache directory (`BGSTRIP_CACHE_DIR`, else the platform
//! cache directory). A JSON sidecar next to the model may override the
//! preprocessing parameters.

use crate::error::{BgStripError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit model file
pub const MODEL_ENV: &str = "BGSTRIP_MODEL";

/// Environment variable overriding the cache directory
pub const CACHE_DIR_ENV: &str = "BGSTRIP_CACHE_DIR";

/// File name looked up in the models directory when nothing else is set
pub const DEFAULT_MODEL_FILE: &str = "u2net.onnx";

/// Input preprocessing expected by a segmentation model
///
/// Defaults match U²-Net: 320x320 input normalized with ImageNet statistics.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreprocessingConfig {
    /// Square input edge in pixels
    pub input_size: u32,
    /// Per-channel mean subtracted after scaling to 0..1
    pub mean: [f32; 3],
    /// Per-channel standard deviation divided after mean subtraction
    pub std: [f32; 3],
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            input_size: 320,
            mean: [0.485, 0.456, 0.406],
            std: [0.229, 0.224, 0.225],
        }
    }
}

impl PreprocessingConfig {
    /// Sidecar location for a model file: same path with a `.json` extension
    #[must_use]
    pub fn sidecar_path(model_path: &Path) -> PathBuf {
        model_path.with_extension("json")
    }

    /// Load the sidecar next to `model_path`, or defaults when there is none
    ///
    /// # Errors
    /// `BgStripError::InvalidConfig` when the sidecar exists but is unreadable,
    /// malformed, or holds unusable values
    pub fn load_for_model(model_path: &Path) -> Result<Self> {
        let sidecar = Self::sidecar_path(model_path);
        if !sidecar.is_file() {
            log::debug!("No preprocessing sidecar at {}, using defaults", sidecar.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&sidecar)
            .map_err(|e| BgStripError::file_io_error("read model sidecar", &sidecar, &e))?;
        let config = Self::from_json(&content).map_err(|e| {
            BgStripError::invalid_config(format!("{}: {}", sidecar.display(), e))
        })?;

        log::debug!("Loaded preprocessing config from {}: {:?}", sidecar.display(), config);
        Ok(config)
    }

    /// Parse and validate a sidecar document
    ///
    /// # Errors
    /// `BgStripError::InvalidConfig` for malformed JSON or unusable values
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| BgStripError::invalid_config(format!("Invalid model sidecar: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.input_size == 0 || self.input_size > 4096 {
            return Err(BgStripError::invalid_config(format!(
                "Invalid input_size: {} (valid range: 1-4096)",
                self.input_size
            )));
        }
        if self.std.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return Err(BgStripError::invalid_config(
                "Normalization std values must be finite and non-zero",
            ));
        }
        Ok(())
    }
}

/// Resolves which model file to load
pub struct ModelLocator;

impl ModelLocator {
    /// Resolve the model path from the process environment
    ///
    /// # Errors
    /// `BgStripError::InvalidConfig` if no cache directory can be determined
    pub fn resolve(explicit: Option<&Path>) -> Result<PathBuf> {
        Self::resolve_with(explicit, |key| std::env::var(key).ok())
    }

    /// Resolve the model path using `env` for variable lookups
    ///
    /// # Errors
    /// `BgStripError::InvalidConfig` if no cache directory can be determined
    pub fn resolve_with<F>(explicit: Option<&Path>, env: F) -> Result<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }

        if let Some(path) = env(MODEL_ENV).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }

        Ok(Self::models_dir_with(env)?.join(DEFAULT_MODEL_FILE))
    }

    /// Default model path, ignoring any explicit or `BGSTRIP_MODEL` setting
    ///
    /// # Errors
    /// `BgStripError::InvalidConfig` if no cache directory can be determined
    pub fn default_model_path() -> Result<PathBuf> {
        Ok(Self::models_dir_with(|key| std::env::var(key).ok())?.join(DEFAULT_MODEL_FILE))
    }

    fn models_dir_with<F>(env: F) -> Result<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(cache_override) = env(CACHE_DIR_ENV).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(cache_override).join("models"));
        }

        Ok(dirs::cache_dir()
            .ok_or_else(|| {
                BgStripError::invalid_config(format!(
                    "Failed to determine cache directory. Set {CACHE_DIR_ENV} or {MODEL_ENV}."
                ))
            })?
            .join("bgstrip")
            .join("models"))
    }
}
