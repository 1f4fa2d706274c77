//! Tract backend for salient-object segmentation models
//!
//! Runs a U²-Net style ONNX model with Tract, a pure Rust inference engine.
//! The model takes one `[1, 3, S, S]` normalized RGB tensor and its first
//! output is a single-channel saliency map which becomes the alpha channel
//! of the result.

use crate::backends::model::PreprocessingConfig;
use crate::config::OutputFormat;
use crate::error::{BgStripError, Result};
use crate::remover::BackgroundRemover;
use crate::services::OutputFormatHandler;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tract_onnx::prelude::tract_ndarray::Array4;
use tract_onnx::prelude::*;

/// Type alias for the complex Tract model type to reduce complexity warnings
type TractModel = RunnableModel<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Background remover backed by an ONNX model running on Tract
pub struct TractRemover {
    model: TractModel,
    model_path: PathBuf,
    preprocessing: PreprocessingConfig,
}

impl std::fmt::Debug for TractRemover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TractRemover")
            .field("model_path", &self.model_path)
            .field("preprocessing", &self.preprocessing)
            .finish_non_exhaustive()
    }
}

impl TractRemover {
    /// Load a model, reading preprocessing parameters from its sidecar if present
    ///
    /// # Errors
    /// - `BgStripError::Model` if the file is missing or Tract cannot load it
    /// - `BgStripError::InvalidConfig` for a malformed sidecar
    pub fn load(model_path: &Path) -> Result<Self> {
        let preprocessing = PreprocessingConfig::load_for_model(model_path)?;
        Self::load_with_config(model_path, preprocessing)
    }

    /// Load a model with explicit preprocessing parameters
    ///
    /// # Errors
    /// `BgStripError::Model` if the file is missing or Tract cannot load it
    pub fn load_with_config(model_path: &Path, preprocessing: PreprocessingConfig) -> Result<Self> {
        if !model_path.is_file() {
            return Err(BgStripError::model_error_with_context(
                "load",
                model_path,
                "model file not found",
                &[
                    "pass --model with the path to a U²-Net compatible ONNX file",
                    "or set BGSTRIP_MODEL",
                    "or place u2net.onnx in the models cache directory (see `bgstrip info`)",
                ],
            ));
        }

        let load_start = Instant::now();
        log::info!("Loading model {}", model_path.display());

        let size = preprocessing.input_size as usize;
        let model = onnx()
            .model_for_path(model_path)
            .and_then(|m| m.with_input_fact(0, f32::fact([1, 3, size, size]).into()))
            .map_err(|e| {
                BgStripError::model_error_with_context(
                    "parse",
                    model_path,
                    &e.to_string(),
                    &["check that the file is a valid ONNX model"],
                )
            })?
            .into_optimized()
            .map_err(|e| BgStripError::model(format!("Failed to optimize model: {e}")))?
            .into_runnable()
            .map_err(|e| BgStripError::model(format!("Failed to create runnable model: {e}")))?;

        log::info!(
            "Model ready in {}ms (input {}x{})",
            load_start.elapsed().as_millis(),
            size,
            size
        );

        Ok(Self {
            model,
            model_path: model_path.to_path_buf(),
            preprocessing,
        })
    }

    /// Path the model was loaded from
    #[must_use]
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Preprocessing parameters in effect
    #[must_use]
    pub fn preprocessing(&self) -> &PreprocessingConfig {
        &self.preprocessing
    }

    fn infer(&self, input: Array4<f32>) -> Result<(Vec<f32>, u32, u32)> {
        let inference_start = Instant::now();

        let outputs = self
            .model
            .run(tvec![Tensor::from(input).into()])
            .map_err(|e| BgStripError::model(format!("Tract inference failed: {e}")))?;

        let output = outputs
            .first()
            .ok_or_else(|| BgStripError::model("Model produced no outputs"))?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| BgStripError::model(format!("Failed to read output tensor: {e}")))?;

        let shape = view.shape();
        let (height, width) = match shape {
            [.., h, w] if *h > 0 && *w > 0 => (*h, *w),
            _ => {
                return Err(BgStripError::model(format!(
                    "Unexpected output tensor shape {shape:?}"
                )))
            },
        };

        let values: Vec<f32> = view.iter().take(height * width).copied().collect();
        log::debug!(
            "Inference completed in {}ms, output shape {:?}",
            inference_start.elapsed().as_millis(),
            shape
        );

        let height = u32::try_from(height)
            .map_err(|_| BgStripError::model("Output height out of range"))?;
        let width =
            u32::try_from(width).map_err(|_| BgStripError::model("Output width out of range"))?;
        Ok((values, width, height))
    }
}

impl BackgroundRemover for TractRemover {
    fn remove(&self, image: &[u8]) -> Result<Vec<u8>> {
        let decoded = OutputFormatHandler::decode(image)?;
        let tensor = preprocess(&decoded, &self.preprocessing);
        let (values, width, height) = self.infer(tensor)?;

        let mask = mask_from_saliency(&values, width, height)?;
        let mask = image::imageops::resize(
            &mask,
            decoded.width(),
            decoded.height(),
            FilterType::Lanczos3,
        );

        let cutout = apply_mask(&decoded, &mask);
        OutputFormatHandler::encode(DynamicImage::ImageRgba8(cutout), OutputFormat::Png)
    }

    fn name(&self) -> &str {
        "tract"
    }
}

/// Stretch the image to the model input and normalize into an NCHW tensor
fn preprocess(image: &DynamicImage, config: &PreprocessingConfig) -> Array4<f32> {
    let size = config.input_size;
    let resized = image::imageops::resize(&image.to_rgb8(), size, size, FilterType::Lanczos3);
    let size = size as usize;

    Array4::from_shape_fn((1, 3, size, size), |(_, c, y, x)| {
        #[allow(clippy::cast_possible_truncation)]
        let value = f32::from(resized.get_pixel(x as u32, y as u32).0[c]) / 255.0;
        (value - config.mean[c]) / config.std[c]
    })
}

/// Min-max normalize a saliency map into an 8-bit mask
fn mask_from_saliency(values: &[f32], width: u32, height: u32) -> Result<GrayImage> {
    let (min, max) = values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;

    let pixels: Vec<u8> = values
        .iter()
        .map(|&v| {
            let normalized = if range > f32::EPSILON { (v - min) / range } else { v.clamp(0.0, 1.0) };
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let byte = (normalized * 255.0).round().clamp(0.0, 255.0) as u8;
            byte
        })
        .collect();

    GrayImage::from_raw(width, height, pixels)
        .ok_or_else(|| BgStripError::model("Saliency map size does not match its shape"))
}

/// Use `mask` as alpha; fully transparent pixels become (0, 0, 0, 0)
fn apply_mask(image: &DynamicImage, mask: &GrayImage) -> RgbaImage {
    let rgba = image.to_rgba8();
    let mut result = RgbaImage::new(rgba.width(), rgba.height());

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let Luma([alpha]) = mask.get_pixel_checked(x, y).copied().unwrap_or(Luma([0]));
        let out = if alpha > 0 {
            Rgba([pixel[0], pixel[1], pixel[2], alpha])
        } else {
            Rgba([0, 0, 0, 0])
        };
        result.put_pixel(x, y, out);
    }

    result
}
