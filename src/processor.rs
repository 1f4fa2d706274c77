//! Image operations facade
//!
//! Wraps a [`BackgroundRemover`] and derives the two post-processing
//! operations from it: format conversion and solid-color compositing. Every
//! operation is stateless and works on encoded bytes only; nothing here
//! touches the filesystem.

use crate::{
    config::{OutputFormat, ProcessingOptions, RgbColor},
    error::Result,
    remover::BackgroundRemover,
    services::OutputFormatHandler,
};
use image::DynamicImage;
use tracing::{debug, instrument};

/// Encoded image plus the format it was encoded in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub format: OutputFormat,
}

impl EncodedImage {
    #[must_use]
    pub fn new(data: Vec<u8>, format: OutputFormat) -> Self {
        Self { data, format }
    }

    /// MIME type of the encoded data, e.g. `image/png`
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Facade over a background removal backend
pub struct ImageProcessor<R> {
    remover: R,
}

impl<R: BackgroundRemover> ImageProcessor<R> {
    pub fn new(remover: R) -> Self {
        Self { remover }
    }

    /// Backend in use
    pub fn remover(&self) -> &R {
        &self.remover
    }

    /// Forward bytes to the backend and return whatever it produces
    ///
    /// # Errors
    /// Propagates backend failures unchanged (normally `BgStripError::Model`)
    pub fn remove_background(&self, image: &[u8]) -> Result<Vec<u8>> {
        debug!(backend = self.remover.name(), input_bytes = image.len(), "Removing background");
        self.remover.remove(image)
    }

    /// Remove the background and re-encode the result into `output_format`
    ///
    /// # Errors
    /// - backend failures from [`Self::remove_background`]
    /// - `BgStripError::Decode` if the backend output is not an image
    /// - `BgStripError::Encode` if the codec rejects the target format
    #[instrument(skip_all, fields(format = %output_format))]
    pub fn process_and_convert(
        &self,
        image: &[u8],
        output_format: OutputFormat,
    ) -> Result<EncodedImage> {
        let removed = self.remove_background(image)?;
        let decoded = OutputFormatHandler::decode(&removed)?;
        let data = OutputFormatHandler::encode(decoded, output_format)?;
        Ok(EncodedImage::new(data, output_format))
    }

    /// Remove the background and fill the transparent area with `color`
    ///
    /// The result is always PNG. When the backend output has no alpha
    /// channel the image is re-encoded as it is.
    ///
    /// # Errors
    /// Same as [`Self::process_and_convert`]
    #[instrument(skip_all, fields(color = %color))]
    pub fn replace_background(&self, image: &[u8], color: RgbColor) -> Result<EncodedImage> {
        let removed = self.remove_background(image)?;
        let decoded = OutputFormatHandler::decode(&removed)?;

        let composed = match OutputFormatHandler::composite_over_color(&decoded, color) {
            Some(canvas) => DynamicImage::ImageRgb8(canvas),
            None => {
                debug!("Backend output has no alpha channel, skipping composite");
                decoded
            },
        };

        let data = OutputFormatHandler::encode(composed, OutputFormat::Png)?;
        Ok(EncodedImage::new(data, OutputFormat::Png))
    }

    /// Run the per-file pipeline selected by `options`
    ///
    /// With a background color this is [`Self::replace_background`] followed
    /// by [`reencode`] when the target is not PNG; otherwise
    /// [`Self::process_and_convert`].
    ///
    /// # Errors
    /// Any error of the underlying operations
    pub fn process(&self, image: &[u8], options: &ProcessingOptions) -> Result<EncodedImage> {
        match options.background_color {
            Some(color) => {
                let composed = self.replace_background(image, color)?;
                reencode(composed, options.output_format)
            },
            None => self.process_and_convert(image, options.output_format),
        }
    }
}

/// Convert an already encoded image into `format`
///
/// Returns the input untouched when it is already in `format`.
///
/// # Errors
/// `BgStripError::Decode` or `BgStripError::Encode` from the codec
pub fn reencode(image: EncodedImage, format: OutputFormat) -> Result<EncodedImage> {
    if image.format == format {
        return Ok(image);
    }
    let decoded = OutputFormatHandler::decode(&image.data)?;
    let data = OutputFormatHandler::encode(decoded, format)?;
    Ok(EncodedImage::new(data, format))
}
