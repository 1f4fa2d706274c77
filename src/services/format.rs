//! Output format handling service
//!
//! Decoding, encoding and compositing live here so the facade only has to
//! sequence them.

use crate::{
    config::{OutputFormat, RgbColor},
    error::{BgStripError, Result},
};
use image::{DynamicImage, Rgb, RgbImage};
use std::io::Cursor;

/// Service for handling image codec work and compositing
pub struct OutputFormatHandler;

impl OutputFormatHandler {
    /// Decode bytes produced by a backend or read from disk
    ///
    /// # Errors
    /// `BgStripError::Decode` if the bytes are not a supported image
    pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
        image::load_from_memory(bytes)
            .map_err(|e| BgStripError::decode(format!("Failed to decode image from bytes: {e}")))
    }

    /// Convert an image into a pixel layout the target format can store
    ///
    /// JPEG cannot carry alpha, so the alpha channel is dropped.
    #[must_use]
    pub fn convert_format(image: DynamicImage, format: OutputFormat) -> DynamicImage {
        match format {
            OutputFormat::Png => image,
            OutputFormat::Jpeg => {
                if image.color().has_alpha() {
                    Self::validate_for_background_removal(format);
                }
                match image {
                    DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image,
                    other => DynamicImage::ImageRgb8(other.to_rgb8()),
                }
            },
        }
    }

    /// Encode an image into `format`
    ///
    /// # Errors
    /// `BgStripError::Encode` if the codec rejects the image
    pub fn encode(image: DynamicImage, format: OutputFormat) -> Result<Vec<u8>> {
        let image = Self::convert_format(image, format);
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), format.image_format())
            .map_err(|e| {
                BgStripError::encode(format!("Failed to encode {}: {e}", format.as_str()))
            })?;
        Ok(buffer)
    }

    /// Composite `image` source-over onto an opaque canvas of `color`
    ///
    /// Returns `None` when the image has no alpha channel, in which case
    /// there is nothing to composite.
    #[must_use]
    pub fn composite_over_color(image: &DynamicImage, color: RgbColor) -> Option<RgbImage> {
        if !image.color().has_alpha() {
            return None;
        }

        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        let background = color.channels();
        let mut canvas = RgbImage::from_pixel(width, height, Rgb(background));

        for (x, y, pixel) in rgba.enumerate_pixels() {
            let alpha = u32::from(pixel[3]);
            let mut blended = [0u8; 3];
            for (channel, (out, bg)) in blended.iter_mut().zip(background).enumerate() {
                let fg = u32::from(pixel.0.get(channel).copied().unwrap_or(0));
                *out = ((fg * alpha + u32::from(bg) * (255 - alpha) + 127) / 255) as u8;
            }
            canvas.put_pixel(x, y, Rgb(blended));
        }

        Some(canvas)
    }

    /// Warn when a format will flatten the transparency just produced
    pub fn validate_for_background_removal(format: OutputFormat) {
        if !format.supports_transparency() {
            log::warn!(
                "Output format {} does not support transparency. Removed areas will be black; use --bg-color to pick a color.",
                format
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    fn rgba(width: u32, height: u32, pixel: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(pixel)))
    }

    #[test]
    fn test_convert_format_png_keeps_alpha() {
        let converted = OutputFormatHandler::convert_format(rgba(2, 2, [255, 0, 0, 128]), OutputFormat::Png);
        assert!(converted.color().has_alpha());
    }

    #[test]
    fn test_convert_format_jpeg_drops_alpha() {
        let converted = OutputFormatHandler::convert_format(rgba(2, 2, [255, 0, 0, 128]), OutputFormat::Jpeg);
        match converted {
            DynamicImage::ImageRgb8(_) => {},
            _ => panic!("Expected RGB8 image for JPEG format"),
        }
    }

    #[test]
    fn test_encode_png_roundtrip_keeps_dimensions() {
        let bytes = OutputFormatHandler::encode(rgba(7, 3, [1, 2, 3, 4]), OutputFormat::Png).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Png);

        let decoded = OutputFormatHandler::decode(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (7, 3));
        assert_eq!(decoded.to_rgba8().get_pixel(0, 0).0, [1, 2, 3, 4]);
    }

    #[test]
    fn test_encode_jpeg_from_rgba() {
        let bytes = OutputFormatHandler::encode(rgba(4, 4, [10, 20, 30, 0]), OutputFormat::Jpeg).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Jpeg);
        let decoded = OutputFormatHandler::decode(&bytes).unwrap();
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = OutputFormatHandler::decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, BgStripError::Decode(_)));
    }

    #[test]
    fn test_composite_extremes_are_exact() {
        let mut source = RgbaImage::new(2, 1);
        source.put_pixel(0, 0, Rgba([10, 200, 30, 255]));
        source.put_pixel(1, 0, Rgba([99, 99, 99, 0]));

        let composed = OutputFormatHandler::composite_over_color(
            &DynamicImage::ImageRgba8(source),
            RgbColor::new(0, 0, 255),
        )
        .unwrap();

        assert_eq!(composed.get_pixel(0, 0).0, [10, 200, 30]);
        assert_eq!(composed.get_pixel(1, 0).0, [0, 0, 255]);
    }

    #[test]
    fn test_composite_half_alpha_blends() {
        let composed = OutputFormatHandler::composite_over_color(
            &rgba(1, 1, [255, 255, 255, 128]),
            RgbColor::new(0, 0, 0),
        )
        .unwrap();
        assert_eq!(composed.get_pixel(0, 0).0, [128, 128, 128]);
    }

    #[test]
    fn test_composite_skips_opaque_formats() {
        let rgb = DynamicImage::ImageRgb8(RgbImage::new(2, 2));
        assert!(OutputFormatHandler::composite_over_color(&rgb, RgbColor::WHITE).is_none());
    }
}
