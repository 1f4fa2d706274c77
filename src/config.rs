//! Configuration types for background stripping operations

use crate::error::{BgStripError, Result};
use image::ImageFormat;
use std::fmt;
use std::str::FromStr;

/// Output image format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// PNG with alpha channel transparency
    #[default]
    Png,
    /// JPEG (no transparency, alpha is dropped)
    Jpeg,
}

impl OutputFormat {
    /// Upper-case name used in user-facing messages (`PNG`, `JPEG`)
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
        }
    }

    /// Lower-case file extension without the dot
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }

    /// MIME type, always `image/` followed by the lower-case format name
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Matching codec in the `image` crate
    #[must_use]
    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
        }
    }

    /// Whether the format can carry an alpha channel
    #[must_use]
    pub fn supports_transparency(self) -> bool {
        matches!(self, Self::Png)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = BgStripError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PNG" => Ok(Self::Png),
            "JPEG" | "JPG" => Ok(Self::Jpeg),
            other => Err(BgStripError::invalid_config(format!(
                "Unsupported output format '{other}'. Supported formats: PNG, JPEG"
            ))),
        }
    }
}

/// Solid background color used when compositing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const WHITE: Self = Self::new(255, 255, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as an array, in R, G, B order
    #[must_use]
    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for RgbColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RGB({}, {}, {})", self.r, self.g, self.b)
    }
}

impl TryFrom<&[u8]> for RgbColor {
    type Error = BgStripError;

    fn try_from(components: &[u8]) -> Result<Self> {
        match components {
            [r, g, b] => Ok(Self::new(*r, *g, *b)),
            _ => Err(BgStripError::invalid_config(format!(
                "Background color needs exactly 3 components (R G B), got {}",
                components.len()
            ))),
        }
    }
}

impl TryFrom<&[i64]> for RgbColor {
    type Error = BgStripError;

    fn try_from(components: &[i64]) -> Result<Self> {
        let channel = |value: i64| {
            u8::try_from(value).map_err(|_| {
                BgStripError::invalid_config(format!(
                    "Color component {value} is out of range (0-255)"
                ))
            })
        };
        match components {
            [r, g, b] => Ok(Self::new(channel(*r)?, channel(*g)?, channel(*b)?)),
            _ => Err(BgStripError::invalid_config(format!(
                "Background color needs exactly 3 components (R G B), got {}",
                components.len()
            ))),
        }
    }
}

/// Per-run processing choices shared by single-file and batch modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessingOptions {
    pub output_format: OutputFormat,
    /// Composite onto this color instead of keeping transparency
    pub background_color: Option<RgbColor>,
}

impl ProcessingOptions {
    #[must_use]
    pub fn new(output_format: OutputFormat, background_color: Option<RgbColor>) -> Self {
        Self {
            output_format,
            background_color,
        }
    }

    /// Suffix appended to derived output names
    #[must_use]
    pub fn output_suffix(&self) -> &'static str {
        if self.background_color.is_some() {
            "_replaced"
        } else {
            "_output"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing_is_case_insensitive() {
        assert_eq!("png".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("PNG".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("jpeg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("JPEG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("Jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert!("gif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_output_format_names() {
        assert_eq!(OutputFormat::Png.to_string(), "PNG");
        assert_eq!(OutputFormat::Jpeg.to_string(), "JPEG");
        assert_eq!(OutputFormat::Png.extension(), "png");
        assert_eq!(OutputFormat::Jpeg.extension(), "jpeg");
        assert_eq!(OutputFormat::Png.mime_type(), "image/png");
        assert_eq!(OutputFormat::Jpeg.mime_type(), "image/jpeg");
        assert!(OutputFormat::Png.supports_transparency());
        assert!(!OutputFormat::Jpeg.supports_transparency());
    }

    #[test]
    fn test_rgb_color_from_components() {
        let color = RgbColor::try_from([255u8, 0, 0].as_slice()).unwrap();
        assert_eq!(color, RgbColor::new(255, 0, 0));
        assert_eq!(color.to_string(), "RGB(255, 0, 0)");

        assert!(RgbColor::try_from([1u8, 2].as_slice()).is_err());
        assert!(RgbColor::try_from([1u8, 2, 3, 4].as_slice()).is_err());
    }

    #[test]
    fn test_rgb_color_range_check() {
        assert_eq!(
            RgbColor::try_from([0i64, 128, 255].as_slice()).unwrap(),
            RgbColor::new(0, 128, 255)
        );
        let err = RgbColor::try_from([0i64, 256, 0].as_slice()).unwrap_err();
        assert!(err.to_string().contains("256"));
        assert!(RgbColor::try_from([-1i64, 0, 0].as_slice()).is_err());
    }

    #[test]
    fn test_default_color_is_white() {
        assert_eq!(RgbColor::default(), RgbColor::WHITE);
        assert_eq!(RgbColor::default().channels(), [255, 255, 255]);
    }

    #[test]
    fn test_output_suffix() {
        let plain = ProcessingOptions::new(OutputFormat::Png, None);
        assert_eq!(plain.output_suffix(), "_output");

        let colored = ProcessingOptions::new(OutputFormat::Png, Some(RgbColor::WHITE));
        assert_eq!(colored.output_suffix(), "_replaced");
    }
}
