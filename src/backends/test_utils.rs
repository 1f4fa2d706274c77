//! Mock backends for testing without model files
//!
//! These implement [`BackgroundRemover`] deterministically so facade and
//! batch behavior can be checked pixel by pixel.

use crate::{
    error::{BgStripError, Result},
    remover::BackgroundRemover,
};
use image::{DynamicImage, Rgba};
use std::io::Cursor;

/// Encode an image as PNG for test inputs
pub(crate) fn encode_png(image: &DynamicImage) -> Vec<u8> {
    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
        .unwrap();
    buffer
}

/// Returns its input untouched
pub(crate) struct PassthroughRemover;

impl BackgroundRemover for PassthroughRemover {
    fn remove(&self, image: &[u8]) -> Result<Vec<u8>> {
        Ok(image.to_vec())
    }

    fn name(&self) -> &str {
        "passthrough"
    }
}

/// Always fails like a crashed model session
pub(crate) struct FailingRemover;

impl BackgroundRemover for FailingRemover {
    fn remove(&self, _image: &[u8]) -> Result<Vec<u8>> {
        Err(BgStripError::model("mock inference failure"))
    }
}

/// Returns bytes that are not an image
pub(crate) struct GarbageRemover;

impl BackgroundRemover for GarbageRemover {
    fn remove(&self, _image: &[u8]) -> Result<Vec<u8>> {
        Ok(b"\x00\x01 not an image".to_vec())
    }
}

/// Treats every pixel of one exact color as background
///
/// Decodes its input (so corrupt inputs fail like a real model would),
/// makes key-colored pixels fully transparent and everything else fully
/// opaque, and returns PNG.
pub(crate) struct ChromaKeyRemover {
    key: [u8; 3],
}

impl ChromaKeyRemover {
    pub(crate) fn new(key: [u8; 3]) -> Self {
        Self { key }
    }
}

impl BackgroundRemover for ChromaKeyRemover {
    fn remove(&self, image: &[u8]) -> Result<Vec<u8>> {
        let decoded = image::load_from_memory(image)
            .map_err(|e| BgStripError::decode(format!("mock backend cannot read input: {e}")))?;
        let mut rgba = decoded.to_rgba8();
        for pixel in rgba.pixels_mut() {
            let [r, g, b, _] = pixel.0;
            let alpha = if [r, g, b] == self.key { 0 } else { 255 };
            *pixel = Rgba([r, g, b, alpha]);
        }

        Ok(encode_png(&DynamicImage::ImageRgba8(rgba)))
    }

    fn name(&self) -> &str {
        "chroma-key"
    }
}
