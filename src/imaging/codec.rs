//! Decode/encode boundary of the pipeline
//!
//! Transforms only see [`RgbaImage`] buffers; everything format-specific
//! lives behind [`ImageCodec`].

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::config::defaults::{DEFAULT_JPEG_QUALITY, MAX_JPEG_QUALITY, MIN_JPEG_QUALITY};
use crate::errors::{ImageError, ImageResult};

/// JPEG encoder quality in `[0.3, 1.0]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Quality(f32);

impl Quality {
    pub const MIN: Quality = Quality(MIN_JPEG_QUALITY);
    pub const MAX: Quality = Quality(MAX_JPEG_QUALITY);

    /// Out-of-range or non-finite values are clamped, not rejected
    pub fn new(value: f32) -> Self {
        if !value.is_finite() {
            warn!("Non-finite JPEG quality {}, using default", value);
            return Self::default();
        }
        let clamped = value.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY);
        if clamped != value {
            warn!("JPEG quality {} clamped to {}", value, clamped);
        }
        Self(clamped)
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    /// Quality on the encoder's 1-100 scale
    pub fn percent(&self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(DEFAULT_JPEG_QUALITY)
    }
}

impl From<f32> for Quality {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl From<Quality> for f32 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// Turns bytes into pixel buffers and back
pub trait ImageCodec: Send + Sync {
    /// Decode any supported input format to RGBA
    fn decode(&self, bytes: &[u8]) -> ImageResult<RgbaImage>;

    /// Encode to baseline JPEG at `quality`
    fn encode_jpeg(&self, image: &RgbaImage, quality: Quality) -> ImageResult<Vec<u8>>;
}

/// [`ImageCodec`] backed by the `image` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardCodec;

impl ImageCodec for StandardCodec {
    fn decode(&self, bytes: &[u8]) -> ImageResult<RgbaImage> {
        if bytes.is_empty() {
            return Err(ImageError::source_load("empty file"));
        }
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| ImageError::source_load(e.to_string()))?;
        debug!(
            "Decoded {} byte source to {}x{}",
            bytes.len(),
            decoded.width(),
            decoded.height()
        );
        Ok(decoded.to_rgba8())
    }

    fn encode_jpeg(&self, image: &RgbaImage, quality: Quality) -> ImageResult<Vec<u8>> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ImageError::encode("cannot encode an empty bitmap"));
        }

        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, quality.percent())
            .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
            .map_err(|e| ImageError::encode(e.to_string()))?;
        Ok(bytes)
    }
}
