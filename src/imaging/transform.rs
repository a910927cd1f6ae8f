//! Pixel-buffer transforms: resize, crop, grayscale

use image::{RgbaImage, imageops};
use image::imageops::FilterType;

use super::geometry::{Dimensions, SourceRect};

/// Luminance weights (ITU-R BT.601)
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

pub fn dimensions_of(image: &RgbaImage) -> Dimensions {
    Dimensions::new(image.width(), image.height())
}

/// Downscale so the longer side fits `max_dimension`; returns `None` when
/// the image already fits and no copy is needed
pub fn normalize(image: &RgbaImage, max_dimension: u32) -> Option<RgbaImage> {
    let current = dimensions_of(image);
    let target = current.fit_within(max_dimension);
    if target == current {
        return None;
    }
    Some(imageops::resize(
        image,
        target.width,
        target.height,
        FilterType::Triangle,
    ))
}

/// Copy the given rectangle into a new bitmap of exactly that size
pub fn crop(image: &RgbaImage, rect: SourceRect) -> RgbaImage {
    imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image()
}

/// Weighted-luminance grayscale written to all three colour channels
///
/// Alpha is left untouched.
pub fn grayscale(image: &RgbaImage) -> RgbaImage {
    let mut output = image.clone();
    for pixel in output.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let gray = (LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32)
            .round()
            .clamp(0.0, 255.0) as u8;
        pixel.0 = [gray, gray, gray, a];
    }
    output
}
