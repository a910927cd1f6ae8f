//! One-shot receipt preparation for non-interactive callers

use serde::{Deserialize, Serialize};
use tracing::info;

use super::geometry::{CropRegion, Dimensions};
use super::payload::EncodedImage;
use super::session::{ImageEditSession, PipelineSettings};
use crate::errors::ImageResult;

/// Edits to apply, in pipeline order: crop, grayscale, quality
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessOptions {
    /// Crop selection and the displayed size it was made on
    pub crop: Option<(CropRegion, Dimensions)>,
    pub grayscale: bool,
    /// `None` keeps the session default
    pub quality: Option<f32>,
}

/// Normalize `source` and apply `options`, returning the final JPEG
pub fn process_receipt(
    source: Vec<u8>,
    settings: PipelineSettings,
    options: &ProcessOptions,
) -> ImageResult<EncodedImage> {
    let mut session = ImageEditSession::open(source, settings)?;

    if let Some((region, displayed)) = options.crop {
        session.apply_crop(region, displayed)?;
    }
    if options.grayscale {
        session.set_grayscale(true)?;
    }
    if let Some(quality) = options.quality {
        session.set_quality(quality)?;
    }

    let preview = session.preview().clone();
    info!(
        "Prepared receipt: {} -> {} at quality {}, {} bytes",
        session.source_dimensions(),
        preview.dimensions,
        preview.quality,
        preview.len()
    );
    Ok(preview)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ImageError;
    use crate::imaging::codec::Quality;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn jpeg_source(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 200) as u8, (y % 200) as u8, 90, 255])
        });
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(image)
            .to_rgb8()
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
            .unwrap();
        bytes
    }

    #[test]
    fn test_defaults_only_normalize() {
        let out = process_receipt(
            jpeg_source(2400, 1600),
            PipelineSettings::default(),
            &ProcessOptions::default(),
        )
        .unwrap();
        assert_eq!(out.dimensions, Dimensions::new(1200, 800));
        assert_eq!(out.quality, Quality::default());
        assert!(!out.grayscale);
    }

    #[test]
    fn test_all_edits_applied() {
        let options = ProcessOptions {
            crop: Some((CropRegion::new(0, 0, 300, 200), Dimensions::new(600, 400))),
            grayscale: true,
            quality: Some(0.5),
        };
        let out = process_receipt(jpeg_source(1200, 800), PipelineSettings::default(), &options)
            .unwrap();
        assert_eq!(out.dimensions, Dimensions::new(600, 400));
        assert!(out.grayscale);
        assert_eq!(out.quality, Quality::new(0.5));
    }

    #[test]
    fn test_invalid_crop_fails_whole_run() {
        let options = ProcessOptions {
            crop: Some((CropRegion::new(0, 0, 4, 4), Dimensions::new(600, 400))),
            ..Default::default()
        };
        let err = process_receipt(jpeg_source(600, 400), PipelineSettings::default(), &options)
            .unwrap_err();
        assert!(matches!(err, ImageError::CropTooSmall { .. }));
    }
}
