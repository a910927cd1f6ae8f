//! End-to-end behaviour of the receipt image pipeline through the public API

use image::{ImageFormat, Rgba, RgbaImage};
use receipt_kit::errors::ImageError;
use receipt_kit::imaging::{
    CropRegion, Dimensions, ImageEditSession, PipelineSettings, PreviewRenderer, ProcessOptions,
    RenderOutcome, decode_payload, process_receipt,
};
use std::io::Cursor;
use std::sync::Arc;

fn png_source(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 255 / width) as u8, (y * 255 / height) as u8, 200, 255])
    });
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode png fixture");
    bytes
}

fn decode_jpeg(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
        .expect("preview is a valid JPEG")
        .to_rgba8()
}

#[test]
fn test_landscape_photo_is_normalized_and_payload_round_trips() {
    let mut session =
        ImageEditSession::open(png_source(2400, 1600), PipelineSettings::default()).unwrap();

    assert_eq!(session.source_dimensions(), Dimensions::new(2400, 1600));
    assert_eq!(session.working_dimensions(), Dimensions::new(1200, 800));

    let payload = session.payload_base64();
    assert!(!payload.starts_with("data:"));
    let bytes = decode_payload(&payload).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    assert_eq!(bytes, session.preview().bytes);

    let decoded = decode_jpeg(&bytes);
    assert_eq!(decoded.dimensions(), (1200, 800));

    // the source is never touched by edits
    let source = session.source().to_vec();
    session.set_grayscale(true).unwrap();
    assert_eq!(session.source(), source.as_slice());
}

#[test]
fn test_small_photo_keeps_its_size() {
    let session =
        ImageEditSession::open(png_source(640, 900), PipelineSettings::default()).unwrap();
    assert_eq!(session.working_dimensions(), Dimensions::new(640, 900));
    assert!(!session.is_modified());
}

#[test]
fn test_crop_grayscale_then_reset() {
    let mut session =
        ImageEditSession::open(png_source(1200, 800), PipelineSettings::default()).unwrap();
    let original = session.preview().clone();

    // selection on a half-size view maps to twice the pixels
    session
        .apply_crop(CropRegion::new(100, 50, 200, 150), Dimensions::new(600, 400))
        .unwrap();
    assert_eq!(session.working_dimensions(), Dimensions::new(400, 300));

    session.set_grayscale(true).unwrap();
    let gray = decode_jpeg(&session.preview().bytes);
    assert_eq!(gray.dimensions(), (400, 300));
    for pixel in gray.pixels().step_by(97) {
        let [r, g, b, _] = pixel.0;
        assert!(r.abs_diff(g) <= 4 && g.abs_diff(b) <= 4, "pixel {:?} is not gray", pixel);
    }

    session.reset().unwrap();
    assert!(!session.grayscale());
    assert_eq!(session.working_dimensions(), Dimensions::new(1200, 800));
    assert_eq!(session.preview(), &original);
}

#[test]
fn test_tiny_crop_is_rejected_without_side_effects() {
    let mut session =
        ImageEditSession::open(png_source(1000, 1000), PipelineSettings::default()).unwrap();
    let before = session.preview().clone();

    let err = session
        .apply_crop(CropRegion::new(10, 10, 9, 40), Dimensions::new(500, 500))
        .unwrap_err();
    assert!(matches!(err, ImageError::CropTooSmall { width: 9, height: 40, min: 10 }));
    assert!(err.is_validation());
    assert_eq!(session.preview(), &before);
    assert_eq!(session.working_dimensions(), Dimensions::new(1000, 1000));
}

#[test]
fn test_quality_changes_payload_size_and_clamps() {
    let mut session =
        ImageEditSession::open(png_source(800, 600), PipelineSettings::default()).unwrap();

    let low = session.set_quality(0.3).unwrap().len();
    let high = session.set_quality(1.0).unwrap().len();
    assert!(low < high, "q=0.3 gave {low} bytes, q=1.0 gave {high}");

    session.set_quality(0.05).unwrap();
    assert_eq!(session.quality().value(), 0.3);
    session.set_quality(7.0).unwrap();
    assert_eq!(session.quality().value(), 1.0);
}

#[test]
fn test_process_receipt_applies_all_edits() {
    let options = ProcessOptions {
        crop: Some((CropRegion::new(0, 0, 300, 300), Dimensions::new(600, 600))),
        grayscale: true,
        quality: Some(0.5),
    };
    let encoded = process_receipt(png_source(2000, 2000), PipelineSettings::default(), &options)
        .unwrap();

    assert_eq!(encoded.dimensions, Dimensions::new(600, 600));
    assert!(encoded.grayscale);
    assert_eq!(encoded.quality.value(), 0.5);
}

#[test]
fn test_undecodable_source_is_reported() {
    let err = process_receipt(
        b"definitely not an image".to_vec(),
        PipelineSettings::default(),
        &ProcessOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ImageError::SourceLoad { .. }));
    assert!(err.to_string().starts_with("Failed to process image"));
}

#[tokio::test]
async fn test_renderer_keeps_the_latest_request() {
    let session =
        ImageEditSession::open(png_source(600, 400), PipelineSettings::default()).unwrap();
    let renderer = PreviewRenderer::new(session.codec());
    let bitmap = session.working_bitmap();

    let mut params = session.params();
    params.grayscale = true;
    let first = renderer.request(bitmap.clone(), params).await.unwrap();
    assert!(matches!(first, RenderOutcome::Applied(_)));

    params.grayscale = false;
    let second = renderer.request(Arc::clone(&bitmap), params).await.unwrap();
    match second {
        RenderOutcome::Applied(encoded) => {
            assert!(!encoded.grayscale);
            assert_eq!(renderer.current(), Some(encoded));
        }
        RenderOutcome::Superseded { .. } => panic!("sequential request was superseded"),
    }
}
