//! Receipt image pipeline
//!
//! Turns a user-supplied photo into a compact JPEG for upload and OCR:
//!
//! 1. Normalize: bound the longer side (1200px by default), keep aspect ratio
//! 2. Crop (optional): selection in displayed coordinates, scaled to source
//! 3. Grayscale (optional): BT.601 luminance, alpha untouched
//! 4. Encode: JPEG at quality 0.3-1.0, exported as raw base64
//!
//! Decoding and encoding sit behind [`ImageCodec`] so the pipeline runs
//! without a browser and can be tested with substitute codecs.

pub mod codec;
pub mod generation;
pub mod geometry;
pub mod payload;
pub mod pipeline;
pub mod renderer;
pub mod session;
pub mod transform;

pub use codec::{ImageCodec, Quality, StandardCodec};
pub use generation::{Generation, GenerationCounter};
pub use geometry::{CropRegion, Dimensions, SourceRect};
pub use payload::{EncodedImage, decode_payload, strip_data_url_prefix};
pub use pipeline::{ProcessOptions, process_receipt};
pub use renderer::{PreviewRenderer, RenderOutcome};
pub use session::{ImageEditSession, PipelineSettings, RenderParams};
