//! Interactive editing state for one receipt photo
//!
//! Every parameter change re-renders from the working bitmap, so grayscale
//! and quality never compound. Crop is the exception: it replaces the
//! working bitmap until [`ImageEditSession::reset`].

use image::RgbaImage;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, info};

use super::codec::{ImageCodec, Quality, StandardCodec};
use super::geometry::{CropRegion, Dimensions};
use super::payload::EncodedImage;
use super::renderer::RenderOutcome;
use super::transform;
use crate::config::ImagingConfig;
use crate::config::defaults::{DEFAULT_MAX_DIMENSION, DEFAULT_MIN_CROP_SIZE};
use crate::errors::ImageResult;

/// Fixed limits for a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    pub max_dimension: u32,
    pub min_crop_size: u32,
    pub default_quality: Quality,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            min_crop_size: DEFAULT_MIN_CROP_SIZE,
            default_quality: Quality::default(),
        }
    }
}

impl From<&ImagingConfig> for PipelineSettings {
    fn from(config: &ImagingConfig) -> Self {
        Self {
            max_dimension: config.max_dimension,
            min_crop_size: config.min_crop_size,
            default_quality: Quality::new(config.default_quality),
        }
    }
}

/// Parameters of a single render
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    pub quality: Quality,
    pub grayscale: bool,
}

/// Apply grayscale (on a copy) and encode
pub fn render(
    codec: &dyn ImageCodec,
    bitmap: &RgbaImage,
    params: RenderParams,
) -> ImageResult<EncodedImage> {
    let pixels: Cow<'_, RgbaImage> = if params.grayscale {
        Cow::Owned(transform::grayscale(bitmap))
    } else {
        Cow::Borrowed(bitmap)
    };
    let bytes = codec.encode_jpeg(&pixels, params.quality)?;
    Ok(EncodedImage {
        bytes,
        dimensions: transform::dimensions_of(bitmap),
        quality: params.quality,
        grayscale: params.grayscale,
    })
}

/// Editing session over one source image
///
/// Failed operations return the error and leave every field untouched,
/// so the last good preview stays available.
pub struct ImageEditSession {
    codec: Arc<dyn ImageCodec>,
    settings: PipelineSettings,
    source: Vec<u8>,
    source_dimensions: Dimensions,
    base: Arc<RgbaImage>,
    working: Arc<RgbaImage>,
    params: RenderParams,
    preview: EncodedImage,
}

impl ImageEditSession {
    /// Decode, normalize and render the initial preview with the standard codec
    pub fn open(source: Vec<u8>, settings: PipelineSettings) -> ImageResult<Self> {
        Self::open_with_codec(Arc::new(StandardCodec), source, settings)
    }

    pub fn open_with_codec(
        codec: Arc<dyn ImageCodec>,
        source: Vec<u8>,
        settings: PipelineSettings,
    ) -> ImageResult<Self> {
        let decoded = codec.decode(&source)?;
        let source_dimensions = transform::dimensions_of(&decoded);
        let base = match transform::normalize(&decoded, settings.max_dimension) {
            Some(resized) => resized,
            None => decoded,
        };
        let base = Arc::new(base);

        let params = RenderParams {
            quality: settings.default_quality,
            grayscale: false,
        };
        let preview = render(codec.as_ref(), &base, params)?;

        info!(
            "Opened receipt image: {} source, {} normalized, {} byte preview",
            source_dimensions,
            preview.dimensions,
            preview.len()
        );

        Ok(Self {
            codec,
            settings,
            source,
            source_dimensions,
            working: base.clone(),
            base,
            params,
            preview,
        })
    }

    pub fn preview(&self) -> &EncodedImage {
        &self.preview
    }

    pub fn quality(&self) -> Quality {
        self.params.quality
    }

    pub fn grayscale(&self) -> bool {
        self.params.grayscale
    }

    pub fn params(&self) -> RenderParams {
        self.params
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Original bytes as selected by the user
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    pub fn source_dimensions(&self) -> Dimensions {
        self.source_dimensions
    }

    /// Size of the bitmap the preview is rendered from
    pub fn working_dimensions(&self) -> Dimensions {
        transform::dimensions_of(&self.working)
    }

    pub fn working_bitmap(&self) -> Arc<RgbaImage> {
        self.working.clone()
    }

    pub fn codec(&self) -> Arc<dyn ImageCodec> {
        self.codec.clone()
    }

    /// Whether any edit differs from the freshly opened state
    pub fn is_modified(&self) -> bool {
        !Arc::ptr_eq(&self.base, &self.working)
            || self.params.grayscale
            || self.params.quality != self.settings.default_quality
    }

    /// Raw base64 payload of the current preview
    pub fn payload_base64(&self) -> String {
        self.preview.to_base64()
    }

    pub fn set_quality(&mut self, quality: f32) -> ImageResult<&EncodedImage> {
        let params = RenderParams {
            quality: Quality::new(quality),
            ..self.params
        };
        self.rerender(params)
    }

    pub fn set_grayscale(&mut self, enabled: bool) -> ImageResult<&EncodedImage> {
        let params = RenderParams {
            grayscale: enabled,
            ..self.params
        };
        self.rerender(params)
    }

    /// Crop the working bitmap to a selection made on a `displayed`-sized view
    ///
    /// Selections under the minimum size are rejected and nothing changes.
    pub fn apply_crop(
        &mut self,
        region: CropRegion,
        displayed: Dimensions,
    ) -> ImageResult<&EncodedImage> {
        let rect = region.to_source(
            displayed,
            self.working_dimensions(),
            self.settings.min_crop_size,
        )?;
        let cropped = Arc::new(transform::crop(&self.working, rect));
        let preview = render(self.codec.as_ref(), &cropped, self.params)?;

        debug!(
            "Cropped {} -> {} (selection {}x{} on {} view)",
            self.working_dimensions(),
            rect.dimensions(),
            region.width,
            region.height,
            displayed
        );
        self.working = cropped;
        self.preview = preview;
        Ok(&self.preview)
    }

    /// Discard crop, grayscale and quality edits
    pub fn reset(&mut self) -> ImageResult<&EncodedImage> {
        let params = RenderParams {
            quality: self.settings.default_quality,
            grayscale: false,
        };
        let preview = render(self.codec.as_ref(), &self.base, params)?;
        self.working = self.base.clone();
        self.params = params;
        self.preview = preview;
        debug!("Edit session reset to {}", self.preview.dimensions);
        Ok(&self.preview)
    }

    /// Adopt a preview produced by a [`super::PreviewRenderer`] request
    ///
    /// Superseded outcomes and renders of a different working bitmap are
    /// ignored; returns whether the session changed.
    pub fn commit_render(&mut self, outcome: &RenderOutcome) -> bool {
        let RenderOutcome::Applied(encoded) = outcome else {
            return false;
        };
        if encoded.dimensions != self.working_dimensions() {
            debug!(
                "Ignoring render of {} for a {} working bitmap",
                encoded.dimensions,
                self.working_dimensions()
            );
            return false;
        }
        self.params = RenderParams {
            quality: encoded.quality,
            grayscale: encoded.grayscale,
        };
        self.preview = encoded.clone();
        true
    }

    fn rerender(&mut self, params: RenderParams) -> ImageResult<&EncodedImage> {
        let preview = render(self.codec.as_ref(), &self.working, params)?;
        debug!(
            "Re-rendered preview: quality {}, grayscale {}, {} bytes",
            params.quality,
            params.grayscale,
            preview.len()
        );
        self.params = params;
        self.preview = preview;
        Ok(&self.preview)
    }
}

impl std::fmt::Debug for ImageEditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageEditSession")
            .field("settings", &self.settings)
            .field("source_len", &self.source.len())
            .field("source_dimensions", &self.source_dimensions)
            .field("working_dimensions", &self.working_dimensions())
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
