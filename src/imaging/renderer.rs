//! Asynchronous preview rendering with stale-result suppression
//!
//! Each request runs on the blocking pool. Results are applied to the shared
//! preview slot only if no newer request was started in the meantime, so a
//! slow render can never overwrite a faster, newer one.

use image::RgbaImage;
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::codec::ImageCodec;
use super::generation::{Generation, GenerationCounter};
use super::payload::EncodedImage;
use super::session::{RenderParams, render};
use crate::errors::{ImageError, ImageResult};

/// What happened to a finished render
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// The result became the current preview
    Applied(EncodedImage),
    /// A newer request started first; the result was dropped
    Superseded { generation: Generation },
}

impl RenderOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Renders previews off the async runtime and keeps only the newest
#[derive(Clone)]
pub struct PreviewRenderer {
    codec: Arc<dyn ImageCodec>,
    generations: Arc<GenerationCounter>,
    current: Arc<Mutex<Option<EncodedImage>>>,
}

impl PreviewRenderer {
    pub fn new(codec: Arc<dyn ImageCodec>) -> Self {
        Self {
            codec,
            generations: Arc::new(GenerationCounter::new()),
            current: Arc::new(Mutex::new(None)),
        }
    }

    /// The most recently applied preview
    pub fn current(&self) -> Option<EncodedImage> {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn latest_generation(&self) -> Generation {
        self.generations.latest()
    }

    /// Render `bitmap` with `params`; the generation is taken before any work
    ///
    /// Errors leave the current preview in place.
    pub async fn request(
        &self,
        bitmap: Arc<RgbaImage>,
        params: RenderParams,
    ) -> ImageResult<RenderOutcome> {
        let generation = self.generations.next();
        let codec = self.codec.clone();

        let encoded = tokio::task::spawn_blocking(move || render(codec.as_ref(), &bitmap, params))
            .await
            .map_err(|e| ImageError::encode(format!("render task failed: {e}")))??;

        // Check and store under one lock so two completions cannot interleave
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if !self.generations.is_current(generation) {
            debug!(
                "Discarding stale render {} (latest {})",
                generation.value(),
                self.generations.latest().value()
            );
            return Ok(RenderOutcome::Superseded { generation });
        }
        *current = Some(encoded.clone());
        Ok(RenderOutcome::Applied(encoded))
    }
}

impl std::fmt::Debug for PreviewRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewRenderer")
            .field("latest_generation", &self.generations.latest())
            .finish_non_exhaustive()
    }
}
