//! Size bounding and displayed-to-source crop mapping

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{ImageError, ImageResult};

/// Width and height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn longest_side(&self) -> u32 {
        self.width.max(self.height)
    }

    /// Width over height; `None` for a zero height
    pub fn aspect_ratio(&self) -> Option<f64> {
        (self.height > 0).then(|| self.width as f64 / self.height as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Scale down so the longer side is at most `max_dimension`, keeping aspect
    ///
    /// Images that already fit are returned unchanged; nothing is upscaled.
    pub fn fit_within(&self, max_dimension: u32) -> Dimensions {
        if self.width <= max_dimension && self.height <= max_dimension {
            return *self;
        }

        let max = max_dimension as f64;
        let (width, height) = if self.width > self.height {
            (max, self.height as f64 * max / self.width as f64)
        } else {
            (self.width as f64 * max / self.height as f64, max)
        };

        Dimensions {
            width: (width.round() as u32).max(1),
            height: (height.round() as u32).max(1),
        }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A crop selection in displayed (on-screen, scaled) image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A rectangle in source bitmap pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SourceRect {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

impl CropRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Reject selections narrower or shorter than `min_size` displayed pixels
    pub fn validate(&self, min_size: u32) -> ImageResult<()> {
        if self.width < min_size || self.height < min_size {
            return Err(ImageError::CropTooSmall {
                width: self.width,
                height: self.height,
                min: min_size,
            });
        }
        Ok(())
    }

    /// Intersect this selection with a `displayed`-sized view
    ///
    /// Returns `None` when the selection lies entirely outside it.
    pub fn visible_within(&self, displayed: Dimensions) -> Option<CropRegion> {
        let left = self.x.min(displayed.width);
        let top = self.y.min(displayed.height);
        let right = self.x.saturating_add(self.width).min(displayed.width);
        let bottom = self.y.saturating_add(self.height).min(displayed.height);
        if right <= left || bottom <= top {
            return None;
        }
        Some(CropRegion::new(left, top, right - left, bottom - top))
    }

    /// Map this selection onto the source bitmap
    ///
    /// The selection is first cut to the displayed view; what remains must
    /// still meet `min_size` on both sides. Each axis is then scaled by
    /// `natural / displayed` and clamped to the bitmap bounds.
    pub fn to_source(
        &self,
        displayed: Dimensions,
        natural: Dimensions,
        min_size: u32,
    ) -> ImageResult<SourceRect> {
        self.validate(min_size)?;
        if displayed.is_empty() {
            return Err(ImageError::invalid_dimensions(format!(
                "displayed size {displayed} has a zero side"
            )));
        }
        if natural.is_empty() {
            return Err(ImageError::invalid_dimensions(format!(
                "bitmap size {natural} has a zero side"
            )));
        }

        let visible = self
            .visible_within(displayed)
            .unwrap_or(CropRegion::new(0, 0, 0, 0));
        visible.validate(min_size)?;

        let scale_x = natural.width as f64 / displayed.width as f64;
        let scale_y = natural.height as f64 / displayed.height as f64;

        let x = ((visible.x as f64 * scale_x).round() as u32).min(natural.width - 1);
        let y = ((visible.y as f64 * scale_y).round() as u32).min(natural.height - 1);
        let width = ((visible.width as f64 * scale_x).round() as u32)
            .clamp(1, natural.width - x);
        let height = ((visible.height as f64 * scale_y).round() as u32)
            .clamp(1, natural.height - y);

        Ok(SourceRect {
            x,
            y,
            width,
            height,
        })
    }
}
