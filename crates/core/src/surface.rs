use inkfield_protocol::{LayoutSize, Viewport};
use thiserror::Error;

use crate::constants::MAX_DEVICE_PIXEL_RATIO;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SurfaceError {
    /// Layout has not produced a usable size yet. Recovered by measuring
    /// again later; never shown to the user.
    #[error("surface has degenerate size {width}x{height}")]
    Degenerate { width: f64, height: f64 },
}

/// Geometry of a drawing surface sized from its real layout.
///
/// The backing store is decoupled from the displayed size: it is the
/// layout size multiplied by the capped device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMetrics {
    layout: LayoutSize,
    scale: f64,
    backing_width: u32,
    backing_height: u32,
}

impl SurfaceMetrics {
    /// Size a surface from its laid-out dimensions.
    ///
    /// Zero, negative, or non-finite dimensions are rejected so callers
    /// retry instead of drawing into degenerate geometry.
    pub fn from_layout(layout: LayoutSize, device_pixel_ratio: f64) -> Result<Self, SurfaceError> {
        let usable = |v: f64| v.is_finite() && v > 0.0;
        if !usable(layout.width) || !usable(layout.height) {
            return Err(SurfaceError::Degenerate {
                width: layout.width,
                height: layout.height,
            });
        }

        let scale = capped_pixel_ratio(device_pixel_ratio);
        Ok(Self {
            layout,
            scale,
            backing_width: (layout.width * scale).ceil() as u32,
            backing_height: (layout.height * scale).ceil() as u32,
        })
    }

    pub fn layout(&self) -> LayoutSize {
        self.layout
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn backing_width(&self) -> u32 {
        self.backing_width
    }

    pub fn backing_height(&self) -> u32 {
        self.backing_height
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.layout.width, self.layout.height, self.scale)
    }
}

/// Clamp a reported device pixel ratio into `[1, MAX_DEVICE_PIXEL_RATIO]`.
///
/// Missing or garbage ratios fall back to 1.
pub fn capped_pixel_ratio(device_pixel_ratio: f64) -> f64 {
    if device_pixel_ratio.is_finite() {
        device_pixel_ratio.clamp(1.0, MAX_DEVICE_PIXEL_RATIO)
    } else {
        1.0
    }
}
