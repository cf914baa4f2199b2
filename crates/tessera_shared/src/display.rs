//! # Display Metrics
//!
//! The host reports a display scale factor (device pixel ratio). Engines lay
//! out in logical units, so a surface's physical size is divided by it.
//!
//! ```text
//! physical 2160x3840 @ scale 2.0  →  logical 1080x1920
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SCALE_FACTOR;
use crate::surface::SurfaceDescriptor;

/// Display information queried from the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayMetrics {
    /// Physical pixels per logical pixel.
    pub scale_factor: f32,
}

impl Default for DisplayMetrics {
    fn default() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
        }
    }
}

impl DisplayMetrics {
    /// Creates metrics for a scale factor.
    ///
    /// Non-finite or non-positive factors fall back to the default so a
    /// misbehaving host never produces a zero or infinite logical size.
    #[must_use]
    pub fn new(scale_factor: f32) -> Self {
        if Self::is_valid_scale(scale_factor) {
            Self { scale_factor }
        } else {
            Self::default()
        }
    }

    /// Whether a scale factor can be used for geometry.
    #[inline]
    #[must_use]
    pub fn is_valid_scale(scale_factor: f32) -> bool {
        scale_factor.is_finite() && scale_factor > 0.0
    }

    /// Converts a physical length to logical units.
    #[inline]
    #[must_use]
    pub fn to_logical(&self, physical: u32) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let physical = physical as f32;
        physical / self.scale_factor
    }

    /// Converts a logical length to physical pixels, rounded to nearest.
    #[inline]
    #[must_use]
    pub fn to_physical(&self, logical: f32) -> u32 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let physical = (logical * self.scale_factor).round().max(0.0) as u32;
        physical
    }

    /// Logical size of a surface.
    #[must_use]
    pub fn logical_size(&self, surface: &SurfaceDescriptor) -> LogicalSize {
        LogicalSize {
            width: self.to_logical(surface.width),
            height: self.to_logical(surface.height),
        }
    }
}

/// Size in logical (density-independent) units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LogicalSize {
    /// Logical width.
    pub width: f32,
    /// Logical height.
    pub height: f32,
}
