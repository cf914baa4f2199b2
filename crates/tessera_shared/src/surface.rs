//! # Surface Descriptors
//!
//! What the host windowing layer tells us about a drawable target.
//! The native backing itself is engine-specific and lives in `tessera_core`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one host surface.
///
/// The host assigns ids; a surface keeps its id across size/format changes
/// and a fresh id is expected after a destroy/available cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Pixel layout of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// 8 bits per channel, alpha last.
    #[default]
    Rgba8888,
    /// 8 bits per channel, alpha ignored.
    Rgbx8888,
    /// 16-bit packed RGB.
    Rgb565,
}

impl PixelFormat {
    /// Bytes per pixel.
    #[inline]
    #[must_use]
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            Self::Rgba8888 | Self::Rgbx8888 => 4,
            Self::Rgb565 => 2,
        }
    }

    /// Whether the format carries an alpha channel.
    #[inline]
    #[must_use]
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::Rgba8888)
    }
}

/// Dimensions and format of a host surface, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceDescriptor {
    /// Host-assigned surface id.
    pub id: SurfaceId,
    /// Width in physical pixels.
    pub width: u32,
    /// Height in physical pixels.
    pub height: u32,
    /// Pixel layout.
    #[serde(default)]
    pub format: PixelFormat,
}

impl SurfaceDescriptor {
    /// Creates a descriptor with the default pixel format.
    #[must_use]
    pub const fn new(id: u64, width: u32, height: u32) -> Self {
        Self {
            id: SurfaceId(id),
            width,
            height,
            format: PixelFormat::Rgba8888,
        }
    }

    /// Returns the same surface with another pixel format.
    #[must_use]
    pub const fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = format;
        self
    }

    /// A zero-sized surface cannot be drawn to.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Size of one row in bytes.
    #[inline]
    #[must_use]
    pub const fn stride(&self) -> u64 {
        self.width as u64 * self.format.bytes_per_pixel() as u64
    }

    /// Size of the whole pixel buffer in bytes.
    #[inline]
    #[must_use]
    pub const fn byte_len(&self) -> u64 {
        self.stride() * self.height as u64
    }
}

impl fmt::Display for SurfaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}x{} {:?}", self.id, self.width, self.height, self.format)
    }
}
