//! Surface references handed to the engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tessera_shared::SurfaceDescriptor;

/// Shared validity flag of one host surface lifetime.
///
/// Created valid on surface-available, invalidated by the coordinator on
/// surface-destroyed. Every [`SurfaceRef`] posted during that lifetime shares
/// the flag.
#[derive(Debug, Clone)]
pub struct SurfaceValidity(Arc<AtomicBool>);

impl Default for SurfaceValidity {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceValidity {
    /// Creates a valid flag.
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    /// Whether the surface may still be drawn to.
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Marks the surface as gone. Returns `true` if it was valid.
    pub fn invalidate(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

/// The current drawable target: host descriptor plus engine-specific backing.
pub struct SurfaceRef<B> {
    descriptor: SurfaceDescriptor,
    backing: B,
    validity: SurfaceValidity,
}

impl<B> SurfaceRef<B> {
    /// Binds a backing to a surface lifetime.
    pub fn new(descriptor: SurfaceDescriptor, backing: B, validity: SurfaceValidity) -> Self {
        Self {
            descriptor,
            backing,
            validity,
        }
    }

    /// Dimensions and format.
    #[inline]
    #[must_use]
    pub fn descriptor(&self) -> &SurfaceDescriptor {
        &self.descriptor
    }

    /// Whether the windowing layer still considers this surface alive.
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validity.is_valid()
    }

    /// The native backing, or `None` once the surface was invalidated.
    ///
    /// Engines must go through this accessor for every frame; the backing
    /// must never be touched after the windowing layer destroyed it.
    #[inline]
    #[must_use]
    pub fn backing(&self) -> Option<&B> {
        self.is_valid().then_some(&self.backing)
    }

    /// The shared validity flag.
    #[must_use]
    pub fn validity(&self) -> &SurfaceValidity {
        &self.validity
    }
}

impl<B> std::fmt::Debug for SurfaceRef<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceRef")
            .field("descriptor", &self.descriptor)
            .field("valid", &self.is_valid())
            .finish_non_exhaustive()
    }
}
