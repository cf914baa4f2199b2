//! Host lifecycle notifications.

use tessera_shared::SurfaceDescriptor;

/// A notification from the host windowing layer, in delivery order.
///
/// `B` is the engine's surface backing type.
#[derive(Debug)]
pub enum HostEvent<B> {
    /// The host view was materialised; create the engine.
    Attach,
    /// The host view was torn down; stop everything and destroy the engine.
    Detach,
    /// A drawable surface came into existence.
    SurfaceAvailable,
    /// The surface was (re)configured: new size, format or backing.
    SurfaceChanged {
        /// Dimensions and format.
        descriptor: SurfaceDescriptor,
        /// Engine-specific native backing.
        backing: B,
    },
    /// The surface is about to be destroyed by the windowing layer.
    SurfaceDestroyed,
}

impl<B> HostEvent<B> {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Attach => "attach",
            Self::Detach => "detach",
            Self::SurfaceAvailable => "surface_available",
            Self::SurfaceChanged { .. } => "surface_changed",
            Self::SurfaceDestroyed => "surface_destroyed",
        }
    }
}
