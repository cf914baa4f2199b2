//! # Engine Boundary
//!
//! The rendering engine is external. The bridge only needs four operations:
//!
//! | operation        | here                          | called from   |
//! |------------------|-------------------------------|---------------|
//! | `engine_create`  | [`EngineFactory::create`]     | host thread   |
//! | `engine_run`     | [`RenderEngine::run`]         | render thread |
//! | `engine_stop`    | [`RenderEngine::request_stop`]| host thread   |
//! | `engine_destroy` | [`RenderEngine::destroy`]     | host thread   |
//!
//! Engines implement [`RenderEngine`]; the bridge owns them through
//! [`EngineHandle`].

mod handle;
mod surface;

pub use handle::{EngineHandle, EngineId};
pub use surface::{SurfaceRef, SurfaceValidity};

use crate::error::EngineError;
use crate::sync::StopSignal;

/// A rendering engine driven by the bridge.
///
/// `run` executes on the render worker thread while `request_stop` and
/// `destroy` execute on the host thread, hence `Send + Sync`.
pub trait RenderEngine: Send + Sync + 'static {
    /// Engine-specific native surface backing (window, swapchain, buffer...).
    type Backing: Send + 'static;

    /// Runs the engine loop against `surface`. Blocks until the loop exits.
    ///
    /// The loop must return promptly once `stop` is raised, including when it
    /// was raised before `run` was entered. It must check
    /// [`SurfaceRef::backing`] before every use of the backing and fail with
    /// [`EngineError::SurfaceLost`] once the surface is invalidated.
    ///
    /// # Errors
    ///
    /// Any abnormal exit. The worker stops and reports it; no retry.
    fn run(&self, surface: &SurfaceRef<Self::Backing>, stop: &StopSignal) -> Result<(), EngineError>;

    /// Wakes a running loop after its [`StopSignal`] was raised.
    ///
    /// Engines that only sleep on the signal can leave this empty; engines
    /// blocked in native waits use it to break out.
    fn request_stop(&self);

    /// Releases engine resources. Called exactly once.
    fn destroy(self)
    where
        Self: Sized,
    {
        drop(self);
    }
}

/// Creates engine instances for a coordinator.
pub trait EngineFactory: Send {
    /// Engine type produced.
    type Engine: RenderEngine;

    /// Instantiates the engine.
    ///
    /// # Errors
    ///
    /// [`EngineError::Creation`] if the host environment cannot be bound.
    fn create(&mut self) -> Result<Self::Engine, EngineError>;
}

impl<E, F> EngineFactory for F
where
    E: RenderEngine,
    F: FnMut() -> Result<E, EngineError> + Send,
{
    type Engine = E;

    fn create(&mut self) -> Result<E, EngineError> {
        self()
    }
}
