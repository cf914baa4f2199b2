//! Owned engine instance.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{EngineFactory, RenderEngine};
use crate::error::{BridgeError, BridgeResult};

static NEXT_ENGINE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique id of an engine instance, for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineId(u64);

impl EngineId {
    fn next() -> Self {
        Self(NEXT_ENGINE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "engine#{}", self.0)
    }
}

/// One live engine instance.
///
/// Destroyed exactly once: either explicitly through
/// [`destroy`](Self::destroy), which consumes the handle, or on drop.
/// Workers share it as `Arc<EngineHandle<E>>`; the coordinator can only
/// reach `destroy` after unwrapping the last `Arc`, i.e. after every worker
/// has been joined.
pub struct EngineHandle<E: RenderEngine> {
    id: EngineId,
    engine: Option<E>,
}

impl<E: RenderEngine> EngineHandle<E> {
    /// Instantiates an engine through `factory`.
    ///
    /// # Errors
    ///
    /// [`BridgeError::EngineCreation`] if the factory fails. No retry.
    pub fn create<F>(factory: &mut F) -> BridgeResult<Self>
    where
        F: EngineFactory<Engine = E> + ?Sized,
    {
        let engine = factory.create().map_err(|err| {
            tracing::error!(error = %err, "engine creation failed");
            BridgeError::EngineCreation(err)
        })?;
        let handle = Self::from_engine(engine);
        tracing::info!(engine = %handle.id, "engine created");
        Ok(handle)
    }

    /// Wraps an already-instantiated engine.
    pub fn from_engine(engine: E) -> Self {
        Self {
            id: EngineId::next(),
            engine: Some(engine),
        }
    }

    /// Id for logs.
    #[inline]
    #[must_use]
    pub fn id(&self) -> EngineId {
        self.id
    }

    /// The engine.
    ///
    /// # Panics
    ///
    /// Never in practice: the engine is only taken by `destroy(self)` and
    /// `drop`, after which the handle is unreachable.
    #[inline]
    #[must_use]
    pub fn engine(&self) -> &E {
        match self.engine.as_ref() {
            Some(engine) => engine,
            None => unreachable!("{} used after destroy", self.id),
        }
    }

    /// Releases all engine resources.
    pub fn destroy(mut self) {
        if let Some(engine) = self.engine.take() {
            engine.destroy();
            tracing::info!(engine = %self.id, "engine destroyed");
        }
    }
}

impl<E: RenderEngine> Drop for EngineHandle<E> {
    fn drop(&mut self) {
        if let Some(engine) = self.engine.take() {
            tracing::warn!(engine = %self.id, "engine destroyed on drop without explicit detach");
            engine.destroy();
        }
    }
}

impl<E: RenderEngine> fmt::Debug for EngineHandle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineHandle")
            .field("id", &self.id)
            .field("live", &self.engine.is_some())
            .finish()
    }
}
