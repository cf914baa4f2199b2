//! # Headless Reference Engine
//!
//! Renders to nothing. Presents a frame to the surface's [`HeadlessTarget`]
//! every `frame_interval_ms`, sleeping on the stop signal in between, so a
//! stop request is honoured within one wakeup.
//!
//! Used by the demo binary and the end-to-end tests; also the template for
//! real engines:
//!
//! ```text
//! loop {
//!     stop raised?           → Ok(())
//!     backing() is None?     → Err(SurfaceLost)
//!     present frame
//!     max_frames reached?    → Ok(())        (run loop ends on its own)
//!     stop.wait_for(frame)   → Ok(()) when raised
//! }
//! ```

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tessera_core::{BridgeError, BridgeResult, EngineError, RenderEngine, StopSignal, SurfaceRef};
use tessera_shared::{SurfaceId, DEFAULT_FRAME_INTERVAL_MS};

/// Headless engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlessConfig {
    /// Pause between presented frames.
    pub frame_interval_ms: u64,
    /// Frames to present before the run loop ends by itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_frames: Option<u64>,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            max_frames: None,
        }
    }
}

impl HeadlessConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Config`] on malformed TOML or `max_frames = 0`.
    pub fn from_toml_str(text: &str) -> BridgeResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| BridgeError::Config(e.to_string()))?;
        if config.max_frames == Some(0) {
            return Err(BridgeError::Config("max_frames must be at least 1".into()));
        }
        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Io`] if unreadable, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Frame pacing as a duration.
    #[inline]
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

/// Surface backing of the headless engine: counts presented frames.
///
/// Cloned into every `SurfaceChanged` for one surface so the host can read
/// the count back.
#[derive(Debug, Clone, Default)]
pub struct HeadlessTarget {
    frames: Arc<AtomicU64>,
}

impl HeadlessTarget {
    /// Creates a target with no frames presented.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames presented so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    fn present(&self) {
        self.frames.fetch_add(1, Ordering::AcqRel);
    }
}

/// Counters shared between a headless engine and whoever created it.
#[derive(Debug, Default)]
pub struct HeadlessCounters {
    runs: AtomicU64,
    frames: AtomicU64,
    stop_requests: AtomicU64,
    surfaces: Mutex<Vec<SurfaceId>>,
}

impl HeadlessCounters {
    /// Point-in-time copy.
    #[must_use]
    pub fn snapshot(&self) -> HeadlessStats {
        HeadlessStats {
            runs: self.runs.load(Ordering::Acquire),
            frames: self.frames.load(Ordering::Acquire),
            stop_requests: self.stop_requests.load(Ordering::Acquire),
            surfaces: self.surfaces.lock().clone(),
        }
    }
}

/// Snapshot of [`HeadlessCounters`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadlessStats {
    /// Run loops entered.
    pub runs: u64,
    /// Frames presented across all surfaces.
    pub frames: u64,
    /// `request_stop` calls received.
    pub stop_requests: u64,
    /// Surfaces rendered to, in run order.
    pub surfaces: Vec<SurfaceId>,
}

/// GPU-less engine.
#[derive(Debug)]
pub struct HeadlessEngine {
    config: HeadlessConfig,
    counters: Arc<HeadlessCounters>,
}

impl HeadlessEngine {
    /// Creates an engine with its own counters.
    #[must_use]
    pub fn new(config: HeadlessConfig) -> Self {
        Self::with_counters(config, Arc::new(HeadlessCounters::default()))
    }

    /// Creates an engine reporting into `counters`.
    #[must_use]
    pub fn with_counters(config: HeadlessConfig, counters: Arc<HeadlessCounters>) -> Self {
        Self { config, counters }
    }

    /// Factory for a coordinator, plus the counters every engine it creates
    /// reports into.
    pub fn factory(
        config: HeadlessConfig,
    ) -> (
        impl FnMut() -> Result<Self, EngineError> + Send + 'static,
        Arc<HeadlessCounters>,
    ) {
        let counters = Arc::new(HeadlessCounters::default());
        let shared = Arc::clone(&counters);
        let factory = move || Ok(Self::with_counters(config.clone(), Arc::clone(&shared)));
        (factory, counters)
    }

    /// Shared counters.
    #[must_use]
    pub fn counters(&self) -> &Arc<HeadlessCounters> {
        &self.counters
    }
}

impl RenderEngine for HeadlessEngine {
    type Backing = HeadlessTarget;

    fn run(&self, surface: &SurfaceRef<HeadlessTarget>, stop: &StopSignal) -> Result<(), EngineError> {
        let id = surface.descriptor().id;
        self.counters.runs.fetch_add(1, Ordering::AcqRel);
        self.counters.surfaces.lock().push(id);
        tracing::debug!(surface = %surface.descriptor(), "headless run loop started");

        let interval = self.config.frame_interval();
        let mut presented = 0u64;
        loop {
            if stop.is_raised() {
                return Ok(());
            }
            let Some(target) = surface.backing() else {
                return Err(EngineError::SurfaceLost);
            };

            target.present();
            self.counters.frames.fetch_add(1, Ordering::AcqRel);
            presented += 1;

            if self.config.max_frames.is_some_and(|max| presented >= max) {
                tracing::debug!(surface = %id, presented, "frame budget reached");
                return Ok(());
            }
            if stop.wait_for(interval) {
                return Ok(());
            }
        }
    }

    fn request_stop(&self) {
        // The loop sleeps on the stop signal; nothing native to interrupt.
        self.counters.stop_requests.fetch_add(1, Ordering::AcqRel);
    }

    fn destroy(self) {
        let stats = self.counters.snapshot();
        tracing::info!(runs = stats.runs, frames = stats.frames, "headless engine destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tessera_core::SurfaceValidity;
    use tessera_shared::SurfaceDescriptor;

    fn surface(target: &HeadlessTarget, validity: &SurfaceValidity) -> SurfaceRef<HeadlessTarget> {
        SurfaceRef::new(SurfaceDescriptor::new(1, 8, 8), target.clone(), validity.clone())
    }

    #[test]
    fn test_max_frames_ends_loop() {
        let engine = HeadlessEngine::new(HeadlessConfig {
            frame_interval_ms: 0,
            max_frames: Some(5),
        });
        let target = HeadlessTarget::new();
        let validity = SurfaceValidity::new();

        assert_eq!(engine.run(&surface(&target, &validity), &StopSignal::new()), Ok(()));
        assert_eq!(target.frames(), 5);
        assert_eq!(engine.counters().snapshot().frames, 5);
    }

    #[test]
    fn test_raised_stop_presents_nothing() {
        let engine = HeadlessEngine::new(HeadlessConfig::default());
        let target = HeadlessTarget::new();
        let stop = StopSignal::new();
        stop.raise();

        assert_eq!(engine.run(&surface(&target, &SurfaceValidity::new()), &stop), Ok(()));
        assert_eq!(target.frames(), 0);
        assert_eq!(engine.counters().snapshot().runs, 1);
    }

    #[test]
    fn test_invalidated_surface_is_lost() {
        let engine = HeadlessEngine::new(HeadlessConfig::default());
        let target = HeadlessTarget::new();
        let validity = SurfaceValidity::new();
        validity.invalidate();

        assert_eq!(
            engine.run(&surface(&target, &validity), &StopSignal::new()),
            Err(EngineError::SurfaceLost)
        );
        assert_eq!(target.frames(), 0);
    }

    #[test]
    fn test_stop_from_other_thread() {
        let engine = Arc::new(HeadlessEngine::new(HeadlessConfig::default()));
        let stop = Arc::new(StopSignal::new());
        let target = HeadlessTarget::new();

        let runner = {
            let engine = Arc::clone(&engine);
            let stop = Arc::clone(&stop);
            let target = target.clone();
            thread::spawn(move || engine.run(&surface(&target, &SurfaceValidity::new()), &stop))
        };

        while target.frames() < 3 {
            thread::sleep(Duration::from_millis(1));
        }
        stop.raise();
        engine.request_stop();

        assert_eq!(runner.join().unwrap(), Ok(()));
        assert_eq!(engine.counters().snapshot().stop_requests, 1);
    }

    #[test]
    fn test_config_parsing() {
        let config = HeadlessConfig::from_toml_str("frame_interval_ms = 5\nmax_frames = 10").unwrap();
        assert_eq!(config.frame_interval(), Duration::from_millis(5));
        assert_eq!(config.max_frames, Some(10));

        assert_eq!(HeadlessConfig::from_toml_str("").unwrap(), HeadlessConfig::default());
        assert!(matches!(
            HeadlessConfig::from_toml_str("max_frames = 0"),
            Err(BridgeError::Config(_))
        ));
    }
}
