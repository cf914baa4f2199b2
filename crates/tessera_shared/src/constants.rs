//! # Bridge Constants
//!
//! Defaults baked into the bridge. Every value here can be overridden through
//! `BridgeConfig` at startup.

/// Name given to render worker threads.
pub const DEFAULT_WORKER_THREAD_NAME: &str = "tessera-render";

/// Display scale factor used when the host reports none (1 logical px = 1 physical px).
pub const DEFAULT_SCALE_FACTOR: f32 = 1.0;

/// Frame pacing of the headless reference engine (~60Hz).
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;
