//! # Bridge Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! document is a valid configuration.
//!
//! ```toml
//! synchronous_teardown = true
//!
//! [worker]
//! thread_name = "tessera-render"
//! stack_size = 4194304
//!
//! [display]
//! scale_factor = 2.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use tessera_shared::{DisplayMetrics, DEFAULT_WORKER_THREAD_NAME};

use crate::error::{BridgeError, BridgeResult};

/// Smallest stack a render thread may be given.
pub const MIN_WORKER_STACK_SIZE: usize = 64 * 1024;

/// Render thread settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Thread name prefix; the worker id is appended.
    pub thread_name: String,
    /// Stack size in bytes. `None` uses the platform default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_size: Option<usize>,
}

impl WorkerConfig {
    /// Checks the thread settings before a thread is spawned with them.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Config`] naming the offending field.
    pub fn validate(&self) -> BridgeResult<()> {
        if self.thread_name.is_empty() {
            return Err(BridgeError::Config("worker.thread_name must not be empty".into()));
        }
        if self.thread_name.contains('\0') {
            return Err(BridgeError::Config("worker.thread_name must not contain NUL".into()));
        }
        if let Some(size) = self.stack_size {
            if size < MIN_WORKER_STACK_SIZE {
                return Err(BridgeError::Config(format!(
                    "worker.stack_size must be at least {MIN_WORKER_STACK_SIZE} bytes, got {size}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            thread_name: DEFAULT_WORKER_THREAD_NAME.to_string(),
            stack_size: None,
        }
    }
}

/// Configuration of a [`LifecycleCoordinator`](crate::LifecycleCoordinator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Render thread settings.
    pub worker: WorkerConfig,
    /// Join the render worker inside `on_surface_destroyed`.
    ///
    /// When `false` the host thread returns as soon as the stop is issued and
    /// the worker is joined before the next worker starts or on detach.
    pub synchronous_teardown: bool,
    /// Display metrics reported by the host.
    pub display: DisplayMetrics,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            worker: WorkerConfig::default(),
            synchronous_teardown: true,
            display: DisplayMetrics::default(),
        }
    }
}

impl BridgeConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Config`] on malformed TOML or invalid values.
    pub fn from_toml_str(text: &str) -> BridgeResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| BridgeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Serializes back to TOML.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Config`] if serialization fails.
    pub fn to_toml_string(&self) -> BridgeResult<String> {
        toml::to_string(self).map_err(|e| BridgeError::Config(e.to_string()))
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Config`] naming the first offending field.
    pub fn validate(&self) -> BridgeResult<()> {
        self.worker.validate()?;
        if !DisplayMetrics::is_valid_scale(self.display.scale_factor) {
            return Err(BridgeError::Config(format!(
                "display.scale_factor must be finite and positive, got {}",
                self.display.scale_factor
            )));
        }
        Ok(())
    }
}
