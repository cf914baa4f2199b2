//! # Bridge Error Types
//!
//! Two layers of errors:
//! - [`EngineError`]: reported by engine implementations (creation, run loop).
//! - [`BridgeError`]: reported by the bridge to the host.
//!
//! A cancelled surface wait is NOT an error. It shows up as
//! [`Handoff::Closed`](crate::sync::Handoff::Closed) and
//! [`WorkerExit::Cancelled`](crate::worker::WorkerExit::Cancelled).

use thiserror::Error;

use crate::worker::WorkerState;

/// Errors raised by a rendering engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine could not be instantiated (host environment not bindable).
    #[error("engine creation failed: {0}")]
    Creation(String),

    /// The surface was invalidated by the windowing layer while in use.
    #[error("surface lost while rendering")]
    SurfaceLost,

    /// The run loop exited abnormally.
    #[error("engine run loop failed: {0}")]
    Run(String),

    /// The run loop panicked; the panic was caught at the worker boundary.
    #[error("engine run loop panicked: {0}")]
    Panicked(String),
}

/// Errors surfaced by the bridge to the host.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Engine instantiation failed. Fatal to the coordinator, never retried.
    #[error("failed to initialize engine: {0}")]
    EngineCreation(#[source] EngineError),

    /// A surface or detach event arrived before `attach`.
    #[error("coordinator is not attached to an engine")]
    NotAttached,

    /// The OS refused to spawn the render thread.
    #[error("failed to spawn render worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// A worker operation was requested from a state that does not allow it.
    #[error("cannot {action} a render worker in state {from:?}")]
    InvalidTransition {
        /// State the worker was in.
        from: WorkerState,
        /// What was attempted.
        action: &'static str,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Reading configuration failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
