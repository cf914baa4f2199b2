//! # TESSERA Core
//!
//! Surface lifecycle bridge between a host windowing layer and a rendering
//! engine that runs its own blocking loop on a dedicated thread:
//! - Host notifications arrive on one host event thread, in any order
//! - The engine only ever renders to a surface the host still considers alive
//! - The engine is destroyed exactly once, after its render thread is joined
//!
//! ## Architecture Rules
//!
//! 1. **No polling** - The render thread sleeps on a condvar until a surface
//!    arrives or it is cancelled
//! 2. **Latest wins** - Only the most recent surface is ever handed over
//! 3. **Close wins** - A cancellation is never lost, even before `run`
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera_core::{BridgeConfig, HostEvent, LifecycleCoordinator};
//!
//! let mut coordinator = LifecycleCoordinator::new(|| MyEngine::new(), BridgeConfig::default());
//! coordinator.handle(HostEvent::Attach)?;
//! coordinator.handle(HostEvent::SurfaceAvailable)?;
//! coordinator.handle(HostEvent::SurfaceChanged { descriptor, backing })?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod event;
pub mod sync;
pub mod worker;

pub use config::{BridgeConfig, WorkerConfig};
pub use coordinator::{BackingOf, CoordinatorStats, LifecycleCoordinator};
pub use engine::{EngineFactory, EngineHandle, EngineId, RenderEngine, SurfaceRef, SurfaceValidity};
pub use error::{BridgeError, BridgeResult, EngineError};
pub use event::HostEvent;
pub use sync::{Handoff, PostOutcome, StopSignal, SurfaceSlot};
pub use worker::{RenderWorker, WorkerExit, WorkerId, WorkerReport, WorkerState};
