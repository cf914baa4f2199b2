//! # TESSERA
//!
//! Host-side integration of the surface lifecycle bridge:
//! - [`system::initialize`]: one-time process setup
//! - [`EventPump`]: the host event thread owning a coordinator
//! - [`HeadlessEngine`]: reference engine without a GPU
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera::{EventPump, HeadlessConfig, HeadlessEngine, HeadlessTarget};
//! use tessera_core::{BridgeConfig, HostEvent, LifecycleCoordinator};
//!
//! tessera::system::initialize();
//! let (factory, counters) = HeadlessEngine::factory(HeadlessConfig::default());
//! let pump = EventPump::spawn(LifecycleCoordinator::new(factory, BridgeConfig::default()))?;
//! pump.send(HostEvent::Attach)?;
//! pump.send(HostEvent::SurfaceAvailable)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod headless;
pub mod pump;
pub mod system;

pub use headless::{HeadlessConfig, HeadlessCounters, HeadlessEngine, HeadlessStats, HeadlessTarget};
pub use pump::{EventPump, PumpReport};
