//! # TESSERA Shared
//!
//! Plain data exchanged between the host windowing layer, the bridge core
//! and engine implementations.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on:
//! - threading primitives (`parking_lot`, channels)
//! - any engine or windowing crate
//!
//! If you need synchronization, put it in `tessera_core`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod display;
pub mod surface;

pub use constants::{DEFAULT_FRAME_INTERVAL_MS, DEFAULT_SCALE_FACTOR, DEFAULT_WORKER_THREAD_NAME};
pub use display::{DisplayMetrics, LogicalSize};
pub use surface::{PixelFormat, SurfaceDescriptor, SurfaceId};
