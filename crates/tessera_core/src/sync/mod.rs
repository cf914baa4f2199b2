//! # Synchronization Primitives for the Surface Handoff
//!
//! ## The Problem
//!
//! ```text
//! Host thread:    surface_available ── surface_changed(S) ── surface_destroyed
//! Render thread:          start ── wait for S ── run(S) ─────── stop
//!
//! `surface_changed` may land before or after the render thread starts
//! waiting. `surface_destroyed` may land before it has run at all.
//! ```
//!
//! ## The Solution
//!
//! - [`SurfaceSlot`]: one mutex, one condvar, latest value wins, close wins.
//! - [`StopSignal`]: sticky stop flag the engine run loop can sleep on.
//!
//! No polling, no lost wakeups, no lost cancellations.

mod slot;
mod stop;

pub use slot::{Handoff, PostOutcome, SurfaceSlot};
pub use stop::StopSignal;
