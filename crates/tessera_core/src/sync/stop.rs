//! # Stop Signal
//!
//! Sticky, per-worker stop request shared between the host thread and the
//! engine's run loop.
//!
//! The flag is raised BEFORE the engine's `request_stop` hook is called, so
//! a run loop that has not started yet still sees the request when it does.
//! A fresh signal is created for every worker; nothing carries over from a
//! previous run.

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Stop request observed by an engine run loop.
#[derive(Debug, Default)]
pub struct StopSignal {
    raised: Mutex<bool>,
    condvar: Condvar,
}

impl StopSignal {
    /// Creates a signal that has not been raised.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the signal and wakes every waiter. Idempotent.
    ///
    /// Returns `true` if this call raised it.
    pub fn raise(&self) -> bool {
        let mut raised = self.raised.lock();
        if *raised {
            return false;
        }
        *raised = true;
        self.condvar.notify_all();
        true
    }

    /// Whether a stop has been requested.
    #[inline]
    #[must_use]
    pub fn is_raised(&self) -> bool {
        *self.raised.lock()
    }

    /// Blocks until the signal is raised.
    pub fn wait(&self) {
        let mut raised = self.raised.lock();
        while !*raised {
            self.condvar.wait(&mut raised);
        }
    }

    /// Sleeps for up to `timeout`, returning early if the signal is raised.
    ///
    /// Returns `true` if the signal is raised. Run loops use this for frame
    /// pacing so a stop request interrupts the sleep immediately.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut raised = self.raised.lock();
        while !*raised {
            if self.condvar.wait_until(&mut raised, deadline).timed_out() {
                break;
            }
        }
        *raised
    }
}
