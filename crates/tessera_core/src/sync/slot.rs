//! # Surface Slot
//!
//! Single-value blocking handoff from the host event thread to a render
//! worker thread.
//!
//! ```text
//!   Host thread                      Render thread
//!   ───────────                      ─────────────
//!   post(S1) ──┐                 ┌── take_or_wait()
//!   post(S2) ──┼─> [ Mutex { value, closed } ] ─┤    (sleeps on Condvar)
//!   close()  ──┘        + Condvar             └──> Surface(S2) | Closed
//! ```
//!
//! ## Guarantees
//!
//! - Latest wins: a second `post` before the value is taken replaces it.
//! - No missed wakeup: value, closed flag and the condvar predicate are all
//!   guarded by the same mutex, so a `post` that happens before
//!   `take_or_wait` is observed without blocking.
//! - Close wins: once closed, `take_or_wait` returns [`Handoff::Closed`] even
//!   if a value is still pending, and later posts are rejected.

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Result of a take on a [`SurfaceSlot`].
#[derive(Debug, PartialEq, Eq)]
pub enum Handoff<T> {
    /// A value was delivered.
    Surface(T),
    /// The slot was closed; no value will ever be delivered.
    Closed,
}

impl<T> Handoff<T> {
    /// Returns the delivered value, if any.
    #[inline]
    pub fn into_surface(self) -> Option<T> {
        match self {
            Self::Surface(value) => Some(value),
            Self::Closed => None,
        }
    }

    /// Whether this is the cancellation sentinel.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// What happened to a posted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOutcome {
    /// The slot was empty and now holds the value.
    Stored,
    /// An unconsumed value was overwritten and dropped.
    Replaced,
    /// The slot is closed; the value was dropped.
    Rejected,
}

struct SlotState<T> {
    value: Option<T>,
    closed: bool,
}

/// Mutex-guarded optional value with a condition variable for one waiter.
pub struct SurfaceSlot<T> {
    state: Mutex<SlotState<T>>,
    ready: Condvar,
}

impl<T> Default for SurfaceSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SurfaceSlot<T> {
    /// Creates an empty, open slot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                value: None,
                closed: false,
            }),
            ready: Condvar::new(),
        }
    }

    /// Stores `value` as the current one and wakes the waiter.
    pub fn post(&self, value: T) -> PostOutcome {
        let displaced;
        let outcome = {
            let mut state = self.state.lock();
            if state.closed {
                return PostOutcome::Rejected;
            }
            displaced = state.value.replace(value);
            self.ready.notify_one();
            if displaced.is_some() {
                PostOutcome::Replaced
            } else {
                PostOutcome::Stored
            }
        };
        // Old value is dropped outside the lock.
        drop(displaced);
        outcome
    }

    /// Takes the value, blocking until one is posted or the slot is closed.
    pub fn take_or_wait(&self) -> Handoff<T> {
        let mut state = self.state.lock();
        loop {
            if let Some(handoff) = Self::try_take_locked(&mut state) {
                return handoff;
            }
            self.ready.wait(&mut state);
        }
    }

    /// Like [`take_or_wait`](Self::take_or_wait) but gives up after `timeout`.
    ///
    /// Returns `None` on timeout.
    pub fn take_or_wait_for(&self, timeout: Duration) -> Option<Handoff<T>> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        loop {
            if let Some(handoff) = Self::try_take_locked(&mut state) {
                return Some(handoff);
            }
            if self.ready.wait_until(&mut state, deadline).timed_out() {
                return Self::try_take_locked(&mut state);
            }
        }
    }

    /// Takes the value without blocking.
    ///
    /// Returns `None` when the slot is open and empty.
    pub fn try_take(&self) -> Option<Handoff<T>> {
        Self::try_take_locked(&mut self.state.lock())
    }

    fn try_take_locked(state: &mut SlotState<T>) -> Option<Handoff<T>> {
        if state.closed {
            return Some(Handoff::Closed);
        }
        state.value.take().map(Handoff::Surface)
    }

    /// Closes the slot and wakes every waiter. Idempotent.
    ///
    /// Returns `true` if this call closed the slot. A pending value is
    /// dropped.
    pub fn close(&self) -> bool {
        let pending = {
            let mut state = self.state.lock();
            if state.closed {
                return false;
            }
            state.closed = true;
            self.ready.notify_all();
            state.value.take()
        };
        drop(pending);
        true
    }

    /// Whether the slot has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Whether a value is waiting to be taken.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.state.lock().value.is_some()
    }
}

impl<T> std::fmt::Debug for SurfaceSlot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SurfaceSlot")
            .field("pending", &state.value.is_some())
            .field("closed", &state.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_post_before_take_does_not_block() {
        let slot = SurfaceSlot::new();
        assert_eq!(slot.post(1), PostOutcome::Stored);
        assert_eq!(slot.take_or_wait(), Handoff::Surface(1));
        assert!(!slot.has_pending());
    }

    #[test]
    fn test_latest_wins() {
        let slot = SurfaceSlot::new();
        assert_eq!(slot.post("first"), PostOutcome::Stored);
        assert_eq!(slot.post("second"), PostOutcome::Replaced);
        assert_eq!(slot.take_or_wait(), Handoff::Surface("second"));
        assert_eq!(slot.try_take(), None);
    }

    #[test]
    fn test_replaced_value_is_dropped() {
        let first = Arc::new(());
        let slot = SurfaceSlot::new();
        slot.post(Arc::clone(&first));
        slot.post(Arc::new(()));
        assert_eq!(Arc::strong_count(&first), 1);
    }

    #[test]
    fn test_waiter_wakes_on_post() {
        let slot = Arc::new(SurfaceSlot::new());
        let waiting = Arc::new(AtomicBool::new(false));

        let reader = {
            let slot = Arc::clone(&slot);
            let waiting = Arc::clone(&waiting);
            thread::spawn(move || {
                waiting.store(true, Ordering::SeqCst);
                slot.take_or_wait()
            })
        };

        while !waiting.load(Ordering::SeqCst) {
            thread::yield_now();
        }
        thread::sleep(Duration::from_millis(10));
        slot.post(42u32);

        assert_eq!(reader.join().unwrap(), Handoff::Surface(42));
    }

    #[test]
    fn test_close_wakes_waiter() {
        let slot: Arc<SurfaceSlot<u32>> = Arc::new(SurfaceSlot::new());
        let reader = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || slot.take_or_wait())
        };

        thread::sleep(Duration::from_millis(10));
        assert!(slot.close());

        assert!(reader.join().unwrap().is_closed());
    }

    #[test]
    fn test_close_before_wait_is_observed() {
        let slot: SurfaceSlot<u32> = SurfaceSlot::new();
        slot.close();
        assert_eq!(slot.take_or_wait(), Handoff::Closed);
    }

    #[test]
    fn test_close_wins_over_pending_value() {
        let slot = SurfaceSlot::new();
        slot.post(7);
        slot.close();
        assert_eq!(slot.take_or_wait(), Handoff::Closed);
        assert!(!slot.has_pending());
    }

    #[test]
    fn test_close_is_idempotent() {
        let slot: SurfaceSlot<u32> = SurfaceSlot::new();
        assert!(slot.close());
        assert!(!slot.close());
        assert!(slot.is_closed());
    }

    #[test]
    fn test_post_after_close_is_rejected() {
        let slot = SurfaceSlot::new();
        slot.close();
        assert_eq!(slot.post(1), PostOutcome::Rejected);
        assert!(!slot.has_pending());
    }

    #[test]
    fn test_take_or_wait_for_times_out() {
        let slot: SurfaceSlot<u32> = SurfaceSlot::new();
        let start = Instant::now();
        assert_eq!(slot.take_or_wait_for(Duration::from_millis(20)), None);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_take_or_wait_for_delivers() {
        let slot = Arc::new(SurfaceSlot::new());
        let writer = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(5));
                slot.post(3u8);
            })
        };

        let handoff = slot.take_or_wait_for(Duration::from_secs(5));
        writer.join().unwrap();
        assert_eq!(handoff, Some(Handoff::Surface(3)));
    }

    #[test]
    fn test_handoff_stress_no_missed_wakeup() {
        // Alternate which side goes first; every round must deliver.
        for round in 0..200u32 {
            let slot = Arc::new(SurfaceSlot::new());
            let reader = {
                let slot = Arc::clone(&slot);
                thread::spawn(move || slot.take_or_wait())
            };
            if round % 2 == 0 {
                thread::yield_now();
            }
            slot.post(round);
            assert_eq!(reader.join().unwrap(), Handoff::Surface(round));
        }
    }
}
