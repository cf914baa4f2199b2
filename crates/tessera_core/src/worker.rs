//! # Render Worker
//!
//! A dedicated thread that waits for one surface, then runs the engine
//! against it until told to stop or until the engine's loop exits.
//!
//! ```text
//!              start()             surface taken          run returns
//!   CREATED ───────────> WAITING ─────────────> RUNNING ─────────────> STOPPED
//!      │                    │                                            ▲
//!      │ stop()             │ stop() (slot closed)                       │
//!      └────────────────────┴────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//!
//! - `start`, `post`, `stop`, `join`: host thread only.
//! - The worker thread only touches the shared slot, stop signal and state.
//! - The engine is borrowed through an `Arc`; the worker never destroys it.

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::config::WorkerConfig;
use crate::engine::{EngineHandle, RenderEngine, SurfaceRef};
use crate::error::{BridgeError, BridgeResult, EngineError};
use crate::sync::{Handoff, PostOutcome, StopSignal, SurfaceSlot};

static NEXT_WORKER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique id of a render worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(u64);

impl WorkerId {
    /// Allocates the next id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_WORKER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker#{}", self.0)
    }
}

/// Lifecycle state of a render worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    /// Constructed, thread not spawned.
    Created,
    /// Thread spawned, blocked until a surface is posted.
    Waiting,
    /// Engine run loop active.
    Running,
    /// Terminal.
    Stopped,
}

impl WorkerState {
    /// Whether the worker counts as active (may still touch the engine).
    #[inline]
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Waiting | Self::Running)
    }
}

/// How a worker reached [`WorkerState::Stopped`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerExit {
    /// Stopped before a surface was delivered; the engine never ran.
    Cancelled,
    /// The run loop returned after a stop request.
    Stopped,
    /// The run loop exited on its own.
    Completed,
    /// The run loop failed or panicked.
    Failed(EngineError),
}

impl WorkerExit {
    /// Whether the engine run loop was entered.
    #[inline]
    #[must_use]
    pub fn ran(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// Whether the exit is a failure.
    #[inline]
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Sent by a worker thread to its coordinator when it terminates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    /// Which worker.
    pub worker: WorkerId,
    /// How it ended.
    pub exit: WorkerExit,
}

/// State shared between the host side and the worker thread.
struct Shared<B> {
    slot: SurfaceSlot<SurfaceRef<B>>,
    stop: StopSignal,
    state: Mutex<WorkerState>,
}

/// Dedicated render thread bound to one engine and one surface slot.
pub struct RenderWorker<E: RenderEngine> {
    id: WorkerId,
    engine: Arc<EngineHandle<E>>,
    shared: Arc<Shared<E::Backing>>,
    reports: Sender<WorkerReport>,
    config: WorkerConfig,
    thread: Option<JoinHandle<WorkerExit>>,
    exit: Option<WorkerExit>,
}

impl<E: RenderEngine> RenderWorker<E> {
    /// Creates a worker in [`WorkerState::Created`] with a fresh slot.
    pub fn new(
        engine: Arc<EngineHandle<E>>,
        reports: Sender<WorkerReport>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            id: WorkerId::next(),
            engine,
            shared: Arc::new(Shared {
                slot: SurfaceSlot::new(),
                stop: StopSignal::new(),
                state: Mutex::new(WorkerState::Created),
            }),
            reports,
            config,
            thread: None,
            exit: None,
        }
    }

    /// Worker id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> WorkerId {
        self.id
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> WorkerState {
        *self.shared.state.lock()
    }

    /// Whether the worker reached [`WorkerState::Stopped`].
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state() == WorkerState::Stopped
    }

    /// Spawns the thread: `Created → Waiting`.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::InvalidTransition`] if not in `Created`.
    /// - [`BridgeError::Config`] if the thread settings are invalid; the
    ///   worker stays `Created`.
    /// - [`BridgeError::WorkerSpawn`] if the OS refuses the thread; the
    ///   worker is then `Stopped`.
    pub fn start(&mut self) -> BridgeResult<()> {
        self.config.validate()?;
        {
            let mut state = self.shared.state.lock();
            if *state != WorkerState::Created {
                return Err(BridgeError::InvalidTransition {
                    from: *state,
                    action: "start",
                });
            }
            *state = WorkerState::Waiting;
        }

        let mut builder =
            thread::Builder::new().name(format!("{}-{}", self.config.thread_name, self.id.0));
        if let Some(stack_size) = self.config.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let id = self.id;
        let engine = Arc::clone(&self.engine);
        let shared = Arc::clone(&self.shared);
        let reports = self.reports.clone();

        match builder.spawn(move || worker_main(id, &engine, &shared, &reports)) {
            Ok(handle) => {
                tracing::debug!(worker = %self.id, engine = %self.engine.id(), "render worker started");
                self.thread = Some(handle);
                Ok(())
            }
            Err(err) => {
                tracing::error!(worker = %self.id, error = %err, "failed to spawn render worker");
                self.shared.slot.close();
                *self.shared.state.lock() = WorkerState::Stopped;
                self.exit = Some(WorkerExit::Cancelled);
                Err(BridgeError::WorkerSpawn(err))
            }
        }
    }

    /// Hands a surface to the worker. Latest post wins.
    pub fn post(&self, surface: SurfaceRef<E::Backing>) -> PostOutcome {
        let descriptor = *surface.descriptor();
        let outcome = self.shared.slot.post(surface);
        tracing::debug!(worker = %self.id, surface = %descriptor, ?outcome, "surface posted");
        outcome
    }

    /// Requests termination. Safe in every state and idempotent.
    ///
    /// - `Created`: goes straight to `Stopped`.
    /// - `Waiting`: the wait returns the cancellation sentinel.
    /// - `Running`: the engine is asked to halt its run loop.
    ///
    /// Does not wait for the thread; see [`join`](Self::join).
    pub fn stop(&self) {
        // Raised first: the worker re-checks it before entering `Running`.
        if !self.shared.stop.raise() {
            return;
        }
        self.shared.slot.close();

        let state = {
            let mut state = self.shared.state.lock();
            if *state == WorkerState::Created {
                *state = WorkerState::Stopped;
            }
            *state
        };

        // At most once per worker: only the call that raised the signal gets here.
        if state == WorkerState::Running {
            self.engine.engine().request_stop();
        }
        tracing::debug!(worker = %self.id, ?state, "render worker stop requested");
    }

    /// Waits for the thread to finish and returns how it ended.
    ///
    /// Blocks forever on a `Waiting` worker that is never stopped or fed a
    /// surface. Calling it again returns the same exit.
    pub fn join(&mut self) -> WorkerExit {
        if let Some(exit) = &self.exit {
            return exit.clone();
        }

        let exit = match self.thread.take() {
            Some(handle) => handle.join().unwrap_or_else(|payload| {
                WorkerExit::Failed(EngineError::Panicked(panic_message(payload.as_ref())))
            }),
            None => {
                // Never started.
                *self.shared.state.lock() = WorkerState::Stopped;
                WorkerExit::Cancelled
            }
        };

        self.exit = Some(exit.clone());
        exit
    }

    /// Stops and joins in one call.
    pub fn shutdown(&mut self) -> WorkerExit {
        self.stop();
        self.join()
    }
}

impl<E: RenderEngine> Drop for RenderWorker<E> {
    fn drop(&mut self) {
        if self.exit.is_none() {
            self.shutdown();
        }
    }
}

impl<E: RenderEngine> fmt::Debug for RenderWorker<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderWorker")
            .field("id", &self.id)
            .field("engine", &self.engine.id())
            .field("state", &self.state())
            .field("exit", &self.exit)
            .finish()
    }
}

/// Render thread entry point.
fn worker_main<E: RenderEngine>(
    id: WorkerId,
    engine: &EngineHandle<E>,
    shared: &Shared<E::Backing>,
    reports: &Sender<WorkerReport>,
) -> WorkerExit {
    let exit = drive(id, engine, shared);
    *shared.state.lock() = WorkerState::Stopped;

    match &exit {
        WorkerExit::Failed(err) => tracing::error!(worker = %id, error = %err, "render worker failed"),
        other => tracing::info!(worker = %id, exit = ?other, "render worker stopped"),
    }

    if reports
        .send(WorkerReport {
            worker: id,
            exit: exit.clone(),
        })
        .is_err()
    {
        tracing::debug!(worker = %id, "coordinator gone, exit report dropped");
    }
    exit
}

fn drive<E: RenderEngine>(id: WorkerId, engine: &EngineHandle<E>, shared: &Shared<E::Backing>) -> WorkerExit {
    tracing::debug!(worker = %id, "waiting for surface");

    let surface = match shared.slot.take_or_wait() {
        Handoff::Surface(surface) => surface,
        Handoff::Closed => return WorkerExit::Cancelled,
    };

    {
        let mut state = shared.state.lock();
        if shared.stop.is_raised() {
            return WorkerExit::Cancelled;
        }
        *state = WorkerState::Running;
    }

    tracing::info!(
        worker = %id,
        engine = %engine.id(),
        surface = %surface.descriptor(),
        "engine run loop entered"
    );

    let result = panic::catch_unwind(AssertUnwindSafe(|| engine.engine().run(&surface, &shared.stop)));
    let stop_requested = shared.stop.is_raised();

    match result {
        Ok(Ok(())) if stop_requested => WorkerExit::Stopped,
        Ok(Ok(())) => WorkerExit::Completed,
        // Teardown invalidates the surface right after raising stop.
        Ok(Err(EngineError::SurfaceLost)) if stop_requested => WorkerExit::Stopped,
        Ok(Err(err)) => WorkerExit::Failed(err),
        Err(payload) => WorkerExit::Failed(EngineError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
