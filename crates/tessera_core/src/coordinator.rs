//! # Lifecycle Coordinator
//!
//! Translates host notifications into engine and worker transitions.
//!
//! ```text
//! HOST EVENT            ACTION
//! ──────────            ──────
//! attach             →  create engine (once)
//! surface_available  →  join retiring workers, start a fresh worker
//! surface_changed    →  post surface to the active worker (latest wins)
//! surface_destroyed  →  stop worker, invalidate surface, join
//! detach             →  stop + join every worker, then destroy engine
//! ```
//!
//! ## Invariants
//!
//! 1. At most one worker is `Waiting` or `Running`.
//! 2. The engine is destroyed exactly once, after every worker has joined.
//! 3. Every hook runs on the single host event thread (`&mut self`).

use crossbeam_channel::{Receiver, Sender};
use std::fmt;
use std::sync::Arc;

use tessera_shared::{DisplayMetrics, LogicalSize, SurfaceDescriptor};

use crate::config::BridgeConfig;
use crate::engine::{EngineFactory, EngineHandle, RenderEngine, SurfaceRef, SurfaceValidity};
use crate::error::{BridgeError, BridgeResult};
use crate::event::HostEvent;
use crate::sync::PostOutcome;
use crate::worker::{RenderWorker, WorkerExit, WorkerId, WorkerReport, WorkerState};

/// Surface backing type of the engine produced by factory `F`.
pub type BackingOf<F> = <<F as EngineFactory>::Engine as RenderEngine>::Backing;

/// Lifecycle counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorStats {
    /// Engines instantiated.
    pub engines_created: u64,
    /// Engines destroyed.
    pub engines_destroyed: u64,
    /// Worker threads spawned.
    pub workers_started: u64,
    /// Run loops that exited on their own.
    pub runs_completed: u64,
    /// Run loops that returned after a stop request.
    pub runs_stopped: u64,
    /// Run loops that failed or panicked.
    pub runs_failed: u64,
    /// Workers stopped before a surface was delivered.
    pub waits_cancelled: u64,
    /// Surfaces accepted by a worker slot.
    pub surfaces_posted: u64,
    /// Surfaces overwritten before the worker consumed them.
    pub surfaces_replaced: u64,
    /// Surfaces dropped: no active worker, or slot already closed.
    pub surfaces_rejected: u64,
    /// Surfaces posted after the active worker already took its surface.
    /// A worker renders one surface, so these are never read.
    pub surfaces_unread: u64,
}

impl CoordinatorStats {
    fn record_exit(&mut self, exit: &WorkerExit) {
        match exit {
            WorkerExit::Cancelled => self.waits_cancelled += 1,
            WorkerExit::Stopped => self.runs_stopped += 1,
            WorkerExit::Completed => self.runs_completed += 1,
            WorkerExit::Failed(_) => self.runs_failed += 1,
        }
    }

    fn record_post(&mut self, outcome: PostOutcome) {
        match outcome {
            PostOutcome::Stored => self.surfaces_posted += 1,
            PostOutcome::Replaced => {
                self.surfaces_posted += 1;
                self.surfaces_replaced += 1;
            }
            PostOutcome::Rejected => self.surfaces_rejected += 1,
        }
    }
}

/// Owns the engine handle and the render workers of one host view.
pub struct LifecycleCoordinator<F: EngineFactory> {
    factory: F,
    config: BridgeConfig,
    engine: Option<Arc<EngineHandle<F::Engine>>>,
    /// The one worker that may be `Waiting` or `Running`.
    active: Option<RenderWorker<F::Engine>>,
    /// Stopped or self-terminated workers not joined yet.
    retiring: Vec<RenderWorker<F::Engine>>,
    /// Validity of the current host surface lifetime.
    surface: Option<SurfaceValidity>,
    reports_tx: Sender<WorkerReport>,
    reports_rx: Receiver<WorkerReport>,
    stats: CoordinatorStats,
}

impl<F: EngineFactory> LifecycleCoordinator<F> {
    /// Creates a detached coordinator.
    ///
    /// An invalid display scale factor is replaced by the default. Invalid
    /// worker thread settings surface as [`BridgeError::Config`] from
    /// [`on_surface_available`](Self::on_surface_available).
    pub fn new(factory: F, mut config: BridgeConfig) -> Self {
        if !DisplayMetrics::is_valid_scale(config.display.scale_factor) {
            tracing::warn!(
                scale_factor = config.display.scale_factor,
                "invalid display scale factor, using default"
            );
            config.display = DisplayMetrics::default();
        }
        let (reports_tx, reports_rx) = crossbeam_channel::unbounded();
        Self {
            factory,
            config,
            engine: None,
            active: None,
            retiring: Vec::new(),
            surface: None,
            reports_tx,
            reports_rx,
            stats: CoordinatorStats::default(),
        }
    }

    /// Creates a detached coordinator with default configuration.
    pub fn with_factory(factory: F) -> Self {
        Self::new(factory, BridgeConfig::default())
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Lifecycle counters.
    #[must_use]
    pub fn stats(&self) -> CoordinatorStats {
        self.stats
    }

    /// Whether an engine instance is live.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.engine.is_some()
    }

    /// State of the active worker, if any.
    #[must_use]
    pub fn worker_state(&self) -> Option<WorkerState> {
        self.active.as_ref().map(RenderWorker::state)
    }

    /// Id of the active worker, if any.
    #[must_use]
    pub fn worker_id(&self) -> Option<WorkerId> {
        self.active.as_ref().map(RenderWorker::id)
    }

    /// Host display scale factor.
    #[must_use]
    pub fn display_scale(&self) -> f32 {
        self.config.display.scale_factor
    }

    /// Updates the display metrics, e.g. after the window moved to another
    /// monitor. Invalid factors are replaced by the default.
    pub fn set_display_scale(&mut self, scale_factor: f32) {
        if !DisplayMetrics::is_valid_scale(scale_factor) {
            tracing::warn!(scale_factor, "invalid display scale factor, using default");
        }
        self.config.display = DisplayMetrics::new(scale_factor);
    }

    /// Logical size of a surface under the current display scale.
    #[must_use]
    pub fn logical_size(&self, descriptor: &SurfaceDescriptor) -> LogicalSize {
        self.config.display.logical_size(descriptor)
    }

    /// Instantiates the engine. No-op when already attached.
    ///
    /// # Errors
    ///
    /// [`BridgeError::EngineCreation`] if the factory fails. No retry.
    pub fn attach(&mut self) -> BridgeResult<()> {
        if self.engine.is_some() {
            tracing::debug!("attach while already attached, ignored");
            return Ok(());
        }
        let handle = EngineHandle::create(&mut self.factory)?;
        self.stats.engines_created += 1;
        self.engine = Some(Arc::new(handle));
        Ok(())
    }

    /// A surface now exists: start a fresh worker waiting for it.
    ///
    /// A duplicate notification while a worker is live is ignored.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::NotAttached`] before [`attach`](Self::attach).
    /// - [`BridgeError::Config`] if the worker thread settings are invalid.
    /// - [`BridgeError::WorkerSpawn`] if the render thread cannot be spawned.
    pub fn on_surface_available(&mut self) -> BridgeResult<()> {
        let engine = Arc::clone(self.engine.as_ref().ok_or(BridgeError::NotAttached)?);

        self.poll_reports();
        if let Some(active) = &self.active {
            tracing::warn!(
                worker = %active.id(),
                state = ?active.state(),
                "surface available while a worker is live, ignored"
            );
            return Ok(());
        }

        self.join_retiring();

        if let Some(previous) = self.surface.replace(SurfaceValidity::new()) {
            previous.invalidate();
        }

        let mut worker = RenderWorker::new(engine, self.reports_tx.clone(), self.config.worker.clone());
        worker.start()?;
        self.stats.workers_started += 1;
        tracing::info!(worker = %worker.id(), "surface available, render worker waiting");
        self.active = Some(worker);
        Ok(())
    }

    /// The surface was (re)configured: hand it to the active worker.
    ///
    /// Tolerated before, during and after worker start-up. Without an active
    /// worker the surface is dropped and [`PostOutcome::Rejected`] returned.
    ///
    /// A worker takes exactly one surface. Once it is `Running`, later
    /// changes (a resize, say) are stored but never read; the engine picks up
    /// size changes through its own backing. Such posts are counted in
    /// [`CoordinatorStats::surfaces_unread`]. A new surface lifetime
    /// (destroyed, then available) is the way to hand over a new surface.
    pub fn on_surface_changed(
        &mut self,
        descriptor: SurfaceDescriptor,
        backing: BackingOf<F>,
    ) -> PostOutcome {
        self.poll_reports();

        let (Some(worker), Some(validity)) = (&self.active, &self.surface) else {
            tracing::warn!(surface = %descriptor, "surface changed without an active worker, dropped");
            self.stats.record_post(PostOutcome::Rejected);
            return PostOutcome::Rejected;
        };

        let consumed = worker.state() == WorkerState::Running;
        let outcome = worker.post(SurfaceRef::new(descriptor, backing, validity.clone()));
        self.stats.record_post(outcome);
        if consumed && outcome != PostOutcome::Rejected {
            tracing::debug!(worker = %worker.id(), surface = %descriptor, "surface posted to a running worker, unread");
            self.stats.surfaces_unread += 1;
        }
        outcome
    }

    /// The surface is going away: stop the worker and invalidate the surface.
    ///
    /// With `synchronous_teardown` the worker is joined before returning and
    /// its exit is returned. Otherwise it is joined before the next worker
    /// starts or on detach, and `None` is returned.
    pub fn on_surface_destroyed(&mut self) -> Option<WorkerExit> {
        let worker = self.active.take();

        if let Some(worker) = &worker {
            worker.stop();
        }
        if let Some(validity) = self.surface.take() {
            validity.invalidate();
        }

        let Some(mut worker) = worker else {
            tracing::debug!("surface destroyed without an active worker");
            self.poll_reports();
            return None;
        };

        if self.config.synchronous_teardown {
            let exit = worker.join();
            tracing::info!(worker = %worker.id(), ?exit, "surface destroyed, render worker joined");
            self.poll_reports();
            Some(exit)
        } else {
            tracing::info!(worker = %worker.id(), "surface destroyed, render worker retiring");
            self.retiring.push(worker);
            None
        }
    }

    /// Stops and joins every worker, then destroys the engine. No-op when
    /// detached.
    ///
    /// # Panics
    ///
    /// If the engine is still shared after every worker was joined, which
    /// would mean a worker escaped the coordinator.
    pub fn detach(&mut self) {
        let Some(engine) = self.engine.take() else {
            tracing::debug!("detach while detached, ignored");
            return;
        };

        let workers = self.active.take().into_iter().chain(self.retiring.drain(..));
        for mut worker in workers {
            if worker.state().is_live() {
                tracing::warn!(worker = %worker.id(), state = ?worker.state(), "detach forcing render worker stop");
            }
            let exit = worker.shutdown();
            tracing::debug!(worker = %worker.id(), ?exit, "render worker joined on detach");
        }
        if let Some(validity) = self.surface.take() {
            validity.invalidate();
        }
        self.poll_reports();

        match Arc::try_unwrap(engine) {
            Ok(handle) => {
                handle.destroy();
                self.stats.engines_destroyed += 1;
            }
            Err(engine) => panic!(
                "{} still shared by {} owners after all render workers joined",
                engine.id(),
                Arc::strong_count(&engine) - 1
            ),
        }
    }

    /// Applies one host event.
    ///
    /// # Errors
    ///
    /// As the corresponding hook.
    pub fn handle(&mut self, event: HostEvent<BackingOf<F>>) -> BridgeResult<()> {
        tracing::trace!(event = event.name(), "host event");
        match event {
            HostEvent::Attach => self.attach()?,
            HostEvent::Detach => self.detach(),
            HostEvent::SurfaceAvailable => self.on_surface_available()?,
            HostEvent::SurfaceChanged { descriptor, backing } => {
                self.on_surface_changed(descriptor, backing);
            }
            HostEvent::SurfaceDestroyed => {
                self.on_surface_destroyed();
            }
        }
        Ok(())
    }

    /// Drains worker exit reports. Returns how many were drained.
    ///
    /// An active worker whose run loop ended by itself is retired so the
    /// next surface-available starts a fresh one.
    pub fn poll_reports(&mut self) -> usize {
        let mut drained = 0;
        while let Ok(report) = self.reports_rx.try_recv() {
            drained += 1;
            self.stats.record_exit(&report.exit);

            if self.active.as_ref().is_some_and(|w| w.id() == report.worker) {
                tracing::info!(worker = %report.worker, exit = ?report.exit, "active render worker ended on its own");
                if let Some(worker) = self.active.take() {
                    self.retiring.push(worker);
                }
            }
        }
        drained
    }

    fn join_retiring(&mut self) {
        for mut worker in self.retiring.drain(..) {
            let exit = worker.shutdown();
            tracing::debug!(worker = %worker.id(), ?exit, "retired render worker joined");
        }
        self.poll_reports();
    }
}

impl<F: EngineFactory> Drop for LifecycleCoordinator<F> {
    fn drop(&mut self) {
        if self.engine.is_some() {
            tracing::warn!("coordinator dropped while attached, detaching");
            self.detach();
        }
    }
}

impl<F: EngineFactory> fmt::Debug for LifecycleCoordinator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleCoordinator")
            .field("engine", &self.engine.as_ref().map(|e| e.id()))
            .field("active", &self.active)
            .field("retiring", &self.retiring.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::sync::StopSignal;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;
    use tessera_shared::SurfaceId;

    #[derive(Default)]
    struct Tally {
        runs: Mutex<Vec<SurfaceId>>,
        stop_requests: AtomicUsize,
        destroyed: AtomicUsize,
        exit_on_own: AtomicBool,
        fail: AtomicBool,
    }

    struct TallyEngine(Arc<Tally>);

    impl RenderEngine for TallyEngine {
        type Backing = u32;

        fn run(&self, surface: &SurfaceRef<u32>, stop: &StopSignal) -> Result<(), EngineError> {
            self.0.runs.lock().push(surface.descriptor().id);
            if self.0.fail.load(Ordering::SeqCst) {
                return Err(EngineError::Run("device lost".into()));
            }
            if self.0.exit_on_own.load(Ordering::SeqCst) {
                return Ok(());
            }
            stop.wait();
            Ok(())
        }

        fn request_stop(&self) {
            self.0.stop_requests.fetch_add(1, Ordering::SeqCst);
        }

        fn destroy(self) {
            self.0.destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }

    type TallyFactory = Box<dyn FnMut() -> Result<TallyEngine, EngineError> + Send>;

    fn coordinator(tally: &Arc<Tally>) -> LifecycleCoordinator<TallyFactory> {
        let tally = Arc::clone(tally);
        let factory: TallyFactory = Box::new(move || Ok(TallyEngine(Arc::clone(&tally))));
        LifecycleCoordinator::with_factory(factory)
    }

    fn asynchronous(tally: &Arc<Tally>) -> LifecycleCoordinator<TallyFactory> {
        let tally = Arc::clone(tally);
        let factory: TallyFactory = Box::new(move || Ok(TallyEngine(Arc::clone(&tally))));
        let config = BridgeConfig {
            synchronous_teardown: false,
            ..BridgeConfig::default()
        };
        LifecycleCoordinator::new(factory, config)
    }

    fn wait_for_report(coordinator: &mut LifecycleCoordinator<TallyFactory>) {
        for _ in 0..2_000 {
            if coordinator.poll_reports() > 0 {
                return;
            }
            thread::sleep(Duration::from_millis(1));
        }
        panic!("worker never reported an exit");
    }

    fn wait_for(coordinator: &LifecycleCoordinator<TallyFactory>, wanted: WorkerState) {
        for _ in 0..2_000 {
            if coordinator.worker_state() == Some(wanted) {
                return;
            }
            thread::sleep(Duration::from_millis(1));
        }
        panic!("worker never reached {wanted:?}");
    }

    #[test]
    fn test_surface_available_requires_attach() {
        let tally = Arc::new(Tally::default());
        let mut coordinator = coordinator(&tally);
        assert!(matches!(
            coordinator.on_surface_available(),
            Err(BridgeError::NotAttached)
        ));
        assert_eq!(coordinator.worker_state(), None);
    }

    #[test]
    fn test_attach_is_idempotent() {
        let tally = Arc::new(Tally::default());
        let mut coordinator = coordinator(&tally);
        coordinator.attach().unwrap();
        coordinator.attach().unwrap();
        assert_eq!(coordinator.stats().engines_created, 1);
        coordinator.detach();
        coordinator.detach();
        assert_eq!(tally.destroyed.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.stats().engines_destroyed, 1);
    }

    #[test]
    fn test_creation_failure_leaves_detached() {
        let factory: TallyFactory = Box::new(|| Err(EngineError::Creation("no display".into())));
        let mut coordinator = LifecycleCoordinator::with_factory(factory);
        assert!(matches!(
            coordinator.attach(),
            Err(BridgeError::EngineCreation(_))
        ));
        assert!(!coordinator.is_attached());
    }

    #[test]
    fn test_changed_without_worker_rejected() {
        let tally = Arc::new(Tally::default());
        let mut coordinator = coordinator(&tally);
        coordinator.attach().unwrap();

        let outcome = coordinator.on_surface_changed(SurfaceDescriptor::new(1, 10, 10), 0);
        assert_eq!(outcome, PostOutcome::Rejected);
        assert_eq!(coordinator.stats().surfaces_rejected, 1);
    }

    #[test]
    fn test_duplicate_available_keeps_worker() {
        let tally = Arc::new(Tally::default());
        let mut coordinator = coordinator(&tally);
        coordinator.attach().unwrap();
        coordinator.on_surface_available().unwrap();
        let first = coordinator.worker_id();

        coordinator.on_surface_available().unwrap();
        assert_eq!(coordinator.worker_id(), first);
        assert_eq!(coordinator.stats().workers_started, 1);
    }

    #[test]
    fn test_destroyed_returns_exit() {
        let tally = Arc::new(Tally::default());
        let mut coordinator = coordinator(&tally);
        coordinator.attach().unwrap();
        coordinator.on_surface_available().unwrap();
        coordinator.on_surface_changed(SurfaceDescriptor::new(1, 10, 10), 7);
        wait_for(&coordinator, WorkerState::Running);

        assert_eq!(coordinator.on_surface_destroyed(), Some(WorkerExit::Stopped));
        assert_eq!(coordinator.worker_state(), None);
        assert_eq!(coordinator.stats().runs_stopped, 1);
        assert_eq!(coordinator.on_surface_destroyed(), None);
    }

    #[test]
    fn test_self_terminated_worker_is_retired() {
        let tally = Arc::new(Tally::default());
        tally.exit_on_own.store(true, Ordering::SeqCst);
        let mut coordinator = coordinator(&tally);
        coordinator.attach().unwrap();
        coordinator.on_surface_available().unwrap();
        coordinator.on_surface_changed(SurfaceDescriptor::new(1, 10, 10), 7);

        for _ in 0..2_000 {
            if coordinator.poll_reports() > 0 {
                break;
            }
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(coordinator.worker_state(), None);
        assert_eq!(coordinator.stats().runs_completed, 1);

        coordinator.on_surface_available().unwrap();
        assert_eq!(coordinator.stats().workers_started, 2);
    }

    #[test]
    fn test_asynchronous_teardown_joins_before_next_worker() {
        let tally = Arc::new(Tally::default());
        let mut coordinator = asynchronous(&tally);

        coordinator.attach().unwrap();
        coordinator.on_surface_available().unwrap();
        coordinator.on_surface_changed(SurfaceDescriptor::new(1, 10, 10), 1);
        wait_for(&coordinator, WorkerState::Running);
        assert_eq!(coordinator.on_surface_destroyed(), None);

        coordinator.on_surface_available().unwrap();
        assert_eq!(coordinator.stats().runs_stopped, 1);
        coordinator.detach();
        assert_eq!(tally.destroyed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_asynchronous_teardown_requests_stop_once() {
        let tally = Arc::new(Tally::default());
        let mut coordinator = asynchronous(&tally);
        coordinator.attach().unwrap();

        // Retired worker joined by the next surface_available.
        coordinator.on_surface_available().unwrap();
        coordinator.on_surface_changed(SurfaceDescriptor::new(1, 10, 10), 1);
        wait_for(&coordinator, WorkerState::Running);
        coordinator.on_surface_destroyed();
        coordinator.on_surface_available().unwrap();
        assert_eq!(tally.stop_requests.load(Ordering::SeqCst), 1);

        // Retired worker joined by detach.
        coordinator.on_surface_changed(SurfaceDescriptor::new(2, 10, 10), 2);
        wait_for(&coordinator, WorkerState::Running);
        coordinator.on_surface_destroyed();
        coordinator.detach();
        assert_eq!(tally.stop_requests.load(Ordering::SeqCst), 2);
        assert_eq!(coordinator.stats().runs_stopped, 2);
    }

    #[test]
    fn test_failed_run_is_retired_until_next_surface() {
        let tally = Arc::new(Tally::default());
        tally.fail.store(true, Ordering::SeqCst);
        let mut coordinator = coordinator(&tally);
        coordinator.attach().unwrap();
        coordinator.on_surface_available().unwrap();
        coordinator.on_surface_changed(SurfaceDescriptor::new(1, 10, 10), 1);

        wait_for_report(&mut coordinator);
        assert_eq!(coordinator.worker_state(), None);
        assert_eq!(coordinator.stats().runs_failed, 1);

        // Nothing runs again on a late change without a new surface lifetime.
        assert_eq!(
            coordinator.on_surface_changed(SurfaceDescriptor::new(1, 20, 20), 1),
            PostOutcome::Rejected
        );
        thread::sleep(Duration::from_millis(10));
        assert_eq!(*tally.runs.lock(), vec![SurfaceId(1)]);

        tally.fail.store(false, Ordering::SeqCst);
        coordinator.on_surface_available().unwrap();
        coordinator.on_surface_changed(SurfaceDescriptor::new(2, 10, 10), 2);
        wait_for(&coordinator, WorkerState::Running);
        assert_eq!(*tally.runs.lock(), vec![SurfaceId(1), SurfaceId(2)]);
        assert_eq!(coordinator.stats().workers_started, 2);

        coordinator.detach();
        assert_eq!(coordinator.stats().runs_failed, 1);
        assert_eq!(coordinator.stats().runs_stopped, 1);
    }

    #[test]
    fn test_change_after_running_is_counted_unread() {
        let tally = Arc::new(Tally::default());
        let mut coordinator = coordinator(&tally);
        coordinator.attach().unwrap();
        coordinator.on_surface_available().unwrap();
        coordinator.on_surface_changed(SurfaceDescriptor::new(1, 10, 10), 1);
        wait_for(&coordinator, WorkerState::Running);

        let outcome = coordinator.on_surface_changed(SurfaceDescriptor::new(1, 20, 20), 1);
        assert_ne!(outcome, PostOutcome::Rejected);
        let stats = coordinator.stats();
        assert_eq!(stats.surfaces_posted, 2);
        assert_eq!(stats.surfaces_unread, 1);

        coordinator.detach();
        assert_eq!(*tally.runs.lock(), vec![SurfaceId(1)]);
    }

    #[test]
    fn test_invalid_thread_name_is_config_error() {
        let tally = Arc::new(Tally::default());
        let tally_for_factory = Arc::clone(&tally);
        let factory: TallyFactory = Box::new(move || Ok(TallyEngine(Arc::clone(&tally_for_factory))));
        let mut config = BridgeConfig::default();
        config.worker.thread_name = "render\0thread".into();
        let mut coordinator = LifecycleCoordinator::new(factory, config);
        coordinator.attach().unwrap();

        assert!(matches!(
            coordinator.on_surface_available(),
            Err(BridgeError::Config(_))
        ));
        assert_eq!(coordinator.worker_state(), None);
        assert_eq!(coordinator.stats().workers_started, 0);

        coordinator.detach();
        assert_eq!(tally.destroyed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_detaches() {
        let tally = Arc::new(Tally::default());
        {
            let mut coordinator = coordinator(&tally);
            coordinator.attach().unwrap();
            coordinator.on_surface_available().unwrap();
            coordinator.on_surface_changed(SurfaceDescriptor::new(1, 10, 10), 1);
        }
        assert_eq!(tally.destroyed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_display_scale() {
        let tally = Arc::new(Tally::default());
        let mut coordinator = coordinator(&tally);
        assert!((coordinator.display_scale() - 1.0).abs() < f32::EPSILON);

        coordinator.set_display_scale(2.0);
        let size = coordinator.logical_size(&SurfaceDescriptor::new(1, 2160, 3840));
        assert!((size.width - 1080.0).abs() < f32::EPSILON);
        assert!((size.height - 1920.0).abs() < f32::EPSILON);

        coordinator.set_display_scale(f32::NAN);
        assert!((coordinator.display_scale() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_invalid_scale_in_config_falls_back() {
        let tally = Arc::new(Tally::default());
        let tally_for_factory = Arc::clone(&tally);
        let factory: TallyFactory = Box::new(move || Ok(TallyEngine(Arc::clone(&tally_for_factory))));
        let mut config = BridgeConfig::default();
        config.display.scale_factor = 0.0;
        let coordinator = LifecycleCoordinator::new(factory, config);

        assert!((coordinator.display_scale() - 1.0).abs() < f32::EPSILON);
        let size = coordinator.logical_size(&SurfaceDescriptor::new(1, 640, 480));
        assert!(size.width.is_finite() && size.height.is_finite());
        assert!((size.width - 640.0).abs() < f32::EPSILON);
    }
}
