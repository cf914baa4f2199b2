//! # Host Event Pump
//!
//! The host event thread. Owns one [`LifecycleCoordinator`] and applies
//! [`HostEvent`]s in arrival order, so every coordinator hook runs on the
//! same thread no matter which thread the host binding calls from.
//!
//! ```text
//! host binding ──send──> [channel] ──> pump thread ──> coordinator ──> worker
//!                                          │
//!                                          └─ idle: drain worker reports
//! ```
//!
//! Dropping every sender (or calling [`EventPump::shutdown`]) detaches the
//! coordinator and ends the thread.

use crossbeam_channel::{Receiver, RecvTimeoutError, SendError, Sender};
use std::panic;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tessera_core::{
    BackingOf, BridgeError, BridgeResult, CoordinatorStats, EngineFactory, HostEvent,
    LifecycleCoordinator, RenderEngine,
};

/// Name of the host event thread.
pub const PUMP_THREAD_NAME: &str = "tessera-host";

/// How long the pump idles before draining worker reports.
pub const REPORT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Final account of a pump thread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PumpReport {
    /// Events applied, including failed ones.
    pub events: u64,
    /// Events whose hook returned an error.
    pub failed_events: u64,
    /// Coordinator counters after the final detach.
    pub stats: CoordinatorStats,
}

/// Handle to a running host event thread.
#[derive(Debug)]
pub struct EventPump<B: Send + 'static> {
    sender: Option<Sender<HostEvent<B>>>,
    thread: Option<JoinHandle<PumpReport>>,
}

impl<B: Send + 'static> EventPump<B> {
    /// Moves `coordinator` onto a new host event thread.
    ///
    /// # Errors
    ///
    /// [`BridgeError::WorkerSpawn`] if the thread cannot be spawned.
    pub fn spawn<F>(coordinator: LifecycleCoordinator<F>) -> BridgeResult<Self>
    where
        F: EngineFactory + 'static,
        F::Engine: RenderEngine<Backing = B>,
    {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let thread = thread::Builder::new()
            .name(PUMP_THREAD_NAME.to_string())
            .spawn(move || pump(coordinator, &receiver))
            .map_err(BridgeError::WorkerSpawn)?;

        Ok(Self {
            sender: Some(sender),
            thread: Some(thread),
        })
    }

    /// Queues an event.
    ///
    /// # Errors
    ///
    /// Returns the event back if the pump thread is gone.
    pub fn send(&self, event: HostEvent<B>) -> Result<(), SendError<HostEvent<B>>> {
        match &self.sender {
            Some(sender) => sender.send(event),
            None => Err(SendError(event)),
        }
    }

    /// Another sender, for host bindings on other threads.
    ///
    /// The pump only ends once every sender is dropped.
    #[must_use]
    pub fn sender(&self) -> Option<Sender<HostEvent<B>>> {
        self.sender.clone()
    }

    /// Closes this handle's sender and waits for the pump to finish.
    ///
    /// # Panics
    ///
    /// Re-raises a panic from the pump thread.
    pub fn shutdown(mut self) -> PumpReport {
        self.finish().unwrap_or_default()
    }

    fn finish(&mut self) -> Option<PumpReport> {
        self.sender = None;
        let thread = self.thread.take()?;
        match thread.join() {
            Ok(report) => Some(report),
            Err(payload) => panic::resume_unwind(payload),
        }
    }
}

impl<B: Send + 'static> Drop for EventPump<B> {
    fn drop(&mut self) {
        self.sender = None;
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("host event thread panicked");
            }
        }
    }
}

fn pump<F>(mut coordinator: LifecycleCoordinator<F>, receiver: &Receiver<HostEvent<BackingOf<F>>>) -> PumpReport
where
    F: EngineFactory,
{
    let mut report = PumpReport::default();
    tracing::info!("host event thread started");

    loop {
        match receiver.recv_timeout(REPORT_POLL_INTERVAL) {
            Ok(event) => {
                report.events += 1;
                let name = event.name();
                if let Err(err) = coordinator.handle(event) {
                    report.failed_events += 1;
                    tracing::error!(event = name, error = %err, "host event failed");
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                coordinator.poll_reports();
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    coordinator.detach();
    report.stats = coordinator.stats();
    tracing::info!(events = report.events, failed = report.failed_events, "host event thread finished");
    report
}
