//! # TESSERA Headless Demo
//!
//! Drives a scripted host lifecycle against the headless engine:
//! attach, two surface lifetimes (landscape, then portrait), detach.
//!
//! Run with: RUST_LOG=debug cargo run --bin tessera_headless [bridge.toml] [headless.toml]

use std::process;
use std::thread;
use std::time::Duration;

use tessera::{EventPump, HeadlessConfig, HeadlessEngine, HeadlessTarget};
use tessera_core::{BridgeConfig, HostEvent, LifecycleCoordinator};
use tessera_shared::SurfaceDescriptor;
use tracing_subscriber::EnvFilter;

const FRAME_WINDOW: Duration = Duration::from_millis(120);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    tessera::system::initialize();

    let mut args = std::env::args().skip(1);
    let bridge = match args.next().map(BridgeConfig::load).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(err) => {
            eprintln!("tessera_headless: {err}");
            process::exit(2);
        }
    };
    let headless = match args.next().map(HeadlessConfig::load).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(err) => {
            eprintln!("tessera_headless: {err}");
            process::exit(2);
        }
    };

    let (factory, counters) = HeadlessEngine::factory(headless);
    let coordinator = LifecycleCoordinator::new(factory, bridge);
    let pump = match EventPump::spawn(coordinator) {
        Ok(pump) => pump,
        Err(err) => {
            eprintln!("tessera_headless: {err}");
            process::exit(1);
        }
    };

    let first = HeadlessTarget::new();
    let second = HeadlessTarget::new();
    let script = [
        HostEvent::Attach,
        HostEvent::SurfaceAvailable,
        HostEvent::SurfaceChanged {
            descriptor: SurfaceDescriptor::new(1, 1280, 720),
            backing: first.clone(),
        },
        HostEvent::SurfaceDestroyed,
        HostEvent::SurfaceAvailable,
        HostEvent::SurfaceChanged {
            descriptor: SurfaceDescriptor::new(2, 720, 1280),
            backing: second.clone(),
        },
        HostEvent::SurfaceDestroyed,
        HostEvent::Detach,
    ];

    for event in script {
        let pause = matches!(event, HostEvent::SurfaceChanged { .. });
        if pump.send(event).is_err() {
            eprintln!("tessera_headless: host event thread exited early");
            process::exit(1);
        }
        if pause {
            thread::sleep(FRAME_WINDOW);
        }
    }

    let report = pump.shutdown();
    let engine = counters.snapshot();
    tracing::info!(
        events = report.events,
        failed = report.failed_events,
        workers = report.stats.workers_started,
        runs = engine.runs,
        frames = engine.frames,
        first_surface_frames = first.frames(),
        second_surface_frames = second.frames(),
        "headless session finished"
    );
    println!("{:#?}", report.stats);

    if report.failed_events > 0 {
        process::exit(1);
    }
}
