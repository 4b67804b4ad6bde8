//! Snapshot logging during a simulated stress run.
//!
//! A worker loop logs on every iteration, but only a 200ms window of logs
//! every 2 seconds reaches the terminal. Audit events always get through.

use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::prelude::*;
use window_throttle::SnapshotLayer;

fn main() {
    let snapshot = SnapshotLayer::builder()
        .with_window(Duration::from_millis(200))
        .with_period(Duration::from_secs(2))
        .with_exempt_targets(vec!["demo::audit".to_string()])
        .build()
        .expect("valid snapshot configuration");
    let metrics = snapshot.metrics().clone();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(snapshot))
        .init();

    info!(target: "demo::audit", "stress run started");

    let started = Instant::now();
    let mut iteration = 0u64;
    while started.elapsed() < Duration::from_secs(7) {
        iteration += 1;
        info!(iteration, "processed request");
        std::thread::sleep(Duration::from_millis(10));
    }

    info!(target: "demo::audit", iterations = iteration, "stress run finished");

    let snapshot = metrics.snapshot();
    println!(
        "\npassed: {}, suppressed: {}, exempt: {}, windows: {}, suppression rate: {:.1}%",
        snapshot.events_passed,
        snapshot.events_suppressed,
        snapshot.events_exempt,
        snapshot.windows_opened,
        snapshot.suppression_rate() * 100.0
    );
}
