//! Multi-tier throughput control shared by several worker threads.
//!
//! Four workers share a budget of 10 operations per second and 25 per
//! 5 seconds. Run with `RUST_LOG`-style output enabled to see delays.

use std::time::{Duration, Instant};
use tracing::info;
use window_throttle::ThroughputLimiter;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let limiter = ThroughputLimiter::builder()
        .with_tier(10, Duration::from_secs(1))
        .with_tier(25, Duration::from_secs(5))
        .build()
        .expect("valid throughput configuration");

    info!(%limiter, "starting workers");
    let started = Instant::now();

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let limiter = limiter.clone();
            std::thread::spawn(move || {
                for job in 0..10 {
                    let waited = limiter.control();
                    info!(
                        worker,
                        job,
                        waited_ms = waited.as_millis() as u64,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "job admitted"
                    );
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().expect("worker panicked");
    }

    let snapshot = limiter.metrics().snapshot();
    println!(
        "\ncalls: {}, delayed: {}, total delay: {:?}",
        snapshot.calls, snapshot.delayed_calls, snapshot.total_delay
    );
}
