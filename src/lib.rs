//! # window-throttle
//!
//! Time-window flow control for concurrent code.
//!
//! Two independent primitives share the same job (tracking a time window
//! under contention without unbounded memory or drift) but apply it to
//! different outcomes:
//!
//! - [`ThroughputLimiter`]: blocking admission control. Each call to
//!   [`control`](ThroughputLimiter::control) consumes quota from every
//!   configured tier and parks the caller until all of them have room.
//! - [`WindowSampler`]: non-blocking sampling. Events pass only during a short
//!   window that recurs every period; everything else is suppressed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use window_throttle::ThroughputLimiter;
//! use std::time::Duration;
//!
//! // 15 operations per second, and never more than 1000 per minute
//! let throughput = ThroughputLimiter::builder()
//!     .with_tier(15, Duration::from_secs(1))
//!     .with_tier(1000, Duration::from_secs(60))
//!     .build()
//!     .unwrap();
//!
//! loop {
//!     let waited = throughput.control();
//!     // do one unit of work
//! #   let _ = waited;
//! #   break;
//! }
//! ```
//!
//! Snapshot logging with `tracing`:
//!
//! ```rust,no_run
//! use window_throttle::SnapshotLayer;
//! use tracing_subscriber::prelude::*;
//! use std::time::Duration;
//!
//! // 1 second of logs every minute; audit events always pass
//! let snapshot = SnapshotLayer::builder()
//!     .with_window(Duration::from_secs(1))
//!     .with_period(Duration::from_secs(60))
//!     .with_exempt_targets(vec!["myapp::audit".to_string()])
//!     .build()
//!     .unwrap();
//!
//! tracing_subscriber::registry()
//!     .with(tracing_subscriber::fmt::layer().with_filter(snapshot))
//!     .init();
//! ```
//!
//! ## Decay
//!
//! Tier counters are never reset to zero at a period boundary. Once more
//! than a full period has elapsed since a tier's window started, the tier is
//! credited `elapsed * max_count / period` units and its window restarts.
//! Blocked callers are released gradually instead of in one burst.
//!
//! While blocked, a caller re-checks its tier every `period / 10`, clamped
//! into `[50ms, 500ms]`.
//!
//! ## Window election
//!
//! The sampler keeps a single atomic timestamp. When a period has elapsed,
//! every caller that notices tries one compare-and-swap to move the window
//! start to its own `now`; exactly one succeeds and passes. Losers are
//! suppressed and never retry, so the gate never blocks or spins.
//!
//! ## Precision
//!
//! Both primitives read epoch milliseconds from a [`Clock`]. Boundaries are
//! approximate: a window opens on the first event observed at or after the
//! boundary, and a blocked caller is released on the first poll after decay.

// Domain layer - pure bookkeeping
pub mod domain;

// Application layer - the primitives
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

pub use domain::{
    config::{ConfigError, SamplerConfig, ThroughputConfig, TierConfig},
    tier::Tier,
    window::{GateDecision, WindowPhase},
};

pub use application::{
    metrics::{SamplerMetrics, SamplerSnapshot, ThroughputMetrics, ThroughputSnapshot},
    ports::{Clock, Sleeper},
    sampler::WindowSampler,
    throughput::{ThroughputLimiter, ThroughputLimiterBuilder, TierSnapshot},
};

pub use infrastructure::{
    clock::{SystemClock, ThreadSleeper},
    layer::{SnapshotLayer, SnapshotLayerBuilder},
};
