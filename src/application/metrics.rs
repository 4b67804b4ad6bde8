//! Observability metrics for the limiter and the sampler.
//!
//! All counters use relaxed atomic operations. They are observational only;
//! no admission or sampling decision reads them.

use crate::domain::config::duration_millis;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Counters describing a [`ThroughputLimiter`](crate::ThroughputLimiter).
#[derive(Debug, Clone, Default)]
pub struct ThroughputMetrics {
    inner: Arc<ThroughputMetricsInner>,
}

#[derive(Debug, Default)]
struct ThroughputMetricsInner {
    /// Total number of `control()` calls that returned
    calls: AtomicU64,
    /// Calls that had to wait for quota
    delayed_calls: AtomicU64,
    /// Sum of reported delays
    total_delay_millis: AtomicU64,
}

impl ThroughputMetrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_call(&self, delay: Duration) {
        self.inner.calls.fetch_add(1, Ordering::Relaxed);
        if !delay.is_zero() {
            self.inner.delayed_calls.fetch_add(1, Ordering::Relaxed);
            self.inner
                .total_delay_millis
                .fetch_add(duration_millis(delay), Ordering::Relaxed);
        }
    }

    /// Get the number of completed `control()` calls.
    pub fn calls(&self) -> u64 {
        self.inner.calls.load(Ordering::Relaxed)
    }

    /// Get the number of calls that were delayed.
    pub fn delayed_calls(&self) -> u64 {
        self.inner.delayed_calls.load(Ordering::Relaxed)
    }

    /// Get the accumulated delay across all calls.
    pub fn total_delay(&self) -> Duration {
        Duration::from_millis(self.inner.total_delay_millis.load(Ordering::Relaxed))
    }

    /// Get a snapshot of all counters.
    pub fn snapshot(&self) -> ThroughputSnapshot {
        ThroughputSnapshot {
            calls: self.calls(),
            delayed_calls: self.delayed_calls(),
            total_delay: self.total_delay(),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.inner.calls.store(0, Ordering::Relaxed);
        self.inner.delayed_calls.store(0, Ordering::Relaxed);
        self.inner.total_delay_millis.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time snapshot of limiter metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThroughputSnapshot {
    /// Completed `control()` calls
    pub calls: u64,
    /// Calls that had to wait
    pub delayed_calls: u64,
    /// Accumulated delay
    pub total_delay: Duration,
}

impl ThroughputSnapshot {
    /// Fraction of calls that were delayed (0.0 to 1.0).
    pub fn delay_rate(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            self.delayed_calls as f64 / self.calls as f64
        }
    }
}

/// Counters describing a [`WindowSampler`](crate::WindowSampler).
#[derive(Debug, Clone, Default)]
pub struct SamplerMetrics {
    inner: Arc<SamplerMetricsInner>,
}

#[derive(Debug, Default)]
struct SamplerMetricsInner {
    events_passed: AtomicU64,
    events_suppressed: AtomicU64,
    events_exempt: AtomicU64,
    windows_opened: AtomicU64,
}

impl SamplerMetrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_passed(&self) {
        self.inner.events_passed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_suppressed(&self) {
        self.inner.events_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_exempt(&self) {
        self.inner.events_exempt.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_window_opened(&self) {
        self.inner.windows_opened.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the total number of events passed.
    pub fn events_passed(&self) -> u64 {
        self.inner.events_passed.load(Ordering::Relaxed)
    }

    /// Get the total number of events suppressed.
    pub fn events_suppressed(&self) -> u64 {
        self.inner.events_suppressed.load(Ordering::Relaxed)
    }

    /// Get the number of events that bypassed sampling.
    ///
    /// These are not part of `events_passed` or the suppression rate.
    pub fn events_exempt(&self) -> u64 {
        self.inner.events_exempt.load(Ordering::Relaxed)
    }

    /// Get the number of sampling windows opened.
    pub fn windows_opened(&self) -> u64 {
        self.inner.windows_opened.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all counters.
    pub fn snapshot(&self) -> SamplerSnapshot {
        SamplerSnapshot {
            events_passed: self.events_passed(),
            events_suppressed: self.events_suppressed(),
            events_exempt: self.events_exempt(),
            windows_opened: self.windows_opened(),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.inner.events_passed.store(0, Ordering::Relaxed);
        self.inner.events_suppressed.store(0, Ordering::Relaxed);
        self.inner.events_exempt.store(0, Ordering::Relaxed);
        self.inner.windows_opened.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time snapshot of sampler metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerSnapshot {
    /// Events let through
    pub events_passed: u64,
    /// Events dropped
    pub events_suppressed: u64,
    /// Events that bypassed sampling
    pub events_exempt: u64,
    /// Windows opened
    pub windows_opened: u64,
}

impl SamplerSnapshot {
    /// Calculate the suppression rate (0.0 to 1.0).
    ///
    /// Returns 0.0 if no events have been processed.
    pub fn suppression_rate(&self) -> f64 {
        let total = self.total_events();
        if total == 0 {
            0.0
        } else {
            self.events_suppressed as f64 / total as f64
        }
    }

    /// Get the total number of sampled events (passed + suppressed).
    pub fn total_events(&self) -> u64 {
        self.events_passed.saturating_add(self.events_suppressed)
    }
}
