//! Periodic snapshot sampling.
//!
//! A [`WindowSampler`] lets events through during a short window that recurs
//! once per period and suppresses everything else. It is intended for very
//! high volume paths (stress tests, hot loops) where a periodic snapshot of
//! activity is enough.
//!
//! The only shared state is one atomic timestamp. Opening a new window is an
//! election: every caller that sees the period elapsed tries a single
//! compare-and-swap, and only the winner passes.

use crate::application::metrics::SamplerMetrics;
use crate::application::ports::Clock;
use crate::domain::config::{ConfigError, SamplerConfig};
use crate::domain::window::{GateDecision, WindowPhase};
use crate::infrastructure::clock::SystemClock;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Lock-free gate that passes events only inside a recurring window.
///
/// Clones share the same window state.
///
/// # Example
/// ```
/// use window_throttle::WindowSampler;
/// use std::time::Duration;
///
/// let sampler = WindowSampler::new(Duration::from_secs(1), Duration::from_secs(60)).unwrap();
///
/// // The first event opens a window
/// assert_eq!(sampler.gate("first"), Some("first"));
///
/// assert!(WindowSampler::new(Duration::from_secs(2), Duration::from_secs(1)).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct WindowSampler {
    last_window_start: Arc<AtomicU64>,
    window_millis: u64,
    period_millis: u64,
    clock: Arc<dyn Clock>,
    metrics: SamplerMetrics,
}

impl WindowSampler {
    /// Create a sampler with an active `window` recurring every `period`.
    ///
    /// # Errors
    /// Returns `ConfigError` unless `0 < window < period` at millisecond
    /// precision.
    pub fn new(window: Duration, period: Duration) -> Result<Self, ConfigError> {
        Self::from_config(&SamplerConfig::new(window, period))
    }

    /// Create a sampler from a configuration record, using the system clock.
    ///
    /// # Errors
    /// Returns `ConfigError` if the configuration is invalid.
    pub fn from_config(config: &SamplerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        tracing::debug!(
            window_ms = config.window_millis,
            period_ms = config.period_millis,
            "window sampler created"
        );

        Ok(Self {
            last_window_start: Arc::new(AtomicU64::new(0)),
            window_millis: config.window_millis,
            period_millis: config.period_millis,
            clock: Arc::new(SystemClock::new()),
            metrics: SamplerMetrics::new(),
        })
    }

    /// Replace the clock (mainly for testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Return `Some(event)` if it falls inside an active window, `None` otherwise.
    ///
    /// `None` means "do not emit"; it is not an error.
    pub fn gate<E>(&self, event: E) -> Option<E> {
        match self.decide() {
            GateDecision::Pass => Some(event),
            GateDecision::Suppress => None,
        }
    }

    /// Decide whether an event arriving now should pass.
    ///
    /// Never blocks: one atomic load, and on a window boundary one
    /// compare-and-swap attempt.
    pub fn decide(&self) -> GateDecision {
        let now = self.clock.now_millis();
        let current = self.last_window_start.load(Ordering::Acquire);
        self.decide_at(now, current)
    }

    fn decide_at(&self, now: u64, current: u64) -> GateDecision {
        let phase = WindowPhase::classify(now, current, self.window_millis, self.period_millis);
        let decision = match phase {
            WindowPhase::Active => GateDecision::Pass,
            WindowPhase::Eligible => {
                // A failed swap means another caller already opened this window
                match self.last_window_start.compare_exchange(
                    current,
                    now,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                ) {
                    Ok(_) => {
                        self.metrics.record_window_opened();
                        GateDecision::Pass
                    }
                    Err(_) => GateDecision::Suppress,
                }
            }
            WindowPhase::Dormant => GateDecision::Suppress,
        };

        match decision {
            GateDecision::Pass => self.metrics.record_passed(),
            GateDecision::Suppress => self.metrics.record_suppressed(),
        }
        decision
    }

    /// Length of the active window.
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_millis)
    }

    /// Length of the full cycle.
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_millis)
    }

    /// Epoch millis at which the most recent window opened (0 if none yet).
    pub fn last_window_start(&self) -> u64 {
        self.last_window_start.load(Ordering::Acquire)
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &SamplerMetrics {
        &self.metrics
    }
}

impl Default for WindowSampler {
    /// A 1 second window every 60 seconds.
    fn default() -> Self {
        let config = SamplerConfig::default();
        Self {
            last_window_start: Arc::new(AtomicU64::new(0)),
            window_millis: config.window_millis,
            period_millis: config.period_millis,
            clock: Arc::new(SystemClock::new()),
            metrics: SamplerMetrics::new(),
        }
    }
}
