//! Blocking multi-tier throughput control.
//!
//! A [`ThroughputLimiter`] caps how often callers may proceed. Each call to
//! [`control`](ThroughputLimiter::control) consumes one unit of quota from
//! every configured tier in order, and parks the calling thread on any tier
//! that is over budget until proportional decay frees room.

use crate::application::metrics::ThroughputMetrics;
use crate::application::ports::{Clock, Sleeper};
use crate::domain::config::{duration_millis, ConfigError, ThroughputConfig, TierConfig};
use crate::domain::tier::Tier;
use crate::infrastructure::clock::{SystemClock, ThreadSleeper};

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Read-only view of one tier's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierSnapshot {
    /// Quota per period
    pub max_count: u64,
    /// Period length
    pub period: Duration,
    /// Polling interval while blocked
    pub retry_delay: Duration,
    /// Quota consumed in the current window
    pub count: u64,
}

/// Builder for constructing a [`ThroughputLimiter`].
#[derive(Debug, Default)]
pub struct ThroughputLimiterBuilder {
    tiers: Vec<TierConfig>,
    clock: Option<Arc<dyn Clock>>,
    sleeper: Option<Arc<dyn Sleeper>>,
}

impl ThroughputLimiterBuilder {
    /// Append a tier allowing `max_count` operations per `period`.
    ///
    /// Tiers are enforced in the order they are added.
    pub fn with_tier(mut self, max_count: u64, period: Duration) -> Self {
        self.tiers.push(TierConfig::new(max_count, period));
        self
    }

    /// Append every tier of a configuration record.
    pub fn with_config(mut self, config: &ThroughputConfig) -> Self {
        self.tiers.extend_from_slice(&config.tiers);
        self
    }

    /// Set a custom clock (mainly for testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set a custom sleeper (mainly for testing).
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    /// Build the limiter.
    ///
    /// Every tier's window starts at the moment of construction.
    ///
    /// # Errors
    /// Returns `ConfigError` if no tier was added or a tier has a zero quota
    /// or a zero period.
    pub fn build(self) -> Result<ThroughputLimiter, ConfigError> {
        let config = ThroughputConfig::new(self.tiers);
        config.validate()?;

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));
        let sleeper = self
            .sleeper
            .unwrap_or_else(|| Arc::new(ThreadSleeper::new()));

        let now = clock.now_millis();
        let tiers: Vec<Tier> = config
            .tiers
            .iter()
            .map(|tier| Tier::new(*tier, now))
            .collect();

        tracing::debug!(tiers = tiers.len(), "throughput limiter created");

        Ok(ThroughputLimiter {
            tier_count: tiers.len(),
            tiers: Arc::new(Mutex::new(tiers)),
            clock,
            sleeper,
            metrics: ThroughputMetrics::new(),
        })
    }
}

/// Caps operation throughput across one or more simultaneous tiers.
///
/// Clones share the same tiers, so a clone handed to another thread draws
/// from the same budget.
///
/// # Example
/// ```no_run
/// use window_throttle::ThroughputLimiter;
/// use std::time::Duration;
///
/// // 15 per second and 1000 per minute
/// let throughput = ThroughputLimiter::builder()
///     .with_tier(15, Duration::from_secs(1))
///     .with_tier(1000, Duration::from_secs(60))
///     .build()
///     .unwrap();
///
/// for _ in 0..100 {
///     throughput.control();
///     // do the work
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ThroughputLimiter {
    tiers: Arc<Mutex<Vec<Tier>>>,
    tier_count: usize,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
    metrics: ThroughputMetrics,
}

impl ThroughputLimiter {
    /// Create a single-tier limiter allowing `max_count` operations per `period`.
    ///
    /// # Errors
    /// Returns `ConfigError` if `max_count` is zero or `period` is shorter
    /// than one millisecond.
    pub fn new(max_count: u64, period: Duration) -> Result<Self, ConfigError> {
        Self::builder().with_tier(max_count, period).build()
    }

    /// Create a limiter from a configuration record, using the system clock.
    ///
    /// # Errors
    /// Returns `ConfigError` if the configuration is invalid.
    pub fn from_config(config: &ThroughputConfig) -> Result<Self, ConfigError> {
        Self::builder().with_config(config).build()
    }

    /// Create a builder with no tiers.
    pub fn builder() -> ThroughputLimiterBuilder {
        ThroughputLimiterBuilder::default()
    }

    /// Admit one operation, blocking until every tier has room.
    ///
    /// Call this once per unit of work. Returns immediately with
    /// `Duration::ZERO` when no tier is over budget; otherwise returns the
    /// wall-clock time spent waiting, measured from the start of the call.
    ///
    /// There is no timeout: the call returns only once admitted. Do not call
    /// it from a context that cannot tolerate blocking.
    pub fn control(&self) -> Duration {
        let init = self.clock.now_millis();
        let mut delayed = false;

        for index in 0..self.tier_count {
            if let Some(retry_delay) = self.admit(index) {
                delayed = true;
                loop {
                    // Sleep outside the lock so other callers can decay the window
                    self.sleeper.sleep(retry_delay);
                    if !self.recheck(index) {
                        break;
                    }
                }
            }
        }

        self.finish(init, delayed)
    }

    /// Admit one operation, awaiting instead of blocking the thread.
    ///
    /// Same bookkeeping as [`control`](Self::control); the wait uses
    /// `tokio::time::sleep` and the lock is never held across it.
    #[cfg(feature = "async")]
    pub async fn control_async(&self) -> Duration {
        let init = self.clock.now_millis();
        let mut delayed = false;

        for index in 0..self.tier_count {
            if let Some(retry_delay) = self.admit(index) {
                delayed = true;
                loop {
                    tokio::time::sleep(retry_delay).await;
                    if !self.recheck(index) {
                        break;
                    }
                }
            }
        }

        self.finish(init, delayed)
    }

    /// Consume quota on a tier. Returns the retry delay if the tier is now over budget.
    ///
    /// No decay happens here: an over-budget caller always sleeps at least once.
    fn admit(&self, index: usize) -> Option<Duration> {
        self.with_tier(index, |tier, _now| {
            tier.increment();
            tier.is_exceeded().then(|| tier.retry_delay())
        })
    }

    /// Decay a blocked tier and report whether it is still over budget.
    fn recheck(&self, index: usize) -> bool {
        self.with_tier(index, |tier, now| {
            Self::decay(index, tier, now);
            tier.is_exceeded()
        })
    }

    fn decay(index: usize, tier: &mut Tier, now: u64) {
        let credited = tier.decay(now);
        if credited > 0 {
            tracing::trace!(
                tier = index,
                credited,
                remaining = tier.count(),
                "throughput tier decayed"
            );
        }
    }

    fn finish(&self, init: u64, delayed: bool) -> Duration {
        let delay = if delayed {
            Duration::from_millis(self.clock.now_millis().saturating_sub(init))
        } else {
            Duration::ZERO
        };

        if delayed {
            tracing::debug!(
                delay_ms = duration_millis(delay),
                "throughput limit reached, caller delayed"
            );
        }
        self.metrics.record_call(delay);
        delay
    }

    fn with_tier<R>(&self, index: usize, f: impl FnOnce(&mut Tier, u64) -> R) -> R {
        let mut tiers = self.lock();
        let now = self.clock.now_millis();
        f(&mut tiers[index], now)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Tier>> {
        // Tier state is plain counters and stays consistent across a panic
        self.tiers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get a snapshot of every tier, in enforcement order.
    pub fn tiers(&self) -> Vec<TierSnapshot> {
        self.lock()
            .iter()
            .map(|tier| TierSnapshot {
                max_count: tier.max_count(),
                period: Duration::from_millis(tier.period_millis()),
                retry_delay: tier.retry_delay(),
                count: tier.count(),
            })
            .collect()
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &ThroughputMetrics {
        &self.metrics
    }
}

impl fmt::Display for ThroughputLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ThroughputLimiter [")?;
        for (i, tier) in self.lock().iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(
                f,
                "{}: max = {}, period = {}ms",
                i,
                tier.max_count(),
                tier.period_millis()
            )?;
        }
        write!(f, "]")
    }
}
