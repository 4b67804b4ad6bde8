//! Quota bookkeeping for a single throughput tier.
//!
//! A tier counts operations against a `(max_count, period)` budget. Instead of
//! resetting the counter at every period boundary, it credits quota back in
//! proportion to the time elapsed since the window baseline. Callers that have
//! been waiting are released gradually rather than all at once when a period
//! rolls over.

use crate::domain::config::TierConfig;
use std::time::Duration;

/// Shortest polling interval used while blocked on a tier.
pub const MIN_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Longest polling interval used while blocked on a tier.
pub const MAX_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Polling interval for a tier with the given period.
///
/// One tenth of the period, clamped into `[50ms, 500ms]`.
///
/// ```
/// use window_throttle::domain::tier::retry_delay_for;
/// use std::time::Duration;
///
/// assert_eq!(retry_delay_for(100), Duration::from_millis(50));
/// assert_eq!(retry_delay_for(1_000), Duration::from_millis(100));
/// assert_eq!(retry_delay_for(60_000), Duration::from_millis(500));
/// ```
pub fn retry_delay_for(period_millis: u64) -> Duration {
    Duration::from_millis(period_millis / 10).clamp(MIN_RETRY_DELAY, MAX_RETRY_DELAY)
}

/// A tier's configuration together with its mutable window state.
#[derive(Debug, Clone)]
pub struct Tier {
    max_count: u64,
    period_millis: u64,
    retry_delay: Duration,
    count: u64,
    window_start: u64,
}

impl Tier {
    /// Create a tier whose first accounting window starts at `now_millis`.
    ///
    /// The configuration is assumed to be validated.
    pub fn new(config: TierConfig, now_millis: u64) -> Self {
        Self {
            max_count: config.max_count,
            period_millis: config.period_millis,
            retry_delay: retry_delay_for(config.period_millis),
            count: 0,
            window_start: now_millis,
        }
    }

    /// Consume one unit of quota.
    pub fn increment(&mut self) {
        self.count = self.count.saturating_add(1);
    }

    /// Credit quota back if a full period has elapsed since the window start.
    ///
    /// Returns the number of units credited. When crediting happens the window
    /// restarts at `now_millis`.
    pub fn decay(&mut self, now_millis: u64) -> u64 {
        let elapsed = now_millis.saturating_sub(self.window_start);
        if elapsed <= self.period_millis {
            return 0;
        }

        let allowed = u128::from(elapsed) * u128::from(self.max_count)
            / u128::from(self.period_millis);
        let allowed = u64::try_from(allowed).unwrap_or(u64::MAX);

        self.window_start = now_millis;
        let credited = allowed.min(self.count);
        self.count -= credited;
        credited
    }

    /// True while the tier's consumed quota exceeds its budget.
    pub fn is_exceeded(&self) -> bool {
        self.count > self.max_count
    }

    /// Quota per period.
    pub fn max_count(&self) -> u64 {
        self.max_count
    }

    /// Period length in milliseconds.
    pub fn period_millis(&self) -> u64 {
        self.period_millis
    }

    /// Polling interval while blocked on this tier.
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Quota consumed in the current window.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Epoch millis at which the current accounting window started.
    pub fn window_start(&self) -> u64 {
        self.window_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(max_count: u64, period_millis: u64) -> Tier {
        Tier::new(
            TierConfig {
                max_count,
                period_millis,
            },
            0,
        )
    }

    #[test]
    fn test_retry_delay_clamp() {
        assert_eq!(retry_delay_for(1), MIN_RETRY_DELAY);
        assert_eq!(retry_delay_for(499), MIN_RETRY_DELAY);
        assert_eq!(retry_delay_for(2_500), Duration::from_millis(250));
        assert_eq!(retry_delay_for(5_000), MAX_RETRY_DELAY);
        assert_eq!(retry_delay_for(u64::MAX), MAX_RETRY_DELAY);
    }

    #[test]
    fn test_no_decay_within_period() {
        let mut t = tier(5, 1000);
        for _ in 0..7 {
            t.increment();
        }
        assert_eq!(t.decay(1000), 0);
        assert_eq!(t.count(), 7);
        assert_eq!(t.window_start(), 0);
        assert!(t.is_exceeded());
    }

    #[test]
    fn test_proportional_decay() {
        let mut t = tier(10, 1000);
        for _ in 0..15 {
            t.increment();
        }

        // 1.5 periods elapsed: 15 units credited
        assert_eq!(t.decay(1500), 15);
        assert_eq!(t.count(), 0);
        assert_eq!(t.window_start(), 1500);
        assert!(!t.is_exceeded());
    }

    #[test]
    fn test_partial_credit_is_floored() {
        let mut t = tier(3, 1000);
        for _ in 0..10 {
            t.increment();
        }

        // 1001 * 3 / 1000 = 3.003 -> 3
        assert_eq!(t.decay(1001), 3);
        assert_eq!(t.count(), 7);
    }

    #[test]
    fn test_decay_never_goes_negative() {
        let mut t = tier(100, 1000);
        t.increment();
        assert_eq!(t.decay(10_000), 1);
        assert_eq!(t.count(), 0);
    }

    #[test]
    fn test_decay_with_clock_going_backwards() {
        let mut t = Tier::new(
            TierConfig {
                max_count: 1,
                period_millis: 100,
            },
            5_000,
        );
        t.increment();
        t.increment();
        assert_eq!(t.decay(1_000), 0);
        assert_eq!(t.count(), 2);
        assert_eq!(t.window_start(), 5_000);
    }

    #[test]
    fn test_decay_large_values_do_not_overflow() {
        let mut t = tier(u64::MAX, 1);
        t.increment();
        assert_eq!(t.decay(u64::MAX), 1);
        assert_eq!(t.count(), 0);
    }
}
