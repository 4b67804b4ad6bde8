//! Configuration records for the limiter and the sampler.
//!
//! These are plain data with validation. They are what an external
//! configuration provider hands to the crate; nothing here reads files or
//! environment variables.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::Deserialize;

/// Default active window of a sampler, in milliseconds.
pub const DEFAULT_WINDOW_MILLIS: u64 = 1_000;

/// Default sampling cycle, in milliseconds.
pub const DEFAULT_PERIOD_MILLIS: u64 = 60_000;

/// Error returned when a limiter or sampler configuration is invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A throughput limiter needs at least one tier
    NoTiers,
    /// Tier quota must be greater than zero
    ZeroMaxCount {
        /// Position of the offending tier
        tier: usize,
    },
    /// Tier period must be at least one millisecond
    ZeroTierPeriod {
        /// Position of the offending tier
        tier: usize,
    },
    /// Sampler window must be at least one millisecond
    ZeroWindow,
    /// Sampler period must be at least one millisecond
    ZeroPeriod,
    /// Sampler window must be strictly shorter than its period
    WindowNotShorterThanPeriod {
        /// Configured window
        window_millis: u64,
        /// Configured period
        period_millis: u64,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoTiers => write!(f, "at least one throughput tier is required"),
            ConfigError::ZeroMaxCount { tier } => {
                write!(f, "tier {}: max_count must be greater than 0", tier)
            }
            ConfigError::ZeroTierPeriod { tier } => {
                write!(f, "tier {}: period must be at least 1ms", tier)
            }
            ConfigError::ZeroWindow => write!(f, "window must be at least 1ms"),
            ConfigError::ZeroPeriod => write!(f, "period must be at least 1ms"),
            ConfigError::WindowNotShorterThanPeriod {
                window_millis,
                period_millis,
            } => write!(
                f,
                "window ({}ms) must be less than period ({}ms)",
                window_millis, period_millis
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// One `(max_count, period)` rate rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct TierConfig {
    /// Operations allowed per period
    pub max_count: u64,
    /// Period length in milliseconds
    pub period_millis: u64,
}

impl TierConfig {
    /// Create a tier rule from a quota and a period.
    ///
    /// Sub-millisecond precision in `period` is truncated.
    pub fn new(max_count: u64, period: Duration) -> Self {
        Self {
            max_count,
            period_millis: duration_millis(period),
        }
    }

    fn validate(&self, tier: usize) -> Result<(), ConfigError> {
        if self.max_count == 0 {
            return Err(ConfigError::ZeroMaxCount { tier });
        }
        if self.period_millis == 0 {
            return Err(ConfigError::ZeroTierPeriod { tier });
        }
        Ok(())
    }
}

/// Ordered tier list for a [`ThroughputLimiter`](crate::ThroughputLimiter).
///
/// # Example
/// ```
/// use window_throttle::{ThroughputConfig, TierConfig};
/// use std::time::Duration;
///
/// let config = ThroughputConfig::new(vec![
///     TierConfig::new(15, Duration::from_secs(1)),
///     TierConfig::new(1000, Duration::from_secs(60)),
/// ]);
/// assert!(config.validate().is_ok());
/// assert!(ThroughputConfig::new(vec![]).validate().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct ThroughputConfig {
    /// Tiers, enforced in this order
    pub tiers: Vec<TierConfig>,
}

impl ThroughputConfig {
    /// Create a configuration from an ordered tier list.
    pub fn new(tiers: Vec<TierConfig>) -> Self {
        Self { tiers }
    }

    /// Check every tier.
    ///
    /// # Errors
    /// Returns the first violation found, in tier order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tiers.is_empty() {
            return Err(ConfigError::NoTiers);
        }
        self.tiers
            .iter()
            .enumerate()
            .try_for_each(|(i, tier)| tier.validate(i))
    }
}

/// Window and period of a [`WindowSampler`](crate::WindowSampler).
///
/// Missing fields fall back to a 1 second window every minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SamplerConfig {
    /// Active window length in milliseconds
    pub window_millis: u64,
    /// Full cycle length in milliseconds
    pub period_millis: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            window_millis: DEFAULT_WINDOW_MILLIS,
            period_millis: DEFAULT_PERIOD_MILLIS,
        }
    }
}

impl SamplerConfig {
    /// Create a sampler configuration.
    pub fn new(window: Duration, period: Duration) -> Self {
        Self {
            window_millis: duration_millis(window),
            period_millis: duration_millis(period),
        }
    }

    /// Check `0 < window < period`.
    ///
    /// # Errors
    /// Returns `ConfigError::ZeroWindow`, `ConfigError::ZeroPeriod` or
    /// `ConfigError::WindowNotShorterThanPeriod`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_millis == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if self.period_millis == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        if self.window_millis >= self.period_millis {
            return Err(ConfigError::WindowNotShorterThanPeriod {
                window_millis: self.window_millis,
                period_millis: self.period_millis,
            });
        }
        Ok(())
    }
}

/// Whole milliseconds in `d`, saturating at `u64::MAX`.
pub(crate) fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampler_defaults() {
        let config = SamplerConfig::default();
        assert_eq!(config.window_millis, 1_000);
        assert_eq!(config.period_millis, 60_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sampler_window_not_shorter_than_period() {
        let config = SamplerConfig::new(Duration::from_millis(2000), Duration::from_millis(1000));
        assert_eq!(
            config.validate(),
            Err(ConfigError::WindowNotShorterThanPeriod {
                window_millis: 2000,
                period_millis: 1000,
            })
        );

        let equal = SamplerConfig::new(Duration::from_secs(1), Duration::from_secs(1));
        assert!(matches!(
            equal.validate(),
            Err(ConfigError::WindowNotShorterThanPeriod { .. })
        ));
    }

    #[test]
    fn test_sampler_zero_values() {
        let zero_window = SamplerConfig {
            window_millis: 0,
            period_millis: 1000,
        };
        assert_eq!(zero_window.validate(), Err(ConfigError::ZeroWindow));

        let zero_period = SamplerConfig {
            window_millis: 10,
            period_millis: 0,
        };
        assert_eq!(zero_period.validate(), Err(ConfigError::ZeroPeriod));
    }

    #[test]
    fn test_sub_millisecond_period_is_rejected() {
        let config = ThroughputConfig::new(vec![TierConfig::new(10, Duration::from_micros(500))]);
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroTierPeriod { tier: 0 })
        );
    }

    #[test]
    fn test_duration_millis_truncates_and_saturates() {
        assert_eq!(duration_millis(Duration::from_micros(1_999)), 1);
        assert_eq!(duration_millis(Duration::from_secs(60)), 60_000);
        assert_eq!(duration_millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_throughput_reports_first_bad_tier() {
        let config = ThroughputConfig::new(vec![
            TierConfig::new(5, Duration::from_secs(1)),
            TierConfig::new(0, Duration::from_secs(10)),
            TierConfig::new(1, Duration::ZERO),
        ]);
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxCount { tier: 1 }));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ConfigError::ZeroMaxCount { tier: 2 }.to_string(),
            "tier 2: max_count must be greater than 0"
        );
        assert_eq!(
            ConfigError::WindowNotShorterThanPeriod {
                window_millis: 2000,
                period_millis: 1000,
            }
            .to_string(),
            "window (2000ms) must be less than period (1000ms)"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_sampler_with_defaults() {
        let config: SamplerConfig = serde_json::from_str(r#"{"window_millis": 250}"#).unwrap();
        assert_eq!(config.window_millis, 250);
        assert_eq!(config.period_millis, DEFAULT_PERIOD_MILLIS);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_throughput() {
        let config: ThroughputConfig = serde_json::from_str(
            r#"{"tiers": [{"max_count": 15, "period_millis": 1000},
                          {"max_count": 1000, "period_millis": 60000}]}"#,
        )
        .unwrap();
        assert_eq!(config.tiers.len(), 2);
        assert_eq!(config.tiers[1], TierConfig::new(1000, Duration::from_secs(60)));
        assert!(config.validate().is_ok());
    }
}
