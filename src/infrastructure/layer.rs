//! Tracing integration layer.
//!
//! Provides a per-layer `Filter` that applies a [`WindowSampler`] to tracing
//! events: only events that arrive during the active window of each period
//! reach the wrapped layer.

use crate::application::{metrics::SamplerMetrics, ports::Clock, sampler::WindowSampler};
use crate::domain::config::{ConfigError, SamplerConfig};

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Filter};

/// Builder for constructing a `SnapshotLayer`.
#[derive(Debug, Default)]
pub struct SnapshotLayerBuilder {
    config: SamplerConfig,
    clock: Option<Arc<dyn Clock>>,
    exempt_targets: BTreeSet<String>,
}

impl SnapshotLayerBuilder {
    /// Set the active window length (default: 1 second).
    pub fn with_window(mut self, window: Duration) -> Self {
        self.config = SamplerConfig::new(window, self.period());
        self
    }

    /// Set the full cycle length (default: 60 seconds).
    pub fn with_period(mut self, period: Duration) -> Self {
        self.config = SamplerConfig::new(self.window(), period);
        self
    }

    /// Take window and period from a configuration record.
    pub fn with_config(mut self, config: SamplerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set a custom clock (mainly for testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Exempt specific targets from sampling.
    ///
    /// Events from these targets always pass, regardless of the window.
    /// Use this for audit or lifecycle events that must never be dropped.
    ///
    /// # Example
    ///
    /// ```
    /// use window_throttle::SnapshotLayer;
    ///
    /// let layer = SnapshotLayer::builder()
    ///     .with_exempt_targets(vec!["app::audit".to_string()])
    ///     .build()
    ///     .unwrap();
    /// assert!(layer.is_exempt("app::audit"));
    /// ```
    pub fn with_exempt_targets(mut self, targets: Vec<String>) -> Self {
        self.exempt_targets = targets.into_iter().collect();
        self
    }

    fn window(&self) -> Duration {
        Duration::from_millis(self.config.window_millis)
    }

    fn period(&self) -> Duration {
        Duration::from_millis(self.config.period_millis)
    }

    /// Build the layer.
    ///
    /// # Errors
    /// Returns `ConfigError` unless `0 < window < period`.
    pub fn build(self) -> Result<SnapshotLayer, ConfigError> {
        let mut sampler = WindowSampler::from_config(&self.config)?;
        if let Some(clock) = self.clock {
            sampler = sampler.with_clock(clock);
        }

        Ok(SnapshotLayer {
            sampler,
            exempt_targets: Arc::new(self.exempt_targets),
        })
    }
}

/// A per-layer filter that lets events through only during periodic snapshots.
///
/// Useful during stress tests: logging stays almost silent, yet every period
/// a short window of real traffic is visible.
///
/// # Example
///
/// ```rust,no_run
/// use window_throttle::SnapshotLayer;
/// use tracing_subscriber::prelude::*;
/// use std::time::Duration;
///
/// // 500ms of logs every 30 seconds
/// let snapshot = SnapshotLayer::builder()
///     .with_window(Duration::from_millis(500))
///     .with_period(Duration::from_secs(30))
///     .build()
///     .unwrap();
///
/// tracing_subscriber::registry()
///     .with(tracing_subscriber::fmt::layer().with_filter(snapshot))
///     .init();
/// ```
#[derive(Debug, Clone)]
pub struct SnapshotLayer {
    sampler: WindowSampler,
    exempt_targets: Arc<BTreeSet<String>>,
}

impl SnapshotLayer {
    /// Create a builder with the default 1 second window every 60 seconds.
    pub fn builder() -> SnapshotLayerBuilder {
        SnapshotLayerBuilder::default()
    }

    /// Create a layer with the default 1 second window every 60 seconds.
    pub fn new() -> Self {
        Self {
            sampler: WindowSampler::default(),
            exempt_targets: Arc::new(BTreeSet::new()),
        }
    }

    /// Check if a target bypasses sampling.
    pub fn is_exempt(&self, target: &str) -> bool {
        !self.exempt_targets.is_empty() && self.exempt_targets.contains(target)
    }

    /// Decide whether an event from `target` arriving now should be emitted.
    pub fn should_emit(&self, target: &str) -> bool {
        if self.is_exempt(target) {
            // Counted apart so the suppression rate reflects sampled traffic only
            self.sampler.metrics().record_exempt();
            return true;
        }
        self.sampler.decide().is_pass()
    }

    /// Get a reference to the underlying sampler.
    pub fn sampler(&self) -> &WindowSampler {
        &self.sampler
    }

    /// Get a reference to the sampler metrics.
    pub fn metrics(&self) -> &SamplerMetrics {
        self.sampler.metrics()
    }
}

impl Default for SnapshotLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Filter<S> for SnapshotLayer
where
    S: Subscriber,
{
    fn enabled(&self, _meta: &Metadata<'_>, _cx: &Context<'_, S>) -> bool {
        // Filtering happens per event, spans are never sampled
        true
    }

    fn event_enabled(&self, event: &tracing::Event<'_>, _cx: &Context<'_, S>) -> bool {
        self.should_emit(event.metadata().target())
    }
}
