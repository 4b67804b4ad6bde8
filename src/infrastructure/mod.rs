//! Infrastructure layer - external adapters and integrations.
//!
//! This layer provides adapters for:
//! - Clock and sleep (system time vs mock)
//! - Tracing integration (per-layer `Filter`)

pub mod clock;
pub mod layer;

/// Mock implementations for testing.
///
/// This module is only available when the `test-helpers` feature is enabled,
/// or during test builds. To use these mocks in integration tests, add to
/// your `Cargo.toml`:
/// ```toml
/// [dev-dependencies]
/// window-throttle = { version = "*", features = ["test-helpers"] }
/// ```
#[cfg(any(test, feature = "test-helpers"))]
pub mod mocks;
