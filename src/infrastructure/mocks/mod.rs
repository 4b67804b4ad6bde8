//! Mock implementations for testing.
//!
//! This module provides test doubles for infrastructure adapters,
//! enabling deterministic testing of window and decay behavior.

pub mod clock;
pub mod layer;

pub use clock::MockClock;
pub use layer::MockCaptureLayer;
