//! Application layer - the flow-control primitives.
//!
//! - Throughput limiter (blocking admission control across tiers)
//! - Window sampler (lock-free periodic event sampling)
//! - Metrics for both
//!
//! ## Ports
//!
//! The application layer defines ports (traits) for time and sleeping.
//! Infrastructure adapters implement them.

pub mod metrics;
pub mod ports;
pub mod sampler;
pub mod throughput;
