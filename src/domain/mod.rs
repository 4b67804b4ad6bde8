//! Domain layer - pure flow-control bookkeeping with no I/O.
//!
//! - Tier quota records and their proportional decay
//! - Sampling window classification and gate decisions
//! - Configuration records and validation

pub mod config;
pub mod tier;
pub mod window;
