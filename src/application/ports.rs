//! Ports (interfaces) for the application layer.
//!
//! The limiter and the sampler only need to know the current time and, for
//! the limiter, how to pause the calling thread. Infrastructure provides the
//! concrete adapters (SystemClock, ThreadSleeper, MockClock).

use std::fmt::Debug;
use std::time::Duration;

/// Port for obtaining current time.
///
/// Time is expressed as milliseconds since the Unix epoch. Window boundaries
/// are only as precise as this clock's granularity.
pub trait Clock: Send + Sync + Debug {
    /// Get the current time in epoch milliseconds.
    fn now_millis(&self) -> u64;
}

/// Port for blocking the calling thread.
///
/// Implementations must not return early with an error; a wakeup before the
/// full duration is tolerated by callers, which simply re-check their state.
pub trait Sleeper: Send + Sync + Debug {
    /// Pause the current thread for roughly `duration`.
    fn sleep(&self, duration: Duration);
}
