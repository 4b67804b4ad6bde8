//! Mock clock for testing.

use crate::application::ports::{Clock, Sleeper};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock clock for testing.
///
/// Time only moves when a test says so, which makes window boundaries and
/// decay deterministic. The clock is also a [`Sleeper`]: sleeping advances
/// the clock by the requested duration instead of parking the thread, so a
/// blocked `control()` call completes instantly in simulated time.
///
/// # Examples
///
/// ```
/// use window_throttle::infrastructure::mocks::MockClock;
/// use window_throttle::application::ports::{Clock, Sleeper};
/// use std::time::Duration;
///
/// let clock = MockClock::new(1_000);
/// assert_eq!(clock.now_millis(), 1_000);
///
/// clock.advance(Duration::from_millis(250));
/// assert_eq!(clock.now_millis(), 1_250);
///
/// clock.sleep(Duration::from_millis(50));
/// assert_eq!(clock.now_millis(), 1_300);
/// assert_eq!(clock.sleeps(), vec![Duration::from_millis(50)]);
/// ```
///
/// # Thread Safety
///
/// All clones share the same time value and sleep log.
#[derive(Debug, Clone)]
pub struct MockClock {
    now_millis: Arc<AtomicU64>,
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl MockClock {
    /// Create a mock clock reading `start_millis`.
    pub fn new(start_millis: u64) -> Self {
        Self {
            now_millis: Arc::new(AtomicU64::new(start_millis)),
            sleeps: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, duration: Duration) {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.now_millis.fetch_add(millis, Ordering::SeqCst);
    }

    /// Set the clock to a specific epoch-millis value.
    pub fn set(&self, millis: u64) {
        self.now_millis.store(millis, Ordering::SeqCst);
    }

    /// Every duration passed to [`Sleeper::sleep`], in call order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock")
            .clone()
    }
}

impl Clock for MockClock {
    fn now_millis(&self) -> u64 {
        self.now_millis.load(Ordering::SeqCst)
    }
}

impl Sleeper for MockClock {
    fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock")
            .push(duration);
        self.advance(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_clock() {
        let clock = MockClock::new(0);
        assert_eq!(clock.now_millis(), 0);

        clock.advance(Duration::from_secs(10));
        assert_eq!(clock.now_millis(), 10_000);

        clock.set(100);
        assert_eq!(clock.now_millis(), 100);
    }

    #[test]
    fn test_clones_share_time() {
        let clock = MockClock::new(0);
        let clone = clock.clone();

        std::thread::spawn(move || clone.sleep(Duration::from_millis(5)))
            .join()
            .unwrap();

        assert_eq!(clock.now_millis(), 5);
        assert_eq!(clock.sleeps().len(), 1);
    }
}
