use std::sync::{Arc, Barrier};
use std::time::Duration;
use window_throttle::infrastructure::mocks::MockClock;
use window_throttle::{ConfigError, SamplerConfig, WindowSampler};

fn sampler(clock: &MockClock) -> WindowSampler {
    WindowSampler::new(Duration::from_millis(100), Duration::from_secs(1))
        .unwrap()
        .with_clock(Arc::new(clock.clone()))
}

#[test]
fn test_events_flow_through_unchanged() {
    let clock = MockClock::new(0);
    let sampler = sampler(&clock);

    let event = vec!["payload".to_string()];
    assert_eq!(sampler.gate(event.clone()), Some(event));

    clock.set(500);
    assert_eq!(sampler.gate("dropped"), None);
}

#[test]
fn test_one_window_per_period_over_a_long_run() {
    let clock = MockClock::new(0);
    let sampler = sampler(&clock);

    let mut passed = 0;
    for _ in 0..10_000 {
        if sampler.decide().is_pass() {
            passed += 1;
        }
        clock.advance(Duration::from_millis(1));
    }

    // 10 periods of 1s, each with a 100ms window
    assert_eq!(passed, 1000);
    assert_eq!(sampler.metrics().windows_opened(), 9);
    assert_eq!(sampler.metrics().events_suppressed(), 9000);
}

#[test]
fn test_sparse_events_open_late_windows() {
    let clock = MockClock::new(0);
    let sampler = sampler(&clock);

    // One event every 700ms: a window opens on the first event past each boundary
    let decisions: Vec<bool> = (0..6)
        .map(|i| {
            clock.set(i * 700);
            sampler.decide().is_pass()
        })
        .collect();

    // t=0 (initial window), 700 dormant, 1400 opens, 2100 dormant, 2800 opens, 3500 dormant
    assert_eq!(decisions, vec![true, false, true, false, true, false]);
}

#[test]
fn test_concurrent_callers_open_a_single_window() {
    let clock = MockClock::new(0);
    let sampler = sampler(&clock);
    clock.set(1000);

    let barrier = Arc::new(Barrier::new(16));
    let handles: Vec<_> = (0..16)
        .map(|_| {
            let sampler = sampler.clone();
            let barrier = barrier.clone();
            std::thread::spawn(move || {
                barrier.wait();
                sampler.decide()
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(sampler.metrics().windows_opened(), 1);
    assert_eq!(sampler.last_window_start(), 1000);
    assert_eq!(sampler.metrics().snapshot().total_events(), 16);
}

#[test]
fn test_rejects_window_longer_than_period() {
    let result = WindowSampler::new(Duration::from_millis(2000), Duration::from_millis(1000));
    assert_eq!(
        result.unwrap_err(),
        ConfigError::WindowNotShorterThanPeriod {
            window_millis: 2000,
            period_millis: 1000,
        }
    );

    let config = SamplerConfig {
        window_millis: 1000,
        period_millis: 0,
    };
    assert_eq!(
        WindowSampler::from_config(&config).unwrap_err(),
        ConfigError::ZeroPeriod
    );
}
