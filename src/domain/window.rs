//! Classification of an instant relative to a recurring sampling window.

/// Decision made by a sampling gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Let the event through
    Pass,
    /// Drop the event
    Suppress,
}

impl GateDecision {
    /// Check if this decision is Pass.
    pub fn is_pass(&self) -> bool {
        matches!(self, GateDecision::Pass)
    }

    /// Check if this decision is Suppress.
    pub fn is_suppress(&self) -> bool {
        matches!(self, GateDecision::Suppress)
    }
}

/// Where an instant falls relative to the most recent window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPhase {
    /// Inside `[start, start + window)`
    Active,
    /// At or past `start + period`: a new window may be opened
    Eligible,
    /// Between windows, or before `start`
    Dormant,
}

impl WindowPhase {
    /// Classify `now` against a window that started at `start`.
    ///
    /// ```
    /// use window_throttle::domain::window::WindowPhase;
    ///
    /// assert_eq!(WindowPhase::classify(50, 0, 100, 1000), WindowPhase::Active);
    /// assert_eq!(WindowPhase::classify(500, 0, 100, 1000), WindowPhase::Dormant);
    /// assert_eq!(WindowPhase::classify(1000, 0, 100, 1000), WindowPhase::Eligible);
    /// ```
    pub fn classify(now: u64, start: u64, window_millis: u64, period_millis: u64) -> Self {
        if now >= start && now < start.saturating_add(window_millis) {
            WindowPhase::Active
        } else if now >= start.saturating_add(period_millis) {
            WindowPhase::Eligible
        } else {
            WindowPhase::Dormant
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_bounds() {
        assert_eq!(WindowPhase::classify(1000, 1000, 100, 1000), WindowPhase::Active);
        assert_eq!(WindowPhase::classify(1099, 1000, 100, 1000), WindowPhase::Active);
        assert_eq!(WindowPhase::classify(1100, 1000, 100, 1000), WindowPhase::Dormant);
        assert_eq!(WindowPhase::classify(1999, 1000, 100, 1000), WindowPhase::Dormant);
        assert_eq!(WindowPhase::classify(2000, 1000, 100, 1000), WindowPhase::Eligible);
    }

    #[test]
    fn test_before_start_is_dormant() {
        assert_eq!(WindowPhase::classify(10, 1000, 100, 1000), WindowPhase::Dormant);
    }

    #[test]
    fn test_initial_zero_start() {
        // Real clocks report epoch millis far past the first period
        assert_eq!(
            WindowPhase::classify(1_700_000_000_000, 0, 1000, 60_000),
            WindowPhase::Eligible
        );
    }

    #[test]
    fn test_saturating_bounds() {
        assert_eq!(
            WindowPhase::classify(u64::MAX - 1, u64::MAX - 2, 10, 100),
            WindowPhase::Active
        );
        assert_eq!(
            WindowPhase::classify(u64::MAX - 50, u64::MAX - 60, 5, 100),
            WindowPhase::Dormant
        );
    }

    #[test]
    fn test_decision_helpers() {
        assert!(GateDecision::Pass.is_pass());
        assert!(!GateDecision::Pass.is_suppress());
        assert!(GateDecision::Suppress.is_suppress());
    }
}
