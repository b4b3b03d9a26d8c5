// src/survey/timing.rs

use std::cell::Cell;

use chrono::{DateTime, Utc};

/// Millisecond wall clock.
pub trait Clock {
    fn now_ms(&self) -> i64;

    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.now_ms()).unwrap_or_default()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Hand-driven clock for tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<i64>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: i64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.get()
    }
}

/// Remembers when the current question/sub-question was shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingTracker {
    last_transition_ms: i64,
}

impl TimingTracker {
    pub fn started_at(ms: i64) -> Self {
        Self {
            last_transition_ms: ms,
        }
    }

    /// Elapsed time since the last transition, then restarts the timer at
    /// `now_ms`. A clock that stepped backwards yields zero.
    pub fn lap(&mut self, now_ms: i64) -> u64 {
        let elapsed = now_ms.saturating_sub(self.last_transition_ms).max(0) as u64;
        self.last_transition_ms = now_ms;
        elapsed
    }

    pub fn last_transition_ms(&self) -> i64 {
        self.last_transition_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lap_measures_and_restarts() {
        let clock = ManualClock::new(1_000);
        let mut tracker = TimingTracker::started_at(clock.now_ms());

        clock.advance(2_500);
        assert_eq!(tracker.lap(clock.now_ms()), 2_500);

        clock.advance(400);
        assert_eq!(tracker.lap(clock.now_ms()), 400);
        assert_eq!(tracker.last_transition_ms(), 3_900);
    }

    #[test]
    fn backwards_clock_clamps_to_zero() {
        let mut tracker = TimingTracker::started_at(10_000);
        assert_eq!(tracker.lap(9_000), 0);
        assert_eq!(tracker.last_transition_ms(), 9_000);
    }
}
