//! Polled round timer.
//!
//! Nothing fires when a timer runs out. Callers ask [`RoundTimer::expired_at`]
//! whenever a candidate acts or polls and finalize the round themselves.

use serde::Serialize;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Normal,
    Warning,
    Critical,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoundTimer {
    started_at: Option<Instant>,
    duration: Duration,
}

impl RoundTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts) the clock.
    pub fn start(&mut self, duration: Duration) {
        self.start_at(Instant::now(), duration);
    }

    pub fn start_at(&mut self, now: Instant, duration: Duration) {
        self.started_at = Some(now);
        self.duration = duration;
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn remaining(&self) -> Duration {
        self.remaining_at(Instant::now())
    }

    /// Zero when the timer was never started.
    pub fn remaining_at(&self, now: Instant) -> Duration {
        match self.started_at {
            Some(started) => self
                .duration
                .saturating_sub(now.saturating_duration_since(started)),
            None => Duration::ZERO,
        }
    }

    pub fn expired(&self) -> bool {
        self.expired_at(Instant::now())
    }

    pub fn expired_at(&self, now: Instant) -> bool {
        self.is_started() && self.remaining_at(now).is_zero()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Share of the duration still left: over half is normal, over a quarter a warning.
    pub fn urgency_at(&self, now: Instant) -> Urgency {
        let total = self.duration.as_secs_f64();
        if total <= 0.0 {
            return Urgency::Critical;
        }

        let share = self.remaining_at(now).as_secs_f64() / total;
        if share > 0.5 {
            Urgency::Normal
        } else if share > 0.25 {
            Urgency::Warning
        } else {
            Urgency::Critical
        }
    }
}

/// Formats a duration as `MM:SS`.
pub fn format_time(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_started_timer_has_nothing_remaining_and_is_not_expired() {
        let timer = RoundTimer::new();
        assert_eq!(timer.remaining(), Duration::ZERO);
        assert!(!timer.expired());
    }

    #[test]
    fn remaining_counts_down_and_saturates() {
        let now = Instant::now();
        let mut timer = RoundTimer::new();
        timer.start_at(now, Duration::from_secs(10));

        assert_eq!(timer.remaining_at(now), Duration::from_secs(10));
        assert_eq!(
            timer.remaining_at(now + Duration::from_secs(4)),
            Duration::from_secs(6)
        );
        assert_eq!(
            timer.remaining_at(now + Duration::from_secs(60)),
            Duration::ZERO
        );
        assert!(timer.expired_at(now + Duration::from_secs(10)));
        assert!(!timer.expired_at(now + Duration::from_secs(9)));
    }

    #[test]
    fn remaining_is_monotonic_non_increasing() {
        let now = Instant::now();
        let mut timer = RoundTimer::new();
        timer.start_at(now, Duration::from_secs(5));

        let mut last = timer.remaining_at(now);
        for step in 1..10 {
            let current = timer.remaining_at(now + Duration::from_millis(step * 700));
            assert!(current <= last);
            last = current;
        }
    }

    #[test]
    fn restart_replaces_the_clock() {
        let now = Instant::now();
        let mut timer = RoundTimer::new();
        timer.start_at(now, Duration::from_secs(5));
        timer.start_at(now + Duration::from_secs(4), Duration::from_secs(5));

        assert_eq!(
            timer.remaining_at(now + Duration::from_secs(6)),
            Duration::from_secs(3)
        );
    }

    #[test]
    fn reset_behaves_like_never_started() {
        let mut timer = RoundTimer::new();
        timer.start(Duration::from_secs(30));
        timer.reset();

        assert!(!timer.is_started());
        assert_eq!(timer.remaining(), Duration::ZERO);
        assert!(!timer.expired());
    }

    #[test]
    fn zero_duration_expires_immediately() {
        let mut timer = RoundTimer::new();
        timer.start(Duration::ZERO);
        assert!(timer.expired());
    }

    #[test]
    fn urgency_thresholds() {
        let now = Instant::now();
        let mut timer = RoundTimer::new();
        timer.start_at(now, Duration::from_secs(100));

        assert_eq!(timer.urgency_at(now), Urgency::Normal);
        assert_eq!(
            timer.urgency_at(now + Duration::from_secs(60)),
            Urgency::Warning
        );
        assert_eq!(
            timer.urgency_at(now + Duration::from_secs(80)),
            Urgency::Critical
        );
    }

    #[test]
    fn format_time_pads_minutes_and_seconds() {
        assert_eq!(format_time(Duration::from_secs(720)), "12:00");
        assert_eq!(format_time(Duration::from_secs(65)), "01:05");
        assert_eq!(format_time(Duration::ZERO), "00:00");
    }
}
