use std::time::{Duration, Instant};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    /// counts down to zero, then finishes
    Timer,
    /// counts up until stopped
    Counter,
}

/// What the caller asked for. Immutable once the session starts.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Zero selects stopwatch mode.
    pub target: Duration,
    pub fullscreen: bool,
    pub start_paused: bool,
    pub name: Option<String>,
}

impl SessionConfig {
    pub fn countdown(target: Duration) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    pub fn stopwatch() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        if self.target.is_zero() {
            Mode::Counter
        } else {
            Mode::Timer
        }
    }
}

/// Wall-clock bookkeeping that excludes paused intervals.
#[derive(Debug, Clone)]
pub struct SessionClock {
    start: Instant,
    pause_start: Option<Instant>,
    accumulated_pause: Duration,
}

impl SessionClock {
    pub fn new(start: Instant, paused: bool) -> Self {
        Self {
            start,
            pause_start: paused.then_some(start),
            accumulated_pause: Duration::ZERO,
        }
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn is_paused(&self) -> bool {
        self.pause_start.is_some()
    }

    pub fn accumulated_pause(&self) -> Duration {
        self.accumulated_pause
    }

    pub fn pause(&mut self, now: Instant) {
        if self.pause_start.is_none() {
            self.pause_start = Some(now);
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if let Some(since) = self.pause_start.take() {
            self.accumulated_pause += now.saturating_duration_since(since);
        }
    }

    /// Flip between paused and running; returns true if now paused.
    pub fn toggle(&mut self, now: Instant) -> bool {
        if self.is_paused() {
            self.resume(now);
        } else {
            self.pause(now);
        }
        self.is_paused()
    }

    /// `(now - start) - accumulated pause - current pause`, clamped at zero.
    pub fn effective_elapsed(&self, now: Instant) -> Duration {
        let current_pause = self
            .pause_start
            .map(|since| now.saturating_duration_since(since))
            .unwrap_or_default();
        now.saturating_duration_since(self.start)
            .saturating_sub(self.accumulated_pause)
            .saturating_sub(current_pause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn mode_follows_target() {
        assert_eq!(SessionConfig::stopwatch().mode(), Mode::Counter);
        assert_eq!(SessionConfig::countdown(secs(5)).mode(), Mode::Timer);
    }

    #[test]
    fn mode_display_and_serialize_lowercase() {
        assert_eq!(Mode::Timer.to_string(), "timer");
        assert_eq!(Mode::Counter.to_string(), "counter");
        assert_eq!(serde_json::to_string(&Mode::Counter).unwrap(), "\"counter\"");
    }

    #[test]
    fn running_clock_tracks_wall_time() {
        let t0 = Instant::now();
        let clock = SessionClock::new(t0, false);
        assert_eq!(clock.effective_elapsed(t0), Duration::ZERO);
        assert_eq!(clock.effective_elapsed(t0 + secs(7)), secs(7));
    }

    #[test]
    fn pause_freezes_and_resume_accumulates() {
        let t0 = Instant::now();
        let mut clock = SessionClock::new(t0, false);

        clock.pause(t0 + secs(3));
        assert_eq!(clock.effective_elapsed(t0 + secs(3)), secs(3));
        assert_eq!(clock.effective_elapsed(t0 + secs(5)), secs(3));

        clock.resume(t0 + secs(5));
        assert_eq!(clock.accumulated_pause(), secs(2));
        assert_eq!(clock.effective_elapsed(t0 + secs(6)), secs(4));
    }

    #[test]
    fn starting_paused_holds_at_zero() {
        let t0 = Instant::now();
        let mut clock = SessionClock::new(t0, true);
        assert!(clock.is_paused());
        assert_eq!(clock.effective_elapsed(t0 + secs(10)), Duration::ZERO);
        assert!(!clock.toggle(t0 + secs(10)));
        assert_eq!(clock.effective_elapsed(t0 + secs(11)), secs(1));
    }

    #[test]
    fn repeated_pause_and_resume_are_idempotent() {
        let t0 = Instant::now();
        let mut clock = SessionClock::new(t0, false);
        clock.pause(t0 + secs(1));
        clock.pause(t0 + secs(2));
        clock.resume(t0 + secs(4));
        clock.resume(t0 + secs(9));
        assert_eq!(clock.accumulated_pause(), secs(3));
    }

    proptest! {
        #[test]
        fn elapsed_only_drops_by_completed_pauses(toggles in proptest::collection::vec(1u64..5_000, 0..20)) {
            let t0 = Instant::now();
            let mut clock = SessionClock::new(t0, false);
            let mut now = t0;
            let mut wall = Duration::ZERO;
            for step in toggles {
                now += Duration::from_millis(step);
                wall += Duration::from_millis(step);
                clock.toggle(now);
                let elapsed = clock.effective_elapsed(now);
                prop_assert_eq!(elapsed + clock.accumulated_pause(), wall);
                // frozen while paused
                if clock.is_paused() {
                    prop_assert_eq!(clock.effective_elapsed(now + Duration::from_secs(60)), elapsed);
                }
            }
        }
    }
}
