use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossterm::style::Color;

use crate::config::Config;
use crate::display::{whole_seconds, ClockFace};
use crate::input::Key;
use crate::session::{Mode, SessionClock, SessionConfig};
use crate::signals::SignalEvent;
use crate::summary::Summary;
use crate::terminal::{self, Viewport, PAUSED_COLOR, WARNING_COLOR};

/// Sentinel for "repaint on the next tick no matter what".
const FORCE_RENDER: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Running,
    Paused,
    Terminated,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// countdown reached zero on its own
    Finished,
    /// q, Q or ESC
    Quit,
    /// Ctrl-C typed in raw mode
    Interrupted,
    /// SIGINT or SIGTERM
    Signalled,
}

impl Termination {
    pub fn finished(self) -> bool {
        self == Termination::Finished
    }
}

/// A single timer session
#[derive(Debug)]
pub struct Timer<'a> {
    config: &'a Config,
    session: SessionConfig,
    clock: SessionClock,
    started_at: DateTime<Local>,
    last_rendered_second: i64,
    cached_frame: String,
    terminated: Option<Termination>,
}

impl<'a> Timer<'a> {
    pub fn new(config: &'a Config, session: SessionConfig, now: Instant, started_at: DateTime<Local>) -> Self {
        let clock = SessionClock::new(now, session.start_paused);
        Self {
            config,
            session,
            clock,
            started_at,
            last_rendered_second: FORCE_RENDER,
            cached_frame: String::new(),
            terminated: None,
        }
    }

    pub fn state(&self) -> TimerState {
        if self.terminated.is_some() {
            TimerState::Terminated
        } else if self.clock.is_paused() {
            TimerState::Paused
        } else {
            TimerState::Running
        }
    }

    pub fn mode(&self) -> Mode {
        self.session.mode()
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    pub fn termination(&self) -> Option<Termination> {
        self.terminated
    }

    pub fn effective_elapsed(&self, now: Instant) -> Duration {
        self.clock.effective_elapsed(now)
    }

    /// Time left on a countdown; `None` for a stopwatch.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        match self.mode() {
            Mode::Timer => Some(self.session.target.saturating_sub(self.effective_elapsed(now))),
            Mode::Counter => None,
        }
    }

    /// The value shown on screen: remaining for countdowns, elapsed otherwise.
    pub fn display_time(&self, now: Instant) -> Duration {
        self.remaining(now)
            .unwrap_or_else(|| self.effective_elapsed(now))
    }

    pub fn force_render(&mut self) {
        self.last_rendered_second = FORCE_RENDER;
    }

    pub fn toggle_pause(&mut self, now: Instant) {
        if self.terminated.is_some() {
            return;
        }
        let paused = self.clock.toggle(now);
        log::debug!("{}", if paused { "paused" } else { "resumed" });
        self.force_render();
    }

    pub fn handle_key(&mut self, byte: u8, now: Instant) -> Option<Termination> {
        if self.terminated.is_some() {
            return None;
        }
        match Key::from_byte(byte) {
            Key::TogglePause => {
                self.toggle_pause(now);
                None
            }
            Key::Quit => self.terminate(Termination::Quit),
            Key::Interrupt => self.terminate(Termination::Interrupted),
            Key::Other(_) => None,
        }
    }

    pub fn handle_signal(&mut self, signal: SignalEvent) -> Option<Termination> {
        if self.terminated.is_some() {
            return None;
        }
        match signal {
            SignalEvent::Resize => {
                self.force_render();
                None
            }
            SignalEvent::Terminate => self.terminate(Termination::Signalled),
        }
    }

    /// Recompute time; a countdown that has run out finishes here and only
    /// here.
    pub fn on_tick(&mut self, now: Instant) -> Option<Termination> {
        if self.terminated.is_some() {
            return None;
        }
        match self.remaining(now) {
            Some(left) if left.is_zero() => self.terminate(Termination::Finished),
            _ => None,
        }
    }

    fn terminate(&mut self, why: Termination) -> Option<Termination> {
        log::debug!("session terminated: {why:?}");
        self.terminated = Some(why);
        self.terminated
    }

    /// Paused wins over the countdown warning; stopwatches never warn.
    pub fn color(&self, display: Duration) -> Option<Color> {
        if self.clock.is_paused() {
            Some(PAUSED_COLOR)
        } else if self.mode() == Mode::Timer && display < self.config.warning_threshold() {
            Some(WARNING_COLOR)
        } else {
            None
        }
    }

    /// Regenerate the frame if the displayed second changed or a repaint was
    /// forced. Returns the new frame, or `None` when the cached one still
    /// holds.
    pub fn render<F, V>(&mut self, now: Instant, face: &F, viewport: &V) -> Option<&str>
    where
        F: ClockFace + ?Sized,
        V: Viewport + ?Sized,
    {
        let display = self.display_time(now);
        let second = i64::try_from(whole_seconds(display)).unwrap_or(i64::MAX);
        if second == self.last_rendered_second {
            return None;
        }
        self.last_rendered_second = second;

        let text = face.format(display);
        let color = self.color(display);
        self.cached_frame = if self.session.fullscreen {
            let (width, height) = viewport.size();
            let body = terminal::compose_frame(&face.render(&text, width, height), color);
            terminal::clear_and_home() + &terminal::fix_newlines(&body)
        } else {
            format!("\r{}   ", terminal::compose_frame(&text, color))
        };
        Some(self.cached_frame.as_str())
    }

    pub fn cached_frame(&self) -> &str {
        &self.cached_frame
    }

    pub fn summary(&self, now: Instant, ended_at: DateTime<Local>) -> Summary {
        Summary {
            name: self.session.name.clone(),
            start: self.started_at,
            end: ended_at,
            duration: self.effective_elapsed(now),
            mode: self.mode(),
            finished: self.terminated.is_some_and(Termination::finished),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::BlockFace;
    use crate::input::{CTRL_C, ESC};
    use crate::terminal::FixedViewport;
    use assert_matches::assert_matches;
    use std::cell::Cell;

    /// Counts how often the frame is actually recomputed.
    #[derive(Default)]
    struct CountingFace {
        formats: Cell<usize>,
    }

    impl ClockFace for CountingFace {
        fn format(&self, d: Duration) -> String {
            self.formats.set(self.formats.get() + 1);
            BlockFace.format(d)
        }

        fn render(&self, text: &str, width: u16, height: u16) -> String {
            BlockFace.render(text, width, height)
        }
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn timer(config: &Config, session: SessionConfig) -> (Timer<'_>, Instant) {
        let t0 = Instant::now();
        (Timer::new(config, session, t0, Local::now()), t0)
    }

    #[test]
    fn starts_running_unless_asked_to_pause() {
        let cfg = Config::default();
        let (t, _) = timer(&cfg, SessionConfig::countdown(secs(5)));
        assert_eq!(t.state(), TimerState::Running);

        let paused = SessionConfig {
            start_paused: true,
            ..SessionConfig::countdown(secs(5))
        };
        let (t, _) = timer(&cfg, paused);
        assert_eq!(t.state(), TimerState::Paused);
    }

    #[test]
    fn space_toggles_between_running_and_paused() {
        let cfg = Config::default();
        let (mut t, t0) = timer(&cfg, SessionConfig::countdown(secs(60)));
        assert_eq!(t.handle_key(b' ', t0 + secs(1)), None);
        assert_eq!(t.state(), TimerState::Paused);
        assert_eq!(t.handle_key(b' ', t0 + secs(3)), None);
        assert_eq!(t.state(), TimerState::Running);
        assert_eq!(t.clock().accumulated_pause(), secs(2));
    }

    #[test]
    fn quit_keys_terminate_from_any_state() {
        let cfg = Config::default();
        for (byte, why) in [
            (b'q', Termination::Quit),
            (b'Q', Termination::Quit),
            (ESC, Termination::Quit),
            (CTRL_C, Termination::Interrupted),
        ] {
            let (mut t, t0) = timer(&cfg, SessionConfig::countdown(secs(60)));
            t.handle_key(b' ', t0);
            assert_eq!(t.handle_key(byte, t0 + secs(1)), Some(why));
            assert_eq!(t.state(), TimerState::Terminated);
            assert!(!t.summary(t0 + secs(1), Local::now()).finished);
        }
    }

    #[test]
    fn other_keys_are_ignored() {
        let cfg = Config::default();
        let (mut t, t0) = timer(&cfg, SessionConfig::stopwatch());
        assert_eq!(t.handle_key(b'x', t0), None);
        assert_eq!(t.state(), TimerState::Running);
    }

    #[test]
    fn terminate_signal_ends_session_unfinished() {
        let cfg = Config::default();
        let (mut t, t0) = timer(&cfg, SessionConfig::stopwatch());
        assert_eq!(t.handle_signal(SignalEvent::Terminate), Some(Termination::Signalled));
        let summary = t.summary(t0 + secs(4), Local::now());
        assert!(!summary.finished);
        assert_eq!(summary.mode, Mode::Counter);
        assert_eq!(summary.duration, secs(4));
    }

    #[test]
    fn resize_forces_a_repaint_without_changing_state() {
        let cfg = Config::default();
        let (mut t, t0) = timer(&cfg, SessionConfig::countdown(secs(30)));
        let face = BlockFace;
        let vp = FixedViewport(80, 24);
        assert!(t.render(t0, &face, &vp).is_some());
        assert!(t.render(t0, &face, &vp).is_none());
        assert_eq!(t.handle_signal(SignalEvent::Resize), None);
        assert_eq!(t.state(), TimerState::Running);
        assert!(t.render(t0, &face, &vp).is_some());
    }

    #[test]
    fn countdown_finishes_exactly_at_target() {
        let cfg = Config::default();
        let (mut t, t0) = timer(&cfg, SessionConfig::countdown(secs(5)));
        assert_eq!(t.on_tick(t0 + Duration::from_millis(4999)), None);
        assert_eq!(t.on_tick(t0 + secs(5)), Some(Termination::Finished));
        let summary = t.summary(t0 + secs(5), Local::now());
        assert!(summary.finished);
        assert_eq!(summary.mode, Mode::Timer);
        // terminal state absorbs further ticks
        assert_eq!(t.on_tick(t0 + secs(6)), None);
    }

    #[test]
    fn paused_countdown_never_finishes() {
        let cfg = Config::default();
        let (mut t, t0) = timer(&cfg, SessionConfig::countdown(secs(5)));
        t.toggle_pause(t0 + secs(1));
        assert_eq!(t.on_tick(t0 + secs(3600)), None);
        assert_eq!(t.remaining(t0 + secs(3600)), Some(secs(4)));
    }

    #[test]
    fn pause_leaves_remaining_time_unchanged() {
        let cfg = Config::default();
        let (mut t, t0) = timer(&cfg, SessionConfig::countdown(secs(10)));
        let before = t.remaining(t0 + secs(3));
        t.handle_key(b' ', t0 + secs(3));
        t.handle_key(b' ', t0 + secs(5));
        assert_eq!(t.remaining(t0 + secs(5)), before);
        assert_eq!(t.clock().accumulated_pause(), secs(2));
    }

    #[test]
    fn stopwatch_never_finishes_on_tick() {
        let cfg = Config::default();
        let (mut t, t0) = timer(&cfg, SessionConfig::stopwatch());
        for h in [0, 1, 24, 24 * 365] {
            assert_eq!(t.on_tick(t0 + secs(h * 3600)), None);
        }
        assert_eq!(t.state(), TimerState::Running);
        assert_eq!(t.display_time(t0 + secs(42)), secs(42));
    }

    #[test]
    fn color_layering() {
        let cfg = Config::default();
        let (mut t, t0) = timer(&cfg, SessionConfig::countdown(secs(3600)));
        assert_eq!(t.color(secs(600)), None);
        assert_eq!(t.color(secs(299)), Some(WARNING_COLOR));
        t.toggle_pause(t0);
        assert_eq!(t.color(secs(299)), Some(PAUSED_COLOR));
        assert_eq!(t.color(secs(600)), Some(PAUSED_COLOR));
    }

    #[test]
    fn stopwatch_never_warns() {
        let cfg = Config::default();
        let (t, _) = timer(&cfg, SessionConfig::stopwatch());
        assert_eq!(t.color(secs(1)), None);
        assert_eq!(t.color(secs(10_000)), None);
    }

    #[test]
    fn same_second_reuses_cached_frame() {
        let cfg = Config::default();
        let (mut t, t0) = timer(&cfg, SessionConfig::countdown(secs(30)));
        let face = CountingFace::default();
        let vp = FixedViewport(80, 24);

        let first = t.render(t0, &face, &vp).map(str::to_owned);
        assert!(first.is_some());
        assert_eq!(t.render(t0 + Duration::from_millis(100), &face, &vp), None);
        assert_eq!(t.render(t0 + Duration::from_millis(200), &face, &vp), None);
        assert_eq!(face.formats.get(), 1);
        assert_eq!(Some(t.cached_frame().to_owned()), first);

        assert!(t.render(t0 + secs(1), &face, &vp).is_some());
        assert_eq!(face.formats.get(), 2);
    }

    #[test]
    fn inline_frame_rewrites_the_line() {
        let cfg = Config::default();
        let (mut t, t0) = timer(&cfg, SessionConfig::countdown(secs(600)));
        let frame = t.render(t0, &BlockFace, &FixedViewport(80, 24)).unwrap();
        assert_eq!(frame, "\r10:00   ");
    }

    #[test]
    fn inline_warning_frame_is_colored() {
        let cfg = Config::default();
        let (mut t, t0) = timer(&cfg, SessionConfig::countdown(secs(5)));
        let frame = t.render(t0, &BlockFace, &FixedViewport(80, 24)).unwrap();
        assert_eq!(frame, format!("\r{}   ", terminal::compose_frame("00:05", Some(WARNING_COLOR))));
    }

    #[test]
    fn fullscreen_frame_clears_and_uses_crlf() {
        let cfg = Config::default();
        let session = SessionConfig {
            fullscreen: true,
            ..SessionConfig::stopwatch()
        };
        let (mut t, t0) = timer(&cfg, session);
        let frame = t.render(t0, &BlockFace, &FixedViewport(80, 24)).unwrap();
        assert!(frame.starts_with(&terminal::clear_and_home()));
        assert!(frame.contains("\r\n"));
        assert!(!frame.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn summary_carries_name() {
        let cfg = Config::default();
        let session = SessionConfig {
            name: Some("tea".into()),
            ..SessionConfig::countdown(secs(5))
        };
        let (mut t, t0) = timer(&cfg, session);
        assert_matches!(t.handle_key(b'q', t0), Some(Termination::Quit));
        assert_eq!(t.summary(t0, Local::now()).name.as_deref(), Some("tea"));
    }
}
