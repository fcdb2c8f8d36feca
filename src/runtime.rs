use std::time::{Duration, Instant};

use crossbeam_channel::{never, select, tick, Receiver};

use crate::config::Config;
use crate::signals::SignalEvent;

/// Unified event type consumed by the timer loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    Key(u8),
    Signal(SignalEvent),
    Tick,
}

/// Configurable ticker interface
pub trait Ticker {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Interval picked once from the target duration: short countdowns tick
/// fast for smooth digits, long ones and stopwatches once a second.
#[derive(Clone, Copy, Debug)]
pub struct AdaptiveTicker {
    interval: Duration,
}

impl AdaptiveTicker {
    pub fn for_target(target: Duration, config: &Config) -> Self {
        let ms = if target.is_zero() || target >= Duration::from_secs(10 * 60) {
            config.tick_slow_ms
        } else if target < Duration::from_secs(60) {
            config.tick_fast_ms
        } else {
            config.tick_medium_ms
        };
        Self {
            interval: Duration::from_millis(ms.max(1)),
        }
    }
}

impl Ticker for AdaptiveTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// The single suspension point of the timer loop. Waits for whichever of
/// signal, key or tick is ready first.
pub struct Runner {
    keys: Receiver<u8>,
    signals: Receiver<SignalEvent>,
    ticks: Receiver<Instant>,
}

impl Runner {
    pub fn new<T: Ticker>(keys: Receiver<u8>, signals: Receiver<SignalEvent>, ticker: &T) -> Self {
        Self {
            keys,
            signals,
            ticks: tick(ticker.interval()),
        }
    }

    /// Blocks until the next event. A source that disconnects is silenced
    /// and the loop carries on with the rest.
    pub fn step(&mut self) -> TimerEvent {
        loop {
            let mut keys_closed = false;
            let mut signals_closed = false;
            select! {
                recv(self.signals) -> msg => match msg {
                    Ok(sig) => return TimerEvent::Signal(sig),
                    Err(_) => signals_closed = true,
                },
                recv(self.keys) -> msg => match msg {
                    Ok(key) => return TimerEvent::Key(key),
                    Err(_) => keys_closed = true,
                },
                recv(self.ticks) -> _ => return TimerEvent::Tick,
            }
            if keys_closed {
                log::debug!("keyboard input closed; continuing on ticks and signals");
                self.keys = never();
            }
            if signals_closed {
                self.signals = never();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    fn runner_with(keys: Receiver<u8>, signals: Receiver<SignalEvent>, ms: u64) -> Runner {
        Runner::new(keys, signals, &FixedTicker::new(Duration::from_millis(ms)))
    }

    #[test]
    fn step_returns_tick_when_idle() {
        let (_ktx, krx) = unbounded();
        let (_stx, srx) = unbounded();
        let mut runner = runner_with(krx, srx, 1);
        assert_eq!(runner.step(), TimerEvent::Tick);
    }

    #[test]
    fn step_passes_through_keys_and_signals() {
        let (ktx, krx) = unbounded();
        let (stx, srx) = unbounded();
        let mut runner = runner_with(krx, srx, 10_000);

        ktx.send(b' ').unwrap();
        assert_eq!(runner.step(), TimerEvent::Key(b' '));
        stx.send(SignalEvent::Resize).unwrap();
        assert_eq!(runner.step(), TimerEvent::Signal(SignalEvent::Resize));
    }

    #[test]
    fn closed_sources_fall_back_to_ticks() {
        let (ktx, krx) = unbounded::<u8>();
        let (stx, srx) = unbounded();
        drop(ktx);
        drop(stx);
        let mut runner = runner_with(krx, srx, 1);
        assert_eq!(runner.step(), TimerEvent::Tick);
        assert_eq!(runner.step(), TimerEvent::Tick);
    }

    #[test]
    fn adaptive_interval_bands() {
        let cfg = Config::default();
        let interval = |secs| AdaptiveTicker::for_target(Duration::from_secs(secs), &cfg).interval();
        assert_eq!(interval(5), Duration::from_millis(100));
        assert_eq!(interval(59), Duration::from_millis(100));
        assert_eq!(interval(60), Duration::from_millis(500));
        assert_eq!(interval(9 * 60 + 59), Duration::from_millis(500));
        assert_eq!(interval(10 * 60), Duration::from_secs(1));
        assert_eq!(interval(3 * 3600), Duration::from_secs(1));
    }

    #[test]
    fn stopwatch_ticks_slowly() {
        let ticker = AdaptiveTicker::for_target(Duration::ZERO, &Config::default());
        assert_eq!(ticker.interval(), Duration::from_secs(1));
    }

    #[test]
    fn adaptive_interval_honours_config() {
        let cfg = Config {
            tick_fast_ms: 20,
            ..Config::default()
        };
        let ticker = AdaptiveTicker::for_target(Duration::from_secs(3), &cfg);
        assert_eq!(ticker.interval(), Duration::from_millis(20));
    }
}
