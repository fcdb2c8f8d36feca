//! Session wiring.
//!
//! [`drive`] is the timer loop proper and only needs channels, a sink and a
//! viewport, so tests run it headless. [`run`] builds those from the real
//! terminal, stdin and process signals.

use std::io::{self, Write};
use std::time::Instant;

use chrono::Local;
use crossbeam_channel::bounded;

use crate::config::Config;
use crate::display::{BlockFace, ClockFace};
use crate::error::{Result, TimerError};
use crate::keyboard::KeyboardReader;
use crate::notify;
use crate::runtime::{AdaptiveTicker, Runner, TimerEvent};
use crate::session::SessionConfig;
use crate::signals::SignalListener;
use crate::summary::Summary;
use crate::terminal::{SessionOptions, TerminalSession, TerminalViewport, Viewport};
use crate::timer::{Termination, Timer};

const QUIT_BANNER: &str = "\r\nquitting...\r\n";
const FINISH_BANNER: &str = "\r\nfinished!\r\n";

/// Run the loop until the timer terminates, writing frames to `out`.
pub fn drive<W, F, V>(
    timer: &mut Timer<'_>,
    runner: &mut Runner,
    face: &F,
    viewport: &V,
    out: &mut W,
) -> Result<Summary>
where
    W: Write,
    F: ClockFace + ?Sized,
    V: Viewport + ?Sized,
{
    if let Some(frame) = timer.render(Instant::now(), face, viewport) {
        out.write_all(frame.as_bytes())?;
        out.flush()?;
    }

    loop {
        let event = runner.step();
        // sampled after the wait so every transition sees the arrival time
        let now = Instant::now();
        match event {
            TimerEvent::Signal(signal) => {
                timer.handle_signal(signal);
            }
            TimerEvent::Key(byte) => {
                timer.handle_key(byte, now);
            }
            TimerEvent::Tick => {
                if timer.on_tick(now).is_none() {
                    if let Some(frame) = timer.render(now, face, viewport) {
                        out.write_all(frame.as_bytes())?;
                        out.flush()?;
                    }
                }
            }
        }

        if let Some(why) = timer.termination() {
            out.write_all(banner(why).as_bytes())?;
            out.flush()?;
            return Ok(timer.summary(Instant::now(), Local::now()));
        }
    }
}

/// Leaves the cursor on a fresh line for the report that follows.
fn banner(why: Termination) -> &'static str {
    match why {
        Termination::Quit => QUIT_BANNER,
        Termination::Finished => FINISH_BANNER,
        Termination::Interrupted | Termination::Signalled => "\r\n",
    }
}

/// Run one interactive session on the controlling terminal.
///
/// # Errors
///
/// Fails before anything is drawn if signals cannot be hooked or the terminal
/// cannot be put into raw mode. A failure to restore the terminal afterwards
/// is only logged.
pub fn run(config: &Config, session: SessionConfig) -> Result<Summary> {
    let signals = SignalListener::install().map_err(TimerError::TerminalUnavailable)?;
    let options = if session.fullscreen {
        SessionOptions::fullscreen()
    } else {
        SessionOptions::inline()
    };
    let terminal = TerminalSession::enter(options)?;

    let (done_tx, done_rx) = bounded::<()>(0);
    let reader = KeyboardReader::spawn(
        io::stdin(),
        config.key_capacity(),
        config.escape_timeout(),
        done_rx,
    )?;

    let ticker = AdaptiveTicker::for_target(session.target, config);
    let mut runner = Runner::new(reader.keys(), signals.events(), &ticker);
    let viewport = TerminalViewport::new(config.default_viewport());
    let mut timer = Timer::new(config, session, Instant::now(), Local::now());

    let outcome = {
        let mut stdout = io::stdout().lock();
        drive(&mut timer, &mut runner, &BlockFace, &viewport, &mut stdout)
    };

    // session over: the decoder thread sees the disconnect and exits
    drop(done_tx);
    reader.join();

    if let Err(e) = terminal.restore() {
        log::warn!("{e}");
    }

    let summary = outcome?;
    if summary.finished && config.notify {
        notify::finished(summary.name.as_deref());
    }
    Ok(summary)
}
