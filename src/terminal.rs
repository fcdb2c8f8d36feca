//! Terminal lifecycle and escape-sequence helpers.
//!
//! [`TerminalSession`] is the only writer of terminal mode state. Everything it
//! enables is tracked and undone in reverse order on [`TerminalSession::restore`]
//! or on drop, whichever comes first.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use crossterm::{
    cursor, execute,
    style::{Color, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
    Command,
};

use crate::error::{Result, TimerError};

/// Basic (X10/normal) mouse tracking. Reports are swallowed by the input
/// decoder; enabling them keeps wheel scrolls from moving the scrollback.
const MOUSE_ENABLE_SEQ: &[u8] = b"\x1b[?1000h";
const MOUSE_DISABLE_SEQ: &[u8] = b"\x1b[?1000l";

pub const PAUSED_COLOR: Color = Color::DarkBlue;
pub const WARNING_COLOR: Color = Color::DarkRed;

static SESSION_ACTIVE: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    pub alternate_screen: bool,
    pub mouse_capture: bool,
}

impl SessionOptions {
    pub fn fullscreen() -> Self {
        Self {
            alternate_screen: true,
            mouse_capture: true,
        }
    }

    pub fn inline() -> Self {
        Self::default()
    }
}

/// Guard over raw mode, cursor visibility, the alternate screen and mouse
/// reporting.
#[derive(Debug)]
pub struct TerminalSession {
    alternate_screen_enabled: bool,
    cursor_hidden: bool,
    raw_mode_enabled: bool,
    mouse_enabled: bool,
}

impl TerminalSession {
    /// Reconfigure the terminal for a session.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::TerminalUnavailable`] if stdin is not a terminal
    /// or any mode switch fails. Whatever was enabled before the failure is
    /// rolled back before returning.
    pub fn enter(options: SessionOptions) -> Result<Self> {
        if !io::stdin().is_tty() {
            return Err(TimerError::TerminalUnavailable(io::Error::other(
                "stdin must be a tty",
            )));
        }
        install_panic_hook();

        let mut session = Self::detached();
        session.enable(options).map_err(TimerError::TerminalUnavailable)?;
        SESSION_ACTIVE.store(true, Ordering::SeqCst);
        Ok(session)
    }

    fn detached() -> Self {
        Self {
            alternate_screen_enabled: false,
            cursor_hidden: false,
            raw_mode_enabled: false,
            mouse_enabled: false,
        }
    }

    fn enable(&mut self, options: SessionOptions) -> io::Result<()> {
        let mut stdout = io::stdout();

        if options.alternate_screen {
            execute!(stdout, EnterAlternateScreen, Clear(ClearType::All))?;
            self.alternate_screen_enabled = true;
            log::debug!("alternate screen enabled");
        }

        execute!(stdout, cursor::Hide)?;
        self.cursor_hidden = true;

        terminal::enable_raw_mode()?;
        self.raw_mode_enabled = true;
        log::debug!("raw mode enabled");

        if options.mouse_capture {
            stdout.write_all(MOUSE_ENABLE_SEQ)?;
            stdout.flush()?;
            self.mouse_enabled = true;
            log::debug!("mouse reporting enabled");
        }
        Ok(())
    }

    /// Undo every enabled effect and report the first failure.
    pub fn restore(mut self) -> Result<()> {
        self.cleanup().map_err(TimerError::TerminalRestoreFailed)
    }

    /// Reverse order of [`Self::enable`]. Every step is attempted even if an
    /// earlier one fails.
    fn cleanup(&mut self) -> io::Result<()> {
        let mut first_err: Option<io::Error> = None;
        let mut note = |r: io::Result<()>| {
            if let Err(e) = r {
                first_err.get_or_insert(e);
            }
        };
        let mut stdout = io::stdout();

        if self.mouse_enabled {
            note(stdout.write_all(MOUSE_DISABLE_SEQ));
            self.mouse_enabled = false;
        }
        if self.raw_mode_enabled {
            note(terminal::disable_raw_mode());
            self.raw_mode_enabled = false;
        }
        if self.cursor_hidden {
            note(execute!(stdout, cursor::Show));
            self.cursor_hidden = false;
        }
        if self.alternate_screen_enabled {
            note(execute!(stdout, LeaveAlternateScreen));
            self.alternate_screen_enabled = false;
        }
        note(stdout.flush());
        SESSION_ACTIVE.store(false, Ordering::SeqCst);

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            log::warn!("{}", TimerError::TerminalRestoreFailed(e));
        }
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if SESSION_ACTIVE.swap(false, Ordering::SeqCst) {
                best_effort_cleanup();
            }
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    let _ = stdout.write_all(MOUSE_DISABLE_SEQ);
    let _ = terminal::disable_raw_mode();
    let _ = execute!(stdout, cursor::Show, LeaveAlternateScreen);
    let _ = stdout.flush();
}

/// Source of the current viewport dimensions as (columns, rows).
pub trait Viewport {
    fn size(&self) -> (u16, u16);
}

/// Queries the controlling terminal, falling back to a fixed size.
#[derive(Debug, Clone, Copy)]
pub struct TerminalViewport {
    fallback: (u16, u16),
}

impl TerminalViewport {
    pub fn new(fallback: (u16, u16)) -> Self {
        Self { fallback }
    }
}

impl Viewport for TerminalViewport {
    fn size(&self) -> (u16, u16) {
        resolve_size(terminal::size(), self.fallback)
    }
}

/// A viewport that never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedViewport(pub u16, pub u16);

impl Viewport for FixedViewport {
    fn size(&self) -> (u16, u16) {
        (self.0, self.1)
    }
}

fn resolve_size(queried: io::Result<(u16, u16)>, fallback: (u16, u16)) -> (u16, u16) {
    match queried {
        Ok((w, h)) if w > 0 && h > 0 => (w, h),
        Ok(_) => fallback,
        Err(e) => {
            log::debug!("viewport query failed: {e}");
            fallback
        }
    }
}

fn ansi(command: impl Command) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = command.write_ansi(&mut out);
    out
}

/// Wrap `text` in a foreground colour and a reset, or return it untouched.
pub fn compose_frame(text: &str, color: Option<Color>) -> String {
    match color {
        Some(c) => format!("{}{text}{}", ansi(SetForegroundColor(c)), ansi(ResetColor)),
        None => text.to_string(),
    }
}

/// Clear the screen and home the cursor.
pub fn clear_and_home() -> String {
    ansi(Clear(ClearType::All)) + &ansi(cursor::MoveTo(0, 0))
}

/// Raw mode disables the implicit carriage return on line feed.
pub fn fix_newlines(s: &str) -> String {
    s.replace('\n', "\r\n")
}
