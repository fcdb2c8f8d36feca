use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TimerError>;

#[derive(Debug, Error)]
pub enum TimerError {
    #[error("terminal unavailable: {0}")]
    TerminalUnavailable(#[source] io::Error),

    #[error("failed to restore terminal: {0}")]
    TerminalRestoreFailed(#[source] io::Error),

    #[error("input read failed: {0}")]
    InputRead(#[source] io::Error),

    #[error("invalid duration {input:?}")]
    InvalidDuration { input: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl TimerError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        1
    }

    #[must_use]
    pub fn invalid_duration(input: impl Into<String>) -> Self {
        Self::InvalidDuration {
            input: input.into(),
        }
    }

    /// True for read failures the keyboard reader should retry.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::InputRead(e) if e.kind() == io::ErrorKind::Interrupted)
    }
}
