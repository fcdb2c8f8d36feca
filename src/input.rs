//! Raw key byte decoding.
//!
//! Bytes arrive one at a time from a raw-mode terminal. Plain bytes resolve
//! immediately; anything starting with ESC is held until it is either a
//! complete escape sequence (discarded) or the caller reports that the
//! escape timeout elapsed (resolved as a lone ESC).

pub const ESC: u8 = 0x1b;
pub const CTRL_C: u8 = 0x03;
pub const SPACE: u8 = b' ';

/// Sequences longer than this are malformed and dropped.
const MAX_SEQUENCE_LEN: usize = 32;
/// `ESC [ M b x y` and `ESC M b x y`
const X10_MOUSE_LEN: usize = 6;

/// Result of feeding one byte to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// A key the timer loop should see.
    Key(u8),
    /// A complete escape sequence that carries nothing for us.
    Discarded,
    /// More bytes (or the escape timeout) are needed.
    Incomplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    Idle,
    PendingEscape,
    AccumulatingSequence,
}

#[derive(Debug, Default)]
pub struct KeyDecoder {
    seq: Vec<u8>,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self {
            seq: Vec::with_capacity(8),
        }
    }

    pub fn state(&self) -> DecoderState {
        match self.seq.as_slice() {
            [] => DecoderState::Idle,
            [ESC] => DecoderState::PendingEscape,
            _ => DecoderState::AccumulatingSequence,
        }
    }

    pub fn has_pending_escape(&self) -> bool {
        self.state() == DecoderState::PendingEscape
    }

    pub fn feed(&mut self, byte: u8) -> Decoded {
        self.seq.push(byte);
        let decoded = classify(&self.seq);
        if decoded != Decoded::Incomplete {
            self.seq.clear();
        } else if self.seq.len() >= MAX_SEQUENCE_LEN {
            log::debug!("dropping overlong escape sequence ({} bytes)", self.seq.len());
            self.seq.clear();
            return Decoded::Discarded;
        }
        decoded
    }

    /// The escape timeout fired. A lone ESC becomes a key; anything else
    /// is left alone.
    pub fn flush_pending(&mut self) -> Option<u8> {
        if self.has_pending_escape() {
            self.seq.clear();
            Some(ESC)
        } else {
            None
        }
    }
}

fn is_final_byte(b: u8) -> bool {
    (0x40..=0x7e).contains(&b)
}

fn classify(seq: &[u8]) -> Decoded {
    match seq {
        [] | [ESC] => Decoded::Incomplete,
        [b] => Decoded::Key(*b),
        // a second ESC means the first was pressed on its own
        [ESC, ESC] => Decoded::Key(ESC),
        [ESC, b'M', ..] | [ESC, b'[', b'M', ..] => {
            if seq.len() >= X10_MOUSE_LEN {
                Decoded::Discarded
            } else {
                Decoded::Incomplete
            }
        }
        [ESC, b'[' | b'O'] => Decoded::Incomplete,
        [ESC, b'O', _] => Decoded::Discarded,
        // CSI (including SGR mouse `ESC [ < b ; x ; y M|m`)
        [ESC, b'[', .., last] if is_final_byte(*last) => Decoded::Discarded,
        [ESC, b'[', ..] => Decoded::Incomplete,
        // `ESC I.. F`: intermediates (space, digits, punctuation) keep the
        // sequence open and are swallowed with it until a final byte lands
        [ESC, .., last] if is_final_byte(*last) => Decoded::Discarded,
        [ESC, ..] => Decoded::Incomplete,
        // unreachable through `feed`, which resolves every non-ESC byte alone
        [first, ..] => Decoded::Key(*first),
    }
}

/// What a resolved byte means to the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    TogglePause,
    Quit,
    Interrupt,
    Other(u8),
}

impl Key {
    pub fn from_byte(b: u8) -> Self {
        match b {
            SPACE => Key::TogglePause,
            b'q' | b'Q' | ESC => Key::Quit,
            CTRL_C => Key::Interrupt,
            other => Key::Other(other),
        }
    }
}
