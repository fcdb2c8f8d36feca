//! Background keyboard reader.
//!
//! Two threads cooperate: a pump that performs blocking one-byte reads, and
//! a decoder that owns the [`KeyDecoder`] and forwards resolved keys into a
//! bounded queue. Keys that do not fit are dropped rather than blocking.

use std::io::{self, Read};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{after, bounded, never, select, unbounded, Receiver, Sender, TrySendError};

use crate::error::TimerError;
use crate::input::{Decoded, KeyDecoder};

pub struct KeyboardReader {
    keys: Receiver<u8>,
    handle: JoinHandle<()>,
}

impl KeyboardReader {
    /// Start reading `source` until `done` is disconnected or input ends.
    pub fn spawn<R>(
        source: R,
        capacity: usize,
        escape_timeout: Duration,
        done: Receiver<()>,
    ) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let (byte_tx, byte_rx) = unbounded();
        let (key_tx, key_rx) = bounded(capacity);

        // The pump may stay blocked in `read` after the session ends; it is
        // never joined and exits on its next byte or with the process.
        thread::Builder::new()
            .name("tock-stdin".to_string())
            .spawn(move || pump(source, byte_tx))?;

        let handle = thread::Builder::new()
            .name("tock-keys".to_string())
            .spawn(move || decode_loop(byte_rx, key_tx, escape_timeout, done))?;

        Ok(Self {
            keys: key_rx,
            handle,
        })
    }

    pub fn keys(&self) -> Receiver<u8> {
        self.keys.clone()
    }

    /// Wait for the decoder thread to observe cancellation.
    pub fn join(self) {
        if self.handle.join().is_err() {
            log::warn!("keyboard reader panicked");
        }
    }
}

fn pump<R: Read>(mut source: R, bytes: Sender<u8>) {
    let mut buf = [0u8; 1];
    loop {
        match source.read(&mut buf) {
            Ok(0) => {
                log::debug!("input closed");
                return;
            }
            Ok(_) => {
                if bytes.send(buf[0]).is_err() {
                    return;
                }
            }
            Err(e) => {
                let err = TimerError::InputRead(e);
                if err.is_interrupted() {
                    continue;
                }
                log::debug!("{err}; keyboard input disabled");
                return;
            }
        }
    }
}

fn decode_loop(bytes: Receiver<u8>, keys: Sender<u8>, escape_timeout: Duration, done: Receiver<()>) {
    let mut decoder = KeyDecoder::new();
    let mut bytes = bytes;
    let mut input_open = true;

    loop {
        // single-shot debounce, re-armed only while a lone ESC is pending;
        // any arriving byte ends this iteration and so cancels it
        let deadline = if decoder.has_pending_escape() {
            after(escape_timeout)
        } else {
            never()
        };

        let mut resolved = None;
        select! {
            recv(done) -> _ => return,
            recv(bytes) -> msg => match msg {
                Ok(b) => match decoder.feed(b) {
                    Decoded::Key(k) => resolved = Some(k),
                    Decoded::Discarded => log::trace!("discarded escape sequence"),
                    Decoded::Incomplete => {}
                },
                Err(_) => input_open = false,
            },
            recv(deadline) -> _ => resolved = decoder.flush_pending(),
        }

        if let Some(key) = resolved {
            match keys.try_send(key) {
                Ok(()) => {}
                Err(TrySendError::Full(k)) => log::trace!("key queue full, dropping {k:#04x}"),
                Err(TrySendError::Disconnected(_)) => return,
            }
        }

        if !input_open {
            if !decoder.has_pending_escape() {
                return;
            }
            bytes = never();
        }
    }
}
