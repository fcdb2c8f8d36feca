use std::io;

use crossbeam_channel::Receiver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    /// SIGINT or SIGTERM
    Terminate,
    /// SIGWINCH
    Resize,
}

/// Forwards process signals into a channel for the timer loop.
pub struct SignalListener {
    events: Receiver<SignalEvent>,
    #[cfg(unix)]
    _guard: unix::Guard,
}

impl SignalListener {
    pub fn install() -> io::Result<Self> {
        #[cfg(unix)]
        {
            let (guard, events) = unix::Guard::new()?;
            Ok(Self {
                events,
                _guard: guard,
            })
        }
        #[cfg(not(unix))]
        {
            Ok(Self {
                events: crossbeam_channel::never(),
            })
        }
    }

    pub fn events(&self) -> Receiver<SignalEvent> {
        self.events.clone()
    }
}

#[cfg(unix)]
mod unix {
    use std::io;
    use std::thread::JoinHandle;

    use crossbeam_channel::{unbounded, Receiver};
    use signal_hook::consts::signal::{SIGINT, SIGTERM, SIGWINCH};
    use signal_hook::iterator::{Handle, Signals};

    use super::SignalEvent;

    pub(super) struct Guard {
        handle: Handle,
        thread: Option<JoinHandle<()>>,
    }

    impl Guard {
        pub(super) fn new() -> io::Result<(Self, Receiver<SignalEvent>)> {
            let mut signals = Signals::new([SIGINT, SIGTERM, SIGWINCH])?;
            let handle = signals.handle();
            let (tx, rx) = unbounded();
            let thread = std::thread::Builder::new()
                .name("tock-signals".to_string())
                .spawn(move || {
                    for signal in signals.forever() {
                        let event = match signal {
                            SIGWINCH => SignalEvent::Resize,
                            SIGINT | SIGTERM => SignalEvent::Terminate,
                            _ => continue,
                        };
                        log::debug!("signal {signal} received");
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                })?;
            Ok((
                Self {
                    handle,
                    thread: Some(thread),
                },
                rx,
            ))
        }
    }

    impl Drop for Guard {
        fn drop(&mut self) {
            self.handle.close();
            if let Some(thread) = self.thread.take() {
                let _ = thread.join();
            }
        }
    }
}
