use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent};

pub enum AppEvent {
    Key(KeyEvent),
    /// The wait ran out; pending timers may be due.
    Tick,
    Resize,
}

/// Reads terminal events on a background thread.
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    _tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(poll_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let _tx = tx.clone();

        thread::spawn(move || {
            loop {
                if !event::poll(poll_rate).unwrap_or(false) {
                    continue;
                }
                let forwarded = match event::read() {
                    Ok(Event::Key(key)) => tx.send(AppEvent::Key(key)),
                    Ok(Event::Resize(..)) => tx.send(AppEvent::Resize),
                    _ => Ok(()),
                };
                if forwarded.is_err() {
                    return;
                }
            }
        });

        Self { rx, _tx }
    }

    /// Waits at most `timeout` for the next terminal event.
    pub fn next(&self, timeout: Duration) -> anyhow::Result<AppEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Ok(event),
            Err(RecvTimeoutError::Timeout) => Ok(AppEvent::Tick),
            Err(RecvTimeoutError::Disconnected) => anyhow::bail!("terminal event reader stopped"),
        }
    }
}
