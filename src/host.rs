//! The narrow interface between the trial engine and whatever presents it.
//!
//! The engine never draws or reads devices itself. It asks the host to show
//! text, to open or close the recall entry line, and to schedule timers. Timer
//! expiry comes back to the engine as [`Input::Timer`](crate::session::input::Input)
//! carrying the id returned by [`Host::schedule`].

use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
}

pub trait Host {
    fn display(&mut self, text: &str, align: Align);

    fn enable_text_input(&mut self);
    fn disable_text_input(&mut self);
    fn read_text_input(&self) -> String;
    fn clear_text_input(&mut self);

    /// Arms a one-shot timer.
    fn schedule(&mut self, delay: Duration) -> TimerId;
    /// Disarms a timer. Cancelling a timer that already fired is a no-op.
    fn cancel(&mut self, timer: TimerId);

    /// Monotonic time since the host started.
    fn now(&self) -> Duration;
}

/// Pending one-shot timers keyed by deadline.
#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    pending: Vec<(TimerId, Duration)>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Duration, delay: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.pending.push((id, now + delay));
        id
    }

    /// Returns whether the timer was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(pending, _)| *pending != id);
        self.pending.len() != before
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|(pending, _)| *pending == id)
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.iter().map(|(_, deadline)| *deadline).min()
    }

    /// Removes and returns the earliest timer whose deadline has passed.
    pub fn pop_due(&mut self, now: Duration) -> Option<TimerId> {
        let (idx, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, (_, deadline))| *deadline <= now)
            .min_by_key(|(_, (id, deadline))| (*deadline, *id))?;
        Some(self.pending.remove(idx).0)
    }
}
