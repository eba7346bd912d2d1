// Single owned timer table. Every deferred callback in the engine is a TimerKind here,
// so destroy and pause act on all of them at once.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Deferred work the engine can have pending. At most one deadline per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerKind {
    /// Next cursor physics frame.
    CursorTick,
    /// Hide the cursor after it stopped moving.
    CursorHide,
    /// Recurring ownership reclaim and idle check.
    IdleCheck,
    /// Keyboard evidence has held long enough to be reported.
    KeyboardConfirm,
    /// Delayed request to show the keyboard overlay.
    KeyboardShow,
    /// Direct recheck while waiting for the overlay to close.
    KeyboardClosePoll,
    /// Give up waiting for text entry to start.
    TextEntryTimeout,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    timers: Vec<(TimerKind, Timestamp)>,
    paused_at: Option<Timestamp>,
    shut_down: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms `kind` to fire at `at`, replacing any earlier deadline for it.
    pub fn schedule(&mut self, kind: TimerKind, at: Timestamp) {
        if self.shut_down {
            return;
        }
        self.cancel(kind);
        self.timers.push((kind, at));
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        self.timers.retain(|(k, _)| *k != kind);
    }

    pub fn is_scheduled(&self, kind: TimerKind) -> bool {
        self.timers.iter().any(|(k, _)| *k == kind)
    }

    pub fn deadline(&self, kind: TimerKind) -> Option<Timestamp> {
        self.timers.iter().find(|(k, _)| *k == kind).map(|(_, at)| *at)
    }

    /// Earliest pending deadline, for the host to arm a real timer.
    pub fn next_deadline(&self) -> Option<Timestamp> {
        if self.paused_at.is_some() {
            return None;
        }
        self.timers.iter().map(|(_, at)| *at).min()
    }

    /// Removes and returns the earliest timer due at `now` with its deadline.
    /// Ties fire in scheduling order.
    pub fn pop_due(&mut self, now: Timestamp) -> Option<(TimerKind, Timestamp)> {
        if self.paused_at.is_some() || self.shut_down {
            return None;
        }
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, (_, at))| *at <= now)
            .min_by_key(|(i, (_, at))| (*at, *i))
            .map(|(i, _)| i)?;
        Some(self.timers.remove(index))
    }

    /// Freezes all timers. Deadlines shift by the paused duration on resume.
    pub fn pause(&mut self, now: Timestamp) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    pub fn resume(&mut self, now: Timestamp) {
        if let Some(paused_at) = self.paused_at.take() {
            let shift = now.as_micros().saturating_sub(paused_at.as_micros());
            for (_, at) in &mut self.timers {
                *at = Timestamp::from_micros(at.as_micros().saturating_add(shift));
            }
        }
    }

    /// Cancels everything and refuses new work.
    pub fn shut_down(&mut self) {
        self.timers.clear();
        self.shut_down = true;
    }
}
