// Input mode: the single source of truth for who owns remote input.
// Transitions to the same target inside the debounce window are dropped.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Mutually exclusive input modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputMode {
    /// No visible cursor, no active edit.
    Idle,
    /// Cursor visible, the remote drives the pointer.
    CursorActive,
    /// A text field was hit; waiting for the keyboard overlay.
    TextEntryStarting,
    /// Keyboard overlay is up; keys go to the content surface.
    TextEntryActive,
    /// Edit ending; waiting for the overlay to go away.
    TextEntryEnding,
}

impl InputMode {
    pub fn is_text_entry(self) -> bool {
        matches!(
            self,
            InputMode::TextEntryStarting | InputMode::TextEntryActive | InputMode::TextEntryEnding
        )
    }

    fn slot(self) -> usize {
        match self {
            InputMode::Idle => 0,
            InputMode::CursorActive => 1,
            InputMode::TextEntryStarting => 2,
            InputMode::TextEntryActive => 3,
            InputMode::TextEntryEnding => 4,
        }
    }
}

/// Result of a transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied { from: InputMode, to: InputMode },
    /// Already in the requested mode.
    Unchanged,
    /// Same target was entered less than the debounce window ago.
    Debounced,
}

/// Owns the current mode and the per-target debounce bookkeeping.
#[derive(Debug, Clone)]
pub struct ModeMachine {
    current: InputMode,
    last_entered: [Option<Timestamp>; 5],
    debounce_ms: u64,
}

impl ModeMachine {
    pub fn new(initial: InputMode, debounce_ms: u64) -> Self {
        ModeMachine {
            current: initial,
            last_entered: [None; 5],
            debounce_ms,
        }
    }

    pub fn current(&self) -> InputMode {
        self.current
    }

    /// Requests a move to `target` at `now`.
    pub fn request(&mut self, target: InputMode, now: Timestamp) -> Transition {
        if target == self.current {
            return Transition::Unchanged;
        }
        if let Some(entered) = self.last_entered[target.slot()] {
            if now.millis_since(entered) < self.debounce_ms {
                log::debug!(
                    "dropping {:?} -> {:?}: entered {} ms ago",
                    self.current,
                    target,
                    now.millis_since(entered)
                );
                return Transition::Debounced;
            }
        }
        let from = self.current;
        self.current = target;
        self.last_entered[target.slot()] = Some(now);
        log::info!("input mode {:?} -> {:?}", from, target);
        Transition::Applied { from, to: target }
    }
}
