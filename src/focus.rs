// Focus signals from the content surface and input ownership.
// Ownership drifts silently (the surface can grab it); the engine only reclaims on a tick.

use serde::{Deserialize, Serialize};

use crate::mode::InputMode;

/// Focus notification raised by the hosted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusSignal {
    /// A text-editable element gained focus.
    TextFieldFocused,
    /// A text-editable element lost focus.
    TextFieldBlurred,
}

/// Who currently receives remote key input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputOwner {
    /// The pointer engine (cursor overlay) has focus.
    Engine,
    /// The content surface has focus directly.
    Surface,
    /// Something else in the shell has focus, or nothing does.
    Elsewhere,
}

/// Whether the recurring check should take input back for the engine.
pub fn should_reclaim(mode: InputMode, owner: InputOwner, error_active: bool) -> bool {
    mode == InputMode::CursorActive && owner != InputOwner::Engine && !error_active
}

/// Owner the mode expects to hold input.
pub fn expected_owner(mode: InputMode, pointer_enabled: bool) -> InputOwner {
    match mode {
        InputMode::CursorActive => InputOwner::Engine,
        InputMode::TextEntryActive | InputMode::TextEntryStarting => InputOwner::Surface,
        InputMode::TextEntryEnding => InputOwner::Surface,
        InputMode::Idle if pointer_enabled => InputOwner::Engine,
        InputMode::Idle => InputOwner::Surface,
    }
}
