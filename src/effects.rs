// Visual feedback queue: click ripples, cursor visibility, mode changes.
// The host drains it each frame and renders; the engine never draws.

use serde::{Deserialize, Serialize};

use crate::mode::InputMode;
use crate::types::*;

/// Single visual effect instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub timestamp: Timestamp,
    pub duration_us: u64,
    pub effect_type: EffectType,
    pub position: Point,
}

/// Type of visual effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EffectType {
    /// Acknowledges a synthetic click.
    Ripple,
    CursorShown,
    CursorHidden,
    ModeChanged { from: InputMode, to: InputMode },
}

/// Collects effects between host drains.
#[derive(Debug)]
pub struct EffectQueue {
    settings: EffectSettings,
    pending: Vec<Effect>,
}

impl EffectQueue {
    pub fn new(settings: EffectSettings) -> Self {
        EffectQueue {
            settings,
            pending: Vec::new(),
        }
    }

    pub fn ripple(&mut self, position: Point, now: Timestamp) {
        if self.settings.ripple {
            self.pending.push(Effect {
                timestamp: now,
                duration_us: self.settings.ripple_duration_ms * 1000,
                effect_type: EffectType::Ripple,
                position,
            });
        }
    }

    pub fn cursor_visibility(&mut self, visible: bool, position: Point, now: Timestamp) {
        if self.settings.cursor_visibility {
            self.pending.push(Effect {
                timestamp: now,
                duration_us: 0,
                effect_type: if visible {
                    EffectType::CursorShown
                } else {
                    EffectType::CursorHidden
                },
                position,
            });
        }
    }

    pub fn mode_changed(&mut self, from: InputMode, to: InputMode, position: Point, now: Timestamp) {
        self.pending.push(Effect {
            timestamp: now,
            duration_us: 0,
            effect_type: EffectType::ModeChanged { from, to },
            position,
        });
    }

    pub fn drain(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.pending)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
