// Click synthesis: synthetic press/release at the cursor and hit classification.
// Classification results arrive asynchronously and may be stale by then.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::host::ContentSurface;
use crate::mode::InputMode;
use crate::types::{Point, PointerPhase, Timestamp};

/// Correlates a hit-test request with its asynchronous result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HitTestId(u64);

impl HitTestId {
    pub fn new(id: u64) -> Self {
        HitTestId(id)
    }
}

/// Opaque classification of the element under a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitKind {
    TextEditable,
    SelectableList,
    Other,
}

#[derive(Deserialize)]
struct HitReport {
    kind: HitKind,
}

impl HitKind {
    /// Parses a surface script result such as `{"kind":"text_editable"}`.
    /// Script bridges often hand back the JSON re-encoded as a string literal; both forms are accepted.
    pub fn from_script_result(raw: &str) -> Result<HitKind, EngineError> {
        let raw = raw.trim();
        if raw.starts_with('"') {
            let inner: String = serde_json::from_str(raw)?;
            return Self::from_script_result(&inner);
        }
        serde_json::from_str::<HitReport>(raw)
            .map(|report| report.kind)
            .map_err(|_| EngineError::HitClassification(raw.to_string()))
    }
}

/// Whether a select press is a click or the second half of a double press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectPress {
    Single,
    Double,
}

/// A click waiting for its classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingClick {
    pub id: HitTestId,
    pub point: Point,
    pub issued_at: Timestamp,
}

/// What the state machine should do with a classification.
/// The two paths are independent so a stale result can still launch text entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClickFollowUp {
    pub enter_text_entry: bool,
    pub reclaim_focus: bool,
}

impl ClickFollowUp {
    pub fn plan(kind: HitKind, mode: InputMode) -> Self {
        match kind {
            HitKind::TextEditable => ClickFollowUp {
                enter_text_entry: true,
                reclaim_focus: false,
            },
            // A native dropdown may own input now.
            HitKind::SelectableList => ClickFollowUp::default(),
            HitKind::Other => ClickFollowUp {
                enter_text_entry: false,
                reclaim_focus: mode == InputMode::CursorActive,
            },
        }
    }
}

/// Most hit tests kept waiting for a result; older ones are dropped first.
const MAX_PENDING: usize = 16;

/// Drives the synthetic click protocol against the content surface.
#[derive(Debug)]
pub struct ClickSynthesizer {
    double_press_ms: u64,
    result_timeout_ms: u64,
    next_id: u64,
    last_select_press: Option<Timestamp>,
    pressed_at: Option<Point>,
    pending: Vec<PendingClick>,
}

impl ClickSynthesizer {
    pub fn new(double_press_ms: u64, result_timeout_ms: u64) -> Self {
        ClickSynthesizer {
            double_press_ms,
            result_timeout_ms,
            next_id: 1,
            last_select_press: None,
            pressed_at: None,
            pending: Vec::new(),
        }
    }

    /// Records a select key-down and classifies it against the previous one.
    pub fn register_select(&mut self, now: Timestamp) -> SelectPress {
        let double = matches!(
            self.last_select_press,
            Some(previous) if now.millis_since(previous) < self.double_press_ms
        );
        if double {
            self.last_select_press = None;
            SelectPress::Double
        } else {
            self.last_select_press = Some(now);
            SelectPress::Single
        }
    }

    /// Dispatches the synthetic press.
    pub fn press<S: ContentSurface + ?Sized>(&mut self, surface: &mut S, point: Point) {
        surface.dispatch_pointer(point, PointerPhase::Down);
        self.pressed_at = Some(point);
    }

    /// Follows a held press to a new position (press-and-drag).
    pub fn drag<S: ContentSurface + ?Sized>(&mut self, surface: &mut S, point: Point) {
        if self.pressed_at.is_some() {
            surface.dispatch_pointer(point, PointerPhase::Move);
            self.pressed_at = Some(point);
        }
    }

    /// Dispatches the release and requests classification of what was hit.
    /// Returns `None` when no press is outstanding.
    pub fn release<S: ContentSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        point: Point,
        now: Timestamp,
    ) -> Option<HitTestId> {
        self.pressed_at.take()?;
        Some(self.finish(surface, point, now))
    }

    /// Press, release and classification request in one go.
    pub fn simulate_select<S: ContentSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        point: Point,
        now: Timestamp,
    ) -> HitTestId {
        surface.dispatch_pointer(point, PointerPhase::Down);
        self.pressed_at = None;
        self.finish(surface, point, now)
    }

    fn finish<S: ContentSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        point: Point,
        now: Timestamp,
    ) -> HitTestId {
        surface.dispatch_pointer(point, PointerPhase::Up);
        self.expire(now);
        let id = HitTestId(self.next_id);
        self.next_id += 1;
        self.pending.push(PendingClick {
            id,
            point,
            issued_at: now,
        });
        surface.request_hit_test(id, point);
        id
    }

    /// Lifts an outstanding press where it was last moved to, without a hit test.
    pub fn abandon_press<S: ContentSurface + ?Sized>(&mut self, surface: &mut S) {
        if let Some(point) = self.pressed_at.take() {
            surface.dispatch_pointer(point, PointerPhase::Up);
        }
    }

    /// Forgets hit tests whose result never came back, then makes room for one more.
    fn expire(&mut self, now: Timestamp) {
        let timeout = self.result_timeout_ms;
        self.pending
            .retain(|p| now.millis_since(p.issued_at) < timeout);
        if self.pending.len() >= MAX_PENDING {
            let excess = self.pending.len() + 1 - MAX_PENDING;
            log::debug!("dropping {excess} unanswered hit tests");
            self.pending.drain(..excess);
        }
    }

    /// Matches a classification to its request. Unknown ids are stale and yield `None`.
    pub fn resolve(&mut self, id: HitTestId) -> Option<PendingClick> {
        let index = self.pending.iter().position(|p| p.id == id)?;
        Some(self.pending.remove(index))
    }

    /// Forgets everything, e.g. on destroy.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.pressed_at = None;
        self.last_select_press = None;
    }
}
