// Keyboard overlay detection with hysteresis and a confirmation interval.
// Primary evidence is the platform inset; the layout delta is the fallback.

use serde::{Deserialize, Serialize};

use crate::types::{KeyboardSettings, Timestamp};

/// Window geometry sample used by the layout fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSample {
    /// Height of the root window (screen height).
    pub root_height: u32,
    /// Bottom edge of the visible display frame.
    pub visible_bottom: u32,
}

impl LayoutSample {
    /// Height hidden below the visible frame, i.e. the presumed overlay.
    pub fn obscured_height(&self) -> u32 {
        self.root_height.saturating_sub(self.visible_bottom)
    }

    fn obscured_fraction(&self) -> f32 {
        if self.root_height == 0 {
            0.0
        } else {
            self.obscured_height() as f32 / self.root_height as f32
        }
    }
}

/// Result of one close-watch poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseWatch {
    /// The overlay is confirmed gone.
    Closed,
    /// Still visible and under the ceiling; poll again.
    Pending,
    /// Ceiling reached without confirmation; treat as closed.
    TimedOut,
}

/// Debounced keyboard overlay detector.
#[derive(Debug)]
pub struct KeyboardDetector {
    settings: KeyboardSettings,
    reported: bool,
    candidate: Option<(bool, Timestamp)>,
    /// Inset evidence, once the platform has ever reported insets.
    inset: Option<bool>,
    layout: bool,
    watch_started: Option<Timestamp>,
}

impl KeyboardDetector {
    pub fn new(settings: KeyboardSettings) -> Self {
        KeyboardDetector {
            settings,
            reported: false,
            candidate: None,
            inset: None,
            layout: false,
            watch_started: None,
        }
    }

    /// Last confirmed visibility.
    pub fn is_visible(&self) -> bool {
        self.reported
    }

    /// Current raw evidence: inset when available, otherwise the layout delta.
    pub fn evidence(&self) -> bool {
        self.inset.unwrap_or(self.layout)
    }

    /// Feeds the platform overlay inset height.
    /// Returns the deadline at which to call `confirm` when a change is pending.
    pub fn observe_inset(&mut self, height: u32, now: Timestamp) -> Option<Timestamp> {
        self.inset = Some(height > 0);
        self.update_candidate(now)
    }

    /// Feeds a layout sample. The open and close thresholds differ so jitter
    /// around a single threshold cannot flip the evidence.
    pub fn observe_layout(&mut self, sample: LayoutSample, now: Timestamp) -> Option<Timestamp> {
        self.layout = self.layout_evidence(sample);
        self.update_candidate(now)
    }

    fn layout_evidence(&self, sample: LayoutSample) -> bool {
        let fraction = sample.obscured_fraction();
        if self.layout {
            fraction >= self.settings.close_fraction
        } else {
            fraction > self.settings.open_fraction
        }
    }

    fn update_candidate(&mut self, now: Timestamp) -> Option<Timestamp> {
        let evidence = self.evidence();
        if evidence == self.reported {
            if self.candidate.take().is_some() {
                log::debug!("keyboard evidence flipped back to {evidence} before confirmation");
            }
            return None;
        }
        match self.candidate {
            Some((pending, _)) if pending == evidence => None,
            _ => {
                self.candidate = Some((evidence, now));
                Some(now.after_millis(self.settings.confirm_ms))
            }
        }
    }

    /// Reports the new visibility once the candidate has held for the confirmation interval.
    pub fn confirm(&mut self, now: Timestamp) -> Option<bool> {
        let (visible, since) = self.candidate?;
        if visible != self.evidence() {
            self.candidate = None;
            return None;
        }
        if now.millis_since(since) < self.settings.confirm_ms {
            return None;
        }
        self.candidate = None;
        self.reported = visible;
        log::debug!("keyboard overlay confirmed {}", if visible { "open" } else { "closed" });
        Some(visible)
    }

    /// Pending confirmation deadline, if a change is in flight.
    pub fn confirm_deadline(&self) -> Option<Timestamp> {
        self.candidate
            .map(|(_, since)| since.after_millis(self.settings.confirm_ms))
    }

    /// Overrides the reported state, for hosts that detect the overlay themselves.
    pub fn force(&mut self, visible: bool) {
        self.reported = visible;
        self.candidate = None;
    }

    /// Starts the bounded wait for the overlay to close.
    pub fn begin_close_watch(&mut self, now: Timestamp) {
        self.watch_started = Some(now);
    }

    pub fn end_close_watch(&mut self) {
        self.watch_started = None;
    }

    /// One poll of the close watch. `sample` is a direct layout recheck.
    /// Once settled, evidence that still shows an open overlay starts a new
    /// confirmation; see `confirm_deadline`.
    pub fn poll_close(&mut self, sample: Option<LayoutSample>, now: Timestamp) -> CloseWatch {
        let Some(started) = self.watch_started else {
            return CloseWatch::Closed;
        };
        if let Some(sample) = sample {
            self.layout = self.layout_evidence(sample);
        }
        let closed_by_inset = self.inset == Some(false);
        let closed_by_layout = sample.is_some() && !self.layout;
        if !self.reported || closed_by_inset || closed_by_layout {
            self.settle_closed(now);
            return CloseWatch::Closed;
        }
        if now.millis_since(started) >= self.settings.close_ceiling_ms {
            log::warn!(
                "keyboard overlay still reported after {} ms; assuming closed",
                self.settings.close_ceiling_ms
            );
            self.settle_closed(now);
            return CloseWatch::TimedOut;
        }
        CloseWatch::Pending
    }

    fn settle_closed(&mut self, now: Timestamp) {
        self.reported = false;
        self.watch_started = None;
        self.candidate = if self.evidence() {
            log::debug!("keyboard evidence still open after close; re-confirming");
            Some((true, now))
        } else {
            None
        };
    }
}
