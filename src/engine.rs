// Input mode state machine: the coordinator that decides who acts on remote input.
// All timers, signals and async results enter here and are checked against the current mode.

use crate::click::{ClickFollowUp, ClickSynthesizer, HitKind, HitTestId, SelectPress};
use crate::cursor::{CursorMotion, CursorState};
use crate::effects::{Effect, EffectQueue};
use crate::error::EngineError;
use crate::focus::{self, FocusSignal, InputOwner};
use crate::host::Host;
use crate::keyboard::{CloseWatch, KeyboardDetector, LayoutSample};
use crate::mode::{InputMode, ModeMachine, Transition};
use crate::scheduler::{Scheduler, TimerKind};
use crate::types::*;

/// Pointer/focus coordination engine bound to one content surface.
pub struct PointerEngine<H: Host> {
    config: EngineConfig,
    host: H,
    modes: ModeMachine,
    cursor: CursorMotion,
    clicks: ClickSynthesizer,
    keyboard: KeyboardDetector,
    effects: EffectQueue,
    scheduler: Scheduler,
    pointer_enabled: bool,
    cursor_visible: bool,
    error_active: bool,
    back_consumed: bool,
    last_tick: Timestamp,
    destroyed: bool,
}

impl<H: Host> PointerEngine<H> {
    pub fn new(config: EngineConfig, host: H, now: Timestamp) -> Result<Self, EngineError> {
        config.validate()?;
        let initial = if config.pointer_mode {
            InputMode::CursorActive
        } else {
            InputMode::Idle
        };
        let mut engine = PointerEngine {
            modes: ModeMachine::new(initial, config.timing.debounce_ms),
            cursor: CursorMotion::new(config.motion.clone(), config.viewport, now),
            clicks: ClickSynthesizer::new(
                config.timing.double_press_ms,
                config.timing.hit_test_timeout_ms,
            ),
            keyboard: KeyboardDetector::new(config.keyboard.clone()),
            effects: EffectQueue::new(config.effects.clone()),
            scheduler: Scheduler::new(),
            pointer_enabled: config.pointer_mode,
            cursor_visible: false,
            error_active: false,
            back_consumed: false,
            last_tick: now,
            destroyed: false,
            config,
            host,
        };
        if engine.pointer_enabled {
            engine.host.suppress_focus_navigation();
            engine.host.claim_input(InputOwner::Engine);
            engine.set_cursor_visible(true, now);
        }
        engine.scheduler.schedule(
            TimerKind::IdleCheck,
            now.after_millis(engine.config.timing.idle_check_interval_ms),
        );
        Ok(engine)
    }

    pub fn mode(&self) -> InputMode {
        self.modes.current()
    }

    pub fn cursor(&self) -> &CursorState {
        self.cursor.state()
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible && self.mode() == InputMode::CursorActive
    }

    pub fn is_pointer_mode_enabled(&self) -> bool {
        self.pointer_enabled
    }

    pub fn is_keyboard_visible(&self) -> bool {
        self.keyboard.is_visible()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Earliest pending timer deadline; the host should call `advance` then.
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.scheduler.next_deadline()
    }

    pub fn drain_effects(&mut self) -> Vec<Effect> {
        self.effects.drain()
    }

    // ---------------------------------------------------------------------
    // Key input
    // ---------------------------------------------------------------------

    /// Consumes a key event. Returns false when the platform should handle it.
    pub fn handle_key(&mut self, key: RemoteKey, phase: KeyPhase, now: Timestamp) -> bool {
        if self.destroyed {
            log::debug!("key {:?} after destroy", key);
            return false;
        }
        if self.error_active {
            return false;
        }
        match self.mode() {
            InputMode::TextEntryStarting | InputMode::TextEntryEnding => true,
            InputMode::TextEntryActive => match (key, phase) {
                (RemoteKey::Back, KeyPhase::Down) => {
                    log::debug!("back during text entry: requesting blur");
                    self.host.blur_active_element();
                    self.back_consumed = true;
                    true
                }
                (RemoteKey::Back, KeyPhase::Up) => std::mem::take(&mut self.back_consumed),
                _ => false,
            },
            InputMode::Idle | InputMode::CursorActive => match key {
                RemoteKey::Direction(direction) => self.handle_direction(direction, phase, now),
                RemoteKey::Diagonal(first, second) => {
                    let first = self.handle_direction(first, phase, now);
                    let second = self.handle_direction(second, phase, now);
                    first || second
                }
                RemoteKey::Select => self.handle_select(phase, now),
                RemoteKey::Back => self.handle_back(phase),
                RemoteKey::Other(_) => false,
            },
        }
    }

    fn handle_direction(&mut self, direction: Direction, phase: KeyPhase, now: Timestamp) -> bool {
        if phase == KeyPhase::Up {
            let was_held = self.cursor.release(direction, now);
            return self.pointer_enabled || was_held;
        }
        if !self.pointer_enabled {
            return false;
        }
        self.cursor.touch(now);
        if self.mode() == InputMode::Idle && !self.transition(InputMode::CursorActive, now) {
            return true;
        }
        self.set_cursor_visible(true, now);
        if self.cursor.press(direction, now) {
            self.start_motion(now);
        }
        true
    }

    fn handle_select(&mut self, phase: KeyPhase, now: Timestamp) -> bool {
        if phase == KeyPhase::Up {
            self.cursor.touch(now);
            if self.cursor.state().select_held {
                self.cursor.set_select_held(false);
                let point = self.cursor.position();
                if let Some(id) = self.clicks.release(&mut self.host, point, now) {
                    log::debug!("synthetic click {:?} at ({:.0}, {:.0})", id, point.x, point.y);
                }
            }
            return true;
        }

        if self.cursor.state().select_held {
            // key repeat
            return true;
        }
        self.cursor.touch(now);

        if !self.pointer_enabled {
            self.enable_pointer_mode(now);
            return true;
        }
        if self.mode() == InputMode::Idle {
            self.transition(InputMode::CursorActive, now);
            return true;
        }
        if !self.cursor_visible {
            // the first press only brings the cursor back
            self.set_cursor_visible(true, now);
            return true;
        }

        match self.clicks.register_select(now) {
            SelectPress::Double => {
                self.pointer_enabled = false;
                if self.transition(InputMode::Idle, now) {
                    log::info!("double select: pointer mode disabled");
                } else {
                    self.pointer_enabled = true;
                    log::debug!("double select dropped: Idle was entered too recently");
                }
            }
            SelectPress::Single => {
                let point = self.cursor.position();
                self.clicks.press(&mut self.host, point);
                self.cursor.set_select_held(true);
                self.effects.ripple(point, now);
            }
        }
        true
    }

    fn handle_back(&mut self, phase: KeyPhase) -> bool {
        match phase {
            KeyPhase::Down => {
                self.back_consumed = self.pointer_enabled && self.host.can_go_back();
                if self.back_consumed {
                    self.host.go_back();
                }
                self.back_consumed
            }
            KeyPhase::Up => std::mem::take(&mut self.back_consumed),
        }
    }

    fn enable_pointer_mode(&mut self, now: Timestamp) {
        log::info!("enabling pointer mode");
        self.pointer_enabled = true;
        self.cursor.recenter();
        self.host.suppress_focus_navigation();
        if !self.transition(InputMode::CursorActive, now) {
            self.host.claim_input(InputOwner::Engine);
            self.set_cursor_visible(true, now);
        }
    }

    /// Runs the click protocol at `point` without key input. Only valid in `CursorActive`.
    pub fn simulate_select(&mut self, point: Point, now: Timestamp) -> Option<HitTestId> {
        if self.destroyed || self.mode() != InputMode::CursorActive {
            return None;
        }
        let point = self.cursor.viewport().clamp(point);
        self.cursor.touch(now);
        self.effects.ripple(point, now);
        Some(self.clicks.simulate_select(&mut self.host, point, now))
    }

    // ---------------------------------------------------------------------
    // Asynchronous signals
    // ---------------------------------------------------------------------

    /// Focus notification from the content surface.
    pub fn on_focus_signal(&mut self, signal: FocusSignal, now: Timestamp) {
        if self.destroyed {
            return;
        }
        match (signal, self.mode()) {
            (FocusSignal::TextFieldFocused, InputMode::TextEntryStarting) => {
                self.transition(InputMode::TextEntryActive, now);
            }
            (FocusSignal::TextFieldBlurred, InputMode::TextEntryActive) => {
                self.transition(InputMode::TextEntryEnding, now);
            }
            (signal, mode) => log::debug!("ignoring {:?} in {:?}", signal, mode),
        }
    }

    /// Debounced keyboard visibility, from the detector or from a host that tracks it itself.
    pub fn on_keyboard_visibility_changed(&mut self, visible: bool, now: Timestamp) {
        if self.destroyed {
            return;
        }
        self.keyboard.force(visible);
        self.apply_keyboard_visibility(visible, now);
    }

    /// Raw overlay inset height from the platform.
    pub fn on_keyboard_inset(&mut self, height: u32, now: Timestamp) {
        if self.destroyed {
            return;
        }
        let deadline = self.keyboard.observe_inset(height, now);
        self.arm_keyboard_confirm(deadline);
    }

    /// Window layout change, for the fallback detector.
    pub fn on_layout_changed(&mut self, sample: LayoutSample, now: Timestamp) {
        if self.destroyed {
            return;
        }
        let deadline = self.keyboard.observe_layout(sample, now);
        self.arm_keyboard_confirm(deadline);
    }

    fn arm_keyboard_confirm(&mut self, deadline: Option<Timestamp>) {
        match deadline.or_else(|| self.keyboard.confirm_deadline()) {
            Some(at) => self.scheduler.schedule(TimerKind::KeyboardConfirm, at),
            None => self.scheduler.cancel(TimerKind::KeyboardConfirm),
        }
    }

    fn apply_keyboard_visibility(&mut self, visible: bool, now: Timestamp) {
        let mode = self.mode();
        match (visible, mode) {
            (false, InputMode::TextEntryEnding) => {
                // if debounced, the close poll keeps retrying
                self.finish_text_entry(now);
            }
            (false, InputMode::TextEntryActive) => {
                log::debug!("keyboard dismissed without blur: ending text entry");
                self.host.blur_active_element();
                self.transition(InputMode::TextEntryEnding, now);
            }
            (true, InputMode::TextEntryStarting) => {
                self.transition(InputMode::TextEntryActive, now);
            }
            (true, InputMode::Idle | InputMode::CursorActive) if self.pointer_enabled => {
                log::info!("keyboard overlay appeared without a click: forcing text entry");
                self.transition(InputMode::TextEntryActive, now);
            }
            (visible, mode) => log::debug!("ignoring keyboard visible={} in {:?}", visible, mode),
        }
    }

    /// Classification of a synthetic click, delivered asynchronously.
    pub fn on_hit_test_result(&mut self, id: HitTestId, kind: HitKind, now: Timestamp) {
        if self.destroyed {
            return;
        }
        let Some(click) = self.clicks.resolve(id) else {
            log::debug!("dropping result for unknown hit test {:?}", id);
            return;
        };
        let mode = self.mode();
        let follow_up = ClickFollowUp::plan(kind, mode);

        if follow_up.enter_text_entry {
            match mode {
                InputMode::CursorActive | InputMode::Idle if self.pointer_enabled => {
                    self.host.focus_element_at(click.point);
                    self.transition(InputMode::TextEntryStarting, now);
                }
                InputMode::Idle => log::debug!("text field hit after pointer mode was disabled"),
                _ => log::debug!("text field hit while already in {:?}", mode),
            }
        }
        if follow_up.reclaim_focus {
            self.host.claim_input(InputOwner::Engine);
        } else if kind == HitKind::SelectableList {
            log::debug!("dropdown hit: leaving input with the surface");
        }
    }

    /// Like `on_hit_test_result`, from the raw script result string.
    pub fn on_hit_test_script_result(
        &mut self,
        id: HitTestId,
        raw: &str,
        now: Timestamp,
    ) -> Result<(), EngineError> {
        let kind = HitKind::from_script_result(raw)?;
        self.on_hit_test_result(id, kind, now);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Timers
    // ---------------------------------------------------------------------

    /// Runs every timer due at `now`.
    pub fn advance(&mut self, now: Timestamp) {
        if self.destroyed {
            return;
        }
        while let Some((kind, deadline)) = self.scheduler.pop_due(now) {
            self.fire(kind, deadline, now);
        }
    }

    fn fire(&mut self, kind: TimerKind, deadline: Timestamp, now: Timestamp) {
        match kind {
            TimerKind::CursorTick => self.tick_cursor(now),
            TimerKind::CursorHide => {
                if self.mode() == InputMode::CursorActive && !self.cursor.is_moving() {
                    self.set_cursor_visible(false, now);
                }
            }
            TimerKind::IdleCheck => {
                self.idle_check(now);
                // stay on the deadline grid; a late advance runs one check, not a backlog
                let interval = self.config.timing.idle_check_interval_ms;
                let missed = now.millis_since(deadline) / interval;
                self.scheduler.schedule(
                    TimerKind::IdleCheck,
                    deadline.after_millis((missed + 1) * interval),
                );
            }
            TimerKind::KeyboardConfirm => match self.keyboard.confirm(now) {
                Some(visible) => self.apply_keyboard_visibility(visible, now),
                None => self.arm_keyboard_confirm(None),
            },
            TimerKind::KeyboardShow => {
                if self.mode() == InputMode::TextEntryStarting {
                    self.host.show_keyboard();
                }
            }
            TimerKind::KeyboardClosePoll => self.poll_keyboard_close(now),
            TimerKind::TextEntryTimeout => {
                if self.mode() == InputMode::TextEntryStarting {
                    log::warn!("text entry never started; returning to the cursor");
                    self.transition(self.resting_mode(), now);
                }
            }
        }
    }

    fn start_motion(&mut self, now: Timestamp) {
        self.scheduler.cancel(TimerKind::CursorHide);
        if !self.scheduler.is_scheduled(TimerKind::CursorTick) {
            self.last_tick = now;
            self.scheduler.schedule(
                TimerKind::CursorTick,
                now.after_millis(self.config.motion.frame_interval_ms),
            );
        }
    }

    fn stop_motion(&mut self) {
        self.cursor.halt();
        self.scheduler.cancel(TimerKind::CursorTick);
        self.scheduler.cancel(TimerKind::CursorHide);
        if self.cursor.state().select_held {
            self.cursor.set_select_held(false);
            self.clicks.abandon_press(&mut self.host);
        }
    }

    fn tick_cursor(&mut self, now: Timestamp) {
        if self.mode() != InputMode::CursorActive {
            return;
        }
        let elapsed = now.elapsed_ms_f32(self.last_tick);
        self.last_tick = now;
        let outcome = self.cursor.tick(elapsed);

        if outcome.moved {
            self.set_cursor_visible(true, now);
            if self.cursor.state().select_held {
                self.clicks.drag(&mut self.host, self.cursor.position());
            }
        }
        if let Some((dx, dy)) = outcome.scroll {
            self.host.scroll_by(dx, dy);
        }
        if outcome.moved || outcome.scroll.is_some() || !self.cursor.state().held.is_empty() {
            self.cursor.touch(now);
        }

        if outcome.active {
            self.scheduler.schedule(
                TimerKind::CursorTick,
                now.after_millis(self.config.motion.frame_interval_ms),
            );
        } else {
            self.scheduler.schedule(
                TimerKind::CursorHide,
                now.after_millis(self.config.timing.cursor_disappear_ms),
            );
        }
    }

    fn idle_check(&mut self, now: Timestamp) {
        let mode = self.mode();
        let owner = self.host.input_owner();
        if focus::should_reclaim(mode, owner, self.error_active) {
            log::info!("reclaiming input from {:?}", owner);
            self.host.claim_input(InputOwner::Engine);
        }
        let idle_for = now.millis_since(self.cursor.state().last_activity);
        if mode == InputMode::CursorActive
            && !self.cursor.is_moving()
            && idle_for >= self.config.timing.idle_timeout_ms
        {
            log::debug!("no activity for {} ms", idle_for);
            self.transition(InputMode::Idle, now);
        }
    }

    fn poll_keyboard_close(&mut self, now: Timestamp) {
        if self.mode() != InputMode::TextEntryEnding {
            self.keyboard.end_close_watch();
            return;
        }
        let sample = self.host.layout_sample();
        let settled = match self.keyboard.poll_close(sample, now) {
            CloseWatch::Pending => false,
            CloseWatch::Closed | CloseWatch::TimedOut => {
                let settled = self.finish_text_entry(now);
                // an overlay that is in fact still up gets confirmed again
                self.arm_keyboard_confirm(None);
                settled
            }
        };
        if !settled {
            self.scheduler.schedule(
                TimerKind::KeyboardClosePoll,
                now.after_millis(self.config.keyboard.close_poll_interval_ms),
            );
        }
    }

    fn resting_mode(&self) -> InputMode {
        if self.pointer_enabled {
            InputMode::CursorActive
        } else {
            InputMode::Idle
        }
    }

    fn finish_text_entry(&mut self, now: Timestamp) -> bool {
        self.transition(self.resting_mode(), now)
    }

    // ---------------------------------------------------------------------
    // Transitions
    // ---------------------------------------------------------------------

    fn transition(&mut self, target: InputMode, now: Timestamp) -> bool {
        match self.modes.request(target, now) {
            Transition::Applied { from, to } => {
                self.effects.mode_changed(from, to, self.cursor.position(), now);
                self.on_enter(from, to, now);
                true
            }
            Transition::Unchanged | Transition::Debounced => false,
        }
    }

    fn on_enter(&mut self, from: InputMode, to: InputMode, now: Timestamp) {
        if from == InputMode::TextEntryStarting {
            self.scheduler.cancel(TimerKind::KeyboardShow);
            self.scheduler.cancel(TimerKind::TextEntryTimeout);
        }
        if from == InputMode::TextEntryEnding {
            self.scheduler.cancel(TimerKind::KeyboardClosePoll);
            self.keyboard.end_close_watch();
        }

        match to {
            InputMode::Idle => {
                self.stop_motion();
                self.set_cursor_visible(false, now);
            }
            InputMode::CursorActive => {
                self.cursor.touch(now);
                self.set_cursor_visible(true, now);
            }
            InputMode::TextEntryStarting => {
                self.stop_motion();
                self.set_cursor_visible(false, now);
                let timing = &self.config.timing;
                self.scheduler.schedule(
                    TimerKind::KeyboardShow,
                    now.after_millis(timing.keyboard_show_delay_ms),
                );
                self.scheduler.schedule(
                    TimerKind::TextEntryTimeout,
                    now.after_millis(timing.text_entry_start_timeout_ms),
                );
            }
            InputMode::TextEntryActive => {
                self.stop_motion();
                self.set_cursor_visible(false, now);
                if from == InputMode::TextEntryStarting {
                    self.host.show_keyboard();
                }
            }
            InputMode::TextEntryEnding => {
                self.host.hide_keyboard();
                self.keyboard.begin_close_watch(now);
                self.scheduler.schedule(
                    TimerKind::KeyboardClosePoll,
                    now.after_millis(self.config.keyboard.close_poll_interval_ms),
                );
            }
        }

        self.host
            .claim_input(focus::expected_owner(to, self.pointer_enabled));
    }

    fn set_cursor_visible(&mut self, visible: bool, now: Timestamp) {
        if self.cursor_visible != visible {
            self.cursor_visible = visible;
            self.effects
                .cursor_visibility(visible, self.cursor.position(), now);
        }
    }

    // ---------------------------------------------------------------------
    // Host shell surface
    // ---------------------------------------------------------------------

    pub fn load_url(&mut self, url: &str) {
        if !self.destroyed {
            self.host.load_url(url);
        }
    }

    pub fn url(&self) -> Option<String> {
        self.host.current_url()
    }

    /// History navigation is unavailable while text entry owns the back key.
    pub fn can_go_back(&self) -> bool {
        !self.destroyed && !self.mode().is_text_entry() && self.host.can_go_back()
    }

    /// Goes back in history, or dismisses the keyboard during text entry.
    pub fn go_back(&mut self) {
        if self.destroyed {
            return;
        }
        if self.mode().is_text_entry() {
            self.host.hide_keyboard();
        } else if self.host.can_go_back() {
            self.host.go_back();
        }
    }

    /// Resets the idle timer for activity the shell observed.
    pub fn update_activity(&mut self, now: Timestamp) {
        if self.destroyed {
            return;
        }
        self.cursor.touch(now);
        if self.mode() == InputMode::CursorActive {
            self.set_cursor_visible(true, now);
        }
    }

    /// Adopts a new viewport size and re-centers the cursor.
    pub fn resize(&mut self, viewport: ViewportSize, now: Timestamp) -> Result<(), EngineError> {
        if viewport.width == 0 || viewport.height == 0 {
            return Err(EngineError::InvalidInput(format!(
                "empty viewport {}x{}",
                viewport.width, viewport.height
            )));
        }
        if self.destroyed {
            return Err(EngineError::Destroyed);
        }
        self.config.viewport = viewport;
        self.cursor.resize(viewport);
        self.cursor.touch(now);
        Ok(())
    }

    pub fn page_started(&mut self, url: &str) {
        log::debug!("page started: {url}");
        self.error_active = false;
    }

    pub fn page_finished(&mut self, url: &str, now: Timestamp) {
        if self.destroyed {
            return;
        }
        log::debug!("page finished: {url}");
        self.error_active = false;
        if self.pointer_enabled && !self.mode().is_text_entry() {
            self.host.suppress_focus_navigation();
            self.host.claim_input(InputOwner::Engine);
            self.update_activity(now);
        }
    }

    pub fn page_error(&mut self, description: &str) {
        if self.destroyed {
            return;
        }
        log::warn!("page error: {description}");
        self.error_active = true;
        self.stop_motion();
    }

    pub fn pause(&mut self, now: Timestamp) {
        if self.destroyed {
            return;
        }
        self.scheduler.pause(now);
        self.host.pause();
    }

    pub fn resume(&mut self, now: Timestamp) {
        if self.destroyed {
            return;
        }
        self.scheduler.resume(now);
        self.host.resume();
        self.last_tick = now;
        self.cursor.touch(now);
        if !self.scheduler.is_scheduled(TimerKind::IdleCheck) {
            self.scheduler.schedule(
                TimerKind::IdleCheck,
                now.after_millis(self.config.timing.idle_check_interval_ms),
            );
        }
    }

    /// Cancels every timer and releases the surface. Later calls are no-ops.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.scheduler.shut_down();
        self.clicks.abandon_press(&mut self.host);
        self.clicks.clear();
        self.cursor.halt();
        self.keyboard.end_close_watch();
        self.effects.clear();
        self.host.release();
        self.destroyed = true;
        log::info!("pointer engine destroyed");
    }
}

impl<H: Host> Drop for PointerEngine<H> {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectType;
    use crate::host::{HostCommand, RecordingHost};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn ms(v: u64) -> Timestamp {
        Timestamp::from_millis(v)
    }

    fn config() -> EngineConfig {
        EngineConfig {
            motion: MotionSettings {
                max_speed: Some(30.0),
                edge_band: Some(100.0),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn engine() -> PointerEngine<RecordingHost> {
        PointerEngine::new(config(), RecordingHost::new(), ms(0)).unwrap()
    }

    fn press(e: &mut PointerEngine<RecordingHost>, key: RemoteKey, at: u64) -> bool {
        e.handle_key(key, KeyPhase::Down, ms(at))
    }

    fn release(e: &mut PointerEngine<RecordingHost>, key: RemoteKey, at: u64) -> bool {
        e.handle_key(key, KeyPhase::Up, ms(at))
    }

    fn run_frames(e: &mut PointerEngine<RecordingHost>, from: u64, to: u64) {
        let mut t = from;
        while t <= to {
            e.advance(ms(t));
            t += 16;
        }
    }

    fn last_hit_test(e: &PointerEngine<RecordingHost>) -> HitTestId {
        e.host()
            .commands()
            .iter()
            .rev()
            .find_map(|c| match c {
                HostCommand::HitTest { request, .. } => Some(*request),
                _ => None,
            })
            .expect("a hit test was requested")
    }

    fn count(e: &PointerEngine<RecordingHost>, pred: impl Fn(&HostCommand) -> bool) -> usize {
        e.host().commands().iter().filter(|c| pred(c)).count()
    }

    fn entries_into(effects: &[Effect], target: InputMode) -> usize {
        effects
            .iter()
            .filter(|fx| matches!(fx.effect_type, EffectType::ModeChanged { to, .. } if to == target))
            .count()
    }

    /// Click a text field at `at` and confirm focus; ends in TextEntryActive.
    fn enter_text_entry(e: &mut PointerEngine<RecordingHost>, at: u64) {
        assert!(press(e, RemoteKey::Select, at));
        assert!(release(e, RemoteKey::Select, at + 40));
        let id = last_hit_test(e);
        e.on_hit_test_result(id, HitKind::TextEditable, ms(at + 60));
        assert_eq!(e.mode(), InputMode::TextEntryStarting);
        e.on_focus_signal(FocusSignal::TextFieldFocused, ms(at + 80));
        assert_eq!(e.mode(), InputMode::TextEntryActive);
    }

    #[test]
    fn initial_mode_follows_pointer_setting() {
        let e = engine();
        assert_eq!(e.mode(), InputMode::CursorActive);
        assert!(e.cursor_visible());
        assert_eq!(e.cursor().position, Point::new(960.0, 540.0));

        let disabled = EngineConfig {
            pointer_mode: false,
            ..config()
        };
        let e = PointerEngine::new(disabled, RecordingHost::new(), ms(0)).unwrap();
        assert_eq!(e.mode(), InputMode::Idle);
        assert!(!e.is_pointer_mode_enabled());
    }

    #[test]
    fn directional_keys_move_then_stop_ticking() {
        let mut e = engine();
        assert!(press(&mut e, RemoteKey::Direction(Direction::Right), 0));
        run_frames(&mut e, 16, 160);
        assert!(e.cursor().position.x > 960.0);
        assert!(release(&mut e, RemoteKey::Direction(Direction::Right), 170));
        run_frames(&mut e, 176, 600);
        assert!(e.cursor().velocity.is_zero());
        assert_eq!(e.scheduler.deadline(TimerKind::CursorTick), None);
        assert!(e.scheduler.is_scheduled(TimerKind::CursorHide));
    }

    #[test]
    fn diagonal_key_drives_both_axes() {
        let mut e = engine();
        let up_left = RemoteKey::Diagonal(Direction::Up, Direction::Left);
        assert!(press(&mut e, up_left, 0));
        run_frames(&mut e, 16, 160);
        let p = e.cursor().position;
        assert!(p.x < 960.0 && p.y < 540.0);
        assert!(((960.0 - p.x) - (540.0 - p.y)).abs() < 0.01);
        assert!(release(&mut e, up_left, 170));
        assert!(e.cursor().held.is_empty());
    }

    #[test]
    fn single_select_clicks_with_ripple() {
        let mut e = engine();
        e.host_mut().take_commands();
        e.drain_effects();
        assert!(press(&mut e, RemoteKey::Select, 1_000));
        assert!(release(&mut e, RemoteKey::Select, 1_040));

        let commands = e.host().commands().to_vec();
        assert!(matches!(
            commands[0],
            HostCommand::DispatchPointer { phase: PointerPhase::Down, x, y } if x == 960.0 && y == 540.0
        ));
        assert!(matches!(
            commands[1],
            HostCommand::DispatchPointer { phase: PointerPhase::Up, .. }
        ));
        assert!(matches!(commands[2], HostCommand::HitTest { .. }));
        assert!(e
            .drain_effects()
            .iter()
            .any(|fx| fx.effect_type == EffectType::Ripple));
    }

    #[test]
    fn double_select_disables_pointer_without_second_click() {
        let mut e = engine();
        press(&mut e, RemoteKey::Select, 1_000);
        release(&mut e, RemoteKey::Select, 1_040);
        assert!(press(&mut e, RemoteKey::Select, 1_200));
        assert!(release(&mut e, RemoteKey::Select, 1_240));

        let downs = count(&e, |c| {
            matches!(c, HostCommand::DispatchPointer { phase: PointerPhase::Down, .. })
        });
        assert_eq!(downs, 1);
        assert_eq!(e.mode(), InputMode::Idle);
        assert!(!e.is_pointer_mode_enabled());
        assert_eq!(e.host().owner, InputOwner::Surface);
        assert!(!press(&mut e, RemoteKey::Direction(Direction::Up), 1_300));
        e.advance(ms(1_400));
        assert_eq!(count(&e, |c| matches!(c, HostCommand::ScrollBy { .. })), 0);
    }

    #[test]
    fn double_select_right_after_idle_is_dropped() {
        let mut e = engine();
        e.advance(ms(3_000));
        assert_eq!(e.mode(), InputMode::Idle);
        press(&mut e, RemoteKey::Direction(Direction::Down), 3_010);
        release(&mut e, RemoteKey::Direction(Direction::Down), 3_020);
        press(&mut e, RemoteKey::Select, 3_040);
        release(&mut e, RemoteKey::Select, 3_060);

        assert!(press(&mut e, RemoteKey::Select, 3_100));
        assert_eq!(e.mode(), InputMode::CursorActive);
        assert!(e.is_pointer_mode_enabled());
        assert_eq!(e.host().owner, InputOwner::Engine);
        assert!(press(&mut e, RemoteKey::Direction(Direction::Up), 3_120));
        let downs = count(&e, |c| {
            matches!(c, HostCommand::DispatchPointer { phase: PointerPhase::Down, .. })
        });
        assert_eq!(downs, 1);
    }

    #[test]
    fn select_reenables_pointer_mode_centered() {
        let mut e = engine();
        press(&mut e, RemoteKey::Direction(Direction::Left), 0);
        run_frames(&mut e, 16, 200);
        release(&mut e, RemoteKey::Direction(Direction::Left), 210);
        press(&mut e, RemoteKey::Select, 1_000);
        release(&mut e, RemoteKey::Select, 1_040);
        press(&mut e, RemoteKey::Select, 1_100);
        release(&mut e, RemoteKey::Select, 1_140);
        assert!(!e.is_pointer_mode_enabled());

        e.host_mut().take_commands();
        assert!(press(&mut e, RemoteKey::Select, 2_000));
        assert!(e.is_pointer_mode_enabled());
        assert_eq!(e.mode(), InputMode::CursorActive);
        assert_eq!(e.cursor().position, Point::new(960.0, 540.0));
        assert!(e
            .host()
            .commands()
            .contains(&HostCommand::SuppressFocusNavigation));
        assert_eq!(e.host().owner, InputOwner::Engine);
    }

    #[test]
    fn text_field_hit_reaches_active_through_starting() {
        let mut e = engine();
        e.drain_effects();
        enter_text_entry(&mut e, 1_000);

        let transitions: Vec<(InputMode, InputMode)> = e
            .drain_effects()
            .into_iter()
            .filter_map(|fx| match fx.effect_type {
                EffectType::ModeChanged { from, to } => Some((from, to)),
                _ => None,
            })
            .collect();
        assert_eq!(
            transitions,
            vec![
                (InputMode::CursorActive, InputMode::TextEntryStarting),
                (InputMode::TextEntryStarting, InputMode::TextEntryActive),
            ]
        );
        assert_eq!(count(&e, |c| matches!(c, HostCommand::FocusElementAt { .. })), 1);
        assert_eq!(count(&e, |c| *c == HostCommand::ShowKeyboard), 1);
        assert_eq!(e.host().owner, InputOwner::Surface);
    }

    #[test]
    fn text_entry_forwards_keys_and_back_blurs() {
        let mut e = engine();
        enter_text_entry(&mut e, 1_000);
        assert!(!press(&mut e, RemoteKey::Direction(Direction::Left), 1_200));
        assert!(!press(&mut e, RemoteKey::Select, 1_250));
        assert!(!press(&mut e, RemoteKey::Other(29), 1_260));
        assert!(press(&mut e, RemoteKey::Back, 1_300));
        assert!(release(&mut e, RemoteKey::Back, 1_340));
        assert_eq!(count(&e, |c| *c == HostCommand::BlurActiveElement), 1);
        assert_eq!(e.mode(), InputMode::TextEntryActive);
    }

    #[test]
    fn transitional_modes_swallow_keys() {
        let mut e = engine();
        press(&mut e, RemoteKey::Select, 1_000);
        release(&mut e, RemoteKey::Select, 1_040);
        let id = last_hit_test(&e);
        e.on_hit_test_result(id, HitKind::TextEditable, ms(1_060));
        assert!(press(&mut e, RemoteKey::Direction(Direction::Up), 1_070));
        assert!(press(&mut e, RemoteKey::Back, 1_080));
        assert_eq!(count(&e, |c| *c == HostCommand::GoBack), 0);
        assert!(e.cursor().held.is_empty());
    }

    #[test]
    fn blur_then_keyboard_closed_returns_once() {
        let mut e = engine();
        enter_text_entry(&mut e, 1_000);
        e.on_keyboard_visibility_changed(true, ms(1_100));
        e.drain_effects();

        e.on_focus_signal(FocusSignal::TextFieldBlurred, ms(2_000));
        assert_eq!(e.mode(), InputMode::TextEntryEnding);
        assert_eq!(count(&e, |c| *c == HostCommand::HideKeyboard), 1);

        e.on_keyboard_visibility_changed(false, ms(2_030));
        assert_eq!(e.mode(), InputMode::CursorActive);
        run_frames(&mut e, 2_040, 4_000);
        e.on_keyboard_visibility_changed(false, ms(4_010));

        assert_eq!(entries_into(&e.drain_effects(), InputMode::CursorActive), 1);
        assert_eq!(e.host().owner, InputOwner::Engine);
    }

    #[test]
    fn close_poll_rechecks_layout_directly() {
        let mut e = engine();
        enter_text_entry(&mut e, 1_000);
        let open = LayoutSample {
            root_height: 1080,
            visible_bottom: 700,
        };
        e.host_mut().layout = Some(open);
        e.on_layout_changed(open, ms(1_100));
        e.advance(ms(1_200));
        assert!(e.is_keyboard_visible());

        e.on_focus_signal(FocusSignal::TextFieldBlurred, ms(2_000));
        e.advance(ms(2_050));
        assert_eq!(e.mode(), InputMode::TextEntryEnding);
        e.host_mut().layout = Some(LayoutSample {
            root_height: 1080,
            visible_bottom: 1080,
        });
        e.advance(ms(2_100));
        assert_eq!(e.mode(), InputMode::CursorActive);
    }

    #[test]
    fn close_poll_gives_up_at_ceiling() {
        let mut e = engine();
        enter_text_entry(&mut e, 1_000);
        e.on_keyboard_visibility_changed(true, ms(1_100));
        e.on_focus_signal(FocusSignal::TextFieldBlurred, ms(2_000));

        e.advance(ms(2_950));
        assert_eq!(e.mode(), InputMode::TextEntryEnding);
        e.advance(ms(3_000));
        assert_eq!(e.mode(), InputMode::CursorActive);
        assert!(!e.is_keyboard_visible());
    }

    #[test]
    fn overlay_ignored_while_pointer_disabled() {
        let mut e = PointerEngine::new(
            EngineConfig {
                pointer_mode: false,
                ..config()
            },
            RecordingHost::new(),
            ms(0),
        )
        .unwrap();
        // autofocus opens the overlay but the engine stays out of the way
        e.on_keyboard_visibility_changed(true, ms(100));
        assert_eq!(e.mode(), InputMode::Idle);
        assert!(!press(&mut e, RemoteKey::Direction(Direction::Left), 200));
        assert!(press(&mut e, RemoteKey::Select, 300));
        assert_eq!(e.mode(), InputMode::CursorActive);
    }

    #[test]
    fn keyboard_without_click_forces_text_entry() {
        let mut e = engine();
        e.host_mut().take_commands();
        e.on_keyboard_inset(320, ms(100));
        e.advance(ms(150));
        assert_eq!(e.mode(), InputMode::CursorActive);
        e.advance(ms(180));
        assert_eq!(e.mode(), InputMode::TextEntryActive);
        assert_eq!(count(&e, |c| *c == HostCommand::ShowKeyboard), 0);
        assert_eq!(e.host().owner, InputOwner::Surface);

        // overlay dismissed from the platform side
        e.on_keyboard_inset(0, ms(1_000));
        e.advance(ms(1_080));
        assert_eq!(e.mode(), InputMode::TextEntryEnding);
        e.advance(ms(1_130));
        assert_eq!(e.mode(), InputMode::CursorActive);
    }

    #[test]
    fn overlay_left_up_after_close_timeout_returns_to_text_entry() {
        let mut e = engine();
        enter_text_entry(&mut e, 1_000);
        e.on_keyboard_inset(320, ms(1_100));
        e.advance(ms(1_200));
        assert!(e.is_keyboard_visible());

        e.on_focus_signal(FocusSignal::TextFieldBlurred, ms(2_000));
        e.advance(ms(3_000));
        assert_eq!(e.mode(), InputMode::CursorActive);
        assert!(!e.is_keyboard_visible());

        e.advance(ms(3_080));
        assert!(e.is_keyboard_visible());
        assert_eq!(e.mode(), InputMode::TextEntryActive);
        assert!(!press(&mut e, RemoteKey::Direction(Direction::Down), 3_100));
    }

    #[test]
    fn held_press_is_lifted_when_text_entry_takes_over() {
        let mut e = engine();
        e.host_mut().take_commands();
        press(&mut e, RemoteKey::Select, 100);
        e.on_keyboard_visibility_changed(true, ms(120));
        assert_eq!(e.mode(), InputMode::TextEntryActive);
        assert!(!release(&mut e, RemoteKey::Select, 150));

        let phases: Vec<PointerPhase> = e
            .host()
            .commands()
            .iter()
            .filter_map(|c| match c {
                HostCommand::DispatchPointer { phase, .. } => Some(*phase),
                _ => None,
            })
            .collect();
        assert_eq!(phases, vec![PointerPhase::Down, PointerPhase::Up]);
        assert_eq!(count(&e, |c| matches!(c, HostCommand::HitTest { .. })), 0);
    }

    #[test]
    fn transient_inset_does_not_force_text_entry() {
        let mut e = engine();
        e.on_keyboard_inset(320, ms(100));
        e.on_keyboard_inset(0, ms(130));
        e.advance(ms(500));
        assert_eq!(e.mode(), InputMode::CursorActive);
    }

    #[test]
    fn stale_other_result_does_not_reclaim() {
        let mut e = engine();
        press(&mut e, RemoteKey::Select, 1_000);
        release(&mut e, RemoteKey::Select, 1_040);
        let id = last_hit_test(&e);
        e.on_keyboard_visibility_changed(true, ms(1_050));
        assert_eq!(e.mode(), InputMode::TextEntryActive);

        e.host_mut().take_commands();
        e.on_hit_test_result(id, HitKind::Other, ms(1_100));
        assert!(e.host().commands().is_empty());
        assert_eq!(e.mode(), InputMode::TextEntryActive);
    }

    #[test]
    fn stale_text_result_is_still_honored() {
        let mut e = engine();
        press(&mut e, RemoteKey::Select, 1_000);
        release(&mut e, RemoteKey::Select, 1_040);
        let id = last_hit_test(&e);
        e.advance(ms(4_500));
        assert_eq!(e.mode(), InputMode::Idle);

        e.on_hit_test_result(id, HitKind::TextEditable, ms(4_600));
        assert_eq!(e.mode(), InputMode::TextEntryStarting);
        assert_eq!(count(&e, |c| matches!(c, HostCommand::FocusElementAt { .. })), 1);
    }

    #[test]
    fn other_hit_reclaims_and_dropdown_does_not() {
        let mut e = engine();
        e.simulate_select(Point::new(10.0, 10.0), ms(100));
        let id = last_hit_test(&e);
        e.host_mut().owner = InputOwner::Surface;
        e.on_hit_test_result(id, HitKind::SelectableList, ms(150));
        assert_eq!(e.host().owner, InputOwner::Surface);

        e.simulate_select(Point::new(10.0, 10.0), ms(400));
        let id = last_hit_test(&e);
        e.on_hit_test_result(id, HitKind::Other, ms(450));
        assert_eq!(e.host().owner, InputOwner::Engine);
        assert_eq!(e.mode(), InputMode::CursorActive);
    }

    #[test]
    fn unknown_or_repeated_results_are_ignored() {
        let mut e = engine();
        let id = e.simulate_select(Point::new(1.0, 1.0), ms(10)).unwrap();
        e.on_hit_test_result(id, HitKind::Other, ms(20));
        e.on_hit_test_result(id, HitKind::TextEditable, ms(30));
        e.on_hit_test_result(HitTestId::new(999), HitKind::TextEditable, ms(40));
        assert_eq!(e.mode(), InputMode::CursorActive);
        assert!(e
            .on_hit_test_script_result(HitTestId::new(1_000), "garbage", ms(50))
            .is_err());
    }

    #[test]
    fn start_timeout_returns_to_cursor() {
        let mut e = engine();
        press(&mut e, RemoteKey::Select, 1_000);
        release(&mut e, RemoteKey::Select, 1_040);
        let id = last_hit_test(&e);
        e.on_hit_test_result(id, HitKind::TextEditable, ms(1_060));
        e.advance(ms(1_180));
        assert_eq!(count(&e, |c| *c == HostCommand::ShowKeyboard), 1);
        e.advance(ms(2_059));
        assert_eq!(e.mode(), InputMode::TextEntryStarting);
        e.advance(ms(2_060));
        assert_eq!(e.mode(), InputMode::CursorActive);
    }

    #[test]
    fn idle_after_timeout_exactly_once() {
        let mut e = engine();
        e.drain_effects();
        e.advance(ms(2_999));
        assert_eq!(e.mode(), InputMode::CursorActive);
        assert_eq!(e.scheduler.deadline(TimerKind::IdleCheck), Some(ms(3_000)));
        e.advance(ms(3_000));
        assert_eq!(e.mode(), InputMode::Idle);
        assert!(!e.cursor_visible());
        e.advance(ms(10_000));
        assert_eq!(entries_into(&e.drain_effects(), InputMode::Idle), 1);
        assert_eq!(e.cursor().position, Point::new(960.0, 540.0));

        assert!(press(&mut e, RemoteKey::Direction(Direction::Down), 10_100));
        assert_eq!(e.mode(), InputMode::CursorActive);
        assert!(e.cursor_visible());
    }

    #[test]
    fn idle_tick_reclaims_drifted_input() {
        let mut e = engine();
        e.host_mut().owner = InputOwner::Surface;
        e.advance(ms(500));
        assert_eq!(e.host().owner, InputOwner::Engine);

        e.page_error("net::ERR_NAME_NOT_RESOLVED");
        e.host_mut().owner = InputOwner::Elsewhere;
        e.advance(ms(1_000));
        assert_eq!(e.host().owner, InputOwner::Elsewhere);
        assert!(!press(&mut e, RemoteKey::Direction(Direction::Up), 1_100));

        e.page_started("https://example.org/");
        assert!(press(&mut e, RemoteKey::Direction(Direction::Up), 1_200));
    }

    #[test]
    fn page_finished_restores_cursor_focus() {
        let mut e = engine();
        e.host_mut().take_commands();
        e.host_mut().owner = InputOwner::Surface;
        e.page_finished("https://example.org/", ms(2_900));
        assert_eq!(e.host().owner, InputOwner::Engine);
        assert!(e
            .host()
            .commands()
            .contains(&HostCommand::SuppressFocusNavigation));
        e.advance(ms(3_500));
        assert_eq!(e.mode(), InputMode::CursorActive);
    }

    #[test]
    fn edge_band_scrolls_content() {
        let mut e = engine();
        press(&mut e, RemoteKey::Direction(Direction::Left), 0);
        run_frames(&mut e, 16, 2_000);

        let scrolls: Vec<(i32, i32)> = e
            .host()
            .commands()
            .iter()
            .filter_map(|c| match c {
                HostCommand::ScrollBy { dx, dy } => Some((*dx, *dy)),
                _ => None,
            })
            .collect();
        assert!(!scrolls.is_empty());
        assert!(scrolls.iter().all(|(dx, dy)| *dx < 0 && *dy == 0));
        assert_eq!(e.cursor().position.x, 0.0);
    }

    #[test]
    fn press_and_drag_dispatches_moves() {
        let mut e = engine();
        press(&mut e, RemoteKey::Select, 100);
        press(&mut e, RemoteKey::Direction(Direction::Right), 110);
        run_frames(&mut e, 126, 300);
        release(&mut e, RemoteKey::Direction(Direction::Right), 310);
        release(&mut e, RemoteKey::Select, 320);

        let moves = count(&e, |c| {
            matches!(c, HostCommand::DispatchPointer { phase: PointerPhase::Move, .. })
        });
        assert!(moves > 0);
        let up_x = e.host().commands().iter().find_map(|c| match c {
            HostCommand::DispatchPointer { phase: PointerPhase::Up, x, .. } => Some(*x),
            _ => None,
        });
        assert!(up_x.unwrap() > 960.0);
    }

    #[test]
    fn back_navigates_only_with_history() {
        let mut e = engine();
        assert!(!press(&mut e, RemoteKey::Back, 10));
        assert!(!release(&mut e, RemoteKey::Back, 20));

        e.host_mut().history = true;
        assert!(e.can_go_back());
        assert!(press(&mut e, RemoteKey::Back, 30));
        assert!(release(&mut e, RemoteKey::Back, 40));
        assert_eq!(count(&e, |c| *c == HostCommand::GoBack), 1);

        enter_text_entry(&mut e, 1_000);
        assert!(!e.can_go_back());
        e.go_back();
        assert_eq!(count(&e, |c| *c == HostCommand::GoBack), 1);
        assert_eq!(count(&e, |c| *c == HostCommand::HideKeyboard), 1);
    }

    #[test]
    fn pause_freezes_timers() {
        let mut e = engine();
        e.pause(ms(100));
        e.advance(ms(10_000));
        assert_eq!(e.mode(), InputMode::CursorActive);
        assert_eq!(e.next_deadline(), None);
        e.resume(ms(10_000));
        e.advance(ms(12_000));
        assert_eq!(e.mode(), InputMode::CursorActive);
        e.advance(ms(14_000));
        assert_eq!(e.mode(), InputMode::Idle);
        assert!(e.host().commands().contains(&HostCommand::PauseSurface));
        assert!(e.host().commands().contains(&HostCommand::ResumeSurface));
    }

    #[test]
    fn resize_recenters_cursor() {
        let mut e = engine();
        press(&mut e, RemoteKey::Direction(Direction::Up), 0);
        run_frames(&mut e, 16, 100);
        e.resize(ViewportSize::new(1280, 720), ms(110)).unwrap();
        assert_eq!(e.cursor().position, Point::new(640.0, 360.0));
        assert!(e.resize(ViewportSize::new(0, 720), ms(120)).is_err());
    }

    #[test]
    fn destroy_cancels_everything() {
        let mut e = engine();
        press(&mut e, RemoteKey::Direction(Direction::Right), 0);
        press(&mut e, RemoteKey::Select, 5);
        e.destroy();
        assert!(e.is_destroyed());
        assert_eq!(e.next_deadline(), None);
        assert_eq!(count(&e, |c| *c == HostCommand::ReleaseSurface), 1);
        assert_eq!(
            count(&e, |c| {
                matches!(c, HostCommand::DispatchPointer { phase: PointerPhase::Up, .. })
            }),
            1
        );
        assert_eq!(count(&e, |c| matches!(c, HostCommand::HitTest { .. })), 0);

        let before = e.host().commands().len();
        e.advance(ms(60_000));
        assert!(!press(&mut e, RemoteKey::Direction(Direction::Left), 60_010));
        e.on_keyboard_visibility_changed(true, ms(60_020));
        e.on_focus_signal(FocusSignal::TextFieldFocused, ms(60_030));
        e.destroy();
        assert_eq!(e.host().commands().len(), before);
        assert_eq!(e.mode(), InputMode::CursorActive);
    }

    #[derive(Debug, Clone)]
    struct KeyStep {
        direction: Direction,
        down: bool,
        gap_ms: u64,
    }

    fn key_step() -> impl Strategy<Value = KeyStep> {
        (
            prop_oneof![
                Just(Direction::Up),
                Just(Direction::Down),
                Just(Direction::Left),
                Just(Direction::Right),
            ],
            any::<bool>(),
            0u64..60,
        )
            .prop_map(|(direction, down, gap_ms)| KeyStep {
                direction,
                down,
                gap_ms,
            })
    }

    proptest! {
        /// The held set always equals the set of directional keys currently down.
        #[test]
        fn held_set_tracks_keys_down(steps in prop::collection::vec(key_step(), 1..120)) {
            let mut e = engine();
            let mut down: HashSet<Direction> = HashSet::new();
            let mut now = 0u64;
            for step in steps {
                now += step.gap_ms;
                e.advance(ms(now));
                let phase = if step.down { KeyPhase::Down } else { KeyPhase::Up };
                e.handle_key(RemoteKey::Direction(step.direction), phase, ms(now));
                if step.down {
                    down.insert(step.direction);
                } else {
                    down.remove(&step.direction);
                }
                let held: HashSet<Direction> = e.cursor().held.iter().collect();
                prop_assert_eq!(&held, &down);
                let p = e.cursor().position;
                prop_assert!(p.x >= 0.0 && p.x <= 1920.0 && p.y >= 0.0 && p.y <= 1080.0);
            }
        }
    }
}
