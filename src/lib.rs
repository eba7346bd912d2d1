// pointer_engine: remote-control pointer emulation over a hosted content surface.
// All input policy lives here; the host only forwards events and replays commands.

mod click;
mod cursor;
mod effects;
mod engine;
mod error;
mod focus;
mod host;
mod keyboard;
mod mode;
mod scheduler;
mod types;

use serde::Serialize;
use wasm_bindgen::prelude::*;

pub use click::{ClickFollowUp, ClickSynthesizer, HitKind, HitTestId, PendingClick, SelectPress};
pub use cursor::{CursorMotion, CursorState, MotionParams, TickOutcome};
pub use effects::{Effect, EffectQueue, EffectType};
pub use engine::PointerEngine;
pub use error::EngineError;
pub use focus::{FocusSignal, InputOwner};
pub use host::{ContentSurface, Host, HostCommand, PlatformServices, RecordingHost};
pub use keyboard::{CloseWatch, KeyboardDetector, LayoutSample};
pub use mode::{InputMode, ModeMachine, Transition};
pub use scheduler::{Scheduler, TimerKind};
pub use types::*;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Result of one facade call, replayed by the JS host.
#[derive(Debug, Serialize)]
struct Batch {
    handled: bool,
    mode: InputMode,
    commands: Vec<HostCommand>,
    effects: Vec<Effect>,
    /// When to call `advance` next, on the host clock.
    next_deadline_ms: Option<f64>,
}

/// Engine interface exposed to JavaScript.
/// Batch interface to minimize JS↔WASM crossings: each call returns the commands to perform.
#[wasm_bindgen]
pub struct Engine {
    inner: PointerEngine<RecordingHost>,
}

// Plain Rust core of the facade; the exported methods only convert errors.
impl Engine {
    fn create(config_json: &str, now_ms: f64) -> Result<Engine, EngineError> {
        let config = EngineConfig::from_json(config_json)?;
        let inner = PointerEngine::new(config, RecordingHost::new(), Timestamp::from_millis_f64(now_ms))?;
        Ok(Engine { inner })
    }

    fn live(&self) -> Result<(), EngineError> {
        if self.inner.is_destroyed() {
            Err(EngineError::Destroyed)
        } else {
            Ok(())
        }
    }

    fn batch(&mut self, handled: bool) -> Result<String, EngineError> {
        let batch = Batch {
            handled,
            mode: self.inner.mode(),
            commands: self.inner.host_mut().take_commands(),
            effects: self.inner.drain_effects(),
            next_deadline_ms: self.inner.next_deadline().map(|t| t.as_millis()),
        };
        Ok(serde_json::to_string(&batch)?)
    }

    fn key(&mut self, key_json: &str, down: bool, now_ms: f64) -> Result<String, EngineError> {
        self.live()?;
        let key: RemoteKey = serde_json::from_str(key_json)?;
        let phase = if down { KeyPhase::Down } else { KeyPhase::Up };
        let handled = self
            .inner
            .handle_key(key, phase, Timestamp::from_millis_f64(now_ms));
        self.batch(handled)
    }

    fn hit_result(&mut self, request: u64, result: &str, now_ms: f64) -> Result<String, EngineError> {
        self.live()?;
        self.inner.on_hit_test_script_result(
            HitTestId::new(request),
            result,
            Timestamp::from_millis_f64(now_ms),
        )?;
        self.batch(true)
    }

    fn with_clock(
        &mut self,
        now_ms: f64,
        f: impl FnOnce(&mut PointerEngine<RecordingHost>, Timestamp),
    ) -> Result<String, EngineError> {
        self.live()?;
        f(&mut self.inner, Timestamp::from_millis_f64(now_ms));
        self.batch(true)
    }
}

fn to_js(err: EngineError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, now_ms: f64) -> Result<Engine, JsValue> {
        Engine::create(config_json, now_ms).map_err(to_js)
    }

    /// `key_json` is e.g. `{"key":"Direction","value":"Left"}` or `{"key":"Select"}`.
    pub fn key_down(&mut self, key_json: &str, now_ms: f64) -> Result<String, JsValue> {
        self.key(key_json, true, now_ms).map_err(to_js)
    }

    pub fn key_up(&mut self, key_json: &str, now_ms: f64) -> Result<String, JsValue> {
        self.key(key_json, false, now_ms).map_err(to_js)
    }

    /// Runs due timers. Call at `next_deadline_ms` from the previous batch.
    pub fn advance(&mut self, now_ms: f64) -> Result<String, JsValue> {
        self.with_clock(now_ms, |engine, now| engine.advance(now))
            .map_err(to_js)
    }

    pub fn hit_test_result(&mut self, request: u64, result: &str, now_ms: f64) -> Result<String, JsValue> {
        self.hit_result(request, result, now_ms).map_err(to_js)
    }

    pub fn text_field_focused(&mut self, now_ms: f64) -> Result<String, JsValue> {
        self.with_clock(now_ms, |engine, now| {
            engine.on_focus_signal(FocusSignal::TextFieldFocused, now)
        })
        .map_err(to_js)
    }

    pub fn text_field_blurred(&mut self, now_ms: f64) -> Result<String, JsValue> {
        self.with_clock(now_ms, |engine, now| {
            engine.on_focus_signal(FocusSignal::TextFieldBlurred, now)
        })
        .map_err(to_js)
    }

    pub fn keyboard_inset(&mut self, height: u32, now_ms: f64) -> Result<String, JsValue> {
        self.with_clock(now_ms, |engine, now| engine.on_keyboard_inset(height, now))
            .map_err(to_js)
    }

    pub fn layout_changed(&mut self, root_height: u32, visible_bottom: u32, now_ms: f64) -> Result<String, JsValue> {
        let sample = LayoutSample {
            root_height,
            visible_bottom,
        };
        self.inner.host_mut().layout = Some(sample);
        self.with_clock(now_ms, |engine, now| engine.on_layout_changed(sample, now))
            .map_err(to_js)
    }

    /// For hosts that track the overlay themselves instead of reporting insets.
    pub fn keyboard_visibility_changed(&mut self, visible: bool, now_ms: f64) -> Result<String, JsValue> {
        self.with_clock(now_ms, |engine, now| {
            engine.on_keyboard_visibility_changed(visible, now)
        })
        .map_err(to_js)
    }

    pub fn simulate_select(&mut self, x: f32, y: f32, now_ms: f64) -> Result<String, JsValue> {
        self.with_clock(now_ms, |engine, now| {
            engine.simulate_select(Point::new(x, y), now);
        })
        .map_err(to_js)
    }

    pub fn resize(&mut self, width: u32, height: u32, now_ms: f64) -> Result<String, JsValue> {
        self.live().map_err(to_js)?;
        self.inner
            .resize(ViewportSize::new(width, height), Timestamp::from_millis_f64(now_ms))
            .map_err(to_js)?;
        self.batch(true).map_err(to_js)
    }

    pub fn page_started(&mut self, url: &str, now_ms: f64) -> Result<String, JsValue> {
        self.with_clock(now_ms, |engine, _| engine.page_started(url))
            .map_err(to_js)
    }

    pub fn page_finished(&mut self, url: &str, now_ms: f64) -> Result<String, JsValue> {
        self.with_clock(now_ms, |engine, now| engine.page_finished(url, now))
            .map_err(to_js)
    }

    pub fn page_error(&mut self, description: &str, now_ms: f64) -> Result<String, JsValue> {
        self.with_clock(now_ms, |engine, _| engine.page_error(description))
            .map_err(to_js)
    }

    pub fn load_url(&mut self, url: &str, now_ms: f64) -> Result<String, JsValue> {
        self.with_clock(now_ms, |engine, _| engine.load_url(url))
            .map_err(to_js)
    }

    /// History back, or keyboard dismissal during text entry.
    pub fn go_back(&mut self, now_ms: f64) -> Result<String, JsValue> {
        self.with_clock(now_ms, |engine, _| engine.go_back())
            .map_err(to_js)
    }

    pub fn pause(&mut self, now_ms: f64) -> Result<String, JsValue> {
        self.with_clock(now_ms, |engine, now| engine.pause(now))
            .map_err(to_js)
    }

    pub fn resume(&mut self, now_ms: f64) -> Result<String, JsValue> {
        self.with_clock(now_ms, |engine, now| engine.resume(now))
            .map_err(to_js)
    }

    pub fn update_activity(&mut self, now_ms: f64) -> Result<String, JsValue> {
        self.with_clock(now_ms, |engine, now| engine.update_activity(now))
            .map_err(to_js)
    }

    /// Returns the final batch, including the surface release.
    pub fn destroy(&mut self) -> Result<String, JsValue> {
        self.inner.destroy();
        self.batch(true).map_err(to_js)
    }

    // Host state the engine queries synchronously.

    pub fn set_can_go_back(&mut self, can_go_back: bool) {
        self.inner.host_mut().history = can_go_back;
    }

    pub fn set_url(&mut self, url: &str) {
        self.inner.host_mut().url = Some(url.to_string());
    }

    /// `owner` is `"Engine"`, `"Surface"` or `"Elsewhere"`.
    pub fn set_input_owner(&mut self, owner: &str) -> Result<(), JsValue> {
        let owner: InputOwner = serde_json::from_value(serde_json::Value::String(owner.to_string()))
            .map_err(|e| to_js(e.into()))?;
        self.inner.host_mut().owner = owner;
        Ok(())
    }

    pub fn url(&self) -> Option<String> {
        self.inner.url()
    }

    pub fn keyboard_visible(&self) -> bool {
        self.inner.is_keyboard_visible()
    }

    pub fn can_go_back(&self) -> bool {
        self.inner.can_go_back()
    }

    pub fn is_pointer_mode_enabled(&self) -> bool {
        self.inner.is_pointer_mode_enabled()
    }

    pub fn mode(&self) -> String {
        format!("{:?}", self.inner.mode())
    }

    pub fn cursor_x(&self) -> f32 {
        self.inner.cursor().position.x
    }

    pub fn cursor_y(&self) -> f32 {
        self.inner.cursor().position.y
    }

    pub fn cursor_visible(&self) -> bool {
        self.inner.cursor_visible()
    }
}
