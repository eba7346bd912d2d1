// Strong typing over strings. Newtypes for timestamps, pixel positions, and key input.
// Engine configuration lives here too so the host can pass it as one JSON blob.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Timestamp in microseconds on the host's monotonic clock. Newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_micros(us: u64) -> Self {
        Timestamp(us)
    }

    pub fn from_millis(ms: u64) -> Self {
        Timestamp(ms.saturating_mul(1000))
    }

    /// Host clocks on the JS side are fractional milliseconds.
    pub fn from_millis_f64(ms: f64) -> Self {
        if ms.is_finite() && ms > 0.0 {
            Timestamp((ms * 1000.0).round() as u64)
        } else {
            Timestamp(0)
        }
    }

    pub fn as_micros(&self) -> u64 {
        self.0
    }

    pub fn as_millis(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Timestamp `ms` milliseconds after this one.
    pub fn after_millis(&self, ms: u64) -> Self {
        Timestamp(self.0.saturating_add(ms.saturating_mul(1000)))
    }

    /// Whole milliseconds elapsed since `earlier`. Zero if `earlier` is in the future.
    pub fn millis_since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0) / 1000
    }

    /// Fractional milliseconds elapsed since `earlier`.
    pub fn elapsed_ms_f32(&self, earlier: Timestamp) -> f32 {
        self.0.saturating_sub(earlier.0) as f32 / 1000.0
    }
}

/// Cursor position in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
}

/// Cursor velocity in pixels per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}

impl Velocity {
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Size of the visible content surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub fn new(width: u32, height: u32) -> Self {
        ViewportSize { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    /// Largest reachable x coordinate.
    pub fn max_x(&self) -> f32 {
        (self.width as f32 - 1.0).max(0.0)
    }

    /// Largest reachable y coordinate.
    pub fn max_y(&self) -> f32 {
        (self.height as f32 - 1.0).max(0.0)
    }

    pub fn clamp(&self, point: Point) -> Point {
        Point::new(point.x.clamp(0.0, self.max_x()), point.y.clamp(0.0, self.max_y()))
    }
}

impl Default for ViewportSize {
    fn default() -> Self {
        ViewportSize::new(1920, 1080)
    }
}

/// One of the four d-pad directions. Diagonals are two directions held together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Unit vector along the screen axes (y grows downwards).
    pub fn axis(self) -> (i8, i8) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    fn bit(self) -> u8 {
        match self {
            Direction::Up => 0b0001,
            Direction::Down => 0b0010,
            Direction::Left => 0b0100,
            Direction::Right => 0b1000,
        }
    }
}

/// Set of currently held directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeldDirections(u8);

impl HeldDirections {
    /// Adds `direction`; returns true if it was not held before.
    pub fn insert(&mut self, direction: Direction) -> bool {
        let was_held = self.contains(direction);
        self.0 |= direction.bit();
        !was_held
    }

    /// Removes `direction`; returns true if it was held.
    pub fn remove(&mut self, direction: Direction) -> bool {
        let was_held = self.contains(direction);
        self.0 &= !direction.bit();
        was_held
    }

    pub fn contains(&self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL.into_iter().filter(move |d| self.contains(*d))
    }

    /// Net intent per axis, each in {-1, 0, 1}. Opposite directions cancel.
    pub fn intent(&self) -> (i8, i8) {
        self.iter().fold((0, 0), |(x, y), d| {
            let (dx, dy) = d.axis();
            (x + dx, y + dy)
        })
    }
}

/// Remote-control keys the engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value")]
pub enum RemoteKey {
    Direction(Direction),
    /// Diagonal d-pad key: both directions pressed and released together.
    Diagonal(Direction, Direction),
    /// Center / enter.
    Select,
    Back,
    /// Any other key code; never consumed by pointer handling.
    Other(u32),
}

/// Key event phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyPhase {
    Down,
    Up,
}

/// Phase of a synthetic pointer (touch) event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// Engine configuration passed from the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Whether pointer mode is enabled at creation.
    #[serde(default = "default_true")]
    pub pointer_mode: bool,
    #[serde(default)]
    pub viewport: ViewportSize,
    #[serde(default)]
    pub motion: MotionSettings,
    #[serde(default)]
    pub timing: TimingSettings,
    #[serde(default)]
    pub keyboard: KeyboardSettings,
    #[serde(default)]
    pub effects: EffectSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            pointer_mode: true,
            viewport: ViewportSize::default(),
            motion: MotionSettings::default(),
            timing: TimingSettings::default(),
            keyboard: KeyboardSettings::default(),
            effects: EffectSettings::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(EngineError::InvalidConfig(format!(
                "viewport must be non-empty, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        if !(self.motion.acceleration_gain > 0.0) {
            return Err(EngineError::InvalidConfig("acceleration_gain must be positive".into()));
        }
        if self.motion.dead_zone < 0.0 || self.motion.release_friction < 0.0 {
            return Err(EngineError::InvalidConfig(
                "dead_zone and release_friction must not be negative".into(),
            ));
        }
        if matches!(self.motion.max_speed, Some(v) if !(v > 0.0)) {
            return Err(EngineError::InvalidConfig("max_speed must be positive".into()));
        }
        if self.motion.frame_interval_ms == 0
            || self.timing.idle_check_interval_ms == 0
            || self.keyboard.close_poll_interval_ms == 0
            || self.timing.hit_test_timeout_ms == 0
        {
            return Err(EngineError::InvalidConfig("timer intervals must be non-zero".into()));
        }
        let k = &self.keyboard;
        let fraction_ok = |f: f32| f > 0.0 && f < 1.0;
        if !fraction_ok(k.open_fraction) || !fraction_ok(k.close_fraction) {
            return Err(EngineError::InvalidConfig(
                "keyboard fractions must lie in (0, 1)".into(),
            ));
        }
        if k.close_fraction > k.open_fraction {
            return Err(EngineError::InvalidConfig(format!(
                "close_fraction {} exceeds open_fraction {}",
                k.close_fraction, k.open_fraction
            )));
        }
        Ok(())
    }
}

/// Cursor physics settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionSettings {
    /// Velocity gained per millisecond of holding a direction (px/tick per ms).
    #[serde(default = "default_acceleration_gain")]
    pub acceleration_gain: f32,
    /// Velocities below this magnitude snap to zero.
    #[serde(default = "default_dead_zone")]
    pub dead_zone: f32,
    /// Deceleration multiplier applied to an axis nobody is holding.
    #[serde(default = "default_release_friction")]
    pub release_friction: f32,
    /// Fixed max speed; derived from viewport width when absent.
    #[serde(default)]
    pub max_speed: Option<f32>,
    /// Fixed edge-scroll band; derived from viewport width when absent.
    #[serde(default)]
    pub edge_band: Option<f32>,
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: u64,
}

impl Default for MotionSettings {
    fn default() -> Self {
        MotionSettings {
            acceleration_gain: default_acceleration_gain(),
            dead_zone: default_dead_zone(),
            release_friction: default_release_friction(),
            max_speed: None,
            edge_band: None,
            frame_interval_ms: default_frame_interval(),
        }
    }
}

fn default_acceleration_gain() -> f32 {
    0.05
}

fn default_dead_zone() -> f32 {
    0.1
}

fn default_release_friction() -> f32 {
    8.0
}

fn default_frame_interval() -> u64 {
    16
}

/// Timeouts and windows for the mode state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingSettings {
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
    #[serde(default = "default_double_press")]
    pub double_press_ms: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_ms: u64,
    #[serde(default = "default_idle_check_interval")]
    pub idle_check_interval_ms: u64,
    #[serde(default = "default_cursor_disappear")]
    pub cursor_disappear_ms: u64,
    #[serde(default = "default_keyboard_show_delay")]
    pub keyboard_show_delay_ms: u64,
    #[serde(default = "default_text_entry_start_timeout")]
    pub text_entry_start_timeout_ms: u64,
    /// Hit tests unanswered for this long are forgotten.
    #[serde(default = "default_hit_test_timeout")]
    pub hit_test_timeout_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        TimingSettings {
            debounce_ms: default_debounce(),
            double_press_ms: default_double_press(),
            idle_timeout_ms: default_idle_timeout(),
            idle_check_interval_ms: default_idle_check_interval(),
            cursor_disappear_ms: default_cursor_disappear(),
            keyboard_show_delay_ms: default_keyboard_show_delay(),
            text_entry_start_timeout_ms: default_text_entry_start_timeout(),
            hit_test_timeout_ms: default_hit_test_timeout(),
        }
    }
}

fn default_debounce() -> u64 {
    150
}

fn default_double_press() -> u64 {
    300
}

fn default_idle_timeout() -> u64 {
    3000
}

fn default_idle_check_interval() -> u64 {
    500
}

fn default_cursor_disappear() -> u64 {
    5000
}

fn default_keyboard_show_delay() -> u64 {
    120 // lets the document settle focus before the overlay is requested
}

fn default_text_entry_start_timeout() -> u64 {
    1000
}

fn default_hit_test_timeout() -> u64 {
    5000
}

/// Keyboard overlay detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyboardSettings {
    /// How long new evidence must hold before it is reported.
    #[serde(default = "default_confirm")]
    pub confirm_ms: u64,
    /// Layout delta (fraction of screen height) above which the overlay counts as open.
    #[serde(default = "default_open_fraction")]
    pub open_fraction: f32,
    /// Layout delta below which the overlay counts as closed.
    #[serde(default = "default_close_fraction")]
    pub close_fraction: f32,
    #[serde(default = "default_close_poll_interval")]
    pub close_poll_interval_ms: u64,
    #[serde(default = "default_close_ceiling")]
    pub close_ceiling_ms: u64,
}

impl Default for KeyboardSettings {
    fn default() -> Self {
        KeyboardSettings {
            confirm_ms: default_confirm(),
            open_fraction: default_open_fraction(),
            close_fraction: default_close_fraction(),
            close_poll_interval_ms: default_close_poll_interval(),
            close_ceiling_ms: default_close_ceiling(),
        }
    }
}

fn default_confirm() -> u64 {
    80
}

fn default_open_fraction() -> f32 {
    0.15
}

fn default_close_fraction() -> f32 {
    0.10
}

fn default_close_poll_interval() -> u64 {
    50
}

fn default_close_ceiling() -> u64 {
    1000
}

/// Visual feedback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectSettings {
    /// Emit a ripple where a synthetic click lands.
    #[serde(default = "default_true")]
    pub ripple: bool,
    #[serde(default = "default_ripple_duration")]
    pub ripple_duration_ms: u64,
    /// Emit cursor shown/hidden records.
    #[serde(default = "default_true")]
    pub cursor_visibility: bool,
}

impl Default for EffectSettings {
    fn default() -> Self {
        EffectSettings {
            ripple: true,
            ripple_duration_ms: default_ripple_duration(),
            cursor_visibility: true,
        }
    }
}

fn default_ripple_duration() -> u64 {
    300
}

fn default_true() -> bool {
    true
}
