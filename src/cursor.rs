// Cursor motion: acceleration physics driven by held d-pad directions.
// Speed and edge-scroll band scale with the viewport unless pinned by config.

use crate::types::*;

/// Physics constants resolved against the current viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionParams {
    pub gain: f32,
    pub dead_zone: f32,
    pub friction: f32,
    pub max_speed: f32,
    pub edge_band: f32,
}

impl MotionParams {
    pub fn resolve(settings: &MotionSettings, viewport: ViewportSize) -> Self {
        let width = viewport.width as f32;
        MotionParams {
            gain: settings.acceleration_gain,
            dead_zone: settings.dead_zone,
            friction: settings.release_friction,
            max_speed: settings.max_speed.unwrap_or(width / 25.0),
            edge_band: settings.edge_band.unwrap_or(width / 15.0),
        }
    }
}

/// Pointer state owned by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorState {
    pub position: Point,
    pub velocity: Velocity,
    pub held: HeldDirections,
    pub select_held: bool,
    pub last_activity: Timestamp,
}

/// What a single physics step produced.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickOutcome {
    /// Position changed during this step.
    pub moved: bool,
    /// Edge-scroll request, in surface pixels.
    pub scroll: Option<(i32, i32)>,
    /// More ticks are needed (direction held or residual velocity).
    pub active: bool,
}

/// Cursor motion engine.
pub struct CursorMotion {
    settings: MotionSettings,
    params: MotionParams,
    viewport: ViewportSize,
    state: CursorState,
}

impl CursorMotion {
    pub fn new(settings: MotionSettings, viewport: ViewportSize, now: Timestamp) -> Self {
        let params = MotionParams::resolve(&settings, viewport);
        CursorMotion {
            settings,
            params,
            viewport,
            state: CursorState {
                position: viewport.center(),
                velocity: Velocity::default(),
                held: HeldDirections::default(),
                select_held: false,
                last_activity: now,
            },
        }
    }

    pub fn state(&self) -> &CursorState {
        &self.state
    }

    pub fn position(&self) -> Point {
        self.state.position
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    pub fn is_moving(&self) -> bool {
        !self.state.held.is_empty() || !self.state.velocity.is_zero()
    }

    /// Adds a held direction. Returns true if nothing was moving before.
    pub fn press(&mut self, direction: Direction, now: Timestamp) -> bool {
        let was_moving = self.is_moving();
        self.state.held.insert(direction);
        self.state.last_activity = now;
        !was_moving
    }

    /// Drops a held direction. Returns true if it was held.
    pub fn release(&mut self, direction: Direction, now: Timestamp) -> bool {
        self.state.last_activity = now;
        self.state.held.remove(direction)
    }

    /// Forgets every held direction and residual velocity.
    pub fn halt(&mut self) {
        self.state.held.clear();
        self.state.velocity = Velocity::default();
    }

    pub fn set_select_held(&mut self, held: bool) {
        self.state.select_held = held;
    }

    pub fn touch(&mut self, now: Timestamp) {
        self.state.last_activity = now;
    }

    pub fn recenter(&mut self) {
        self.state.position = self.viewport.center();
        self.state.velocity = Velocity::default();
    }

    /// Adopts a new viewport: re-derives physics and re-centers the cursor.
    pub fn resize(&mut self, viewport: ViewportSize) {
        self.viewport = viewport;
        self.params = MotionParams::resolve(&self.settings, viewport);
        self.recenter();
    }

    /// Advances physics by `elapsed_ms`.
    pub fn tick(&mut self, elapsed_ms: f32) -> TickOutcome {
        let elapsed_ms = elapsed_ms.max(0.0);
        let (intent_x, intent_y) = self.state.held.intent();
        let p = self.params;

        self.state.velocity = Velocity {
            x: step_axis(self.state.velocity.x, intent_x, elapsed_ms, &p),
            y: step_axis(self.state.velocity.y, intent_y, elapsed_ms, &p),
        };

        let before = self.state.position;
        let v = self.state.velocity;
        self.state.position = self
            .viewport
            .clamp(Point::new(before.x + v.x, before.y + v.y));
        let after = self.state.position;

        let dx = edge_scroll(after.x, v.x, p.edge_band, self.viewport.width as f32);
        let dy = edge_scroll(after.y, v.y, p.edge_band, self.viewport.height as f32);

        TickOutcome {
            moved: after != before,
            scroll: if dx != 0 || dy != 0 { Some((dx, dy)) } else { None },
            active: self.is_moving(),
        }
    }
}

/// Integrates one velocity axis. `intent` is -1, 0 or 1.
fn step_axis(velocity: f32, intent: i8, elapsed_ms: f32, p: &MotionParams) -> f32 {
    let accel = p.gain * elapsed_ms;
    let next = if intent != 0 {
        velocity + f32::from(intent) * accel
    } else {
        let decel = accel * p.friction;
        if velocity.abs() <= decel {
            0.0
        } else {
            velocity - velocity.signum() * decel
        }
    };
    let next = next.clamp(-p.max_speed, p.max_speed);
    if next.abs() < p.dead_zone {
        0.0
    } else {
        next
    }
}

/// Scroll amount along one axis. Non-zero only inside the band and moving toward that edge.
fn edge_scroll(position: f32, velocity: f32, band: f32, extent: f32) -> i32 {
    if velocity < 0.0 && position < band {
        velocity.floor() as i32
    } else if velocity > 0.0 && position > extent - band {
        velocity.ceil() as i32
    } else {
        0
    }
}
