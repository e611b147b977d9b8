use serde::{Deserialize, Serialize};
use tracing::debug;

use super::body::BodyState;
use super::events::ControllerEvent;
use super::movement::MovementController;
use crate::app::{InputAction, InputSnapshot};
use crate::math::{clamp01, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub dash_speed: f32,
    pub dash_duration: f32,
    pub dash_cooldown: f32,
    /// Window in which a second same-direction key press counts as a double tap.
    pub double_tap_time: f32,
    pub enable_double_tap: bool,
    /// Share of dash speed kept as horizontal velocity when the dash ends.
    /// Zero disables the carry-over.
    pub momentum_carry_ratio: f32,
    /// Landing restores the dash immediately instead of waiting for cooldown.
    pub refresh_on_landing: bool,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            dash_speed: 25.0,
            dash_duration: 0.2,
            dash_cooldown: 0.5,
            double_tap_time: 0.3,
            enable_double_tap: true,
            momentum_carry_ratio: 0.3,
            refresh_on_landing: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashPhase {
    Ready,
    Dashing,
    Cooling,
}

/// `is_dashing` and `can_dash` are never both set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashState {
    pub is_dashing: bool,
    pub can_dash: bool,
    pub dash_time_remaining: f32,
    pub dash_cooldown_remaining: f32,
    /// Unit horizontal vector while dashing, zero otherwise.
    pub dash_direction: Vec2,
}

impl Default for DashState {
    fn default() -> Self {
        Self {
            is_dashing: false,
            can_dash: true,
            dash_time_remaining: 0.0,
            dash_cooldown_remaining: 0.0,
            dash_direction: Vec2::ZERO,
        }
    }
}

/// Effect flags a renderer reads; toggled once at dash start and end.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DashVisuals {
    pub tint_active: bool,
    pub trail_emitting: bool,
    /// Direction particles are emitted toward, set at dash start.
    pub particle_direction: Vec2,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct TapCounter {
    count: u8,
    timer: f32,
}

impl TapCounter {
    fn register(&mut self, window: f32) -> bool {
        self.count = self.count.saturating_add(1);
        self.timer = window;
        if self.count >= 2 {
            *self = TapCounter::default();
            return true;
        }
        false
    }

    fn tick(&mut self, dt_seconds: f32) {
        if self.timer > 0.0 {
            self.timer -= dt_seconds;
            if self.timer <= 0.0 {
                *self = TapCounter::default();
            }
        }
    }
}

/// Per-direction double-tap counters. Pressing a direction while the
/// opposite one is held clears both counters before anything is counted.
#[derive(Debug, Clone, Default)]
pub struct DoubleTapDetector {
    left: TapCounter,
    right: TapCounter,
}

impl DoubleTapDetector {
    pub fn register(&mut self, input: &InputSnapshot, window: f32) -> Option<Vec2> {
        if input.was_pressed(InputAction::MoveLeft) {
            if input.is_down(InputAction::MoveRight) {
                self.reset();
                return None;
            }
            if self.left.register(window) {
                return Some(Vec2::LEFT);
            }
        }

        if input.was_pressed(InputAction::MoveRight) {
            if input.is_down(InputAction::MoveLeft) {
                self.reset();
                return None;
            }
            if self.right.register(window) {
                return Some(Vec2::RIGHT);
            }
        }

        None
    }

    pub fn tick(&mut self, dt_seconds: f32) {
        self.left.tick(dt_seconds);
        self.right.tick(dt_seconds);
    }

    pub fn reset(&mut self) {
        self.left = TapCounter::default();
        self.right = TapCounter::default();
    }

    /// Pending tap counts as `(left, right)`.
    pub fn counts(&self) -> (u8, u8) {
        (self.left.count, self.right.count)
    }
}

#[derive(Debug, Clone)]
pub struct DashController {
    config: DashConfig,
    state: DashState,
    taps: DoubleTapDetector,
    visuals: DashVisuals,
}

impl DashController {
    pub fn new(config: DashConfig) -> Self {
        Self {
            config,
            state: DashState::default(),
            taps: DoubleTapDetector::default(),
            visuals: DashVisuals::default(),
        }
    }

    pub fn config(&self) -> &DashConfig {
        &self.config
    }

    pub fn state(&self) -> &DashState {
        &self.state
    }

    pub fn visuals(&self) -> &DashVisuals {
        &self.visuals
    }

    pub fn taps(&self) -> &DoubleTapDetector {
        &self.taps
    }

    pub fn phase(&self) -> DashPhase {
        if self.state.is_dashing {
            DashPhase::Dashing
        } else if self.state.can_dash {
            DashPhase::Ready
        } else {
            DashPhase::Cooling
        }
    }

    pub fn is_dashing(&self) -> bool {
        self.state.is_dashing
    }

    pub fn can_dash(&self) -> bool {
        self.state.can_dash
    }

    /// Cooldown progress in `[0, 1]`; 1 means ready.
    pub fn cooldown_percent(&self) -> f32 {
        if self.config.dash_cooldown <= 0.0 {
            return 1.0;
        }
        clamp01(1.0 - self.state.dash_cooldown_remaining / self.config.dash_cooldown)
    }

    /// Clears any remaining cooldown. Has no effect mid-dash.
    pub fn reset_dash(&mut self) -> bool {
        if self.state.is_dashing {
            return false;
        }
        let was_cooling = !self.state.can_dash;
        self.state.can_dash = true;
        self.state.dash_cooldown_remaining = 0.0;
        was_cooling
    }

    /// Landing hook for "dash refresh on landing" designs.
    pub fn on_grounded(&mut self) -> bool {
        self.reset_dash()
    }

    pub fn update(
        &mut self,
        input: &InputSnapshot,
        body: &mut BodyState,
        movement: &mut MovementController,
        dt_seconds: f32,
        events: &mut Vec<ControllerEvent>,
    ) {
        let dt_seconds = dt_seconds.max(0.0);

        if input.was_pressed(InputAction::Dash) && self.is_ready() {
            self.start_dash(input, body, movement, events);
        }

        if self.config.enable_double_tap && self.is_ready() {
            if let Some(direction) = self.taps.register(input, self.config.double_tap_time) {
                self.state.dash_direction = direction;
                self.start_dash(input, body, movement, events);
            }
        }

        if self.state.is_dashing {
            self.state.dash_time_remaining -= dt_seconds;
            body.set_horizontal_velocity(self.state.dash_direction.x * self.config.dash_speed);
            if self.state.dash_time_remaining <= 0.0 {
                self.end_dash(body, movement, events);
            }
        }

        if !self.state.can_dash && !self.state.is_dashing {
            self.state.dash_cooldown_remaining =
                (self.state.dash_cooldown_remaining - dt_seconds).max(0.0);
            if self.state.dash_cooldown_remaining <= 0.0 {
                self.state.can_dash = true;
                debug!("dash_ready");
                events.push(ControllerEvent::DashReady);
            }
        }

        self.taps.tick(dt_seconds);
    }

    fn is_ready(&self) -> bool {
        self.state.can_dash && !self.state.is_dashing
    }

    fn start_dash(
        &mut self,
        input: &InputSnapshot,
        body: &BodyState,
        movement: &mut MovementController,
        events: &mut Vec<ControllerEvent>,
    ) {
        if self.state.dash_direction.is_zero() {
            let raw = input.raw_horizontal();
            let axis = input.horizontal_axis();
            self.state.dash_direction = if raw != 0.0 {
                Vec2::new(raw, 0.0).horizontal_sign()
            } else if axis.abs() > movement.config().dead_zone {
                // Neutral keys with a deflected stick.
                Vec2::new(axis.signum(), 0.0)
            } else {
                body.facing.direction()
            };
        }

        if opposes_held_direction(self.state.dash_direction, input) {
            let direction = self.state.dash_direction;
            self.state.dash_direction = Vec2::ZERO;
            debug!(direction_x = direction.x, "dash_vetoed");
            events.push(ControllerEvent::DashVetoed { direction });
            return;
        }

        self.state.is_dashing = true;
        self.state.can_dash = false;
        self.state.dash_time_remaining = self.config.dash_duration;
        self.state.dash_cooldown_remaining = self.config.dash_cooldown;
        movement.set_enabled(false);

        self.visuals = DashVisuals {
            tint_active: true,
            trail_emitting: true,
            particle_direction: self.state.dash_direction,
        };

        debug!(direction_x = self.state.dash_direction.x, "dash_started");
        events.push(ControllerEvent::DashStarted {
            direction: self.state.dash_direction,
        });
    }

    fn end_dash(
        &mut self,
        body: &mut BodyState,
        movement: &mut MovementController,
        events: &mut Vec<ControllerEvent>,
    ) {
        let direction = self.state.dash_direction;
        self.state.is_dashing = false;
        self.state.dash_time_remaining = 0.0;
        self.state.dash_direction = Vec2::ZERO;
        movement.set_enabled(true);

        self.visuals.tint_active = false;
        self.visuals.trail_emitting = false;

        // Carry-over uses the direction captured before the reset above.
        let carry_velocity_x =
            direction.x * self.config.dash_speed * self.config.momentum_carry_ratio;
        body.set_horizontal_velocity(carry_velocity_x);

        debug!(carry_velocity_x, "dash_ended");
        events.push(ControllerEvent::DashEnded { carry_velocity_x });
    }
}

fn opposes_held_direction(direction: Vec2, input: &InputSnapshot) -> bool {
    (direction.x < 0.0 && input.is_down(InputAction::MoveRight))
        || (direction.x > 0.0 && input.is_down(InputAction::MoveLeft))
}
