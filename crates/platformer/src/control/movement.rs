use serde::{Deserialize, Serialize};

use super::body::{BodyState, Facing};
use crate::math::{lerp, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub move_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    /// Axis magnitude below which input counts as released.
    pub dead_zone: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            move_speed: 8.0,
            acceleration: 25.0,
            deceleration: 30.0,
            dead_zone: 0.1,
        }
    }
}

/// Horizontal velocity shaping. Disabled by the dash controller for the
/// whole dash; while disabled `apply` leaves the body untouched.
#[derive(Debug, Clone)]
pub struct MovementController {
    config: MovementConfig,
    enabled: bool,
}

impl MovementController {
    pub fn new(config: MovementConfig) -> Self {
        Self {
            config,
            enabled: true,
        }
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn step(&self, horizontal_axis: f32, current: Vec2, dt_seconds: f32) -> Vec2 {
        let target = Vec2::new(horizontal_axis * self.config.move_speed, current.y);
        let mut next = current.lerp(target, self.config.acceleration * dt_seconds);

        if horizontal_axis.abs() < self.config.dead_zone {
            next.x = lerp(next.x, 0.0, self.config.deceleration * dt_seconds);
        }
        next
    }

    /// Fixed-step entry point. Returns whether shaping ran.
    pub fn apply(&self, horizontal_axis: f32, body: &mut BodyState, dt_seconds: f32) -> bool {
        if !self.enabled {
            return false;
        }
        body.velocity = self.step(horizontal_axis, body.velocity, dt_seconds);
        true
    }

    /// Facing follows intent past the dead zone and holds otherwise.
    pub fn update_facing(&self, horizontal_axis: f32, body: &mut BodyState) {
        if horizontal_axis > self.config.dead_zone {
            body.facing = Facing::Right;
        } else if horizontal_axis < -self.config.dead_zone {
            body.facing = Facing::Left;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXED_DT: f32 = 0.02;

    #[test]
    fn accelerates_toward_target_speed_without_overshoot() {
        let movement = MovementController::new(MovementConfig::default());
        let mut velocity = Vec2::ZERO;

        velocity = movement.step(1.0, velocity, FIXED_DT);
        assert!((velocity.x - 4.0).abs() < 1e-4);

        for _ in 0..20 {
            velocity = movement.step(1.0, velocity, FIXED_DT);
        }
        assert!(velocity.x <= 8.0);
        assert!(velocity.x > 7.99);
    }

    #[test]
    fn vertical_velocity_passes_through() {
        let movement = MovementController::new(MovementConfig::default());

        let velocity = movement.step(-1.0, Vec2::new(0.0, -7.5), FIXED_DT);

        assert_eq!(velocity.y, -7.5);
    }

    #[test]
    fn released_input_stops_faster_than_plain_interpolation() {
        let movement = MovementController::new(MovementConfig::default());
        let start = Vec2::new(8.0, 0.0);

        let braked = movement.step(0.0, start, FIXED_DT);
        let plain = start.lerp(Vec2::ZERO, movement.config().acceleration * FIXED_DT);

        assert!(braked.x < plain.x);
        assert!((braked.x - 1.6).abs() < 1e-4);
    }

    #[test]
    fn disabled_controller_leaves_body_untouched() {
        let mut movement = MovementController::new(MovementConfig::default());
        movement.set_enabled(false);
        let mut body = BodyState::new(3.0);
        body.velocity = Vec2::new(25.0, 1.0);

        assert!(!movement.apply(0.0, &mut body, FIXED_DT));
        assert_eq!(body.velocity, Vec2::new(25.0, 1.0));

        movement.set_enabled(true);
        assert!(movement.apply(0.0, &mut body, FIXED_DT));
        assert!(body.velocity.x < 25.0);
    }

    #[test]
    fn facing_holds_inside_dead_zone() {
        let movement = MovementController::new(MovementConfig::default());
        let mut body = BodyState::new(3.0);

        movement.update_facing(-0.5, &mut body);
        assert_eq!(body.facing, Facing::Left);

        movement.update_facing(0.05, &mut body);
        assert_eq!(body.facing, Facing::Left);

        movement.update_facing(0.2, &mut body);
        assert_eq!(body.facing, Facing::Right);
    }
}
