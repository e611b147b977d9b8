use serde::{Deserialize, Serialize};
use tracing::debug;

use super::body::BodyState;
use super::events::ControllerEvent;
use super::sensor::GroundQueryResult;
use crate::app::{InputAction, InputSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpConfig {
    pub jump_force: f32,
    /// Maximum sustained-hold duration in seconds.
    pub jump_time: f32,
    pub coyote_time: f32,
    pub jump_buffer_time: f32,
    /// Fraction of `jump_force` pinned while the key stays held.
    pub sustain_ratio: f32,
    /// Velocity multiplier applied when the key is released mid-ascent.
    pub release_cut_ratio: f32,
    /// Grounded with vertical velocity at or below this resets the jump.
    pub landing_velocity_threshold: f32,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            jump_force: 15.0,
            jump_time: 0.3,
            coyote_time: 0.1,
            jump_buffer_time: 0.1,
            sustain_ratio: 0.8,
            release_cut_ratio: 0.5,
            landing_velocity_threshold: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GravityConfig {
    pub base_gravity: f32,
    pub gravity_scale: f32,
    pub fall_gravity_multiplier: f32,
    /// Magnitude of the lowest vertical velocity allowed.
    pub terminal_fall_speed: f32,
}

impl Default for GravityConfig {
    fn default() -> Self {
        Self {
            base_gravity: -9.81,
            gravity_scale: 3.0,
            fall_gravity_multiplier: 1.5,
            terminal_fall_speed: 25.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpPhase {
    Idle,
    Airborne,
    Jumping,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JumpState {
    pub is_jumping: bool,
    pub jump_time_remaining: f32,
    pub coyote_time_remaining: f32,
    pub jump_buffer_remaining: f32,
}

#[derive(Debug, Clone)]
pub struct JumpController {
    config: JumpConfig,
    gravity: GravityConfig,
    state: JumpState,
    ground: GroundQueryResult,
}

impl JumpController {
    pub fn new(config: JumpConfig, gravity: GravityConfig) -> Self {
        Self {
            state: JumpState {
                jump_time_remaining: config.jump_time,
                ..JumpState::default()
            },
            config,
            gravity,
            ground: GroundQueryResult::default(),
        }
    }

    pub fn config(&self) -> &JumpConfig {
        &self.config
    }

    pub fn gravity(&self) -> &GravityConfig {
        &self.gravity
    }

    pub fn state(&self) -> &JumpState {
        &self.state
    }

    pub fn phase(&self) -> JumpPhase {
        if self.state.is_jumping {
            JumpPhase::Jumping
        } else if self.ground.grounded {
            JumpPhase::Idle
        } else {
            JumpPhase::Airborne
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.ground.grounded
    }

    pub fn is_jumping(&self) -> bool {
        self.state.is_jumping
    }

    pub fn is_touching_ceiling(&self) -> bool {
        self.ground.touching_ceiling
    }

    /// Logic-phase update. `ground` must come from a probe taken this frame.
    pub fn update(
        &mut self,
        input: &InputSnapshot,
        ground: GroundQueryResult,
        body: &mut BodyState,
        dt_seconds: f32,
        events: &mut Vec<ControllerEvent>,
    ) {
        self.ground = ground;
        let dt_seconds = dt_seconds.max(0.0);

        if ground.grounded {
            self.state.coyote_time_remaining = self.config.coyote_time;
        } else {
            self.state.coyote_time_remaining = decay(self.state.coyote_time_remaining, dt_seconds);
        }

        if input.was_pressed(InputAction::Jump) {
            self.state.jump_buffer_remaining = self.config.jump_buffer_time;
        } else {
            self.state.jump_buffer_remaining = decay(self.state.jump_buffer_remaining, dt_seconds);
        }

        if self.state.jump_buffer_remaining > 0.0
            && self.state.coyote_time_remaining > 0.0
            && !self.state.is_jumping
        {
            self.perform_jump(body);
            debug!(velocity_y = body.velocity.y, "jump_committed");
            events.push(ControllerEvent::Jumped {
                velocity_y: body.velocity.y,
            });
        }

        // Ceiling contact wins over the held branch for this frame.
        if ground.touching_ceiling && self.state.is_jumping {
            self.cancel_jump(body);
            debug!("jump_ceiling_cancel");
            events.push(ControllerEvent::JumpCeilingCancel);
        }

        // Thrust also runs on the commit frame while the key is held.
        if input.is_down(InputAction::Jump) && self.state.is_jumping && !ground.touching_ceiling {
            if self.state.jump_time_remaining > 0.0 {
                body.set_vertical_velocity(self.config.jump_force * self.config.sustain_ratio);
                self.state.jump_time_remaining = decay(self.state.jump_time_remaining, dt_seconds);
            } else {
                self.state.is_jumping = false;
                debug!("jump_sustain_ended");
                events.push(ControllerEvent::JumpSustainEnded);
            }
        }

        if input.was_released(InputAction::Jump) && self.state.is_jumping {
            self.state.is_jumping = false;
            if body.velocity.y > 0.0 {
                body.velocity.y *= self.config.release_cut_ratio;
            }
            debug!(velocity_y = body.velocity.y, "jump_cut");
            events.push(ControllerEvent::JumpCut {
                velocity_y: body.velocity.y,
            });
        }

        if ground.grounded && body.velocity.y <= self.config.landing_velocity_threshold {
            self.state.is_jumping = false;
            self.state.jump_time_remaining = self.config.jump_time;
        }
    }

    /// Fixed-step gravity shaping: heavier gravity while falling.
    pub fn apply_gravity_scale(&self, body: &mut BodyState) {
        if body.velocity.y < 0.0 && !self.ground.grounded {
            body.gravity_scale = self.gravity.gravity_scale * self.gravity.fall_gravity_multiplier;
        } else {
            body.gravity_scale = self.gravity.gravity_scale;
        }
    }

    pub fn clamp_fall_speed(&self, body: &mut BodyState) {
        body.clamp_fall_speed(self.gravity.terminal_fall_speed);
    }

    fn perform_jump(&mut self, body: &mut BodyState) {
        self.state.is_jumping = true;
        body.set_vertical_velocity(self.config.jump_force);
        self.state.jump_buffer_remaining = 0.0;
        self.state.coyote_time_remaining = 0.0;
        self.state.jump_time_remaining = self.config.jump_time;
    }

    fn cancel_jump(&mut self, body: &mut BodyState) {
        self.state.is_jumping = false;
        self.state.jump_time_remaining = 0.0;
        if body.velocity.y > 0.0 {
            body.set_vertical_velocity(0.0);
        }
    }
}

fn decay(remaining: f32, dt_seconds: f32) -> f32 {
    (remaining - dt_seconds).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.02;

    const GROUNDED: GroundQueryResult = GroundQueryResult {
        grounded: true,
        touching_ceiling: false,
    };
    const AIRBORNE: GroundQueryResult = GroundQueryResult {
        grounded: false,
        touching_ceiling: false,
    };
    const CEILING: GroundQueryResult = GroundQueryResult {
        grounded: false,
        touching_ceiling: true,
    };

    fn controller() -> JumpController {
        JumpController::new(JumpConfig::default(), GravityConfig::default())
    }

    fn press() -> InputSnapshot {
        InputSnapshot::empty().with_pressed(InputAction::Jump)
    }

    fn hold() -> InputSnapshot {
        InputSnapshot::empty().with_action_down(InputAction::Jump, true)
    }

    fn release() -> InputSnapshot {
        InputSnapshot::empty().with_released(InputAction::Jump)
    }

    fn jumps(events: &[ControllerEvent]) -> usize {
        events
            .iter()
            .filter(|event| matches!(event, ControllerEvent::Jumped { .. }))
            .count()
    }

    #[test]
    fn coyote_timer_stays_pinned_while_grounded() {
        let mut jump = controller();
        let mut body = BodyState::new(3.0);
        let mut events = Vec::new();

        for dt in [0.0, 0.016, 0.5, 3.0] {
            jump.update(&InputSnapshot::empty(), GROUNDED, &mut body, dt, &mut events);
            assert_eq!(jump.state().coyote_time_remaining, jump.config().coyote_time);
        }
        assert!(events.is_empty());
    }

    #[test]
    fn grounded_press_jumps_with_full_force() {
        let mut jump = controller();
        let mut body = BodyState::new(3.0);
        let mut events = Vec::new();

        jump.update(&press(), GROUNDED, &mut body, DT, &mut events);

        assert_eq!(
            events.first(),
            Some(&ControllerEvent::Jumped { velocity_y: 15.0 })
        );
        assert!((body.velocity.y - 12.0).abs() < 1e-5);
        assert!((jump.state().jump_time_remaining - 0.28).abs() < 1e-5);
        assert!(jump.is_jumping());
        assert_eq!(jump.phase(), JumpPhase::Jumping);
        assert_eq!(jump.state().jump_buffer_remaining, 0.0);
        assert_eq!(jump.state().coyote_time_remaining, 0.0);
        assert_eq!(jumps(&events), 1);
    }

    #[test]
    fn held_jump_sustains_then_hands_back_to_gravity() {
        let mut jump = controller();
        let mut body = BodyState::new(3.0);
        let mut events = Vec::new();
        jump.update(&press(), GROUNDED, &mut body, DT, &mut events);

        let mut sustained_frames = 0;
        for _ in 0..40 {
            jump.update(&hold(), AIRBORNE, &mut body, DT, &mut events);
            if !jump.is_jumping() {
                break;
            }
            assert!((body.velocity.y - 12.0).abs() < 1e-5);
            sustained_frames += 1;
        }

        assert!((14..=15).contains(&sustained_frames));
        assert!(!jump.is_jumping());
        assert!(events.contains(&ControllerEvent::JumpSustainEnded));
    }

    #[test]
    fn release_mid_ascent_halves_velocity_once() {
        let mut jump = controller();
        let mut body = BodyState::new(3.0);
        let mut events = Vec::new();
        jump.update(&press(), GROUNDED, &mut body, DT, &mut events);
        jump.update(&hold(), AIRBORNE, &mut body, DT, &mut events);
        let before = body.velocity.y;

        jump.update(&release(), AIRBORNE, &mut body, DT, &mut events);
        assert!(body.velocity.y <= before * 0.5);
        assert!(!jump.is_jumping());

        let after_first = body.velocity.y;
        jump.update(&release(), AIRBORNE, &mut body, DT, &mut events);
        assert_eq!(body.velocity.y, after_first);
        assert_eq!(
            events
                .iter()
                .filter(|event| matches!(event, ControllerEvent::JumpCut { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn ceiling_cancels_jump_even_while_held() {
        let mut jump = controller();
        let mut body = BodyState::new(3.0);
        let mut events = Vec::new();
        jump.update(&press(), GROUNDED, &mut body, DT, &mut events);

        jump.update(&hold(), CEILING, &mut body, DT, &mut events);

        assert_eq!(body.velocity.y, 0.0);
        assert!(!jump.is_jumping());
        assert_eq!(jump.state().jump_time_remaining, 0.0);
        assert!(events.contains(&ControllerEvent::JumpCeilingCancel));
    }

    #[test]
    fn buffered_press_jumps_on_landing() {
        let mut jump = controller();
        let mut body = BodyState::new(3.0);
        body.velocity.y = -5.0;
        let mut events = Vec::new();

        // Airborne long enough for coyote time to run out.
        for _ in 0..10 {
            jump.update(&InputSnapshot::empty(), AIRBORNE, &mut body, DT, &mut events);
        }
        jump.update(&press(), AIRBORNE, &mut body, DT, &mut events);
        assert_eq!(jumps(&events), 0);

        for _ in 0..3 {
            jump.update(&hold(), AIRBORNE, &mut body, DT, &mut events);
        }
        body.velocity.y = 0.0;
        jump.update(&hold(), GROUNDED, &mut body, DT, &mut events);
        jump.update(&hold(), GROUNDED, &mut body, DT, &mut events);

        assert_eq!(jumps(&events), 1);
    }

    #[test]
    fn stale_buffered_press_is_dropped() {
        let mut jump = controller();
        let mut body = BodyState::new(3.0);
        body.velocity.y = -5.0;
        let mut events = Vec::new();
        for _ in 0..10 {
            jump.update(&InputSnapshot::empty(), AIRBORNE, &mut body, DT, &mut events);
        }
        jump.update(&press(), AIRBORNE, &mut body, DT, &mut events);

        for _ in 0..6 {
            jump.update(&hold(), AIRBORNE, &mut body, DT, &mut events);
        }
        body.velocity.y = 0.0;
        jump.update(&hold(), GROUNDED, &mut body, DT, &mut events);

        assert_eq!(jumps(&events), 0);
    }

    #[test]
    fn coyote_window_allows_late_jump() {
        let mut jump = controller();
        let mut body = BodyState::new(3.0);
        let mut events = Vec::new();
        jump.update(&InputSnapshot::empty(), GROUNDED, &mut body, DT, &mut events);

        for _ in 0..3 {
            jump.update(&InputSnapshot::empty(), AIRBORNE, &mut body, DT, &mut events);
        }
        jump.update(&press(), AIRBORNE, &mut body, DT, &mut events);

        assert_eq!(jumps(&events), 1);
    }

    #[test]
    fn press_after_coyote_window_does_nothing() {
        let mut jump = controller();
        let mut body = BodyState::new(3.0);
        let mut events = Vec::new();
        jump.update(&InputSnapshot::empty(), GROUNDED, &mut body, DT, &mut events);

        for _ in 0..6 {
            jump.update(&InputSnapshot::empty(), AIRBORNE, &mut body, DT, &mut events);
        }
        jump.update(&press(), AIRBORNE, &mut body, DT, &mut events);

        assert_eq!(jumps(&events), 0);
        assert!(!jump.is_jumping());
    }

    #[test]
    fn landing_resets_hold_duration() {
        let mut jump = controller();
        let mut body = BodyState::new(3.0);
        let mut events = Vec::new();
        jump.update(&press(), GROUNDED, &mut body, DT, &mut events);
        jump.update(&hold(), CEILING, &mut body, DT, &mut events);
        assert_eq!(jump.state().jump_time_remaining, 0.0);

        body.velocity.y = 0.0;
        jump.update(&InputSnapshot::empty(), GROUNDED, &mut body, DT, &mut events);

        assert_eq!(jump.phase(), JumpPhase::Idle);
        assert_eq!(jump.state().jump_time_remaining, jump.config().jump_time);
    }

    #[test]
    fn falling_uses_heavier_gravity() {
        let mut jump = controller();
        let mut body = BodyState::new(3.0);
        let mut events = Vec::new();
        jump.update(&InputSnapshot::empty(), AIRBORNE, &mut body, DT, &mut events);

        body.velocity.y = -1.0;
        jump.apply_gravity_scale(&mut body);
        assert!((body.gravity_scale - 4.5).abs() < 1e-6);

        body.velocity.y = 3.0;
        jump.apply_gravity_scale(&mut body);
        assert_eq!(body.gravity_scale, 3.0);
    }
}
