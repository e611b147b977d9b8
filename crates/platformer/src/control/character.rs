use tracing::debug;

use super::body::{BodyCollider, BodyState};
use super::dash::{DashController, DashPhase, DashVisuals};
use super::events::ControllerEvent;
use super::jump::{JumpController, JumpPhase};
use super::movement::MovementController;
use super::sensor::{GroundQueryResult, GroundSensor};
use crate::app::InputSnapshot;
use crate::config::CharacterTuning;
use crate::math::{Aabb, Vec2};
use crate::physics::{integrate_body, IntegrationParams, SpatialQuery, StepContacts};

/// One character's controller set. Controllers run in a fixed order so the
/// priorities are explicit: ground probe before jump and dash, dash after
/// movement intent, gravity shaping and the terminal clamp after every
/// controller that touched vertical velocity.
#[derive(Debug)]
pub struct Character {
    position: Vec2,
    collider: Option<BodyCollider>,
    body: BodyState,
    sensor: GroundSensor,
    movement: MovementController,
    jump: JumpController,
    dash: DashController,
    ground: GroundQueryResult,
    was_grounded: Option<bool>,
    horizontal_intent: f32,
    events: Vec<ControllerEvent>,
}

impl Character {
    pub fn new(tuning: &CharacterTuning, position: Vec2, collider: Option<BodyCollider>) -> Self {
        Self {
            position,
            collider,
            body: BodyState::new(tuning.gravity.gravity_scale),
            sensor: GroundSensor::new(tuning.sensor),
            movement: MovementController::new(tuning.movement),
            jump: JumpController::new(tuning.jump, tuning.gravity),
            dash: DashController::new(tuning.dash),
            ground: GroundQueryResult::default(),
            was_grounded: None,
            horizontal_intent: 0.0,
            events: Vec::new(),
        }
    }

    /// Logic phase, once per rendered frame.
    pub fn frame(&mut self, input: &InputSnapshot, query: &dyn SpatialQuery, dt_seconds: f32) {
        self.events.clear();

        self.ground = self.sensor.probe(self.bounds(), query);
        self.track_ground_transition();

        self.horizontal_intent = input.horizontal_axis();
        self.movement
            .update_facing(self.horizontal_intent, &mut self.body);

        self.jump.update(
            input,
            self.ground,
            &mut self.body,
            dt_seconds,
            &mut self.events,
        );
        self.dash.update(
            input,
            &mut self.body,
            &mut self.movement,
            dt_seconds,
            &mut self.events,
        );
    }

    /// Physics phase, once per fixed timestep.
    pub fn fixed_step(&mut self, world: &dyn SpatialQuery, dt_seconds: f32) -> StepContacts {
        self.movement
            .apply(self.horizontal_intent, &mut self.body, dt_seconds);
        self.jump.apply_gravity_scale(&mut self.body);

        let gravity = self.jump.gravity();
        let params = IntegrationParams {
            base_gravity: gravity.base_gravity,
            terminal_fall_speed: gravity.terminal_fall_speed,
            solid_mask: self.sensor.config().ground_mask,
        };
        let contacts = integrate_body(
            world,
            &mut self.position,
            self.collider.as_ref(),
            &mut self.body,
            params,
            dt_seconds,
        );
        self.jump.clamp_fall_speed(&mut self.body);
        contacts
    }

    /// Places the character at `position` at rest, keeping controller state.
    pub fn teleport(&mut self, position: Vec2) {
        self.position = position;
        self.body.velocity = Vec2::ZERO;
        self.was_grounded = None;
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn bounds(&self) -> Option<Aabb> {
        self.collider
            .as_ref()
            .map(|collider| collider.bounds_at(self.position))
    }

    pub fn body(&self) -> &BodyState {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut BodyState {
        &mut self.body
    }

    pub fn movement(&self) -> &MovementController {
        &self.movement
    }

    pub fn jump(&self) -> &JumpController {
        &self.jump
    }

    pub fn dash(&self) -> &DashController {
        &self.dash
    }

    /// Events raised by the most recent logic frame.
    pub fn frame_events(&self) -> &[ControllerEvent] {
        &self.events
    }

    pub fn is_grounded(&self) -> bool {
        self.ground.grounded
    }

    pub fn is_jumping(&self) -> bool {
        self.jump.is_jumping()
    }

    pub fn is_touching_ceiling(&self) -> bool {
        self.ground.touching_ceiling
    }

    pub fn jump_phase(&self) -> JumpPhase {
        self.jump.phase()
    }

    pub fn is_dashing(&self) -> bool {
        self.dash.is_dashing()
    }

    pub fn can_dash(&self) -> bool {
        self.dash.can_dash()
    }

    pub fn dash_phase(&self) -> DashPhase {
        self.dash.phase()
    }

    pub fn dash_visuals(&self) -> &DashVisuals {
        self.dash.visuals()
    }

    pub fn cooldown_percent(&self) -> f32 {
        self.dash.cooldown_percent()
    }

    /// Older HUD name for `cooldown_percent`.
    pub fn dash_cooldown_percent(&self) -> f32 {
        self.cooldown_percent()
    }

    pub fn reset_dash(&mut self) -> bool {
        self.dash.reset_dash()
    }

    pub fn on_grounded(&mut self) -> bool {
        self.dash.on_grounded()
    }

    fn track_ground_transition(&mut self) {
        let grounded = self.ground.grounded;
        let previous = self.was_grounded.replace(grounded);
        match previous {
            Some(false) if grounded => {
                debug!(x = self.position.x, y = self.position.y, "landed");
                self.events.push(ControllerEvent::Landed);
                if self.dash.config().refresh_on_landing && self.dash.on_grounded() {
                    debug!("dash_refreshed_on_landing");
                    self.events.push(ControllerEvent::DashReady);
                }
            }
            Some(true) if !grounded => {
                self.events.push(ControllerEvent::LeftGround);
            }
            _ => {}
        }
    }
}
