use serde::{Deserialize, Serialize};

use crate::math::{Aabb, Vec2};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn direction(self) -> Vec2 {
        match self {
            Facing::Left => Vec2::LEFT,
            Facing::Right => Vec2::RIGHT,
        }
    }

    /// Sprite flip flag: art faces right, so facing left means flipped.
    pub fn is_flipped(self) -> bool {
        self == Facing::Left
    }
}

/// Rigid-body state shared by every controller for one character. Controllers
/// receive it by exclusive reference, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub velocity: Vec2,
    pub gravity_scale: f32,
    pub facing: Facing,
}

impl BodyState {
    pub fn new(gravity_scale: f32) -> Self {
        Self {
            velocity: Vec2::ZERO,
            gravity_scale,
            facing: Facing::Right,
        }
    }

    pub fn set_horizontal_velocity(&mut self, x: f32) {
        self.velocity.x = x;
    }

    pub fn set_vertical_velocity(&mut self, y: f32) {
        self.velocity.y = y;
    }

    pub fn clamp_fall_speed(&mut self, terminal_fall_speed: f32) {
        let floor = -terminal_fall_speed.abs();
        if self.velocity.y < floor {
            self.velocity.y = floor;
        }
    }
}

/// Box collider attached to the character, positioned by its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyCollider {
    pub size: Vec2,
    pub offset: Vec2,
}

impl BodyCollider {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            offset: Vec2::ZERO,
        }
    }

    pub fn bounds_at(&self, position: Vec2) -> Aabb {
        Aabb::from_center_size(position + self.offset, self.size)
    }
}
