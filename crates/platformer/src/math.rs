use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const LEFT: Vec2 = Vec2 { x: -1.0, y: 0.0 };
    pub const RIGHT: Vec2 = Vec2 { x: 1.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// `t` is clamped to `[0, 1]`.
    pub fn lerp(self, target: Vec2, t: f32) -> Vec2 {
        let t = clamp01(t);
        Vec2 {
            x: self.x + (target.x - self.x) * t,
            y: self.y + (target.y - self.y) * t,
        }
    }

    /// Unit horizontal direction matching the sign of `x`, zero when `x` is zero.
    pub fn horizontal_sign(self) -> Vec2 {
        if self.x > 0.0 {
            Vec2::RIGHT
        } else if self.x < 0.0 {
            Vec2::LEFT
        } else {
            Vec2::ZERO
        }
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * clamp01(t)
}

pub fn clamp01(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Axis-aligned box. `min` is the bottom-left corner (y up).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn extents(&self) -> Vec2 {
        self.size() * 0.5
    }

    /// Strict overlap; boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    pub fn translated(&self, offset: Vec2) -> Aabb {
        Aabb {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_clamps_interpolation_factor() {
        let from = Vec2::new(0.0, 2.0);
        let to = Vec2::new(10.0, 2.0);

        assert_eq!(from.lerp(to, 0.5), Vec2::new(5.0, 2.0));
        assert_eq!(from.lerp(to, 3.0), to);
        assert_eq!(from.lerp(to, -1.0), from);
    }

    #[test]
    fn horizontal_sign_ignores_magnitude() {
        assert_eq!(Vec2::new(0.3, 4.0).horizontal_sign(), Vec2::RIGHT);
        assert_eq!(Vec2::new(-7.0, 0.0).horizontal_sign(), Vec2::LEFT);
        assert_eq!(Vec2::new(0.0, 1.0).horizontal_sign(), Vec2::ZERO);
    }

    #[test]
    fn touching_boxes_do_not_overlap() {
        let a = Aabb::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        let b = Aabb::new(Vec2::new(1.0, 0.0), Vec2::new(2.0, 1.0));
        let c = Aabb::new(Vec2::new(0.5, 0.5), Vec2::new(1.5, 1.5));

        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
    }

    #[test]
    fn center_size_round_trip() {
        let aabb = Aabb::from_center_size(Vec2::new(2.0, 3.0), Vec2::new(1.0, 2.0));

        assert_eq!(aabb.min, Vec2::new(1.5, 2.0));
        assert_eq!(aabb.max, Vec2::new(2.5, 4.0));
        assert_eq!(aabb.center(), Vec2::new(2.0, 3.0));
        assert_eq!(aabb.extents(), Vec2::new(0.5, 1.0));
    }
}
