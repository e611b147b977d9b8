use serde::{Deserialize, Serialize};

use crate::control::{BodyCollider, BodyState};
use crate::math::{Aabb, Vec2};

/// Collision layer bitmask. A collider sits on one layer; a query mask may
/// select several.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub const fn layer(index: u32) -> Self {
        if index >= 32 {
            return LayerMask::NONE;
        }
        LayerMask(1 << index)
    }

    pub fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }

    pub fn union(self, other: LayerMask) -> LayerMask {
        LayerMask(self.0 | other.0)
    }
}

/// Box-overlap query against the static level geometry.
pub trait SpatialQuery {
    /// Appends the bounds of every collider on `mask` overlapping `area`.
    fn overlap_box(&self, area: Aabb, mask: LayerMask, out: &mut Vec<Aabb>);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub name: String,
    pub bounds: Aabb,
    #[serde(default = "default_collider_layer")]
    pub layer: LayerMask,
}

fn default_collider_layer() -> LayerMask {
    LayerMask::layer(0)
}

#[derive(Debug, Clone, Default)]
pub struct StaticWorld {
    colliders: Vec<Collider>,
}

impl StaticWorld {
    pub fn new(colliders: Vec<Collider>) -> Self {
        Self { colliders }
    }

    pub fn push(&mut self, collider: Collider) {
        self.colliders.push(collider);
    }

    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    pub fn clear(&mut self) {
        self.colliders.clear();
    }
}

impl SpatialQuery for StaticWorld {
    fn overlap_box(&self, area: Aabb, mask: LayerMask, out: &mut Vec<Aabb>) {
        out.extend(
            self.colliders
                .iter()
                .filter(|collider| collider.layer.intersects(mask))
                .filter(|collider| collider.bounds.overlaps(&area))
                .map(|collider| collider.bounds),
        );
    }
}

const CONTACT_SKIN: f32 = 1e-3;

/// Parameters of one integration step.
#[derive(Debug, Clone, Copy)]
pub struct IntegrationParams {
    pub base_gravity: f32,
    pub terminal_fall_speed: f32,
    pub solid_mask: LayerMask,
}

/// Which axes were blocked by geometry during an integration step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepContacts {
    pub hit_wall: bool,
    pub hit_floor: bool,
    pub hit_ceiling: bool,
}

/// Velocity-based integration: gravity, terminal clamp, then x-then-y motion
/// with overlap resolution against solid colliders. Without a collider the
/// body moves freely.
pub fn integrate_body(
    world: &dyn SpatialQuery,
    position: &mut Vec2,
    collider: Option<&BodyCollider>,
    body: &mut BodyState,
    params: IntegrationParams,
    dt_seconds: f32,
) -> StepContacts {
    let mut contacts = StepContacts::default();
    if dt_seconds <= 0.0 {
        return contacts;
    }

    body.velocity.y += params.base_gravity * body.gravity_scale * dt_seconds;
    body.clamp_fall_speed(params.terminal_fall_speed);

    let Some(collider) = collider else {
        *position += body.velocity * dt_seconds;
        return contacts;
    };

    let mut hits = Vec::new();

    // Each pass ignores contacts on the other axis, so a body resting on a
    // floor does not resolve against it while walking.
    position.x += body.velocity.x * dt_seconds;
    let probe = shrink(collider.bounds_at(*position), 0.0, CONTACT_SKIN);
    world.overlap_box(probe, params.solid_mask, &mut hits);
    for hit in &hits {
        let bounds = collider.bounds_at(*position);
        if !shrink(bounds, 0.0, CONTACT_SKIN).overlaps(hit) {
            continue;
        }
        if body.velocity.x > 0.0 {
            position.x -= bounds.max.x - hit.min.x;
        } else if body.velocity.x < 0.0 {
            position.x += hit.max.x - bounds.min.x;
        } else {
            continue;
        }
        contacts.hit_wall = true;
    }
    if contacts.hit_wall {
        body.velocity.x = 0.0;
    }

    position.y += body.velocity.y * dt_seconds;
    let probe = shrink(collider.bounds_at(*position), CONTACT_SKIN, 0.0);
    hits.clear();
    world.overlap_box(probe, params.solid_mask, &mut hits);
    for hit in &hits {
        let bounds = collider.bounds_at(*position);
        if !shrink(bounds, CONTACT_SKIN, 0.0).overlaps(hit) {
            continue;
        }
        if body.velocity.y <= 0.0 {
            position.y += hit.max.y - bounds.min.y;
            contacts.hit_floor = true;
        } else {
            position.y -= bounds.max.y - hit.min.y;
            contacts.hit_ceiling = true;
        }
    }
    if contacts.hit_floor || contacts.hit_ceiling {
        body.velocity.y = 0.0;
    }

    contacts
}

fn shrink(bounds: Aabb, dx: f32, dy: f32) -> Aabb {
    Aabb {
        min: Vec2::new(bounds.min.x + dx, bounds.min.y + dy),
        max: Vec2::new(bounds.max.x - dx, bounds.max.y - dy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor_world() -> StaticWorld {
        StaticWorld::new(vec![Collider {
            name: "floor".to_string(),
            bounds: Aabb::new(Vec2::new(-10.0, -1.0), Vec2::new(10.0, 0.0)),
            layer: LayerMask::layer(0),
        }])
    }

    fn params() -> IntegrationParams {
        IntegrationParams {
            base_gravity: -9.81,
            terminal_fall_speed: 25.0,
            solid_mask: LayerMask::layer(0),
        }
    }

    #[test]
    fn overlap_box_filters_by_layer() {
        let mut world = floor_world();
        world.push(Collider {
            name: "trigger".to_string(),
            bounds: Aabb::new(Vec2::new(-10.0, -1.0), Vec2::new(10.0, 0.0)),
            layer: LayerMask::layer(3),
        });
        let mut hits = Vec::new();

        world.overlap_box(
            Aabb::new(Vec2::new(-1.0, -0.5), Vec2::new(1.0, 0.5)),
            LayerMask::layer(0),
            &mut hits,
        );

        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn combined_masks_select_every_listed_layer() {
        let mut world = floor_world();
        for (name, index) in [("ledge", 1), ("spikes", 2)] {
            world.push(Collider {
                name: name.to_string(),
                bounds: Aabb::new(Vec2::new(-2.0, -1.0), Vec2::new(2.0, 0.0)),
                layer: LayerMask::layer(index),
            });
        }
        let area = Aabb::new(Vec2::new(-1.0, -0.5), Vec2::new(1.0, 0.5));
        let floor_and_ledge = LayerMask::layer(0).union(LayerMask::layer(1));

        assert!(floor_and_ledge.intersects(LayerMask::layer(1)));
        assert!(!floor_and_ledge.intersects(LayerMask::layer(2)));
        assert!(!LayerMask::ALL.intersects(LayerMask::NONE));
        assert_eq!(LayerMask::layer(40), LayerMask::NONE);

        let mut picked = Vec::new();
        world.overlap_box(area, floor_and_ledge, &mut picked);
        let mut everything = Vec::new();
        world.overlap_box(area, LayerMask::ALL, &mut everything);
        let mut nothing = Vec::new();
        world.overlap_box(area, LayerMask::NONE, &mut nothing);

        assert_eq!(picked.len(), 2);
        assert_eq!(everything.len(), 3);
        assert!(nothing.is_empty());
    }

    #[test]
    fn falling_body_lands_flush_on_floor() {
        let world = floor_world();
        let collider = BodyCollider::new(Vec2::new(1.0, 1.0));
        let mut position = Vec2::new(0.0, 0.52);
        let mut body = BodyState::new(3.0);
        body.velocity.y = -5.0;

        let contacts =
            integrate_body(&world, &mut position, Some(&collider), &mut body, params(), 0.02);

        assert!(contacts.hit_floor);
        assert_eq!(body.velocity.y, 0.0);
        assert!((position.y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn wall_stops_horizontal_motion() {
        let mut world = StaticWorld::default();
        world.push(Collider {
            name: "wall".to_string(),
            bounds: Aabb::new(Vec2::new(1.0, 0.0), Vec2::new(2.0, 5.0)),
            layer: LayerMask::layer(0),
        });
        let collider = BodyCollider::new(Vec2::new(1.0, 1.0));
        let mut position = Vec2::new(0.45, 2.0);
        let mut body = BodyState::new(0.0);
        body.velocity.x = 10.0;

        let contacts =
            integrate_body(&world, &mut position, Some(&collider), &mut body, params(), 0.02);

        assert!(contacts.hit_wall);
        assert_eq!(body.velocity.x, 0.0);
        assert!((position.x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn terminal_clamp_runs_after_gravity() {
        let world = StaticWorld::default();
        let mut position = Vec2::new(0.0, 100.0);
        let mut body = BodyState::new(4.5);
        body.velocity.y = -24.9;

        integrate_body(&world, &mut position, None, &mut body, params(), 0.02);

        assert_eq!(body.velocity.y, -25.0);
    }
}
