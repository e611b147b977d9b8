use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::math::{Aabb, Vec2};
use crate::physics::{LayerMask, SpatialQuery};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundSensorConfig {
    /// Height of the ground probe, also the tolerance for accepting a top surface.
    pub ground_check_distance: f32,
    /// Height of the ceiling probe, also the tolerance for accepting a bottom surface.
    pub ceiling_check_distance: f32,
    /// Probe width as a fraction of the body width.
    pub probe_width_ratio: f32,
    pub ground_mask: LayerMask,
}

impl Default for GroundSensorConfig {
    fn default() -> Self {
        Self {
            ground_check_distance: 0.2,
            ceiling_check_distance: 0.1,
            probe_width_ratio: 0.8,
            ground_mask: LayerMask::layer(0),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroundQueryResult {
    pub grounded: bool,
    pub touching_ceiling: bool,
}

/// Stateless apart from a reusable hit buffer and the one-shot diagnostic
/// flag; every probe is computed from current geometry only.
#[derive(Debug)]
pub struct GroundSensor {
    config: GroundSensorConfig,
    hits: Vec<Aabb>,
    missing_collider_warned: bool,
}

impl GroundSensor {
    pub fn new(config: GroundSensorConfig) -> Self {
        Self {
            config,
            hits: Vec::new(),
            missing_collider_warned: false,
        }
    }

    pub fn config(&self) -> &GroundSensorConfig {
        &self.config
    }

    /// `bounds` is `None` when the character has no collider, which is a
    /// configuration fault: the character is reported airborne.
    pub fn probe(&mut self, bounds: Option<Aabb>, query: &dyn SpatialQuery) -> GroundQueryResult {
        let Some(bounds) = bounds else {
            if !self.missing_collider_warned {
                self.missing_collider_warned = true;
                warn!("ground sensor has no body collider; treating character as airborne");
            }
            return GroundQueryResult::default();
        };

        GroundQueryResult {
            grounded: self.check_ground(bounds, query),
            touching_ceiling: self.check_ceiling(bounds, query),
        }
    }

    fn check_ground(&mut self, bounds: Aabb, query: &dyn SpatialQuery) -> bool {
        let distance = self.config.ground_check_distance;
        let area = probe_box(
            bounds,
            self.config.probe_width_ratio,
            distance,
            bounds.min.y - distance * 0.5,
        );
        self.hits.clear();
        query.overlap_box(area, self.config.ground_mask, &mut self.hits);

        let body_bottom = bounds.min.y;
        let found = self
            .hits
            .iter()
            .any(|hit| is_top_surface(hit, body_bottom, distance));
        if found {
            trace!(body_bottom, "ground_surface_found");
        }
        found
    }

    fn check_ceiling(&mut self, bounds: Aabb, query: &dyn SpatialQuery) -> bool {
        let distance = self.config.ceiling_check_distance;
        let area = probe_box(
            bounds,
            self.config.probe_width_ratio,
            distance,
            bounds.max.y + distance * 0.5,
        );
        self.hits.clear();
        query.overlap_box(area, self.config.ground_mask, &mut self.hits);

        let body_top = bounds.max.y;
        let found = self
            .hits
            .iter()
            .any(|hit| is_bottom_surface(hit, body_top, distance));
        if found {
            trace!(body_top, "ceiling_surface_found");
        }
        found
    }
}

fn probe_box(bounds: Aabb, width_ratio: f32, height: f32, center_y: f32) -> Aabb {
    let size = Vec2::new(bounds.size().x * width_ratio, height);
    Aabb::from_center_size(Vec2::new(bounds.center().x, center_y), size)
}

/// Ground only if the surface top is at or below the body bottom (within
/// tolerance). Walls poking into the probe have tops far above it.
fn is_top_surface(hit: &Aabb, body_bottom: f32, tolerance: f32) -> bool {
    hit.max.y <= body_bottom + tolerance
}

fn is_bottom_surface(hit: &Aabb, body_top: f32, tolerance: f32) -> bool {
    hit.min.y >= body_top - tolerance
}
