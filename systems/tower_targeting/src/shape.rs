//! Range-shape predicates evaluated against spatial index candidates.

use glam::{Quat, Vec2, Vec3};
use warden_defence_core::{planar_forward, RangeShape, Target, DIRECTION_EPSILON};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Cone {
    facing: Vec2,
    half_angle: f32,
}

/// A tower's range shape resolved against its position and logical rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangeQuery {
    center: Vec3,
    min_range_sq: f32,
    max_range_sq: f32,
    cone: Option<Cone>,
}

impl RangeQuery {
    /// Resolves `shape` for a tower standing at `position`.
    ///
    /// Offset circles move the query centre to `position` plus the offset
    /// rotated by `logical_rotation`. Sectors open along the rotation's planar
    /// forward axis; a rotation without one disables the angle test.
    #[must_use]
    pub fn for_tower(position: Vec3, logical_rotation: Quat, shape: &RangeShape) -> Self {
        match *shape {
            RangeShape::Circle { max_range } => Self {
                center: position,
                min_range_sq: 0.0,
                max_range_sq: max_range * max_range,
                cone: None,
            },
            RangeShape::Sector {
                max_range,
                half_angle,
            } => Self {
                center: position,
                min_range_sq: 0.0,
                max_range_sq: max_range * max_range,
                cone: planar_forward(logical_rotation).map(|facing| Cone { facing, half_angle }),
            },
            RangeShape::Annulus {
                min_range,
                max_range,
            } => Self {
                center: position,
                min_range_sq: min_range * min_range,
                max_range_sq: max_range * max_range,
                cone: None,
            },
            RangeShape::OffsetCircle {
                offset,
                min_range,
                max_range,
                ..
            } => {
                let shifted = position + logical_rotation * offset;
                Self {
                    center: Vec3::new(shifted.x, position.y, shifted.z),
                    min_range_sq: min_range * min_range,
                    max_range_sq: max_range * max_range,
                    cone: None,
                }
            }
        }
    }

    /// Clamps the query centre onto the tile area `[0, width - 1] x [0, height - 1]`.
    #[must_use]
    pub fn clamped_to(mut self, width: u32, height: u32) -> Self {
        let max_x = width.saturating_sub(1) as f32;
        let max_z = height.saturating_sub(1) as f32;
        self.center.x = self.center.x.clamp(0.0, max_x);
        self.center.z = self.center.z.clamp(0.0, max_z);
        self
    }

    /// Point distances are measured from.
    #[must_use]
    pub const fn center(&self) -> Vec3 {
        self.center
    }

    /// Squared outer radius handed to the spatial index.
    #[must_use]
    pub const fn max_range_sq(&self) -> f32 {
        self.max_range_sq
    }

    /// Shape test for a candidate at squared planar distance `distance_sq`.
    #[must_use]
    pub fn accepts(&self, target: &Target, distance_sq: f32) -> bool {
        if distance_sq > self.max_range_sq || distance_sq < self.min_range_sq {
            return false;
        }

        let Some(cone) = self.cone else {
            return true;
        };
        let direction = Vec2::new(
            target.position.x - self.center.x,
            target.position.z - self.center.z,
        );
        let length = direction.length();
        if length <= DIRECTION_EPSILON {
            return true;
        }
        let cosine = (cone.facing.dot(direction) / length).clamp(-1.0, 1.0);
        cosine.acos() <= cone.half_angle
    }
}
