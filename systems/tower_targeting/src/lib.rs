#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

mod shape;
mod spatial;

use warden_defence_core::{planar_distance_sq, MonsterView, TowerTarget, TowerView};

pub use crate::{shape::RangeQuery, spatial::SpatialIndex};

/// Tower targeting system that owns the per-tick spatial index.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    index: SpatialIndex,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// The spatial index is rebuilt from `monsters` before any tower is
    /// resolved. Query centres are clamped onto the `grid_dimensions` tile
    /// area. The output buffer is cleared before populating it with the
    /// latest assignments, one per tower that found a target, in tower order.
    pub fn handle(
        &mut self,
        towers: &TowerView,
        monsters: &MonsterView,
        grid_dimensions: (u32, u32),
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();
        self.index.rebuild(monsters.targets());

        if self.index.is_empty() {
            return;
        }

        let (width, height) = grid_dimensions;
        for tower in towers.iter() {
            let query = RangeQuery::for_tower(tower.position, tower.logical_rotation, &tower.range)
                .clamped_to(width, height);
            let found = self
                .index
                .nearest_in_range(query.center(), query.max_range_sq(), |target, distance_sq| {
                    query.accepts(target, distance_sq)
                });

            if let Some(target) = found {
                out.push(TowerTarget {
                    tower: tower.id,
                    target: target.handle,
                    target_position: target.position,
                    distance_sq: planar_distance_sq(query.center(), target.position),
                });
            }
        }
    }

    /// Index built during the most recent [`TowerTargeting::handle`] call.
    #[must_use]
    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use std::{f32::consts::FRAC_PI_2, time::Duration};
    use warden_defence_core::{
        AttackKind, Delivery, MonsterSnapshot, RangeShape, TargetHandle, TilePos, TowerId, TowerKindId,
        TowerSnapshot,
    };

    fn tower(id: u32, x: i32, z: i32, rotation: Quat, range: RangeShape) -> TowerSnapshot {
        let tile = TilePos::new(x, z);
        TowerSnapshot {
            id: TowerId::new(id),
            kind: TowerKindId::new(0),
            tile,
            position: tile.center(),
            logical_rotation: rotation,
            render_rotation: Quat::IDENTITY,
            range,
            attack: AttackKind::Single,
            delivery: Delivery::Direct,
            damage: 1,
            rotatable: true,
            ready_in: Duration::ZERO,
        }
    }

    fn monster(handle: u32, x: f32, z: f32) -> MonsterSnapshot {
        MonsterSnapshot {
            handle: TargetHandle::new(handle),
            position: Vec3::new(x, 0.0, z),
            speed: 1.0,
            health: 5,
            waypoint: None,
            lane_offset: Vec3::ZERO,
            inside_map: true,
        }
    }

    #[test]
    fn targets_closest_monster_within_range() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower(
            1,
            4,
            4,
            Quat::IDENTITY,
            RangeShape::Circle { max_range: 3.0 },
        )]);
        let monsters =
            MonsterView::from_snapshots(vec![monster(2, 6.0, 4.0), monster(3, 5.0, 5.0)]);
        let mut out = Vec::new();

        system.handle(&towers, &monsters, (10, 10), &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].tower, TowerId::new(1));
        assert_eq!(out[0].target, TargetHandle::new(3));
        assert!((out[0].distance_sq - 2.0).abs() < 1e-5);
        assert_eq!(system.index().len(), 2);
    }

    #[test]
    fn sector_tower_ignores_monsters_behind_it() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower(
            1,
            5,
            5,
            Quat::from_rotation_y(FRAC_PI_2),
            RangeShape::sector_from_arc_degrees(4.0, 90.0),
        )]);
        let monsters =
            MonsterView::from_snapshots(vec![monster(1, 4.0, 5.0), monster(2, 8.0, 5.0)]);
        let mut out = Vec::new();

        system.handle(&towers, &monsters, (10, 10), &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].target, TargetHandle::new(2));
    }

    #[test]
    fn no_monsters_yields_no_targets() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower(
            1,
            0,
            0,
            Quat::IDENTITY,
            RangeShape::Circle { max_range: 3.0 },
        )]);
        let mut out = vec![TowerTarget {
            tower: TowerId::new(9),
            target: TargetHandle::new(9),
            target_position: Vec3::ZERO,
            distance_sq: 0.0,
        }];

        system.handle(&towers, &MonsterView::default(), (4, 4), &mut out);

        assert!(out.is_empty(), "stale assignments must be cleared");
    }

    #[test]
    fn index_is_rebuilt_every_tick() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower(
            1,
            2,
            2,
            Quat::IDENTITY,
            RangeShape::Circle { max_range: 2.0 },
        )]);
        let mut out = Vec::new();

        system.handle(
            &towers,
            &MonsterView::from_snapshots(vec![monster(1, 2.0, 3.0)]),
            (5, 5),
            &mut out,
        );
        assert_eq!(out[0].target, TargetHandle::new(1));

        system.handle(
            &towers,
            &MonsterView::from_snapshots(vec![monster(2, 3.0, 2.0)]),
            (5, 5),
            &mut out,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].target, TargetHandle::new(2));
    }
}
