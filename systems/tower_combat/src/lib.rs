#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits firing and damage commands from targeting data.

use glam::Vec3;
use tracing::trace;
use warden_defence_core::{
    planar_distance_sq, AttackKind, Command, Event, TargetHandle, TowerTarget, TowerView,
};
use warden_defence_system_tower_targeting::SpatialIndex;

/// Tower combat system that queues firing commands for ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves landed projectiles, then fires every ready tower that holds a target.
    ///
    /// Each shot emits `Command::FireTower`. Direct shots deal their damage
    /// immediately; projectile shots emit `Command::LaunchProjectile` toward
    /// the target's current position and deal damage once a
    /// `Event::ProjectileLanded` arrives. Single-target hits only land on
    /// targets still present in `index`. Area hits damage every indexed
    /// target within the blast radius of the impact point, so `index` must be
    /// the one built for this tick's `tower_targets`.
    pub fn handle(
        &mut self,
        events: &[Event],
        towers: &TowerView,
        tower_targets: &[TowerTarget],
        index: &SpatialIndex,
        out: &mut Vec<Command>,
    ) {
        self.scratch.clear();

        for event in events {
            if let Event::ProjectileLanded {
                target,
                impact,
                damage,
                attack,
                ..
            } = *event
            {
                resolve_hit(&mut self.scratch, index, target, impact, damage, attack);
            }
        }

        for assignment in tower_targets {
            let Some(tower) = towers.get(assignment.tower) else {
                continue;
            };
            if !tower.ready_in.is_zero() {
                continue;
            }

            self.scratch.push(Command::FireTower {
                tower: tower.id,
                target: assignment.target,
                target_position: assignment.target_position,
            });

            let distance = planar_distance_sq(tower.position, assignment.target_position).sqrt();
            match tower.delivery.flight_time(distance) {
                None => resolve_hit(
                    &mut self.scratch,
                    index,
                    assignment.target,
                    assignment.target_position,
                    tower.damage,
                    tower.attack,
                ),
                Some(flight) => self.scratch.push(Command::LaunchProjectile {
                    tower: tower.id,
                    target: assignment.target,
                    impact: assignment.target_position,
                    flight,
                    damage: tower.damage,
                    attack: tower.attack,
                }),
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn resolve_hit(
    out: &mut Vec<Command>,
    index: &SpatialIndex,
    target: TargetHandle,
    impact: Vec3,
    damage: u32,
    attack: AttackKind,
) {
    match attack {
        AttackKind::Single => {
            if index.iter().any(|candidate| candidate.handle == target) {
                out.push(Command::DamageMonster {
                    target,
                    amount: damage,
                });
            }
        }
        AttackKind::Area { radius } => {
            let before = out.len();
            index.all_in_radius(impact, radius * radius, |hit, _| {
                out.push(Command::DamageMonster {
                    target: hit.handle,
                    amount: damage,
                });
            });
            trace!(
                target = target.get(),
                hits = out.len() - before,
                "area attack resolved"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use std::time::Duration;
    use warden_defence_core::{
        Delivery, ProjectileId, RangeShape, Target, TilePos, TowerId, TowerKindId, TowerSnapshot,
    };

    fn snapshot(id: u32, ready_in: Duration, attack: AttackKind) -> TowerSnapshot {
        with_delivery(id, ready_in, attack, Delivery::Direct)
    }

    fn with_delivery(
        id: u32,
        ready_in: Duration,
        attack: AttackKind,
        delivery: Delivery,
    ) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(id),
            kind: TowerKindId::new(0),
            tile: TilePos::new(0, 0),
            position: Vec3::ZERO,
            logical_rotation: Quat::IDENTITY,
            render_rotation: Quat::IDENTITY,
            range: RangeShape::Circle { max_range: 5.0 },
            attack,
            delivery,
            damage: 3,
            rotatable: true,
            ready_in,
        }
    }

    fn assignment(tower: u32, target: u32, x: f32) -> TowerTarget {
        TowerTarget {
            tower: TowerId::new(tower),
            target: TargetHandle::new(target),
            target_position: Vec3::new(x, 0.0, 0.0),
            distance_sq: x * x,
        }
    }

    fn index(xs: &[(u32, f32)]) -> SpatialIndex {
        let mut index = SpatialIndex::new();
        index.rebuild(xs.iter().map(|&(handle, x)| Target {
            position: Vec3::new(x, 0.0, 0.0),
            handle: TargetHandle::new(handle),
        }));
        index
    }

    #[test]
    fn single_target_tower_fires_and_damages() {
        let mut system = TowerCombat::new();
        let towers =
            TowerView::from_snapshots(vec![snapshot(2, Duration::ZERO, AttackKind::Single)]);
        let mut out = Vec::new();

        system.handle(&[], &towers, &[assignment(2, 4, 1.0)], &index(&[(4, 1.0)]), &mut out);

        assert_eq!(
            out,
            vec![
                Command::FireTower {
                    tower: TowerId::new(2),
                    target: TargetHandle::new(4),
                    target_position: Vec3::new(1.0, 0.0, 0.0),
                },
                Command::DamageMonster {
                    target: TargetHandle::new(4),
                    amount: 3,
                },
            ]
        );
    }

    #[test]
    fn non_ready_or_missing_towers_are_skipped() {
        let mut system = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![
            snapshot(3, Duration::from_millis(250), AttackKind::Single),
            snapshot(8, Duration::ZERO, AttackKind::Single),
        ]);
        let targets = vec![assignment(3, 9, 1.0), assignment(8, 2, 1.0), assignment(42, 3, 1.0)];
        let mut out = Vec::new();

        system.handle(&[], &towers, &targets, &index(&[(2, 1.0)]), &mut out);

        assert_eq!(
            out,
            vec![
                Command::FireTower {
                    tower: TowerId::new(8),
                    target: TargetHandle::new(2),
                    target_position: Vec3::new(1.0, 0.0, 0.0),
                },
                Command::DamageMonster {
                    target: TargetHandle::new(2),
                    amount: 3,
                },
            ],
        );
    }

    #[test]
    fn area_attack_damages_everything_in_blast() {
        let mut system = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![snapshot(
            1,
            Duration::ZERO,
            AttackKind::Area { radius: 1.5 },
        )]);
        let index = index(&[(1, 2.0), (2, 3.0), (3, 3.4), (4, 6.0)]);
        let mut out = Vec::new();

        system.handle(&[], &towers, &[assignment(1, 2, 3.0)], &index, &mut out);

        let mut damaged: Vec<u32> = out
            .iter()
            .filter_map(|command| match command {
                Command::DamageMonster { target, amount } => {
                    assert_eq!(*amount, 3);
                    Some(target.get())
                }
                _ => None,
            })
            .collect();
        damaged.sort_unstable();
        assert_eq!(damaged, vec![1, 2, 3]);
        assert!(matches!(out[0], Command::FireTower { .. }));
    }

    #[test]
    fn no_targets_is_silent() {
        let mut system = TowerCombat::new();
        let towers =
            TowerView::from_snapshots(vec![snapshot(1, Duration::ZERO, AttackKind::Single)]);
        let mut out = Vec::new();

        system.handle(&[], &towers, &[], &SpatialIndex::new(), &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn projectile_tower_launches_instead_of_damaging() {
        let mut system = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![with_delivery(
            5,
            Duration::ZERO,
            AttackKind::Single,
            Delivery::Projectile { speed: 4.0 },
        )]);
        let mut out = Vec::new();

        system.handle(&[], &towers, &[assignment(5, 1, 2.0)], &index(&[(1, 2.0)]), &mut out);

        assert_eq!(
            out,
            vec![
                Command::FireTower {
                    tower: TowerId::new(5),
                    target: TargetHandle::new(1),
                    target_position: Vec3::new(2.0, 0.0, 0.0),
                },
                Command::LaunchProjectile {
                    tower: TowerId::new(5),
                    target: TargetHandle::new(1),
                    impact: Vec3::new(2.0, 0.0, 0.0),
                    flight: Duration::from_millis(500),
                    damage: 3,
                    attack: AttackKind::Single,
                },
            ]
        );
    }

    #[test]
    fn landed_projectile_damages_surviving_target() {
        let mut system = TowerCombat::new();
        let landed = [Event::ProjectileLanded {
            projectile: ProjectileId::new(0),
            target: TargetHandle::new(1),
            impact: Vec3::new(2.0, 0.0, 0.0),
            damage: 4,
            attack: AttackKind::Single,
        }];
        let mut out = Vec::new();

        system.handle(&landed, &TowerView::default(), &[], &index(&[(1, 2.5)]), &mut out);

        assert_eq!(
            out,
            vec![Command::DamageMonster {
                target: TargetHandle::new(1),
                amount: 4,
            }]
        );
    }

    #[test]
    fn landed_projectile_misses_target_that_already_died() {
        let mut system = TowerCombat::new();
        let landed = [Event::ProjectileLanded {
            projectile: ProjectileId::new(3),
            target: TargetHandle::new(7),
            impact: Vec3::new(2.0, 0.0, 0.0),
            damage: 4,
            attack: AttackKind::Single,
        }];
        let mut out = Vec::new();

        system.handle(&landed, &TowerView::default(), &[], &index(&[(2, 2.0)]), &mut out);

        assert!(out.is_empty(), "dead targets take no damage");
    }

    #[test]
    fn landed_area_projectile_blasts_impact_point() {
        let mut system = TowerCombat::new();
        let landed = [Event::ProjectileLanded {
            projectile: ProjectileId::new(1),
            target: TargetHandle::new(7),
            impact: Vec3::new(2.0, 0.0, 0.0),
            damage: 2,
            attack: AttackKind::Area { radius: 1.0 },
        }];
        let mut out = Vec::new();

        system.handle(
            &landed,
            &TowerView::default(),
            &[],
            &index(&[(1, 1.5), (2, 5.0)]),
            &mut out,
        );

        assert_eq!(
            out,
            vec![Command::DamageMonster {
                target: TargetHandle::new(1),
                amount: 2,
            }]
        );
    }
}
