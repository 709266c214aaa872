//! Shots in flight between a tower and their impact point.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec3;
use warden_defence_core::{AttackKind, Event, ProjectileId, TargetHandle};

#[derive(Clone, Debug)]
struct Shot {
    target: TargetHandle,
    impact: Vec3,
    remaining: Duration,
    damage: u32,
    attack: AttackKind,
}

/// Projectiles keyed by identifier, landing in identifier order.
#[derive(Debug)]
pub(crate) struct ProjectileRegistry {
    entries: BTreeMap<ProjectileId, Shot>,
    next_id: ProjectileId,
}

impl ProjectileRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: ProjectileId::new(0),
        }
    }

    pub(crate) fn launch(
        &mut self,
        target: TargetHandle,
        impact: Vec3,
        flight: Duration,
        damage: u32,
        attack: AttackKind,
    ) -> ProjectileId {
        let id = self.next_id;
        self.next_id = ProjectileId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(
            id,
            Shot {
                target,
                impact,
                remaining: flight,
                damage,
                attack,
            },
        );
        id
    }

    /// Drains every flight timer by `dt` and reports the shots that landed.
    pub(crate) fn advance(&mut self, dt: Duration, out: &mut Vec<Event>) {
        let mut landed = Vec::new();
        for (&id, shot) in &mut self.entries {
            shot.remaining = shot.remaining.saturating_sub(dt);
            if shot.remaining.is_zero() {
                landed.push(id);
            }
        }

        for id in landed {
            if let Some(shot) = self.entries.remove(&id) {
                out.push(Event::ProjectileLanded {
                    projectile: id,
                    target: shot.target,
                    impact: shot.impact,
                    damage: shot.damage,
                    attack: shot.attack,
                });
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shots_land_once_their_flight_elapses() {
        let mut registry = ProjectileRegistry::new();
        let slow = registry.launch(
            TargetHandle::new(1),
            Vec3::new(2.0, 0.0, 0.0),
            Duration::from_millis(300),
            3,
            AttackKind::Single,
        );
        let fast = registry.launch(
            TargetHandle::new(2),
            Vec3::ZERO,
            Duration::from_millis(100),
            1,
            AttackKind::Area { radius: 1.0 },
        );
        let mut events = Vec::new();

        registry.advance(Duration::from_millis(100), &mut events);
        assert_eq!(
            events,
            vec![Event::ProjectileLanded {
                projectile: fast,
                target: TargetHandle::new(2),
                impact: Vec3::ZERO,
                damage: 1,
                attack: AttackKind::Area { radius: 1.0 },
            }]
        );
        assert_eq!(registry.len(), 1);

        events.clear();
        registry.advance(Duration::from_millis(100), &mut events);
        assert!(events.is_empty());

        registry.advance(Duration::from_millis(250), &mut events);
        assert!(matches!(
            events.as_slice(),
            [Event::ProjectileLanded { projectile, damage: 3, .. }] if *projectile == slow
        ));
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn endless_flight_never_lands() {
        let mut registry = ProjectileRegistry::new();
        let _ = registry.launch(
            TargetHandle::new(0),
            Vec3::ZERO,
            Duration::MAX,
            1,
            AttackKind::Single,
        );
        let mut events = Vec::new();

        registry.advance(Duration::from_secs(3600), &mut events);

        assert!(events.is_empty());
        assert_eq!(registry.len(), 1);
    }
}
