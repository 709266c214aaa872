//! Live monster roster.

use std::collections::BTreeMap;

use glam::Vec3;
use warden_defence_core::{MonsterSnapshot, MonsterView, TargetHandle};

#[derive(Clone, Debug)]
struct Monster {
    position: Vec3,
    speed: f32,
    health: u32,
    waypoint: Option<Vec3>,
    lane_offset: Vec3,
    inside_map: bool,
}

/// Result of applying damage to a monster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DamageOutcome {
    Survived { remaining: u32 },
    Killed,
}

/// Monsters keyed by handle, iterated in handle order.
#[derive(Debug)]
pub(crate) struct MonsterRoster {
    entries: BTreeMap<TargetHandle, Monster>,
    next_handle: TargetHandle,
}

impl MonsterRoster {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_handle: TargetHandle::new(0),
        }
    }

    pub(crate) fn spawn(
        &mut self,
        position: Vec3,
        speed: f32,
        health: u32,
        lane_offset: Vec3,
    ) -> TargetHandle {
        let handle = self.next_handle;
        self.next_handle = TargetHandle::new(handle.get().wrapping_add(1));
        let _ = self.entries.insert(
            handle,
            Monster {
                position,
                speed,
                health,
                waypoint: None,
                lane_offset,
                inside_map: false,
            },
        );
        handle
    }

    /// Returns `false` for unknown handles.
    pub(crate) fn relocate(
        &mut self,
        handle: TargetHandle,
        position: Vec3,
        waypoint: Option<Vec3>,
        inside_map: bool,
    ) -> bool {
        let Some(monster) = self.entries.get_mut(&handle) else {
            return false;
        };
        monster.position = position;
        monster.waypoint = waypoint;
        monster.inside_map = inside_map;
        true
    }

    pub(crate) fn release(&mut self, handle: TargetHandle) -> bool {
        self.entries.remove(&handle).is_some()
    }

    pub(crate) fn damage(&mut self, handle: TargetHandle, amount: u32) -> Option<DamageOutcome> {
        let monster = self.entries.get_mut(&handle)?;
        monster.health = monster.health.saturating_sub(amount);
        if monster.health == 0 {
            let _ = self.entries.remove(&handle);
            return Some(DamageOutcome::Killed);
        }
        Some(DamageOutcome::Survived {
            remaining: monster.health,
        })
    }

    pub(crate) fn view(&self) -> MonsterView {
        MonsterView::from_snapshots(
            self.entries
                .iter()
                .map(|(&handle, monster)| MonsterSnapshot {
                    handle,
                    position: monster.position,
                    speed: monster.speed,
                    health: monster.health,
                    waypoint: monster.waypoint,
                    lane_offset: monster.lane_offset,
                    inside_map: monster.inside_map,
                })
                .collect(),
        )
    }
}
