//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use glam::{Quat, Vec3};
use warden_defence_core::{
    yaw_toward, AttackKind, Delivery, RangeShape, TilePos, TowerId, TowerKindId, TowerSnapshot,
    TowerSpec, TowerView,
};

/// Snapshot of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Catalog entry the tower was built from.
    pub(crate) kind: TowerKindId,
    /// Tile the tower occupies.
    pub(crate) tile: TilePos,
    /// Rotation used for targeting.
    pub(crate) logical_rotation: Quat,
    /// Rotation used for rendering.
    pub(crate) render_rotation: Quat,
    /// Targeting geometry, including the aimed offset for offset-circle towers.
    pub(crate) range: RangeShape,
    attack: AttackKind,
    delivery: Delivery,
    damage: u32,
    rotatable: bool,
    reload: Duration,
    ready_in: Duration,
}

impl TowerState {
    fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            tile: self.tile,
            position: self.tile.center(),
            logical_rotation: self.logical_rotation,
            render_rotation: self.render_rotation,
            range: self.range,
            attack: self.attack,
            delivery: self.delivery,
            damage: self.damage,
            rotatable: self.rotatable,
            ready_in: self.ready_in,
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    by_tile: BTreeMap<TilePos, TowerId>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            by_tile: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Registers a freshly built tower and returns its identifier.
    pub(crate) fn insert(&mut self, kind: TowerKindId, spec: &TowerSpec, tile: TilePos) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));

        let state = TowerState {
            id,
            kind,
            tile,
            logical_rotation: Quat::IDENTITY,
            render_rotation: Quat::IDENTITY,
            range: spec.range,
            attack: spec.attack,
            delivery: spec.delivery,
            damage: spec.damage,
            rotatable: spec.rotatable,
            reload: spec.reload(),
            ready_in: Duration::ZERO,
        };
        let _ = self.entries.insert(id, state);
        let _ = self.by_tile.insert(tile, id);
        id
    }

    /// Unregisters the tower standing on `tile`, if any.
    pub(crate) fn remove_at(&mut self, tile: TilePos) -> Option<TowerId> {
        let id = self.by_tile.remove(&tile)?;
        let _ = self.entries.remove(&id);
        Some(id)
    }

    /// Drains every cooldown by `dt`.
    pub(crate) fn advance(&mut self, dt: Duration) {
        for state in self.entries.values_mut() {
            state.ready_in = state.ready_in.saturating_sub(dt);
        }
    }

    /// Points the tower's logical rotation along a planar world offset.
    ///
    /// Offset-circle towers also move their query centre onto the offset,
    /// shortened to the configured limit. Returns the new logical rotation,
    /// or `None` for unknown towers and offsets without a planar heading.
    pub(crate) fn aim(&mut self, id: TowerId, world_offset: Vec3) -> Option<Quat> {
        let state = self.entries.get_mut(&id)?;
        let rotation = yaw_toward(world_offset)?;
        state.logical_rotation = rotation;

        if let RangeShape::OffsetCircle {
            offset,
            offset_limit,
            ..
        } = &mut state.range
        {
            let planar = Vec3::new(world_offset.x, 0.0, world_offset.z);
            let length = planar.length().min(*offset_limit);
            *offset = Vec3::new(0.0, 0.0, length);
        }

        Some(rotation)
    }

    /// Records a shot, restarting the cooldown and turning rotatable turrets.
    ///
    /// Returns `false` when the tower is unknown or still reloading.
    pub(crate) fn fire(&mut self, id: TowerId, target_position: Vec3) -> bool {
        let Some(state) = self.entries.get_mut(&id) else {
            return false;
        };
        if !state.ready_in.is_zero() {
            return false;
        }

        state.ready_in = state.reload;
        if state.rotatable {
            if let Some(rotation) = yaw_toward(target_position - state.tile.center()) {
                state.render_rotation = rotation;
            }
        }
        true
    }

    /// Captures a read-only view of every tower.
    pub(crate) fn view(&self) -> TowerView {
        TowerView::from_snapshots(self.entries.values().map(TowerState::snapshot).collect())
    }

    /// Number of registered towers.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
