#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Warden Defence.
//!
//! The world owns the committed flow field, its preview shadow, the tower
//! registry and the monster roster. State only changes through [`apply`];
//! everything else reads through the [`query`] module.

mod buffers;
mod grid;
mod layout;
mod monsters;
mod navigation;
mod projectiles;
mod repair;
mod towers;
mod trace;

use tracing::debug;
use warden_defence_core::{
    Command, EditError, Event, ObjectCode, TilePos, TowerKindId, TowerSpec,
};

use crate::{
    buffers::FieldBuffers,
    monsters::{DamageOutcome, MonsterRoster},
    projectiles::ProjectileRegistry,
    towers::TowerRegistry,
};

pub use crate::{
    grid::{Grid, GridError, GridRole},
    layout::{GridLayout, LayoutError},
    navigation::{is_any_source_blocked, recompute},
    repair::FieldRepairer,
    trace::{trace_path, PathTrace, TraceOutcome},
};

/// Represents the authoritative Warden Defence world state.
#[derive(Debug)]
pub struct World {
    buffers: FieldBuffers,
    catalog: Vec<TowerSpec>,
    towers: TowerRegistry,
    monsters: MonsterRoster,
    projectiles: ProjectileRegistry,
    tick_index: u64,
}

impl World {
    /// Creates a world from a validated layout and the buildable tower catalog.
    ///
    /// The committed flow field is fully computed before this returns.
    #[must_use]
    pub fn from_layout(layout: &GridLayout, catalog: Vec<TowerSpec>) -> Self {
        Self {
            buffers: FieldBuffers::new(layout),
            catalog,
            towers: TowerRegistry::new(),
            monsters: MonsterRoster::new(),
            projectiles: ProjectileRegistry::new(),
            tick_index: 0,
        }
    }

    fn check_editable(&self, tile: TilePos) -> Result<ObjectCode, EditError> {
        let real = self.buffers.real();
        if !real.contains(tile) {
            return Err(EditError::OutOfBounds);
        }
        if tile == real.goal() {
            return Err(EditError::GoalTile);
        }
        Ok(real.object(tile))
    }

    fn build(
        &mut self,
        tile: TilePos,
        kind: TowerKindId,
        out: &mut Vec<Event>,
    ) -> Result<(), EditError> {
        let spec = self
            .catalog
            .get(usize::from(kind.get()))
            .ok_or(EditError::UnknownTowerKind)?;
        let current = self.check_editable(tile)?;
        if !current.is_empty() {
            return Err(EditError::Occupied);
        }

        let code = ObjectCode::tower(kind);
        let blocked = self
            .buffers
            .what_if(tile, code)
            .map_err(edit_error_from_grid)?;
        if blocked {
            return Err(EditError::WouldBlockPath);
        }

        let stats = self
            .buffers
            .commit(tile, code)
            .map_err(edit_error_from_grid)?;
        let tower = self.towers.insert(kind, spec, tile);
        debug!(
            tower = tower.get(),
            x = tile.x(),
            z = tile.z(),
            towers = self.towers.len(),
            "tower built"
        );
        out.push(Event::TowerBuilt { tower, kind, tile });
        out.push(Event::FieldRepaired { tile, stats });
        Ok(())
    }

    fn remove(&mut self, tile: TilePos, out: &mut Vec<Event>) -> Result<(), EditError> {
        let current = self.check_editable(tile)?;
        if !current.is_blocking() {
            return Err(EditError::NothingToRemove);
        }

        let stats = self
            .buffers
            .commit(tile, ObjectCode::EMPTY)
            .map_err(edit_error_from_grid)?;
        let tower = self.towers.remove_at(tile);
        out.push(Event::StructureRemoved { tile, tower });
        out.push(Event::FieldRepaired { tile, stats });
        Ok(())
    }
}

fn edit_error_from_grid(error: GridError) -> EditError {
    match error {
        GridError::OutOfBounds { .. } => EditError::OutOfBounds,
        GridError::GoalImmutable => EditError::GoalTile,
    }
}

fn reject(tile: TilePos, reason: EditError, out: &mut Vec<Event>) {
    debug!(x = tile.x(), z = tile.z(), %reason, "edit rejected");
    out.push(Event::EditRejected { tile, reason });
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.towers.advance(dt);
            out_events.push(Event::TimeAdvanced { dt });
            world.projectiles.advance(dt, out_events);
        }
        Command::BeginPreview { tile } => match world.buffers.begin_preview(tile) {
            Ok(Some(snapshot)) => out_events.push(Event::PreviewUpdated {
                tile,
                blocked: snapshot.blocked,
            }),
            Ok(None) => {}
            Err(error) => reject(tile, edit_error_from_grid(error), out_events),
        },
        Command::EndPreview => {
            if world.buffers.end_preview() {
                out_events.push(Event::PreviewCleared);
            }
        }
        Command::BuildTower { tile, kind } => {
            let had_preview = world.buffers.end_preview();
            if let Err(reason) = world.build(tile, kind, out_events) {
                reject(tile, reason, out_events);
            }
            if had_preview {
                out_events.push(Event::PreviewCleared);
            }
        }
        Command::RemoveStructure { tile } => {
            let had_preview = world.buffers.end_preview();
            if let Err(reason) = world.remove(tile, out_events) {
                reject(tile, reason, out_events);
            }
            if had_preview {
                out_events.push(Event::PreviewCleared);
            }
        }
        Command::AimTower {
            tower,
            world_offset,
        } => {
            if let Some(rotation) = world.towers.aim(tower, world_offset) {
                out_events.push(Event::TowerAimed { tower, rotation });
            } else {
                debug!(tower = tower.get(), "aim ignored");
            }
        }
        Command::SpawnMonster {
            position,
            speed,
            health,
            lane_offset,
        } => {
            let handle = world.monsters.spawn(position, speed, health, lane_offset);
            out_events.push(Event::MonsterSpawned { handle, position });
        }
        Command::MoveMonster {
            handle,
            position,
            waypoint,
            inside_map,
        } => {
            if !world
                .monsters
                .relocate(handle, position, waypoint, inside_map)
            {
                debug!(handle = handle.get(), "move ignored for unknown monster");
            }
        }
        Command::ReleaseMonster { handle } => {
            if world.monsters.release(handle) {
                out_events.push(Event::MonsterReachedGoal { handle });
            }
        }
        Command::FireTower {
            tower,
            target,
            target_position,
        } => {
            if world.towers.fire(tower, target_position) {
                out_events.push(Event::TowerFired { tower, target });
            } else {
                debug!(tower = tower.get(), "fire ignored");
            }
        }
        Command::LaunchProjectile {
            tower,
            target,
            impact,
            flight,
            damage,
            attack,
        } => {
            let projectile = world
                .projectiles
                .launch(target, impact, flight, damage, attack);
            out_events.push(Event::ProjectileLaunched {
                projectile,
                tower,
                target,
            });
        }
        Command::DamageMonster { target, amount } => match world.monsters.damage(target, amount) {
            Some(DamageOutcome::Survived { remaining }) => {
                out_events.push(Event::MonsterDamaged {
                    handle: target,
                    remaining,
                });
            }
            Some(DamageOutcome::Killed) => {
                out_events.push(Event::MonsterKilled { handle: target });
            }
            None => {}
        },
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use warden_defence_core::{
        MonsterView, NavigationFieldView, PreviewSnapshot, Tile, TilePos, TowerKindId, TowerSpec,
        TowerView,
    };

    use super::World;
    use crate::{
        grid::Grid,
        trace::{trace_path, PathTrace},
    };

    /// Committed flow field read by path consumers.
    #[must_use]
    pub fn navigation_view(world: &World) -> NavigationFieldView<'_> {
        world.buffers.real().view()
    }

    /// Committed grid backing [`navigation_view`].
    #[must_use]
    pub fn committed_grid(world: &World) -> &Grid {
        world.buffers.real()
    }

    /// Shadow flow field, available only while a preview session is active.
    #[must_use]
    pub fn preview_view(world: &World) -> Option<NavigationFieldView<'_>> {
        world
            .buffers
            .preview()
            .map(|_| world.buffers.shadow().view())
    }

    /// State of the active preview session, if any.
    #[must_use]
    pub fn preview(world: &World) -> Option<PreviewSnapshot> {
        world.buffers.preview()
    }

    /// Snapshot of a committed tile; off-map coordinates are clamped.
    #[must_use]
    pub fn tile(world: &World, pos: TilePos) -> Tile {
        world.buffers.real().tile(pos)
    }

    /// Spawn points supplied with the layout.
    #[must_use]
    pub fn spawn_points(world: &World) -> &[TilePos] {
        world.buffers.spawns()
    }

    /// Whether any spawn point is cut off from the goal on the committed grid.
    #[must_use]
    pub fn is_any_spawn_blocked(world: &World) -> bool {
        world.buffers.is_any_spawn_blocked()
    }

    /// Walks the committed hop chain from `start`.
    #[must_use]
    pub fn trace_from(world: &World, start: TilePos) -> PathTrace {
        trace_path(world.buffers.real(), start)
    }

    /// Walks the preview hop chain from `start` while a preview is active.
    #[must_use]
    pub fn preview_trace_from(world: &World, start: TilePos) -> Option<PathTrace> {
        world
            .buffers
            .preview()
            .map(|_| trace_path(world.buffers.shadow(), start))
    }

    /// Snapshot of every tower.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        world.towers.view()
    }

    /// Snapshot of every live monster.
    #[must_use]
    pub fn monster_view(world: &World) -> MonsterView {
        world.monsters.view()
    }

    /// Catalog entry for a tower kind.
    #[must_use]
    pub fn tower_spec(world: &World, kind: TowerKindId) -> Option<&TowerSpec> {
        world.catalog.get(usize::from(kind.get()))
    }

    /// Number of shots still in flight.
    #[must_use]
    pub fn projectiles_in_flight(world: &World) -> usize {
        world.projectiles.len()
    }

    /// Number of ticks applied so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}
