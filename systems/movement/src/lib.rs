#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that walks monsters along the flow field.

use std::time::Duration;

use glam::{Vec2, Vec3};
use tracing::debug;
use warden_defence_core::{
    Command, Event, MonsterSnapshot, MonsterView, NavigationFieldView, PathCost, TilePos,
};

/// Planar distance under which a waypoint counts as reached.
pub const ARRIVAL_THRESHOLD: f32 = 0.05;

/// Pure system that reacts to world events and emits movement commands.
#[derive(Debug, Default)]
pub struct Movement {
    scratch: Vec<Command>,
}

impl Movement {
    /// Creates a new movement system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events and immutable views to emit movement commands.
    ///
    /// Monsters only move on ticks that advanced time. Off-map monsters walk
    /// straight toward the nearest in-bounds point; inside the grid a monster
    /// without a waypoint reads the flow field at its rounded tile and either
    /// heads for the next hop, holds when the tile is unreachable, or is
    /// released on the goal.
    pub fn handle(
        &mut self,
        events: &[Event],
        monsters: &MonsterView,
        navigation: NavigationFieldView<'_>,
        out: &mut Vec<Command>,
    ) {
        let elapsed: Duration = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .sum();
        if elapsed.is_zero() || monsters.is_empty() {
            return;
        }

        let (width, height) = navigation.dimensions();
        if width == 0 || height == 0 {
            return;
        }

        self.scratch.clear();
        let dt = elapsed.as_secs_f32();
        for monster in monsters.iter() {
            plan(monster, &navigation, dt, &mut self.scratch);
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn plan(
    monster: &MonsterSnapshot,
    navigation: &NavigationFieldView<'_>,
    dt: f32,
    out: &mut Vec<Command>,
) {
    let budget = monster.speed.max(0.0) * dt;
    let mut position = monster.position;
    let mut waypoint = monster.waypoint;
    let mut inside_map = monster.inside_map;

    if !inside_map {
        let entry = entry_point(position, navigation);
        if planar_gap(position, entry) <= ARRIVAL_THRESHOLD {
            inside_map = true;
            waypoint = None;
        } else {
            position = step_toward(position, entry, budget);
            push_move(monster, position, None, false, out);
            return;
        }
    }

    let needs_waypoint =
        waypoint.map_or(true, |point| planar_gap(position, point) < ARRIVAL_THRESHOLD);
    if needs_waypoint {
        let tile = navigation.clamp(TilePos::containing(position));
        match navigation.distance(tile) {
            Some(PathCost::ZERO) => {
                debug!(handle = monster.handle.get(), "monster reached goal");
                out.push(Command::ReleaseMonster {
                    handle: monster.handle,
                });
                return;
            }
            Some(_) => {
                waypoint = navigation.next_hop(tile).map(|hop| {
                    let center = hop.center() + monster.lane_offset;
                    Vec3::new(center.x, position.y, center.z)
                });
            }
            None => waypoint = None,
        }
    }

    if let Some(point) = waypoint {
        position = step_toward(position, point, budget);
    }
    push_move(monster, position, waypoint, inside_map, out);
}

fn push_move(
    monster: &MonsterSnapshot,
    position: Vec3,
    waypoint: Option<Vec3>,
    inside_map: bool,
    out: &mut Vec<Command>,
) {
    if position == monster.position
        && waypoint == monster.waypoint
        && inside_map == monster.inside_map
    {
        return;
    }
    out.push(Command::MoveMonster {
        handle: monster.handle,
        position,
        waypoint,
        inside_map,
    });
}

fn entry_point(position: Vec3, navigation: &NavigationFieldView<'_>) -> Vec3 {
    let (width, height) = navigation.dimensions();
    let max_x = width.saturating_sub(1) as f32;
    let max_z = height.saturating_sub(1) as f32;
    Vec3::new(
        position.x.clamp(0.0, max_x),
        position.y,
        position.z.clamp(0.0, max_z),
    )
}

fn planar_gap(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(b.x - a.x, b.z - a.z).length()
}

/// Moves up to `budget` along the plane without passing `target`.
fn step_toward(position: Vec3, target: Vec3, budget: f32) -> Vec3 {
    let delta = Vec2::new(target.x - position.x, target.z - position.z);
    let gap = delta.length();
    if gap <= budget || gap <= f32::EPSILON {
        return Vec3::new(target.x, position.y, target.z);
    }
    let step = delta * (budget / gap);
    Vec3::new(position.x + step.x, position.y, position.z + step.y)
}
