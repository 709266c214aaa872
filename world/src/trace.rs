//! Bounded walk along the next-hop chain.

use tracing::warn;
use warden_defence_core::TilePos;

use crate::grid::Grid;

/// How a path trace ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TraceOutcome {
    /// The walk arrived at the goal tile.
    ReachedGoal,
    /// A tile without a next hop was met before the goal.
    Broken,
    /// The iteration cap was exhausted, meaning the hop chain loops.
    Runaway,
}

/// Tiles visited by a trace together with how it ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathTrace {
    /// Visited tiles in walking order, starting with the raw start when it was off the grid.
    pub tiles: Vec<TilePos>,
    /// How the walk ended.
    pub outcome: TraceOutcome,
}

impl PathTrace {
    /// Reports whether the walk reached the goal.
    #[must_use]
    pub fn reached_goal(&self) -> bool {
        self.outcome == TraceOutcome::ReachedGoal
    }
}

/// Follows next hops from `start` until the goal, a dead end or the iteration cap.
///
/// The cap is one more than the tile count, so a corrupted hop chain can
/// never loop forever.
#[must_use]
pub fn trace_path(grid: &Grid, start: TilePos) -> PathTrace {
    let mut tiles = Vec::new();
    if !grid.contains(start) {
        tiles.push(start);
    }

    let goal = grid.goal();
    let cap = grid.tile_count().saturating_add(1);
    let mut current = grid.clamp(start);

    for _ in 0..cap {
        tiles.push(current);
        if current == goal {
            return PathTrace {
                tiles,
                outcome: TraceOutcome::ReachedGoal,
            };
        }
        match grid.next_hop(current) {
            Some(next) => current = next,
            None => {
                return PathTrace {
                    tiles,
                    outcome: TraceOutcome::Broken,
                }
            }
        }
    }

    warn!(
        x = start.x(),
        z = start.z(),
        cap,
        "path trace exceeded its iteration cap"
    );
    PathTrace {
        tiles,
        outcome: TraceOutcome::Runaway,
    }
}
