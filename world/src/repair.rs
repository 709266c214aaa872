//! Incremental flow-field repair after a single-tile edit.

use std::{cmp::Reverse, collections::VecDeque};

use tracing::{debug, warn};
use warden_defence_core::{FieldRepairStats, ObjectCode, TilePos};

use crate::{
    grid::{Grid, GridError, GridRole},
    navigation::{recompute, relax, select_hop, Frontier},
};

/// Reusable scratch state for [`FieldRepairer::update_at`].
///
/// Membership marks are epoch-stamped so a repair never has to clear arrays
/// sized to the whole grid.
#[derive(Debug, Default)]
pub struct FieldRepairer {
    epoch: u32,
    invalidated_marks: Vec<u32>,
    touched_marks: Vec<u32>,
    reselected_marks: Vec<u32>,
    invalidated: Vec<usize>,
    touched: Vec<usize>,
    queue: VecDeque<usize>,
    frontier: Frontier,
}

impl FieldRepairer {
    /// Creates a repairer with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes an object code and repairs the flow field around it.
    pub fn apply_edit(
        &mut self,
        grid: &mut Grid,
        pos: TilePos,
        code: ObjectCode,
    ) -> Result<FieldRepairStats, GridError> {
        let _previous = grid.set_object(pos, code)?;
        Ok(self.update_at(grid, pos))
    }

    /// Restores the flow-field invariant after the object code at `pos` changed.
    ///
    /// Invalidates the subtree of tiles whose path ran through the edit, seeds
    /// a Dijkstra from the still-valid tiles bordering that region and
    /// re-selects hops wherever a distance or step validity may have changed.
    /// The result is identical to [`recompute`] while only touching the
    /// affected region.
    pub fn update_at(&mut self, grid: &mut Grid, pos: TilePos) -> FieldRepairStats {
        let pos = grid.clamp(pos);
        if pos == grid.goal() {
            warn!(x = pos.x(), z = pos.z(), "edit on goal tile, recomputing full field");
            recompute(grid);
            return FieldRepairStats {
                invalidated: 0,
                relaxed: 0,
                reselected: grid.tile_count(),
            };
        }
        let Some(origin) = grid.index(pos) else {
            return FieldRepairStats::default();
        };

        self.begin(grid.tile_count());

        let invalidated = self.invalidate(grid, origin);
        self.seed_frontier(grid);

        let epoch = self.epoch;
        let touched_marks = &mut self.touched_marks;
        let touched = &mut self.touched;
        let relaxed = relax(grid, &mut self.frontier, |index| {
            if touched_marks[index] != epoch {
                touched_marks[index] = epoch;
                touched.push(index);
            }
        });

        let reselected = self.reselect(grid, pos);

        let stats = FieldRepairStats {
            invalidated,
            relaxed,
            reselected,
        };
        debug!(
            x = pos.x(),
            z = pos.z(),
            invalidated = stats.invalidated,
            relaxed = stats.relaxed,
            reselected = stats.reselected,
            "flow field repaired"
        );
        stats
    }

    fn begin(&mut self, tile_count: usize) {
        for marks in [
            &mut self.invalidated_marks,
            &mut self.touched_marks,
            &mut self.reselected_marks,
        ] {
            if marks.len() != tile_count {
                marks.clear();
                marks.resize(tile_count, 0);
            }
        }

        self.epoch = match self.epoch.checked_add(1) {
            Some(epoch) => epoch,
            None => {
                self.invalidated_marks.fill(0);
                self.touched_marks.fill(0);
                self.reselected_marks.fill(0);
                1
            }
        };

        self.invalidated.clear();
        self.touched.clear();
        self.queue.clear();
        self.frontier.clear();
    }

    fn mark_invalid(&mut self, grid: &mut Grid, index: usize) {
        if self.invalidated_marks[index] == self.epoch {
            return;
        }
        self.invalidated_marks[index] = self.epoch;
        self.invalidated.push(index);
        self.queue.push_back(index);

        grid.set_distance_at(index, None);
        if grid.role() == GridRole::Committed {
            grid.set_hop_at(index, None);
        }
    }

    /// Phase one: collects every tile whose stored path can no longer be walked.
    fn invalidate(&mut self, grid: &mut Grid, origin: usize) -> usize {
        let pos = grid.position(origin);
        self.mark_invalid(grid, origin);

        if grid.is_blocking(pos) {
            let cut: Vec<usize> = grid
                .neighbors(pos)
                .filter(|&(neighbor, neighbor_index, _)| {
                    grid.distance_at(neighbor_index).is_some()
                        && grid
                            .hop_at(neighbor_index)
                            .is_some_and(|hop| !grid.can_step(neighbor, hop))
                })
                .map(|(_, neighbor_index, _)| neighbor_index)
                .collect();
            for index in cut {
                self.mark_invalid(grid, index);
            }
        }

        while let Some(index) = self.queue.pop_front() {
            let parent = grid.position(index);
            let children: Vec<usize> = grid
                .neighbors(parent)
                .filter(|&(_, neighbor_index, _)| {
                    grid.distance_at(neighbor_index).is_some()
                        && grid.hop_at(neighbor_index) == Some(parent)
                })
                .map(|(_, neighbor_index, _)| neighbor_index)
                .collect();
            for child in children {
                self.mark_invalid(grid, child);
            }
        }

        self.invalidated.len()
    }

    /// Phase two: queues every still-valid tile bordering the invalidated region.
    fn seed_frontier(&mut self, grid: &Grid) {
        for &index in &self.invalidated {
            let pos = grid.position(index);
            for (_, neighbor_index, _) in grid.neighbors(pos) {
                if self.invalidated_marks[neighbor_index] == self.epoch {
                    continue;
                }
                if let Some(distance) = grid.distance_at(neighbor_index) {
                    self.frontier
                        .push(Reverse((distance.tenths(), neighbor_index)));
                }
            }
        }
    }

    /// Re-selects hops for changed tiles, their neighbours and the 3x3 block
    /// around the edit.
    fn reselect(&mut self, grid: &mut Grid, pos: TilePos) -> usize {
        let mut candidates: Vec<usize> = Vec::new();
        let epoch = self.epoch;
        let marks = &mut self.reselected_marks;
        let mut add = |index: usize| {
            if marks[index] != epoch {
                marks[index] = epoch;
                candidates.push(index);
            }
        };

        if let Some(origin) = grid.index(pos) {
            add(origin);
        }
        for (_, index, _) in grid.neighbors(pos) {
            add(index);
        }
        for &index in self.invalidated.iter().chain(self.touched.iter()) {
            add(index);
            for (_, neighbor_index, _) in grid.neighbors(grid.position(index)) {
                add(neighbor_index);
            }
        }

        let goal = grid.goal();
        for &index in &candidates {
            let tile = grid.position(index);
            if tile == goal {
                continue;
            }
            if grid.distance_at(index).is_some() {
                let hop = select_hop(grid, tile);
                grid.set_hop_at(index, hop);
            } else if grid.role() == GridRole::Committed {
                grid.set_hop_at(index, None);
            }
        }

        candidates.len()
    }
}
