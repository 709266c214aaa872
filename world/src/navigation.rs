//! Full flow-field solver and the hop rules shared with incremental repair.

use std::{cmp::Reverse, collections::BinaryHeap};

use warden_defence_core::{PathCost, TilePos};

use crate::grid::Grid;

/// Min-heap of `(distance in tenths, tile index)` pairs.
pub(crate) type Frontier = BinaryHeap<Reverse<(u32, usize)>>;

/// Recomputes every distance and next hop from scratch.
///
/// Every tile is reset to unreachable, then a Dijkstra sweep seeded from the
/// goal assigns exact shortest costs over the eight grid directions. Hops are
/// selected afterwards from the settled distances.
pub fn recompute(grid: &mut Grid) {
    grid.reset_field();

    let Some(goal_index) = grid.index(grid.goal()) else {
        return;
    };
    grid.set_distance_at(goal_index, Some(PathCost::ZERO));

    let mut frontier = Frontier::new();
    frontier.push(Reverse((0, goal_index)));
    let _ = relax(grid, &mut frontier, |_| {});

    for index in 0..grid.tile_count() {
        if grid.distance_at(index).is_some() {
            let pos = grid.position(index);
            let hop = select_hop(grid, pos);
            grid.set_hop_at(index, hop);
        }
    }
}

/// Label-correcting Dijkstra over the queued frontier.
///
/// A neighbour is rewritten when it has no distance yet or the candidate is
/// strictly shorter; stale heap entries are skipped lazily. `on_update` sees
/// the index of every rewritten tile. Returns the number of rewrites.
pub(crate) fn relax<F>(grid: &mut Grid, frontier: &mut Frontier, mut on_update: F) -> usize
where
    F: FnMut(usize),
{
    let mut updates = 0;

    while let Some(Reverse((cost, index))) = frontier.pop() {
        let current = PathCost::from_tenths(cost);
        if grid.distance_at(index) != Some(current) {
            continue;
        }

        let pos = grid.position(index);
        let neighbors: Vec<(TilePos, usize, PathCost)> = grid.neighbors(pos).collect();
        for (neighbor, neighbor_index, step) in neighbors {
            if !grid.can_step(neighbor, pos) {
                continue;
            }

            let candidate = current.saturating_add(step);
            let improves = grid
                .distance_at(neighbor_index)
                .map_or(true, |existing| candidate < existing);
            if !improves {
                continue;
            }

            grid.set_distance_at(neighbor_index, Some(candidate));
            frontier.push(Reverse((candidate.tenths(), neighbor_index)));
            on_update(neighbor_index);
            updates += 1;
        }
    }

    updates
}

/// Canonical next hop for a tile given the current distances.
///
/// The hop is the first neighbour in direction order that can be stepped to
/// and whose distance plus the step cost equals the tile's own distance. The
/// goal and unreachable tiles have no hop.
pub(crate) fn select_hop(grid: &Grid, pos: TilePos) -> Option<TilePos> {
    if pos == grid.goal() {
        return None;
    }
    let own = grid.distance_at(grid.index(pos)?)?;

    grid.neighbors(pos)
        .find(|&(neighbor, neighbor_index, step)| {
            grid.distance_at(neighbor_index)
                .is_some_and(|distance| distance.saturating_add(step) == own)
                && grid.can_step(pos, neighbor)
        })
        .map(|(neighbor, _, _)| neighbor)
}

/// Reports whether any source tile has lost its path to the goal.
///
/// Sources outside the grid are clamped onto the nearest tile; an empty
/// source list is never blocked.
#[must_use]
pub fn is_any_source_blocked(grid: &Grid, sources: &[TilePos]) -> bool {
    sources
        .iter()
        .any(|&source| grid.distance(source).is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{grid::GridRole, layout::GridLayout};

    fn solved(rows: &[&str]) -> Grid {
        let layout = GridLayout::parse_ascii(rows, Vec::new()).expect("layout");
        let mut grid = Grid::from_layout(&layout, GridRole::Committed);
        recompute(&mut grid);
        grid
    }

    #[test]
    fn recompute_sets_goal_to_zero() {
        let grid = solved(&["...", "...", "..G"]);

        assert_eq!(grid.distance(TilePos::new(2, 2)), Some(PathCost::ZERO));
        assert_eq!(grid.next_hop(TilePos::new(2, 2)), None);
    }

    #[test]
    fn recompute_prefers_diagonals_on_open_ground() {
        let grid = solved(&[".....", ".....", ".....", ".....", "....G"]);

        assert_eq!(grid.distance(TilePos::new(0, 0)), Some(PathCost::from_tenths(44)));
        assert!((grid.distance_to_goal(TilePos::new(0, 0)) - 4.4).abs() < 1e-5);
        assert_eq!(grid.next_hop(TilePos::new(0, 0)), Some(TilePos::new(1, 1)));
        assert_eq!(grid.distance(TilePos::new(0, 4)), Some(PathCost::from_tenths(40)));
        assert_eq!(grid.next_hop(TilePos::new(0, 4)), Some(TilePos::new(1, 4)));
    }

    #[test]
    fn walls_stay_unreachable() {
        let grid = solved(&["..#", "..G"]);

        assert_eq!(grid.distance(TilePos::new(2, 0)), None);
        assert_eq!(grid.distance_to_goal(TilePos::new(2, 0)), -1.0);
        assert_eq!(grid.next_hop(TilePos::new(2, 0)), None);
    }

    #[test]
    fn diagonal_between_blocked_corners_is_rejected() {
        let grid = solved(&[".#.", "#G.", "..."]);

        assert_eq!(grid.distance(TilePos::new(0, 0)), None);
        assert_eq!(grid.next_hop(TilePos::new(0, 0)), None);
    }

    #[test]
    fn single_blocked_corner_forces_detour() {
        let grid = solved(&[".#", ".G"]);

        assert_eq!(grid.distance(TilePos::new(0, 0)), Some(PathCost::from_tenths(20)));
        assert_eq!(grid.next_hop(TilePos::new(0, 0)), Some(TilePos::new(0, 1)));
    }

    #[test]
    fn relax_reports_each_rewritten_tile() {
        let layout = GridLayout::parse_ascii(&["..G"], Vec::new()).expect("layout");
        let mut grid = Grid::from_layout(&layout, GridRole::Committed);
        grid.reset_field();
        let goal = grid.index(grid.goal()).expect("goal index");
        grid.set_distance_at(goal, Some(PathCost::ZERO));
        let mut frontier = Frontier::new();
        frontier.push(Reverse((0, goal)));
        let mut seen = Vec::new();

        let updates = relax(&mut grid, &mut frontier, |index| seen.push(index));

        assert_eq!(updates, 2);
        assert_eq!(seen, vec![1, 0]);
        assert_eq!(grid.distance(TilePos::new(0, 0)), Some(PathCost::from_tenths(20)));
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut grid = solved(&["..#..", ".#...", "...#.", "#...G"]);
        let distances = grid.distances().to_vec();
        let hops = grid.hops().to_vec();

        recompute(&mut grid);

        assert_eq!(grid.distances(), distances.as_slice());
        assert_eq!(grid.hops(), hops.as_slice());
    }

    #[test]
    fn off_map_sources_are_clamped() {
        let grid = solved(&["#..", "..G"]);

        assert!(is_any_source_blocked(&grid, &[TilePos::new(-3, -3)]));
        assert!(!is_any_source_blocked(&grid, &[TilePos::new(-3, 1)]));
        assert!(!is_any_source_blocked(&grid, &[]));
    }
}
