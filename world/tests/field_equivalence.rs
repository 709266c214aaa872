use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use warden_defence_core::{FloorCode, ObjectCode, PathCost, TilePos};
use warden_defence_world::{recompute, FieldRepairer, Grid, GridLayout, GridRole};

const SIDE: u32 = 10;

fn random_grid(rng: &mut ChaCha8Rng, role: GridRole) -> Grid {
    let tile_count = (SIDE * SIDE) as usize;
    let goal = rng.gen_range(0..tile_count);
    let objects = (0..tile_count)
        .map(|index| {
            if index == goal {
                ObjectCode::GOAL
            } else if rng.gen_bool(0.2) {
                ObjectCode::WALL
            } else {
                ObjectCode::EMPTY
            }
        })
        .collect();
    let layout = GridLayout::new(
        SIDE,
        SIDE,
        vec![FloorCode::default(); tile_count],
        objects,
        Vec::new(),
    )
    .expect("random layout is valid");
    let mut grid = Grid::from_layout(&layout, role);
    recompute(&mut grid);
    grid
}

fn random_edit(rng: &mut ChaCha8Rng, grid: &Grid) -> (TilePos, ObjectCode) {
    loop {
        let pos = TilePos::new(
            rng.gen_range(0..SIDE as i32),
            rng.gen_range(0..SIDE as i32),
        );
        if pos == grid.goal() {
            continue;
        }
        let code = if grid.object(pos).is_blocking() {
            ObjectCode::EMPTY
        } else {
            ObjectCode::WALL
        };
        return (pos, code);
    }
}

fn assert_invariants(grid: &Grid) {
    let goal = grid.goal();
    assert_eq!(grid.distance(goal), Some(PathCost::ZERO), "goal distance");
    assert_eq!(grid.next_hop(goal), None, "goal hop");

    for z in 0..SIDE as i32 {
        for x in 0..SIDE as i32 {
            let pos = TilePos::new(x, z);
            if pos == goal {
                continue;
            }
            let tile = grid.tile(pos);
            if tile.object.is_blocking() {
                assert_eq!(tile.distance, None, "blocking tile {pos:?} has a distance");
            }
            let Some(distance) = tile.distance else {
                continue;
            };
            let hop = tile
                .next_hop
                .unwrap_or_else(|| panic!("reachable tile {pos:?} has no hop"));
            let hop_distance = grid
                .distance(hop)
                .unwrap_or_else(|| panic!("hop of {pos:?} is unreachable"));
            assert!(
                hop_distance < distance,
                "path from {pos:?} does not descend"
            );
        }
    }
}

#[test]
fn incremental_updates_match_full_recompute() {
    for seed in 0..24 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut grid = random_grid(&mut rng, GridRole::Committed);
        let mut repairer = FieldRepairer::new();

        for step in 0..80 {
            let (pos, code) = random_edit(&mut rng, &grid);
            let _ = repairer
                .apply_edit(&mut grid, pos, code)
                .expect("edit inside grid");

            let mut expected = grid.clone();
            recompute(&mut expected);
            assert_eq!(
                grid.distances(),
                expected.distances(),
                "distances diverged at seed {seed} step {step} after editing {pos:?}"
            );
            assert_eq!(
                grid.hops(),
                expected.hops(),
                "hops diverged at seed {seed} step {step} after editing {pos:?}"
            );
            assert_invariants(&grid);
        }
    }
}

#[test]
fn preview_role_matches_recompute_on_reachable_tiles() {
    for seed in 100..112 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut grid = random_grid(&mut rng, GridRole::Preview);
        let mut repairer = FieldRepairer::new();

        for _ in 0..40 {
            let (pos, code) = random_edit(&mut rng, &grid);
            let _ = repairer
                .apply_edit(&mut grid, pos, code)
                .expect("edit inside grid");
        }

        let mut expected = grid.clone();
        recompute(&mut expected);
        assert_eq!(grid.distances(), expected.distances(), "seed {seed}");
        for (index, distance) in grid.distances().iter().enumerate() {
            if distance.is_some() {
                assert_eq!(
                    grid.hops()[index],
                    expected.hops()[index],
                    "seed {seed} tile {index}"
                );
            }
        }
    }
}

#[test]
fn repeated_recompute_is_stable() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut grid = random_grid(&mut rng, GridRole::Committed);
    let first = (grid.distances().to_vec(), grid.hops().to_vec());

    recompute(&mut grid);

    assert_eq!(grid.distances(), first.0.as_slice());
    assert_eq!(grid.hops(), first.1.as_slice());
    assert_invariants(&grid);
}

#[test]
fn toggling_twice_restores_original_field() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut grid = random_grid(&mut rng, GridRole::Committed);
    let original = (grid.distances().to_vec(), grid.hops().to_vec());
    let mut repairer = FieldRepairer::new();

    for _ in 0..20 {
        let (pos, code) = random_edit(&mut rng, &grid);
        let previous = grid.object(pos);
        let _ = repairer.apply_edit(&mut grid, pos, code).expect("edit");
        let _ = repairer.apply_edit(&mut grid, pos, previous).expect("undo");

        assert_eq!(grid.distances(), original.0.as_slice());
        assert_eq!(grid.hops(), original.1.as_slice());
    }
}
