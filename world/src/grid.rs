//! Structure-of-arrays tile storage backing the flow field.

use thiserror::Error;
use warden_defence_core::{
    clamp_to_grid, FloorCode, NavigationFieldView, ObjectCode, PathCost, Tile, TilePos,
    UNREACHABLE_DISTANCE,
};

use crate::layout::GridLayout;

/// Neighbour offsets in tie-breaking order: orthogonal moves first, then diagonals.
pub(crate) const DIRECTIONS: [(i32, i32); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Reasons a direct object write may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// The coordinate is outside the grid.
    #[error("tile ({x}, {z}) lies outside the grid")]
    OutOfBounds {
        /// Requested column.
        x: i32,
        /// Requested row.
        z: i32,
    },
    /// The goal tile keeps its code for the lifetime of the grid.
    #[error("the goal tile cannot be overwritten")]
    GoalImmutable,
}

/// Which buffer a grid plays in the dual-buffer arrangement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GridRole {
    /// Authoritative grid read by every consumer.
    Committed,
    /// Scratch copy used for what-if previews; unreachable tiles keep stale hops.
    Preview,
}

/// Dense tile grid with the computed distance and next-hop fields.
#[derive(Clone, Debug)]
pub struct Grid {
    width: u32,
    height: u32,
    goal: TilePos,
    role: GridRole,
    floor: Vec<FloorCode>,
    objects: Vec<ObjectCode>,
    distances: Vec<Option<PathCost>>,
    hops: Vec<Option<TilePos>>,
}

impl Grid {
    /// Builds a grid from a validated layout with every tile unreachable.
    ///
    /// Call [`crate::recompute`] before handing the grid to consumers.
    #[must_use]
    pub fn from_layout(layout: &GridLayout, role: GridRole) -> Self {
        let tile_count = layout.objects().len();
        Self {
            width: layout.width(),
            height: layout.height(),
            goal: layout.goal(),
            role,
            floor: layout.floor().to_vec(),
            objects: layout.objects().to_vec(),
            distances: vec![None; tile_count],
            hops: vec![None; tile_count],
        }
    }

    /// Overwrites every tile array with the contents of `source`, keeping this grid's role.
    pub fn copy_from(&mut self, source: &Grid) {
        self.width = source.width;
        self.height = source.height;
        self.goal = source.goal;
        self.floor.clone_from(&source.floor);
        self.objects.clone_from(&source.objects);
        self.distances.clone_from(&source.distances);
        self.hops.clone_from(&source.hops);
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Location of the goal tile.
    #[must_use]
    pub const fn goal(&self) -> TilePos {
        self.goal
    }

    /// Role the grid plays in the dual-buffer arrangement.
    #[must_use]
    pub const fn role(&self) -> GridRole {
        self.role
    }

    /// Total number of tiles.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.objects.len()
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub fn contains(&self, pos: TilePos) -> bool {
        self.index(pos).is_some()
    }

    /// Clamps a coordinate onto the nearest in-bounds tile.
    #[must_use]
    pub fn clamp(&self, pos: TilePos) -> TilePos {
        clamp_to_grid(pos, self.width, self.height)
    }

    /// Snapshot of the tile at the clamped coordinate.
    #[must_use]
    pub fn tile(&self, pos: TilePos) -> Tile {
        let position = self.clamp(pos);
        let index = self.clamped_index(position);
        Tile {
            position,
            floor: self.floor[index],
            object: self.objects[index],
            distance: self.distances[index],
            next_hop: self.hops[index],
        }
    }

    /// Object code at the clamped coordinate.
    #[must_use]
    pub fn object(&self, pos: TilePos) -> ObjectCode {
        self.objects[self.clamped_index(pos)]
    }

    /// Shortest cost to the goal at the clamped coordinate.
    #[must_use]
    pub fn distance(&self, pos: TilePos) -> Option<PathCost> {
        self.distances[self.clamped_index(pos)]
    }

    /// Distance in tiles at the clamped coordinate, `-1.0` when unreachable.
    #[must_use]
    pub fn distance_to_goal(&self, pos: TilePos) -> f32 {
        self.distance(pos)
            .map_or(UNREACHABLE_DISTANCE, |cost| cost.as_f32())
    }

    /// Next hop at the clamped coordinate.
    #[must_use]
    pub fn next_hop(&self, pos: TilePos) -> Option<TilePos> {
        self.hops[self.clamped_index(pos)]
    }

    /// Dense distances in row-major order.
    #[must_use]
    pub fn distances(&self) -> &[Option<PathCost>] {
        &self.distances
    }

    /// Dense next hops in row-major order.
    #[must_use]
    pub fn hops(&self) -> &[Option<TilePos>] {
        &self.hops
    }

    /// Read-only view handed to path consumers.
    #[must_use]
    pub fn view(&self) -> NavigationFieldView<'_> {
        NavigationFieldView::new(
            self.width,
            self.height,
            self.goal,
            &self.distances,
            &self.hops,
        )
    }

    /// Writes a tile's object code and returns the previous one.
    ///
    /// The flow field is stale until [`crate::FieldRepairer::update_at`] or
    /// [`crate::recompute`] runs for the grid.
    pub fn set_object(&mut self, pos: TilePos, code: ObjectCode) -> Result<ObjectCode, GridError> {
        let index = self.index(pos).ok_or(GridError::OutOfBounds {
            x: pos.x(),
            z: pos.z(),
        })?;
        if pos == self.goal {
            return Err(GridError::GoalImmutable);
        }
        Ok(std::mem::replace(&mut self.objects[index], code))
    }

    pub(crate) fn index(&self, pos: TilePos) -> Option<usize> {
        let x = u32::try_from(pos.x()).ok()?;
        let z = u32::try_from(pos.z()).ok()?;
        if x >= self.width || z >= self.height {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        (z as usize).checked_mul(width)?.checked_add(x as usize)
    }

    pub(crate) fn position(&self, index: usize) -> TilePos {
        let width = self.width as usize;
        TilePos::new((index % width) as i32, (index / width) as i32)
    }

    fn clamped_index(&self, pos: TilePos) -> usize {
        let clamped = self.clamp(pos);
        clamped.z() as usize * self.width as usize + clamped.x() as usize
    }

    /// Out-of-bounds coordinates count as blocking.
    pub(crate) fn is_blocking(&self, pos: TilePos) -> bool {
        self.index(pos)
            .map_or(true, |index| self.objects[index].is_blocking())
    }

    /// Whether an agent may step directly between two adjacent tiles.
    ///
    /// Both endpoints must be open and a diagonal step also needs both corner
    /// tiles open. The relation is symmetric.
    pub(crate) fn can_step(&self, from: TilePos, to: TilePos) -> bool {
        if self.is_blocking(from) || self.is_blocking(to) {
            return false;
        }
        let dx = to.x() - from.x();
        let dz = to.z() - from.z();
        if dx != 0 && dz != 0 {
            let corner_a = TilePos::new(to.x(), from.z());
            let corner_b = TilePos::new(from.x(), to.z());
            if self.is_blocking(corner_a) || self.is_blocking(corner_b) {
                return false;
            }
        }
        true
    }

    /// In-bounds neighbours of `pos` in [`DIRECTIONS`] order with their step costs.
    pub(crate) fn neighbors(
        &self,
        pos: TilePos,
    ) -> impl Iterator<Item = (TilePos, usize, PathCost)> + '_ {
        DIRECTIONS.iter().filter_map(move |&(dx, dz)| {
            let neighbor = pos.offset(dx, dz);
            let index = self.index(neighbor)?;
            Some((neighbor, index, step_cost(dx, dz)))
        })
    }

    pub(crate) fn distance_at(&self, index: usize) -> Option<PathCost> {
        self.distances[index]
    }

    pub(crate) fn set_distance_at(&mut self, index: usize, distance: Option<PathCost>) {
        self.distances[index] = distance;
    }

    pub(crate) fn hop_at(&self, index: usize) -> Option<TilePos> {
        self.hops[index]
    }

    pub(crate) fn set_hop_at(&mut self, index: usize, hop: Option<TilePos>) {
        self.hops[index] = hop;
    }

    pub(crate) fn reset_field(&mut self) {
        self.distances.fill(None);
        self.hops.fill(None);
    }
}

pub(crate) const fn step_cost(dx: i32, dz: i32) -> PathCost {
    if dx != 0 && dz != 0 {
        PathCost::DIAGONAL
    } else {
        PathCost::ORTHOGONAL
    }
}
