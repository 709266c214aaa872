//! Committed and preview grids plus the edits that move between them.

use warden_defence_core::{FieldRepairStats, ObjectCode, PreviewSnapshot, TilePos};

use crate::{
    grid::{Grid, GridError, GridRole},
    layout::GridLayout,
    navigation::{is_any_source_blocked, recompute},
    repair::FieldRepairer,
};

/// Owns the committed grid, its preview shadow and the spawn points both are checked against.
///
/// The shadow is refreshed wholesale from the committed grid before every
/// what-if and is never copied back; committing replays the edit on the
/// committed grid instead.
#[derive(Debug)]
pub(crate) struct FieldBuffers {
    real: Grid,
    shadow: Grid,
    spawns: Vec<TilePos>,
    repairer: FieldRepairer,
    preview: Option<PreviewSnapshot>,
}

impl FieldBuffers {
    pub(crate) fn new(layout: &GridLayout) -> Self {
        let mut real = Grid::from_layout(layout, GridRole::Committed);
        recompute(&mut real);
        let mut shadow = Grid::from_layout(layout, GridRole::Preview);
        shadow.copy_from(&real);

        Self {
            real,
            shadow,
            spawns: layout.spawns().to_vec(),
            repairer: FieldRepairer::new(),
            preview: None,
        }
    }

    pub(crate) fn real(&self) -> &Grid {
        &self.real
    }

    pub(crate) fn shadow(&self) -> &Grid {
        &self.shadow
    }

    pub(crate) fn spawns(&self) -> &[TilePos] {
        &self.spawns
    }

    pub(crate) fn preview(&self) -> Option<PreviewSnapshot> {
        self.preview
    }

    /// Whether any spawn point is cut off on the committed grid.
    pub(crate) fn is_any_spawn_blocked(&self) -> bool {
        is_any_source_blocked(&self.real, &self.spawns)
    }

    /// Starts or moves the preview session onto `tile`.
    ///
    /// Open tiles are previewed as a provisional wall and blocking tiles as
    /// cleared. Returns `None` when the tile is already being previewed.
    pub(crate) fn begin_preview(
        &mut self,
        tile: TilePos,
    ) -> Result<Option<PreviewSnapshot>, GridError> {
        if self.preview.is_some_and(|preview| preview.tile == tile) {
            return Ok(None);
        }

        let current = self.tile_code(tile)?;
        let proposed = if current.is_blocking() {
            ObjectCode::EMPTY
        } else {
            ObjectCode::WALL
        };
        let blocked = self.what_if(tile, proposed)?;
        let snapshot = PreviewSnapshot {
            tile,
            current,
            proposed,
            blocked,
        };
        self.preview = Some(snapshot);
        Ok(Some(snapshot))
    }

    /// Ends the preview session, returning whether one was active.
    pub(crate) fn end_preview(&mut self) -> bool {
        self.preview.take().is_some()
    }

    /// Applies `code` at `tile` on a fresh copy of the committed grid and
    /// reports whether any spawn point loses its path.
    pub(crate) fn what_if(&mut self, tile: TilePos, code: ObjectCode) -> Result<bool, GridError> {
        self.shadow.copy_from(&self.real);
        let _stats = self.repairer.apply_edit(&mut self.shadow, tile, code)?;
        Ok(is_any_source_blocked(&self.shadow, &self.spawns))
    }

    /// Writes `code` into the committed grid and repairs its flow field.
    ///
    /// Any preview session is stale afterwards and is discarded.
    pub(crate) fn commit(
        &mut self,
        tile: TilePos,
        code: ObjectCode,
    ) -> Result<FieldRepairStats, GridError> {
        let stats = self.repairer.apply_edit(&mut self.real, tile, code)?;
        self.preview = None;
        Ok(stats)
    }

    fn tile_code(&self, tile: TilePos) -> Result<ObjectCode, GridError> {
        if !self.real.contains(tile) {
            return Err(GridError::OutOfBounds {
                x: tile.x(),
                z: tile.z(),
            });
        }
        if tile == self.real.goal() {
            return Err(GridError::GoalImmutable);
        }
        Ok(self.real.object(tile))
    }
}
