#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure build-mode system responsible for emitting preview, placement and removal commands.

use warden_defence_core::{Command, PreviewSnapshot, TilePos, TowerKindId};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuilderInput {
    /// Tile currently hovered by the cursor, if any.
    pub cursor_tile: Option<TilePos>,
    /// Tower kind the player confirmed building on this frame.
    pub confirm_build: Option<TowerKindId>,
    /// Indicates whether the player requested removal on this frame.
    pub remove_action: bool,
}

impl BuilderInput {
    /// Creates a new input descriptor with explicit field values.
    #[must_use]
    pub const fn new(
        cursor_tile: Option<TilePos>,
        confirm_build: Option<TowerKindId>,
        remove_action: bool,
    ) -> Self {
        Self {
            cursor_tile,
            confirm_build,
            remove_action,
        }
    }
}

/// Build-mode system that translates preview state and input into edit commands.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    requested: Option<TilePos>,
}

impl Builder {
    /// Creates a new builder system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self { requested: None }
    }

    /// Consumes the current preview and adapter-derived input to emit builder commands.
    ///
    /// A preview is requested once per hovered tile and ended when the cursor
    /// leaves the grid. Builds and removals are only emitted once the world
    /// has evaluated a preview for the hovered tile: a build needs an open
    /// tile whose preview does not block a spawn, a removal needs a blocking
    /// tile.
    pub fn handle(
        &mut self,
        preview: Option<PreviewSnapshot>,
        input: BuilderInput,
        out: &mut Vec<Command>,
    ) {
        let Some(tile) = input.cursor_tile else {
            self.requested = None;
            if preview.is_some() {
                out.push(Command::EndPreview);
            }
            return;
        };

        let evaluated = preview.filter(|snapshot| snapshot.tile == tile);
        if evaluated.is_none() && self.requested != Some(tile) {
            self.requested = Some(tile);
            out.push(Command::BeginPreview { tile });
        }

        let Some(snapshot) = evaluated else {
            return;
        };

        if let Some(kind) = input.confirm_build {
            if snapshot.current.is_empty() && !snapshot.blocked {
                self.requested = None;
                out.push(Command::BuildTower { tile, kind });
            }
        }

        if input.remove_action && snapshot.current.is_blocking() {
            self.requested = None;
            out.push(Command::RemoveStructure { tile });
        }
    }
}
