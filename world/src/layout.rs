//! Validated grid bootstrap data.

use thiserror::Error;
use warden_defence_core::{FloorCode, ObjectCode, TilePos};

/// Reasons a grid layout may be rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// Width or height was zero.
    #[error("grid dimensions must be non-zero, got {width}x{height}")]
    EmptyDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// A per-tile array did not cover the grid exactly.
    #[error("{array} holds {found} tiles but the grid needs {expected}")]
    LengthMismatch {
        /// Name of the offending array.
        array: &'static str,
        /// Tile count implied by the dimensions.
        expected: usize,
        /// Tile count actually supplied.
        found: usize,
    },
    /// The layout did not contain exactly one goal tile.
    #[error("expected exactly one goal tile, found {0}")]
    GoalCount(usize),
    /// ASCII rows had different lengths.
    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        /// Offending row.
        row: usize,
        /// Column count of the first row.
        expected: usize,
        /// Column count of the offending row.
        found: usize,
    },
    /// An ASCII map contained a character with no tile meaning.
    #[error("unknown map symbol {symbol:?} at column {column}, row {row}")]
    UnknownSymbol {
        /// Character that could not be parsed.
        symbol: char,
        /// Column of the character.
        column: usize,
        /// Row of the character.
        row: usize,
    },
}

/// Grid dimensions, per-tile codes and spawn points supplied at bootstrap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridLayout {
    width: u32,
    height: u32,
    floor: Vec<FloorCode>,
    objects: Vec<ObjectCode>,
    spawns: Vec<TilePos>,
    goal: TilePos,
}

impl GridLayout {
    /// Validates raw bootstrap arrays stored in row-major order.
    pub fn new(
        width: u32,
        height: u32,
        floor: Vec<FloorCode>,
        objects: Vec<ObjectCode>,
        spawns: Vec<TilePos>,
    ) -> Result<Self, LayoutError> {
        if width == 0 || height == 0 {
            return Err(LayoutError::EmptyDimensions { width, height });
        }

        let expected = usize::try_from(u64::from(width) * u64::from(height))
            .map_err(|_| LayoutError::EmptyDimensions { width, height })?;

        if floor.len() != expected {
            return Err(LayoutError::LengthMismatch {
                array: "floor",
                expected,
                found: floor.len(),
            });
        }
        if objects.len() != expected {
            return Err(LayoutError::LengthMismatch {
                array: "objects",
                expected,
                found: objects.len(),
            });
        }

        let width_usize = expected / height as usize;
        let mut goals = objects
            .iter()
            .enumerate()
            .filter(|(_, code)| code.is_goal())
            .map(|(index, _)| index);
        let goal_index = goals.next();
        let extra = goals.count();
        let goal = match (goal_index, extra) {
            (Some(index), 0) => TilePos::new(
                (index % width_usize) as i32,
                (index / width_usize) as i32,
            ),
            (Some(_), extra) => return Err(LayoutError::GoalCount(extra + 1)),
            (None, _) => return Err(LayoutError::GoalCount(0)),
        };

        Ok(Self {
            width,
            height,
            floor,
            objects,
            spawns,
            goal,
        })
    }

    /// Parses a map where `.` is open ground, `G` the goal and `#` a wall.
    ///
    /// The first row is `z = 0` and the first character of a row is `x = 0`.
    /// Floor codes default to zero.
    pub fn parse_ascii<S>(rows: &[S], spawns: Vec<TilePos>) -> Result<Self, LayoutError>
    where
        S: AsRef<str>,
    {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.as_ref().chars().count());
        let mut objects = Vec::with_capacity(width * height);

        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(LayoutError::RaggedRow {
                    row: row_index,
                    expected: width,
                    found,
                });
            }

            for (column, symbol) in row.chars().enumerate() {
                let code = match symbol {
                    '.' => ObjectCode::EMPTY,
                    'G' => ObjectCode::GOAL,
                    '#' => ObjectCode::WALL,
                    _ => {
                        return Err(LayoutError::UnknownSymbol {
                            symbol,
                            column,
                            row: row_index,
                        })
                    }
                };
                objects.push(code);
            }
        }

        let width = u32::try_from(width).unwrap_or(0);
        let height = u32::try_from(height).unwrap_or(0);
        let floor = vec![FloorCode::default(); objects.len()];
        Self::new(width, height, floor, objects, spawns)
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

    /// Location of the single goal tile.
    #[must_use]
    pub const fn goal(&self) -> TilePos {
        self.goal
    }

    /// Spawn points in the order they were supplied; may lie off the grid.
    #[must_use]
    pub fn spawns(&self) -> &[TilePos] {
        &self.spawns
    }

    /// Floor codes in row-major order.
    #[must_use]
    pub fn floor(&self) -> &[FloorCode] {
        &self.floor
    }

    /// Object codes in row-major order.
    #[must_use]
    pub fn objects(&self) -> &[ObjectCode] {
        &self.objects
    }
}
