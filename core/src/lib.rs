#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Warden Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views such as [`NavigationFieldView`] and [`MonsterView`], and respond
//! exclusively with new command batches.

use std::time::Duration;

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Distance reported for tiles that cannot reach the goal.
pub const UNREACHABLE_DISTANCE: f32 = -1.0;

/// Planar lengths below this threshold are treated as having no direction.
pub const DIRECTION_EPSILON: f32 = 1e-6;

/// Integer tile coordinate on the navigation grid.
///
/// Coordinates are signed because spawn points may sit outside the grid;
/// accessors clamp such positions onto the nearest in-bounds tile.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TilePos {
    x: i32,
    z: i32,
}

impl TilePos {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Column index of the tile.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row index of the tile.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Returns the coordinate shifted by the provided deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            z: self.z + dz,
        }
    }

    /// World-space centre of the tile on the ground plane.
    #[must_use]
    pub fn center(self) -> Vec3 {
        Vec3::new(self.x as f32, 0.0, self.z as f32)
    }

    /// Tile containing the provided world position, rounded to the nearest centre.
    #[must_use]
    pub fn containing(position: Vec3) -> Self {
        Self {
            x: position.x.round() as i32,
            z: position.z.round() as i32,
        }
    }
}

/// Cosmetic terrain identifier; opaque to the path engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FloorCode(i32);

impl FloorCode {
    /// Wraps a raw floor identifier.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Raw floor identifier.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }
}

/// Obstruction classifier stored per tile.
///
/// `0` is empty, `1` is the goal and anything greater blocks movement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectCode(i32);

impl ObjectCode {
    /// Open ground.
    pub const EMPTY: Self = Self(0);
    /// The single goal tile every monster walks toward.
    pub const GOAL: Self = Self(1);
    /// Generic wall; also used as the provisional structure during previews.
    pub const WALL: Self = Self(2);
    /// First code reserved for towers; a tower of kind `n` is `100 + n`.
    pub const TOWER_BASE: i32 = 100;

    /// Wraps a raw object code.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Object code assigned to a tower of the provided kind.
    #[must_use]
    pub const fn tower(kind: TowerKindId) -> Self {
        Self(Self::TOWER_BASE + kind.get() as i32)
    }

    /// Raw object code.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }

    /// Reports whether the code obstructs movement.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        self.0 > 1
    }

    /// Reports whether the code marks the goal.
    #[must_use]
    pub const fn is_goal(&self) -> bool {
        self.0 == 1
    }

    /// Reports whether the tile holds nothing at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Accumulated movement cost measured in tenths of a tile.
///
/// Orthogonal steps cost `1.0` and diagonal steps `1.1`. Keeping the values
/// integral makes distances exact, so equal-cost routes compare equal and
/// tie-breaking stays reproducible.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PathCost(u32);

impl PathCost {
    /// Cost of the goal tile.
    pub const ZERO: Self = Self(0);
    /// Cost of a single orthogonal step.
    pub const ORTHOGONAL: Self = Self(10);
    /// Cost of a single diagonal step.
    pub const DIAGONAL: Self = Self(11);

    /// Creates a cost from a raw tenths value.
    #[must_use]
    pub const fn from_tenths(tenths: u32) -> Self {
        Self(tenths)
    }

    /// Raw cost in tenths of a tile.
    #[must_use]
    pub const fn tenths(&self) -> u32 {
        self.0
    }

    /// Adds two costs, saturating at the numeric ceiling.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Cost expressed in tiles.
    #[must_use]
    pub fn as_f32(&self) -> f32 {
        self.0 as f32 / 10.0
    }
}

/// Read-only snapshot of a single grid tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    /// Grid coordinate of the tile.
    pub position: TilePos,
    /// Cosmetic terrain identifier.
    pub floor: FloorCode,
    /// Obstruction classifier.
    pub object: ObjectCode,
    /// Shortest accumulated cost to the goal, `None` when unreachable.
    pub distance: Option<PathCost>,
    /// Neighbour to step toward, `None` when no path is known.
    pub next_hop: Option<TilePos>,
}

impl Tile {
    /// Distance to the goal with `-1.0` standing in for unreachable tiles.
    #[must_use]
    pub fn distance_to_goal(&self) -> f32 {
        self.distance
            .map_or(UNREACHABLE_DISTANCE, |cost| cost.as_f32())
    }
}

/// Read-only view into a flow field.
///
/// Coordinates outside the grid are clamped onto the nearest tile, matching
/// how off-map spawn points are resolved everywhere else.
#[derive(Clone, Copy, Debug)]
pub struct NavigationFieldView<'a> {
    width: u32,
    height: u32,
    goal: TilePos,
    distances: &'a [Option<PathCost>],
    hops: &'a [Option<TilePos>],
}

impl<'a> NavigationFieldView<'a> {
    /// Captures a view backed by row-major distance and hop slices.
    #[must_use]
    pub fn new(
        width: u32,
        height: u32,
        goal: TilePos,
        distances: &'a [Option<PathCost>],
        hops: &'a [Option<TilePos>],
    ) -> Self {
        Self {
            width,
            height,
            goal,
            distances,
            hops,
        }
    }

    /// Provides the dimensions of the underlying grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Location of the goal tile.
    #[must_use]
    pub const fn goal(&self) -> TilePos {
        self.goal
    }

    /// Clamps a coordinate onto the grid.
    #[must_use]
    pub fn clamp(&self, pos: TilePos) -> TilePos {
        clamp_to_grid(pos, self.width, self.height)
    }

    /// Shortest cost to the goal for the tile, if reachable.
    #[must_use]
    pub fn distance(&self, pos: TilePos) -> Option<PathCost> {
        self.index(pos)
            .and_then(|index| self.distances.get(index).copied().flatten())
    }

    /// Distance in tiles, `-1.0` when unreachable.
    #[must_use]
    pub fn distance_to_goal(&self, pos: TilePos) -> f32 {
        self.distance(pos)
            .map_or(UNREACHABLE_DISTANCE, |cost| cost.as_f32())
    }

    /// Neighbour to step toward from the tile, if any.
    #[must_use]
    pub fn next_hop(&self, pos: TilePos) -> Option<TilePos> {
        self.index(pos)
            .and_then(|index| self.hops.get(index).copied().flatten())
    }

    fn index(&self, pos: TilePos) -> Option<usize> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let clamped = self.clamp(pos);
        let width = usize::try_from(self.width).ok()?;
        let x = usize::try_from(clamped.x()).ok()?;
        let z = usize::try_from(clamped.z()).ok()?;
        z.checked_mul(width)?.checked_add(x)
    }
}

/// Clamps a coordinate into `[0, width) x [0, height)`.
///
/// Degenerate grids clamp everything onto the origin.
#[must_use]
pub fn clamp_to_grid(pos: TilePos, width: u32, height: u32) -> TilePos {
    let max_x = i32::try_from(width).unwrap_or(i32::MAX).saturating_sub(1).max(0);
    let max_z = i32::try_from(height).unwrap_or(i32::MAX).saturating_sub(1).max(0);
    TilePos::new(pos.x().clamp(0, max_x), pos.z().clamp(0, max_z))
}

/// Squared distance between two points on the XZ plane.
#[must_use]
pub fn planar_distance_sq(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    dx * dx + dz * dz
}

/// Yaw-only rotation that turns the forward axis (`+Z`) toward `direction`.
///
/// Returns `None` when the planar component is too short to define a heading.
#[must_use]
pub fn yaw_toward(direction: Vec3) -> Option<Quat> {
    let planar = Vec2::new(direction.x, direction.z);
    if planar.length_squared() <= DIRECTION_EPSILON * DIRECTION_EPSILON {
        return None;
    }
    Some(Quat::from_rotation_y(direction.x.atan2(direction.z)))
}

/// Planar unit forward vector of a rotation, if it has one.
#[must_use]
pub fn planar_forward(rotation: Quat) -> Option<Vec2> {
    let forward = rotation * Vec3::Z;
    let planar = Vec2::new(forward.x, forward.z);
    if planar.length_squared() <= DIRECTION_EPSILON * DIRECTION_EPSILON {
        return None;
    }
    Some(planar.normalize())
}

/// Opaque identifier of a dynamic target (monster).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TargetHandle(u32);

impl TargetHandle {
    /// Creates a new handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Per-tick snapshot of a targetable agent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Target {
    /// World-space position; only the XZ plane matters for range math.
    pub position: Vec3,
    /// Identifier of the agent the snapshot was taken from.
    pub handle: TargetHandle,
}

/// Target selected by a tower during the current tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that acquired the target.
    pub tower: TowerId,
    /// Agent selected as the target.
    pub target: TargetHandle,
    /// Position of the target when it was selected.
    pub target_position: Vec3,
    /// Squared planar distance between the query centre and the target.
    pub distance_sq: f32,
}

/// Unique identifier assigned to a tower.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Index into the tower catalog.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TowerKindId(u16);

impl TowerKindId {
    /// Creates a new kind identifier.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the catalog index.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }
}

/// Identifier of a shot in flight.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Targeting geometry used by a tower.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum RangeShape {
    /// Plain disc around the tower.
    Circle {
        /// Outer radius in tiles.
        max_range: f32,
    },
    /// Cone opening along the tower's logical facing.
    Sector {
        /// Outer radius in tiles.
        max_range: f32,
        /// Half of the opening angle, in radians.
        half_angle: f32,
    },
    /// Ring that ignores targets hugging the tower.
    Annulus {
        /// Inner radius in tiles.
        min_range: f32,
        /// Outer radius in tiles.
        max_range: f32,
    },
    /// Disc centred on a point offset from the tower.
    OffsetCircle {
        /// Tower-local offset rotated by the logical rotation.
        offset: Vec3,
        /// Inner radius around the shifted centre.
        min_range: f32,
        /// Outer radius around the shifted centre.
        max_range: f32,
        /// Longest offset the tower may be aimed at.
        offset_limit: f32,
    },
}

impl RangeShape {
    /// Builds a sector from its full opening angle in degrees.
    #[must_use]
    pub fn sector_from_arc_degrees(max_range: f32, arc_degrees: f32) -> Self {
        Self::Sector {
            max_range,
            half_angle: arc_degrees.to_radians() * 0.5,
        }
    }
}

/// How a tower applies damage once it fires.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttackKind {
    /// Damages only the selected target.
    Single,
    /// Damages every target around the impact point.
    Area {
        /// Radius of the blast in tiles.
        radius: f32,
    },
}

/// How a shot travels from the tower to its impact point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Delivery {
    /// Damage lands on the tick the tower fires.
    #[default]
    Direct,
    /// A projectile flies toward where the target stood when the shot was taken.
    Projectile {
        /// Travel speed in tiles per second.
        speed: f32,
    },
}

impl Delivery {
    /// Time a shot needs to cover `distance` tiles, `None` for direct hits.
    ///
    /// Projectiles without a positive finite speed never land.
    #[must_use]
    pub fn flight_time(&self, distance: f32) -> Option<Duration> {
        match *self {
            Self::Direct => None,
            Self::Projectile { speed } if speed > 0.0 && speed.is_finite() => Some(
                Duration::try_from_secs_f32(distance.max(0.0) / speed).unwrap_or(Duration::MAX),
            ),
            Self::Projectile { .. } => Some(Duration::MAX),
        }
    }
}

/// Catalog entry describing a buildable tower.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerSpec {
    /// Display name.
    pub name: String,
    /// Damage dealt per shot.
    pub damage: u32,
    /// Shots per second.
    pub attack_speed: f32,
    /// Whether the rendered turret follows its target.
    pub rotatable: bool,
    /// Targeting geometry.
    pub range: RangeShape,
    /// Damage delivery.
    pub attack: AttackKind,
    /// How shots reach the impact point.
    pub delivery: Delivery,
}

impl TowerSpec {
    /// Delay between two shots.
    ///
    /// Speeds that are not positive, or too small to express, never reload.
    #[must_use]
    pub fn reload(&self) -> Duration {
        if self.attack_speed > 0.0 && self.attack_speed.is_finite() {
            Duration::try_from_secs_f32(1.0 / self.attack_speed).unwrap_or(Duration::MAX)
        } else {
            Duration::MAX
        }
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Catalog entry the tower was built from.
    pub kind: TowerKindId,
    /// Tile the tower stands on.
    pub tile: TilePos,
    /// World-space position of the tower.
    pub position: Vec3,
    /// Rotation used for all targeting math.
    pub logical_rotation: Quat,
    /// Rotation used for rendering only.
    pub render_rotation: Quat,
    /// Current targeting geometry, including any aimed offset.
    pub range: RangeShape,
    /// Damage delivery.
    pub attack: AttackKind,
    /// How shots reach the impact point.
    pub delivery: Delivery,
    /// Damage dealt per shot.
    pub damage: u32,
    /// Whether the rendered turret follows its target.
    pub rotatable: bool,
    /// Time until the tower may fire again.
    pub ready_in: Duration,
}

/// Read-only snapshot describing all towers placed on the grid.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a tower by identifier.
    #[must_use]
    pub fn get(&self, id: TowerId) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }
}

/// Immutable representation of a single monster's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonsterSnapshot {
    /// Identifier assigned to the monster.
    pub handle: TargetHandle,
    /// World-space position.
    pub position: Vec3,
    /// Travel speed in tiles per second.
    pub speed: f32,
    /// Remaining health.
    pub health: u32,
    /// Point the monster is currently walking toward.
    pub waypoint: Option<Vec3>,
    /// Jitter added to every waypoint so crowds do not stack.
    pub lane_offset: Vec3,
    /// Whether the monster has entered the grid.
    pub inside_map: bool,
}

/// Read-only snapshot describing all live monsters.
#[derive(Clone, Debug, Default)]
pub struct MonsterView {
    snapshots: Vec<MonsterSnapshot>,
}

impl MonsterView {
    /// Creates a new monster view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<MonsterSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.handle);
        Self { snapshots }
    }

    /// Iterator over the captured monster snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &MonsterSnapshot> {
        self.snapshots.iter()
    }

    /// Targets for the spatial index, one per live monster.
    pub fn targets(&self) -> impl Iterator<Item = Target> + '_ {
        self.snapshots.iter().map(|snapshot| Target {
            position: snapshot.position,
            handle: snapshot.handle,
        })
    }

    /// Number of monsters captured in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no monsters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// State of the active build preview.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreviewSnapshot {
    /// Tile under evaluation.
    pub tile: TilePos,
    /// Code currently stored in the committed grid.
    pub current: ObjectCode,
    /// Code written into the shadow grid for the what-if.
    pub proposed: ObjectCode,
    /// Whether the proposed edit would cut a spawn point off from the goal.
    pub blocked: bool,
}

/// Work performed by a single incremental field update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRepairStats {
    /// Tiles that lost their path during invalidation.
    pub invalidated: usize,
    /// Distance writes performed while relaxing from the frontier.
    pub relaxed: usize,
    /// Tiles whose next hop was re-selected.
    pub reselected: usize,
}

/// Reasons an edit request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum EditError {
    /// The coordinate lies outside the grid.
    #[error("tile lies outside the grid")]
    OutOfBounds,
    /// The goal tile can never be built on or cleared.
    #[error("the goal tile cannot be edited")]
    GoalTile,
    /// The tile already holds a structure.
    #[error("tile is already occupied")]
    Occupied,
    /// The tile holds nothing that could be removed.
    #[error("tile holds no structure")]
    NothingToRemove,
    /// The edit would leave at least one spawn point without a path.
    #[error("edit would block every path from a spawn point")]
    WouldBlockPath,
    /// The requested tower kind is not in the catalog.
    #[error("unknown tower kind")]
    UnknownTowerKind,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Starts (or moves) the build preview onto a tile.
    BeginPreview {
        /// Tile to evaluate.
        tile: TilePos,
    },
    /// Discards the build preview.
    EndPreview,
    /// Requests construction of a tower on a tile.
    BuildTower {
        /// Tile to build on.
        tile: TilePos,
        /// Catalog entry to build.
        kind: TowerKindId,
    },
    /// Requests removal of whatever structure occupies a tile.
    RemoveStructure {
        /// Tile to clear.
        tile: TilePos,
    },
    /// Points a tower's logical rotation along a planar offset.
    AimTower {
        /// Tower to aim.
        tower: TowerId,
        /// Desired offset from the tower in world space.
        world_offset: Vec3,
    },
    /// Requests that a monster be created.
    SpawnMonster {
        /// Spawn position, possibly outside the grid.
        position: Vec3,
        /// Travel speed in tiles per second.
        speed: f32,
        /// Starting health.
        health: u32,
        /// Jitter added to every waypoint.
        lane_offset: Vec3,
    },
    /// Moves a monster to a new position.
    MoveMonster {
        /// Monster to move.
        handle: TargetHandle,
        /// New world position.
        position: Vec3,
        /// Waypoint the monster is heading toward.
        waypoint: Option<Vec3>,
        /// Whether the monster is now inside the grid.
        inside_map: bool,
    },
    /// Removes a monster that reached the goal.
    ReleaseMonster {
        /// Monster that arrived.
        handle: TargetHandle,
    },
    /// Records that a tower fired, restarting its cooldown.
    FireTower {
        /// Tower that fired.
        tower: TowerId,
        /// Target selected by the tower.
        target: TargetHandle,
        /// Position of the target when the shot was taken.
        target_position: Vec3,
    },
    /// Puts a shot in flight toward a fixed impact point.
    LaunchProjectile {
        /// Tower that fired.
        tower: TowerId,
        /// Target selected when the shot was taken.
        target: TargetHandle,
        /// Where the shot lands.
        impact: Vec3,
        /// Time until the shot lands.
        flight: Duration,
        /// Damage dealt on impact.
        damage: u32,
        /// Damage delivery on impact.
        attack: AttackKind,
    },
    /// Subtracts health from a monster.
    DamageMonster {
        /// Monster to damage.
        target: TargetHandle,
        /// Health to subtract.
        amount: u32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// The shadow grid was re-evaluated for a tile.
    PreviewUpdated {
        /// Tile under evaluation.
        tile: TilePos,
        /// Whether the proposed edit would block a spawn point.
        blocked: bool,
    },
    /// The build preview was discarded.
    PreviewCleared,
    /// A tower was committed to the grid.
    TowerBuilt {
        /// Identifier allocated to the tower.
        tower: TowerId,
        /// Catalog entry that was built.
        kind: TowerKindId,
        /// Tile the tower occupies.
        tile: TilePos,
    },
    /// A structure was cleared from the grid.
    StructureRemoved {
        /// Tile that was cleared.
        tile: TilePos,
        /// Tower that stood on the tile, if any.
        tower: Option<TowerId>,
    },
    /// An edit request was refused.
    EditRejected {
        /// Tile named in the request.
        tile: TilePos,
        /// Why the request was refused.
        reason: EditError,
    },
    /// The committed flow field was repaired after an edit.
    FieldRepaired {
        /// Tile that changed.
        tile: TilePos,
        /// Work performed by the repair.
        stats: FieldRepairStats,
    },
    /// A tower's logical rotation changed.
    TowerAimed {
        /// Tower that was aimed.
        tower: TowerId,
        /// New logical rotation.
        rotation: Quat,
    },
    /// A tower fired at a target.
    TowerFired {
        /// Tower that fired.
        tower: TowerId,
        /// Target of the shot.
        target: TargetHandle,
    },
    /// A shot was put in flight.
    ProjectileLaunched {
        /// Identifier allocated to the shot.
        projectile: ProjectileId,
        /// Tower that fired.
        tower: TowerId,
        /// Target selected when the shot was taken.
        target: TargetHandle,
    },
    /// A shot reached its impact point and must now deal its damage.
    ProjectileLanded {
        /// Shot that landed.
        projectile: ProjectileId,
        /// Target selected when the shot was taken.
        target: TargetHandle,
        /// Where the shot landed.
        impact: Vec3,
        /// Damage dealt on impact.
        damage: u32,
        /// Damage delivery on impact.
        attack: AttackKind,
    },
    /// A monster was created.
    MonsterSpawned {
        /// Identifier assigned to the monster.
        handle: TargetHandle,
        /// Spawn position.
        position: Vec3,
    },
    /// A monster lost health but survived.
    MonsterDamaged {
        /// Monster that was hit.
        handle: TargetHandle,
        /// Health left after the hit.
        remaining: u32,
    },
    /// A monster ran out of health.
    MonsterKilled {
        /// Monster that died.
        handle: TargetHandle,
    },
    /// A monster walked onto the goal tile.
    MonsterReachedGoal {
        /// Monster that arrived.
        handle: TargetHandle,
    },
}
