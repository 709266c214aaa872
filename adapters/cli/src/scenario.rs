//! TOML scenario files describing a headless run.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use glam::Vec3;
use serde::Deserialize;
use warden_defence_core::{AttackKind, Delivery, RangeShape, TilePos, TowerKindId, TowerSpec};
use warden_defence_world::GridLayout;

/// Top-level scenario document.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    /// Number of ticks to simulate unless overridden on the command line.
    #[serde(default = "default_ticks")]
    pub(crate) ticks: u64,
    /// Simulated time per tick in milliseconds.
    #[serde(default = "default_tick_millis")]
    pub(crate) tick_millis: u64,
    /// Seed for lane jitter unless overridden on the command line.
    #[serde(default)]
    pub(crate) seed: u64,
    pub(crate) map: MapConfig,
    #[serde(default)]
    pub(crate) towers: Vec<TowerConfig>,
    #[serde(default)]
    pub(crate) edits: Vec<ScriptedEdit>,
    pub(crate) monsters: MonsterConfig,
}

fn default_ticks() -> u64 {
    600
}

fn default_tick_millis() -> u64 {
    50
}

/// ASCII map and spawn points.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct MapConfig {
    pub(crate) rows: Vec<String>,
    pub(crate) spawns: Vec<TilePos>,
}

/// Catalog entry as written in scenario files.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TowerConfig {
    name: String,
    damage: u32,
    attack_speed: f32,
    #[serde(default)]
    rotatable: bool,
    range: RangeConfig,
    #[serde(default)]
    attack: AttackConfig,
    #[serde(default)]
    delivery: DeliveryConfig,
}

impl TowerConfig {
    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.attack_speed.is_finite() && self.attack_speed > 0.0,
            "tower {} needs a positive attack_speed",
            self.name
        );
        if let DeliveryConfig::Projectile { speed } = self.delivery {
            anyhow::ensure!(
                speed.is_finite() && speed > 0.0,
                "tower {} needs a positive projectile speed",
                self.name
            );
        }
        Ok(())
    }
}

/// Damage applied on impact.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum AttackConfig {
    #[default]
    Single,
    Area {
        radius: f32,
    },
}

impl From<AttackConfig> for AttackKind {
    fn from(config: AttackConfig) -> Self {
        match config {
            AttackConfig::Single => Self::Single,
            AttackConfig::Area { radius } => Self::Area { radius },
        }
    }
}

/// How shots travel to their impact point.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum DeliveryConfig {
    #[default]
    Direct,
    Projectile {
        speed: f32,
    },
}

impl From<DeliveryConfig> for Delivery {
    fn from(config: DeliveryConfig) -> Self {
        match config {
            DeliveryConfig::Direct => Self::Direct,
            DeliveryConfig::Projectile { speed } => Self::Projectile { speed },
        }
    }
}

/// Range shapes use degrees for sector arcs.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum RangeConfig {
    Circle {
        max_range: f32,
    },
    Sector {
        max_range: f32,
        arc_degrees: f32,
    },
    Annulus {
        min_range: f32,
        max_range: f32,
    },
    OffsetCircle {
        #[serde(default)]
        offset: [f32; 3],
        #[serde(default)]
        min_range: f32,
        max_range: f32,
        offset_limit: f32,
    },
}

impl From<RangeConfig> for RangeShape {
    fn from(config: RangeConfig) -> Self {
        match config {
            RangeConfig::Circle { max_range } => Self::Circle { max_range },
            RangeConfig::Sector {
                max_range,
                arc_degrees,
            } => Self::sector_from_arc_degrees(max_range, arc_degrees),
            RangeConfig::Annulus {
                min_range,
                max_range,
            } => Self::Annulus {
                min_range,
                max_range,
            },
            RangeConfig::OffsetCircle {
                offset,
                min_range,
                max_range,
                offset_limit,
            } => Self::OffsetCircle {
                offset: Vec3::from_array(offset),
                min_range,
                max_range,
                offset_limit,
            },
        }
    }
}

impl From<TowerConfig> for TowerSpec {
    fn from(config: TowerConfig) -> Self {
        Self {
            name: config.name,
            damage: config.damage,
            attack_speed: config.attack_speed,
            rotatable: config.rotatable,
            range: config.range.into(),
            attack: config.attack.into(),
            delivery: config.delivery.into(),
        }
    }
}

/// Scripted edit applied once `tick` is reached.
///
/// With `build` set the builder places that catalog entry, then aims it
/// along `aim` if given. With only `aim` set the tower already on the tile
/// is turned. With neither the structure on the tile is removed.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScriptedEdit {
    pub(crate) tick: u64,
    pub(crate) x: i32,
    pub(crate) z: i32,
    #[serde(default)]
    pub(crate) build: Option<u16>,
    /// Planar `[x, z]` offset for the tower's logical facing.
    #[serde(default)]
    pub(crate) aim: Option<[f32; 2]>,
}

impl ScriptedEdit {
    pub(crate) const fn tile(&self) -> TilePos {
        TilePos::new(self.x, self.z)
    }

    pub(crate) fn kind(&self) -> Option<TowerKindId> {
        self.build.map(TowerKindId::new)
    }

    pub(crate) fn aim_offset(&self) -> Option<Vec3> {
        self.aim.map(|[x, z]| Vec3::new(x, 0.0, z))
    }

    pub(crate) fn is_aim_only(&self) -> bool {
        self.build.is_none() && self.aim.is_some()
    }

    pub(crate) fn is_removal(&self) -> bool {
        self.build.is_none() && self.aim.is_none()
    }
}

/// Fixed-cadence spawner settings.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct MonsterConfig {
    /// Ticks between spawns at every spawn point.
    pub(crate) every_ticks: u64,
    /// Total monsters spawned over the run.
    pub(crate) limit: u32,
    pub(crate) speed: f32,
    pub(crate) health: u32,
    /// Maximum lane offset along each planar axis.
    #[serde(default = "default_lane_jitter")]
    pub(crate) lane_jitter: f32,
}

fn default_lane_jitter() -> f32 {
    0.3
}

impl Scenario {
    /// Reads and parses a scenario file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to load scenario {}", path.display()))
    }

    /// Parses scenario TOML contents.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let scenario: Self =
            toml::from_str(contents).context("failed to parse scenario toml contents")?;
        anyhow::ensure!(
            scenario.monsters.every_ticks > 0,
            "monsters.every_ticks must be positive"
        );
        for tower in &scenario.towers {
            tower.validate()?;
        }
        Ok(scenario)
    }

    /// Validates the map rows into a grid layout.
    pub(crate) fn layout(&self) -> Result<GridLayout> {
        GridLayout::parse_ascii(self.map.rows.as_slice(), self.map.spawns.clone())
            .context("scenario map is not a valid layout")
    }

    /// Tower catalog in declaration order.
    pub(crate) fn catalog(&self) -> Vec<TowerSpec> {
        self.towers.iter().cloned().map(TowerSpec::from).collect()
    }

    pub(crate) const fn tick_length(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}
