//! Headless tick loop wiring the systems to the world.

use std::{collections::VecDeque, time::Duration};

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};
use warden_defence_core::{Command, Event, TilePos, TowerId, TowerKindId, TowerTarget};
use warden_defence_system_builder::{Builder, BuilderInput};
use warden_defence_system_movement::Movement;
use warden_defence_system_tower_combat::TowerCombat;
use warden_defence_system_tower_targeting::TowerTargeting;
use warden_defence_world::{self as world, query, World};

use crate::scenario::{MonsterConfig, Scenario, ScriptedEdit};

/// Tallies gathered from the event stream of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) ticks: u64,
    pub(crate) spawned: u32,
    pub(crate) killed: u32,
    pub(crate) reached_goal: u32,
    pub(crate) towers_built: u32,
    pub(crate) structures_removed: u32,
    pub(crate) edits_rejected: u32,
    pub(crate) previews_blocked: u32,
    pub(crate) shots: u32,
    pub(crate) projectiles_landed: u32,
}

impl Summary {
    fn record(&mut self, event: &Event) {
        match event {
            Event::MonsterSpawned { .. } => self.spawned += 1,
            Event::MonsterKilled { .. } => self.killed += 1,
            Event::MonsterReachedGoal { .. } => self.reached_goal += 1,
            Event::TowerBuilt { .. } => self.towers_built += 1,
            Event::StructureRemoved { .. } => self.structures_removed += 1,
            Event::EditRejected { .. } => self.edits_rejected += 1,
            Event::PreviewUpdated { blocked: true, .. } => self.previews_blocked += 1,
            Event::TowerFired { .. } => self.shots += 1,
            Event::ProjectileLanded { .. } => self.projectiles_landed += 1,
            Event::FieldRepaired { tile, stats } => debug!(
                x = tile.x(),
                z = tile.z(),
                invalidated = stats.invalidated,
                relaxed = stats.relaxed,
                reselected = stats.reselected,
                "field repaired"
            ),
            _ => {}
        }
    }
}

/// Owns the world together with every system and the scripted inputs.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    builder: Builder,
    targeting: TowerTargeting,
    combat: TowerCombat,
    movement: Movement,
    edits: VecDeque<ScriptedEdit>,
    monsters: MonsterConfig,
    rng: ChaCha8Rng,
    tick: Duration,
    summary: Summary,
    targets: Vec<TowerTarget>,
}

impl Simulation {
    pub(crate) fn new(scenario: &Scenario, seed: u64) -> anyhow::Result<Self> {
        let layout = scenario.layout()?;
        let mut edits: Vec<ScriptedEdit> = scenario.edits.clone();
        edits.sort_by_key(|edit| edit.tick);

        Ok(Self {
            world: World::from_layout(&layout, scenario.catalog()),
            builder: Builder::new(),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            movement: Movement::new(),
            edits: edits.into(),
            monsters: scenario.monsters,
            rng: ChaCha8Rng::seed_from_u64(seed),
            tick: scenario.tick_length(),
            summary: Summary::default(),
            targets: Vec::new(),
        })
    }

    /// Runs `ticks` ticks and returns the accumulated summary.
    pub(crate) fn run(&mut self, ticks: u64) -> Summary {
        for _ in 0..ticks {
            self.step();
        }
        self.summary
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    fn step(&mut self) {
        let index = query::tick_index(&self.world);
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::Tick { dt: self.tick },
            &mut events,
        );

        self.drive_builder(index, &mut events);

        let towers = query::tower_view(&self.world);
        let monsters = query::monster_view(&self.world);
        let (width, height) = query::navigation_view(&self.world).dimensions();
        self.targeting
            .handle(&towers, &monsters, (width, height), &mut self.targets);

        let mut commands = Vec::new();
        self.combat.handle(
            &events,
            &towers,
            &self.targets,
            self.targeting.index(),
            &mut commands,
        );
        self.apply_all(commands, &mut events);

        let monsters = query::monster_view(&self.world);
        let mut commands = Vec::new();
        self.movement.handle(
            &events,
            &monsters,
            query::navigation_view(&self.world),
            &mut commands,
        );
        self.apply_all(commands, &mut events);

        if index % self.monsters.every_ticks == 0 {
            self.spawn_wave(&mut events);
        }

        for event in &events {
            self.summary.record(event);
        }
        self.summary.ticks += 1;
    }

    fn drive_builder(&mut self, index: u64, events: &mut Vec<Event>) {
        let preview = query::preview(&self.world);
        let active = self.edits.front().copied().filter(|edit| edit.tick <= index);

        if let Some(edit) = active.filter(ScriptedEdit::is_aim_only) {
            let _ = self.edits.pop_front();
            self.aim_tower_on(edit, events);
        }
        let active = active.filter(|edit| !edit.is_aim_only());

        let input = match active {
            Some(edit) => BuilderInput::new(Some(edit.tile()), edit.kind(), edit.is_removal()),
            None => BuilderInput::default(),
        };

        let mut commands = Vec::new();
        self.builder.handle(preview, input, &mut commands);
        let first = events.len();
        self.apply_all(commands, events);

        let built: Vec<(TowerId, TowerKindId, TilePos)> = events[first..]
            .iter()
            .filter_map(|event| match *event {
                Event::TowerBuilt { tower, kind, tile } => Some((tower, kind, tile)),
                _ => None,
            })
            .collect();
        for &(tower, kind, tile) in &built {
            let name = query::tower_spec(&self.world, kind)
                .map_or("unknown", |spec| spec.name.as_str());
            info!(
                tower = tower.get(),
                name,
                x = tile.x(),
                z = tile.z(),
                "tower built"
            );
        }

        let Some(edit) = active else {
            return;
        };
        let tile = edit.tile();
        if let Some(world_offset) = edit.aim_offset() {
            for &(tower, _, built_on) in &built {
                if built_on == tile {
                    world::apply(
                        &mut self.world,
                        Command::AimTower {
                            tower,
                            world_offset,
                        },
                        events,
                    );
                }
            }
        }

        let evaluated = preview.is_some_and(|snapshot| snapshot.tile == tile);
        let rejected = events[first..]
            .iter()
            .any(|event| matches!(event, Event::EditRejected { tile: t, .. } if *t == tile));
        if evaluated || rejected {
            let _ = self.edits.pop_front();
            debug!(
                x = tile.x(),
                z = tile.z(),
                tick = index,
                "scripted edit resolved"
            );
        }
    }

    /// Turns the logical facing of the tower standing on the edit's tile.
    fn aim_tower_on(&mut self, edit: ScriptedEdit, events: &mut Vec<Event>) {
        let tile = edit.tile();
        let tower = query::tower_view(&self.world)
            .iter()
            .find(|tower| tower.tile == tile)
            .map(|tower| tower.id);
        match (tower, edit.aim_offset()) {
            (Some(tower), Some(world_offset)) => world::apply(
                &mut self.world,
                Command::AimTower {
                    tower,
                    world_offset,
                },
                events,
            ),
            _ => debug!(x = tile.x(), z = tile.z(), "aim edit found no tower"),
        }
    }

    fn spawn_wave(&mut self, events: &mut Vec<Event>) {
        let spawns = query::spawn_points(&self.world).to_vec();
        let mut commands = Vec::new();
        for spawn in spawns {
            if self.summary.spawned + spawned_in(events) + commands.len() as u32
                >= self.monsters.limit
            {
                break;
            }
            let jitter = self.monsters.lane_jitter;
            let lane_offset = if jitter > 0.0 {
                Vec3::new(
                    self.rng.gen_range(-jitter..=jitter),
                    0.0,
                    self.rng.gen_range(-jitter..=jitter),
                )
            } else {
                Vec3::ZERO
            };
            commands.push(Command::SpawnMonster {
                position: spawn.center(),
                speed: self.monsters.speed,
                health: self.monsters.health,
                lane_offset,
            });
        }
        self.apply_all(commands, events);
    }

    fn apply_all(&mut self, commands: Vec<Command>, events: &mut Vec<Event>) {
        for command in commands {
            world::apply(&mut self.world, command, events);
        }
    }
}

fn spawned_in(events: &[Event]) -> u32 {
    events
        .iter()
        .filter(|event| matches!(event, Event::MonsterSpawned { .. }))
        .count() as u32
}

/// Logs the summary of a finished run.
pub(crate) fn report(summary: &Summary, world: &World) {
    info!(
        ticks = summary.ticks,
        spawned = summary.spawned,
        killed = summary.killed,
        reached_goal = summary.reached_goal,
        alive = query::monster_view(world).len(),
        towers = query::tower_view(world).iter().count(),
        towers_built = summary.towers_built,
        structures_removed = summary.structures_removed,
        edits_rejected = summary.edits_rejected,
        previews_blocked = summary.previews_blocked,
        shots = summary.shots,
        projectiles_landed = summary.projectiles_landed,
        in_flight = query::projectiles_in_flight(world),
        "run finished"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use warden_defence_core::{planar_forward, ObjectCode};

    const SCENARIO: &str = r#"
tick_millis = 100

[map]
rows = [
    ".....",
    ".....",
    ".....",
    ".....",
    "....G",
]
spawns = [{ x = -1, z = 0 }]

[[towers]]
name = "bolt"
damage = 2
attack_speed = 4.0
rotatable = true
range = { kind = "circle", max_range = 2.5 }

[[edits]]
tick = 0
x = 2
z = 1
build = 0
aim = [1.0, 0.0]

[[edits]]
tick = 50
x = 2
z = 1
aim = [0.0, -1.0]

[monsters]
every_ticks = 10
limit = 4
speed = 1.0
health = 4
"#;

    fn simulation(seed: u64) -> Simulation {
        let scenario = Scenario::parse(SCENARIO).expect("scenario");
        Simulation::new(&scenario, seed).expect("simulation")
    }

    fn facing(sim: &Simulation) -> Vec2 {
        let towers = query::tower_view(sim.world());
        let tower = towers.iter().next().expect("tower");
        planar_forward(tower.logical_rotation).expect("forward")
    }

    #[test]
    fn scripted_build_goes_through_preview() {
        let mut sim = simulation(1);
        let summary = sim.run(3);

        assert_eq!(summary.towers_built, 1);
        assert_eq!(
            query::tile(sim.world(), TilePos::new(2, 1)).object,
            ObjectCode::tower(TowerKindId::new(0))
        );
        assert!(query::preview(sim.world()).is_none());
    }

    #[test]
    fn spawner_respects_limit() {
        let mut sim = simulation(1);
        let summary = sim.run(100);

        assert_eq!(summary.spawned, 4);
        assert_eq!(
            summary.spawned,
            summary.killed + summary.reached_goal + query::monster_view(sim.world()).len() as u32
        );
    }

    #[test]
    fn identical_seeds_replay_identically() {
        let first = simulation(9).run(80);
        let second = simulation(9).run(80);

        assert_eq!(first, second);
    }

    #[test]
    fn built_tower_takes_the_scripted_facing() {
        let mut sim = simulation(1);
        let _ = sim.run(3);

        assert!(facing(&sim).distance(Vec2::X) < 1e-5);
    }

    #[test]
    fn firing_leaves_logical_facing_alone() {
        let mut sim = simulation(1);
        let summary = sim.run(45);

        assert!(summary.shots > 0);
        assert!(facing(&sim).distance(Vec2::X) < 1e-5);
    }

    #[test]
    fn aim_edit_turns_the_existing_tower() {
        let mut sim = simulation(1);
        let _ = sim.run(52);

        assert!(facing(&sim).distance(Vec2::new(0.0, -1.0)) < 1e-5);
        assert_eq!(query::tower_view(sim.world()).iter().count(), 1);
    }

    #[test]
    fn projectile_shots_land_after_launch() {
        let source = SCENARIO.replace(
            "range = { kind = \"circle\", max_range = 2.5 }",
            "range = { kind = \"circle\", max_range = 2.5 }\ndelivery = { kind = \"projectile\", speed = 2.0 }",
        );
        let scenario = Scenario::parse(&source).expect("scenario");
        let mut sim = Simulation::new(&scenario, 1).expect("simulation");
        let summary = sim.run(100);

        assert!(summary.shots > 0);
        assert!(summary.projectiles_landed > 0);
        let in_flight = query::projectiles_in_flight(sim.world()) as u32;
        assert!(summary.projectiles_landed + in_flight <= summary.shots);
    }
}
