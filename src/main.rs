//! Headless demo: guards patrolling a warehouse while a scripted intruder
//! walks through it
//!
//! Usage: `warden [level.ron]`. Set `RUST_LOG=info` (or `debug`) to follow
//! the guards.

use std::f32::consts::PI;

use warden::core::{AiEvent, CameraSpawn, Door, GuardSpawn, LevelBodies, LevelError};
use warden::prelude::*;

const DT: f32 = 1.0 / 60.0;
const TICKS: u32 = 60 * 40;
const GUARD_SPEED: f32 = 2.0;
const PLAYER_SPEED: f32 = 2.2;
/// Tick at which the intruder throws a bottle
const DISTRACTION_TICK: u32 = 60 * 6;
/// Tick at which the loading door opens
const DOOR_OPEN_TICK: u32 = 60 * 12;

/// Built-in level
fn warehouse() -> LevelData {
    let mut level = LevelData::new("Warehouse", GridSpec::new(20, 12, 1.0));

    level.walls = vec![
        ObstacleRect::new(Vec2::new(5.0, 2.0), Vec2::new(6.0, 8.0)),
        ObstacleRect::new(Vec2::new(10.0, 0.0), Vec2::new(11.0, 5.0)),
        ObstacleRect::new(Vec2::new(10.0, 7.0), Vec2::new(11.0, 11.0)),
        ObstacleRect::new(Vec2::new(14.0, 3.0), Vec2::new(17.0, 4.0)),
    ];
    level.doors.push(Door {
        rect: ObstacleRect::new(Vec2::new(10.0, 5.0), Vec2::new(11.0, 7.0)),
        closed: true,
    });
    level.guards = vec![
        GuardSpawn {
            position: Vec2::new(2.5, 1.5),
            facing: PI / 2.0,
            patrol: vec![
                Vec2::new(2.5, 10.5),
                Vec2::new(8.5, 10.5),
                Vec2::new(8.5, 1.5),
                Vec2::new(2.5, 1.5),
            ],
        },
        GuardSpawn {
            position: Vec2::new(15.5, 8.5),
            facing: PI,
            patrol: vec![
                Vec2::new(12.5, 8.5),
                Vec2::new(12.5, 1.5),
                Vec2::new(18.5, 1.5),
                Vec2::new(18.5, 8.5),
            ],
        },
    ];
    level.cameras.push(CameraSpawn {
        position: Vec2::new(19.5, 11.5),
        facing: -3.0 * PI / 4.0,
    });
    level.player_spawn = Vec2::new(0.5, 6.5);
    level
}

/// Scripted intruder route
const ROUTE: [Vec2; 4] = [
    Vec2::new(4.5, 11.5),
    Vec2::new(12.5, 11.5),
    Vec2::new(16.5, 6.5),
    Vec2::new(19.5, 0.5),
];

struct Demo {
    level: LevelData,
    physics: Physics,
    simulation: Simulation,
    bodies: LevelBodies,
    player: PlayerTarget,
    route_index: usize,
}

impl Demo {
    fn new(level: LevelData) -> Result<Self, LevelError> {
        let mut physics = Physics::new();
        let (mut simulation, bodies) = Simulation::from_level(&level, &mut physics)?;
        let player = bodies
            .player
            .map(PlayerTarget::new)
            .ok_or_else(|| LevelError::Invalid("level produced no player".into()))?;
        simulation.debug.enabled = true;

        Ok(Self {
            level,
            physics,
            simulation,
            bodies,
            player,
            route_index: 0,
        })
    }

    fn update(&mut self, tick: u32) {
        self.script(tick);
        self.physics.step(DT);

        for command in self.simulation.tick(DT, &self.physics, &self.player) {
            self.physics
                .drive(command.body, command.velocity(GUARD_SPEED), command.facing);
        }

        for event in self.simulation.events_mut().drain() {
            match event {
                AiEvent::StateChanged { guard, from, to } => {
                    log::info!("[{:>5.2}s] guard {} {} -> {}", seconds(tick), guard.0, from, to);
                }
                AiEvent::CameraAlert {
                    position,
                    guards_alerted,
                    ..
                } => {
                    log::info!(
                        "[{:>5.2}s] camera spotted intruder at {position}, {guards_alerted} guards alerted",
                        seconds(tick)
                    );
                }
                other => log::debug!("[{:>5.2}s] {other:?}", seconds(tick)),
            }
        }

        if tick % 120 == 0 {
            for line in self.simulation.debug.get_all_lines() {
                log::debug!("{line}");
            }
        }
    }

    /// Walk the intruder along its route and trigger level events
    fn script(&mut self, tick: u32) {
        let body = self.player.body;

        if let (Some(position), Some(&waypoint)) = (
            self.physics.body_position(body),
            ROUTE.get(self.route_index),
        ) {
            let to = waypoint - position;
            if to.length() < 0.3 {
                self.route_index += 1;
            }
            let direction = to.normalize_or_zero();
            let facing = direction.y.atan2(direction.x);
            self.physics.drive(body, direction * PLAYER_SPEED, facing);
        } else {
            self.physics.drive(body, Vec2::ZERO, 0.0);
        }

        if tick == DISTRACTION_TICK {
            let accepted = self.simulation.emit_distraction(Vec2::new(7.5, 9.5), 1, 8.0);
            log::info!("[{:>5.2}s] bottle thrown, {accepted} guards listening", seconds(tick));
        }

        if tick == DOOR_OPEN_TICK {
            for (door, handle) in self.level.doors.iter().zip(&self.bodies.doors) {
                self.physics.set_wall_solid(*handle, false);
                self.simulation.set_region_obstacle(&door.rect, false);
            }
            log::info!("[{:>5.2}s] loading door opened", seconds(tick));
        }
    }
}

fn seconds(tick: u32) -> f32 {
    tick as f32 * DT
}

fn run() -> Result<(), LevelError> {
    let level = match std::env::args().nth(1) {
        Some(path) => LevelData::load_ron(path)?,
        None => warehouse(),
    };
    log::info!("Running '{}' for {} ticks", level.name, TICKS);

    let mut demo = Demo::new(level)?;
    for tick in 0..TICKS {
        demo.update(tick);
    }

    log::info!("{}", demo.simulation.debug.tick_stats.format_stats());
    for (id, agent) in demo.simulation.guards() {
        log::info!(
            "guard {} finished in {} with suspicion {:.1}",
            id.0,
            agent.behavior.state(),
            agent.behavior.suspicion().level()
        );
    }
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Simulation error: {}", e);
        std::process::exit(1);
    }
}
