//! Per-tick orchestration of every guard and camera
//!
//! Tick order, after the physics step:
//!
//! 1. Swap the event queue
//! 2. Apply queued obstacle changes, before any path query
//! 3. Sweep cameras and relay alerts to guards in range
//! 4. Per guard: rebuild the cone, observe the player, advance the state
//!    machine and publish a movement command
//!
//! A guard whose body has gone missing gets an idle command for the tick;
//! the others are unaffected.

use std::time::Instant;

use glam::Vec2;

use super::config::AiConfig;
use super::debug::{DebugInfo, GuardDebug};
use super::events::{AiEvent, EventQueue};
use super::level::{LevelData, LevelError};
use crate::ai::{
    Arena, GuardBehavior, GuardId, MovementCommand, Observation, SecurityCamera, force_for,
};
use crate::nav::{GridPlanner, NavGrid, ObstacleRect, TileCoord};
use crate::perception::{BodyId, PerceptionService, PhysicsQuery, VisionCone};
use crate::physics::{ColliderHandle, Physics};

/// Radius of guard and player bodies created from level data
const ACTOR_RADIUS: f32 = 0.35;

/// The player as the AI needs to know it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerTarget {
    pub body: BodyId,
    /// Guards give up a chase on an invulnerable player
    pub invulnerable: bool,
}

impl PlayerTarget {
    #[must_use]
    pub fn new(body: BodyId) -> Self {
        Self {
            body,
            invulnerable: false,
        }
    }
}

/// A guard's controller plus the body and cone it drives
#[derive(Debug, Clone)]
pub struct GuardAgent {
    pub behavior: GuardBehavior,
    pub cone: VisionCone,
    pub body: BodyId,
    /// Position as of the last tick
    pub position: Vec2,
}

/// Physics handles created for a level
#[derive(Debug, Clone, Default)]
pub struct LevelBodies {
    pub player: Option<BodyId>,
    pub guards: Vec<(GuardId, BodyId)>,
    pub cameras: Vec<BodyId>,
    pub walls: Vec<ColliderHandle>,
    /// One collider per door, in level order
    pub doors: Vec<ColliderHandle>,
}

pub struct Simulation {
    config: AiConfig,
    grid: NavGrid,
    perception: PerceptionService,
    guards: Arena<GuardAgent>,
    cameras: Vec<SecurityCamera>,
    pending_obstacles: Vec<(TileCoord, bool)>,
    events: EventQueue,
    commands: Vec<MovementCommand>,
    /// Debug overlay data
    pub debug: DebugInfo,
}

impl Simulation {
    #[must_use]
    pub fn new(grid: NavGrid, config: AiConfig) -> Self {
        Self {
            perception: PerceptionService::new(config.sight.clone()),
            config,
            grid,
            guards: Arena::new(),
            cameras: Vec::new(),
            pending_obstacles: Vec::new(),
            events: EventQueue::new(),
            commands: Vec::new(),
            debug: DebugInfo::new(),
        }
    }

    /// Build the navigation grid, physics bodies, guards and cameras for a
    /// level.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError::Invalid`] if the level fails validation.
    pub fn from_level(
        level: &LevelData,
        physics: &mut Physics,
    ) -> Result<(Self, LevelBodies), LevelError> {
        level.validate()?;

        let mut simulation = Self::new(level.build_nav_grid(), level.ai.clone());
        let mut bodies = LevelBodies::default();

        for wall in &level.walls {
            bodies.walls.push(physics.add_wall(wall.min, wall.max));
        }
        for door in &level.doors {
            let handle = physics.add_wall(door.rect.min, door.rect.max);
            physics.set_wall_solid(handle, door.closed);
            bodies.doors.push(handle);
        }
        for spawn in &level.guards {
            let body = physics.create_actor(spawn.position, spawn.facing, ACTOR_RADIUS);
            let id = simulation.add_guard(body, spawn.position, spawn.facing, spawn.patrol.clone());
            bodies.guards.push((id, body));
        }
        for spawn in &level.cameras {
            let body = physics.create_fixture(spawn.position, spawn.facing);
            simulation.add_camera(body);
            bodies.cameras.push(body);
        }
        bodies.player = Some(physics.create_actor(level.player_spawn, 0.0, ACTOR_RADIUS));
        physics.update_queries();

        log::info!(
            "Loaded level '{}': {}x{} tiles, {} walls, {} doors, {} guards, {} cameras",
            level.name,
            level.grid.width,
            level.grid.height,
            level.walls.len(),
            level.doors.len(),
            level.guards.len(),
            level.cameras.len()
        );

        Ok((simulation, bodies))
    }

    /// Add a patrolling guard driving `body`
    pub fn add_guard(
        &mut self,
        body: BodyId,
        home: Vec2,
        facing: f32,
        patrol: Vec<Vec2>,
    ) -> GuardId {
        let behavior = GuardBehavior::new(self.config.guard.clone(), home, facing)
            .with_patrol(patrol)
            .with_sight_range(self.config.vision.radius);
        self.guards.insert(GuardAgent {
            behavior,
            cone: VisionCone::new(body, &self.config.vision),
            body,
            position: home,
        })
    }

    pub fn remove_guard(&mut self, id: GuardId) -> bool {
        self.guards.remove(id).is_some()
    }

    /// Add a camera mounted on `body`. Returns its index.
    pub fn add_camera(&mut self, body: BodyId) -> usize {
        self.cameras
            .push(SecurityCamera::new(body, &self.config.camera));
        self.cameras.len() - 1
    }

    /// Queue a passability change for the start of the next tick
    pub fn set_obstacle(&mut self, coord: TileCoord, obstacle: bool) {
        self.pending_obstacles.push((coord, obstacle));
    }

    /// Queue a passability change for every tile under `rect`
    pub fn set_region_obstacle(&mut self, rect: &ObstacleRect, obstacle: bool) {
        for coord in self.grid.tiles_in_rect(rect) {
            self.pending_obstacles.push((coord, obstacle));
        }
    }

    /// Make a noise. Every guard within `radius` of it (as of the last tick)
    /// is offered the distraction; returns how many took it.
    pub fn emit_distraction(&mut self, position: Vec2, priority: u8, radius: f32) -> usize {
        let mut accepted = 0;
        for (_, agent) in self.guards.iter_mut() {
            if agent.position.distance(position) <= radius
                && agent.behavior.distract(position, priority)
            {
                accepted += 1;
            }
        }

        self.events.push(AiEvent::Distraction {
            position,
            priority,
            accepted,
        });
        accepted
    }

    /// Advance every camera and guard by `dt` seconds.
    ///
    /// Call after the physics step. Returns one command per live guard, in
    /// guard id order.
    pub fn tick(
        &mut self,
        dt: f32,
        world: &impl PhysicsQuery,
        player: &PlayerTarget,
    ) -> &[MovementCommand] {
        let started = Instant::now();

        self.events.swap();
        self.apply_obstacle_changes();
        self.commands.clear();

        let watching = self.update_cameras(dt, world, player);
        let player_position = world.body_position(player.body);
        let planner = GridPlanner::new(&self.grid);

        for (id, agent) in self.guards.iter_mut() {
            let Some(position) = world.body_position(agent.body) else {
                log::warn!("Guard {} body {:?} missing, skipping tick", id.0, agent.body);
                agent.cone.update(world);
                self.events.push(AiEvent::BodyMissing {
                    guard: id,
                    body: agent.body,
                });
                self.commands.push(MovementCommand::idle(
                    id,
                    agent.body,
                    agent.behavior.facing(),
                ));
                continue;
            };
            agent.position = position;

            agent.cone.update(world);
            let sighting = self.perception.observe(world, &agent.cone, player.body);

            agent.behavior.set_camera_watching(watching);
            agent.behavior.observe(Observation {
                sighting,
                target_position: player_position,
                target_invulnerable: player.invulnerable,
            });

            if let Some(transition) = agent.behavior.update(dt, position, &planner) {
                self.events.push(AiEvent::StateChanged {
                    guard: id,
                    from: transition.from,
                    to: transition.to,
                });
            }
            if agent.behavior.used_path_fallback() {
                if let Some(target) = agent.behavior.next_target() {
                    self.events.push(AiEvent::PathFallback { guard: id, target });
                }
            }

            let state = agent.behavior.state();
            self.commands.push(MovementCommand {
                guard: id,
                body: agent.body,
                direction: agent.behavior.movement_direction(),
                facing: agent.behavior.facing(),
                force: force_for(state, agent.behavior.config()),
            });
        }

        if self.debug.enabled {
            self.debug.set_guards(
                self.guards
                    .iter()
                    .map(|(id, agent)| GuardDebug::capture(id, &agent.behavior, &agent.cone)),
            );
        }
        self.debug.record_tick(started.elapsed());

        &self.commands
    }

    fn apply_obstacle_changes(&mut self) {
        if self.pending_obstacles.is_empty() {
            return;
        }
        log::debug!("Applying {} obstacle changes", self.pending_obstacles.len());
        for (coord, obstacle) in self.pending_obstacles.drain(..) {
            self.grid.set_obstacle(coord, obstacle);
        }
    }

    /// Sweep cameras and relay sightings. Returns whether any camera sees
    /// the player.
    fn update_cameras(&mut self, dt: f32, world: &impl PhysicsQuery, player: &PlayerTarget) -> bool {
        let mut watching = false;

        for camera in &mut self.cameras {
            if !camera.update(dt, world) {
                continue;
            }
            let Some(sighting) = camera.scan(world, &self.perception, player.body) else {
                continue;
            };
            watching = true;

            let mut guards_alerted = 0;
            for (_, agent) in self.guards.iter_mut() {
                let position = world.body_position(agent.body).unwrap_or(agent.position);
                if camera.in_alert_range(position) {
                    agent.behavior.raise_camera_alert(sighting.position);
                    guards_alerted += 1;
                }
            }

            log::debug!(
                "Camera {:?} spotted player at {}, alerted {} guards",
                camera.body(),
                sighting.position,
                guards_alerted
            );
            self.events.push(AiEvent::CameraAlert {
                camera: camera.body(),
                position: sighting.position,
                guards_alerted,
            });
        }

        watching
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    #[must_use]
    pub fn grid(&self) -> &NavGrid {
        &self.grid
    }

    #[must_use]
    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    #[must_use]
    pub fn guard(&self, id: GuardId) -> Option<&GuardAgent> {
        self.guards.get(id)
    }

    pub fn guard_mut(&mut self, id: GuardId) -> Option<&mut GuardAgent> {
        self.guards.get_mut(id)
    }

    pub fn guards(&self) -> impl Iterator<Item = (GuardId, &GuardAgent)> {
        self.guards.iter()
    }

    #[must_use]
    pub fn guard_count(&self) -> usize {
        self.guards.len()
    }

    #[must_use]
    pub fn cameras(&self) -> &[SecurityCamera] {
        &self.cameras
    }

    /// Commands from the last tick
    #[must_use]
    pub fn commands(&self) -> &[MovementCommand] {
        &self.commands
    }

    /// Events from the previous tick
    #[must_use]
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventQueue {
        &mut self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::GuardState;
    use crate::core::{CameraConfig, GuardConfig};
    use crate::nav::GridSpec;
    use crate::perception::testing::BoxWorld;
    use std::f32::consts::{FRAC_PI_2, PI};

    const PLAYER: BodyId = BodyId::new(100, 0);

    fn open_grid() -> NavGrid {
        NavGrid::build(GridSpec::new(8, 8, 1.0), &[])
    }

    fn quick_config() -> AiConfig {
        AiConfig::default().with_guard(GuardConfig::default().with_min_state_ticks(0))
    }

    /// Run a tick and collect the events it produced (readable one tick later)
    fn events_after(sim: &mut Simulation, world: &BoxWorld) -> Vec<AiEvent> {
        sim.tick(0.0, world, &PlayerTarget::new(PLAYER));
        sim.events().iter().cloned().collect()
    }

    #[test]
    fn test_guard_spots_player_and_chases() {
        let guard_body = BodyId::new(1, 0);
        let world = BoxWorld::new()
            .body(guard_body, Vec2::new(1.5, 1.5), 0.0, 0.0)
            .body(PLAYER, Vec2::new(4.5, 1.5), 0.0, 0.3);
        let mut sim = Simulation::new(open_grid(), AiConfig::default());
        let id = sim.add_guard(guard_body, Vec2::new(1.5, 1.5), 0.0, Vec::new());

        let mut seen = Vec::new();
        for _ in 0..40 {
            sim.tick(0.1, &world, &PlayerTarget::new(PLAYER));
            seen.extend(sim.events().iter().cloned());
        }

        let agent = sim.guard(id).unwrap();
        assert_eq!(agent.behavior.state(), GuardState::Chase);
        assert!(seen.contains(&AiEvent::StateChanged {
            guard: id,
            from: GuardState::Patrol,
            to: GuardState::Suspicious,
        }));

        let command = sim.commands()[0];
        assert_eq!(command.guard, id);
        assert!(command.direction.x > 0.9);
        assert_eq!(command.force, GuardConfig::default().chase_force);
    }

    #[test]
    fn test_wall_hides_player() {
        let guard_body = BodyId::new(1, 0);
        let world = BoxWorld::new()
            .body(guard_body, Vec2::new(1.5, 1.5), 0.0, 0.0)
            .body(PLAYER, Vec2::new(5.5, 1.5), 0.0, 0.3)
            .wall(Vec2::new(3.0, -10.0), Vec2::new(4.0, 10.0));
        let mut grid = open_grid();
        grid.mark_region(
            &ObstacleRect::new(Vec2::new(3.0, 0.0), Vec2::new(4.0, 8.0)),
            true,
        );
        let mut sim = Simulation::new(grid, AiConfig::default());
        let id = sim.add_guard(guard_body, Vec2::new(1.5, 1.5), 0.0, Vec::new());

        for _ in 0..40 {
            sim.tick(0.1, &world, &PlayerTarget::new(PLAYER));
        }

        let agent = sim.guard(id).unwrap();
        assert_eq!(agent.behavior.state(), GuardState::Patrol);
        assert_eq!(agent.behavior.suspicion().level(), 0.0);
    }

    #[test]
    fn test_missing_body_is_isolated() {
        let alive = BodyId::new(1, 0);
        let gone = BodyId::new(2, 0);
        let world = BoxWorld::new()
            .body(alive, Vec2::new(1.5, 1.5), 0.0, 0.0)
            .body(PLAYER, Vec2::new(7.5, 7.5), 0.0, 0.3);
        let mut sim = Simulation::new(open_grid(), AiConfig::default());
        let a = sim.add_guard(alive, Vec2::new(1.5, 1.5), 0.0, vec![Vec2::new(6.5, 1.5)]);
        let b = sim.add_guard(gone, Vec2::new(5.5, 5.5), 0.0, vec![Vec2::new(1.5, 5.5)]);

        let commands = sim.tick(0.1, &world, &PlayerTarget::new(PLAYER)).to_vec();

        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].guard, a);
        assert_eq!(commands[0].direction, Vec2::X);
        assert_eq!(commands[1].guard, b);
        assert_eq!(commands[1].direction, Vec2::ZERO);
        assert_eq!(commands[1].force, 0.0);

        let events = events_after(&mut sim, &world);
        assert!(events.contains(&AiEvent::BodyMissing {
            guard: b,
            body: gone
        }));
    }

    #[test]
    fn test_obstacle_changes_apply_next_tick() {
        let world = BoxWorld::new().body(PLAYER, Vec2::new(7.5, 7.5), 0.0, 0.3);
        let mut sim = Simulation::new(open_grid(), AiConfig::default());
        let door = TileCoord::new(3, 3);

        sim.set_obstacle(door, true);
        assert!(!sim.grid().is_obstacle(door));

        sim.tick(0.1, &world, &PlayerTarget::new(PLAYER));
        assert!(sim.grid().is_obstacle(door));

        sim.set_region_obstacle(
            &ObstacleRect::from_tiles(sim.grid().spec(), door, door),
            false,
        );
        sim.tick(0.1, &world, &PlayerTarget::new(PLAYER));
        assert!(!sim.grid().is_obstacle(door));
    }

    #[test]
    fn test_camera_alerts_nearby_guards_only() {
        let camera_body = BodyId::new(50, 0);
        let near = BodyId::new(1, 0);
        let far = BodyId::new(2, 0);
        let world = BoxWorld::new()
            .body(camera_body, Vec2::new(7.5, 1.5), PI, 0.0)
            .body(near, Vec2::new(5.5, 4.5), FRAC_PI_2, 0.0)
            .body(far, Vec2::new(0.5, 7.5), FRAC_PI_2, 0.0)
            .body(PLAYER, Vec2::new(4.5, 1.5), 0.0, 0.3);
        let config = quick_config().with_camera(CameraConfig {
            sweep: 0.0,
            alert_radius: 5.0,
            ..CameraConfig::default()
        });
        let mut sim = Simulation::new(open_grid(), config);
        sim.add_camera(camera_body);
        let a = sim.add_guard(near, Vec2::new(5.5, 4.5), FRAC_PI_2, Vec::new());
        let b = sim.add_guard(far, Vec2::new(0.5, 7.5), FRAC_PI_2, Vec::new());

        sim.tick(0.1, &world, &PlayerTarget::new(PLAYER));

        assert_eq!(sim.guard(a).unwrap().behavior.state(), GuardState::Alerted);
        assert_eq!(
            sim.guard(a).unwrap().behavior.next_target(),
            Some(Vec2::new(4.5, 1.5))
        );
        assert_eq!(sim.guard(b).unwrap().behavior.state(), GuardState::Patrol);
        assert!(sim.cameras()[0].spotted().is_some());

        let events = events_after(&mut sim, &world);
        assert!(events.iter().any(|e| matches!(
            e,
            AiEvent::CameraAlert {
                guards_alerted: 1,
                ..
            }
        )));
    }

    #[test]
    fn test_distraction_reaches_guards_in_radius() {
        let near = BodyId::new(1, 0);
        let far = BodyId::new(2, 0);
        let world = BoxWorld::new()
            .body(near, Vec2::new(1.5, 1.5), PI, 0.0)
            .body(far, Vec2::new(6.5, 6.5), PI, 0.0)
            .body(PLAYER, Vec2::new(7.5, 0.5), 0.0, 0.3);
        let mut sim = Simulation::new(open_grid(), AiConfig::default());
        let a = sim.add_guard(near, Vec2::new(1.5, 1.5), PI, Vec::new());
        let b = sim.add_guard(far, Vec2::new(6.5, 6.5), PI, Vec::new());

        assert_eq!(sim.emit_distraction(Vec2::new(2.5, 2.5), 1, 3.0), 1);
        sim.tick(0.1, &world, &PlayerTarget::new(PLAYER));

        assert_eq!(
            sim.guard(a).unwrap().behavior.state(),
            GuardState::Distracted
        );
        assert_eq!(sim.guard(b).unwrap().behavior.state(), GuardState::Patrol);
    }

    #[test]
    fn test_debug_snapshots_when_enabled() {
        let guard_body = BodyId::new(1, 0);
        let world = BoxWorld::new()
            .body(guard_body, Vec2::new(1.5, 1.5), 0.0, 0.0)
            .body(PLAYER, Vec2::new(7.5, 7.5), 0.0, 0.3);
        let mut sim = Simulation::new(open_grid(), AiConfig::default());
        sim.add_guard(guard_body, Vec2::new(1.5, 1.5), 0.0, Vec::new());

        sim.tick(0.1, &world, &PlayerTarget::new(PLAYER));
        assert!(sim.debug.guards().is_empty());

        sim.debug.enabled = true;
        sim.tick(0.1, &world, &PlayerTarget::new(PLAYER));
        assert_eq!(sim.debug.guards().len(), 1);
        assert_eq!(
            sim.debug.guards()[0].cone.len(),
            AiConfig::default().vision.num_rays + 1
        );
        assert_eq!(sim.debug.tick_stats.total_ticks(), 2);
    }

    #[test]
    fn test_from_level_with_rapier() {
        let mut level = LevelData::new("Rapier", GridSpec::new(10, 10, 1.0));
        level
            .walls
            .push(ObstacleRect::new(Vec2::new(4.0, 0.0), Vec2::new(5.0, 6.0)));
        level.guards.push(crate::core::GuardSpawn {
            position: Vec2::new(1.5, 1.5),
            facing: 0.0,
            patrol: vec![Vec2::new(8.5, 1.5)],
        });
        level.cameras.push(crate::core::CameraSpawn {
            position: Vec2::new(9.5, 9.5),
            facing: PI,
        });
        level.player_spawn = Vec2::new(8.5, 8.5);

        let mut physics = Physics::new();
        let (mut sim, bodies) = Simulation::from_level(&level, &mut physics).unwrap();
        let player = PlayerTarget::new(bodies.player.unwrap());

        let commands = sim.tick(1.0 / 60.0, &physics, &player);

        assert_eq!(commands.len(), 1);
        // Wall blocks the straight line east, so the first step bends north
        assert!(commands[0].direction.y > 0.0);
        assert_eq!(sim.guard_count(), 1);
        assert_eq!(bodies.cameras.len(), 1);
    }
}
