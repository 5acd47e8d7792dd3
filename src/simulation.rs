use crate::arena::Arena;
use crate::clock::SimulationClock;
use crate::config::SimConfig;
use crate::entity::{Entity, EntityId, EntityView, Role, PREY_SHADES};
use crate::error::ConfigError;
use crate::interaction;
use crate::movement;
use crate::population::Population;
use crate::stats::ScoreBoard;
use crate::targeting::{self, PursuitEvent};
use glam::DVec2;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use tracing::{debug, info, trace, warn};

//////////////////////////////////////////////////////////////////////////////
// Controls
//////////////////////////////////////////////////////////////////////////////

/// Per-frame knobs supplied by the presentation layer, already clamped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Controls {
    pub population_target: u32,
    pub predator_quota: u32,
    pub speed_factor: f64,
    pub prey_reaction_distance: f64,
    pub paused: bool,
}

/// Raw `configure` arguments, kept to tell a new request from a repeated one.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Request {
    population_target: u32,
    predator_quota: u32,
    speed_factor: f64,
    prey_reaction_distance: f64,
}

//////////////////////////////////////////////////////////////////////////////
// Simulation
//////////////////////////////////////////////////////////////////////////////

/// The whole petri dish: storage, settings, clock and randomness.
///
/// Driven from outside: call [`Simulation::configure`] and then
/// [`Simulation::tick`] once per rendered frame, and read
/// [`Simulation::snapshot`] to draw.
pub struct Simulation {
    config: SimConfig,
    arena: Arena,
    population: Population,
    controls: Controls,
    last_request: Option<Request>,
    clock: SimulationClock,
    scoreboard: ScoreBoard,
    rng: SmallRng,
}

impl Simulation {
    /// Validates `config` and seeds the initial population.
    pub fn new(config: SimConfig, arena: Arena) -> Result<Self, ConfigError> {
        config.validate()?;

        let seed = config.rng_seed.unwrap_or_else(rand::random);
        let controls = Controls {
            population_target: config.population.target,
            predator_quota: config.population.predators,
            speed_factor: config.motion.speed_factor,
            prey_reaction_distance: config.interaction.prey_reaction_distance,
            paused: false,
        };

        let mut sim = Simulation {
            config,
            arena,
            population: Population::new(),
            controls,
            last_request: None,
            clock: SimulationClock::new(),
            scoreboard: ScoreBoard::new(),
            rng: SmallRng::seed_from_u64(seed),
        };
        let (controls, _) = sim.sanitize(Request {
            population_target: controls.population_target,
            predator_quota: controls.predator_quota,
            speed_factor: controls.speed_factor,
            prey_reaction_distance: controls.prey_reaction_distance,
        });
        sim.controls = controls;
        debug!(seed, "simulation rng seeded");
        sim.reset(controls.population_target, controls.predator_quota);
        Ok(sim)
    }

    /// Applies the presentation layer's settings for the coming ticks.
    ///
    /// Out-of-range values are clamped. A changed predator quota reseeds the
    /// population so the new quota takes effect from the first creation.
    pub fn configure(
        &mut self,
        population_target: u32,
        predator_quota: u32,
        speed_factor: f64,
        prey_reaction_distance: f64,
        paused: bool,
    ) {
        self.controls.paused = paused;

        let request = Request {
            population_target,
            predator_quota,
            speed_factor,
            prey_reaction_distance,
        };
        if self.last_request == Some(request) {
            return;
        }
        let previous_quota = self
            .last_request
            .map_or(self.controls.predator_quota, |last| last.predator_quota);
        let quota_changed = previous_quota != predator_quota;
        self.last_request = Some(request);

        let (controls, adjusted) = self.sanitize(request);
        if adjusted {
            warn!(
                population_target = controls.population_target,
                predator_quota = controls.predator_quota,
                speed_factor = controls.speed_factor,
                prey_reaction_distance = controls.prey_reaction_distance,
                "clamped out-of-range controls"
            );
        }
        self.controls = Controls { paused, ..controls };

        if quota_changed {
            self.reset(controls.population_target, controls.predator_quota);
            self.last_request = Some(request);
        }
    }

    /// Clears every entity and reseeds. Entity ids keep increasing.
    pub fn reset(&mut self, population_target: u32, predator_quota: u32) {
        let (controls, adjusted) = self.sanitize(Request {
            population_target,
            predator_quota,
            speed_factor: self.controls.speed_factor,
            prey_reaction_distance: self.controls.prey_reaction_distance,
        });
        if adjusted {
            warn!(
                population_target = controls.population_target,
                predator_quota = controls.predator_quota,
                "clamped out-of-range reset request"
            );
        }
        self.controls.population_target = controls.population_target;
        self.controls.predator_quota = controls.predator_quota;
        // later requests compare against what the reset left in place
        if let Some(last) = self.last_request.as_mut() {
            last.population_target = population_target;
            last.predator_quota = predator_quota;
        }

        self.population.clear();
        self.scoreboard = ScoreBoard::new();
        self.population.reconcile(
            controls.population_target,
            controls.predator_quota,
            &self.arena,
            &self.config,
            &mut self.rng,
        );
        self.refresh_counts();
        info!(
            population = self.population.len(),
            predators = self.scoreboard.predator_count,
            "reset simulation"
        );
    }

    /// Advances the dish by one frame of `dt_wall_ms` milliseconds.
    pub fn tick(&mut self, dt_wall_ms: f64) {
        let controls = self.controls;
        let step = self.clock.step(
            dt_wall_ms,
            controls.speed_factor,
            controls.paused,
            self.config.motion.speed_divisor,
        );

        if self.config.population.maintained {
            self.population.reconcile(
                controls.population_target,
                controls.predator_quota,
                &self.arena,
                &self.config,
                &mut self.rng,
            );
        }
        self.population.begin_tick();

        for slot in (0..self.population.len()).rev() {
            if !self.population.is_slot_live(slot) {
                continue;
            }

            {
                let entity = self.population.slot_mut(slot);
                movement::metabolize(entity, &self.config.body);
                movement::advance(entity, &self.arena, step.dt_scaled);
            }

            let report = interaction::scan(
                &mut self.population,
                slot,
                &self.arena,
                &self.config,
                controls.prey_reaction_distance,
                &mut self.rng,
            );
            for kill in &report.kills {
                trace!(eater = %kill.eater, eaten = %kill.eaten, "life form consumed");
                self.scoreboard.add_kill(kill, self.clock.elapsed_ms());
            }

            if self.population.slot(slot).is_predator() {
                let predator = self.population.slot(slot);
                let id = predator.id;
                let located = targeting::candidate(predator, report.nearest)
                    .and_then(|candidate| self.population.live_position(candidate));
                let event = targeting::update(
                    self.population.slot_mut(slot),
                    report.nearest,
                    located,
                    step.dt_ms,
                    &self.config.pursuit,
                );
                log_pursuit(id, event);
            }
        }

        let removed = self.population.flush_removals();
        if !removed.is_empty() {
            debug!(
                tick = self.clock.ticks(),
                removed = removed.len(),
                "removed consumed life forms"
            );
        }
        self.refresh_counts();
        self.scoreboard.cleanup_old_kills(self.clock.elapsed_ms());
    }

    /// Read-only view of every live entity in creation order.
    pub fn snapshot(&self) -> Vec<EntityView> {
        let hunted = self.population.hunted();
        self.population
            .iter()
            .filter(|e| self.population.is_live(e.id))
            .map(|e| EntityView {
                id: e.id,
                position: e.position,
                radius: e.radius,
                role: e.role,
                is_target: hunted.contains(&e.id),
                shade: e.shade,
            })
            .collect()
    }

    /// Adds an entity with explicit state, bypassing random placement.
    ///
    /// Spawned entities do not count towards the predator quota.
    pub fn spawn(&mut self, role: Role, position: DVec2, velocity: DVec2, radius: f64) -> EntityId {
        let id = self
            .population
            .insert(role, position, velocity, radius, &self.config);
        let shade = self.rng.gen_range(0..PREY_SHADES);
        if let Some(entity) = self.population.get_mut(id) {
            entity.shade = shade;
        }
        self.refresh_counts();
        id
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.population.get(id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.population.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.population.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.population.is_empty()
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn controls(&self) -> Controls {
        self.controls
    }

    pub fn scoreboard(&self) -> &ScoreBoard {
        &self.scoreboard
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    fn refresh_counts(&mut self) {
        let predators = self.population.iter().filter(|e| e.is_predator()).count();
        let prey = self.population.len() - predators;
        self.scoreboard.update_counts(predators, prey);
    }

    /// Clamps a request into a renderable state. The flag reports whether
    /// anything had to change.
    fn sanitize(&self, request: Request) -> (Controls, bool) {
        let population_target = request
            .population_target
            .min(self.config.population.max_population);
        let predator_quota = request.predator_quota.min(population_target);

        let max_speed_factor = self.config.motion.max_speed_factor;
        let speed_factor = if request.speed_factor.is_finite() {
            request.speed_factor.clamp(0.0, max_speed_factor)
        } else {
            self.config.motion.speed_factor.clamp(0.0, max_speed_factor)
        };

        let prey_reaction_distance = if request.prey_reaction_distance.is_finite() {
            request.prey_reaction_distance.max(0.0)
        } else {
            self.config.interaction.prey_reaction_distance.max(0.0)
        };

        let adjusted = population_target != request.population_target
            || predator_quota != request.predator_quota
            || speed_factor != request.speed_factor
            || prey_reaction_distance != request.prey_reaction_distance;

        let controls = Controls {
            population_target,
            predator_quota,
            speed_factor,
            prey_reaction_distance,
            paused: self.controls.paused,
        };
        (controls, adjusted)
    }
}

fn log_pursuit(predator: EntityId, event: PursuitEvent) {
    match event {
        PursuitEvent::Acquired(target) => trace!(%predator, %target, "acquired target"),
        PursuitEvent::Lost(target) => trace!(%predator, %target, "target lost"),
        PursuitEvent::GaveUp(target) => trace!(%predator, %target, "gave up chase"),
        PursuitEvent::Idle | PursuitEvent::Chasing(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> SimConfig {
        let mut config = SimConfig::default();
        config.population.target = 0;
        config.population.maintained = false;
        config.rng_seed = Some(99);
        config
    }

    fn arena() -> Arena {
        Arena::new(DVec2::new(500.0, 500.0), 400.0)
    }

    #[test]
    fn test_new_seeds_configured_population() {
        let mut config = SimConfig::default();
        config.population.target = 30;
        config.population.predators = 4;
        config.rng_seed = Some(1);
        let sim = Simulation::new(config, arena()).unwrap();
        assert_eq!(sim.len(), 30);
        assert_eq!(sim.scoreboard().predator_count, 4);
        assert_eq!(sim.scoreboard().prey_count, 26);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = SimConfig::default();
        config.motion.speed_divisor = 0.0;
        assert!(Simulation::new(config, arena()).is_err());
    }

    #[test]
    fn test_configure_clamps() {
        let mut sim = Simulation::new(quiet_config(), arena()).unwrap();
        sim.configure(10_000, 20_000, 900.0, -4.0, false);
        let controls = sim.controls();
        assert_eq!(controls.population_target, 250);
        assert_eq!(controls.predator_quota, 250);
        assert_eq!(controls.speed_factor, 50.0);
        assert_eq!(controls.prey_reaction_distance, 0.0);

        sim.configure(10, 2, f64::NAN, f64::INFINITY, true);
        let controls = sim.controls();
        assert_eq!(controls.speed_factor, 5.0);
        assert_eq!(controls.prey_reaction_distance, 300.0);
        assert!(controls.paused);
    }

    #[test]
    fn test_quota_change_reseeds() {
        let mut config = quiet_config();
        config.population.target = 10;
        config.population.maintained = true;
        let mut sim = Simulation::new(config, arena()).unwrap();
        sim.configure(10, 1, 5.0, 300.0, false);
        let before: Vec<EntityId> = sim.snapshot().iter().map(|v| v.id).collect();

        // same quota: no reseed
        sim.configure(10, 1, 7.0, 300.0, false);
        let same: Vec<EntityId> = sim.snapshot().iter().map(|v| v.id).collect();
        assert_eq!(before, same);

        sim.configure(10, 3, 7.0, 300.0, false);
        let views = sim.snapshot();
        assert_eq!(views.len(), 10);
        assert!(views.iter().all(|v| !before.contains(&v.id)));
        assert_eq!(views.iter().filter(|v| v.role == Role::Predator).count(), 3);
    }

    #[test]
    fn test_reset_then_repeated_configure_applies() {
        let mut config = quiet_config();
        config.population.target = 20;
        config.population.predators = 2;
        let mut sim = Simulation::new(config, arena()).unwrap();
        sim.configure(20, 2, 5.0, 300.0, false);

        sim.reset(5, 1);
        assert_eq!(sim.controls().population_target, 5);
        let reseeded: Vec<EntityId> = sim.snapshot().iter().map(|v| v.id).collect();

        sim.configure(20, 2, 5.0, 300.0, false);
        assert_eq!(sim.controls().population_target, 20);
        assert_eq!(sim.controls().predator_quota, 2);
        let views = sim.snapshot();
        assert!(views.iter().all(|v| !reseeded.contains(&v.id)));
        assert_eq!(views.iter().filter(|v| v.role == Role::Predator).count(), 2);
    }

    #[test]
    fn test_clamped_quota_reseeds_once() {
        let mut config = quiet_config();
        config.population.target = 10;
        let mut sim = Simulation::new(config, arena()).unwrap();
        sim.configure(10, 40, 5.0, 300.0, false);
        assert_eq!(sim.controls().predator_quota, 10);
        let first: Vec<EntityId> = sim.snapshot().iter().map(|v| v.id).collect();

        sim.configure(10, 40, 5.0, 300.0, false);
        let again: Vec<EntityId> = sim.snapshot().iter().map(|v| v.id).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn test_empty_world_ticks() {
        let mut sim = Simulation::new(quiet_config(), arena()).unwrap();
        for _ in 0..10 {
            sim.tick(16.0);
        }
        assert!(sim.snapshot().is_empty());
        assert_eq!(sim.clock().ticks(), 10);
    }

    #[test]
    fn test_pause_freezes_translation_but_not_chase() {
        let mut sim = Simulation::new(quiet_config(), arena()).unwrap();
        let hunter = sim.spawn(Role::Predator, DVec2::new(400.0, 500.0), DVec2::ZERO, 4.0);
        let prey = sim.spawn(Role::Prey, DVec2::new(600.0, 500.0), DVec2::ZERO, 4.0);
        sim.configure(0, 0, 5.0, 300.0, true);

        sim.tick(100.0);
        sim.tick(100.0);
        let h = sim.entity(hunter).unwrap();
        assert_eq!(h.position, DVec2::new(400.0, 500.0));
        assert_eq!(h.target, Some(prey));
        assert!((h.chase_elapsed - 100.0).abs() < 1e-9);
        assert!(h.velocity.x > 0.0);
    }

    #[test]
    fn test_snapshot_flags_hunted_prey() {
        let mut sim = Simulation::new(quiet_config(), arena()).unwrap();
        sim.spawn(Role::Predator, DVec2::new(450.0, 500.0), DVec2::ZERO, 4.0);
        let near = sim.spawn(Role::Prey, DVec2::new(480.0, 500.0), DVec2::ZERO, 4.0);
        let far = sim.spawn(Role::Prey, DVec2::new(700.0, 500.0), DVec2::ZERO, 4.0);
        sim.configure(0, 0, 5.0, 10.0, true);
        sim.tick(16.0);

        let views = sim.snapshot();
        let flag = |id: EntityId| views.iter().find(|v| v.id == id).unwrap().is_target;
        assert!(flag(near));
        assert!(!flag(far));
    }
}
