//! Configuration for the petri dish simulation.
//!
//! Loaded from YAML, every section falls back to the tuned defaults below.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete simulation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub population: PopulationConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub body: BodyConfig,
    #[serde(default)]
    pub interaction: InteractionConfig,
    #[serde(default)]
    pub pursuit: PursuitConfig,
    /// Optional RNG seed; entropy is used when absent.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

/// Population size and maintenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Number of life forms the manager tracks
    pub target: u32,
    /// The first `predators` created after a reset are predators
    pub predators: u32,
    /// Hard upper bound for `target`
    pub max_population: u32,
    /// Top up and trim to `target` at the start of every tick
    pub maintained: bool,
    /// Fraction of the arena radius used for spawn positions
    pub spawn_radius_fraction: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            target: 250,
            predators: 1,
            max_population: 250,
            maintained: true,
            spawn_radius_fraction: 0.9,
        }
    }
}

/// Speeds and time scaling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Prey speed limit; also the upper bound of spawn speed
    pub base_max_speed: f64,
    /// Predator speed limit as a multiple of `base_max_speed`
    pub predator_speed_multiplier: f64,
    /// Lower bound of spawn speed
    pub min_spawn_speed: f64,
    /// Initial global speed factor
    pub speed_factor: f64,
    /// Upper bound for the speed factor
    pub max_speed_factor: f64,
    /// `dt_scaled = dt_wall_ms * speed_factor / speed_divisor`
    pub speed_divisor: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            base_max_speed: 25.0,
            predator_speed_multiplier: 2.25,
            min_spawn_speed: 5.0,
            speed_factor: 5.0,
            max_speed_factor: 50.0,
            speed_divisor: 2000.0,
        }
    }
}

/// Radius bounds, starting sizes and metabolism.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    /// Prey die once their radius reaches this floor
    pub min_radius: f64,
    /// Predators never shrink below this
    pub min_predator_radius: f64,
    pub max_radius: f64,
    pub predator_start_radius: f64,
    pub prey_radius_mean: f64,
    pub prey_radius_std_dev: f64,
    /// Smallest radius a freshly spawned prey may have
    pub prey_start_floor: f64,
    /// Radius predators lose every tick
    pub metabolic_shrink: f64,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            min_radius: 1.0,
            min_predator_radius: 3.0,
            max_radius: 16.0,
            predator_start_radius: 4.0,
            prey_radius_mean: 4.0,
            prey_radius_std_dev: 2.0,
            prey_start_floor: 2.0,
            metabolic_shrink: 0.02,
        }
    }
}

/// Collision, predation and flee behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Radius the losing side of a transfer gives up
    pub radius_transfer: f64,
    /// Share of `radius_transfer` a predator gains
    pub predator_gain_ratio: f64,
    /// Share of `radius_transfer` a cannibal prey gains
    pub prey_gain_ratio: f64,
    /// When false nobody grows from feeding
    pub growth_enabled: bool,
    /// Prey bounce off each other
    pub prey_collide: bool,
    /// Larger prey feed on smaller prey
    pub prey_eats_prey: bool,
    /// Prey flee predators closer than this
    pub prey_reaction_distance: f64,
    /// Random extra rotation of the flee vector, in degrees
    pub flee_jitter_degrees: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            radius_transfer: 0.2,
            predator_gain_ratio: 0.3,
            prey_gain_ratio: 0.5,
            growth_enabled: true,
            prey_collide: true,
            prey_eats_prey: false,
            prey_reaction_distance: 300.0,
            flee_jitter_degrees: 1.0,
        }
    }
}

impl InteractionConfig {
    pub fn predator_gain(&self) -> f64 {
        self.radius_transfer * self.predator_gain_ratio
    }

    pub fn prey_gain(&self) -> f64 {
        self.radius_transfer * self.prey_gain_ratio
    }
}

/// Predator pursuit timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PursuitConfig {
    /// Chase time in ms after which a predator abandons its target
    pub give_up_ms: f64,
}

impl Default for PursuitConfig {
    fn default() -> Self {
        Self { give_up_ms: 4000.0 }
    }
}

impl SimConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: SimConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.float_fields().iter().all(|v| v.is_finite()) {
            return Err(ConfigError::Invalid("numeric settings must be finite"));
        }
        let body = &self.body;
        if body.min_radius <= 0.0 || body.max_radius <= 0.0 {
            return Err(ConfigError::Invalid("radii must be positive"));
        }
        if body.min_radius >= body.max_radius {
            return Err(ConfigError::Invalid("min_radius must be below max_radius"));
        }
        if body.min_predator_radius < body.min_radius || body.min_predator_radius > body.max_radius
        {
            return Err(ConfigError::Invalid(
                "min_predator_radius must lie between min_radius and max_radius",
            ));
        }
        if body.prey_radius_std_dev < 0.0 || body.metabolic_shrink < 0.0 {
            return Err(ConfigError::Invalid(
                "prey_radius_std_dev and metabolic_shrink must not be negative",
            ));
        }
        let motion = &self.motion;
        if motion.base_max_speed <= 0.0 || motion.predator_speed_multiplier <= 0.0 {
            return Err(ConfigError::Invalid("speeds must be positive"));
        }
        if motion.min_spawn_speed < 0.0 || motion.min_spawn_speed >= motion.base_max_speed {
            return Err(ConfigError::Invalid(
                "min_spawn_speed must lie in [0, base_max_speed)",
            ));
        }
        if motion.speed_divisor <= 0.0 {
            return Err(ConfigError::Invalid("speed_divisor must be positive"));
        }
        if motion.max_speed_factor < 0.0 {
            return Err(ConfigError::Invalid("max_speed_factor must not be negative"));
        }
        let interaction = &self.interaction;
        if interaction.radius_transfer < 0.0
            || interaction.predator_gain_ratio < 0.0
            || interaction.prey_gain_ratio < 0.0
        {
            return Err(ConfigError::Invalid("transfer values must not be negative"));
        }
        let fraction = self.population.spawn_radius_fraction;
        if !(0.0..=1.0).contains(&fraction) {
            return Err(ConfigError::Invalid(
                "spawn_radius_fraction must be between 0.0 and 1.0",
            ));
        }
        if self.pursuit.give_up_ms <= 0.0 {
            return Err(ConfigError::Invalid("give_up_ms must be positive"));
        }
        Ok(())
    }

    fn float_fields(&self) -> [f64; 21] {
        let (p, m, b, i) = (&self.population, &self.motion, &self.body, &self.interaction);
        [
            p.spawn_radius_fraction,
            m.base_max_speed,
            m.predator_speed_multiplier,
            m.min_spawn_speed,
            m.speed_factor,
            m.max_speed_factor,
            m.speed_divisor,
            b.min_radius,
            b.min_predator_radius,
            b.max_radius,
            b.predator_start_radius,
            b.prey_radius_mean,
            b.prey_radius_std_dev,
            b.prey_start_floor,
            b.metabolic_shrink,
            i.radius_transfer,
            i.predator_gain_ratio,
            i.prey_gain_ratio,
            i.prey_reaction_distance,
            i.flee_jitter_degrees,
            self.pursuit.give_up_ms,
        ]
    }
}
