//! Predator and prey life forms in a circular petri dish.
//!
//! The crate is the simulation engine only. A driver (the bundled `ggez`
//! viewer, or anything else) feeds [`Simulation::configure`] and
//! [`Simulation::tick`] once per frame and draws from
//! [`Simulation::snapshot`].

pub mod arena;
pub mod clock;
pub mod config;
pub mod containment;
pub mod entity;
pub mod error;
pub mod interaction;
pub mod movement;
pub mod population;
pub mod simulation;
pub mod stats;
pub mod targeting;

pub use arena::Arena;
pub use config::SimConfig;
pub use entity::{Entity, EntityId, EntityView, Role};
pub use error::ConfigError;
pub use simulation::{Controls, Simulation};
pub use stats::ScoreBoard;
