//! Predator target selection and timed pursuit.

use crate::config::PursuitConfig;
use crate::entity::{Entity, EntityId, Role};
use crate::interaction::Sighting;
use crate::movement;
use glam::DVec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PursuitState {
    Idle,
    Pursuing(EntityId),
}

impl PursuitState {
    pub fn of(entity: &Entity) -> Self {
        match entity.target {
            Some(id) => PursuitState::Pursuing(id),
            None => PursuitState::Idle,
        }
    }
}

/// Outcome of one pursuit update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PursuitEvent {
    /// Nothing worth chasing
    Idle,
    Acquired(EntityId),
    Chasing(EntityId),
    /// Target vanished from the population
    Lost(EntityId),
    /// Chased for too long
    GaveUp(EntityId),
}

/// The entity whose position [`update`] needs: the current target, or the
/// nearest sighting if it is prey and the predator is idle.
pub fn candidate(predator: &Entity, nearest: Option<Sighting>) -> Option<EntityId> {
    predator.target.or_else(|| {
        nearest
            .filter(|s| s.role == Role::Prey)
            .map(|s| s.id)
    })
}

/// Advances the pursuit state machine of one predator.
///
/// `located` is the live position of [`candidate`], or `None` if it no longer
/// exists. The seek nudge is added on top of the current velocity; the speed
/// clamp in the movement step is the only limit.
pub fn update(
    predator: &mut Entity,
    nearest: Option<Sighting>,
    located: Option<DVec2>,
    dt_ms: f64,
    rules: &PursuitConfig,
) -> PursuitEvent {
    let acquired = match predator.target {
        Some(_) => {
            predator.chase_elapsed += dt_ms;
            false
        }
        None => match nearest.filter(|s| s.role == Role::Prey) {
            Some(sighting) => {
                predator.set_target(Some(sighting.id));
                true
            }
            None => return PursuitEvent::Idle,
        },
    };

    let Some(target) = predator.target else {
        return PursuitEvent::Idle;
    };

    match located {
        None => {
            predator.set_target(None);
            PursuitEvent::Lost(target)
        }
        Some(_) if predator.chase_elapsed >= rules.give_up_ms => {
            predator.set_target(None);
            PursuitEvent::GaveUp(target)
        }
        Some(position) => {
            let steer = movement::seek(predator, position);
            predator.velocity += steer;
            if acquired {
                PursuitEvent::Acquired(target)
            } else {
                PursuitEvent::Chasing(target)
            }
        }
    }
}
