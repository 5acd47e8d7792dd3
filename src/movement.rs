//! Per-entity motion: metabolism, integration and the steering vectors used
//! by pursuit and flight.

use crate::arena::Arena;
use crate::config::BodyConfig;
use crate::containment;
use crate::entity::Entity;
use glam::DVec2;
use rand::Rng;
use std::f64::consts::PI;

/// Predators burn a little radius every tick, never going below their floor.
#[inline]
pub fn metabolize(entity: &mut Entity, body: &BodyConfig) {
    if entity.is_predator() {
        entity.radius = (entity.radius - body.metabolic_shrink).max(body.min_predator_radius);
    }
}

/// Hook for periodic prey heading changes. Prey currently keep their heading
/// and only turn through collisions and flight.
#[inline]
fn retune_heading(_entity: &mut Entity) {}

/// Contains, speed-limits and translates one entity.
///
/// `dt_scaled` is the wall-clock delta already multiplied by the speed factor;
/// a paused simulation passes zero.
pub fn advance(entity: &mut Entity, arena: &Arena, dt_scaled: f64) {
    if entity.is_prey() {
        retune_heading(entity);
    }

    containment::apply(entity, arena);

    entity.velocity = entity.velocity.clamp_length_max(entity.max_speed);
    entity.position += entity.velocity * dt_scaled;
}

/// Steering towards `target`: desired velocity at full speed minus current one.
#[inline]
pub fn seek(entity: &Entity, target: DVec2) -> DVec2 {
    let desired = (target - entity.position).normalize_or_zero() * entity.max_speed;
    desired - entity.velocity
}

/// Steering away from `threat`: the seek vector turned by half a revolution
/// plus up to `jitter_degrees`, so head-on escapes don't lock up.
pub fn flee<R: Rng + ?Sized>(
    entity: &Entity,
    threat: DVec2,
    jitter_degrees: f64,
    rng: &mut R,
) -> DVec2 {
    let jitter = jitter_degrees.to_radians() * rng.gen::<f64>();
    DVec2::from_angle(PI + jitter).rotate(seek(entity, threat))
}
