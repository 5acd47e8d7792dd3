//! Pairwise interactions: collisions, radius transfer, deaths and flight.
//!
//! One subject is scanned against every other live entity. Deaths are only
//! tombstoned here; the tick driver compacts storage afterwards.

use crate::arena::Arena;
use crate::config::{InteractionConfig, SimConfig};
use crate::containment;
use crate::entity::{Entity, EntityId, Role};
use crate::movement;
use crate::population::Population;
use glam::DVec2;
use rand::Rng;

/// Another entity as seen by the subject at scan time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sighting {
    pub id: EntityId,
    pub role: Role,
    pub distance: f64,
}

/// A death caused by the subject of a scan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Kill {
    pub eater: EntityId,
    pub eater_role: Role,
    pub eaten: EntityId,
    pub position: DVec2,
}

#[derive(Clone, Debug, Default)]
pub struct ScanReport {
    pub kills: Vec<Kill>,
    /// Closest entity that survived the scan
    pub nearest: Option<Sighting>,
}

impl ScanReport {
    pub fn removed(&self) -> Vec<EntityId> {
        self.kills.iter().map(|k| k.eaten).collect()
    }
}

/// Runs the subject in `subject_slot` against every other live entity.
pub fn scan<R: Rng + ?Sized>(
    population: &mut Population,
    subject_slot: usize,
    arena: &Arena,
    config: &SimConfig,
    reaction_distance: f64,
    rng: &mut R,
) -> ScanReport {
    let mut report = ScanReport::default();
    let mut sightings = Vec::with_capacity(population.len());

    for other_slot in (0..population.len()).rev() {
        if other_slot == subject_slot || !population.is_slot_live(other_slot) {
            continue;
        }

        let (subject, other) = population.pair_mut(subject_slot, other_slot);
        let distance = subject.distance_to(other);
        let other_id = other.id;
        sightings.push(Sighting {
            id: other_id,
            role: other.role,
            distance,
        });

        if resolve_pair(subject, other, distance, config, reaction_distance, rng) {
            if subject.target == Some(other_id) {
                subject.set_target(None);
            }
            let kill = Kill {
                eater: subject.id,
                eater_role: subject.role,
                eaten: other_id,
                position: other.position,
            };
            if population.mark_removed(other_id) {
                sightings.retain(|s| s.id != other_id);
                report.kills.push(kill);
            }
        }

        containment::apply(population.slot_mut(subject_slot), arena);
    }

    report.nearest = sightings
        .into_iter()
        .min_by(|a, b| a.distance.total_cmp(&b.distance));
    report
}

/// Resolves one ordered pair. Returns true when `other` has been eaten down
/// to its floor.
pub fn resolve_pair<R: Rng + ?Sized>(
    subject: &mut Entity,
    other: &mut Entity,
    distance: f64,
    config: &SimConfig,
    reaction_distance: f64,
    rng: &mut R,
) -> bool {
    let rules = &config.interaction;

    if distance <= subject.radius + other.radius {
        if rules.prey_collide
            && subject.is_prey()
            && other.is_prey()
            && !subject.collided
            && !other.collided
        {
            bounce(subject, other, distance);
            subject.collided = true;
            other.collided = true;
        }

        let shrank = transfer(subject, other, rules);
        let consumed = shrank && other.is_spent(&config.body);

        let max = config.body.max_radius;
        subject.radius = subject.radius.min(max);
        other.radius = other.radius.min(max);
        consumed
    } else {
        if subject.is_prey() && other.is_predator() && distance < reaction_distance {
            let escape = movement::flee(subject, other.position, rules.flee_jitter_degrees, rng);
            subject.velocity += escape;
        }
        false
    }
}

/// Moves radius from the loser to the winner. Returns whether `other` shrank.
fn transfer(subject: &mut Entity, other: &mut Entity, rules: &InteractionConfig) -> bool {
    match (subject.role, other.role) {
        // predators always win
        (Role::Predator, Role::Prey) => {
            if rules.growth_enabled {
                subject.radius += rules.predator_gain();
            }
            other.radius -= rules.radius_transfer;
            true
        }
        (Role::Prey, Role::Prey) if rules.prey_eats_prey && subject.radius > other.radius => {
            if rules.growth_enabled {
                subject.radius += rules.prey_gain();
            }
            other.radius -= rules.radius_transfer;
            true
        }
        _ => false,
    }
}

/// Pushes two overlapping prey apart and swaps the velocity components along
/// the contact line.
fn bounce(a: &mut Entity, b: &mut Entity, distance: f64) {
    let overlap = a.radius + b.radius - distance;
    let normal = if distance > f64::EPSILON {
        (b.position - a.position) / distance
    } else {
        // coincident centres: fall back to the angle between the headings
        DVec2::from_angle(heading(b.velocity) - heading(a.velocity))
    };
    a.position -= normal * overlap;
    b.position += normal * overlap;

    let tangent = (b.position - a.position).perp().normalize_or_zero();
    let relative = a.velocity - b.velocity;
    if relative.dot(normal) <= 0.0 {
        // already separating
        return;
    }
    let along_tangent = tangent * relative.dot(tangent);
    let across = relative - along_tangent;
    a.velocity -= across;
    b.velocity += across;
}

#[inline]
fn heading(v: DVec2) -> f64 {
    v.y.atan2(v.x)
}
