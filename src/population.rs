//! Entity storage and population maintenance.
//!
//! Entities live in a `Vec` in creation order. Deaths during a tick are
//! tombstoned in a pending set and compacted once the tick is over, so slot
//! indices stay stable while the interaction scan runs.

use crate::arena::Arena;
use crate::config::SimConfig;
use crate::entity::{Entity, EntityId, Role, PREY_SHADES};
use glam::DVec2;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;
use tracing::debug;

/// What a call to [`Population::reconcile`] changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reconciliation {
    pub spawned: Vec<EntityId>,
    pub trimmed: Vec<EntityId>,
}

#[derive(Debug, Default)]
pub struct Population {
    entities: Vec<Entity>,
    index: HashMap<EntityId, usize>,
    pending: HashSet<EntityId>,
    next_id: u64,
    /// Top-up creations since the last reset; decides predator roles
    ordinal: u64,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entities, including ones tombstoned this tick.
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index.get(&id).map(|&slot| &self.entities[slot])
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.index.get(&id).map(|&slot| &mut self.entities[slot])
    }

    #[inline]
    pub(crate) fn slot(&self, slot: usize) -> &Entity {
        &self.entities[slot]
    }

    #[inline]
    pub(crate) fn slot_mut(&mut self, slot: usize) -> &mut Entity {
        &mut self.entities[slot]
    }

    /// Mutable access to two distinct slots at once.
    pub(crate) fn pair_mut(&mut self, a: usize, b: usize) -> (&mut Entity, &mut Entity) {
        assert_ne!(a, b, "pair_mut needs two distinct slots");
        if a < b {
            let (head, tail) = self.entities.split_at_mut(b);
            (&mut head[a], &mut tail[0])
        } else {
            let (head, tail) = self.entities.split_at_mut(a);
            (&mut tail[0], &mut head[b])
        }
    }

    /// Stored and not tombstoned.
    #[inline]
    pub fn is_live(&self, id: EntityId) -> bool {
        self.index.contains_key(&id) && !self.pending.contains(&id)
    }

    #[inline]
    pub(crate) fn is_slot_live(&self, slot: usize) -> bool {
        !self.pending.contains(&self.entities[slot].id)
    }

    /// Position of a live entity.
    pub fn live_position(&self, id: EntityId) -> Option<DVec2> {
        if self.pending.contains(&id) {
            return None;
        }
        self.get(id).map(|e| e.position)
    }

    /// Tombstones `id`. Returns false if it was already marked or is unknown,
    /// so each death is finalised once.
    pub fn mark_removed(&mut self, id: EntityId) -> bool {
        self.index.contains_key(&id) && self.pending.insert(id)
    }

    /// Drops every tombstoned entity, clears targets that pointed at them and
    /// returns their ids.
    pub fn flush_removals(&mut self) -> Vec<EntityId> {
        if self.pending.is_empty() {
            return Vec::new();
        }
        let pending = std::mem::take(&mut self.pending);
        self.entities.retain(|e| !pending.contains(&e.id));
        self.rebuild_index();
        self.clear_targets_in(&pending);

        let mut removed: Vec<EntityId> = pending.into_iter().collect();
        removed.sort_unstable();
        removed
    }

    /// Clears per-tick collision flags.
    pub(crate) fn begin_tick(&mut self) {
        for entity in &mut self.entities {
            entity.collided = false;
        }
    }

    /// Removes everything and restarts role assignment. Ids keep counting up.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.index.clear();
        self.pending.clear();
        self.ordinal = 0;
    }

    /// Ids currently targeted by at least one predator.
    pub fn hunted(&self) -> HashSet<EntityId> {
        self.entities
            .iter()
            .filter(|e| e.is_predator())
            .filter_map(|e| e.target)
            .collect()
    }

    /// Tops up or trims the population to `target_count`.
    ///
    /// New entities become predators while the creation ordinal is below
    /// `predator_quota`. Excess entities are removed from the tail, newest
    /// first, without reordering survivors.
    pub fn reconcile<R: Rng + ?Sized>(
        &mut self,
        target_count: u32,
        predator_quota: u32,
        arena: &Arena,
        config: &SimConfig,
        rng: &mut R,
    ) -> Reconciliation {
        let target_count = target_count as usize;
        let mut report = Reconciliation::default();

        if self.entities.len() < target_count {
            for _ in self.entities.len()..target_count {
                report
                    .spawned
                    .push(self.create(predator_quota, arena, config, rng));
            }
        } else if self.entities.len() > target_count {
            report.trimmed = self.entities[target_count..]
                .iter()
                .map(|e| e.id)
                .collect();
            self.entities.truncate(target_count);
            self.rebuild_index();
            let trimmed: HashSet<EntityId> = report.trimmed.iter().copied().collect();
            self.pending.retain(|id| !trimmed.contains(id));
            self.clear_targets_in(&trimmed);
        }

        if !report.spawned.is_empty() || !report.trimmed.is_empty() {
            debug!(
                spawned = report.spawned.len(),
                trimmed = report.trimmed.len(),
                population = self.entities.len(),
                "reconciled population"
            );
        }
        report
    }

    /// Creates one randomised entity.
    fn create<R: Rng + ?Sized>(
        &mut self,
        predator_quota: u32,
        arena: &Arena,
        config: &SimConfig,
        rng: &mut R,
    ) -> EntityId {
        let role = if self.ordinal < u64::from(predator_quota) {
            Role::Predator
        } else {
            Role::Prey
        };
        self.ordinal += 1;

        let position = arena.sample_point(rng, config.population.spawn_radius_fraction);
        let motion = &config.motion;
        let speed = rng.gen_range(motion.min_spawn_speed..motion.base_max_speed);
        let velocity = DVec2::from_angle(rng.gen_range(0.0..TAU)) * speed;

        let body = &config.body;
        let radius = match role {
            Role::Predator => body.predator_start_radius,
            Role::Prey => {
                let sampled = match Normal::new(body.prey_radius_mean, body.prey_radius_std_dev) {
                    Ok(normal) => normal.sample(rng),
                    Err(_) => body.prey_radius_mean,
                };
                sampled.max(body.prey_start_floor)
            }
        };

        let id = self.insert(role, position, velocity, radius, config);
        let shade = rng.gen_range(0..PREY_SHADES);
        if let Some(entity) = self.get_mut(id) {
            entity.shade = shade;
        }
        id
    }

    /// Appends an entity with explicit state. The radius is clamped to the
    /// role's bounds and the speed limit follows the role.
    ///
    /// Only [`Population::reconcile`] advances the role ordinal, so inserted
    /// entities never shift which later top-ups become predators.
    pub fn insert(
        &mut self,
        role: Role,
        position: DVec2,
        velocity: DVec2,
        radius: f64,
        config: &SimConfig,
    ) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;

        let max_speed = match role {
            Role::Predator => {
                config.motion.base_max_speed * config.motion.predator_speed_multiplier
            }
            Role::Prey => config.motion.base_max_speed,
        };
        let mut entity = Entity::new(id, role, position, velocity, max_speed, radius);
        entity.clamp_radius(&config.body);

        self.index.insert(id, self.entities.len());
        self.entities.push(entity);
        id
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (slot, entity) in self.entities.iter().enumerate() {
            self.index.insert(entity.id, slot);
        }
    }

    fn clear_targets_in(&mut self, gone: &HashSet<EntityId>) {
        for entity in &mut self.entities {
            if entity.target.is_some_and(|t| gone.contains(&t)) {
                entity.set_target(None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    fn setup() -> (Population, Arena, SimConfig, SmallRng) {
        (
            Population::new(),
            Arena::new(DVec2::new(400.0, 400.0), 350.0),
            SimConfig::default(),
            SmallRng::seed_from_u64(5),
        )
    }

    #[test]
    fn test_reconcile_tops_up_with_quota() {
        let (mut pop, arena, config, mut rng) = setup();
        let report = pop.reconcile(12, 3, &arena, &config, &mut rng);
        assert_eq!(report.spawned.len(), 12);
        assert_eq!(pop.len(), 12);

        let roles: Vec<Role> = pop.iter().map(|e| e.role).collect();
        assert!(roles[..3].iter().all(|r| *r == Role::Predator));
        assert!(roles[3..].iter().all(|r| *r == Role::Prey));
    }

    #[test]
    fn test_spawned_state_is_in_range() {
        let (mut pop, arena, config, mut rng) = setup();
        pop.reconcile(200, 5, &arena, &config, &mut rng);
        for e in pop.iter() {
            assert!(arena.distance_from_center(e.position) <= arena.radius * 0.9 + 1e-9);
            let speed = e.velocity.length();
            assert!(speed >= 5.0 - 1e-9 && speed < 25.0);
            assert!(e.radius >= e.role.radius_floor(&config.body));
            assert!(e.radius <= config.body.max_radius);
            assert!(e.shade < PREY_SHADES);
            if e.is_prey() {
                assert!(e.radius >= config.body.prey_start_floor);
                assert_eq!(e.max_speed, 25.0);
            } else {
                assert_eq!(e.radius, 4.0);
                assert!((e.max_speed - 56.25).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_reconcile_trims_newest() {
        let (mut pop, arena, config, mut rng) = setup();
        pop.reconcile(10, 1, &arena, &config, &mut rng);
        let before: Vec<EntityId> = pop.iter().map(|e| e.id).collect();

        let report = pop.reconcile(6, 1, &arena, &config, &mut rng);
        assert_eq!(report.trimmed, before[6..].to_vec());
        let after: Vec<EntityId> = pop.iter().map(|e| e.id).collect();
        assert_eq!(after, before[..6].to_vec());
    }

    #[test]
    fn test_trim_clears_dangling_targets() {
        let (mut pop, arena, config, mut rng) = setup();
        pop.reconcile(4, 1, &arena, &config, &mut rng);
        let hunter = pop.iter().next().unwrap().id;
        let last = pop.iter().last().unwrap().id;
        let slot = pop.index[&hunter];
        pop.slot_mut(slot).set_target(Some(last));

        pop.reconcile(3, 1, &arena, &config, &mut rng);
        assert_eq!(pop.get(hunter).unwrap().target, None);
    }

    #[test]
    fn test_ids_never_reused_across_clear() {
        let (mut pop, arena, config, mut rng) = setup();
        pop.reconcile(3, 1, &arena, &config, &mut rng);
        pop.clear();
        pop.reconcile(3, 1, &arena, &config, &mut rng);
        let ids: Vec<u64> = pop.iter().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![3, 4, 5]);
        // role assignment restarts after a clear
        assert!(pop.iter().next().unwrap().is_predator());
    }

    #[test]
    fn test_removal_is_idempotent() {
        let (mut pop, arena, config, mut rng) = setup();
        pop.reconcile(3, 0, &arena, &config, &mut rng);
        let victim = pop.iter().nth(1).unwrap().id;
        assert!(pop.mark_removed(victim));
        assert!(!pop.mark_removed(victim));
        assert!(!pop.is_live(victim));
        assert_eq!(pop.len(), 3);

        assert_eq!(pop.flush_removals(), vec![victim]);
        assert_eq!(pop.len(), 2);
        assert!(pop.get(victim).is_none());
        assert!(!pop.mark_removed(victim));
    }

    #[test]
    fn test_pair_mut_both_orders() {
        let (mut pop, arena, config, mut rng) = setup();
        pop.reconcile(3, 0, &arena, &config, &mut rng);
        let (a, b) = pop.pair_mut(2, 0);
        assert_eq!(a.id, EntityId(2));
        assert_eq!(b.id, EntityId(0));
        let (a, b) = pop.pair_mut(0, 1);
        assert_eq!(a.id, EntityId(0));
        assert_eq!(b.id, EntityId(1));
    }

    #[test]
    fn test_insert_leaves_role_ordinal_alone() {
        let (mut pop, arena, config, mut rng) = setup();
        pop.insert(Role::Prey, DVec2::ZERO, DVec2::ZERO, 4.0, &config);
        pop.insert(Role::Prey, DVec2::ZERO, DVec2::ZERO, 4.0, &config);
        pop.reconcile(4, 1, &arena, &config, &mut rng);
        let roles: Vec<Role> = pop.iter().map(|e| e.role).collect();
        assert_eq!(roles, vec![Role::Prey, Role::Prey, Role::Predator, Role::Prey]);
    }

    #[test]
    fn test_zero_target_empties() {
        let (mut pop, arena, config, mut rng) = setup();
        pop.reconcile(5, 1, &arena, &config, &mut rng);
        pop.reconcile(0, 1, &arena, &config, &mut rng);
        assert!(pop.is_empty());
        assert!(pop.hunted().is_empty());
    }
}
