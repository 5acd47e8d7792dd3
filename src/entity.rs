use crate::config::BodyConfig;
use glam::DVec2;
use std::fmt;

/// Number of shades in the prey palette.
pub const PREY_SHADES: u8 = 10;

/// Stable identity of a life form. Assigned once, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Predator,
    Prey,
}

impl Role {
    /// Radius below which this role cannot go.
    #[inline]
    pub fn radius_floor(self, body: &BodyConfig) -> f64 {
        match self {
            Role::Predator => body.min_predator_radius,
            Role::Prey => body.min_radius,
        }
    }
}

/// A life form in the dish.
#[derive(Clone, Debug)]
pub struct Entity {
    pub id: EntityId,
    pub position: DVec2,
    pub velocity: DVec2,
    pub max_speed: f64,
    pub radius: f64,
    pub role: Role,
    /// Prey currently pursued; only predators ever set this.
    pub target: Option<EntityId>,
    /// Milliseconds spent on the current target
    pub chase_elapsed: f64,
    /// Display-only palette index
    pub shade: u8,
    /// Set once a prey/prey bounce has been resolved this tick
    pub(crate) collided: bool,
}

impl Entity {
    pub fn new(
        id: EntityId,
        role: Role,
        position: DVec2,
        velocity: DVec2,
        max_speed: f64,
        radius: f64,
    ) -> Self {
        Entity {
            id,
            position,
            velocity,
            max_speed,
            radius,
            role,
            target: None,
            chase_elapsed: 0.0,
            shade: 0,
            collided: false,
        }
    }

    #[inline]
    pub fn is_predator(&self) -> bool {
        self.role == Role::Predator
    }

    #[inline]
    pub fn is_prey(&self) -> bool {
        self.role == Role::Prey
    }

    #[inline]
    pub fn distance_to(&self, other: &Entity) -> f64 {
        self.position.distance(other.position)
    }

    /// Switches pursuit to `target`, restarting the chase timer.
    pub fn set_target(&mut self, target: Option<EntityId>) {
        self.target = target;
        self.chase_elapsed = 0.0;
    }

    /// Clamps the radius into `[floor(role), max_radius]`.
    pub fn clamp_radius(&mut self, body: &BodyConfig) {
        self.radius = self
            .radius
            .clamp(self.role.radius_floor(body), body.max_radius);
    }

    /// True once the radius has shrunk to the floor of its role.
    #[inline]
    pub fn is_spent(&self, body: &BodyConfig) -> bool {
        self.radius <= self.role.radius_floor(body)
    }
}

/// Read-only view of an entity handed to renderers after a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityView {
    pub id: EntityId,
    pub position: DVec2,
    pub radius: f64,
    pub role: Role,
    /// Some predator currently has this entity as its target
    pub is_target: bool,
    pub shade: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prey(radius: f64) -> Entity {
        Entity::new(EntityId(1), Role::Prey, DVec2::ZERO, DVec2::ZERO, 25.0, radius)
    }

    #[test]
    fn test_floors_differ_by_role() {
        let body = BodyConfig::default();
        assert_eq!(Role::Prey.radius_floor(&body), 1.0);
        assert_eq!(Role::Predator.radius_floor(&body), 3.0);
    }

    #[test]
    fn test_clamp_radius() {
        let body = BodyConfig::default();
        let mut big = prey(40.0);
        big.clamp_radius(&body);
        assert_eq!(big.radius, body.max_radius);

        let mut hunter = Entity::new(
            EntityId(2),
            Role::Predator,
            DVec2::ZERO,
            DVec2::ZERO,
            56.25,
            1.5,
        );
        hunter.clamp_radius(&body);
        assert_eq!(hunter.radius, body.min_predator_radius);
    }

    #[test]
    fn test_set_target_resets_timer() {
        let mut e = prey(4.0);
        e.chase_elapsed = 1234.0;
        e.set_target(Some(EntityId(9)));
        assert_eq!(e.target, Some(EntityId(9)));
        assert_eq!(e.chase_elapsed, 0.0);
    }

    #[test]
    fn test_is_spent() {
        let body = BodyConfig::default();
        assert!(prey(1.0).is_spent(&body));
        assert!(prey(0.8).is_spent(&body));
        assert!(!prey(1.2).is_spent(&body));
    }
}
