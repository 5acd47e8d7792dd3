//! Soft boundary: entities drifting past the rim get their velocity bent back
//! towards the interior. Positions are never clamped.

use crate::arena::Arena;
use crate::entity::Entity;

/// Steers `entity` back inside `arena` if it has crossed `radius - entity.radius`.
/// Returns whether a correction was applied.
pub fn apply(entity: &mut Entity, arena: &Arena) -> bool {
    let offset = entity.position - arena.center;
    let distance = offset.length();
    if distance <= arena.radius - entity.radius {
        return false;
    }

    // Pull against the outward offset plus a small nudge along the inward
    // heading that fades with the size of the dish.
    let inward = (-offset).normalize_or_zero();
    let reach = arena.radius + entity.radius;
    let nudge = if reach > 0.0 { inward / reach } else { inward };
    entity.velocity -= offset - nudge;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityId, Role};
    use glam::DVec2;

    fn arena() -> Arena {
        Arena::new(DVec2::new(100.0, 100.0), 50.0)
    }

    fn at(position: DVec2, velocity: DVec2) -> Entity {
        Entity::new(EntityId(0), Role::Prey, position, velocity, 25.0, 4.0)
    }

    #[test]
    fn test_inside_is_untouched() {
        let mut e = at(DVec2::new(120.0, 100.0), DVec2::new(10.0, 3.0));
        assert!(!apply(&mut e, &arena()));
        assert_eq!(e.velocity, DVec2::new(10.0, 3.0));
    }

    #[test]
    fn test_outside_is_steered_inward() {
        let mut e = at(DVec2::new(149.0, 100.0), DVec2::new(25.0, 0.0));
        assert!(apply(&mut e, &arena()));
        assert!(e.velocity.x < 0.0);
        // position is left alone
        assert_eq!(e.position, DVec2::new(149.0, 100.0));
    }

    #[test]
    fn test_correction_points_to_center_on_any_side() {
        let arena = arena();
        for angle in [0.3_f64, 1.9, 3.5, 5.1] {
            let pos = arena.center + DVec2::from_angle(angle) * 60.0;
            let mut e = at(pos, DVec2::ZERO);
            apply(&mut e, &arena);
            let to_center = arena.center - pos;
            assert!(e.velocity.dot(to_center) > 0.0);
        }
    }
}
