use glam::DVec2;
use rand::Rng;
use std::f64::consts::TAU;

/// The circular dish every life form lives in. Fixed for a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arena {
    pub center: DVec2,
    pub radius: f64,
}

impl Arena {
    pub fn new(center: DVec2, radius: f64) -> Self {
        Arena {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Largest dish centred in a `width` x `height` viewport, leaving `margin`
    /// pixels free in total along the shorter side.
    pub fn fit_viewport(width: f64, height: f64, margin: f64) -> Self {
        let radius = (width.min(height) - margin) / 2.0;
        Arena::new(DVec2::new(width / 2.0, height / 2.0), radius)
    }

    #[inline]
    pub fn distance_from_center(&self, point: DVec2) -> f64 {
        point.distance(self.center)
    }

    /// Area-uniform sample inside `fraction` of the radius.
    pub fn sample_point<R: Rng + ?Sized>(&self, rng: &mut R, fraction: f64) -> DVec2 {
        let angle = rng.gen_range(0.0..TAU);
        let dist = fraction * self.radius * rng.gen::<f64>().sqrt();
        self.center + DVec2::from_angle(angle) * dist
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn test_fit_viewport() {
        let arena = Arena::fit_viewport(1200.0, 900.0, 100.0);
        assert_eq!(arena.center, DVec2::new(600.0, 450.0));
        assert!((arena.radius - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_tiny_viewport_has_no_negative_radius() {
        let arena = Arena::fit_viewport(50.0, 50.0, 100.0);
        assert_eq!(arena.radius, 0.0);
    }

    #[test]
    fn test_samples_stay_inside_fraction() {
        let arena = Arena::new(DVec2::new(10.0, -5.0), 200.0);
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..1000 {
            let p = arena.sample_point(&mut rng, 0.9);
            assert!(arena.distance_from_center(p) <= 180.0 + 1e-9);
        }
    }
}
