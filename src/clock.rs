/// Time deltas for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    /// Wall-clock milliseconds since the previous frame
    pub dt_ms: f64,
    /// Movement multiplier; zero while paused
    pub dt_scaled: f64,
}

/// Counts ticks and simulated wall time.
#[derive(Clone, Debug, Default)]
pub struct SimulationClock {
    elapsed_ms: f64,
    ticks: u64,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one frame. Negative or non-finite deltas count as zero.
    pub fn step(&mut self, dt_wall_ms: f64, speed_factor: f64, paused: bool, divisor: f64) -> Step {
        let dt_ms = if dt_wall_ms.is_finite() {
            dt_wall_ms.max(0.0)
        } else {
            0.0
        };
        self.elapsed_ms += dt_ms;
        self.ticks += 1;

        let dt_scaled = if paused {
            0.0
        } else {
            dt_ms * speed_factor / divisor
        };
        Step { dt_ms, dt_scaled }
    }

    #[inline]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaling() {
        let mut clock = SimulationClock::new();
        let step = clock.step(20.0, 5.0, false, 2000.0);
        assert!((step.dt_scaled - 0.05).abs() < 1e-12);
        assert_eq!(step.dt_ms, 20.0);
        assert_eq!(clock.ticks(), 1);
    }

    #[test]
    fn test_pause_keeps_wall_time() {
        let mut clock = SimulationClock::new();
        let step = clock.step(16.0, 5.0, true, 2000.0);
        assert_eq!(step.dt_scaled, 0.0);
        assert_eq!(step.dt_ms, 16.0);
        assert_eq!(clock.elapsed_ms(), 16.0);
    }

    #[test]
    fn test_bad_deltas_are_zero() {
        let mut clock = SimulationClock::new();
        assert_eq!(clock.step(-5.0, 5.0, false, 2000.0).dt_ms, 0.0);
        assert_eq!(clock.step(f64::NAN, 5.0, false, 2000.0).dt_scaled, 0.0);
        assert_eq!(clock.elapsed_ms(), 0.0);
        assert_eq!(clock.ticks(), 2);
    }
}
