//! Scene clock
//!
//! A monotonic elapsed-time value handed explicitly to every time-driven
//! update. The render loop is the only writer in the running app; tests
//! drive it directly with [`Clock::advance_to`].
//!
//! Time is kept in `f64` seconds. Periodic motion reduces `t` to one cycle
//! with [`cycle_angle`] before narrowing to `f32`, so frames stay distinct
//! after days of uptime.

use std::f64::consts::TAU;
use std::time::Instant;

/// Monotonic elapsed time in seconds since the scene was mounted
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    started: Instant,
    elapsed: f64,
}

impl Clock {
    /// Starts a new clock at zero
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            elapsed: 0.0,
        }
    }

    /// Reads the wall time source and advances the elapsed value
    ///
    /// Returns the new elapsed time. The value never decreases.
    pub fn tick(&mut self) -> f64 {
        let now = self.started.elapsed().as_secs_f64();
        self.elapsed = self.elapsed.max(now);
        self.elapsed
    }

    /// Moves the clock forward to `t` seconds
    ///
    /// Requests to move backwards are ignored.
    pub fn advance_to(&mut self, t: f64) {
        if t.is_finite() && t > self.elapsed {
            self.elapsed = t;
        }
    }

    /// Elapsed seconds as of the last tick
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::start()
    }
}

/// `t·rate` radians wrapped into `[0, 2π)`
pub fn cycle_angle(t: f64, rate: f32) -> f32 {
    (t * rate as f64).rem_euclid(TAU) as f32
}

/// Fraction of a `period`-second cycle elapsed at `t`, in `[0, 1)`
pub fn cycle_fraction(t: f64, period: f64) -> f32 {
    let fraction = (t.rem_euclid(period) / period) as f32;
    // Both the f64 remainder and the narrowing can round up to 1
    if fraction >= 1.0 {
        0.0
    } else {
        fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_starts_at_zero() {
        let clock = Clock::start();
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn test_clock_is_monotonic() {
        let mut clock = Clock::start();
        clock.advance_to(5.0);
        clock.advance_to(2.0);
        assert_eq!(clock.elapsed(), 5.0);

        clock.advance_to(f64::NAN);
        assert_eq!(clock.elapsed(), 5.0);

        // Wall time is far behind the manual value, so tick keeps it
        assert_eq!(clock.tick(), 5.0);
    }

    #[test]
    fn test_frames_stay_distinct_after_days_of_uptime() {
        let mut clock = Clock::start();
        let start = 262_144.0;
        let mut times = Vec::new();
        for frame in 0..60 {
            clock.advance_to(start + frame as f64 / 60.0);
            times.push(clock.elapsed());
        }
        times.dedup();
        assert_eq!(times.len(), 60);

        let angles: Vec<f32> = times.iter().map(|&t| cycle_angle(t, 2.8)).collect();
        for pair in angles.windows(2) {
            assert!(pair[1] != pair[0]);
        }
    }

    #[test]
    fn test_cycle_helpers_wrap() {
        assert_eq!(cycle_fraction(10.0, 10.0), 0.0);
        assert!((cycle_fraction(15.0, 10.0) - 0.5).abs() < 1e-6);
        assert!((cycle_angle(TAU / 2.0 + TAU, 1.0) - std::f32::consts::PI).abs() < 1e-5);
        assert!((0.0..1.0).contains(&cycle_fraction(-1e-18, 10.0)));
    }
}
