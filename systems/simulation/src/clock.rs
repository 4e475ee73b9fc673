//! Wall-clock filtering for the simulation.

use std::time::Duration;

/// Slowest speed multiplier the clock accepts.
pub const MIN_SPEED: f32 = 0.25;

/// Longest raw frame the clock trusts, in seconds.
pub const MAX_RAW_DELTA: f32 = 1.0 / 15.0;

/// Longest simulated step the clock ever hands out, in seconds.
pub const MAX_STEP: f32 = 0.1;

/// Turns raw frame durations into bounded, scaled simulation steps.
///
/// Pausing swaps the time scale for zero and keeps the chosen speed for when
/// the clock resumes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimClock {
    time_scale: f32,
    speed: f32,
    paused: bool,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimClock {
    /// Creates a running clock at normal speed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            time_scale: 1.0,
            speed: 1.0,
            paused: false,
        }
    }

    /// Multiplier currently applied to raw time; zero while paused.
    #[must_use]
    pub const fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Speed multiplier restored on resume.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Reports whether the clock is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Selects a new speed multiplier, clamped to at least [`MIN_SPEED`].
    pub fn set_speed(&mut self, multiplier: f32) {
        self.speed = multiplier.max(MIN_SPEED);
        if !self.paused {
            self.time_scale = self.speed;
        }
    }

    /// Stops simulated time.
    pub fn pause(&mut self) {
        if self.paused {
            return;
        }
        self.paused = true;
        self.time_scale = 0.0;
    }

    /// Restores the speed chosen before pausing.
    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        self.time_scale = self.speed;
    }

    /// Pauses a running clock or resumes a paused one.
    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Simulated seconds corresponding to a raw frame of `raw`.
    #[must_use]
    pub fn effective_delta(&self, raw: Duration) -> f32 {
        let raw = raw.as_secs_f32().min(MAX_RAW_DELTA);
        (raw * self.time_scale).min(MAX_STEP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_frames_are_capped_before_scaling() {
        let clock = SimClock::new();
        let long_frame = clock.effective_delta(Duration::from_millis(500));
        assert!((long_frame - MAX_RAW_DELTA).abs() < 1e-6);
        let short_frame = clock.effective_delta(Duration::from_millis(10));
        assert!((short_frame - 0.01).abs() < 1e-6);
    }

    #[test]
    fn scaled_steps_never_exceed_the_maximum() {
        let mut clock = SimClock::new();
        clock.set_speed(3.0);
        assert!((clock.effective_delta(Duration::from_millis(50)) - MAX_STEP).abs() < 1e-6);
        assert!((clock.effective_delta(Duration::from_millis(20)) - 0.06).abs() < 1e-6);
    }

    #[test]
    fn speed_has_a_floor() {
        let mut clock = SimClock::new();
        clock.set_speed(0.0);
        assert_eq!(clock.speed(), MIN_SPEED);
        assert_eq!(clock.time_scale(), MIN_SPEED);
    }

    #[test]
    fn pause_remembers_the_chosen_speed() {
        let mut clock = SimClock::new();
        clock.set_speed(2.0);
        clock.pause();
        clock.pause();
        assert_eq!(clock.effective_delta(Duration::from_millis(16)), 0.0);

        clock.set_speed(3.0);
        assert_eq!(clock.time_scale(), 0.0);

        clock.toggle_pause();
        assert!(!clock.is_paused());
        assert_eq!(clock.time_scale(), 3.0);

        clock.resume();
        assert_eq!(clock.time_scale(), 3.0);
    }
}
