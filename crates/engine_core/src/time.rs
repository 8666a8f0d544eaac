//! Frame clock and fixed-timestep accumulator.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Time {
    last_frame: Instant,
    /// Length of the most recent frame.
    delta: Duration,
    frame_count: u64,
    fixed_timestep: Duration,
    /// Wall time not yet consumed by fixed steps.
    accumulator: Duration,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// 60 Hz fixed rate.
    pub fn new() -> Self {
        Self::with_fixed_rate(60.0)
    }

    pub fn with_fixed_rate(hz: f64) -> Self {
        Self {
            last_frame: Instant::now(),
            delta: Duration::ZERO,
            frame_count: 0,
            fixed_timestep: Duration::from_secs_f64(1.0 / hz),
            accumulator: Duration::ZERO,
        }
    }

    /// Start a frame, measuring its length from the wall clock.
    pub fn update(&mut self) {
        let now = Instant::now();
        let delta = now - self.last_frame;
        self.last_frame = now;
        self.advance(delta);
    }

    /// Start a frame of a given length. Headless runs drive the clock this way.
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.frame_count += 1;
        self.accumulator += delta;
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Consume one fixed step from the accumulator if a whole one is available.
    pub fn should_fixed_update(&mut self) -> bool {
        if self.accumulator < self.fixed_timestep {
            return false;
        }
        self.accumulator -= self.fixed_timestep;
        true
    }

    /// Drop the whole steps still pending, keeping the partial remainder. Called after
    /// the per-frame step cap so one long hitch doesn't spill into the next frames.
    pub fn discard_backlog(&mut self) {
        if self.accumulator < self.fixed_timestep {
            return;
        }
        log::debug!(
            "Dropping {:.1} ms of simulation backlog",
            self.accumulator.as_secs_f64() * 1000.0
        );
        let nanos = self.accumulator.as_nanos() % self.fixed_timestep.as_nanos().max(1);
        self.accumulator = Duration::from_nanos(nanos as u64);
    }

    /// Fraction of a fixed step left in the accumulator, in [0, 1].
    pub fn alpha(&self) -> f32 {
        let step = self.fixed_timestep.as_secs_f32();
        if step > 0.0 {
            (self.accumulator.as_secs_f32() / step).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Instantaneous rate from the last frame.
    pub fn fps(&self) -> f32 {
        let secs = self.delta.as_secs_f32();
        if secs > 0.0 {
            secs.recip()
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_updates_consume_whole_steps() {
        let mut time = Time::with_fixed_rate(50.0);
        time.advance(Duration::from_millis(45));
        assert!(time.should_fixed_update());
        assert!(time.should_fixed_update());
        assert!(!time.should_fixed_update());
        assert!((time.alpha() - 0.25).abs() < 1e-3);
    }

    #[test]
    fn discard_backlog_keeps_partial_step() {
        let mut time = Time::with_fixed_rate(100.0);
        time.advance(Duration::from_millis(1005));
        time.discard_backlog();
        assert!(!time.should_fixed_update());
        assert!((time.alpha() - 0.5).abs() < 1e-3);
    }

    #[test]
    fn advance_counts_frames_and_reports_rate() {
        let mut time = Time::new();
        assert_eq!(time.fps(), 0.0);
        time.advance(Duration::from_millis(20));
        time.advance(Duration::from_millis(20));
        assert_eq!(time.frame_count(), 2);
        assert!((time.fps() - 50.0).abs() < 1e-2);
    }
}
