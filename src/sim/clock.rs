//! Fixed-timestep accumulator and FPS sampling

use std::time::{Duration, Instant};

use super::timer::TICKS_PER_SECOND;

const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// Converts frame time into whole fixed steps
///
/// Elapsed time is kept as `nanoseconds * tick_rate`, so one step is exactly
/// one second's worth of nanoseconds and no rounding builds up. Splitting the
/// same elapsed time across more frames never changes the step count.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    tick_rate: u32,
    accumulator: u128,
    steps: u64,
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(TICKS_PER_SECOND as u32)
    }
}

impl FixedTimestep {
    /// Creates an accumulator for `tick_rate` steps per second
    pub fn new(tick_rate: u32) -> Self {
        Self {
            tick_rate: tick_rate.max(1),
            accumulator: 0,
            steps: 0,
        }
    }

    /// Adds frame time to the accumulator
    pub fn advance(&mut self, elapsed: Duration) {
        self.accumulator += elapsed.as_nanos() * u128::from(self.tick_rate);
    }

    /// Consumes one step if a full step is available
    pub fn consume_step(&mut self) -> bool {
        if self.accumulator < NANOS_PER_SECOND {
            return false;
        }
        self.accumulator -= NANOS_PER_SECOND;
        self.steps += 1;
        true
    }

    /// Whole steps waiting to be consumed
    pub fn pending_steps(&self) -> u64 {
        (self.accumulator / NANOS_PER_SECOND) as u64
    }

    /// Total steps consumed so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn tick_rate(&self) -> u32 {
        self.tick_rate
    }

    /// Length of one step, rounded down to the nanosecond
    pub fn step_duration(&self) -> Duration {
        Duration::from_nanos((NANOS_PER_SECOND / u128::from(self.tick_rate)) as u64)
    }

    /// Fraction of a step left in the accumulator, for render interpolation
    pub fn interpolation_alpha(&self) -> f64 {
        (self.accumulator % NANOS_PER_SECOND) as f64 / NANOS_PER_SECOND as f64
    }
}

/// Counts rendered frames over one-second windows
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
    fps: u32,
}

impl FpsCounter {
    const WINDOW: Duration = Duration::from_secs(1);

    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            frames: 0,
            fps: 0,
        }
    }

    /// Records a rendered frame, returning the new FPS when a window closes
    pub fn record_frame(&mut self, now: Instant) -> Option<u32> {
        self.frames += 1;

        if now.saturating_duration_since(self.window_start) > Self::WINDOW {
            self.window_start += Self::WINDOW;
            self.fps = self.frames;
            self.frames = 0;
            return Some(self.fps);
        }

        None
    }

    /// Frames counted in the last completed window, 0 before the first
    pub fn fps(&self) -> u32 {
        self.fps
    }
}
