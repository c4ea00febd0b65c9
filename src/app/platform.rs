//! Event source and clock the loop runs against

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use super::context::EngineContext;
use crate::error::Result;

/// Window system seen by the loop
pub trait Platform {
    /// Called once after `pre_run`, before the first frame
    fn prepare(&mut self, _ctx: &mut EngineContext) -> Result<()> {
        Ok(())
    }

    /// Handles pending window/input events without blocking
    fn poll_events(&mut self, ctx: &mut EngineContext) -> Result<()>;

    /// Monotonic clock used for frame timing
    fn now(&self) -> Instant;
}

/// Scripted platform with a virtual clock
///
/// Each poll advances the clock by the next scripted frame time. The poll
/// that consumes the last entry also requests close, so a script of N frame
/// times renders exactly N frames. An empty script requests close before
/// the first frame and renders nothing.
#[derive(Debug, Clone)]
pub struct HeadlessPlatform {
    origin: Instant,
    elapsed: Duration,
    frames: VecDeque<Duration>,
    polls: u64,
}

impl HeadlessPlatform {
    pub fn new(frame_times: impl IntoIterator<Item = Duration>) -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Duration::ZERO,
            frames: frame_times.into_iter().collect(),
            polls: 0,
        }
    }

    /// `count` frames of equal length
    pub fn fixed(frame_time: Duration, count: usize) -> Self {
        Self::new(std::iter::repeat_n(frame_time, count))
    }

    /// Virtual time passed since creation
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    pub fn remaining_frames(&self) -> usize {
        self.frames.len()
    }
}

impl Platform for HeadlessPlatform {
    fn prepare(&mut self, ctx: &mut EngineContext) -> Result<()> {
        if self.frames.is_empty() {
            ctx.close();
        }
        Ok(())
    }

    fn poll_events(&mut self, ctx: &mut EngineContext) -> Result<()> {
        self.polls += 1;
        match self.frames.pop_front() {
            Some(frame_time) => self.elapsed += frame_time,
            None => ctx.close(),
        }
        if self.frames.is_empty() {
            ctx.close();
        }
        Ok(())
    }

    fn now(&self) -> Instant {
        self.origin + self.elapsed
    }
}
