//! Fixed-timestep game loop

use std::time::Instant;

use tracing::{debug, error, info, info_span, trace};

use super::context::EngineContext;
use super::game::Game;
use super::platform::Platform;
use crate::error::{EngineError, Result};
use crate::sim::{FixedTimestep, FpsCounter};

/// Where the loop is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    /// Built, `start` not yet called
    Constructed,
    /// Rendering, timers and ticks held back until initialization finishes
    Loading,
    /// Fully initialized, ticking every fixed step
    Ticking,
    /// Close observed, no more frames
    Terminated,
}

/// Whether the loop should keep going after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    Closed,
}

/// Totals for a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames rendered
    pub frames: u64,
    /// Ticks delivered to the game
    pub ticks: u64,
    /// Fixed steps consumed, including those skipped while loading
    pub fixed_steps: u64,
}

/// Drives a [`Game`] on a [`Platform`]
pub struct GameLoop<G, P> {
    game: G,
    platform: P,
    ctx: EngineContext,
    timestep: FixedTimestep,
    fps: Option<FpsCounter>,
    last_frame: Option<Instant>,
    phase: LoopPhase,
    frames: u64,
    ticks: u64,
}

impl<G: Game, P: Platform> GameLoop<G, P> {
    pub fn new(game: G, platform: P, mut ctx: EngineContext) -> Self {
        ctx.set_running(true);
        Self {
            game,
            platform,
            ctx,
            timestep: FixedTimestep::default(),
            fps: None,
            last_frame: None,
            phase: LoopPhase::Constructed,
            frames: 0,
            ticks: 0,
        }
    }

    /// Runs until close is requested or a hook fails
    pub fn run(&mut self) -> Result<RunSummary> {
        self.start()?;

        let span = info_span!("loop", title = %self.ctx.title());
        let _guard = span.enter();
        info!("Started run loop");

        while self.frame()? == FrameOutcome::Continue {}

        Ok(self.summary())
    }

    /// Runs the pre-loop hooks and enters the loading phase
    pub fn start(&mut self) -> Result<()> {
        if self.phase != LoopPhase::Constructed {
            return Ok(());
        }
        let result = self.enter_loading();
        self.abort_on_error(result)
    }

    /// Runs one loop iteration
    ///
    /// Any error is fatal: the loop terminates and later calls return
    /// [`FrameOutcome::Closed`].
    pub fn frame(&mut self) -> Result<FrameOutcome> {
        match self.phase {
            LoopPhase::Constructed => self.start()?,
            LoopPhase::Terminated => return Ok(FrameOutcome::Closed),
            LoopPhase::Loading | LoopPhase::Ticking => {}
        }
        let result = self.run_frame();
        self.abort_on_error(result)
    }

    fn enter_loading(&mut self) -> Result<()> {
        info!(title = %self.ctx.title(), "Welcome to {}!", self.ctx.title());
        self.game.describe_environment(&self.ctx);

        debug!("Starting workers");
        hook("spawn_workers", self.game.spawn_workers(&mut self.ctx))?;
        hook("pre_run", self.game.pre_run(&mut self.ctx))?;
        self.platform.prepare(&mut self.ctx)?;

        self.ctx.set_loading(true);
        self.phase = LoopPhase::Loading;

        let now = self.platform.now();
        self.last_frame = Some(now);
        self.fps = Some(FpsCounter::new(now));
        Ok(())
    }

    fn run_frame(&mut self) -> Result<FrameOutcome> {
        if self.ctx.is_closing() {
            info!("Goodbye!");
            self.game.on_exit(&mut self.ctx);
            self.ctx.set_running(false);
            self.phase = LoopPhase::Terminated;
            return Ok(FrameOutcome::Closed);
        }

        self.platform.poll_events(&mut self.ctx)?;
        self.ctx.drain_mailbox();

        let now = self.platform.now();
        let elapsed = self
            .last_frame
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or_default();
        self.last_frame = Some(now);
        self.timestep.advance(elapsed);

        let due = self.timestep.pending_steps();
        if due > 1 {
            trace!(steps = due, "Catching up on fixed steps");
        }

        while self.timestep.consume_step() {
            if !self.ctx.is_loading() {
                self.ctx.tick_timers();
                hook("tick", self.game.tick(&mut self.ctx))?;
                self.ticks += 1;
            }
        }
        self.ctx
            .set_interpolation_alpha(self.timestep.interpolation_alpha());

        hook("render", self.game.render(&mut self.ctx))?;
        self.frames += 1;

        let fps = self.fps.get_or_insert_with(|| FpsCounter::new(now));
        if let Some(value) = fps.record_frame(now) {
            self.ctx.set_fps(value);
            debug!(fps = value, "FPS window closed");
        }

        if self.phase == LoopPhase::Loading {
            self.initialize()?;
        }

        Ok(FrameOutcome::Continue)
    }

    /// Terminates the loop if `result` is an error, then hands it back
    fn abort_on_error<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            error!(error = %e, "Game loop stopped");
            self.ctx.set_running(false);
            self.phase = LoopPhase::Terminated;
        }
        result
    }

    /// The one-time initialization sequence after the first frame
    fn initialize(&mut self) -> Result<()> {
        info!("Pre-Initialization started...");
        hook("pre_init", self.game.pre_init(&mut self.ctx))?;
        info!("Pre-Initialization finished!");

        info!("Initialization started...");
        hook("init", self.game.init(&mut self.ctx))?;
        hook("renderer_setup", self.game.renderer_setup(&mut self.ctx))?;
        info!("Initialization finished!");

        info!("Post-Initialization started...");
        hook("post_init", self.game.post_init(&mut self.ctx))?;
        info!("Post-Initialization finished!");

        info!("All Initialization has been finished!");
        hook("on_finish_init", self.game.on_finish_init(&mut self.ctx))?;

        self.ctx.set_loading(false);
        self.phase = LoopPhase::Ticking;
        Ok(())
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            frames: self.frames,
            ticks: self.ticks,
            fixed_steps: self.timestep.steps(),
        }
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn fixed_steps(&self) -> u64 {
        self.timestep.steps()
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut EngineContext {
        &mut self.ctx
    }

    /// Gives the game back, dropping the loop
    pub fn into_game(self) -> G {
        self.game
    }
}

fn hook(name: &'static str, result: anyhow::Result<()>) -> Result<()> {
    result.map_err(|source| EngineError::Hook { hook: name, source })
}
