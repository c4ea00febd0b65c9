//! Lifecycle hooks a game supplies to the loop

use tracing::debug;

use super::context::EngineContext;

/// A concrete game driven by [`GameLoop`](super::GameLoop)
///
/// Hooks run on the loop thread in a fixed order:
///
/// ```text
/// describe_environment → spawn_workers → pre_run
/// frame 1: render → pre_init → init → renderer_setup → post_init → on_finish_init
/// frame n: tick × (fixed steps due) → render
/// close:   on_exit
/// ```
///
/// An error from any fallible hook stops the loop and is returned from
/// `run`.
pub trait Game {
    /// Setup that must exist before anything else, such as a graphics context
    fn pre_run(&mut self, ctx: &mut EngineContext) -> anyhow::Result<()>;

    /// First initialization step, after the first frame was presented
    fn pre_init(&mut self, ctx: &mut EngineContext) -> anyhow::Result<()>;

    /// Second initialization step
    fn init(&mut self, ctx: &mut EngineContext) -> anyhow::Result<()>;

    /// Runs right after [`Game::init`]; set up renderers here
    fn renderer_setup(&mut self, ctx: &mut EngineContext) -> anyhow::Result<()>;

    /// Third initialization step
    fn post_init(&mut self, ctx: &mut EngineContext) -> anyhow::Result<()>;

    /// One fixed simulation step, after timers have been aged
    fn tick(&mut self, ctx: &mut EngineContext) -> anyhow::Result<()>;

    /// Draws one frame; called once per loop iteration, loading or not
    fn render(&mut self, ctx: &mut EngineContext) -> anyhow::Result<()>;

    /// Runs after all initialization is done
    fn on_finish_init(&mut self, _ctx: &mut EngineContext) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs right before the loop stops
    fn on_exit(&mut self, _ctx: &mut EngineContext) {}

    /// Logs where the game runs from and any folders it created
    fn describe_environment(&self, ctx: &EngineContext) {
        debug!(launch_dir = %ctx.launch_dir().display(), "Launch location");
        debug!(assets = %ctx.asset_location(), "Asset location");
    }

    /// Starts helper threads; they talk to the loop through
    /// [`EngineContext::handle`]
    fn spawn_workers(&mut self, _ctx: &mut EngineContext) -> anyhow::Result<()> {
        Ok(())
    }
}
