//! Engine state shared with game hooks

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::sim::{TimeUnit, Timer, TimerCommands, TimerId, TimerSet};

/// Work handed to the loop thread by other threads
pub type Deferred = Box<dyn FnOnce(&mut EngineContext) + Send>;

/// Flags and identity of the running engine
#[derive(Debug, Clone)]
struct EngineState {
    running: bool,
    loading: bool,
    debug: bool,
    fps: u32,
    interpolation_alpha: f64,
    title: String,
    internal_title: String,
    assets_root: String,
    launch_dir: PathBuf,
}

/// Cross-thread handle to a running loop
///
/// The only ways another thread may affect the loop: request close, or
/// submit a closure the loop thread runs at its next frame.
#[derive(Debug, Clone)]
pub struct LoopHandle {
    close: Arc<AtomicBool>,
    sender: Sender<Deferred>,
}

impl LoopHandle {
    /// Requests close; observed at the top of the next frame
    pub fn close(&self) {
        self.close.store(true, Ordering::Release);
    }

    pub fn is_close_requested(&self) -> bool {
        self.close.load(Ordering::Acquire)
    }

    /// Queues work for the loop thread
    ///
    /// Returns false if the loop is gone.
    pub fn submit<F>(&self, work: F) -> bool
    where
        F: FnOnce(&mut EngineContext) + Send + 'static,
    {
        self.sender.send(Box::new(work)).is_ok()
    }
}

/// Everything the loop owns besides the game itself
pub struct EngineContext {
    state: EngineState,
    timers: TimerSet,
    close: Arc<AtomicBool>,
    sender: Sender<Deferred>,
    mailbox: Receiver<Deferred>,
}

impl EngineContext {
    /// Creates a context with the given display and internal titles
    pub fn new(title: impl Into<String>, internal_title: impl Into<String>) -> Self {
        let (sender, mailbox) = unbounded();
        let launch_dir = std::env::current_dir().unwrap_or_else(|e| {
            warn!(error = %e, "Could not read working directory");
            PathBuf::from(".")
        });

        Self {
            state: EngineState {
                running: false,
                loading: false,
                debug: false,
                fps: 0,
                interpolation_alpha: 0.0,
                title: title.into(),
                internal_title: internal_title.into(),
                assets_root: "resources".to_string(),
                launch_dir,
            },
            timers: TimerSet::new(),
            close: Arc::new(AtomicBool::new(false)),
            sender,
            mailbox,
        }
    }

    /// Creates a context from application configuration
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.window.title.clone(), config.engine.internal_title.clone())
            .with_debug(config.engine.debug)
            .with_assets_root(config.engine.assets_root.clone())
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.state.debug = debug;
        self
    }

    pub fn with_assets_root(mut self, root: impl Into<String>) -> Self {
        self.state.assets_root = root.into();
        self
    }

    /// Adds a timer that runs `action` after `magnitude` units of game time
    ///
    /// Repeating timers run forever; there is no way to remove one.
    pub fn add_timer<F>(&mut self, unit: TimeUnit, magnitude: u64, repeats: bool, action: F) -> TimerId
    where
        F: FnMut(&mut TimerCommands) + 'static,
    {
        let id = self
            .timers
            .insert(Timer::new(unit, magnitude, repeats, action));
        debug!(?id, ?unit, magnitude, repeats, "Timer added");
        id
    }

    /// Requests close; the loop stops at the top of the next frame
    pub fn close(&mut self) {
        self.close.store(true, Ordering::Release);
    }

    pub fn toggle_debug(&mut self) {
        self.state.debug = !self.state.debug;
        info!(debug = self.state.debug, "Debug mode toggled");
    }

    /// Handle for other threads
    pub fn handle(&self) -> LoopHandle {
        LoopHandle {
            close: self.close.clone(),
            sender: self.sender.clone(),
        }
    }

    pub fn is_debug(&self) -> bool {
        self.state.debug
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Whether close has been requested
    pub fn is_closing(&self) -> bool {
        self.close.load(Ordering::Acquire)
    }

    /// Frames rendered in the last full second
    pub fn fps(&self) -> u32 {
        self.state.fps
    }

    pub fn title(&self) -> &str {
        &self.state.title
    }

    pub fn internal_title(&self) -> &str {
        &self.state.internal_title
    }

    /// Where this game's assets live: `{assets_root}/{internal_title}/assets/`
    pub fn asset_location(&self) -> String {
        format!(
            "{}/{}/assets/",
            self.state.assets_root.trim_end_matches('/'),
            self.state.internal_title
        )
    }

    /// Working directory the engine was started from
    pub fn launch_dir(&self) -> &Path {
        &self.state.launch_dir
    }

    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    pub fn timers(&self) -> &TimerSet {
        &self.timers
    }

    /// Fraction of a fixed step left over after the last frame's ticks
    ///
    /// Renderers can blend between the previous and current tick with it.
    pub fn interpolation_alpha(&self) -> f64 {
        self.state.interpolation_alpha
    }

    pub(crate) fn set_running(&mut self, running: bool) {
        self.state.running = running;
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.state.loading = loading;
    }

    pub(crate) fn set_fps(&mut self, fps: u32) {
        self.state.fps = fps;
    }

    pub(crate) fn set_interpolation_alpha(&mut self, alpha: f64) {
        self.state.interpolation_alpha = alpha;
    }

    /// Ages all timers one tick and applies what their actions asked for
    pub(crate) fn tick_timers(&mut self) {
        let outcome = self.timers.tick();

        if outcome.debug_toggles % 2 == 1 {
            self.toggle_debug();
        }
        if outcome.close_requested {
            self.close();
        }
    }

    /// Runs work submitted through [`LoopHandle::submit`]
    ///
    /// Only work already queued is run; anything it queues waits a frame.
    pub(crate) fn drain_mailbox(&mut self) -> usize {
        let queued = self.mailbox.len();
        let mut ran = 0;
        while ran < queued {
            match self.mailbox.try_recv() {
                Ok(work) => {
                    work(self);
                    ran += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        ran
    }
}
