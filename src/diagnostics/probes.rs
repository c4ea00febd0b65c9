//! Built-in probes for the engine's subsystems

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use sysinfo::System;

use super::probe::{Probe, ProbeResult};
use crate::app::{EngineContext, Game, GameLoop, HeadlessPlatform};
use crate::build_info;
use crate::config::AppConfig;
use crate::error::EngineError;
use crate::sim::TimeUnit;

/// Checks that every configuration profile loads and validates
pub struct ConfigProbe {
    profiles: Vec<&'static str>,
}

impl ConfigProbe {
    pub fn new() -> Self {
        Self::with_profiles(vec!["debug", "release"])
    }

    pub fn with_profiles(profiles: Vec<&'static str>) -> Self {
        Self { profiles }
    }
}

impl Default for ConfigProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl Probe for ConfigProbe {
    fn name(&self) -> &'static str {
        "Configuration"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Loads and validates each configuration profile")
    }

    fn run(&self) -> ProbeResult {
        let mut details = Vec::new();
        let mut failed = 0;

        for profile in &self.profiles {
            let checked = AppConfig::load(profile)
                .map_err(EngineError::from)
                .and_then(|config| config.validate().map(|()| config));
            match checked {
                Ok(config) => details.push(format!(
                    "  ✓ Profile '{}': {} ({}x{}, debug: {})",
                    profile,
                    config.engine.internal_title,
                    config.window.width,
                    config.window.height,
                    config.engine.debug
                )),
                Err(e) => {
                    details.push(format!("  ✗ Profile '{}': {}", profile, e));
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            ProbeResult::fail(format!("{} of {} profiles invalid", failed, self.profiles.len()))
                .with_details(details)
        } else {
            ProbeResult::pass(format!("{} profiles validated", self.profiles.len()))
                .with_details(details)
        }
    }
}

/// Reports the build metadata baked in at compile time
#[derive(Default)]
pub struct BuildInfoProbe;

impl BuildInfoProbe {
    pub fn new() -> Self {
        Self
    }
}

impl Probe for BuildInfoProbe {
    fn name(&self) -> &'static str {
        "Build Info"
    }

    fn run(&self) -> ProbeResult {
        let details = build_info::detailed_info()
            .lines()
            .map(|line| format!("  {line}"))
            .collect();

        if build_info::GIT_SHA.is_none() {
            return ProbeResult::warn("Built without git metadata").with_details(details);
        }
        ProbeResult::pass(build_info::version_string()).with_details(details)
    }
}

/// Gathers OS, CPU and memory information
#[derive(Default)]
pub struct SystemInfoProbe;

impl SystemInfoProbe {
    pub fn new() -> Self {
        Self
    }
}

impl Probe for SystemInfoProbe {
    fn name(&self) -> &'static str {
        "System Info"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Gathers OS, CPU, and memory information")
    }

    fn run(&self) -> ProbeResult {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_all();

        let mut details = vec![
            format!(
                "  OS: {} {}",
                System::name().unwrap_or_else(|| "Unknown".to_string()),
                System::os_version().unwrap_or_else(|| "Unknown".to_string())
            ),
            format!(
                "  Kernel: {}",
                System::kernel_version().unwrap_or_else(|| "Unknown".to_string())
            ),
        ];

        let logical_cores = sys.cpus().len();
        if logical_cores == 0 {
            return ProbeResult::warn("Unable to detect CPU cores").with_details(details);
        }
        details.push(format!(
            "  CPU cores: {} physical, {} logical",
            System::physical_core_count().unwrap_or(0),
            logical_cores
        ));

        let total_memory_gb = sys.total_memory() as f64 / 1_073_741_824.0;
        details.push(format!("  Memory: {:.1} GB total", total_memory_gb));
        if total_memory_gb < 1.0 {
            return ProbeResult::warn("Low memory detected").with_details(details);
        }

        ProbeResult::pass("System info gathered").with_details(details)
    }
}

/// Minimal game that records the order its hooks run in
#[derive(Default)]
struct ProbeGame {
    calls: Vec<&'static str>,
    timer_fires: Rc<Cell<u32>>,
}

impl Game for ProbeGame {
    fn pre_run(&mut self, _ctx: &mut EngineContext) -> anyhow::Result<()> {
        self.calls.push("pre_run");
        Ok(())
    }

    fn pre_init(&mut self, _ctx: &mut EngineContext) -> anyhow::Result<()> {
        self.calls.push("pre_init");
        Ok(())
    }

    fn init(&mut self, ctx: &mut EngineContext) -> anyhow::Result<()> {
        self.calls.push("init");
        let fires = self.timer_fires.clone();
        ctx.add_timer(TimeUnit::Second, 1, true, move |_| fires.set(fires.get() + 1));
        Ok(())
    }

    fn renderer_setup(&mut self, _ctx: &mut EngineContext) -> anyhow::Result<()> {
        self.calls.push("renderer_setup");
        Ok(())
    }

    fn post_init(&mut self, _ctx: &mut EngineContext) -> anyhow::Result<()> {
        self.calls.push("post_init");
        Ok(())
    }

    fn tick(&mut self, _ctx: &mut EngineContext) -> anyhow::Result<()> {
        self.calls.push("tick");
        Ok(())
    }

    fn render(&mut self, _ctx: &mut EngineContext) -> anyhow::Result<()> {
        self.calls.push("render");
        Ok(())
    }

    fn on_finish_init(&mut self, _ctx: &mut EngineContext) -> anyhow::Result<()> {
        self.calls.push("on_finish_init");
        Ok(())
    }

    fn on_exit(&mut self, _ctx: &mut EngineContext) {
        self.calls.push("on_exit");
    }
}

/// Runs a scripted headless loop and checks its lifecycle
#[derive(Default)]
pub struct GameLoopProbe;

impl GameLoopProbe {
    /// 120 frames of 20ms: 144 fixed steps, the first one spent loading
    const FRAMES: usize = 120;
    const FRAME_TIME: Duration = Duration::from_millis(20);
    const EXPECTED_STEPS: u64 = 144;

    pub fn new() -> Self {
        Self
    }
}

impl Probe for GameLoopProbe {
    fn name(&self) -> &'static str {
        "Game Loop"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Runs a headless loop and checks hook order, tick counts and timers")
    }

    fn run(&self) -> ProbeResult {
        let mut details = Vec::new();
        let platform = HeadlessPlatform::fixed(Self::FRAME_TIME, Self::FRAMES);
        let mut game_loop = GameLoop::new(
            ProbeGame::default(),
            platform,
            EngineContext::new("Probe", "probe"),
        );

        let summary = match game_loop.run() {
            Ok(summary) => summary,
            Err(e) => return ProbeResult::fail(format!("Loop failed: {e}")),
        };
        details.push(format!(
            "  Frames: {}, ticks: {}, fixed steps: {}",
            summary.frames, summary.ticks, summary.fixed_steps
        ));

        let running = game_loop.context().is_running();
        let game = game_loop.into_game();
        let expected_start = [
            "pre_run",
            "render",
            "pre_init",
            "init",
            "renderer_setup",
            "post_init",
            "on_finish_init",
        ];

        if !game.calls.starts_with(&expected_start) {
            details.push(format!("  ✗ Hook order: {:?}", &game.calls[..game.calls.len().min(8)]));
            return ProbeResult::fail("Initialization order is wrong").with_details(details);
        }
        details.push("  ✓ Initialization ran once, after the first render".to_string());

        if game.calls.last() != Some(&"on_exit") || running {
            return ProbeResult::fail("Loop did not shut down cleanly").with_details(details);
        }

        if summary.frames != Self::FRAMES as u64
            || summary.fixed_steps != Self::EXPECTED_STEPS
            || summary.ticks != Self::EXPECTED_STEPS - 1
        {
            return ProbeResult::fail("Fixed-step accounting is off").with_details(details);
        }
        details.push("  ✓ Tick count matches elapsed time".to_string());

        // 143 ticks of a one-second repeating timer
        let fires = game.timer_fires.get();
        details.push(format!("  Timer fired {} times", fires));
        if fires != 2 {
            return ProbeResult::fail("Repeating timer misfired").with_details(details);
        }

        ProbeResult::pass("Lifecycle, ticks and timers consistent").with_details(details)
    }
}
