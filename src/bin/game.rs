use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use glam::{Vec2, Vec4};
use rand::Rng;
use tracing::{debug, info, warn};
use winit::window::Window;

use engine_base::app::{
    EngineContext, Game, GameLoop, HUD_SHADER_NAME, HeadlessPlatform, HudShader, Platform,
    Renderer, WinitPlatform, pixel_projection,
};
use engine_base::config::AppConfig;
use engine_base::sim::{HitBox, TICKS_PER_SECOND, TimeUnit};
use engine_base::{build_info, diagnostics, logging};

#[derive(Parser, Debug)]
#[command(name = "game", version, about = "Engine base demo game")]
struct Cli {
    /// Configuration profile to load (defaults to APP_PROFILE, then the build profile)
    #[arg(long)]
    profile: Option<String>,

    /// Run the startup diagnostics and exit
    #[arg(long)]
    diagnostics: bool,

    /// Run this many 60 Hz frames without a window, then exit
    #[arg(long, value_name = "FRAMES")]
    headless: Option<usize>,

    /// Close after this many seconds of game time
    #[arg(long, value_name = "SECONDS")]
    run_for: Option<u64>,
}

const PLAYER_SIZE: f32 = 32.0;
const TARGET_SIZE: f32 = 96.0;
/// Player speed range in pixels per tick
const PLAYER_SPEED: std::ops::Range<f32> = 2.0..5.0;

const IDLE_COLOR: Vec4 = Vec4::new(0.2, 0.6, 1.0, 1.0);
const HIT_COLOR: Vec4 = Vec4::new(1.0, 0.3, 0.2, 1.0);
const TARGET_COLOR: [u8; 4] = [240, 200, 60, 160];

/// A box bouncing around the screen, lighting up while it overlaps the target
struct Demo {
    window: Option<Arc<Window>>,
    vsync: bool,
    run_for: Option<u64>,
    renderer: Option<Renderer>,
    bounds: Vec2,
    player: HitBox,
    target: HitBox,
    velocity: Vec2,
    colliding: bool,
    hits: u32,
    report_due: Rc<Cell<bool>>,
}

impl Demo {
    fn new(window: Option<Arc<Window>>, config: &AppConfig, run_for: Option<u64>) -> Self {
        let bounds = Vec2::new(config.window.width as f32, config.window.height as f32);
        let target_origin = (bounds - Vec2::splat(TARGET_SIZE)) / 2.0;
        Self {
            window,
            vsync: config.window.vsync,
            run_for,
            renderer: None,
            bounds,
            player: HitBox::new(0.0, 0.0, PLAYER_SIZE, PLAYER_SIZE),
            target: HitBox::new(target_origin.x, target_origin.y, TARGET_SIZE, TARGET_SIZE),
            velocity: Vec2::ZERO,
            colliding: false,
            hits: 0,
            report_due: Rc::new(Cell::new(false)),
        }
    }

    /// Moves the player one tick, bouncing off the screen edges
    fn step_player(&mut self) {
        let next = self.player.offset(self.velocity);
        if next.x() < 0.0 || next.right() > self.bounds.x {
            self.velocity.x = -self.velocity.x;
        }
        if next.y() < 0.0 || next.bottom() > self.bounds.y {
            self.velocity.y = -self.velocity.y;
        }
        self.player = self.player.offset(self.velocity);
    }

    fn queue_hud(&mut self) {
        let Some(hud) = self
            .renderer
            .as_mut()
            .and_then(|r| r.shaders_mut().get_mut::<HudShader>(HUD_SHADER_NAME))
        else {
            return;
        };

        hud.set_color_rgba8(TARGET_COLOR);
        hud.draw_hitbox(&self.target);
        hud.set_color(if self.colliding { HIT_COLOR } else { IDLE_COLOR });
        hud.draw_hitbox(&self.player);
    }

    fn present(&mut self) -> anyhow::Result<()> {
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };

        // The playfield stays in logical units; resizing only stretches it
        renderer.sync_size();

        match renderer.draw() {
            Ok(()) => Ok(()),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = renderer.size();
                renderer.resize(size);
                Ok(())
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                Err(anyhow::anyhow!("GPU ran out of memory while presenting"))
            }
            Err(e) => {
                warn!(error = %e, "Skipped frame");
                Ok(())
            }
        }
    }
}

impl Game for Demo {
    fn pre_run(&mut self, _ctx: &mut EngineContext) -> anyhow::Result<()> {
        let Some(window) = &self.window else {
            info!("Running without a window");
            return Ok(());
        };

        // wgpu setup is async; winit is not
        let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
        let renderer = runtime
            .block_on(Renderer::new(window.clone(), self.vsync))
            .context("Failed to initialize renderer")?;
        info!("Renderer initialized successfully");
        self.renderer = Some(renderer);
        Ok(())
    }

    fn pre_init(&mut self, ctx: &mut EngineContext) -> anyhow::Result<()> {
        debug!(assets = %ctx.asset_location(), debug = ctx.is_debug(), "Preparing demo");
        Ok(())
    }

    fn init(&mut self, ctx: &mut EngineContext) -> anyhow::Result<()> {
        let mut rng = rand::rng();
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        self.velocity = Vec2::from_angle(angle) * rng.random_range(PLAYER_SPEED);
        let start = Vec2::new(
            rng.random_range(0.0..(self.bounds.x - PLAYER_SIZE).max(1.0)),
            rng.random_range(0.0..(self.bounds.y - PLAYER_SIZE).max(1.0)),
        );
        self.player = HitBox::new(start.x, start.y, PLAYER_SIZE, PLAYER_SIZE);
        info!(player = %self.player, target = %self.target, "Spawned player");

        let report_due = self.report_due.clone();
        ctx.add_timer(TimeUnit::Second, 1, true, move |_| report_due.set(true));

        ctx.add_timer(TimeUnit::Second, 3, false, |_| {
            info!("Three seconds of game time passed");
        });

        if let Some(seconds) = self.run_for {
            ctx.add_timer(TimeUnit::Second, seconds, false, move |commands| {
                info!(seconds, "Run time elapsed");
                commands.close();
            });
        }
        Ok(())
    }

    fn renderer_setup(&mut self, _ctx: &mut EngineContext) -> anyhow::Result<()> {
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };

        renderer
            .shaders_mut()
            .register(Box::new(HudShader::new(pixel_projection(
                self.bounds.x,
                self.bounds.y,
            ))));
        renderer.init_shaders();
        Ok(())
    }

    fn post_init(&mut self, ctx: &mut EngineContext) -> anyhow::Result<()> {
        debug!(timers = ctx.timer_count(), "Demo ready");
        Ok(())
    }

    fn tick(&mut self, ctx: &mut EngineContext) -> anyhow::Result<()> {
        self.step_player();

        let colliding = self.player.intersects(&self.target);
        if colliding && !self.colliding {
            self.hits += 1;
            debug!(hits = self.hits, player = %self.player, "Player entered target");
        }
        self.colliding = colliding;

        if self.report_due.replace(false) {
            if ctx.is_debug() {
                debug!(fps = ctx.fps(), hits = self.hits, "Status");
            } else {
                info!(fps = ctx.fps(), "FPS");
            }
        }
        Ok(())
    }

    fn render(&mut self, _ctx: &mut EngineContext) -> anyhow::Result<()> {
        self.queue_hud();
        self.present()
    }

    fn on_finish_init(&mut self, ctx: &mut EngineContext) -> anyhow::Result<()> {
        info!(title = %ctx.title(), "Demo running");
        Ok(())
    }

    fn on_exit(&mut self, _ctx: &mut EngineContext) {
        info!(hits = self.hits, "Demo finished");
    }
}

fn run<P: Platform>(game: Demo, platform: P, ctx: EngineContext) -> anyhow::Result<()> {
    let mut game_loop = GameLoop::new(game, platform, ctx);
    let summary = game_loop.run()?;
    info!(
        frames = summary.frames,
        ticks = summary.ticks,
        fixed_steps = summary.fixed_steps,
        "Run finished"
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let profile = cli.profile.clone().unwrap_or_else(|| {
        std::env::var("APP_PROFILE").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                "debug".to_string()
            } else {
                "release".to_string()
            }
        })
    });

    let (config, load_error) = match AppConfig::load(&profile) {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::builtin(&profile), Some(e)),
    };

    logging::init(&config.logging)?;
    if let Some(e) = load_error {
        warn!(error = %e, profile = %profile, "Failed to load config, using built-in defaults");
    }

    info!(
        version = %build_info::version_string(),
        profile = %config.profile,
        "Engine base"
    );

    if cli.diagnostics {
        let report = diagnostics::run_all();
        report.print();
        std::process::exit(report.exit_code());
    }

    config.validate()?;
    let ctx = EngineContext::from_config(&config);

    match cli.headless {
        Some(frames) => {
            let frame_time = Duration::from_secs(1) / TICKS_PER_SECOND as u32;
            let game = Demo::new(None, &config, cli.run_for);
            run(game, HeadlessPlatform::fixed(frame_time, frames), ctx)
        }
        None => {
            let platform = WinitPlatform::open(&config.window)?;
            let game = Demo::new(Some(platform.window()), &config, cli.run_for);
            run(game, platform, ctx)
        }
    }
}
