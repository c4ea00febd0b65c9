//! Integration tests for the game loop lifecycle

use std::thread;
use std::time::Duration;

use engine_base::EngineError;
use engine_base::app::{EngineContext, FrameOutcome, Game, GameLoop, HeadlessPlatform, LoopPhase};
use engine_base::sim::TimeUnit;

/// Records every hook call together with the loading flag at that moment
#[derive(Default)]
struct Recorder {
    calls: Vec<(&'static str, bool)>,
    close_after_ticks: Option<u64>,
    fail_in: Option<&'static str>,
    ticks: u64,
    fps_seen: Vec<u32>,
}

impl Recorder {
    fn record(&mut self, name: &'static str, ctx: &EngineContext) -> anyhow::Result<()> {
        self.calls.push((name, ctx.is_loading()));
        if self.fail_in == Some(name) {
            anyhow::bail!("{name} failed on purpose");
        }
        Ok(())
    }

    fn names(&self) -> Vec<&'static str> {
        self.calls.iter().map(|(name, _)| *name).collect()
    }

    fn count(&self, name: &str) -> usize {
        self.calls.iter().filter(|(n, _)| *n == name).count()
    }
}

impl Game for Recorder {
    fn pre_run(&mut self, ctx: &mut EngineContext) -> anyhow::Result<()> {
        self.record("pre_run", ctx)
    }

    fn pre_init(&mut self, ctx: &mut EngineContext) -> anyhow::Result<()> {
        self.record("pre_init", ctx)
    }

    fn init(&mut self, ctx: &mut EngineContext) -> anyhow::Result<()> {
        self.record("init", ctx)
    }

    fn renderer_setup(&mut self, ctx: &mut EngineContext) -> anyhow::Result<()> {
        self.record("renderer_setup", ctx)
    }

    fn post_init(&mut self, ctx: &mut EngineContext) -> anyhow::Result<()> {
        self.record("post_init", ctx)
    }

    fn tick(&mut self, ctx: &mut EngineContext) -> anyhow::Result<()> {
        self.ticks += 1;
        if self.close_after_ticks == Some(self.ticks) {
            ctx.close();
        }
        self.record("tick", ctx)
    }

    fn render(&mut self, ctx: &mut EngineContext) -> anyhow::Result<()> {
        self.fps_seen.push(ctx.fps());
        self.record("render", ctx)
    }

    fn on_finish_init(&mut self, ctx: &mut EngineContext) -> anyhow::Result<()> {
        self.record("on_finish_init", ctx)
    }

    fn on_exit(&mut self, ctx: &mut EngineContext) {
        self.calls.push(("on_exit", ctx.is_loading()));
    }
}

fn context() -> EngineContext {
    EngineContext::new("Test Game", "testgame")
}

fn run_recorder(game: Recorder, platform: HeadlessPlatform) -> (Recorder, engine_base::Result<()>) {
    let mut game_loop = GameLoop::new(game, platform, context());
    let result = game_loop.run().map(|_| ());
    (game_loop.into_game(), result)
}

#[test]
fn test_initialization_runs_once_after_first_render() {
    let (game, result) = run_recorder(
        Recorder::default(),
        HeadlessPlatform::fixed(Duration::from_millis(20), 10),
    );
    result.unwrap();

    assert_eq!(
        &game.names()[..7],
        &[
            "pre_run",
            "render",
            "pre_init",
            "init",
            "renderer_setup",
            "post_init",
            "on_finish_init",
        ]
    );
    for hook in ["pre_run", "pre_init", "init", "renderer_setup", "post_init", "on_finish_init"] {
        assert_eq!(game.count(hook), 1, "{hook} should run exactly once");
    }
    assert_eq!(game.count("render"), 10);
    assert_eq!(game.names().last(), Some(&"on_exit"));
}

#[test]
fn test_first_frame_is_loading_and_does_not_tick() {
    // 100ms is six fixed steps, all consumed while loading
    let (game, result) = run_recorder(
        Recorder::default(),
        HeadlessPlatform::fixed(Duration::from_millis(100), 3),
    );
    result.unwrap();

    let first_tick = game.names().iter().position(|n| *n == "tick").unwrap();
    let first_init = game.names().iter().position(|n| *n == "init").unwrap();
    assert!(first_init < first_tick);

    // Initialization still runs as loading; nothing after it does
    assert_eq!(game.calls[1], ("render", true));
    assert!(game.calls[2..7].iter().all(|(_, loading)| *loading));
    assert!(
        game.calls[7..]
            .iter()
            .filter(|(name, _)| *name != "on_exit")
            .all(|(_, loading)| !*loading)
    );
    assert_eq!(game.count("tick"), 12);
}

#[test]
fn test_tick_count_follows_elapsed_time() {
    let mut game_loop = GameLoop::new(
        Recorder::default(),
        HeadlessPlatform::fixed(Duration::from_millis(100), 10),
        context(),
    );
    let summary = game_loop.run().unwrap();

    assert_eq!(summary.frames, 10);
    assert_eq!(summary.fixed_steps, 60);
    assert_eq!(summary.ticks, 54);
    assert_eq!(game_loop.game().ticks, 54);
}

#[test]
fn test_frame_chunking_does_not_change_steps() {
    let coarse = [250, 750].map(Duration::from_millis);
    let mut a = GameLoop::new(Recorder::default(), HeadlessPlatform::new(coarse), context());
    let mut b = GameLoop::new(
        Recorder::default(),
        HeadlessPlatform::fixed(Duration::from_millis(10), 100),
        context(),
    );

    assert_eq!(a.run().unwrap().fixed_steps, 60);
    assert_eq!(b.run().unwrap().fixed_steps, 60);
}

#[test]
fn test_close_from_tick_stops_at_next_frame() {
    // 50ms frames give three steps each; the frame that requests close
    // still finishes its steps and render
    let game = Recorder {
        close_after_ticks: Some(5),
        ..Recorder::default()
    };
    let mut game_loop = GameLoop::new(
        game,
        HeadlessPlatform::fixed(Duration::from_millis(50), 100),
        context(),
    );
    let summary = game_loop.run().unwrap();

    assert_eq!(summary.frames, 3);
    assert_eq!(summary.ticks, 6);
    assert_eq!(game_loop.phase(), LoopPhase::Terminated);
    assert!(!game_loop.context().is_running());
    assert_eq!(game_loop.platform().remaining_frames(), 97);

    let game = game_loop.into_game();
    assert_eq!(game.names().last(), Some(&"on_exit"));
    assert_eq!(game.count("on_exit"), 1);
}

#[test]
fn test_frame_after_close_stays_closed() {
    let mut game_loop = GameLoop::new(
        Recorder::default(),
        HeadlessPlatform::fixed(Duration::from_millis(20), 2),
        context(),
    );
    game_loop.run().unwrap();

    assert_eq!(game_loop.frame().unwrap(), FrameOutcome::Closed);
    assert_eq!(game_loop.frames(), 2);
    assert_eq!(game_loop.game().count("on_exit"), 1);
}

#[test]
fn test_timer_can_close_the_loop() {
    struct CloseTimer;

    impl Game for CloseTimer {
        fn pre_run(&mut self, _ctx: &mut EngineContext) -> anyhow::Result<()> {
            Ok(())
        }
        fn pre_init(&mut self, _ctx: &mut EngineContext) -> anyhow::Result<()> {
            Ok(())
        }
        fn init(&mut self, ctx: &mut EngineContext) -> anyhow::Result<()> {
            ctx.add_timer(TimeUnit::Tick, 4, false, |commands| commands.close());
            Ok(())
        }
        fn renderer_setup(&mut self, _ctx: &mut EngineContext) -> anyhow::Result<()> {
            Ok(())
        }
        fn post_init(&mut self, _ctx: &mut EngineContext) -> anyhow::Result<()> {
            Ok(())
        }
        fn tick(&mut self, _ctx: &mut EngineContext) -> anyhow::Result<()> {
            Ok(())
        }
        fn render(&mut self, _ctx: &mut EngineContext) -> anyhow::Result<()> {
            Ok(())
        }
    }

    // 50ms frames: frame 2 ticks 1..=3, frame 3 fires the timer on tick 4
    let mut game_loop = GameLoop::new(
        CloseTimer,
        HeadlessPlatform::fixed(Duration::from_millis(50), 100),
        context(),
    );
    let summary = game_loop.run().unwrap();

    assert_eq!(summary.frames, 3);
    assert_eq!(summary.ticks, 6);
    assert_eq!(game_loop.context().timer_count(), 0);
}

#[test]
fn test_hook_error_stops_the_loop() {
    let game = Recorder {
        fail_in: Some("init"),
        ..Recorder::default()
    };
    let mut game_loop = GameLoop::new(
        game,
        HeadlessPlatform::fixed(Duration::from_millis(20), 10),
        context(),
    );

    let err = game_loop.run().unwrap_err();
    match &err {
        EngineError::Hook { hook, source } => {
            assert_eq!(*hook, "init");
            assert!(source.to_string().contains("failed on purpose"));
        }
        other => panic!("expected a hook error, got {other:?}"),
    }
    assert_eq!(game_loop.frames(), 1);
    assert_eq!(game_loop.game().count("renderer_setup"), 0);
}

#[test]
fn test_pre_run_error_renders_nothing() {
    let game = Recorder {
        fail_in: Some("pre_run"),
        ..Recorder::default()
    };
    let (game, result) = run_recorder(game, HeadlessPlatform::fixed(Duration::from_millis(20), 10));

    assert!(matches!(result, Err(EngineError::Hook { hook: "pre_run", .. })));
    assert_eq!(game.count("render"), 0);
}

#[test]
fn test_handle_closes_loop_from_another_thread() {
    let mut game_loop = GameLoop::new(
        Recorder::default(),
        HeadlessPlatform::fixed(Duration::from_millis(20), 100),
        context(),
    );
    let handle = game_loop.context().handle();

    for _ in 0..3 {
        assert_eq!(game_loop.frame().unwrap(), FrameOutcome::Continue);
    }

    thread::spawn(move || handle.close()).join().unwrap();

    assert_eq!(game_loop.frame().unwrap(), FrameOutcome::Closed);
    assert_eq!(game_loop.frames(), 3);
    assert_eq!(game_loop.game().names().last(), Some(&"on_exit"));
}

#[test]
fn test_submitted_work_runs_on_loop_thread() {
    let mut game_loop = GameLoop::new(
        Recorder::default(),
        HeadlessPlatform::fixed(Duration::from_millis(20), 100),
        context(),
    );
    let handle = game_loop.context().handle();

    thread::spawn(move || {
        handle.submit(|ctx| {
            ctx.toggle_debug();
            ctx.close();
        });
    })
    .join()
    .unwrap();

    let summary = game_loop.run().unwrap();

    assert_eq!(summary.frames, 1);
    assert!(game_loop.context().is_debug());
}

#[test]
fn test_fps_is_published_after_one_second() {
    let mut game_loop = GameLoop::new(
        Recorder::default(),
        HeadlessPlatform::fixed(Duration::from_millis(16), 70),
        context(),
    );
    game_loop.run().unwrap();

    let game = game_loop.game();
    // Frame 63 is the first past 1000ms; renders see the value a frame later
    assert!(game.fps_seen[..63].iter().all(|fps| *fps == 0));
    assert_eq!(game.fps_seen[63], 63);
    assert_eq!(game_loop.context().fps(), 63);
}

#[test]
fn test_frame_after_hook_error_stays_closed() {
    let game = Recorder {
        fail_in: Some("init"),
        ..Recorder::default()
    };
    let mut game_loop = GameLoop::new(
        game,
        HeadlessPlatform::fixed(Duration::from_millis(20), 10),
        context(),
    );

    assert!(game_loop.run().is_err());
    assert_eq!(game_loop.phase(), LoopPhase::Terminated);
    assert!(!game_loop.context().is_running());

    assert_eq!(game_loop.frame().unwrap(), FrameOutcome::Closed);
    assert_eq!(game_loop.frames(), 1);

    let game = game_loop.into_game();
    assert_eq!(game.count("pre_init"), 1);
    assert_eq!(game.count("init"), 1);
    assert_eq!(game.count("render"), 1);
}

#[test]
fn test_failed_start_is_not_retried() {
    let game = Recorder {
        fail_in: Some("pre_run"),
        ..Recorder::default()
    };
    let mut game_loop = GameLoop::new(
        game,
        HeadlessPlatform::fixed(Duration::from_millis(20), 10),
        context(),
    );

    assert!(game_loop.frame().is_err());
    assert_eq!(game_loop.phase(), LoopPhase::Terminated);
    assert_eq!(game_loop.frame().unwrap(), FrameOutcome::Closed);
    assert_eq!(game_loop.game().count("pre_run"), 1);
}

#[test]
fn test_empty_script_renders_nothing() {
    let mut game_loop = GameLoop::new(
        Recorder::default(),
        HeadlessPlatform::new(Vec::<Duration>::new()),
        context(),
    );
    let summary = game_loop.run().unwrap();

    assert_eq!(summary.frames, 0);
    assert_eq!(summary.ticks, 0);

    let game = game_loop.into_game();
    assert_eq!(game.names(), vec!["pre_run", "on_exit"]);
}

#[test]
fn test_interpolation_alpha_tracks_leftover_step() {
    // 25ms is one and a half steps at 60 Hz
    let mut game_loop = GameLoop::new(
        Recorder::default(),
        HeadlessPlatform::fixed(Duration::from_millis(25), 10),
        context(),
    );

    assert_eq!(game_loop.frame().unwrap(), FrameOutcome::Continue);
    assert!((game_loop.context().interpolation_alpha() - 0.5).abs() < 1e-9);

    assert_eq!(game_loop.frame().unwrap(), FrameOutcome::Continue);
    assert!(game_loop.context().interpolation_alpha().abs() < 1e-9);
    assert_eq!(game_loop.fixed_steps(), 3);
}
