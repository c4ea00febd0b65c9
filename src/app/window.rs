//! Window creation and the winit-backed platform

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

#[cfg(debug_assertions)]
use winit::keyboard::{KeyCode, PhysicalKey};

use super::context::EngineContext;
use super::platform::Platform;
use crate::config::WindowConfig;
use crate::error::{EngineError, Result};

/// How many pumps to wait for the window to appear
const WINDOW_OPEN_ATTEMPTS: usize = 100;

/// Creates window attributes from configuration
pub fn window_attributes_from_config(config: &WindowConfig) -> WindowAttributes {
    let mut attrs = WindowAttributes::default()
        .with_title(config.title.clone())
        .with_inner_size(LogicalSize::new(config.width, config.height))
        .with_resizable(config.resizable)
        .with_decorations(config.decorated);

    if config.fullscreen {
        attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
    }

    attrs
}

/// Collects what winit reports between two polls
struct WindowHandler {
    attributes: WindowAttributes,
    window: Option<Arc<Window>>,
    create_error: Option<String>,
    close_requested: bool,
    debug_toggles: u32,
}

impl ApplicationHandler for WindowHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match event_loop.create_window(self.attributes.clone()) {
            Ok(window) => {
                let size = window.inner_size();
                info!(
                    window.width = size.width,
                    window.height = size.height,
                    "Window created successfully"
                );
                self.window = Some(Arc::new(window));
            }
            Err(e) => {
                error!(error = %e, "Failed to create window");
                self.create_error = Some(e.to_string());
            }
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        #[cfg(debug_assertions)]
        if let WindowEvent::KeyboardInput { event, .. } = &event
            && event.state.is_pressed()
            && !event.repeat
            && let PhysicalKey::Code(KeyCode::Backquote) = event.physical_key
        {
            self.debug_toggles += 1;
            return;
        }

        if let WindowEvent::CloseRequested = event {
            info!("Close requested");
            self.close_requested = true;
        }
    }
}

/// Desktop platform: one winit window, events pumped once per frame
pub struct WinitPlatform {
    event_loop: EventLoop<()>,
    handler: WindowHandler,
    window: Arc<Window>,
}

impl WinitPlatform {
    /// Opens the window described by `config`
    ///
    /// Returns once the window exists, so graphics setup in
    /// [`Game::pre_run`](super::Game::pre_run) can use it.
    pub fn open(config: &WindowConfig) -> Result<Self> {
        let mut event_loop = EventLoop::new()?;
        let mut handler = WindowHandler {
            attributes: window_attributes_from_config(config),
            window: None,
            create_error: None,
            close_requested: false,
            debug_toggles: 0,
        };

        for _ in 0..WINDOW_OPEN_ATTEMPTS {
            let status = event_loop.pump_app_events(Some(Duration::from_millis(10)), &mut handler);
            if let PumpStatus::Exit(code) = status {
                return Err(EngineError::Window(format!(
                    "event loop exited with code {code} before the window opened"
                )));
            }
            if let Some(e) = handler.create_error.take() {
                return Err(EngineError::Window(e));
            }
            if handler.window.is_some() {
                break;
            }
        }

        let window = handler
            .window
            .clone()
            .ok_or_else(|| EngineError::Window("window was never created".to_string()))?;

        Ok(Self {
            event_loop,
            handler,
            window,
        })
    }

    pub fn window(&self) -> Arc<Window> {
        self.window.clone()
    }
}

impl Platform for WinitPlatform {
    fn poll_events(&mut self, ctx: &mut EngineContext) -> Result<()> {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.handler);

        if let PumpStatus::Exit(code) = status {
            info!(code, "Event loop exited");
            ctx.close();
        }
        if std::mem::take(&mut self.handler.close_requested) {
            ctx.close();
        }
        for _ in 0..std::mem::take(&mut self.handler.debug_toggles) {
            ctx.toggle_debug();
        }

        self.window.request_redraw();
        Ok(())
    }

    fn now(&self) -> Instant {
        Instant::now()
    }
}
