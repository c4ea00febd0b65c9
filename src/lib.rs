//! Engine Base
//!
//! A small game engine core built on winit and wgpu: a fixed-timestep
//! loop with lifecycle hooks, tick timers, hit boxes and a HUD shader.

/// Game loop, window, and rendering
pub mod app;

/// Build-time information (git SHA, branch, timestamp, etc.)
pub mod build_info;

/// Profile-based configuration
pub mod config;

/// Startup probes and their report
pub mod diagnostics;

/// Engine error type
pub mod error;

/// Tracing subscriber and log file setup
pub mod logging;

/// Timers, fixed-step clock, and hit boxes
pub mod sim;

pub use error::{EngineError, Result};
