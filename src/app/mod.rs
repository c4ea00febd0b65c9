//! Engine application layer
//!
//! The game loop, the context and hooks it drives, and the window and GPU
//! collaborators it runs against.

mod context;
mod game;
pub mod hud_shader;
mod platform;
mod renderer;
mod runner;
pub mod shader_system;
mod window;

pub use context::{Deferred, EngineContext, LoopHandle};
pub use game::Game;
pub use hud_shader::{HUD_SHADER_NAME, HudQuad, HudShader, UniformValue, pixel_projection};
pub use platform::{HeadlessPlatform, Platform};
pub use renderer::Renderer;
pub use runner::{FrameOutcome, GameLoop, LoopPhase, RunSummary};
pub use shader_system::{Shader, ShaderRegistry};
pub use window::{WinitPlatform, window_attributes_from_config};
