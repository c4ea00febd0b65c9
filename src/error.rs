//! Error types for the engine runtime

use thiserror::Error;

/// Errors surfaced by the engine runtime
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("Window creation failed: {0}")]
    Window(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Unknown uniform: {0}")]
    UnknownUniform(String),

    #[error("Uniform {name} expects a {expected} value")]
    UniformType {
        name: String,
        expected: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{hook} hook failed")]
    Hook {
        hook: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
