//! Application configuration
//!
//! Supports multiple profiles (debug, release) with different settings.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{EngineError, Result};

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Window title, the text on the top bar
    pub title: String,
    /// Window width
    pub width: f64,
    /// Window height
    pub height: f64,
    /// Whether the window should be fullscreen
    pub fullscreen: bool,
    /// Whether the window should be resizable
    pub resizable: bool,
    /// Whether the window should be decorated (has title bar, borders, etc.)
    pub decorated: bool,
    /// Whether to enable vsync
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Engine Base".to_string(),
            width: 800.0,
            height: 600.0,
            fullscreen: false,
            resizable: true,
            decorated: true,
            vsync: true,
        }
    }
}

/// Engine runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Internal title used to locate assets. Should be all lowercase
    pub internal_title: String,
    /// Whether the engine starts in debug mode
    pub debug: bool,
    /// Base directory that holds every game's asset folder
    pub assets_root: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            internal_title: "engine_base".to_string(),
            debug: false,
            assets_root: "resources".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by RUST_LOG
    pub level: String,
    /// Directory for log files, console only when unset
    pub directory: Option<String>,
    /// How many log files to keep, including the current one
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            max_files: 10,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// The active profile (debug, release, etc.)
    pub profile: String,
    /// Window configuration
    #[serde(default)]
    pub window: WindowConfig,
    /// Engine configuration
    #[serde(default)]
    pub engine: EngineConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads configuration based on the specified profile
    ///
    /// Profiles are loaded from config files in the following order:
    /// 1. config/{profile}.toml (profile-specific configuration)
    /// 2. Environment variables with prefix APP_ (e.g., APP_ENGINE__DEBUG=true)
    ///
    /// Config files are searched for in:
    /// 1. Next to the executable (target/debug/config or target/release/config)
    /// 2. In the current directory (./config)
    pub fn load(profile: &str) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        builder = match Self::find_config_dir() {
            Some(dir) => {
                builder.add_source(File::from(dir.join(profile).as_path()).required(false))
            }
            None => {
                builder.add_source(File::with_name(&format!("config/{}", profile)).required(false))
            }
        };

        // Use __ as separator for nested fields (e.g., APP_WINDOW__WIDTH)
        builder = builder.add_source(
            Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.set_override("profile", profile)?.build()?;

        config.try_deserialize()
    }

    /// Finds the config directory by searching in multiple locations
    fn find_config_dir() -> Option<std::path::PathBuf> {
        if let Ok(exe_path) = std::env::current_exe()
            && let Some(exe_dir) = exe_path.parent()
        {
            let config_dir = exe_dir.join("config");
            if config_dir.exists() {
                return Some(config_dir);
            }
        }

        let cwd_config = std::path::PathBuf::from("config");
        if cwd_config.exists() {
            return Some(cwd_config);
        }

        None
    }

    /// Loads configuration using the APP_PROFILE environment variable,
    /// defaulting to "release"
    pub fn load_from_env() -> std::result::Result<Self, ConfigError> {
        let profile = std::env::var("APP_PROFILE").unwrap_or_else(|_| "release".to_string());
        Self::load(&profile)
    }

    /// Built-in configuration for the given profile, no files involved
    pub fn builtin(profile: &str) -> Self {
        Self {
            profile: profile.to_string(),
            window: WindowConfig::default(),
            engine: EngineConfig {
                debug: profile == "debug",
                ..EngineConfig::default()
            },
            logging: LoggingConfig::default(),
        }
    }

    /// Checks values the deserializer cannot
    pub fn validate(&self) -> Result<()> {
        let internal = &self.engine.internal_title;
        if internal.trim().is_empty() {
            return Err(EngineError::InvalidConfig(
                "engine.internal_title must not be empty".to_string(),
            ));
        }
        if internal.chars().any(char::is_uppercase) {
            warn!(internal_title = %internal, "Internal title should be all lowercase");
        }
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "window size must be positive, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if self.logging.max_files == 0 {
            return Err(EngineError::InvalidConfig(
                "logging.max_files must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::load("release").unwrap_or_else(|_| Self::builtin("release"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profile_sets_debug() {
        assert!(AppConfig::builtin("debug").engine.debug);
        assert!(!AppConfig::builtin("release").engine.debug);
    }

    #[test]
    fn test_builtin_is_valid() {
        assert!(AppConfig::builtin("release").validate().is_ok());
    }

    #[test]
    fn test_empty_internal_title_rejected() {
        let mut config = AppConfig::builtin("release");
        config.engine.internal_title = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_uppercase_internal_title_only_warns() {
        let mut config = AppConfig::builtin("release");
        config.engine.internal_title = "MyGame".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_log_retention_rejected() {
        let mut config = AppConfig::builtin("release");
        config.logging.max_files = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_window_rejected() {
        let mut config = AppConfig::builtin("release");
        config.window.height = 0.0;
        assert!(config.validate().is_err());
    }
}
