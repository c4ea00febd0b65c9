//! Logging setup
//!
//! Console output plus an optional plain-text log file per run. Old log files
//! beyond the configured retention count are pruned at startup.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LoggingConfig;
use crate::error::{EngineError, Result};

const LOG_EXTENSION: &str = "log";

/// Installs the global tracing subscriber
///
/// Returns the path of the log file for this run, if one was opened.
pub fn init(config: &LoggingConfig) -> Result<Option<PathBuf>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (file_layer, log_path) = match &config.directory {
        Some(dir) => {
            let (file, path) = open_log_file(Path::new(dir), config.max_files)?;
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file));
            (Some(layer), Some(path))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .try_init()
        .map_err(|e| EngineError::Logging(e.to_string()))?;

    if let Some(path) = &log_path {
        debug!(path = %path.display(), "Logging to file");
    }

    Ok(log_path)
}

/// Creates `dir/{timestamp}.log`, keeping at most `max_files` logs in `dir`
pub fn open_log_file(dir: &Path, max_files: usize) -> Result<(File, PathBuf)> {
    fs::create_dir_all(dir)?;
    prune_logs(dir, max_files.saturating_sub(1))?;

    let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S%.3f");
    let path = dir.join(format!("{stamp}.{LOG_EXTENSION}"));
    let file = File::create(&path)?;
    Ok((file, path))
}

/// Deletes the oldest log files in `dir` until at most `keep` remain
///
/// Log names are timestamps, so lexical order is age order.
pub fn prune_logs(dir: &Path, keep: usize) -> Result<usize> {
    let mut logs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file() && path.extension().is_some_and(|ext| ext == LOG_EXTENSION)
        })
        .collect();

    if logs.len() <= keep {
        return Ok(0);
    }

    logs.sort();
    let excess = logs.len() - keep;
    for path in &logs[..excess] {
        fs::remove_file(path)?;
    }
    Ok(excess)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    fn log_count(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == LOG_EXTENSION))
            .count()
    }

    #[test]
    fn test_prune_removes_oldest() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "2024-01-01_00-00-00.000.log");
        touch(dir.path(), "2024-01-02_00-00-00.000.log");
        touch(dir.path(), "2024-01-03_00-00-00.000.log");

        let removed = prune_logs(dir.path(), 2).unwrap();

        assert_eq!(removed, 1);
        assert!(!dir.path().join("2024-01-01_00-00-00.000.log").exists());
        assert!(dir.path().join("2024-01-03_00-00-00.000.log").exists());
    }

    #[test]
    fn test_prune_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "2024-01-01_00-00-00.000.log");

        assert_eq!(prune_logs(dir.path(), 0).unwrap(), 1);
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_open_log_file_respects_retention() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "2024-01-01_00-00-00.000.log");
        touch(dir.path(), "2024-01-02_00-00-00.000.log");
        touch(dir.path(), "2024-01-03_00-00-00.000.log");

        let (_file, path) = open_log_file(dir.path(), 3).unwrap();

        assert!(path.exists());
        assert_eq!(log_count(dir.path()), 3);
    }
}
