//! Probe trait and result types

use std::time::Duration;

use colored::Colorize;

/// Outcome of a single probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProbeStatus {
    Pass,
    Warn,
    Fail,
}

impl ProbeStatus {
    /// Pass or Warn
    pub fn is_ok(self) -> bool {
        self != ProbeStatus::Fail
    }

    /// Status label colored for terminal output
    pub fn label(self) -> String {
        match self {
            ProbeStatus::Pass => "PASS".green().to_string(),
            ProbeStatus::Warn => "WARN".yellow().to_string(),
            ProbeStatus::Fail => "FAIL".red().to_string(),
        }
    }
}

/// What a probe found
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub status: ProbeStatus,
    /// One-line summary
    pub message: String,
    /// Indented detail lines
    pub details: Vec<String>,
    /// Wall time spent, filled in by the runner
    pub duration: Duration,
}

impl ProbeResult {
    fn with_status(status: ProbeStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn pass(message: impl Into<String>) -> Self {
        Self::with_status(ProbeStatus::Pass, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::with_status(ProbeStatus::Warn, message)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::with_status(ProbeStatus::Fail, message)
    }

    /// Attaches detail lines collected while probing
    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
}

/// A startup check of one engine subsystem
pub trait Probe {
    /// Subsystem name shown in the report
    fn name(&self) -> &'static str;

    fn description(&self) -> Option<&'static str> {
        None
    }

    fn run(&self) -> ProbeResult;
}
