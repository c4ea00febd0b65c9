//! Startup diagnostics for the engine
//!
//! Probes check that each subsystem comes up the way the game expects:
//! - Configuration profiles load and validate
//! - Build metadata was embedded
//! - The host looks capable of running the game
//! - A headless game loop runs its hooks, ticks and timers correctly
//!
//! # Example
//!
//! ```no_run
//! use engine_base::diagnostics::{Diagnostics, probes::*};
//!
//! let report = Diagnostics::new()
//!     .with_probe(ConfigProbe::new())
//!     .with_probe(GameLoopProbe::new())
//!     .run();
//!
//! if report.is_healthy() {
//!     println!("All systems operational!");
//! }
//! ```

pub mod probe;
pub mod probes;
pub mod report;

pub use probe::{Probe, ProbeResult, ProbeStatus};
pub use report::{Diagnostics, DiagnosticsReport};

/// Runs every built-in probe
pub fn run_all() -> DiagnosticsReport {
    Diagnostics::new()
        .with_probe(probes::ConfigProbe::new())
        .with_probe(probes::BuildInfoProbe::new())
        .with_probe(probes::SystemInfoProbe::new())
        .with_probe(probes::GameLoopProbe::new())
        .run()
}
